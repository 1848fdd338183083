//! Grid decomposition helpers shared by the accelerator kernels.
//!
//! A launch covers the work with `grid_size` blocks of
//! [`KernelLaunch::block_span`] elements each. Inside a block, element `i`
//! belongs to thread `i % block_size`; threads fold their elements into a
//! lane, and lanes are combined by a pairwise tree like a shared-memory
//! reduction. Blocks run concurrently on the rayon pool.

use rayon::prelude::*;

use crate::launch::KernelLaunch;

/// Pairwise tree reduction: lane `i` absorbs lane `i + half` until one
/// value remains.
pub(crate) fn tree_reduce<A, C>(mut lanes: Vec<A>, combine: &C) -> Option<A>
where
    A: Copy,
    C: Fn(A, A) -> A,
{
    while lanes.len() > 1 {
        let half = lanes.len().div_ceil(2);
        for i in 0..lanes.len() - half {
            lanes[i] = combine(lanes[i], lanes[i + half]);
        }
        lanes.truncate(half);
    }
    lanes.pop()
}

/// Reduces one block: per-thread folds, then a tree over the lanes.
fn block_reduce<T, A, L, C>(
    chunk: &[T],
    base: usize,
    block_size: usize,
    lift: &L,
    combine: &C,
) -> Option<A>
where
    T: Copy,
    A: Copy,
    L: Fn(usize, T) -> A,
    C: Fn(A, A) -> A,
{
    let mut lanes: Vec<A> = Vec::with_capacity(block_size.min(chunk.len()));
    for (i, &v) in chunk.iter().enumerate() {
        let value = lift(base + i, v);
        let lane = i % block_size;
        if lane < lanes.len() {
            lanes[lane] = combine(lanes[lane], value);
        } else {
            lanes.push(value);
        }
    }
    tree_reduce(lanes, combine)
}

/// Two-level reduction: every block reduces its span in parallel, then the
/// block partials are reduced by a final tree. `None` for empty input.
pub(crate) fn grid_reduce<T, A, L, C>(
    launch: &KernelLaunch,
    data: &[T],
    lift: L,
    combine: C,
) -> Option<A>
where
    T: Copy + Sync,
    A: Copy + Send,
    L: Fn(usize, T) -> A + Sync,
    C: Fn(A, A) -> A + Sync,
{
    let span = launch.block_span(data.len());
    let partials: Vec<A> = data
        .par_chunks(span)
        .enumerate()
        .filter_map(|(block, chunk)| {
            block_reduce(chunk, block * span, launch.block_size, &lift, &combine)
        })
        .collect();
    tree_reduce(partials, &combine)
}

/// Exclusive prefix sum, returning the offsets and the grand total.
pub(crate) fn exclusive_scan<A>(values: &[A], zero: A) -> (Vec<A>, A)
where
    A: Copy + std::ops::Add<Output = A>,
{
    let mut offsets = Vec::with_capacity(values.len());
    let mut total = zero;
    for &v in values {
        offsets.push(total);
        total = total + v;
    }
    (offsets, total)
}

/// Splits `data` into consecutive sub-slices of the given lengths.
pub(crate) fn split_by_lengths<'a, T>(mut data: &'a mut [T], lengths: &[usize]) -> Vec<&'a mut [T]> {
    let mut parts = Vec::with_capacity(lengths.len());
    for &len in lengths {
        let (head, tail) = std::mem::take(&mut data).split_at_mut(len);
        parts.push(head);
        data = tail;
    }
    parts
}
