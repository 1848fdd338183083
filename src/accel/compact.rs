//! Order-preserving compaction, merge sort and three-phase scan.

use std::cmp::Ordering;

use rayon::prelude::*;

use crate::element::Element;
use crate::launch::KernelLaunch;

use super::grid::{exclusive_scan, split_by_lengths};

/// Count, scan, scatter: every block counts its positive elements, an
/// exclusive scan over the counts gives each block its output offset, and
/// blocks then write their survivors into disjoint output ranges.
pub(crate) fn filter_greater_zero<T: Element>(launch: &KernelLaunch, input: &[T]) -> Vec<T> {
    let span = launch.block_span(input.len());
    let keep = |v: &T| *v > T::zero();

    let counts: Vec<usize> = input
        .par_chunks(span)
        .map(|block| block.iter().filter(|v| keep(v)).count())
        .collect();
    let (_, total) = exclusive_scan(&counts, 0);

    let mut output = vec![T::zero(); total];
    let targets = split_by_lengths(&mut output, &counts);
    input
        .par_chunks(span)
        .zip(targets.into_par_iter())
        .for_each(|(block, target)| {
            for (dst, &v) in target.iter_mut().zip(block.iter().filter(|v| keep(v))) {
                *dst = v;
            }
        });
    output
}

fn merge<T: Element>(src: &[T], mid: usize, dst: &mut [T]) {
    let (left, right) = src.split_at(mid.min(src.len()));
    let (mut i, mut j) = (0, 0);
    for slot in dst.iter_mut() {
        let take_left = j >= right.len()
            || (i < left.len() && left[i].total_order(&right[j]) != Ordering::Greater);
        if take_left {
            *slot = left[i];
            i += 1;
        } else {
            *slot = right[j];
            j += 1;
        }
    }
}

/// Blocks sort their spans in parallel, then ping-pong merge passes double
/// the sorted run length until one run covers the input.
pub(crate) fn sort<T: Element>(launch: &KernelLaunch, input: &[T], output: &mut [T]) {
    let n = input.len();
    let span = launch.block_span(n);
    let output = &mut output[..n];
    output.copy_from_slice(input);
    output
        .par_chunks_mut(span)
        .for_each(|block| block.sort_unstable_by(T::total_order));

    let mut scratch = vec![T::zero(); n];
    let mut sorted_in_output = true;
    let mut width = span;
    while width < n {
        let (src, dst): (&[T], &mut [T]) = if sorted_in_output {
            (&*output, &mut scratch[..])
        } else {
            (&scratch[..], &mut *output)
        };
        dst.par_chunks_mut(2 * width)
            .zip(src.par_chunks(2 * width))
            .for_each(|(d, s)| merge(s, width, d));
        sorted_in_output = !sorted_in_output;
        width *= 2;
    }
    if !sorted_in_output {
        output.copy_from_slice(&scratch);
    }
}

/// Per-block inclusive scan, exclusive scan of the block totals, then every
/// block adds its offset.
pub(crate) fn scan<T: Element>(launch: &KernelLaunch, input: &[T], output: &mut [T]) {
    let span = launch.block_span(input.len());
    let output = &mut output[..input.len()];

    let totals: Vec<T> = output
        .par_chunks_mut(span)
        .zip(input.par_chunks(span))
        .map(|(out, inp)| {
            let mut sum = T::zero();
            for (o, &v) in out.iter_mut().zip(inp) {
                sum = sum + v;
                *o = sum;
            }
            sum
        })
        .collect();
    let (offsets, _) = exclusive_scan(&totals, T::zero());

    output
        .par_chunks_mut(span)
        .zip(offsets.into_par_iter())
        .skip(1)
        .for_each(|(out, offset)| {
            for o in out {
                *o = *o + offset;
            }
        });
}
