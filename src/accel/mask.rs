//! Radial cosine-mask kernels.

use rayon::prelude::*;

use crate::backend::{BackgroundFill, BackgroundPartials};
use crate::buffer::Dims;
use crate::element::Element;
use crate::geometry::{center_distance, CosineMask};
use crate::host::mask::blend;
use crate::launch::KernelLaunch;

/// Each block fills its own per-thread lanes, then the lanes of all blocks
/// are added slot by slot, as atomics into a shared `g_sum[tid]` would.
pub(crate) fn soft_mask_background_value<T: Element>(
    launch: &KernelLaunch,
    volume: &[T],
    dims: Dims,
    mask: CosineMask<T>,
) -> BackgroundPartials<T> {
    let block_size = launch.block_size;
    let span = launch.block_span(volume.len());
    let zeroed = || BackgroundPartials {
        weights: vec![T::zero(); block_size],
        values: vec![T::zero(); block_size],
    };

    volume
        .par_chunks(span)
        .enumerate()
        .map(|(block, chunk)| {
            let base = block * span;
            let mut lanes = zeroed();
            for (i, &value) in chunk.iter().enumerate() {
                if let Some(weight) = mask.background_weight(center_distance(dims, base + i)) {
                    let tid = i % block_size;
                    lanes.weights[tid] = lanes.weights[tid] + weight;
                    lanes.values[tid] = lanes.values[tid] + weight * value;
                }
            }
            lanes
        })
        .reduce(&zeroed, |mut acc, lanes| {
            for (a, w) in acc.weights.iter_mut().zip(&lanes.weights) {
                *a = *a + *w;
            }
            for (a, v) in acc.values.iter_mut().zip(&lanes.values) {
                *a = *a + *v;
            }
            acc
        })
}

pub(crate) fn cosine_filter<T: Element>(
    launch: &KernelLaunch,
    volume: &mut [T],
    dims: Dims,
    mask: CosineMask<T>,
    background: BackgroundFill<'_, T>,
) {
    let span = launch.block_span(volume.len());
    volume
        .par_chunks_mut(span)
        .enumerate()
        .for_each(|(block, chunk)| {
            let base = block * span;
            for (i, v) in chunk.iter_mut().enumerate() {
                *v = blend(*v, base + i, dims, mask, background);
            }
        });
}
