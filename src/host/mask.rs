//! Radial cosine-mask kernels.

use crate::backend::{BackgroundFill, BackgroundPartials};
use crate::buffer::Dims;
use crate::element::Element;
use crate::geometry::{center_distance, CosineMask};

/// Accumulates background weight and weighted value of every voxel into
/// the partial slot of the thread that would own it (`index % block_size`).
pub(crate) fn soft_mask_background_value<T: Element>(
    volume: &[T],
    dims: Dims,
    mask: CosineMask<T>,
    block_size: usize,
) -> BackgroundPartials<T> {
    let mut partials = BackgroundPartials {
        weights: vec![T::zero(); block_size],
        values: vec![T::zero(); block_size],
    };
    for (index, &value) in volume.iter().enumerate() {
        if let Some(weight) = mask.background_weight(center_distance(dims, index)) {
            let tid = index % block_size;
            partials.weights[tid] = partials.weights[tid] + weight;
            partials.values[tid] = partials.values[tid] + weight * value;
        }
    }
    partials
}

/// Blends each voxel towards the background by its mask weight.
pub(crate) fn cosine_filter<T: Element>(
    volume: &mut [T],
    dims: Dims,
    mask: CosineMask<T>,
    background: BackgroundFill<'_, T>,
) {
    for (index, v) in volume.iter_mut().enumerate() {
        *v = blend(*v, index, dims, mask, background);
    }
}

#[inline]
pub(crate) fn blend<T: Element>(
    value: T,
    index: usize,
    dims: Dims,
    mask: CosineMask<T>,
    background: BackgroundFill<'_, T>,
) -> T {
    match mask.background_weight(center_distance(dims, index)) {
        Some(weight) => (T::one() - weight) * value + weight * background.at(index),
        None => value,
    }
}
