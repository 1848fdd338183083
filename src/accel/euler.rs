//! One thread per orientation, `block_span` orientations per block.

use rayon::prelude::*;

use crate::element::Element;
use crate::geometry::{euler_matrix_2d, euler_matrix_3d, EulerAngles, Orientation, EULER_STRIDE};
use crate::launch::KernelLaunch;

pub(crate) fn make_eulers_2d<T: Element>(
    launch: &KernelLaunch,
    alphas: &[T],
    eulers: &mut [T],
    orientation: Orientation,
) {
    let span = launch.block_span(alphas.len());
    eulers[..alphas.len() * EULER_STRIDE]
        .par_chunks_mut(span * EULER_STRIDE)
        .zip(alphas.par_chunks(span))
        .for_each(|(block, alphas)| {
            for (out, &alpha) in block.chunks_exact_mut(EULER_STRIDE).zip(alphas) {
                out.copy_from_slice(&euler_matrix_2d(alpha, orientation));
            }
        });
}

pub(crate) fn make_eulers_3d<T: Element>(
    launch: &KernelLaunch,
    angles: EulerAngles<'_, T>,
    eulers: &mut [T],
    orientation: Orientation,
    perturbation: Option<&[T; 9]>,
) {
    let count = angles.len();
    let span = launch.block_span(count);
    eulers[..count * EULER_STRIDE]
        .par_chunks_mut(span * EULER_STRIDE)
        .enumerate()
        .for_each(|(block_idx, block)| {
            let first = block_idx * span;
            for (tid, out) in block.chunks_exact_mut(EULER_STRIDE).enumerate() {
                let i = first + tid;
                let (a, b, g) = (angles.alphas[i], angles.betas[i], angles.gammas[i]);
                out.copy_from_slice(&euler_matrix_3d(a, b, g, orientation, perturbation));
            }
        });
}
