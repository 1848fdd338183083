//! Rotation matrix generation.

use crate::element::Element;
use crate::geometry::{euler_matrix_2d, euler_matrix_3d, EulerAngles, Orientation, EULER_STRIDE};

pub(crate) fn make_eulers_2d<T: Element>(alphas: &[T], eulers: &mut [T], orientation: Orientation) {
    for (out, &alpha) in eulers.chunks_exact_mut(EULER_STRIDE).zip(alphas) {
        out.copy_from_slice(&euler_matrix_2d(alpha, orientation));
    }
}

pub(crate) fn make_eulers_3d<T: Element>(
    angles: EulerAngles<'_, T>,
    eulers: &mut [T],
    orientation: Orientation,
    perturbation: Option<&[T; 9]>,
) {
    let triples = angles
        .alphas
        .iter()
        .zip(angles.betas)
        .zip(angles.gammas);
    for (out, ((&a, &b), &g)) in eulers.chunks_exact_mut(EULER_STRIDE).zip(triples) {
        out.copy_from_slice(&euler_matrix_3d(a, b, g, orientation, perturbation));
    }
}
