//! Radial power spectrum with per-block bins.

use rayon::prelude::*;

use crate::backend::PowerSpectrum;
use crate::buffer::Dims;
use crate::element::{AccComplex, Element};
use crate::geometry::power_bin;
use crate::launch::KernelLaunch;

pub(crate) fn power_class<T: Element>(
    launch: &KernelLaunch,
    image: &[AccComplex<T>],
    dims: Dims,
    spectrum_size: usize,
    res_limit: usize,
) -> PowerSpectrum<T> {
    let span = launch.block_span(image.len());
    let empty = || PowerSpectrum {
        bins: vec![T::zero(); spectrum_size],
        highres_xi2: T::zero(),
    };

    image
        .par_chunks(span)
        .enumerate()
        .map(|(block, chunk)| {
            let base = block * span;
            let mut local = empty();
            for (i, c) in chunk.iter().enumerate() {
                if let Some(bin) = power_bin(dims, base + i, spectrum_size) {
                    let power = c.norm_sqr();
                    local.bins[bin] = local.bins[bin] + power;
                    if bin >= res_limit {
                        local.highres_xi2 = local.highres_xi2 + power;
                    }
                }
            }
            local
        })
        .reduce(&empty, |mut acc, local| {
            for (a, b) in acc.bins.iter_mut().zip(&local.bins) {
                *a = *a + *b;
            }
            acc.highres_xi2 = acc.highres_xi2 + local.highres_xi2;
            acc
        })
}
