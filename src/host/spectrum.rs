//! Radial power spectrum.

use crate::backend::PowerSpectrum;
use crate::buffer::Dims;
use crate::element::{AccComplex, Element};
use crate::geometry::power_bin;

pub(crate) fn power_class<T: Element>(
    image: &[AccComplex<T>],
    dims: Dims,
    spectrum_size: usize,
    res_limit: usize,
) -> PowerSpectrum<T> {
    let mut spectrum = PowerSpectrum {
        bins: vec![T::zero(); spectrum_size],
        highres_xi2: T::zero(),
    };
    for (index, c) in image.iter().enumerate() {
        if let Some(bin) = power_bin(dims, index, spectrum_size) {
            let power = c.norm_sqr();
            spectrum.bins[bin] = spectrum.bins[bin] + power;
            if bin >= res_limit {
                spectrum.highres_xi2 = spectrum.highres_xi2 + power;
            }
        }
    }
    spectrum
}
