//! Sequential elementwise kernels: scaling and image shifts.

use crate::buffer::Dims;
use crate::element::Element;
use crate::geometry::{centered_index, shifted_index, Shift};

/// `data[i] *= value`.
pub(crate) fn multiply<T: Element>(data: &mut [T], value: T) {
    for v in data.iter_mut() {
        *v = *v * value;
    }
}

/// `output[i] = input[i] * value` over `input.len()` elements.
pub(crate) fn multiply_into<T: Element>(input: &[T], output: &mut [T], value: T) {
    for (o, &i) in output.iter_mut().zip(input) {
        *o = i * value;
    }
}

/// Scatters every input element to its shifted position. Destinations no
/// source lands on keep their previous contents.
pub(crate) fn translate<T: Element>(input: &[T], output: &mut [T], dims: Dims, shift: Shift) {
    for (index, &value) in input.iter().enumerate() {
        if let Some(dst) = shifted_index(dims, index, shift) {
            output[dst] = value;
        }
    }
}

/// Wraparound shift of the origin to the image center.
pub(crate) fn center_fft<T: Element>(input: &[T], output: &mut [T], dims: Dims) {
    for (index, &value) in input.iter().enumerate() {
        output[centered_index(dims, index)] = value;
    }
}
