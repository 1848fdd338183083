//! Sequential host kernel library.
//!
//! The reference implementation of every primitive. Kernels run to
//! completion on the calling thread (or the stream job) and ignore the grid
//! decomposition; the only launch parameter they honour is the block size of
//! the per-thread background partials. `f32` sum/min/max go through trueno's
//! SIMD `Vector`.

mod compact;
mod elementwise;
mod euler;
pub(crate) mod mask;
mod reduce;
mod spectrum;

use crate::backend::{
    ArgExtremum, BackendKind, BackgroundFill, BackgroundPartials, KernelLibrary, PowerSpectrum,
};
use crate::buffer::Dims;
use crate::element::{AccComplex, Element};
use crate::geometry::{CosineMask, EulerAngles, Orientation, Shift};
use crate::launch::KernelLaunch;

/// Host kernel library.
#[derive(Debug, Clone, Copy, Default)]
pub struct Host;

impl KernelLibrary for Host {
    const KIND: BackendKind = BackendKind::Host;

    fn multiply<T: Element>(_launch: &KernelLaunch, data: &mut [T], value: T) {
        elementwise::multiply(data, value);
    }

    fn multiply_into<T: Element>(_launch: &KernelLaunch, input: &[T], output: &mut [T], value: T) {
        elementwise::multiply_into(input, output, value);
    }

    fn translate<T: Element>(
        _launch: &KernelLaunch,
        input: &[T],
        output: &mut [T],
        dims: Dims,
        shift: Shift,
    ) {
        elementwise::translate(input, output, dims, shift);
    }

    fn center_fft<T: Element>(_launch: &KernelLaunch, input: &[T], output: &mut [T], dims: Dims) {
        elementwise::center_fft(input, output, dims);
    }

    fn sum<T: Element>(_launch: &KernelLaunch, data: &[T]) -> T {
        T::host_sum(data)
    }

    fn min<T: Element>(_launch: &KernelLaunch, data: &[T]) -> T {
        T::host_min(data)
    }

    fn max<T: Element>(_launch: &KernelLaunch, data: &[T]) -> T {
        T::host_max(data)
    }

    fn arg_min<T: Element>(_launch: &KernelLaunch, data: &[T]) -> ArgExtremum<T> {
        reduce::arg_min(data)
    }

    fn arg_max<T: Element>(_launch: &KernelLaunch, data: &[T]) -> ArgExtremum<T> {
        reduce::arg_max(data)
    }

    fn filter_greater_zero<T: Element>(_launch: &KernelLaunch, input: &[T]) -> Vec<T> {
        compact::filter_greater_zero(input)
    }

    fn sort<T: Element>(_launch: &KernelLaunch, input: &[T], output: &mut [T]) {
        compact::sort(input, output);
    }

    fn scan<T: Element>(_launch: &KernelLaunch, input: &[T], output: &mut [T]) {
        compact::scan(input, output);
    }

    fn soft_mask_background_value<T: Element>(
        launch: &KernelLaunch,
        volume: &[T],
        dims: Dims,
        mask: CosineMask<T>,
    ) -> BackgroundPartials<T> {
        mask::soft_mask_background_value(volume, dims, mask, launch.block_size)
    }

    fn cosine_filter<T: Element>(
        _launch: &KernelLaunch,
        volume: &mut [T],
        dims: Dims,
        mask: CosineMask<T>,
        background: BackgroundFill<'_, T>,
    ) {
        mask::cosine_filter(volume, dims, mask, background);
    }

    fn power_class<T: Element>(
        _launch: &KernelLaunch,
        image: &[AccComplex<T>],
        dims: Dims,
        spectrum_size: usize,
        res_limit: usize,
    ) -> PowerSpectrum<T> {
        spectrum::power_class(image, dims, spectrum_size, res_limit)
    }

    fn make_eulers_2d<T: Element>(
        _launch: &KernelLaunch,
        alphas: &[T],
        eulers: &mut [T],
        orientation: Orientation,
    ) {
        euler::make_eulers_2d(alphas, eulers, orientation);
    }

    fn make_eulers_3d<T: Element>(
        _launch: &KernelLaunch,
        angles: EulerAngles<'_, T>,
        eulers: &mut [T],
        orientation: Orientation,
        perturbation: Option<&[T; 9]>,
    ) {
        euler::make_eulers_3d(angles, eulers, orientation, perturbation);
    }
}
