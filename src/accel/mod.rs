//! Grid-parallel accelerator kernel library.
//!
//! Emulates the SIMT execution model on the CPU: a launch is split into
//! `grid_size` blocks of [`KernelLaunch::block_span`] elements, blocks run
//! concurrently on the rayon pool, and within a block element `i` belongs
//! to thread `i % block_size`. Reductions combine per-thread lanes with a
//! tree, compaction is count/scan/scatter, scan is three-phase and sort is a
//! block sort followed by merge passes.
//!
//! Kernels are enqueued through a [`Stream`](crate::stream::Stream) worker,
//! so dispatch calls return before the kernel finishes.

mod compact;
mod elementwise;
mod euler;
mod grid;
mod mask;
mod reduce;
mod spectrum;

use crate::backend::{
    ArgExtremum, BackendKind, BackgroundFill, BackgroundPartials, KernelLibrary, PowerSpectrum,
};
use crate::buffer::Dims;
use crate::element::{AccComplex, Element};
use crate::geometry::{CosineMask, EulerAngles, Orientation, Shift};
use crate::launch::KernelLaunch;

/// Accelerator kernel library.
#[derive(Debug, Clone, Copy, Default)]
pub struct Accelerator;

impl KernelLibrary for Accelerator {
    const KIND: BackendKind = BackendKind::Accelerator;

    fn multiply<T: Element>(launch: &KernelLaunch, data: &mut [T], value: T) {
        elementwise::multiply(launch, data, value);
    }

    fn multiply_into<T: Element>(launch: &KernelLaunch, input: &[T], output: &mut [T], value: T) {
        elementwise::multiply_into(launch, input, output, value);
    }

    fn translate<T: Element>(
        launch: &KernelLaunch,
        input: &[T],
        output: &mut [T],
        dims: Dims,
        shift: Shift,
    ) {
        elementwise::translate(launch, input, output, dims, shift);
    }

    fn center_fft<T: Element>(launch: &KernelLaunch, input: &[T], output: &mut [T], dims: Dims) {
        elementwise::center_fft(launch, input, output, dims);
    }

    fn sum<T: Element>(launch: &KernelLaunch, data: &[T]) -> T {
        reduce::sum(launch, data)
    }

    fn min<T: Element>(launch: &KernelLaunch, data: &[T]) -> T {
        reduce::min(launch, data)
    }

    fn max<T: Element>(launch: &KernelLaunch, data: &[T]) -> T {
        reduce::max(launch, data)
    }

    fn arg_min<T: Element>(launch: &KernelLaunch, data: &[T]) -> ArgExtremum<T> {
        reduce::arg_min(launch, data)
    }

    fn arg_max<T: Element>(launch: &KernelLaunch, data: &[T]) -> ArgExtremum<T> {
        reduce::arg_max(launch, data)
    }

    fn filter_greater_zero<T: Element>(launch: &KernelLaunch, input: &[T]) -> Vec<T> {
        compact::filter_greater_zero(launch, input)
    }

    fn sort<T: Element>(launch: &KernelLaunch, input: &[T], output: &mut [T]) {
        compact::sort(launch, input, output);
    }

    fn scan<T: Element>(launch: &KernelLaunch, input: &[T], output: &mut [T]) {
        compact::scan(launch, input, output);
    }

    fn soft_mask_background_value<T: Element>(
        launch: &KernelLaunch,
        volume: &[T],
        dims: Dims,
        mask: CosineMask<T>,
    ) -> BackgroundPartials<T> {
        mask::soft_mask_background_value(launch, volume, dims, mask)
    }

    fn cosine_filter<T: Element>(
        launch: &KernelLaunch,
        volume: &mut [T],
        dims: Dims,
        mask: CosineMask<T>,
        background: BackgroundFill<'_, T>,
    ) {
        mask::cosine_filter(launch, volume, dims, mask, background);
    }

    fn power_class<T: Element>(
        launch: &KernelLaunch,
        image: &[AccComplex<T>],
        dims: Dims,
        spectrum_size: usize,
        res_limit: usize,
    ) -> PowerSpectrum<T> {
        spectrum::power_class(launch, image, dims, spectrum_size, res_limit)
    }

    fn make_eulers_2d<T: Element>(
        launch: &KernelLaunch,
        alphas: &[T],
        eulers: &mut [T],
        orientation: Orientation,
    ) {
        euler::make_eulers_2d(launch, alphas, eulers, orientation);
    }

    fn make_eulers_3d<T: Element>(
        launch: &KernelLaunch,
        angles: EulerAngles<'_, T>,
        eulers: &mut [T],
        orientation: Orientation,
        perturbation: Option<&[T; 9]>,
    ) {
        euler::make_eulers_3d(launch, angles, eulers, orientation, perturbation);
    }
}
