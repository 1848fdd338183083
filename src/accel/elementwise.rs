//! Grid-parallel elementwise kernels.
//!
//! Shifts are written as gathers: every output thread looks up its source,
//! so no two threads write the same element.

use rayon::prelude::*;

use crate::buffer::Dims;
use crate::element::Element;
use crate::geometry::{source_index, uncentered_index, Shift};
use crate::launch::KernelLaunch;

pub(crate) fn multiply<T: Element>(launch: &KernelLaunch, data: &mut [T], value: T) {
    let span = launch.block_span(data.len());
    data.par_chunks_mut(span).for_each(|block| {
        for v in block {
            *v = *v * value;
        }
    });
}

pub(crate) fn multiply_into<T: Element>(
    launch: &KernelLaunch,
    input: &[T],
    output: &mut [T],
    value: T,
) {
    let span = launch.block_span(input.len());
    output[..input.len()]
        .par_chunks_mut(span)
        .zip(input.par_chunks(span))
        .for_each(|(out, inp)| {
            for (o, &i) in out.iter_mut().zip(inp) {
                *o = i * value;
            }
        });
}

pub(crate) fn translate<T: Element>(
    launch: &KernelLaunch,
    input: &[T],
    output: &mut [T],
    dims: Dims,
    shift: Shift,
) {
    let span = launch.block_span(input.len());
    output[..input.len()]
        .par_chunks_mut(span)
        .enumerate()
        .for_each(|(block, out)| {
            let base = block * span;
            for (i, o) in out.iter_mut().enumerate() {
                if let Some(src) = source_index(dims, base + i, shift) {
                    *o = input[src];
                }
            }
        });
}

pub(crate) fn center_fft<T: Element>(
    launch: &KernelLaunch,
    input: &[T],
    output: &mut [T],
    dims: Dims,
) {
    let span = launch.block_span(input.len());
    output[..input.len()]
        .par_chunks_mut(span)
        .enumerate()
        .for_each(|(block, out)| {
            let base = block * span;
            for (i, o) in out.iter_mut().enumerate() {
                *o = input[uncentered_index(dims, base + i)];
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::KernelLibrary;
    use crate::host::Host;
    use crate::launch::LaunchConfig;

    #[test]
    fn test_translate_gather_matches_scatter() {
        let dims = Dims::new_3d(7, 5, 3);
        let input: Vec<f32> = (0..dims.count()).map(|v| v as f32).collect();
        let launch = LaunchConfig::new(8).unwrap().describe(dims.count(), 0);
        let shift = Shift::from((2, -1, 1));
        let mut gathered = vec![-1.0f32; dims.count()];
        translate(&launch, &input, &mut gathered, dims, shift);
        let mut scattered = vec![-1.0f32; dims.count()];
        Host::translate(&launch, &input, &mut scattered, dims, shift);
        assert_eq!(gathered, scattered);
    }

    #[test]
    fn test_center_fft_matches_host() {
        let dims = Dims::new_2d(6, 5);
        let input: Vec<f64> = (0..30).map(f64::from).collect();
        let launch = LaunchConfig::new(4).unwrap().describe(30, 0);
        let mut accel = vec![0.0; 30];
        center_fft(&launch, &input, &mut accel, dims);
        let mut host = vec![0.0; 30];
        Host::center_fft(&launch, &input, &mut host, dims);
        assert_eq!(accel, host);
    }

    #[test]
    fn test_multiply_into_block_tail() {
        let launch = LaunchConfig::new(3).unwrap().describe(10, 0);
        let input: Vec<f32> = (0..10).map(|v| v as f32).collect();
        let mut out = vec![0.0f32; 12];
        multiply_into(&launch, &input, &mut out, 2.0);
        assert_eq!(out[9], 18.0);
        assert_eq!(out[10], 0.0);
    }
}
