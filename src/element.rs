//! Element types accepted by the kernels.
//!
//! Kernels are generic over [`Element`], implemented for `f32` and `f64`.
//! The `f32` host reductions go through trueno's SIMD `Vector`, which picks
//! the best instruction set (SSE2/AVX2/AVX-512/NEON) at runtime.

use std::cmp::Ordering;
use std::fmt::Debug;

use num_traits::{Float, FloatConst};
use trueno::Vector;

/// Complex pixel type used by Fourier-space kernels.
pub type AccComplex<T> = num_complex::Complex<T>;

/// Floating-point element type for kernel buffers.
pub trait Element: Float + FloatConst + Default + Debug + Send + Sync + 'static {
    /// Converts an `f64` constant into this type, rounding if necessary.
    fn from_f64_lossy(value: f64) -> Self;

    /// IEEE 754 total ordering. NaNs sort after every other value.
    fn total_order(&self, other: &Self) -> Ordering;

    /// Sequential host sum.
    ///
    /// Four independent accumulators keep the loop vectorizable.
    fn host_sum(values: &[Self]) -> Self {
        let mut acc = [Self::zero(); 4];
        let mut chunks = values.chunks_exact(4);
        for chunk in &mut chunks {
            acc[0] = acc[0] + chunk[0];
            acc[1] = acc[1] + chunk[1];
            acc[2] = acc[2] + chunk[2];
            acc[3] = acc[3] + chunk[3];
        }
        let mut sum = (acc[0] + acc[1]) + (acc[2] + acc[3]);
        for &v in chunks.remainder() {
            sum = sum + v;
        }
        sum
    }

    /// Host minimum. The caller guarantees `values` is non-empty.
    fn host_min(values: &[Self]) -> Self {
        let mut min = values[0];
        for &v in &values[1..] {
            if v < min {
                min = v;
            }
        }
        min
    }

    /// Host maximum. The caller guarantees `values` is non-empty.
    fn host_max(values: &[Self]) -> Self {
        let mut max = values[0];
        for &v in &values[1..] {
            if v > max {
                max = v;
            }
        }
        max
    }
}

impl Element for f32 {
    #[inline]
    fn from_f64_lossy(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn total_order(&self, other: &Self) -> Ordering {
        f32::total_cmp(self, other)
    }

    fn host_sum(values: &[Self]) -> Self {
        if values.is_empty() {
            return 0.0;
        }
        Vector::from_slice(values).sum().unwrap_or(0.0)
    }

    fn host_min(values: &[Self]) -> Self {
        Vector::from_slice(values).min().unwrap_or(f32::NAN)
    }

    fn host_max(values: &[Self]) -> Self {
        Vector::from_slice(values).max().unwrap_or(f32::NAN)
    }
}

impl Element for f64 {
    #[inline]
    fn from_f64_lossy(value: f64) -> Self {
        value
    }

    #[inline]
    fn total_order(&self, other: &Self) -> Ordering {
        f64::total_cmp(self, other)
    }
}
