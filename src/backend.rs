//! Kernel library interface and build-time backend selection.
//!
//! [`KernelLibrary`] is the contract both kernel libraries implement over
//! plain slices: [`Host`](crate::host::Host) (sequential, always compiled)
//! and, with the `accel` feature, [`Accelerator`](crate::accel::Accelerator)
//! (grid-parallel). [`Selected`] names the library the dispatch facade uses;
//! it is a type alias fixed at compile time, so dispatch is static and there
//! is no runtime switch.

use crate::buffer::Dims;
use crate::element::{AccComplex, Element};
use crate::geometry::{CosineMask, EulerAngles, Orientation, Shift};
use crate::launch::KernelLaunch;

/// Where buffer storage lives for a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Residency {
    /// General-purpose processor memory.
    Host,
    /// Accelerator memory.
    Device,
}

/// Kernel backend kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Sequential host kernels.
    Host,
    /// Grid-parallel accelerator kernels.
    Accelerator,
}

impl BackendKind {
    /// Backend compiled into the dispatch facade.
    #[must_use]
    pub const fn selected() -> Self {
        <Selected as KernelLibrary>::KIND
    }

    /// Memory the backend's buffers live in.
    #[must_use]
    pub const fn residency(&self) -> Residency {
        match self {
            Self::Host => Residency::Host,
            Self::Accelerator => Residency::Device,
        }
    }

    /// Whether dispatch calls return before the kernel completes.
    #[must_use]
    pub const fn is_asynchronous(&self) -> bool {
        matches!(self, Self::Accelerator)
    }

    /// Short backend name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Accelerator => "accel",
        }
    }
}

/// Kernel library compiled into the dispatch facade.
#[cfg(not(feature = "accel"))]
pub type Selected = crate::host::Host;

/// Kernel library compiled into the dispatch facade.
#[cfg(feature = "accel")]
pub type Selected = crate::accel::Accelerator;

/// Index and value of an extremal element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArgExtremum<T> {
    /// Lowest index holding the extremal value.
    pub index: usize,
    /// The extremal value.
    pub value: T,
}

/// Per-thread background accumulators produced by a soft-mask pass.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundPartials<T> {
    /// Sum of background weights per thread.
    pub weights: Vec<T>,
    /// Sum of weighted background values per thread.
    pub values: Vec<T>,
}

/// Radial power spectrum accumulated from one image.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerSpectrum<T> {
    /// Power per radial bin.
    pub bins: Vec<T>,
    /// Total power at or beyond the resolution limit.
    pub highres_xi2: T,
}

/// Replacement for voxels outside the mask.
#[derive(Debug, Clone, Copy)]
pub enum BackgroundFill<'a, T> {
    /// Constant background value.
    Value(T),
    /// Per-voxel noise, indexed like the volume.
    Noise(&'a [T]),
}

impl<T: Copy> BackgroundFill<'_, T> {
    #[inline]
    pub(crate) fn at(&self, index: usize) -> T {
        match self {
            Self::Value(v) => *v,
            Self::Noise(noise) => noise[index],
        }
    }
}

/// Primitive kernels over plain slices.
///
/// Callers uphold the slice-length preconditions documented per method;
/// the dispatch facade validates them before any kernel is enqueued.
pub trait KernelLibrary: Send + Sync + 'static {
    /// Which backend this library implements.
    const KIND: BackendKind;

    /// `data[i] *= value`.
    fn multiply<T: Element>(launch: &KernelLaunch, data: &mut [T], value: T);

    /// `output[i] = input[i] * value`. Requires `output.len() >= input.len()`.
    fn multiply_into<T: Element>(launch: &KernelLaunch, input: &[T], output: &mut [T], value: T);

    /// Copies `input[x, y, z]` to `output[x + dx, y + dy, z + dz]`. Destinations
    /// with no in-bounds source are left untouched. Requires
    /// `input.len() == dims.count() <= output.len()`.
    fn translate<T: Element>(
        launch: &KernelLaunch,
        input: &[T],
        output: &mut [T],
        dims: Dims,
        shift: Shift,
    );

    /// Wraparound shift of the origin to `dims.center()`. Same length
    /// requirements as [`KernelLibrary::translate`].
    fn center_fft<T: Element>(launch: &KernelLaunch, input: &[T], output: &mut [T], dims: Dims);

    /// Sum of all elements. Order of accumulation is backend-specific.
    fn sum<T: Element>(launch: &KernelLaunch, data: &[T]) -> T;

    /// Minimum. Requires a non-empty slice.
    fn min<T: Element>(launch: &KernelLaunch, data: &[T]) -> T;

    /// Maximum. Requires a non-empty slice.
    fn max<T: Element>(launch: &KernelLaunch, data: &[T]) -> T;

    /// First index of the minimum. Requires a non-empty slice.
    fn arg_min<T: Element>(launch: &KernelLaunch, data: &[T]) -> ArgExtremum<T>;

    /// First index of the maximum. Requires a non-empty slice.
    fn arg_max<T: Element>(launch: &KernelLaunch, data: &[T]) -> ArgExtremum<T>;

    /// Strictly positive elements in input order.
    fn filter_greater_zero<T: Element>(launch: &KernelLaunch, input: &[T]) -> Vec<T>;

    /// Ascending sort into `output[..input.len()]`.
    fn sort<T: Element>(launch: &KernelLaunch, input: &[T], output: &mut [T]);

    /// Inclusive prefix sum into `output[..input.len()]`.
    fn scan<T: Element>(launch: &KernelLaunch, input: &[T], output: &mut [T]);

    /// Background weights and weighted values outside the mask, one pair of
    /// accumulators per thread of a block (`launch.block_size` each).
    /// Requires `volume.len() == dims.count()`.
    fn soft_mask_background_value<T: Element>(
        launch: &KernelLaunch,
        volume: &[T],
        dims: Dims,
        mask: CosineMask<T>,
    ) -> BackgroundPartials<T>;

    /// Blends voxels outside the mask towards `background`.
    /// Requires `volume.len() == dims.count()` and, for noise, a noise slice
    /// at least as long.
    fn cosine_filter<T: Element>(
        launch: &KernelLaunch,
        volume: &mut [T],
        dims: Dims,
        mask: CosineMask<T>,
        background: BackgroundFill<'_, T>,
    );

    /// Radial power spectrum of a half-complex image of shape `dims`.
    fn power_class<T: Element>(
        launch: &KernelLaunch,
        image: &[AccComplex<T>],
        dims: Dims,
        spectrum_size: usize,
        res_limit: usize,
    ) -> PowerSpectrum<T>;

    /// One in-plane rotation matrix per angle, [`EULER_STRIDE`](crate::geometry::EULER_STRIDE)
    /// elements apart. Requires `eulers.len() >= 9 * alphas.len()`.
    fn make_eulers_2d<T: Element>(
        launch: &KernelLaunch,
        alphas: &[T],
        eulers: &mut [T],
        orientation: Orientation,
    );

    /// One ZYZ rotation matrix per angle triple. Requires equal angle slice
    /// lengths and `eulers.len() >= 9 * angles.len()`.
    fn make_eulers_3d<T: Element>(
        launch: &KernelLaunch,
        angles: EulerAngles<'_, T>,
        eulers: &mut [T],
        orientation: Orientation,
        perturbation: Option<&[T; 9]>,
    );
}
