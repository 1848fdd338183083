//! Backend-agnostic dispatch facade.
//!
//! One operation per primitive. Every call validates its preconditions,
//! builds the [`KernelLaunch`] for the work at hand, and enqueues the kernel
//! of library `L` on the stream of the input buffer. Elementwise and image
//! operations return once the kernel is queued (immediately completed on the
//! host backend). Operations that hand a value back to the caller, such as
//! reductions and compaction, wait for their kernel.
//!
//! [`AccUtilities`] and the free functions of this module dispatch to the
//! library compiled in by the `accel` feature; [`Dispatch`] can be
//! instantiated with either library explicitly.
//!
//! # Example
//!
//! ```
//! use trueno_acc::prelude::*;
//! use trueno_acc::utilities;
//!
//! let stream = Stream::new().unwrap();
//! let input = AccBuffer::from_slice(&[-2.0f32, 3.0, 0.0, 5.0, -1.0], &stream);
//! let mut positive = AccBuffer::new(0, &stream);
//! let count = utilities::filter_greater_zero_on_device(&input, &mut positive).unwrap();
//! assert_eq!(count, 2);
//! assert_eq!(positive.to_vec().unwrap(), vec![3.0, 5.0]);
//! ```

use std::marker::PhantomData;

use crate::backend::{ArgExtremum, BackgroundFill, KernelLibrary, Selected};
use crate::buffer::{lock_pair, AccBuffer};
use crate::contract;
use crate::element::{AccComplex, Element};
use crate::error::Result;
use crate::geometry::{CosineMask, EulerAngles, Orientation, Shift, EULER_STRIDE};
use crate::launch::{KernelLaunch, LaunchConfig};
use crate::stream::Stream;

/// Background used by [`Dispatch::cosine_filter`] outside the mask.
#[derive(Debug, Clone, Copy)]
pub enum Background<'a, T> {
    /// Constant value, typically the mean from
    /// [`Dispatch::soft_mask_background_value`].
    Value(T),
    /// Per-voxel noise volume of the same size.
    Noise(&'a AccBuffer<T>),
}

/// Dispatch facade over kernel library `L`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dispatch<L>(PhantomData<L>);

/// Facade over the kernel library selected at build time.
pub type AccUtilities = Dispatch<Selected>;

impl<L: KernelLibrary> Dispatch<L> {
    fn describe(
        kernel: &'static str,
        config: &LaunchConfig,
        work: usize,
        stream: &Stream,
    ) -> KernelLaunch {
        let launch = config.describe(work, stream.id());
        tracing::debug!(
            kernel,
            backend = L::KIND.name(),
            grid = launch.grid_size,
            block = launch.block_size,
            shared_mem = launch.shared_mem_bytes,
            stream = launch.stream,
            work,
            "enqueue"
        );
        launch
    }

    /// Scales every element in place.
    pub fn multiply<T: Element>(buffer: &mut AccBuffer<T>, value: T, config: &LaunchConfig) -> Result<()> {
        let count = buffer.size();
        Self::multiply_count(buffer, value, count, config)
    }

    /// Scales the first `count` elements in place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferTooSmall`](crate::Error::BufferTooSmall) if
    /// `count` exceeds the buffer size.
    pub fn multiply_count<T: Element>(
        buffer: &mut AccBuffer<T>,
        value: T,
        count: usize,
        config: &LaunchConfig,
    ) -> Result<()> {
        contract::at_least("multiply", count, buffer.size())?;
        let launch = Self::describe("multiply", config, count, buffer.stream());
        let storage = buffer.storage();
        buffer.stream().launch("multiply", move || {
            L::multiply(&launch, &mut storage.write()[..count], value);
        })
    }

    /// `output[i] = input[i] * value`.
    pub fn multiply_into<T: Element>(
        input: &AccBuffer<T>,
        output: &mut AccBuffer<T>,
        value: T,
        config: &LaunchConfig,
    ) -> Result<()> {
        contract::at_least("multiply_into", input.size(), output.size())?;
        let launch = Self::describe("multiply_into", config, input.size(), input.stream());
        let (src, dst) = (input.storage(), output.storage());
        input.stream().launch("multiply_into", move || {
            let (src, mut dst) = lock_pair(&src, &dst);
            L::multiply_into(&launch, &src, &mut dst, value);
        })
    }

    /// Shifts an image by whole pixels into `output`.
    ///
    /// Input element `(x, y[, z])` is copied to `(x + dx, y + dy[, z + dz])`
    /// when that lies inside the image; output elements no source lands on
    /// keep their previous contents. `dz` is ignored for 2D images.
    ///
    /// # Errors
    ///
    /// Fails if `input` has no image dimensions or `output` is smaller than
    /// `input`.
    pub fn translate<T: Element>(
        input: &AccBuffer<T>,
        output: &mut AccBuffer<T>,
        shift: impl Into<Shift>,
        config: &LaunchConfig,
    ) -> Result<()> {
        let dims = contract::image_dims("translate", input)?;
        contract::at_least("translate", input.size(), output.size())?;
        let shift = shift.into();
        let launch = Self::describe("translate", config, input.size(), input.stream());
        let (src, dst) = (input.storage(), output.storage());
        input.stream().launch("translate", move || {
            let (src, mut dst) = lock_pair(&src, &dst);
            L::translate(&launch, &src, &mut dst, dims, shift);
        })
    }

    /// Wraparound shift that moves the origin to the image center.
    pub fn center_fft<T: Element>(
        input: &AccBuffer<T>,
        output: &mut AccBuffer<T>,
        config: &LaunchConfig,
    ) -> Result<()> {
        let dims = contract::image_dims("center_fft", input)?;
        contract::at_least("center_fft", input.size(), output.size())?;
        let launch = Self::describe("center_fft", config, input.size(), input.stream());
        let (src, dst) = (input.storage(), output.storage());
        input.stream().launch("center_fft", move || {
            let (src, mut dst) = lock_pair(&src, &dst);
            L::center_fft(&launch, &src, &mut dst, dims);
        })
    }

    fn reduce<T, R, F>(kernel: &'static str, buffer: &AccBuffer<T>, op: F) -> Result<R>
    where
        T: Element,
        R: Send + 'static,
        F: FnOnce(&KernelLaunch, &[T]) -> R + Send + 'static,
    {
        contract::non_empty(kernel, buffer.size())?;
        let launch = Self::describe(kernel, &LaunchConfig::default(), buffer.size(), buffer.stream());
        let storage = buffer.storage();
        buffer.stream().launch_with_result(kernel, move || {
            let data = storage.read();
            op(&launch, data.as_slice())
        })
    }

    /// Sum of all elements.
    ///
    /// Accumulation order differs between backends, so results agree within
    /// rounding error only.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyInput`](crate::Error::EmptyInput) for an empty
    /// buffer.
    pub fn get_sum_on_device<T: Element>(buffer: &AccBuffer<T>) -> Result<T> {
        Self::reduce("sum", buffer, |launch, data| L::sum(launch, data))
    }

    /// Smallest element. NaN handling is backend-specific.
    pub fn get_min_on_device<T: Element>(buffer: &AccBuffer<T>) -> Result<T> {
        Self::reduce("min", buffer, |launch, data| L::min(launch, data))
    }

    /// Largest element. NaN handling is backend-specific.
    pub fn get_max_on_device<T: Element>(buffer: &AccBuffer<T>) -> Result<T> {
        Self::reduce("max", buffer, |launch, data| L::max(launch, data))
    }

    /// Lowest index holding the minimum, with its value.
    pub fn get_arg_min_on_device<T: Element>(buffer: &AccBuffer<T>) -> Result<ArgExtremum<T>> {
        Self::reduce("arg_min", buffer, |launch, data| L::arg_min(launch, data))
    }

    /// Lowest index holding the maximum, with its value.
    pub fn get_arg_max_on_device<T: Element>(buffer: &AccBuffer<T>) -> Result<ArgExtremum<T>> {
        Self::reduce("arg_max", buffer, |launch, data| L::arg_max(launch, data))
    }

    /// Copies the strictly positive elements of `input` into `output` in
    /// their original order, resizes `output` to fit and returns the count.
    pub fn filter_greater_zero_on_device<T: Element>(
        input: &AccBuffer<T>,
        output: &mut AccBuffer<T>,
    ) -> Result<usize> {
        let launch = Self::describe(
            "filter_greater_zero",
            &LaunchConfig::default(),
            input.size(),
            input.stream(),
        );
        let (src, dst) = (input.storage(), output.storage());
        let count = input
            .stream()
            .launch_with_result("filter_greater_zero", move || {
                let kept = L::filter_greater_zero(&launch, &src.read());
                let count = kept.len();
                *dst.write() = kept;
                count
            })?;
        output.set_len(count);
        Ok(count)
    }

    /// Ascending sort of `input` into the front of `output`. NaNs sort last.
    pub fn sort_on_device<T: Element>(input: &AccBuffer<T>, output: &mut AccBuffer<T>) -> Result<()> {
        contract::at_least("sort", input.size(), output.size())?;
        let launch = Self::describe("sort", &LaunchConfig::default(), input.size(), input.stream());
        let (src, dst) = (input.storage(), output.storage());
        input.stream().launch("sort", move || {
            let (src, mut dst) = lock_pair(&src, &dst);
            L::sort(&launch, &src, &mut dst);
        })
    }

    /// Inclusive prefix sum of `input` into the front of `output`.
    pub fn scan_on_device<T: Element>(input: &AccBuffer<T>, output: &mut AccBuffer<T>) -> Result<()> {
        contract::at_least("scan", input.size(), output.size())?;
        let launch = Self::describe("scan", &LaunchConfig::default(), input.size(), input.stream());
        let (src, dst) = (input.storage(), output.storage());
        input.stream().launch("scan", move || {
            let (src, mut dst) = lock_pair(&src, &dst);
            L::scan(&launch, &src, &mut dst);
        })
    }

    /// Per-thread background statistics of `volume` outside `mask`.
    ///
    /// Slot `tid < block_size` of `sum_weights` is incremented by the summed
    /// background weight of the voxels handled by thread `tid`, and the same
    /// slot of `sum_values` by their weighted values. Slots past
    /// `block_size` are left alone. Zero both buffers before the first call
    /// and reduce them with [`Self::get_sum_on_device`] to get the
    /// background mean over every volume processed so far.
    ///
    /// # Errors
    ///
    /// Fails if `volume` has no image dimensions or either sum buffer holds
    /// fewer than `block_size` elements.
    pub fn soft_mask_background_value<T: Element>(
        volume: &AccBuffer<T>,
        mask: CosineMask<T>,
        sum_weights: &mut AccBuffer<T>,
        sum_values: &mut AccBuffer<T>,
        config: &LaunchConfig,
    ) -> Result<()> {
        let dims = contract::image_dims("soft_mask_background_value", volume)?;
        let block = config.block_size();
        contract::at_least("soft_mask_background_value", block, sum_weights.size())?;
        contract::at_least("soft_mask_background_value", block, sum_values.size())?;
        let launch = Self::describe("soft_mask_background_value", config, volume.size(), volume.stream());
        let src = volume.storage();
        let (weights, values) = (sum_weights.storage(), sum_values.storage());
        volume.stream().launch("soft_mask_background_value", move || {
            let partials = L::soft_mask_background_value(&launch, &src.read(), dims, mask);
            accumulate(&mut weights.write(), &partials.weights);
            accumulate(&mut values.write(), &partials.values);
        })
    }

    /// Blends voxels outside `mask` towards `background`, leaving the inner
    /// sphere untouched.
    pub fn cosine_filter<T: Element>(
        volume: &mut AccBuffer<T>,
        mask: CosineMask<T>,
        background: Background<'_, T>,
        config: &LaunchConfig,
    ) -> Result<()> {
        let dims = contract::image_dims("cosine_filter", volume)?;
        let launch = Self::describe("cosine_filter", config, volume.size(), volume.stream());
        let dst = volume.storage();
        match background {
            Background::Value(value) => volume.stream().launch("cosine_filter", move || {
                L::cosine_filter(&launch, &mut dst.write(), dims, mask, BackgroundFill::Value(value));
            }),
            Background::Noise(noise) => {
                contract::same_len("cosine_filter", volume.size(), noise.size())?;
                let noise = noise.storage();
                volume.stream().launch("cosine_filter", move || {
                    let (noise, mut dst) = lock_pair(&noise, &dst);
                    L::cosine_filter(&launch, &mut dst, dims, mask, BackgroundFill::Noise(&noise));
                })
            }
        }
    }

    /// Adds the radial power spectrum of a half-complex `image` to
    /// `spectrum`, one bin per element, and the power of all bins at or
    /// beyond `res_limit` to `highres_xi2[0]`.
    ///
    /// The image dimensions are the half-complex extents (`x = n / 2 + 1`).
    pub fn power_class<T: Element>(
        image: &AccBuffer<AccComplex<T>>,
        spectrum: &mut AccBuffer<T>,
        highres_xi2: &mut AccBuffer<T>,
        res_limit: usize,
        config: &LaunchConfig,
    ) -> Result<()> {
        let dims = contract::image_dims("power_class", image)?;
        contract::at_least("power_class", 1, highres_xi2.size())?;
        let spectrum_size = spectrum.size();
        let launch = Self::describe("power_class", config, image.size(), image.stream());
        let src = image.storage();
        let (bins, highres) = (spectrum.storage(), highres_xi2.storage());
        image.stream().launch("power_class", move || {
            let power = L::power_class(&launch, &src.read(), dims, spectrum_size, res_limit);
            accumulate(&mut bins.write(), &power.bins);
            let mut highres = highres.write();
            highres[0] = highres[0] + power.highres_xi2;
        })
    }

    /// Writes one in-plane rotation matrix per angle (degrees) into
    /// `eulers`, [`EULER_STRIDE`] elements apart.
    pub fn make_eulers_2d<T: Element>(
        alphas: &AccBuffer<T>,
        eulers: &mut AccBuffer<T>,
        orientation: Orientation,
        config: &LaunchConfig,
    ) -> Result<()> {
        let count = alphas.size();
        contract::at_least("make_eulers_2d", count * EULER_STRIDE, eulers.size())?;
        let launch = Self::describe("make_eulers_2d", config, count, alphas.stream());
        let (src, dst) = (alphas.storage(), eulers.storage());
        alphas.stream().launch("make_eulers_2d", move || {
            let (src, mut dst) = lock_pair(&src, &dst);
            L::make_eulers_2d(&launch, &src, &mut dst, orientation);
        })
    }

    /// Writes one ZYZ rotation matrix per angle triple (degrees) into
    /// `eulers`, [`EULER_STRIDE`] elements apart, optionally post-multiplied
    /// by `perturbation`.
    pub fn make_eulers_3d<T: Element>(
        alphas: &AccBuffer<T>,
        betas: &AccBuffer<T>,
        gammas: &AccBuffer<T>,
        eulers: &mut AccBuffer<T>,
        orientation: Orientation,
        perturbation: Option<[T; 9]>,
        config: &LaunchConfig,
    ) -> Result<()> {
        let count = alphas.size();
        contract::same_len("make_eulers_3d", count, betas.size())?;
        contract::same_len("make_eulers_3d", count, gammas.size())?;
        contract::at_least("make_eulers_3d", count * EULER_STRIDE, eulers.size())?;
        let launch = Self::describe("make_eulers_3d", config, count, alphas.stream());
        let (a, b, g) = (alphas.storage(), betas.storage(), gammas.storage());
        let dst = eulers.storage();
        alphas.stream().launch("make_eulers_3d", move || {
            // Angles are copied out so only one lock is held at a time.
            let (a, b, g) = (a.read().clone(), b.read().clone(), g.read().clone());
            let angles = EulerAngles {
                alphas: &a,
                betas: &b,
                gammas: &g,
            };
            L::make_eulers_3d(&launch, angles, &mut dst.write(), orientation, perturbation.as_ref());
        })
    }
}

fn accumulate<T: Element>(target: &mut [T], partials: &[T]) {
    for (slot, p) in target.iter_mut().zip(partials) {
        *slot = *slot + *p;
    }
}

// ============================================================================
// Free functions over the selected backend
// ============================================================================

/// See [`Dispatch::multiply`].
pub fn multiply<T: Element>(buffer: &mut AccBuffer<T>, value: T, config: &LaunchConfig) -> Result<()> {
    AccUtilities::multiply(buffer, value, config)
}

/// See [`Dispatch::multiply_count`].
pub fn multiply_count<T: Element>(
    buffer: &mut AccBuffer<T>,
    value: T,
    count: usize,
    config: &LaunchConfig,
) -> Result<()> {
    AccUtilities::multiply_count(buffer, value, count, config)
}

/// See [`Dispatch::multiply_into`].
pub fn multiply_into<T: Element>(
    input: &AccBuffer<T>,
    output: &mut AccBuffer<T>,
    value: T,
    config: &LaunchConfig,
) -> Result<()> {
    AccUtilities::multiply_into(input, output, value, config)
}

/// See [`Dispatch::translate`].
pub fn translate<T: Element>(
    input: &AccBuffer<T>,
    output: &mut AccBuffer<T>,
    shift: impl Into<Shift>,
    config: &LaunchConfig,
) -> Result<()> {
    AccUtilities::translate(input, output, shift, config)
}

/// See [`Dispatch::center_fft`].
pub fn center_fft<T: Element>(
    input: &AccBuffer<T>,
    output: &mut AccBuffer<T>,
    config: &LaunchConfig,
) -> Result<()> {
    AccUtilities::center_fft(input, output, config)
}

/// See [`Dispatch::get_sum_on_device`].
pub fn get_sum_on_device<T: Element>(buffer: &AccBuffer<T>) -> Result<T> {
    AccUtilities::get_sum_on_device(buffer)
}

/// See [`Dispatch::get_min_on_device`].
pub fn get_min_on_device<T: Element>(buffer: &AccBuffer<T>) -> Result<T> {
    AccUtilities::get_min_on_device(buffer)
}

/// See [`Dispatch::get_max_on_device`].
pub fn get_max_on_device<T: Element>(buffer: &AccBuffer<T>) -> Result<T> {
    AccUtilities::get_max_on_device(buffer)
}

/// See [`Dispatch::get_arg_min_on_device`].
pub fn get_arg_min_on_device<T: Element>(buffer: &AccBuffer<T>) -> Result<ArgExtremum<T>> {
    AccUtilities::get_arg_min_on_device(buffer)
}

/// See [`Dispatch::get_arg_max_on_device`].
pub fn get_arg_max_on_device<T: Element>(buffer: &AccBuffer<T>) -> Result<ArgExtremum<T>> {
    AccUtilities::get_arg_max_on_device(buffer)
}

/// See [`Dispatch::filter_greater_zero_on_device`].
pub fn filter_greater_zero_on_device<T: Element>(
    input: &AccBuffer<T>,
    output: &mut AccBuffer<T>,
) -> Result<usize> {
    AccUtilities::filter_greater_zero_on_device(input, output)
}

/// See [`Dispatch::sort_on_device`].
pub fn sort_on_device<T: Element>(input: &AccBuffer<T>, output: &mut AccBuffer<T>) -> Result<()> {
    AccUtilities::sort_on_device(input, output)
}

/// See [`Dispatch::scan_on_device`].
pub fn scan_on_device<T: Element>(input: &AccBuffer<T>, output: &mut AccBuffer<T>) -> Result<()> {
    AccUtilities::scan_on_device(input, output)
}

/// See [`Dispatch::soft_mask_background_value`].
pub fn soft_mask_background_value<T: Element>(
    volume: &AccBuffer<T>,
    mask: CosineMask<T>,
    sum_weights: &mut AccBuffer<T>,
    sum_values: &mut AccBuffer<T>,
    config: &LaunchConfig,
) -> Result<()> {
    AccUtilities::soft_mask_background_value(volume, mask, sum_weights, sum_values, config)
}

/// See [`Dispatch::cosine_filter`].
pub fn cosine_filter<T: Element>(
    volume: &mut AccBuffer<T>,
    mask: CosineMask<T>,
    background: Background<'_, T>,
    config: &LaunchConfig,
) -> Result<()> {
    AccUtilities::cosine_filter(volume, mask, background, config)
}

/// See [`Dispatch::power_class`].
pub fn power_class<T: Element>(
    image: &AccBuffer<AccComplex<T>>,
    spectrum: &mut AccBuffer<T>,
    highres_xi2: &mut AccBuffer<T>,
    res_limit: usize,
    config: &LaunchConfig,
) -> Result<()> {
    AccUtilities::power_class(image, spectrum, highres_xi2, res_limit, config)
}

/// See [`Dispatch::make_eulers_2d`].
pub fn make_eulers_2d<T: Element>(
    alphas: &AccBuffer<T>,
    eulers: &mut AccBuffer<T>,
    orientation: Orientation,
    config: &LaunchConfig,
) -> Result<()> {
    AccUtilities::make_eulers_2d(alphas, eulers, orientation, config)
}

/// See [`Dispatch::make_eulers_3d`].
pub fn make_eulers_3d<T: Element>(
    alphas: &AccBuffer<T>,
    betas: &AccBuffer<T>,
    gammas: &AccBuffer<T>,
    eulers: &mut AccBuffer<T>,
    orientation: Orientation,
    perturbation: Option<[T; 9]>,
    config: &LaunchConfig,
) -> Result<()> {
    AccUtilities::make_eulers_3d(alphas, betas, gammas, eulers, orientation, perturbation, config)
}
