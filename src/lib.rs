//! # Trueno-Acc
//!
//! Accelerated array primitives for cryo-EM reconstruction kernels.
//!
//! One backend-agnostic dispatch layer over two kernel libraries: a
//! sequential host library and a grid-parallel accelerator library. The
//! library is chosen when the crate is built, and both produce the same
//! observable results (reductions within rounding error).
//!
//! ## Primitives
//!
//! - **Elementwise**: `multiply`, `multiply_into`, `translate`, `center_fft`
//! - **Reductions**: sum, min, max, argmin, argmax
//! - **Compaction**: order-preserving positive filter, sort, inclusive scan
//! - **Masks**: raised-cosine background statistics and filtering
//! - **Spectra**: radial power spectrum of half-complex images
//! - **Orientations**: 2D and ZYZ Euler rotation matrices
//!
//! ## Quick Start
//!
//! ```rust
//! use trueno_acc::prelude::*;
//! use trueno_acc::utilities;
//!
//! let stream = Stream::new()?;
//! let data = AccBuffer::from_slice(&[4.0f32, 1.0, 7.0, 1.0], &stream);
//!
//! let min = utilities::get_arg_min_on_device(&data)?;
//! assert_eq!((min.index, min.value), (1, 1.0));
//! # Ok::<(), trueno_acc::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `accel`: Dispatch to the grid-parallel accelerator library with
//!   asynchronous streams (rayon + crossbeam-channel). Without it the host
//!   library runs every kernel synchronously.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only - banned in production code
#![cfg_attr(test, allow(clippy::unwrap_used))]
// Index arithmetic converts freely between usize and i64
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Core Modules
// ============================================================================

/// Element types accepted by the kernels.
pub mod element;

/// Typed buffers and image dimensions.
pub mod buffer;

/// Ordering tokens for enqueued kernels.
pub mod stream;

/// Launch configuration and descriptors.
pub mod launch;

/// Per-element geometry shared by the kernel libraries.
pub mod geometry;

// ============================================================================
// Kernel Libraries
// ============================================================================

/// Kernel library interface and build-time selection.
pub mod backend;

/// Sequential host kernel library.
pub mod host;

/// Grid-parallel accelerator kernel library.
#[cfg(feature = "accel")]
#[cfg_attr(docsrs, doc(cfg(feature = "accel")))]
pub mod accel;

// ============================================================================
// Dispatch
// ============================================================================

mod contract;

/// Backend-agnostic dispatch facade.
pub mod utilities;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for trueno-acc operations.
pub mod error;

pub use error::{Error, ErrorKind, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and traits for convenient imports.
///
/// ```rust
/// use trueno_acc::prelude::*;
/// ```
pub mod prelude {
    pub use crate::backend::{ArgExtremum, BackendKind, KernelLibrary, Residency};
    pub use crate::buffer::{AccBuffer, Dims};
    pub use crate::element::{AccComplex, Element};
    pub use crate::error::{Error, Result};
    pub use crate::geometry::{CosineMask, Orientation, Shift, EULER_STRIDE};
    pub use crate::launch::LaunchConfig;
    pub use crate::stream::Stream;
    pub use crate::utilities::{AccUtilities, Background, Dispatch};
}

// ============================================================================
// Re-exports
// ============================================================================

/// Re-export trueno for direct access to SIMD operations.
pub use trueno;
