//! Error types for trueno-acc operations.

use std::io;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller violated a kernel precondition. Nothing was enqueued.
    Contract,
    /// The execution substrate failed (worker spawn, closed stream, failed kernel).
    Resource,
}

/// Errors that can occur in trueno-acc operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A reduction was asked to run over zero elements.
    #[error("{operation}: input is empty")]
    EmptyInput {
        /// Operation that rejected the input.
        operation: &'static str,
    },

    /// A buffer is smaller than the operation requires.
    #[error("{operation}: buffer holds {actual} elements, {required} required")]
    BufferTooSmall {
        /// Operation that rejected the buffer.
        operation: &'static str,
        /// Minimum number of elements.
        required: usize,
        /// Number of elements the buffer holds.
        actual: usize,
    },

    /// Two inputs that must have equal length do not.
    #[error("{operation}: length mismatch ({left} vs {right})")]
    LengthMismatch {
        /// Operation that rejected the inputs.
        operation: &'static str,
        /// Length of the first input.
        left: usize,
        /// Length of the second input.
        right: usize,
    },

    /// An image operation was given a buffer without image dimensions.
    #[error("{operation}: buffer has no image dimensions")]
    MissingDimensions {
        /// Operation that rejected the buffer.
        operation: &'static str,
    },

    /// Image dimensions are zero or do not match the element count.
    #[error("Invalid dimensions: {x}x{y}x{z} for {len} elements")]
    InvalidDimensions {
        /// X extent.
        x: usize,
        /// Y extent.
        y: usize,
        /// Z extent.
        z: usize,
        /// Element count the dimensions were checked against.
        len: usize,
    },

    /// Block size outside the supported range.
    #[error("Invalid launch configuration: block size {block_size} (must be 1..={max})")]
    InvalidBlockSize {
        /// Requested block size.
        block_size: usize,
        /// Largest supported block size.
        max: usize,
    },

    /// Explicit grid size of zero.
    #[error("Invalid launch configuration: grid size must be non-zero")]
    InvalidGridSize,

    /// The stream worker thread could not be started.
    #[error("failed to start stream worker: {0}")]
    StreamSpawn(#[from] io::Error),

    /// The stream no longer accepts work.
    #[error("stream {0} is closed")]
    StreamClosed(u64),

    /// A kernel panicked while executing on a stream.
    #[error("kernel '{kernel}' failed on stream {stream}")]
    KernelFailed {
        /// Name of the kernel that failed.
        kernel: &'static str,
        /// Stream the kernel was enqueued on.
        stream: u64,
    },
}

impl Error {
    /// Classifies the error as a contract violation or a resource failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyInput { .. }
            | Self::BufferTooSmall { .. }
            | Self::LengthMismatch { .. }
            | Self::MissingDimensions { .. }
            | Self::InvalidDimensions { .. }
            | Self::InvalidBlockSize { .. }
            | Self::InvalidGridSize => ErrorKind::Contract,
            Self::StreamSpawn(_) | Self::StreamClosed(_) | Self::KernelFailed { .. } => {
                ErrorKind::Resource
            }
        }
    }
}
