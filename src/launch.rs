//! Launch configuration and per-dispatch launch descriptors.
//!
//! A [`LaunchConfig`] is the caller's hint for how work is decomposed on the
//! accelerator: threads per block, an optional fixed grid size and the shared
//! memory reservation. Each dispatch turns it into a [`KernelLaunch`] for the
//! amount of work at hand. The host backend ignores the decomposition except
//! where a kernel's output layout depends on the block size.

use crate::error::{Error, Result};

/// Default threads per block.
pub const DEFAULT_BLOCK_SIZE: usize = 128;

/// Largest supported threads per block.
pub const MAX_BLOCK_SIZE: usize = 1024;

/// Caller-supplied launch hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchConfig {
    block_size: usize,
    grid_size: Option<usize>,
    shared_mem_bytes: usize,
}

impl LaunchConfig {
    /// Creates a launch configuration with the given block size.
    ///
    /// # Errors
    ///
    /// Returns an error if `block_size` is zero or above [`MAX_BLOCK_SIZE`].
    ///
    /// # Example
    ///
    /// ```
    /// use trueno_acc::launch::LaunchConfig;
    ///
    /// let launch = LaunchConfig::new(256).unwrap();
    /// assert_eq!(launch.grid_size_for(1000), 4);
    /// ```
    pub fn new(block_size: usize) -> Result<Self> {
        if block_size == 0 || block_size > MAX_BLOCK_SIZE {
            return Err(Error::InvalidBlockSize {
                block_size,
                max: MAX_BLOCK_SIZE,
            });
        }
        Ok(Self {
            block_size,
            grid_size: None,
            shared_mem_bytes: 0,
        })
    }

    /// Fixes the number of blocks instead of deriving it from the work size.
    ///
    /// Threads then stride over the work when it exceeds `grid * block`.
    pub fn with_grid_size(mut self, grid_size: usize) -> Result<Self> {
        if grid_size == 0 {
            return Err(Error::InvalidGridSize);
        }
        self.grid_size = Some(grid_size);
        Ok(self)
    }

    /// Reserves shared memory per block.
    #[must_use]
    pub const fn with_shared_mem_bytes(mut self, bytes: usize) -> Self {
        self.shared_mem_bytes = bytes;
        self
    }

    /// Threads per block.
    #[must_use]
    pub const fn block_size(&self) -> usize {
        self.block_size
    }

    /// Explicit grid size, if one was set.
    #[must_use]
    pub const fn grid_size(&self) -> Option<usize> {
        self.grid_size
    }

    /// Shared memory reserved per block.
    #[must_use]
    pub const fn shared_mem_bytes(&self) -> usize {
        self.shared_mem_bytes
    }

    /// Number of blocks used for `work` items: the explicit grid size, or
    /// `ceil(work / block_size)`, never less than one.
    #[must_use]
    pub fn grid_size_for(&self, work: usize) -> usize {
        self.grid_size
            .unwrap_or_else(|| work.div_ceil(self.block_size))
            .max(1)
    }

    /// Builds the launch descriptor for `work` items on `stream`.
    #[must_use]
    pub fn describe(&self, work: usize, stream: u64) -> KernelLaunch {
        KernelLaunch {
            grid_size: self.grid_size_for(work),
            block_size: self.block_size,
            shared_mem_bytes: self.shared_mem_bytes,
            stream,
        }
    }
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            grid_size: None,
            shared_mem_bytes: 0,
        }
    }
}

/// Launch descriptor for one dispatch. Carries scheduling parameters only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelLaunch {
    /// Number of blocks.
    pub grid_size: usize,
    /// Threads per block.
    pub block_size: usize,
    /// Shared memory per block, in bytes.
    pub shared_mem_bytes: usize,
    /// Stream the launch is bound to.
    pub stream: u64,
}

impl KernelLaunch {
    /// Total threads in the launch.
    #[must_use]
    pub const fn threads(&self) -> usize {
        self.grid_size * self.block_size
    }

    /// Elements each block covers so that the grid spans `work` items.
    ///
    /// Always a non-zero multiple of the block size, so a thread's index
    /// within its block equals the element index modulo the block size.
    #[must_use]
    pub fn block_span(&self, work: usize) -> usize {
        let per_block = work.div_ceil(self.grid_size.max(1));
        per_block.div_ceil(self.block_size).max(1) * self.block_size
    }
}
