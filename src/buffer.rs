//! Typed kernel buffers bound to a stream.
//!
//! An [`AccBuffer`] owns a contiguous array, an optional 2D/3D image shape and
//! the [`Stream`] that orders work on it. Storage is shared with in-flight
//! kernels through an `Arc`, so a dispatch call can return while the kernel
//! still runs on the stream's worker. Host-side access (`to_vec`,
//! `copy_from_slice`, `resize`) synchronizes the stream first.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::backend::{BackendKind, Residency};
use crate::error::{Error, Result};
use crate::stream::Stream;

/// Image/volume extents in elements. `z == 1` for 2D images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dims {
    /// Fastest-varying extent.
    pub x: usize,
    /// Row extent.
    pub y: usize,
    /// Slice extent.
    pub z: usize,
}

impl Dims {
    /// 2D image extents.
    #[must_use]
    pub const fn new_2d(x: usize, y: usize) -> Self {
        Self { x, y, z: 1 }
    }

    /// 3D volume extents.
    #[must_use]
    pub const fn new_3d(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    /// Number of elements covered.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.x * self.y * self.z
    }

    /// Whether the shape is a volume (more than one slice).
    #[must_use]
    pub const fn is_3d(&self) -> bool {
        self.z > 1
    }

    /// Integer center `(x/2, y/2, z/2)`.
    #[must_use]
    pub const fn center(&self) -> (i64, i64, i64) {
        ((self.x / 2) as i64, (self.y / 2) as i64, (self.z / 2) as i64)
    }

    /// Splits a linear index into `(x, y, z)` coordinates.
    #[inline]
    #[must_use]
    pub const fn coords(&self, index: usize) -> (usize, usize, usize) {
        let plane = self.x * self.y;
        let z = index / plane;
        let rem = index % plane;
        (rem % self.x, rem / self.x, z)
    }

    /// Linear index of `(x, y, z)`.
    #[inline]
    #[must_use]
    pub const fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (z * self.y + y) * self.x + x
    }

    fn validate(self, len: usize) -> Result<Self> {
        if self.x == 0 || self.y == 0 || self.z == 0 || self.count() != len {
            return Err(Error::InvalidDimensions {
                x: self.x,
                y: self.y,
                z: self.z,
                len,
            });
        }
        Ok(self)
    }
}

pub(crate) type Storage<T> = Arc<RwLock<Vec<T>>>;

/// Contiguous typed array resident where the compiled backend executes.
pub struct AccBuffer<T> {
    storage: Storage<T>,
    len: usize,
    dims: Option<Dims>,
    stream: Stream,
}

impl<T> std::fmt::Debug for AccBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccBuffer")
            .field("len", &self.len)
            .field("dims", &self.dims)
            .field("stream", &self.stream.id())
            .finish_non_exhaustive()
    }
}

impl<T> AccBuffer<T>
where
    T: Copy + Default + Send + Sync + 'static,
{
    /// Allocates `len` default-initialized elements bound to `stream`.
    #[must_use]
    pub fn new(len: usize, stream: &Stream) -> Self {
        Self::from_vec(vec![T::default(); len], stream)
    }

    /// Takes ownership of `data`.
    #[must_use]
    pub fn from_vec(data: Vec<T>, stream: &Stream) -> Self {
        Self {
            len: data.len(),
            storage: Arc::new(RwLock::new(data)),
            dims: None,
            stream: stream.clone(),
        }
    }

    /// Copies `data` into a new buffer.
    #[must_use]
    pub fn from_slice(data: &[T], stream: &Stream) -> Self {
        Self::from_vec(data.to_vec(), stream)
    }

    /// Allocates a default-initialized image of shape `dims`.
    ///
    /// # Errors
    ///
    /// Returns an error if any extent is zero.
    pub fn image(dims: Dims, stream: &Stream) -> Result<Self> {
        let dims = dims.validate(dims.count())?;
        let mut buffer = Self::new(dims.count(), stream);
        buffer.dims = Some(dims);
        Ok(buffer)
    }

    /// Wraps `data` as an image of shape `dims`.
    ///
    /// # Errors
    ///
    /// Returns an error if `data.len() != dims.count()` or any extent is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use trueno_acc::buffer::{AccBuffer, Dims};
    /// use trueno_acc::stream::Stream;
    ///
    /// let stream = Stream::new().unwrap();
    /// let img = AccBuffer::image_from_vec(vec![0.0f32; 12], Dims::new_2d(4, 3), &stream).unwrap();
    /// assert!(!img.is_3d());
    /// assert!(AccBuffer::image_from_vec(vec![0.0f32; 11], Dims::new_2d(4, 3), &stream).is_err());
    /// ```
    pub fn image_from_vec(data: Vec<T>, dims: Dims, stream: &Stream) -> Result<Self> {
        let dims = dims.validate(data.len())?;
        let mut buffer = Self::from_vec(data, stream);
        buffer.dims = Some(dims);
        Ok(buffer)
    }

    /// Number of elements.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.len
    }

    /// Whether the buffer holds no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Image shape, if the buffer is an image.
    #[must_use]
    pub const fn dims(&self) -> Option<Dims> {
        self.dims
    }

    /// Whether the buffer is a 3D volume.
    #[must_use]
    pub fn is_3d(&self) -> bool {
        self.dims.is_some_and(|d| d.is_3d())
    }

    /// Stream that orders work on this buffer.
    #[must_use]
    pub const fn stream(&self) -> &Stream {
        &self.stream
    }

    /// Memory the buffer lives in for the compiled backend.
    #[must_use]
    pub const fn residency(&self) -> Residency {
        BackendKind::selected().residency()
    }

    /// Copies the contents to a host vector after synchronizing the stream.
    pub fn to_vec(&self) -> Result<Vec<T>> {
        self.stream.synchronize()?;
        Ok(self.storage.read().clone())
    }

    /// Overwrites the contents from `data` after synchronizing the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if `data.len()` differs from the buffer size.
    pub fn copy_from_slice(&mut self, data: &[T]) -> Result<()> {
        if data.len() != self.len {
            return Err(Error::LengthMismatch {
                operation: "copy_from_slice",
                left: self.len,
                right: data.len(),
            });
        }
        self.stream.synchronize()?;
        self.storage.write().copy_from_slice(data);
        Ok(())
    }

    /// Enqueues a fill of every element with `value`.
    pub fn fill(&mut self, value: T) -> Result<()> {
        let storage = Arc::clone(&self.storage);
        self.stream.launch("fill", move || storage.write().fill(value))
    }

    /// Resizes the buffer on the host side, synchronizing the stream first.
    ///
    /// New elements are default-initialized. Image dimensions are dropped
    /// when they no longer match the size.
    pub fn resize(&mut self, new_len: usize) -> Result<()> {
        self.stream.synchronize()?;
        self.storage.write().resize(new_len, T::default());
        self.set_len(new_len);
        Ok(())
    }

    pub(crate) fn storage(&self) -> Storage<T> {
        Arc::clone(&self.storage)
    }

    pub(crate) fn set_len(&mut self, len: usize) {
        self.len = len;
        if self.dims.is_some_and(|d| d.count() != len) {
            self.dims = None;
        }
    }
}

/// Locks `src` for reading and `dst` for writing in address order, so jobs
/// on different streams that touch the same pair of buffers cannot deadlock.
pub(crate) fn lock_pair<'a, A, B>(
    src: &'a RwLock<Vec<A>>,
    dst: &'a RwLock<Vec<B>>,
) -> (RwLockReadGuard<'a, Vec<A>>, RwLockWriteGuard<'a, Vec<B>>) {
    let src_addr = (src as *const RwLock<Vec<A>>).cast::<()>() as usize;
    let dst_addr = (dst as *const RwLock<Vec<B>>).cast::<()>() as usize;
    if src_addr < dst_addr {
        let read = src.read();
        let write = dst.write();
        (read, write)
    } else {
        let write = dst.write();
        let read = src.read();
        (read, write)
    }
}
