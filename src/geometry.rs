//! Per-element geometry shared by both kernel libraries.
//!
//! Everything a kernel computes for a single element (source pixel of a
//! shift, mask weight of a voxel, spectrum bin of a Fourier component,
//! rotation matrix of an orientation) lives here, so host and accelerator
//! produce bit-identical per-element values and differ only in how they
//! schedule and accumulate them.

use crate::buffer::Dims;
use crate::element::Element;

/// Elements per rotation matrix in an Euler output array.
///
/// 2D matrices are embedded in the upper-left corner of a 3x3 matrix.
pub const EULER_STRIDE: usize = 9;

/// Integer image shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Shift {
    /// Shift along x.
    pub dx: i32,
    /// Shift along y.
    pub dy: i32,
    /// Shift along z. Ignored for 2D images.
    pub dz: i32,
}

impl From<(i32, i32)> for Shift {
    fn from((dx, dy): (i32, i32)) -> Self {
        Self { dx, dy, dz: 0 }
    }
}

impl From<(i32, i32, i32)> for Shift {
    fn from((dx, dy, dz): (i32, i32, i32)) -> Self {
        Self { dx, dy, dz }
    }
}

/// Output element written from input element `index` when shifting by
/// `shift`, or `None` when the destination falls outside the image.
#[inline]
pub(crate) fn shifted_index(dims: Dims, index: usize, shift: Shift) -> Option<usize> {
    let (x, y, z) = dims.coords(index);
    let xp = x as i64 + i64::from(shift.dx);
    let yp = y as i64 + i64::from(shift.dy);
    let zp = if dims.is_3d() {
        z as i64 + i64::from(shift.dz)
    } else {
        z as i64
    };
    let in_bounds = (0..dims.x as i64).contains(&xp)
        && (0..dims.y as i64).contains(&yp)
        && (0..dims.z as i64).contains(&zp);
    in_bounds.then(|| dims.index(xp as usize, yp as usize, zp as usize))
}

/// Input element that lands on output element `index` when shifting by
/// `shift`; the inverse of [`shifted_index`].
#[inline]
pub(crate) fn source_index(dims: Dims, index: usize, shift: Shift) -> Option<usize> {
    let inverse = Shift {
        dx: -shift.dx,
        dy: -shift.dy,
        dz: -shift.dz,
    };
    shifted_index(dims, index, inverse)
}

/// Wraparound shift that moves the origin to the image center.
#[inline]
pub(crate) fn centered_index(dims: Dims, index: usize) -> usize {
    let (x, y, z) = dims.coords(index);
    let (cx, cy, cz) = dims.center();
    let xp = (x + cx as usize) % dims.x;
    let yp = (y + cy as usize) % dims.y;
    let zp = (z + cz as usize) % dims.z;
    dims.index(xp, yp, zp)
}

/// Input element that [`centered_index`] moves onto output element `index`.
#[inline]
pub(crate) fn uncentered_index(dims: Dims, index: usize) -> usize {
    let (x, y, z) = dims.coords(index);
    let (cx, cy, cz) = dims.center();
    let xp = (x + dims.x - cx as usize) % dims.x;
    let yp = (y + dims.y - cy as usize) % dims.y;
    let zp = (z + dims.z - cz as usize) % dims.z;
    dims.index(xp, yp, zp)
}

/// Raised-cosine soft edge between `radius` and `radius + cosine_width`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CosineMask<T> {
    /// Radius of the untouched inner sphere, in voxels.
    pub radius: T,
    /// Width of the cosine taper, in voxels.
    pub cosine_width: T,
}

impl<T: Element> CosineMask<T> {
    /// Creates a mask with the given inner radius and taper width.
    #[must_use]
    pub const fn new(radius: T, cosine_width: T) -> Self {
        Self {
            radius,
            cosine_width,
        }
    }

    /// Radius beyond which voxels are pure background.
    #[must_use]
    pub fn outer_radius(&self) -> T {
        self.radius + self.cosine_width
    }

    /// Background weight at distance `r` from the center: `None` inside the
    /// inner sphere, `1` beyond the outer radius and a raised cosine rising
    /// from 0 to 1 across the taper.
    #[inline]
    #[must_use]
    pub fn background_weight(&self, r: T) -> Option<T> {
        let radius_p = self.outer_radius();
        if r < self.radius {
            None
        } else if r > radius_p {
            Some(T::one())
        } else {
            let half = T::from_f64_lossy(0.5);
            Some(half + half * (T::PI() * (radius_p - r) / self.cosine_width).cos())
        }
    }
}

/// Distance of voxel `index` from the volume center.
///
/// For single-slice images the z term is dropped entirely.
#[inline]
pub(crate) fn center_distance<T: Element>(dims: Dims, index: usize) -> T {
    let (x, y, z) = dims.coords(index);
    let (cx, cy, cz) = dims.center();
    let dx = x as i64 - cx;
    let dy = y as i64 - cy;
    let dz = if dims.is_3d() { z as i64 - cz } else { 0 };
    T::from_f64_lossy((dx * dx + dy * dy + dz * dz) as f64).sqrt()
}

/// Radial spectrum bin of half-complex element `index`, or `None` when the
/// element is the DC term, beyond the spectrum, or a redundant Friedel mate.
#[inline]
pub(crate) fn power_bin(dims: Dims, index: usize, spectrum_size: usize) -> Option<usize> {
    let (x, y, z) = dims.coords(index);
    let (x, y, z) = (x as i64, y as i64, z as i64);
    let half = dims.x as i64;
    let y = if y < half { y } else { y - dims.y as i64 };
    let (d, in_range) = if dims.is_3d() {
        let z = if z < half { z } else { z - dims.z as i64 };
        (x * x + y * y + z * z, !(x == 0 && y < 0 && z < 0))
    } else {
        (x * x + y * y, !(x == 0 && y < 0))
    };
    let bin = (d as f64).sqrt().round() as usize;
    (bin > 0 && bin < spectrum_size && in_range).then_some(bin)
}

/// Whether a rotation matrix is written as computed or transposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Matrix as composed from the angles.
    #[default]
    Normal,
    /// Transposed (inverse) matrix.
    Inverted,
}

/// Per-orientation Euler angles in degrees.
#[derive(Debug, Clone, Copy)]
pub struct EulerAngles<'a, T> {
    /// First rotation (about z).
    pub alphas: &'a [T],
    /// Tilt (about y).
    pub betas: &'a [T],
    /// In-plane rotation (about z).
    pub gammas: &'a [T],
}

impl<T> EulerAngles<'_, T> {
    /// Number of orientations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.alphas.len()
    }

    /// Whether there are no orientations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alphas.is_empty()
    }
}

#[inline]
fn radians<T: Element>(degrees: T) -> T {
    degrees * T::PI() / T::from_f64_lossy(180.0)
}

#[inline]
fn transpose<T: Copy>(m: [T; 9]) -> [T; 9] {
    [m[0], m[3], m[6], m[1], m[4], m[7], m[2], m[5], m[8]]
}

/// In-plane rotation by `alpha` degrees, embedded in a 3x3 matrix.
#[must_use]
pub fn euler_matrix_2d<T: Element>(alpha: T, orientation: Orientation) -> [T; 9] {
    let (sa, ca) = radians(alpha).sin_cos();
    let (zero, one) = (T::zero(), T::one());
    let m = [ca, sa, zero, -sa, ca, zero, zero, zero, one];
    match orientation {
        Orientation::Normal => m,
        Orientation::Inverted => transpose(m),
    }
}

/// ZYZ Euler rotation, optionally post-multiplied by a fixed perturbation.
#[must_use]
pub fn euler_matrix_3d<T: Element>(
    alpha: T,
    beta: T,
    gamma: T,
    orientation: Orientation,
    perturbation: Option<&[T; 9]>,
) -> [T; 9] {
    let (sa, ca) = radians(alpha).sin_cos();
    let (sb, cb) = radians(beta).sin_cos();
    let (sg, cg) = radians(gamma).sin_cos();

    let cc = cb * ca;
    let cs = cb * sa;
    let sc = sb * ca;
    let ss = sb * sa;

    let a = [
        cg * cc - sg * sa,
        cg * cs + sg * ca,
        -cg * sb,
        -sg * cc - cg * sa,
        -sg * cs + cg * ca,
        sg * sb,
        sc,
        ss,
        cb,
    ];

    let b = match perturbation {
        Some(r) => {
            let mut b = [T::zero(); 9];
            for i in 0..3 {
                for j in 0..3 {
                    for k in 0..3 {
                        b[i * 3 + j] = b[i * 3 + j] + a[i * 3 + k] * r[k * 3 + j];
                    }
                }
            }
            b
        }
        None => a,
    };

    match orientation {
        Orientation::Normal => b,
        Orientation::Inverted => transpose(b),
    }
}
