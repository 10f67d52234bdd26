#![warn(missing_docs)]

//! Math types for the rcube geometry crates.
//!
//! Thin wrappers around nalgebra providing the point, vector and
//! direction types used by ray picking, plus axis selection and the
//! tolerance constants shared by the intersection routines.

use nalgebra::{Unit, Vector3};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// One of the three coordinate axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// The X axis.
    X,
    /// The Y axis.
    Y,
    /// The Z axis.
    Z,
}

impl Axis {
    /// All three axes in index order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index of this axis (0, 1 or 2).
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Read this axis' component from a point.
    #[inline]
    pub fn of_point(self, p: &Point3) -> f64 {
        p.coords[self.index()]
    }

    /// Read this axis' component from a vector.
    #[inline]
    pub fn of_vec(self, v: &Vec3) -> f64 {
        v[self.index()]
    }
}

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance.
    pub linear: f64,
    /// Threshold below which a ray direction component counts as zero.
    pub direction: f64,
    /// Threshold on the Möller–Trumbore determinant below which a ray is
    /// treated as parallel to (or the triangle as degenerate).
    pub determinant: f64,
}

impl Tolerance {
    /// Default picking tolerances.
    pub const DEFAULT: Self = Self {
        linear: 1e-6,
        direction: 1e-12,
        determinant: 1e-6,
    };
}
