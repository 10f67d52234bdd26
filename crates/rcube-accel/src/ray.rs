//! Ray representation and hit records.

use rcube_math::{Dir3, Point3, Tolerance};

use crate::primitive::PrimitiveHandle;

/// A half-line in 3D space with a valid parameter interval `[tmin, tmax]`.
///
/// Rays are immutable once constructed. The direction is a [`Dir3`], so the
/// caller is responsible for normalizing it; the ray never renormalizes.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    origin: Point3,
    direction: Dir3,
    tmin: f64,
    tmax: f64,
}

impl Ray {
    /// Smallest accepted hit parameter for rays built with [`Ray::new`].
    pub const DEFAULT_TMIN: f64 = Tolerance::DEFAULT.linear;

    /// Create a ray with the default interval `[DEFAULT_TMIN, +inf)`.
    pub fn new(origin: Point3, direction: Dir3) -> Self {
        Self::with_interval(origin, direction, Self::DEFAULT_TMIN, f64::INFINITY)
    }

    /// Create a ray that only accepts hits with `tmin <= t <= tmax`.
    pub fn with_interval(origin: Point3, direction: Dir3, tmin: f64, tmax: f64) -> Self {
        debug_assert!(tmin <= tmax, "ray interval is inverted: [{tmin}, {tmax}]");
        Self {
            origin,
            direction,
            tmin,
            tmax,
        }
    }

    /// Origin point of the ray.
    #[inline]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Unit direction of the ray.
    #[inline]
    pub fn direction(&self) -> &Dir3 {
        &self.direction
    }

    /// Lower bound of the valid hit interval.
    #[inline]
    pub fn tmin(&self) -> f64 {
        self.tmin
    }

    /// Upper bound of the valid hit interval.
    #[inline]
    pub fn tmax(&self) -> f64 {
        self.tmax
    }

    /// Whether `t` lies inside `[tmin, tmax]`.
    #[inline]
    pub fn contains(&self, t: f64) -> bool {
        t >= self.tmin && t <= self.tmax
    }

    /// Evaluate the ray at parameter `t`: `origin + t * direction`.
    #[inline]
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + t * self.direction.as_ref()
    }
}

/// Result of a successful ray query against a [`Bvh`](crate::Bvh).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Parameter along the ray where the intersection occurs.
    pub t: f64,
    /// World-space intersection point.
    pub point: Point3,
    /// Application id of the primitive that was hit.
    pub id: usize,
    /// Arena handle of the primitive that was hit.
    pub handle: PrimitiveHandle,
}
