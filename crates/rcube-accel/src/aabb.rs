//! Axis-aligned bounding boxes and the ray-slab test.

use rcube_math::{Axis, Point3, Tolerance, Vec3};

use crate::Ray;

/// Relative widening applied to a slab exit parameter so that grazing hits
/// accepted by the primitive tests are not culled by rounding.
const EXIT_SLACK: f64 = 4.0 * f64::EPSILON;

/// Axis-aligned bounding box.
///
/// A box with `min == max` on some or all axes is valid (flat or point-like).
/// [`Aabb3::empty`] returns an inverted box that acts as the identity for
/// [`Aabb3::merge`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb3 {
    /// Create an AABB from min and max corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Create an empty (inverted) AABB suitable for expansion.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// True if the box contains no points (any axis inverted).
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand this AABB to include a point.
    pub fn include_point(&mut self, p: &Point3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Expand this AABB to include another box.
    pub fn include_aabb(&mut self, other: &Aabb3) {
        *self = Self::merge(self, other);
    }

    /// Smallest box containing both `a` and `b`.
    pub fn merge(a: &Aabb3, b: &Aabb3) -> Aabb3 {
        Aabb3 {
            min: a.min.inf(&b.min),
            max: a.max.sup(&b.max),
        }
    }

    /// Method form of [`Aabb3::merge`].
    pub fn union(&self, other: &Aabb3) -> Aabb3 {
        Self::merge(self, other)
    }

    /// True if `other` lies entirely inside this box (faces may touch).
    pub fn contains(&self, other: &Aabb3) -> bool {
        other.is_empty()
            || (self.min.x <= other.min.x
                && self.min.y <= other.min.y
                && self.min.z <= other.min.z
                && self.max.x >= other.max.x
                && self.max.y >= other.max.y
                && self.max.z >= other.max.z)
    }

    /// Center of the box.
    pub fn centroid(&self) -> Point3 {
        Point3::from((self.min.coords + self.max.coords) * 0.5)
    }

    /// Edge lengths along each axis. Zero for an empty box.
    pub fn extent(&self) -> Vec3 {
        if self.is_empty() {
            return Vec3::zeros();
        }
        self.max - self.min
    }

    /// Total surface area of the box.
    pub fn surface_area(&self) -> f64 {
        let d = self.extent();
        2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
    }

    /// The axis along which the box is widest. Ties prefer the lower axis.
    pub fn largest_axis(&self) -> Axis {
        let d = self.extent();
        if d.x >= d.y && d.x >= d.z {
            Axis::X
        } else if d.y >= d.z {
            Axis::Y
        } else {
            Axis::Z
        }
    }

    /// Test ray-AABB intersection using the slab method.
    ///
    /// Returns `Some((t_enter, t_exit))` clipped to the ray's `[tmin, tmax]`
    /// interval, or `None` if the ray misses the box or only meets it outside
    /// that interval. Axes on which the ray direction is effectively zero
    /// are handled without dividing: the origin must already lie within the
    /// slab on that axis.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<(f64, f64)> {
        if self.is_empty() {
            return None;
        }

        let origin = ray.origin();
        let dir = ray.direction().as_ref();
        let mut t_enter = ray.tmin();
        let mut t_exit = ray.tmax();

        for axis in Axis::ALL {
            let o = axis.of_point(origin);
            let d = axis.of_vec(dir);
            let lo = axis.of_point(&self.min);
            let hi = axis.of_point(&self.max);

            if d.abs() < Tolerance::DEFAULT.direction {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t0 = (lo - o) * inv;
            let mut t1 = (hi - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t1 += t1.abs() * EXIT_SLACK;

            t_enter = t_enter.max(t0);
            t_exit = t_exit.min(t1);
            if t_enter > t_exit {
                return None;
            }
        }

        Some((t_enter, t_exit))
    }
}

impl Default for Aabb3 {
    fn default() -> Self {
        Self::empty()
    }
}
