//! Point primitives, picked as small spheres.

use rcube_math::{Point3, Vec3};

use super::Shape;
use crate::{Aabb3, Ray};

/// A point with a pick radius. Rays intersect it as a sphere.
#[derive(Debug, Clone, PartialEq)]
pub struct PointPrimitive {
    id: usize,
    center: Point3,
    radius: f64,
    radius_sq: f64,
}

impl PointPrimitive {
    /// Create a point primitive centered at `center`.
    pub fn new(id: usize, center: Point3, radius: f64) -> Self {
        Self {
            id,
            center,
            radius,
            radius_sq: radius * radius,
        }
    }

    /// Center of the sphere.
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    /// Pick radius.
    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl Shape for PointPrimitive {
    fn id(&self) -> usize {
        self.id
    }

    /// Geometric ray-sphere test.
    ///
    /// Reports the nearer root that lies inside `[tmin, tmax]`. When the
    /// origin is inside the sphere that is the exit root; when the sphere is
    /// entirely behind the origin there is no hit.
    fn intersect_ray(&self, ray: &Ray) -> Option<f64> {
        if self.radius.is_nan() || self.radius <= 0.0 {
            return None;
        }

        let l = self.center - ray.origin();
        let tca = l.dot(ray.direction().as_ref());
        let d2 = l.dot(&l) - tca * tca;
        if d2 > self.radius_sq {
            return None;
        }

        let thc = (self.radius_sq - d2).max(0.0).sqrt();
        let t0 = tca - thc;
        let t1 = tca + thc;

        [t0, t1].into_iter().find(|&t| ray.contains(t))
    }

    fn position(&self) -> Point3 {
        self.center
    }

    fn aabb(&self) -> Aabb3 {
        let r = Vec3::repeat(self.radius.abs());
        Aabb3::new(self.center - r, self.center + r)
    }
}
