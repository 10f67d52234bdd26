//! Triangle primitives (Möller–Trumbore).

use rcube_math::{Point3, Tolerance};

use super::Shape;
use crate::{Aabb3, Ray};

/// A triangle face. Centroid and bounds are computed once on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct TrianglePrimitive {
    id: usize,
    v0: Point3,
    v1: Point3,
    v2: Point3,
    centroid: Point3,
    aabb: Aabb3,
}

impl TrianglePrimitive {
    /// Create a triangle from its three vertices.
    pub fn new(id: usize, v0: Point3, v1: Point3, v2: Point3) -> Self {
        let centroid = Point3::from((v0.coords + v1.coords + v2.coords) / 3.0);
        let aabb = Aabb3::new(v0.inf(&v1).inf(&v2), v0.sup(&v1).sup(&v2));
        Self {
            id,
            v0,
            v1,
            v2,
            centroid,
            aabb,
        }
    }

    /// The three vertices in winding order.
    pub fn vertices(&self) -> [Point3; 3] {
        [self.v0, self.v1, self.v2]
    }
}

impl Shape for TrianglePrimitive {
    fn id(&self) -> usize {
        self.id
    }

    fn intersect_ray(&self, ray: &Ray) -> Option<f64> {
        let dir = ray.direction().as_ref();
        let e1 = self.v1 - self.v0;
        let e2 = self.v2 - self.v0;
        let pvec = dir.cross(&e2);
        let det = e1.dot(&pvec);

        // Ray parallel to the plane, or zero-area triangle.
        if det.abs() < Tolerance::DEFAULT.determinant {
            return None;
        }
        let inv_det = 1.0 / det;

        let tvec = ray.origin() - self.v0;
        let u = tvec.dot(&pvec) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let qvec = tvec.cross(&e1);
        let v = dir.dot(&qvec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = e2.dot(&qvec) * inv_det;
        ray.contains(t).then_some(t)
    }

    fn position(&self) -> Point3 {
        self.centroid
    }

    fn aabb(&self) -> Aabb3 {
        self.aabb
    }
}
