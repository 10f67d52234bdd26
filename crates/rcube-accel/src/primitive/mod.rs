//! Intersectable leaf geometry indexed by the BVH.
//!
//! Each primitive kind lives in its own submodule and implements [`Shape`].
//! [`Primitive`] is the closed sum of all kinds and is what the tree stores,
//! so the traversal dispatches with a `match` rather than a vtable.

mod point;
mod triangle;

pub use point::PointPrimitive;
pub use triangle::TrianglePrimitive;

use rcube_math::Point3;

use crate::{Aabb3, Ray};

/// The capability set every primitive kind provides.
pub trait Shape {
    /// Application-assigned id, returned verbatim on hit.
    fn id(&self) -> usize;

    /// Intersect a ray with this primitive.
    ///
    /// Returns the nearest hit parameter inside the ray's `[tmin, tmax]`
    /// interval, or `None` if there is none.
    fn intersect_ray(&self, ray: &Ray) -> Option<f64>;

    /// Representative point used to partition primitives during builds.
    fn position(&self) -> Point3;

    /// Tight bounding box.
    fn aabb(&self) -> Aabb3;
}

/// Index of a primitive inside a tree's primitive arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PrimitiveHandle(pub(crate) usize);

impl PrimitiveHandle {
    /// Position of the primitive in [`Bvh::primitives`](crate::Bvh::primitives).
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A point (sphere) or triangle primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// A point rendered with a pick radius.
    Point(PointPrimitive),
    /// A triangle face.
    Triangle(TrianglePrimitive),
}

impl Primitive {
    /// Create a point primitive.
    pub fn point(id: usize, center: Point3, radius: f64) -> Self {
        Primitive::Point(PointPrimitive::new(id, center, radius))
    }

    /// Create a triangle primitive.
    pub fn triangle(id: usize, v0: Point3, v1: Point3, v2: Point3) -> Self {
        Primitive::Triangle(TrianglePrimitive::new(id, v0, v1, v2))
    }
}

impl Shape for Primitive {
    #[inline]
    fn id(&self) -> usize {
        match self {
            Primitive::Point(p) => p.id(),
            Primitive::Triangle(t) => t.id(),
        }
    }

    #[inline]
    fn intersect_ray(&self, ray: &Ray) -> Option<f64> {
        match self {
            Primitive::Point(p) => p.intersect_ray(ray),
            Primitive::Triangle(t) => t.intersect_ray(ray),
        }
    }

    #[inline]
    fn position(&self) -> Point3 {
        match self {
            Primitive::Point(p) => p.position(),
            Primitive::Triangle(t) => t.position(),
        }
    }

    #[inline]
    fn aabb(&self) -> Aabb3 {
        match self {
            Primitive::Point(p) => p.aabb(),
            Primitive::Triangle(t) => t.aabb(),
        }
    }
}

impl From<PointPrimitive> for Primitive {
    fn from(p: PointPrimitive) -> Self {
        Primitive::Point(p)
    }
}

impl From<TrianglePrimitive> for Primitive {
    fn from(t: TrianglePrimitive) -> Self {
        Primitive::Triangle(t)
    }
}
