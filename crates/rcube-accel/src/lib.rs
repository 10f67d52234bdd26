#![warn(missing_docs)]

//! Ray picking acceleration for rcube meshes.
//!
//! This crate answers "which primitive does this ray hit first?" for the
//! points and triangles of a mesh without testing every primitive.
//!
//! # Architecture
//!
//! - [`Ray`] - Origin, unit direction and valid parameter interval
//! - [`Aabb3`] - Axis-aligned bounds with a ray-slab test
//! - [`primitive`] - Point (sphere) and triangle primitives
//! - [`bvh`] - Bounding volume hierarchy construction and nearest-hit queries
//! - [`mesh`] - Primitive extraction from vertex/index buffers and [`PickableMesh`]
//!
//! # Example
//!
//! ```
//! use rcube_accel::{build_bvh, Primitive, Ray};
//! use rcube_math::{Dir3, Point3, Vec3};
//!
//! let tri = Primitive::triangle(
//!     0,
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! );
//! let bvh = build_bvh(vec![tri]);
//!
//! let ray = Ray::new(Point3::new(0.25, 0.25, -1.0), Dir3::new_normalize(Vec3::z()));
//! let hit = bvh.intersect(&ray).unwrap();
//! assert_eq!(hit.id, 0);
//! assert!((hit.t - 1.0).abs() < 1e-12);
//! ```

mod aabb;
mod ray;
pub mod bvh;
pub mod error;
pub mod mesh;
pub mod primitive;

pub use aabb::Aabb3;
pub use bvh::{build_bvh, BuildConfig, Bvh, BvhBuilder, BvhNode, BvhStats, SplitMethod};
pub use error::{AccelError, Result};
pub use mesh::{points_from_buffers, triangles_from_buffers, MeshKind, PickHit, PickableMesh};
pub use primitive::{PointPrimitive, Primitive, PrimitiveHandle, Shape, TrianglePrimitive};
pub use ray::{Ray, RayHit};
