//! Primitive extraction from mesh buffers and a pickable mesh wrapper.
//!
//! Mesh geometry arrives as a flat `f32` position array
//! (`[x0, y0, z0, x1, y1, z1, ...]`) and an optional `u32` index array.
//! Without indices, consecutive vertex triples form the triangles.

use rcube_math::Point3;

use crate::bvh::{BuildConfig, Bvh, BvhBuilder};
use crate::error::{AccelError, Result};
use crate::{Primitive, Ray};

/// Number of complete vertices in a flat position array.
fn vertex_count(vertices: &[f32]) -> Result<usize> {
    if vertices.len() % 3 != 0 {
        return Err(AccelError::VertexArrayLength(vertices.len()));
    }
    Ok(vertices.len() / 3)
}

#[inline]
fn vertex(vertices: &[f32], i: usize) -> Point3 {
    Point3::new(
        vertices[i * 3] as f64,
        vertices[i * 3 + 1] as f64,
        vertices[i * 3 + 2] as f64,
    )
}

/// Build one triangle primitive per face.
///
/// Face `k` gets id `k`, so a hit maps straight back to the face index.
pub fn triangles_from_buffers(vertices: &[f32], indices: Option<&[u32]>) -> Result<Vec<Primitive>> {
    let num_vertices = vertex_count(vertices)?;

    match indices {
        Some(indices) => {
            if indices.len() % 3 != 0 {
                return Err(AccelError::IndexCountMismatch(indices.len()));
            }
            if let Some((position, &index)) = indices
                .iter()
                .enumerate()
                .find(|&(_, &index)| index as usize >= num_vertices)
            {
                return Err(AccelError::IndexOutOfRange {
                    index,
                    position,
                    vertex_count: num_vertices,
                });
            }

            Ok(indices
                .chunks_exact(3)
                .enumerate()
                .map(|(face, tri)| {
                    Primitive::triangle(
                        face,
                        vertex(vertices, tri[0] as usize),
                        vertex(vertices, tri[1] as usize),
                        vertex(vertices, tri[2] as usize),
                    )
                })
                .collect())
        }
        None => {
            if num_vertices % 3 != 0 {
                return Err(AccelError::IndexCountMismatch(num_vertices));
            }

            Ok((0..num_vertices / 3)
                .map(|face| {
                    Primitive::triangle(
                        face,
                        vertex(vertices, face * 3),
                        vertex(vertices, face * 3 + 1),
                        vertex(vertices, face * 3 + 2),
                    )
                })
                .collect())
        }
    }
}

/// Build one point primitive per vertex; vertex `k` gets id `k`.
pub fn points_from_buffers(vertices: &[f32], radius: f64) -> Result<Vec<Primitive>> {
    let num_vertices = vertex_count(vertices)?;
    Ok((0..num_vertices)
        .map(|i| Primitive::point(i, vertex(vertices, i), radius))
        .collect())
}

/// How a mesh's vertex data is interpreted for picking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeshKind {
    /// Triangles, indexed or from consecutive vertex triples.
    Triangles,
    /// Individual vertices picked as spheres of the given radius.
    Points {
        /// Pick radius around each vertex.
        radius: f64,
    },
}

/// Result of picking a mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    /// World-space hit point.
    pub point: Point3,
    /// Face index (triangles) or vertex index (points).
    pub id: usize,
}

/// Mesh geometry plus the BVH used to pick it.
///
/// The tree is never updated in place: [`PickableMesh::set_geometry`] drops
/// it and [`PickableMesh::update_bvh`] rebuilds it from the current buffers.
#[derive(Debug, Clone)]
pub struct PickableMesh {
    vertices: Vec<f32>,
    indices: Option<Vec<u32>>,
    kind: MeshKind,
    config: BuildConfig,
    bvh: Option<Bvh>,
}

impl PickableMesh {
    /// Create a mesh from buffers. No tree is built until [`update_bvh`](Self::update_bvh).
    pub fn new(vertices: Vec<f32>, indices: Option<Vec<u32>>, kind: MeshKind) -> Self {
        Self {
            vertices,
            indices,
            kind,
            config: BuildConfig::default(),
            bvh: None,
        }
    }

    /// Use a non-default build configuration for future rebuilds.
    pub fn with_build_config(mut self, config: BuildConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the geometry. The current tree is discarded.
    pub fn set_geometry(&mut self, vertices: Vec<f32>, indices: Option<Vec<u32>>) {
        self.vertices = vertices;
        self.indices = indices;
        self.bvh = None;
    }

    /// Flat vertex positions.
    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    /// Triangle indices, if the mesh is indexed.
    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    /// Picking interpretation of the vertex data.
    pub fn kind(&self) -> MeshKind {
        self.kind
    }

    /// The current tree, if one has been built since the last geometry change.
    pub fn bvh(&self) -> Option<&Bvh> {
        self.bvh.as_ref()
    }

    /// Rebuild the tree from scratch using the current buffers.
    #[tracing::instrument(skip_all, fields(vertices = self.vertices.len() / 3, kind = ?self.kind))]
    pub fn update_bvh(&mut self) -> Result<()> {
        let primitives = match self.kind {
            MeshKind::Triangles => triangles_from_buffers(&self.vertices, self.indices.as_deref())?,
            MeshKind::Points { radius } => points_from_buffers(&self.vertices, radius)?,
        };
        let bvh = BvhBuilder::new().config(self.config.clone()).build(primitives)?;
        self.bvh = Some(bvh);
        Ok(())
    }

    /// Pick the mesh with `ray`.
    ///
    /// Reports no hit if the tree has not been built.
    pub fn ray_intersect(&self, ray: &Ray) -> Option<PickHit> {
        let Some(bvh) = self.bvh.as_ref() else {
            tracing::warn!("ray_intersect called before update_bvh");
            return None;
        };
        bvh.intersect(ray).map(|hit| PickHit {
            point: hit.point,
            id: hit.id,
        })
    }
}
