//! Bounding Volume Hierarchy for accelerated ray picking.
//!
//! The tree is built once from a primitive arena (see [`build_bvh`]) and is
//! immutable afterwards. A geometry change means building a new tree.

mod build;

pub use build::{build_bvh, BuildConfig, BvhBuilder, SplitMethod};

use std::sync::Arc;

use rayon::prelude::*;

use crate::primitive::{Primitive, PrimitiveHandle, Shape};
use crate::{Aabb3, Ray, RayHit};

/// A BVH node - either a leaf containing primitives or an internal node with children.
#[derive(Debug, Clone)]
pub enum BvhNode {
    /// Leaf node referencing primitives in the tree's arena.
    Leaf {
        /// Axis-aligned bounding box of this node.
        aabb: Aabb3,
        /// Handles of the primitives contained in this leaf.
        primitives: Vec<PrimitiveHandle>,
    },
    /// Internal node with two children.
    Internal {
        /// Axis-aligned bounding box of this node.
        aabb: Aabb3,
        /// Left child node.
        left: Box<BvhNode>,
        /// Right child node.
        right: Box<BvhNode>,
    },
}

impl BvhNode {
    /// Bounding box of everything below this node.
    #[inline]
    pub fn aabb(&self) -> &Aabb3 {
        match self {
            BvhNode::Leaf { aabb, .. } | BvhNode::Internal { aabb, .. } => aabb,
        }
    }

    /// True for leaf nodes.
    pub fn is_leaf(&self) -> bool {
        matches!(self, BvhNode::Leaf { .. })
    }
}

/// Shape summary of a built tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BvhStats {
    /// Total number of nodes.
    pub nodes: usize,
    /// Number of leaf nodes.
    pub leaves: usize,
    /// Number of nodes on the longest root-to-leaf path (0 for an empty tree).
    pub depth: usize,
    /// Largest number of primitives stored in a single leaf.
    pub max_leaf_primitives: usize,
}

/// Bounding Volume Hierarchy over a shared primitive arena.
///
/// Queries take `&self`, so one tree can serve any number of threads.
#[derive(Debug, Clone)]
pub struct Bvh {
    root: Option<BvhNode>,
    primitives: Arc<[Primitive]>,
}

impl Bvh {
    /// A tree with no primitives. Every query misses.
    pub fn empty() -> Self {
        Self {
            root: None,
            primitives: Arc::from(Vec::new()),
        }
    }

    pub(crate) fn from_parts(root: Option<BvhNode>, primitives: Arc<[Primitive]>) -> Self {
        Self { root, primitives }
    }

    /// Find the nearest primitive hit by `ray`.
    pub fn intersect(&self, ray: &Ray) -> Option<RayHit> {
        let root = self.root.as_ref()?;
        root.aabb().intersect_ray(ray)?;

        let mut closest: Option<PrimitiveHandle> = None;
        let mut closest_t = f64::INFINITY;
        self.intersect_node_closest(ray, root, &mut closest, &mut closest_t);

        closest.map(|handle| self.make_hit(ray, handle, closest_t))
    }

    /// Every primitive hit by `ray`, sorted by `t`.
    ///
    /// Each primitive contributes at most one hit (its nearest in-range
    /// parameter).
    pub fn intersect_all(&self, ray: &Ray) -> Vec<RayHit> {
        let mut hits = Vec::new();

        if let Some(ref root) = self.root {
            self.intersect_node_all(ray, root, &mut hits);
        }

        hits.sort_by(|a, b| a.t.total_cmp(&b.t));
        hits
    }

    /// Run [`Bvh::intersect`] for many rays in parallel.
    ///
    /// Results are returned in the order of `rays`.
    pub fn intersect_batch(&self, rays: &[Ray]) -> Vec<Option<RayHit>> {
        rays.par_iter().map(|ray| self.intersect(ray)).collect()
    }

    fn intersect_node_closest(
        &self,
        ray: &Ray,
        node: &BvhNode,
        closest: &mut Option<PrimitiveHandle>,
        closest_t: &mut f64,
    ) {
        match node {
            BvhNode::Leaf { primitives, .. } => {
                for &handle in primitives {
                    if let Some(t) = self.primitives[handle.index()].intersect_ray(ray) {
                        if t < *closest_t {
                            *closest_t = t;
                            *closest = Some(handle);
                        }
                    }
                }
            }
            BvhNode::Internal { left, right, .. } => {
                let left_t = left.aabb().intersect_ray(ray).map(|(t, _)| t);
                let right_t = right.aabb().intersect_ray(ray).map(|(t, _)| t);

                // Visit the nearer child first so the farther one can be
                // pruned against its result.
                let mut order = [(left.as_ref(), left_t), (right.as_ref(), right_t)];
                if let (Some(lt), Some(rt)) = (left_t, right_t) {
                    if rt < lt {
                        order.swap(0, 1);
                    }
                }

                for (child, entry) in order {
                    match entry {
                        Some(t) if t < *closest_t => {
                            self.intersect_node_closest(ray, child, closest, closest_t);
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    fn intersect_node_all(&self, ray: &Ray, node: &BvhNode, hits: &mut Vec<RayHit>) {
        if node.aabb().intersect_ray(ray).is_none() {
            return;
        }

        match node {
            BvhNode::Leaf { primitives, .. } => {
                for &handle in primitives {
                    if let Some(t) = self.primitives[handle.index()].intersect_ray(ray) {
                        hits.push(self.make_hit(ray, handle, t));
                    }
                }
            }
            BvhNode::Internal { left, right, .. } => {
                self.intersect_node_all(ray, left, hits);
                self.intersect_node_all(ray, right, hits);
            }
        }
    }

    fn make_hit(&self, ray: &Ray, handle: PrimitiveHandle, t: f64) -> RayHit {
        RayHit {
            t,
            point: ray.at(t),
            id: self.primitives[handle.index()].id(),
            handle,
        }
    }

    /// Get a reference to the root node, if any.
    pub fn root(&self) -> Option<&BvhNode> {
        self.root.as_ref()
    }

    /// The primitive arena, indexed by [`PrimitiveHandle::index`].
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// A shared handle to the primitive arena, e.g. to build another tree
    /// over the same primitives.
    pub fn shared_primitives(&self) -> Arc<[Primitive]> {
        Arc::clone(&self.primitives)
    }

    /// Look up a primitive by handle.
    pub fn primitive(&self, handle: PrimitiveHandle) -> Option<&Primitive> {
        self.primitives.get(handle.index())
    }

    /// Number of primitives indexed by the tree.
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    /// True if the tree indexes no primitives.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Bounds of all indexed primitives.
    pub fn bounds(&self) -> Option<Aabb3> {
        self.root.as_ref().map(|root| *root.aabb())
    }

    /// Count nodes, leaves and depth.
    pub fn stats(&self) -> BvhStats {
        let mut stats = BvhStats::default();
        if let Some(ref root) = self.root {
            collect_stats(root, 1, &mut stats);
        }
        stats
    }
}

impl Default for Bvh {
    fn default() -> Self {
        Self::empty()
    }
}

fn collect_stats(node: &BvhNode, depth: usize, stats: &mut BvhStats) {
    stats.nodes += 1;
    stats.depth = stats.depth.max(depth);
    match node {
        BvhNode::Leaf { primitives, .. } => {
            stats.leaves += 1;
            stats.max_leaf_primitives = stats.max_leaf_primitives.max(primitives.len());
        }
        BvhNode::Internal { left, right, .. } => {
            collect_stats(left, depth + 1, stats);
            collect_stats(right, depth + 1, stats);
        }
    }
}
