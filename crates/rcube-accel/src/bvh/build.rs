//! Top-down BVH construction.
//!
//! The default [`SplitMethod::Median`] splits each node at the median
//! centroid along the longest axis of its bounds, which keeps the tree
//! balanced. [`SplitMethod::Sah`] bins centroids and picks the split with the
//! lowest surface area heuristic cost instead.

use std::sync::Arc;

use rcube_math::{Axis, Point3};
use serde::{Deserialize, Serialize};

use super::{Bvh, BvhNode};
use crate::error::{AccelError, Result};
use crate::primitive::{Primitive, PrimitiveHandle, Shape};
use crate::Aabb3;

/// Number of SAH buckets per axis.
const NUM_BUCKETS: usize = 12;

/// Relative cost of one traversal step against one primitive test.
const TRAVERSAL_COST: f64 = 0.125;

/// How a node's primitives are divided between its two children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMethod {
    /// Object median along the axis of greatest extent.
    #[default]
    Median,
    /// Binned surface area heuristic, falling back to the median when the
    /// best bucket boundary leaves one side empty.
    Sah,
}

/// Tree construction parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Nodes with at most this many primitives become leaves.
    pub max_leaf_size: usize,
    /// Split strategy for internal nodes.
    pub split: SplitMethod,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            max_leaf_size: 4,
            split: SplitMethod::Median,
        }
    }
}

impl BuildConfig {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if self.max_leaf_size == 0 {
            return Err(AccelError::InvalidConfig(
                "max_leaf_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Configurable entry point for building a [`Bvh`].
///
/// ```
/// use rcube_accel::{BuildConfig, BvhBuilder, Primitive, SplitMethod};
/// use rcube_math::Point3;
///
/// let prims = vec![Primitive::point(0, Point3::origin(), 0.5)];
/// let bvh = BvhBuilder::new()
///     .config(BuildConfig { max_leaf_size: 2, split: SplitMethod::Sah })
///     .build(prims)
///     .unwrap();
/// assert_eq!(bvh.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BvhBuilder {
    config: BuildConfig,
}

impl BvhBuilder {
    /// A builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the build configuration.
    pub fn config(mut self, config: BuildConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the leaf size threshold.
    pub fn max_leaf_size(mut self, max_leaf_size: usize) -> Self {
        self.config.max_leaf_size = max_leaf_size;
        self
    }

    /// Set the split strategy.
    pub fn split(mut self, split: SplitMethod) -> Self {
        self.config.split = split;
        self
    }

    /// Validate the configuration and build a tree over `primitives`.
    pub fn build(&self, primitives: impl Into<Arc<[Primitive]>>) -> Result<Bvh> {
        self.config.validate()?;
        Ok(build_with_config(primitives.into(), &self.config))
    }
}

/// Build a BVH with the default configuration.
///
/// An empty primitive set yields an empty tree on which every query misses.
pub fn build_bvh(primitives: impl Into<Arc<[Primitive]>>) -> Bvh {
    build_with_config(primitives.into(), &BuildConfig::default())
}

/// Per-primitive data cached for the duration of a build.
#[derive(Debug, Clone, Copy)]
struct BuildItem {
    handle: PrimitiveHandle,
    aabb: Aabb3,
    centroid: Point3,
}

#[tracing::instrument(skip_all, fields(primitives = primitives.len(), split = ?config.split))]
fn build_with_config(primitives: Arc<[Primitive]>, config: &BuildConfig) -> Bvh {
    let mut items: Vec<BuildItem> = primitives
        .iter()
        .enumerate()
        .map(|(i, prim)| BuildItem {
            handle: PrimitiveHandle(i),
            aabb: prim.aabb(),
            centroid: prim.position(),
        })
        .collect();

    let root = if items.is_empty() {
        None
    } else {
        Some(build_node(&mut items, config))
    };

    let bvh = Bvh::from_parts(root, primitives);
    if tracing::enabled!(tracing::Level::DEBUG) {
        let stats = bvh.stats();
        tracing::debug!(
            nodes = stats.nodes,
            leaves = stats.leaves,
            depth = stats.depth,
            "built bvh"
        );
    }
    bvh
}

/// Build a BVH node recursively.
fn build_node(items: &mut [BuildItem], config: &BuildConfig) -> BvhNode {
    if items.len() <= config.max_leaf_size.max(1) {
        let aabb = items
            .iter()
            .fold(Aabb3::empty(), |acc, item| acc.union(&item.aabb));
        return BvhNode::Leaf {
            aabb,
            primitives: items.iter().map(|item| item.handle).collect(),
        };
    }

    let bounds = items
        .iter()
        .fold(Aabb3::empty(), |acc, item| acc.union(&item.aabb));

    let mid = match config.split {
        SplitMethod::Median => median_split(items, &bounds),
        SplitMethod::Sah => sah_split(items).unwrap_or_else(|| median_split(items, &bounds)),
    };

    let (left_items, right_items) = items.split_at_mut(mid);
    let left = build_node(left_items, config);
    let right = build_node(right_items, config);

    BvhNode::Internal {
        aabb: Aabb3::merge(left.aabb(), right.aabb()),
        left: Box::new(left),
        right: Box::new(right),
    }
}

/// Partition around the median centroid on the longest axis of `bounds`.
///
/// Returns the split index, always `len / 2`.
fn median_split(items: &mut [BuildItem], bounds: &Aabb3) -> usize {
    let axis = bounds.largest_axis();
    let mid = items.len() / 2;
    items.select_nth_unstable_by(mid, |a, b| {
        axis.of_point(&a.centroid).total_cmp(&axis.of_point(&b.centroid))
    });
    mid
}

/// Find the cheapest bucket boundary by SAH and partition at it.
///
/// Returns `None` if the centroids are coincident or the partition would
/// leave one side empty.
fn sah_split(items: &mut [BuildItem]) -> Option<usize> {
    let mut centroid_bounds = Aabb3::empty();
    for item in items.iter() {
        centroid_bounds.include_point(&item.centroid);
    }

    let (axis, pos) = find_best_split(items, &centroid_bounds)?;
    let mid = partition_items(items, axis, pos);

    if mid == 0 || mid == items.len() {
        None
    } else {
        Some(mid)
    }
}

/// Find the best split axis and position using binned SAH.
fn find_best_split(items: &[BuildItem], centroid_bounds: &Aabb3) -> Option<(Axis, f64)> {
    let extent = centroid_bounds.extent();
    let node_bounds = items
        .iter()
        .fold(Aabb3::empty(), |acc, item| acc.union(&item.aabb));
    let total_area = node_bounds.surface_area();

    let mut best: Option<(f64, Axis, f64)> = None;

    for axis in Axis::ALL {
        let axis_extent = axis.of_vec(&extent);
        if axis_extent < 1e-10 {
            continue;
        }
        let axis_min = axis.of_point(&centroid_bounds.min);

        let mut bucket_counts = [0usize; NUM_BUCKETS];
        let mut bucket_bounds = [Aabb3::empty(); NUM_BUCKETS];

        for item in items {
            let c = axis.of_point(&item.centroid);
            let b = ((c - axis_min) / axis_extent * NUM_BUCKETS as f64) as usize;
            let b = b.min(NUM_BUCKETS - 1);

            bucket_counts[b] += 1;
            bucket_bounds[b].include_aabb(&item.aabb);
        }

        // Suffix sweep so each boundary's right side costs O(1).
        let mut right_counts = [0usize; NUM_BUCKETS];
        let mut right_bounds = [Aabb3::empty(); NUM_BUCKETS];
        let mut count = 0;
        let mut bounds = Aabb3::empty();
        for i in (1..NUM_BUCKETS).rev() {
            count += bucket_counts[i];
            bounds.include_aabb(&bucket_bounds[i]);
            right_counts[i] = count;
            right_bounds[i] = bounds;
        }

        let mut left_count = 0;
        let mut left_bounds = Aabb3::empty();
        for split in 1..NUM_BUCKETS {
            left_count += bucket_counts[split - 1];
            left_bounds.include_aabb(&bucket_bounds[split - 1]);
            let right_count = right_counts[split];

            if left_count == 0 || right_count == 0 {
                continue;
            }

            // SAH cost: traversal + P(left) * N_left + P(right) * N_right
            let cost = if total_area > 0.0 {
                TRAVERSAL_COST
                    + left_bounds.surface_area() / total_area * left_count as f64
                    + right_bounds[split].surface_area() / total_area * right_count as f64
            } else {
                TRAVERSAL_COST + (left_count.max(right_count)) as f64
            };

            if best.map_or(true, |(best_cost, _, _)| cost < best_cost) {
                let pos = axis_min + (split as f64 / NUM_BUCKETS as f64) * axis_extent;
                best = Some((cost, axis, pos));
            }
        }
    }

    best.map(|(_, axis, pos)| (axis, pos))
}

/// Partition items by centroid along an axis. Returns the first index on
/// the right side.
fn partition_items(items: &mut [BuildItem], axis: Axis, pos: f64) -> usize {
    let mut left = 0;
    let mut right = items.len();

    while left < right {
        if axis.of_point(&items[left].centroid) < pos {
            left += 1;
        } else {
            right -= 1;
            items.swap(left, right);
        }
    }

    left
}
