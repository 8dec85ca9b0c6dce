//! Bounding Volume Hierarchy
//!
//! A binary tree of [BoundingBox]es built over a slice of [Hittable] items. The
//! tree does not own the items: it stores their indices and every query takes
//! the same slice the tree was built from. Nodes live in an [Arena] and refer to
//! their children by [ArenaIndex], so every child has exactly one parent.

use glam::Vec3A;
use rand::Rng;

use crate::{
    bounds::BoundingBox,
    hittables::{Hittable, Intersection},
    ray::Ray,
    utils::arena::{Arena, ArenaIndex},
};

/// Leaf size used when none is given.
pub const DEFAULT_MAX_PRIMS_IN_LEAF: usize = 1;

/// A node in the BVH.
///
/// `area` is the summed surface area of every item below the node and serves as
/// its weight when sampling points.
#[derive(Debug, Clone)]
pub enum BvhNode {
    /// Items `ordered[first..first + count]`
    Leaf {
        bound: BoundingBox,
        area: f32,
        first: usize,
        count: usize,
    },
    Interior {
        bound: BoundingBox,
        area: f32,
        left: ArenaIndex,
        right: ArenaIndex,
    },
}

impl BvhNode {
    pub fn bound(&self) -> BoundingBox {
        match self {
            BvhNode::Leaf { bound, .. } | BvhNode::Interior { bound, .. } => *bound,
        }
    }

    pub fn area(&self) -> f32 {
        match self {
            BvhNode::Leaf { area, .. } | BvhNode::Interior { area, .. } => *area,
        }
    }
}

/// Per-item data gathered once before building.
struct ItemInfo {
    bound: BoundingBox,
    centroid: Vec3A,
    area: f32,
}

/// Bounding volume hierarchy over the indices of a slice of items.
#[derive(Debug, Clone, Default)]
pub struct BvhAccel {
    arena: Arena<BvhNode>,
    root: Option<ArenaIndex>,
    /// item indices in leaf order
    ordered: Vec<usize>,
}

impl BvhAccel {
    /// Builds a tree with one item per leaf.
    pub fn new<T: Hittable>(items: &[T]) -> Self {
        Self::with_leaf_size(items, DEFAULT_MAX_PRIMS_IN_LEAF)
    }

    /// Builds a tree whose leaves hold at most `max_prims_in_leaf` items.
    ///
    /// Sets of more items are split at the median of their centroids along the
    /// axis where the centroids spread the most. An empty slice gives an empty
    /// tree that never reports a hit.
    pub fn with_leaf_size<T: Hittable>(items: &[T], max_prims_in_leaf: usize) -> Self {
        let max_prims_in_leaf = max_prims_in_leaf.max(1);
        let infos: Vec<ItemInfo> = items
            .iter()
            .map(|item| {
                let bound = item.bound();
                ItemInfo {
                    bound,
                    centroid: bound.centroid(),
                    area: item.area(),
                }
            })
            .collect();

        let mut ordered: Vec<usize> = (0..items.len()).collect();
        let mut arena = Arena::with_capacity((2 * items.len()).saturating_sub(1));
        let root = (!items.is_empty())
            .then(|| Self::build(&mut arena, &infos, &mut ordered, 0, max_prims_in_leaf));

        Self {
            arena,
            root,
            ordered,
        }
    }

    /// Implementation of `with_leaf_size`
    ///
    /// `indices` is the sub-slice of the ordering starting at position `first`.
    fn build(
        arena: &mut Arena<BvhNode>,
        infos: &[ItemInfo],
        indices: &mut [usize],
        first: usize,
        max_prims_in_leaf: usize,
    ) -> ArenaIndex {
        let count = indices.len();

        if count <= max_prims_in_leaf {
            let bound = indices
                .iter()
                .fold(BoundingBox::default(), |b, &i| b.merge(&infos[i].bound));
            let area = indices.iter().map(|&i| infos[i].area).sum();
            return arena.add(BvhNode::Leaf {
                bound,
                area,
                first,
                count,
            });
        }

        // two items split into singletons as given
        if count > 2 {
            let axis = indices
                .iter()
                .fold(BoundingBox::default(), |b, &i| b.merge_point(infos[i].centroid))
                .max_extent();

            indices.sort_unstable_by(|&a, &b| {
                infos[a].centroid[axis].total_cmp(&infos[b].centroid[axis])
            });
        }

        let mid = count / 2;
        let (left_items, right_items) = indices.split_at_mut(mid);
        let left = Self::build(arena, infos, left_items, first, max_prims_in_leaf);
        let right = Self::build(arena, infos, right_items, first + mid, max_prims_in_leaf);

        let bound = arena[left].bound().merge(&arena[right].bound());
        let area = arena[left].area() + arena[right].area();
        arena.add(BvhNode::Interior {
            bound,
            area,
            left,
            right,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Bounding box of everything in the tree.
    pub fn bound(&self) -> BoundingBox {
        self.root
            .map_or(BoundingBox::default(), |root| self.arena[root].bound())
    }

    /// Total surface area of everything in the tree.
    pub fn area(&self) -> f32 {
        self.root.map_or(0.0, |root| self.arena[root].area())
    }

    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.arena
            .iter()
            .filter(|node| matches!(node, BvhNode::Leaf { .. }))
            .count()
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        self.root.map_or(0, |root| self.node_depth(root))
    }

    fn node_depth(&self, idx: ArenaIndex) -> usize {
        match self.arena[idx] {
            BvhNode::Leaf { .. } => 1,
            BvhNode::Interior { left, right, .. } => {
                1 + self.node_depth(left).max(self.node_depth(right))
            }
        }
    }

    /// Returns the nearest intersection of `ray` with `items`.
    ///
    /// `items` must be the slice the tree was built from.
    pub fn intersect<'a, T: Hittable>(&self, items: &'a [T], ray: &Ray) -> Intersection<'a> {
        match self.root {
            Some(root) => self.intersect_node(root, items, ray, ray.direction.recip()),
            None => Intersection::default(),
        }
    }

    /// Both children of a node are visited and the closer record kept.
    fn intersect_node<'a, T: Hittable>(
        &self,
        idx: ArenaIndex,
        items: &'a [T],
        ray: &Ray,
        ray_dir_inv: Vec3A,
    ) -> Intersection<'a> {
        let node = &self.arena[idx];
        if !node.bound().intersect_p(ray, ray_dir_inv) {
            return Intersection::default();
        }

        match *node {
            BvhNode::Leaf { first, count, .. } => self.ordered[first..first + count]
                .iter()
                .map(|&i| items[i].get_intersection(ray))
                .fold(Intersection::default(), Intersection::closer),
            BvhNode::Interior { left, right, .. } => {
                let hit1 = self.intersect_node(left, items, ray, ray_dir_inv);
                let hit2 = self.intersect_node(right, items, ray, ray_dir_inv);
                hit1.closer(hit2)
            }
        }
    }

    /// Draws a point uniformly distributed over the combined surface of `items`.
    ///
    /// Returns the point and its density with respect to surface area, which is
    /// `1 / area()` for a well-formed tree. An empty or zero-area tree yields a
    /// default record and a density of zero.
    pub fn sample<'a, T: Hittable>(
        &self,
        items: &'a [T],
        rng: &mut impl Rng,
    ) -> (Intersection<'a>, f32) {
        let Some(root) = self.root else {
            return (Intersection::default(), 0.0);
        };
        let root_area = self.arena[root].area();
        if root_area <= 0.0 {
            return (Intersection::default(), 0.0);
        }

        let p = rng.gen::<f32>() * root_area;
        let (pos, pdf) = self.sample_node(root, items, p, rng);
        (pos, pdf / root_area)
    }

    /// Walks down to the item whose share of the area contains `p`.
    ///
    /// The returned density is scaled by the chosen item's area, so after
    /// division by the root area it is relative to the whole tree.
    fn sample_node<'a, T: Hittable>(
        &self,
        idx: ArenaIndex,
        items: &'a [T],
        p: f32,
        rng: &mut impl Rng,
    ) -> (Intersection<'a>, f32) {
        match self.arena[idx] {
            BvhNode::Interior { left, right, .. } => {
                let left_area = self.arena[left].area();
                if p < left_area {
                    self.sample_node(left, items, p, rng)
                } else {
                    self.sample_node(right, items, p - left_area, rng)
                }
            }
            BvhNode::Leaf { first, count, .. } => {
                let candidates = &self.ordered[first..first + count];
                let mut remaining = p;
                let mut chosen = candidates[candidates.len() - 1];
                for &i in candidates {
                    let area = items[i].area();
                    if remaining < area {
                        chosen = i;
                        break;
                    }
                    remaining -= area;
                }

                let item = &items[chosen];
                let (pos, pdf) = item.sample(rng);
                (pos, pdf * item.area())
            }
        }
    }
}
