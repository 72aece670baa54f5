//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! The tree is built over primitive bounding boxes only and stores
//! primitive indices in its leaves, so the same structure serves both a
//! mesh's polygons and the scene's instances. Callers supply the
//! primitive intersection test as a closure at traversal time.

use cinder_math::{Aabb, Interval, Ray, Vec3};

/// Sets at or below this size always become leaves.
const LEAF_MIN_SIZE: usize = 2;

/// Largest leaf the SAH is allowed to keep when splitting would not pay off.
const LEAF_MAX_SIZE: usize = 8;

/// Number of centroid bins evaluated per split.
const SAH_BINS: usize = 12;

/// Relative cost of one box test against one primitive test.
const TRAVERSAL_COST: f32 = 0.5;

/// BVH node - either a branch with two children or a leaf with primitives.
#[derive(Debug)]
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// Leaf node holding primitive indices.
    Leaf { primitives: Vec<u32>, bbox: Aabb },
}

impl BvhNode {
    pub fn bbox(&self) -> &Aabb {
        match self {
            BvhNode::Branch { bbox, .. } | BvhNode::Leaf { bbox, .. } => bbox,
        }
    }
}

/// An immutable hierarchy over primitive indices.
#[derive(Debug, Default)]
pub struct Bvh {
    root: Option<BvhNode>,
    primitive_count: usize,
}

impl Bvh {
    /// Build a hierarchy over primitives given by their bounds.
    ///
    /// Primitive `i` is the one whose box is `bounds[i]`. Empty boxes are
    /// left out of the tree; nothing can hit them.
    pub fn build(bounds: &[Aabb]) -> Self {
        let indices: Vec<u32> = (0..bounds.len() as u32)
            .filter(|&i| !bounds[i as usize].is_empty())
            .collect();
        if indices.is_empty() {
            return Self::default();
        }

        let centroids: Vec<Vec3> = bounds.iter().map(Aabb::centroid).collect();
        let primitive_count = indices.len();
        let root = build_node(bounds, &centroids, indices);

        Self {
            root: Some(root),
            primitive_count,
        }
    }

    pub fn root(&self) -> Option<&BvhNode> {
        self.root.as_ref()
    }

    /// Bounds of everything in the tree.
    pub fn bounds(&self) -> Aabb {
        self.root.as_ref().map_or(Aabb::EMPTY, |r| *r.bbox())
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of primitives stored in leaves.
    pub fn primitive_count(&self) -> usize {
        self.primitive_count
    }

    /// Depth of the deepest leaf, 0 for an empty tree.
    pub fn depth(&self) -> usize {
        fn depth_of(node: &BvhNode) -> usize {
            match node {
                BvhNode::Leaf { .. } => 1,
                BvhNode::Branch { left, right, .. } => 1 + depth_of(left).max(depth_of(right)),
            }
        }
        self.root.as_ref().map_or(0, depth_of)
    }

    /// Find the closest primitive hit.
    ///
    /// `test(primitive, range)` returns the hit distance if the primitive is
    /// hit within `range`. The range shrinks as closer hits are found, so a
    /// reported hit is always closer than every earlier one. Returns the
    /// closest distance found.
    pub fn traverse_nearest<F>(&self, ray: &Ray, ray_t: Interval, mut test: F) -> Option<f32>
    where
        F: FnMut(usize, Interval) -> Option<f32>,
    {
        let root = self.root.as_ref()?;
        root.bbox().hit_distance(ray, ray_t)?;

        let mut closest = ray_t.max;
        if nearest_in(root, ray, ray_t.min, &mut closest, &mut test) {
            Some(closest)
        } else {
            None
        }
    }

    /// True as soon as any primitive reports a hit within `ray_t`.
    pub fn traverse_any<F>(&self, ray: &Ray, ray_t: Interval, mut test: F) -> bool
    where
        F: FnMut(usize, Interval) -> bool,
    {
        match self.root.as_ref() {
            Some(root) => any_in(root, ray, ray_t, &mut test),
            None => false,
        }
    }
}

fn nearest_in<F>(node: &BvhNode, ray: &Ray, t_min: f32, closest: &mut f32, test: &mut F) -> bool
where
    F: FnMut(usize, Interval) -> Option<f32>,
{
    match node {
        BvhNode::Leaf { primitives, .. } => {
            let mut hit_anything = false;
            for &p in primitives {
                if let Some(t) = test(p as usize, Interval::new(t_min, *closest)) {
                    *closest = t;
                    hit_anything = true;
                }
            }
            hit_anything
        }
        BvhNode::Branch { left, right, .. } => {
            let range = Interval::new(t_min, *closest);
            let left_entry = left.bbox().hit_distance(ray, range);
            let right_entry = right.bbox().hit_distance(ray, range);

            match (left_entry, right_entry) {
                (Some(l), Some(r)) => {
                    let (first, second, second_entry) = if l <= r {
                        (left, right, r)
                    } else {
                        (right, left, l)
                    };
                    let mut hit = nearest_in(first, ray, t_min, closest, test);
                    // Skip the far child if it starts behind the best hit
                    if second_entry <= *closest {
                        hit |= nearest_in(second, ray, t_min, closest, test);
                    }
                    hit
                }
                (Some(_), None) => nearest_in(left, ray, t_min, closest, test),
                (None, Some(_)) => nearest_in(right, ray, t_min, closest, test),
                (None, None) => false,
            }
        }
    }
}

fn any_in<F>(node: &BvhNode, ray: &Ray, ray_t: Interval, test: &mut F) -> bool
where
    F: FnMut(usize, Interval) -> bool,
{
    if !node.bbox().hit(ray, ray_t) {
        return false;
    }
    match node {
        BvhNode::Leaf { primitives, .. } => primitives.iter().any(|&p| test(p as usize, ray_t)),
        BvhNode::Branch { left, right, .. } => {
            any_in(left, ray, ray_t, test) || any_in(right, ray, ray_t, test)
        }
    }
}

/// Recursive construction with a binned surface area heuristic.
fn build_node(bounds: &[Aabb], centroids: &[Vec3], mut indices: Vec<u32>) -> BvhNode {
    let n = indices.len();
    let bbox = indices
        .iter()
        .fold(Aabb::EMPTY, |acc, &i| Aabb::surrounding(&acc, &bounds[i as usize]));

    if n <= LEAF_MIN_SIZE {
        return BvhNode::Leaf {
            primitives: indices,
            bbox,
        };
    }

    let centroid_bounds = indices
        .iter()
        .fold(Aabb::EMPTY, |acc, &i| acc.including(centroids[i as usize]));
    let axis = centroid_bounds.longest_axis();
    let extent = centroid_bounds.axis_interval(axis);

    // All centroids coincide: no position separates them, split by count
    if extent.size() <= f32::EPSILON * extent.max.abs().max(1.0) {
        let right = indices.split_off(n / 2);
        return branch(bounds, centroids, indices, right, bbox);
    }

    let bin_of = |i: u32| {
        let c = centroids[i as usize][axis];
        (((c - extent.min) / extent.size() * SAH_BINS as f32) as usize).min(SAH_BINS - 1)
    };

    let mut bin_counts = [0usize; SAH_BINS];
    let mut bin_bounds = [Aabb::EMPTY; SAH_BINS];
    for &i in &indices {
        let b = bin_of(i);
        bin_counts[b] += 1;
        bin_bounds[b] = Aabb::surrounding(&bin_bounds[b], &bounds[i as usize]);
    }

    // Sweep from the right so each split's right side is known in one pass
    let mut right_area = [0.0f32; SAH_BINS];
    let mut right_count = [0usize; SAH_BINS];
    let mut acc_box = Aabb::EMPTY;
    let mut acc_count = 0;
    for b in (1..SAH_BINS).rev() {
        acc_box = Aabb::surrounding(&acc_box, &bin_bounds[b]);
        acc_count += bin_counts[b];
        right_area[b] = acc_box.surface_area();
        right_count[b] = acc_count;
    }

    let parent_area = bbox.surface_area().max(f32::MIN_POSITIVE);
    let mut best_cost = f32::INFINITY;
    let mut best_split = 0;
    let mut acc_box = Aabb::EMPTY;
    let mut acc_count = 0;
    for split in 0..SAH_BINS - 1 {
        acc_box = Aabb::surrounding(&acc_box, &bin_bounds[split]);
        acc_count += bin_counts[split];
        if acc_count == 0 || right_count[split + 1] == 0 {
            continue;
        }
        let cost = TRAVERSAL_COST
            + (acc_box.surface_area() * acc_count as f32
                + right_area[split + 1] * right_count[split + 1] as f32)
                / parent_area;
        if cost < best_cost {
            best_cost = cost;
            best_split = split;
        }
    }

    let leaf_cost = n as f32;
    if best_cost >= leaf_cost && n <= LEAF_MAX_SIZE {
        return BvhNode::Leaf {
            primitives: indices,
            bbox,
        };
    }

    let (left, right): (Vec<u32>, Vec<u32>) = if best_cost.is_finite() {
        indices.into_iter().partition(|&i| bin_of(i) <= best_split)
    } else {
        (indices, Vec::new())
    };

    if left.is_empty() || right.is_empty() {
        // Binning could not separate the set; fall back to the index median
        let mut all = if left.is_empty() { right } else { left };
        all.sort_unstable_by(|&a, &b| {
            centroids[a as usize][axis].total_cmp(&centroids[b as usize][axis])
        });
        let right = all.split_off(n / 2);
        return branch(bounds, centroids, all, right, bbox);
    }

    branch(bounds, centroids, left, right, bbox)
}

fn branch(
    bounds: &[Aabb],
    centroids: &[Vec3],
    left: Vec<u32>,
    right: Vec<u32>,
    bbox: Aabb,
) -> BvhNode {
    BvhNode::Branch {
        left: Box::new(build_node(bounds, centroids, left)),
        right: Box::new(build_node(bounds, centroids, right)),
        bbox,
    }
}
