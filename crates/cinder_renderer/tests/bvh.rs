//! BVH soundness: containment and agreement with brute force.

use cinder_math::{Aabb, Interval, Ray, Vec3, RAY_EPSILON};
use cinder_renderer::geometry::intersect_triangle;
use cinder_renderer::{Bvh, BvhNode};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_point(rng: &mut StdRng, extent: f32) -> Vec3 {
    Vec3::new(
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
    )
}

fn random_triangles(rng: &mut StdRng, count: usize) -> Vec<[Vec3; 3]> {
    (0..count)
        .map(|_| {
            let center = random_point(rng, 10.0);
            [
                center + random_point(rng, 1.0),
                center + random_point(rng, 1.0),
                center + random_point(rng, 1.0),
            ]
        })
        .collect()
}

fn triangle_bounds(tri: &[Vec3; 3]) -> Aabb {
    Aabb::from_points(tri[0], tri[1]).including(tri[2])
}

/// Every node box contains its children; every leaf box contains its
/// primitives. Returns the primitives seen.
fn check_node(node: &BvhNode, bounds: &[Aabb], seen: &mut Vec<u32>) {
    match node {
        BvhNode::Leaf { primitives, bbox } => {
            for &p in primitives {
                assert!(bbox.contains(&bounds[p as usize]), "leaf box misses primitive {p}");
                seen.push(p);
            }
        }
        BvhNode::Branch { left, right, bbox } => {
            assert!(bbox.contains(left.bbox()));
            assert!(bbox.contains(right.bbox()));
            check_node(left, bounds, seen);
            check_node(right, bounds, seen);
        }
    }
}

#[test]
fn test_bvh_contains_every_primitive_once() {
    let mut rng = StdRng::seed_from_u64(17);
    let tris = random_triangles(&mut rng, 500);
    let bounds: Vec<Aabb> = tris.iter().map(triangle_bounds).collect();
    let bvh = Bvh::build(&bounds);

    let mut seen = Vec::new();
    check_node(bvh.root().unwrap(), &bounds, &mut seen);
    seen.sort_unstable();
    assert_eq!(seen, (0..500).collect::<Vec<u32>>());
    assert_eq!(bvh.primitive_count(), 500);
}

#[test]
fn test_bvh_nearest_matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(99);
    let tris = random_triangles(&mut rng, 300);
    let bounds: Vec<Aabb> = tris.iter().map(triangle_bounds).collect();
    let bvh = Bvh::build(&bounds);
    let range = Interval::new(RAY_EPSILON, f32::INFINITY);

    let mut hits = 0;
    for _ in 0..500 {
        let origin = random_point(&mut rng, 15.0);
        let target = random_point(&mut rng, 8.0);
        let ray = Ray::new(origin, (target - origin).normalize());

        let brute = tris
            .iter()
            .filter_map(|t| intersect_triangle(&ray, *t, range))
            .map(|h| h.t)
            .min_by(f32::total_cmp);

        let traversed = bvh.traverse_nearest(&ray, range, |i, r| intersect_triangle(&ray, tris[i], r).map(|h| h.t));

        match (brute, traversed) {
            (Some(a), Some(b)) => {
                assert!((a - b).abs() < 1e-4, "brute {a} vs bvh {b}");
                hits += 1;
            }
            (None, None) => {}
            other => panic!("brute force and BVH disagree: {other:?}"),
        }

        let any = bvh.traverse_any(&ray, range, |i, r| intersect_triangle(&ray, tris[i], r).is_some());
        assert_eq!(any, brute.is_some());
    }
    assert!(hits > 25, "too few rays hit anything ({hits})");
}

#[test]
fn test_bvh_respects_range() {
    let mut rng = StdRng::seed_from_u64(5);
    let tris = random_triangles(&mut rng, 100);
    let bounds: Vec<Aabb> = tris.iter().map(triangle_bounds).collect();
    let bvh = Bvh::build(&bounds);

    for _ in 0..200 {
        let origin = random_point(&mut rng, 15.0);
        let ray = Ray::new(origin, -origin.normalize());
        let range = Interval::new(RAY_EPSILON, 5.0);
        if let Some(t) = bvh.traverse_nearest(&ray, range, |i, r| intersect_triangle(&ray, tris[i], r).map(|h| h.t)) {
            assert!(t > RAY_EPSILON && t < 5.0);
        }
    }
}
