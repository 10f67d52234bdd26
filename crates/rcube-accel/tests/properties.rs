//! Property tests for bounds, primitive intersection and BVH queries.

use proptest::prelude::*;
use rcube_accel::{build_bvh, Aabb3, BvhBuilder, Primitive, Ray, Shape, SplitMethod};
use rcube_math::{Dir3, Point3, Vec3};

fn point3(range: f64) -> impl Strategy<Value = Point3> {
    (-range..range, -range..range, -range..range).prop_map(|(x, y, z)| Point3::new(x, y, z))
}

fn unit_dir() -> impl Strategy<Value = Dir3> {
    (-1.0f64..1.0, -1.0f64..1.0, -1.0f64..1.0)
        .prop_filter("direction must be non-zero", |(x, y, z)| {
            x * x + y * y + z * z > 1e-4
        })
        .prop_map(|(x, y, z)| Dir3::new_normalize(Vec3::new(x, y, z)))
}

fn aabb() -> impl Strategy<Value = Aabb3> {
    (point3(50.0), point3(50.0)).prop_map(|(a, b)| Aabb3::new(a.inf(&b), a.sup(&b)))
}

/// Small triangles scattered through a 20-unit cube.
fn triangle_soup(max_len: usize) -> impl Strategy<Value = Vec<Primitive>> {
    prop::collection::vec((point3(10.0), point3(2.0), point3(2.0), point3(2.0)), 0..max_len)
        .prop_map(|tris| {
            tris.into_iter()
                .enumerate()
                .map(|(i, (c, a, b, d))| {
                    Primitive::triangle(i, c + a.coords, c + b.coords, c + d.coords)
                })
                .collect()
        })
}

/// Triangles and pick spheres mixed in one set.
fn mixed_soup(max_len: usize) -> impl Strategy<Value = Vec<Primitive>> {
    let item = prop_oneof![
        (point3(10.0), 0.2f64..2.0).prop_map(|(c, r)| (c, Some(r), [Vec3::zeros(); 3])),
        (point3(10.0), point3(2.0), point3(2.0), point3(2.0))
            .prop_map(|(c, a, b, d)| (c, None, [a.coords, b.coords, d.coords])),
    ];
    prop::collection::vec(item, 0..max_len).prop_map(|items| {
        items
            .into_iter()
            .enumerate()
            .map(|(i, (c, radius, [a, b, d]))| match radius {
                Some(r) => Primitive::point(i, c, r),
                None => Primitive::triangle(i, c + a, c + b, c + d),
            })
            .collect()
    })
}

/// Ray origin: free, or just inside one of the set's spheres when `inside`
/// is set and the set has any.
fn pick_origin(prims: &[Primitive], free: Point3, inside: Option<(usize, Point3)>) -> Point3 {
    let centers: Vec<Point3> = prims
        .iter()
        .filter(|p| matches!(p, Primitive::Point(_)))
        .map(|p| p.position())
        .collect();
    match inside {
        Some((pick, offset)) if !centers.is_empty() => centers[pick % centers.len()] + offset.coords,
        _ => free,
    }
}

fn any_primitive() -> impl Strategy<Value = Primitive> {
    prop_oneof![
        (point3(10.0), 0.01f64..3.0).prop_map(|(c, r)| Primitive::point(0, c, r)),
        (point3(10.0), point3(10.0), point3(10.0))
            .prop_map(|(a, b, c)| Primitive::triangle(0, a, b, c)),
    ]
}

fn brute_force(prims: &[Primitive], ray: &Ray) -> Option<f64> {
    prims
        .iter()
        .filter_map(|p| p.intersect_ray(ray))
        .min_by(|a, b| a.total_cmp(b))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Merge contains both inputs and every face touches one of them.
    #[test]
    fn merge_is_smallest_enclosing_box(a in aabb(), b in aabb()) {
        let m = Aabb3::merge(&a, &b);
        prop_assert!(m.contains(&a));
        prop_assert!(m.contains(&b));
        for i in 0..3 {
            prop_assert!(m.min[i] == a.min[i] || m.min[i] == b.min[i]);
            prop_assert!(m.max[i] == a.max[i] || m.max[i] == b.max[i]);
        }
        prop_assert_eq!(m, Aabb3::merge(&b, &a));
    }

    #[test]
    fn merge_is_associative(a in aabb(), b in aabb(), c in aabb()) {
        let left = Aabb3::merge(&Aabb3::merge(&a, &b), &c);
        let right = Aabb3::merge(&a, &Aabb3::merge(&b, &c));
        prop_assert_eq!(left, right);
    }

    /// A ray shot at the centroid along the normal hits at the plane distance.
    #[test]
    fn centroid_ray_hits_at_plane_distance(
        v0 in point3(10.0),
        v1 in point3(10.0),
        v2 in point3(10.0),
        distance in 0.5f64..20.0,
        flip in any::<bool>(),
    ) {
        let n = (v1 - v0).cross(&(v2 - v0));
        prop_assume!(n.norm() > 1e-2);

        let tri = Primitive::triangle(0, v0, v1, v2);
        let normal = if flip { -n.normalize() } else { n.normalize() };
        let origin = tri.position() + normal * distance;
        let ray = Ray::new(origin, Dir3::new_normalize(-normal));

        let t = tri.intersect_ray(&ray);
        prop_assert!(t.is_some(), "missed triangle {:?} from {:?}", tri, origin);
        prop_assert!((t.unwrap_or_default() - distance).abs() < 1e-4);
    }

    /// Rays leaving a primitive's bounding box on the far side never hit it.
    #[test]
    fn ray_pointing_away_misses(
        prim in any_primitive(),
        axis in 0usize..3,
        positive in any::<bool>(),
        offset in 0.01f64..10.0,
        others in point3(30.0),
        along in 0.05f64..1.0,
        lateral in (-1.0f64..1.0, -1.0f64..1.0, -1.0f64..1.0),
    ) {
        let bounds = prim.aabb();
        let mut origin = others;
        let mut dir = Vec3::new(lateral.0, lateral.1, lateral.2);
        if positive {
            origin[axis] = bounds.max[axis] + offset;
            dir[axis] = along;
        } else {
            origin[axis] = bounds.min[axis] - offset;
            dir[axis] = -along;
        }
        let ray = Ray::new(origin, Dir3::new_normalize(dir));

        prop_assert!(prim.intersect_ray(&ray).is_none());
        prop_assert!(build_bvh(vec![prim]).intersect(&ray).is_none());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(96))]

    /// The BVH finds exactly the nearest hit a linear scan finds.
    #[test]
    fn bvh_matches_brute_force(
        prims in triangle_soup(96),
        rays in prop::collection::vec((point3(20.0), unit_dir()), 1..24),
        sah in any::<bool>(),
        leaf in 1usize..6,
    ) {
        let split = if sah { SplitMethod::Sah } else { SplitMethod::Median };
        let bvh = BvhBuilder::new()
            .split(split)
            .max_leaf_size(leaf)
            .build(prims.clone())
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        for (origin, dir) in rays {
            let ray = Ray::new(origin, dir);
            let expected = brute_force(&prims, &ray);
            match (bvh.intersect(&ray), expected) {
                (None, None) => {}
                (Some(hit), Some(t)) => {
                    prop_assert!((hit.t - t).abs() < 1e-9, "bvh t={} brute t={}", hit.t, t);
                    prop_assert_eq!(prims[hit.handle.index()].intersect_ray(&ray), Some(hit.t));
                    prop_assert_eq!(prims[hit.handle.index()].id(), hit.id);
                    prop_assert!((hit.point - ray.at(hit.t)).norm() < 1e-9);
                }
                (got, want) => {
                    prop_assert!(false, "bvh={:?} brute={:?}", got, want);
                }
            }
        }
    }

    /// Every primitive the ray hits shows up in `intersect_all`, in order.
    #[test]
    fn intersect_all_matches_brute_force(
        prims in triangle_soup(64),
        origin in point3(20.0),
        dir in unit_dir(),
    ) {
        let bvh = build_bvh(prims.clone());
        let ray = Ray::new(origin, dir);

        let hits = bvh.intersect_all(&ray);
        let expected = prims.iter().filter(|p| p.intersect_ray(&ray).is_some()).count();
        prop_assert_eq!(hits.len(), expected);
        prop_assert!(hits.windows(2).all(|w| w[0].t <= w[1].t));
        if let Some(first) = hits.first() {
            prop_assert_eq!(bvh.intersect(&ray).map(|h| h.t), Some(first.t));
        }
    }

    /// Rebuilding from the same primitives gives the same answers.
    #[test]
    fn rebuild_is_idempotent(
        prims in triangle_soup(64),
        rays in prop::collection::vec((point3(20.0), unit_dir()), 1..16),
    ) {
        let first = build_bvh(prims.clone());
        let second = build_bvh(prims);
        let shared = build_bvh(first.shared_primitives());

        for (origin, dir) in rays {
            let ray = Ray::new(origin, dir);
            let a = first.intersect(&ray).map(|h| (h.id, h.t));
            prop_assert_eq!(a, second.intersect(&ray).map(|h| (h.id, h.t)));
            prop_assert_eq!(a, shared.intersect(&ray).map(|h| (h.id, h.t)));
        }
    }

    /// Node bounds enclose their primitives, so the tree's bounds contain
    /// every primitive box.
    #[test]
    fn root_bounds_enclose_all_primitives(prims in triangle_soup(64)) {
        let bvh = build_bvh(prims.clone());
        match bvh.bounds() {
            None => prop_assert!(prims.is_empty()),
            Some(bounds) => {
                for p in &prims {
                    prop_assert!(bounds.contains(&p.aabb()));
                }
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Nearest hits over mixed points and triangles match a linear scan,
    /// including rays that start inside a sphere and report its exit.
    #[test]
    fn mixed_bvh_matches_brute_force(
        prims in mixed_soup(96),
        rays in prop::collection::vec(
            (point3(20.0), prop::option::of((any::<usize>(), point3(0.1))), unit_dir()),
            1..24,
        ),
        sah in any::<bool>(),
        leaf in 1usize..6,
    ) {
        let split = if sah { SplitMethod::Sah } else { SplitMethod::Median };
        let bvh = BvhBuilder::new()
            .split(split)
            .max_leaf_size(leaf)
            .build(prims.clone())
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        for (free, inside, dir) in rays {
            let ray = Ray::new(pick_origin(&prims, free, inside), dir);
            match (bvh.intersect(&ray), brute_force(&prims, &ray)) {
                (None, None) => {}
                (Some(hit), Some(t)) => {
                    prop_assert!((hit.t - t).abs() < 1e-9, "bvh t={} brute t={}", hit.t, t);
                    prop_assert_eq!(prims[hit.handle.index()].intersect_ray(&ray), Some(hit.t));
                    prop_assert_eq!(prims[hit.handle.index()].id(), hit.id);
                }
                (got, want) => {
                    prop_assert!(false, "bvh={:?} brute={:?}", got, want);
                }
            }

            let all = bvh.intersect_all(&ray);
            let expected = prims.iter().filter(|p| p.intersect_ray(&ray).is_some()).count();
            prop_assert_eq!(all.len(), expected);
        }
    }
}
