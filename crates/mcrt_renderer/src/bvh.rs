//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Binary tree with one primitive per leaf, built once by median split on
//! the longest axis of the centroid bounds. Besides ray traversal it can act
//! as a light shape: `random` picks a leaf uniformly and `pdf_value` reports
//! the matching mixture density.

use crate::{gen_f32, HitRecord, Hittable, Ray};
use mcrt_math::{Aabb, Interval, Vec3};
use rand::RngCore;
use thiserror::Error;

/// Errors that can occur while building a BVH.
#[derive(Error, Debug)]
pub enum BvhError {
    #[error("Cannot build a BVH from zero primitives")]
    Empty,
}

pub type BvhResult<T> = Result<T, BvhError>;

/// Smallest parameter accepted when probing light shapes.
const LIGHT_T_MIN: f32 = 0.001;

/// BVH node - either a branch with two children or a leaf with one primitive.
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
        /// Number of leaves below this node
        leaf_count: usize,
    },
    /// Leaf node holding a single primitive.
    Leaf {
        object: Box<dyn Hittable>,
        bbox: Aabb,
    },
}

impl BvhNode {
    /// Create a BVH from a list of hittable objects.
    ///
    /// Boxes are taken over the shutter interval `[time0, time1]`.
    pub fn new(objects: Vec<Box<dyn Hittable>>, time0: f32, time1: f32) -> BvhResult<Self> {
        if objects.is_empty() {
            return Err(BvhError::Empty);
        }

        let count = objects.len();
        let root = Self::build(objects, time0, time1);
        log::info!(
            "Built BVH over {} primitives (depth {})",
            count,
            root.depth()
        );
        Ok(root)
    }

    /// Recursive BVH construction.
    ///
    /// Sort objects by centroid on the axis where the centroids spread the
    /// most, split in half, recurse.
    fn build(mut objects: Vec<Box<dyn Hittable>>, time0: f32, time1: f32) -> Self {
        if objects.len() == 1 {
            if let Some(object) = objects.pop() {
                let bbox = object.bounding_box(time0, time1);
                return BvhNode::Leaf { object, bbox };
            }
        }

        // Compute centroid bounds to choose split axis
        let centroid_bounds = objects.iter().fold(Aabb::EMPTY, |acc, obj| {
            let c = obj.bounding_box(time0, time1).centroid();
            Aabb::surrounding(&acc, &Aabb::from_points(c, c))
        });
        let axis = centroid_bounds.longest_axis();

        objects.sort_by(|a, b| {
            let a_val = a.bounding_box(time0, time1).centroid()[axis];
            let b_val = b.bounding_box(time0, time1).centroid()[axis];
            a_val.total_cmp(&b_val)
        });

        // Split at midpoint
        let mid = objects.len() / 2;
        let right_objects = objects.split_off(mid);

        let left = Self::build(objects, time0, time1);
        let right = Self::build(right_objects, time0, time1);
        let bbox = Aabb::surrounding(&left.bbox(), &right.bbox());
        let leaf_count = left.leaf_count() + right.leaf_count();

        BvhNode::Branch {
            left: Box::new(left),
            right: Box::new(right),
            bbox,
            leaf_count,
        }
    }

    fn bbox(&self) -> Aabb {
        match self {
            BvhNode::Leaf { bbox, .. } | BvhNode::Branch { bbox, .. } => *bbox,
        }
    }

    /// Number of primitives in the tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { leaf_count, .. } => *leaf_count,
        }
    }

    /// Number of levels, a single leaf being depth 1.
    pub fn depth(&self) -> usize {
        match self {
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// The `index`-th leaf primitive in tree order.
    fn leaf(&self, index: usize) -> &dyn Hittable {
        match self {
            BvhNode::Leaf { object, .. } => object.as_ref(),
            BvhNode::Branch { left, right, .. } => {
                let left_count = left.leaf_count();
                if index < left_count {
                    left.leaf(index)
                } else {
                    right.leaf(index - left_count)
                }
            }
        }
    }

    /// Sum of the leaf densities, skipping subtrees the ray cannot reach.
    fn pdf_sum(&self, ray: &Ray) -> f32 {
        if !self.bbox().hit(ray, Interval::from_min(LIGHT_T_MIN)) {
            return 0.0;
        }

        match self {
            BvhNode::Leaf { object, .. } => object.pdf_value(ray.origin(), ray.direction()),
            BvhNode::Branch { left, right, .. } => left.pdf_sum(ray) + right.pdf_sum(ray),
        }
    }
}

impl Hittable for BvhNode {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        match self {
            BvhNode::Leaf { object, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }
                object.hit(ray, ray_t)
            }

            BvhNode::Branch {
                left, right, bbox, ..
            } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }

                let hit_left = left.hit(ray, ray_t);

                // Only check right up to closest hit
                let right_t = hit_left.as_ref().map_or(ray_t, |rec| ray_t.with_max(rec.t));
                right.hit(ray, right_t).or(hit_left)
            }
        }
    }

    fn bounding_box(&self, _time0: f32, _time1: f32) -> Aabb {
        self.bbox()
    }

    /// Leaves are picked uniformly by `random`, so the density is the mean
    /// of the leaf densities.
    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        let ray = Ray::new_simple(origin, direction);
        self.pdf_sum(&ray) / self.leaf_count() as f32
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let count = self.leaf_count();
        let index = ((gen_f32(rng) * count as f32) as usize).min(count - 1);
        self.leaf(index).random(origin, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AaRect, HittableList, Lambertian, Plane, Sphere, Triangle};
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    type Color = Vec3;

    fn grey() -> Lambertian {
        Lambertian::new(Color::new(0.5, 0.5, 0.5))
    }

    fn spheres(specs: &[(Vec3, f32)]) -> Vec<Box<dyn Hittable>> {
        specs
            .iter()
            .map(|&(center, radius)| Box::new(Sphere::new(center, radius, grey())) as Box<dyn Hittable>)
            .collect()
    }

    #[test]
    fn test_bvh_empty() {
        let result = BvhNode::new(vec![], 0.0, 1.0);
        assert!(matches!(result, Err(BvhError::Empty)));
    }

    #[test]
    fn test_bvh_single_sphere() {
        let bvh = BvhNode::new(spheres(&[(Vec3::new(0.0, 0.0, -1.0), 0.5)]), 0.0, 1.0).unwrap();

        // Should create a leaf
        assert!(matches!(bvh, BvhNode::Leaf { .. }));

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 0.0);
        assert!(bvh.hit(&ray, Interval::from_min(0.001)).is_some());
    }

    #[test]
    fn test_bvh_two_primitives_are_two_leaves() {
        let bvh = BvhNode::new(
            spheres(&[(Vec3::new(3.0, 0.0, 0.0), 0.5), (Vec3::new(-3.0, 0.0, 0.0), 0.5)]),
            0.0,
            1.0,
        )
        .unwrap();

        let BvhNode::Branch { left, right, .. } = &bvh else {
            panic!("two primitives must split");
        };
        assert!(matches!(**left, BvhNode::Leaf { .. }));
        assert!(matches!(**right, BvhNode::Leaf { .. }));
        // Ordered along the split axis
        assert!(left.bbox().centroid().x < right.bbox().centroid().x);
    }

    #[test]
    fn test_bvh_multiple_spheres() {
        let specs: Vec<_> = (0..10).map(|i| (Vec3::new(i as f32, 0.0, -5.0), 0.5)).collect();
        let bvh = BvhNode::new(spheres(&specs), 0.0, 1.0).unwrap();

        assert_eq!(bvh.leaf_count(), 10);
        assert!(bvh.depth() <= 5);

        // Test ray that hits sphere at x=5
        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0), 0.0);
        let rec = bvh.hit(&ray, Interval::from_min(0.001)).unwrap();

        // Hit point should be near z = -4.5 (sphere at z=-5, radius 0.5)
        assert!((rec.p.z - (-4.5)).abs() < 0.01);
    }

    #[test]
    fn test_bvh_light_sampling_is_mean_of_leaves() {
        let near = AaRect::new(Plane::Xz, -1.0, 1.0, -1.0, 1.0, 2.0, grey());
        let far = AaRect::new(Plane::Xz, 10.0, 11.0, 10.0, 11.0, 2.0, grey());
        let expected = 0.5 * near.pdf_value(Vec3::ZERO, Vec3::Y);

        let bvh = BvhNode::new(vec![Box::new(near), Box::new(far)], 0.0, 1.0).unwrap();
        assert!((bvh.pdf_value(Vec3::ZERO, Vec3::Y) - expected).abs() < 1e-6);
        assert_eq!(bvh.pdf_value(Vec3::ZERO, -Vec3::Y), 0.0);

        let mut rng = StdRng::seed_from_u64(42);
        let mut toward_far = 0;
        for _ in 0..1000 {
            let dir = bvh.random(Vec3::ZERO, &mut rng);
            assert!(bvh.pdf_value(Vec3::ZERO, dir) > 0.0);
            if dir.x > 5.0 {
                toward_far += 1;
            }
        }
        assert!((400..600).contains(&toward_far), "toward_far = {toward_far}");
    }

    fn sphere_specs() -> impl Strategy<Value = Vec<(Vec3, f32)>> {
        prop::collection::vec(
            (-10.0f32..10.0, -10.0f32..10.0, -10.0f32..10.0, 0.1f32..2.0)
                .prop_map(|(x, y, z, r)| (Vec3::new(x, y, z), r)),
            1..40,
        )
    }

    fn vec3_in(range: std::ops::Range<f32>) -> impl Strategy<Value = Vec3> {
        (range.clone(), range.clone(), range).prop_map(|(x, y, z)| Vec3::new(x, y, z))
    }

    /// Mixed scene element: flat shapes have zero-thickness bounds on one axis.
    #[derive(Debug, Clone)]
    enum Shape {
        Sphere(Vec3, f32),
        Triangle { axis: usize, k: f32, corners: [(f32, f32); 3] },
        Rect { plane: Plane, a: (f32, f32), b: (f32, f32), k: f32 },
    }

    fn on_axis_plane(axis: usize, a: f32, b: f32, k: f32) -> Vec3 {
        match axis {
            0 => Vec3::new(k, a, b),
            1 => Vec3::new(a, k, b),
            _ => Vec3::new(a, b, k),
        }
    }

    fn build_shapes(specs: &[Shape]) -> Vec<Box<dyn Hittable>> {
        specs
            .iter()
            .map(|shape| -> Box<dyn Hittable> {
                match *shape {
                    Shape::Sphere(center, radius) => Box::new(Sphere::new(center, radius, grey())),
                    Shape::Triangle { axis, k, corners } => {
                        let [v0, v1, v2] = corners.map(|(a, b)| on_axis_plane(axis, a, b, k));
                        Box::new(Triangle::new(v0, v1, v2, grey()))
                    }
                    Shape::Rect { plane, a, b, k } => {
                        Box::new(AaRect::new(plane, a.0, a.1, b.0, b.1, k, grey()))
                    }
                }
            })
            .collect()
    }

    fn mixed_specs() -> impl Strategy<Value = Vec<Shape>> {
        let coord = || -10.0f32..10.0;
        let shape = prop_oneof![
            (vec3_in(-10.0..10.0), 0.1f32..2.0).prop_map(|(center, radius)| Shape::Sphere(center, radius)),
            (0usize..3, coord(), prop::array::uniform3((coord(), coord())))
                .prop_map(|(axis, k, corners)| Shape::Triangle { axis, k, corners }),
            (0usize..3, coord(), coord(), 0.1f32..6.0, 0.1f32..6.0, coord()).prop_map(
                |(plane, a0, b0, wa, wb, k)| Shape::Rect {
                    plane: [Plane::Xy, Plane::Xz, Plane::Yz][plane],
                    a: (a0, a0 + wa),
                    b: (b0, b0 + wb),
                    k,
                }
            ),
        ];
        prop::collection::vec(shape, 1..40)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// The BVH must report the same closest hit as a linear scan
        #[test]
        fn bvh_matches_brute_force(
            specs in sphere_specs(),
            origin in vec3_in(-15.0..15.0),
            direction in vec3_in(-1.0..1.0),
            t_max in 1.0f32..50.0,
        ) {
            prop_assume!(direction.length() > 0.1);

            let bvh = BvhNode::new(spheres(&specs), 0.0, 1.0).unwrap();
            let list = HittableList::from(spheres(&specs));

            let ray = Ray::new_simple(origin, direction);
            let interval = Interval::new(0.001, t_max);

            match (bvh.hit(&ray, interval), list.hit(&ray, interval)) {
                (None, None) => {}
                (Some(a), Some(b)) => prop_assert!((a.t - b.t).abs() < 1e-4, "bvh t = {}, list t = {}", a.t, b.t),
                (a, b) => prop_assert!(false, "bvh hit = {}, list hit = {}", a.is_some(), b.is_some()),
            }
        }

        /// Same check with flat triangles and rects among the spheres
        #[test]
        fn bvh_matches_brute_force_with_flat_shapes(
            specs in mixed_specs(),
            origin in vec3_in(-15.0..15.0),
            direction in vec3_in(-1.0..1.0),
            t_max in 1.0f32..50.0,
        ) {
            prop_assume!(direction.length() > 0.1);

            let bvh = BvhNode::new(build_shapes(&specs), 0.0, 1.0).unwrap();
            let list = HittableList::from(build_shapes(&specs));

            let ray = Ray::new_simple(origin, direction);
            let interval = Interval::new(0.001, t_max);

            match (bvh.hit(&ray, interval), list.hit(&ray, interval)) {
                (None, None) => {}
                (Some(a), Some(b)) => prop_assert!((a.t - b.t).abs() < 1e-4, "bvh t = {}, list t = {}", a.t, b.t),
                (a, b) => prop_assert!(false, "bvh hit = {}, list hit = {}", a.is_some(), b.is_some()),
            }
        }
    }
}
