//! Ray queries against the scene's static geometry.
//!
//! Colliders are registered by the scene layer (ground, desk, placeholder box) under a tag,
//! and [`SceneColliders::cast`] returns the nearest hit along a ray.

use bevy::prelude::*;

const EPSILON: f32 = 1e-6;

/// A ray with a normalized direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Returns `None` when `direction` has no length.
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        let direction = direction.try_normalize()?;
        Some(Self { origin, direction })
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// What a ray hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Distance from the ray origin
    pub distance: f32,
    pub point: Vec3,
    pub normal: Vec3,
    pub tag: ColliderTag,
}

/// Identifies which scene object a collider belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColliderTag {
    Ground,
    Desk,
    Placeholder,
}

/// A world-space triangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub vertices: [Vec3; 3],
}

/// Supported collision shapes, all in world space.
#[derive(Clone, Debug, PartialEq)]
pub enum Collider {
    /// Horizontal plane at `center.y`, limited to a square of `half_extent` around `center`.
    Ground {
        center: Vec3,
        half_extent: f32,
    },
    /// Axis-aligned box
    Box {
        min: Vec3,
        max: Vec3,
    },
    Sphere {
        center: Vec3,
        radius: f32,
    },
    /// Triangle soup with a precomputed bounding box for early rejection.
    TriangleMesh {
        triangles: Vec<Triangle>,
        bounds_min: Vec3,
        bounds_max: Vec3,
    },
}

impl Collider {
    /// Build a triangle mesh collider; `None` when there are no triangles.
    pub fn triangle_mesh(triangles: Vec<Triangle>) -> Option<Self> {
        let first = triangles.first()?.vertices[0];
        let (bounds_min, bounds_max) = triangles
            .iter()
            .flat_map(|tri| tri.vertices)
            .fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        Some(Collider::TriangleMesh {
            triangles,
            bounds_min,
            bounds_max,
        })
    }

    /// Nearest hit within `max_distance` as (distance, point, normal).
    pub fn intersect(&self, ray: &Ray, max_distance: f32) -> Option<(f32, Vec3, Vec3)> {
        match self {
            Collider::Ground {
                center,
                half_extent,
            } => ray_ground_intersection(ray, max_distance, *center, *half_extent),
            Collider::Box { min, max } => ray_aabb_intersection(ray, max_distance, *min, *max),
            Collider::Sphere { center, radius } => {
                ray_sphere_intersection(ray, max_distance, *center, *radius)
            }
            Collider::TriangleMesh {
                triangles,
                bounds_min,
                bounds_max,
            } => {
                if !ray_overlaps_aabb(ray, max_distance, *bounds_min, *bounds_max) {
                    return None;
                }

                let mut best: Option<(f32, Vec3, Vec3)> = None;
                for tri in triangles {
                    let [v0, v1, v2] = tri.vertices;
                    if let Some((t, point)) = ray_triangle_intersection(ray, max_distance, v0, v1, v2) {
                        match best {
                            Some((best_t, _, _)) if best_t <= t => {}
                            _ => {
                                let mut normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();
                                // Face the shooter
                                if normal.dot(ray.direction) > 0.0 {
                                    normal = -normal;
                                }
                                best = Some((t, point, normal));
                            }
                        }
                    }
                }
                best
            }
        }
    }
}

/// All static geometry the weapon can hit.
#[derive(Resource, Default, Debug)]
pub struct SceneColliders {
    entries: Vec<(ColliderTag, Collider)>,
}

impl SceneColliders {
    pub fn insert(&mut self, tag: ColliderTag, collider: Collider) {
        self.entries.push((tag, collider));
    }

    /// Remove every collider registered under `tag`. Returns how many were removed.
    pub fn remove_tag(&mut self, tag: ColliderTag) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(t, _)| *t != tag);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Nearest hit strictly closer than `max_distance`.
    pub fn cast(&self, ray: &Ray, max_distance: f32) -> Option<RayHit> {
        let mut best: Option<RayHit> = None;
        for (tag, collider) in &self.entries {
            let limit = best.map_or(max_distance, |b| b.distance);
            let Some((distance, point, normal)) = collider.intersect(ray, limit) else {
                continue;
            };
            if distance >= max_distance {
                continue;
            }
            match best {
                Some(b) if b.distance <= distance => {}
                _ => {
                    best = Some(RayHit {
                        distance,
                        point,
                        normal,
                        tag: *tag,
                    })
                }
            }
        }
        best
    }
}

/// Ray vs bounded horizontal plane.
fn ray_ground_intersection(
    ray: &Ray,
    max_distance: f32,
    center: Vec3,
    half_extent: f32,
) -> Option<(f32, Vec3, Vec3)> {
    let d = ray.direction.y;
    if d.abs() < EPSILON {
        return None; // Parallel to the ground
    }
    let t = (center.y - ray.origin.y) / d;
    if t <= EPSILON || t > max_distance {
        return None;
    }
    let p = ray.at(t);
    if (p.x - center.x).abs() > half_extent || (p.z - center.z).abs() > half_extent {
        return None;
    }
    let normal = if d < 0.0 { Vec3::Y } else { Vec3::NEG_Y };
    Some((t, p, normal))
}

/// Ray vs axis-aligned box (slab method). A ray starting inside hits the exit face.
fn ray_aabb_intersection(
    ray: &Ray,
    max_distance: f32,
    aabb_min: Vec3,
    aabb_max: Vec3,
) -> Option<(f32, Vec3, Vec3)> {
    let mut tmin = 0.0_f32;
    let mut tmax = max_distance;
    let mut enter_normal = Vec3::ZERO;
    let mut exit_normal = Vec3::ZERO;

    for axis in 0..3 {
        let s = ray.origin[axis];
        let d = ray.direction[axis];
        let min = aabb_min[axis];
        let max = aabb_max[axis];

        if d.abs() < EPSILON {
            if s < min || s > max {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let mut t1 = (min - s) * inv;
        let mut t2 = (max - s) * inv;
        let mut n = Vec3::ZERO;
        n[axis] = -1.0;
        let mut n_far = -n;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
            std::mem::swap(&mut n, &mut n_far);
        }

        if t1 > tmin {
            tmin = t1;
            enter_normal = n;
        }
        if t2 < tmax {
            tmax = t2;
            exit_normal = n_far;
        }
        if tmin > tmax {
            return None;
        }
    }

    if enter_normal != Vec3::ZERO {
        Some((tmin, ray.at(tmin), enter_normal))
    } else if tmax > EPSILON && tmax < max_distance {
        Some((tmax, ray.at(tmax), -exit_normal))
    } else {
        None
    }
}

/// Broad phase: does any part of the ray within range pass through the box?
fn ray_overlaps_aabb(ray: &Ray, max_distance: f32, aabb_min: Vec3, aabb_max: Vec3) -> bool {
    let mut tmin = 0.0_f32;
    let mut tmax = max_distance;
    for axis in 0..3 {
        let s = ray.origin[axis];
        let d = ray.direction[axis];
        if d.abs() < EPSILON {
            if s < aabb_min[axis] || s > aabb_max[axis] {
                return false;
            }
            continue;
        }
        let t1 = (aabb_min[axis] - s) / d;
        let t2 = (aabb_max[axis] - s) / d;
        tmin = tmin.max(t1.min(t2));
        tmax = tmax.min(t1.max(t2));
        if tmin > tmax {
            return false;
        }
    }
    true
}

/// Ray vs sphere, nearest positive root.
fn ray_sphere_intersection(
    ray: &Ray,
    max_distance: f32,
    center: Vec3,
    radius: f32,
) -> Option<(f32, Vec3, Vec3)> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.direction);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sq = disc.sqrt();
    let t = if -b - sq > EPSILON { -b - sq } else { -b + sq };
    if t <= EPSILON || t > max_distance {
        return None;
    }
    let p = ray.at(t);
    Some((t, p, (p - center).normalize_or_zero()))
}

/// Möller–Trumbore ray-triangle intersection
fn ray_triangle_intersection(
    ray: &Ray,
    max_t: f32,
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
) -> Option<(f32, Vec3)> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);

    if a.abs() < EPSILON {
        return None; // Ray is parallel to triangle
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);

    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);

    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);

    if t > EPSILON && t <= max_t {
        Some((t, ray.at(t)))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn forward_ray() -> Ray {
        Ray::new(Vec3::ZERO, Vec3::NEG_Z).unwrap()
    }

    fn unit_box_at(z: f32) -> Collider {
        Collider::Box {
            min: Vec3::new(-0.5, -0.5, z - 0.5),
            max: Vec3::new(0.5, 0.5, z + 0.5),
        }
    }

    #[test]
    fn test_zero_direction_is_rejected() {
        assert!(Ray::new(Vec3::ZERO, Vec3::ZERO).is_none());
    }

    #[test]
    fn test_empty_scene_has_no_hit() {
        let scene = SceneColliders::default();
        assert!(scene.cast(&forward_ray(), 50.0).is_none());
    }

    #[test]
    fn test_box_hit_on_near_face() {
        let mut scene = SceneColliders::default();
        scene.insert(ColliderTag::Placeholder, unit_box_at(-10.0));
        let hit = scene.cast(&forward_ray(), 50.0).unwrap();
        assert!((hit.distance - 9.5).abs() < EPS);
        assert!((hit.point - Vec3::new(0.0, 0.0, -9.5)).length() < EPS);
        assert_eq!(hit.normal, Vec3::Z);
        assert_eq!(hit.tag, ColliderTag::Placeholder);
    }

    #[test]
    fn test_geometry_beyond_range_is_ignored() {
        let mut scene = SceneColliders::default();
        scene.insert(ColliderTag::Placeholder, unit_box_at(-60.0));
        assert!(scene.cast(&forward_ray(), 50.0).is_none());
    }

    #[test]
    fn test_nearest_of_several_wins() {
        let mut scene = SceneColliders::default();
        scene.insert(ColliderTag::Placeholder, unit_box_at(-30.0));
        scene.insert(
            ColliderTag::Desk,
            Collider::Sphere {
                center: Vec3::new(0.0, 0.0, -5.0),
                radius: 1.0,
            },
        );
        scene.insert(ColliderTag::Placeholder, unit_box_at(-20.0));
        let hit = scene.cast(&forward_ray(), 50.0).unwrap();
        assert_eq!(hit.tag, ColliderTag::Desk);
        assert!((hit.distance - 4.0).abs() < EPS);
        assert!((hit.normal - Vec3::Z).length() < EPS);
    }

    #[test]
    fn test_behind_origin_is_not_hit() {
        let mut scene = SceneColliders::default();
        scene.insert(ColliderTag::Placeholder, unit_box_at(10.0));
        assert!(scene.cast(&forward_ray(), 50.0).is_none());
    }

    #[test]
    fn test_ground_hit_and_bounds() {
        let ground = Collider::Ground {
            center: Vec3::new(0.0, -1.0, 0.0),
            half_extent: 50.0,
        };
        let down = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, -1.0)).unwrap();
        let (t, p, n) = ground.intersect(&down, 50.0).unwrap();
        assert!((p - Vec3::new(0.0, -1.0, -2.0)).length() < EPS);
        assert!((t - 8.0_f32.sqrt()).abs() < EPS);
        assert_eq!(n, Vec3::Y);

        // Shallow ray leaves the 100x100 plane before reaching it
        let shallow = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -0.01, -1.0)).unwrap();
        assert!(ground.intersect(&shallow, 1000.0).is_none());
    }

    #[test]
    fn test_triangle_mesh_hit() {
        // Quad facing +Z at z = -3
        let a = Vec3::new(-1.0, -1.0, -3.0);
        let b = Vec3::new(1.0, -1.0, -3.0);
        let c = Vec3::new(1.0, 1.0, -3.0);
        let d = Vec3::new(-1.0, 1.0, -3.0);
        let mesh = Collider::triangle_mesh(vec![
            Triangle { vertices: [a, b, c] },
            Triangle { vertices: [a, c, d] },
        ])
        .unwrap();

        let mut scene = SceneColliders::default();
        scene.insert(ColliderTag::Desk, mesh);
        // Off the shared diagonal so exactly one triangle is involved
        let ray = Ray::new(Vec3::new(0.25, -0.5, 0.0), Vec3::NEG_Z).unwrap();
        let hit = scene.cast(&ray, 50.0).unwrap();
        assert!((hit.distance - 3.0).abs() < EPS);
        assert!((hit.point - Vec3::new(0.25, -0.5, -3.0)).length() < EPS);
        assert!((hit.normal - Vec3::Z).length() < EPS);

        let miss = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::NEG_Z).unwrap();
        assert!(scene.cast(&miss, 50.0).is_none());
    }

    #[test]
    fn test_empty_triangle_mesh_is_none() {
        assert!(Collider::triangle_mesh(Vec::new()).is_none());
    }

    #[test]
    fn test_remove_tag() {
        let mut scene = SceneColliders::default();
        scene.insert(ColliderTag::Placeholder, unit_box_at(-5.0));
        scene.insert(ColliderTag::Ground, Collider::Ground {
            center: Vec3::new(0.0, -1.0, 0.0),
            half_extent: 50.0,
        });
        assert_eq!(scene.remove_tag(ColliderTag::Placeholder), 1);
        assert_eq!(scene.len(), 1);
        assert!(scene.cast(&forward_ray(), 50.0).is_none());
    }

    #[test]
    fn test_ray_inside_box_hits_exit_face() {
        let inside = Collider::Box {
            min: Vec3::splat(-1.0),
            max: Vec3::splat(1.0),
        };
        let (t, p, _) = inside.intersect(&forward_ray(), 50.0).unwrap();
        assert!((t - 1.0).abs() < EPS);
        assert!((p.z + 1.0).abs() < EPS);
    }

    #[test]
    fn test_clear_drops_every_collider() {
        let mut scene = SceneColliders::default();
        scene.insert(ColliderTag::Placeholder, unit_box_at(-10.0));
        scene.insert(ColliderTag::Desk, unit_box_at(-5.0));
        scene.clear();
        assert!(scene.is_empty());
        assert!(scene.cast(&forward_ray(), 50.0).is_none());
    }
}
