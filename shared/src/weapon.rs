//! The hand-held blaster: fire events, hit queries and view-model motion.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::raycast::{Ray, RayHit, SceneColliders};

/// Shots only register against geometry closer than this (m).
pub const MAX_RANGE: f32 = 50.0;

/// Gun position relative to the camera when idle.
pub const GUN_REST_OFFSET: [f32; 3] = [0.3, -0.2, -0.5];

/// How far the gun slides back per shot (camera-local +Z)
pub const KICK_DISTANCE: f32 = 0.05;

/// How long the gun stays kicked back (s)
pub const KICK_DURATION: f32 = 0.1;

/// Walking bob frequency (rad/s)
const BOB_RATE: f32 = 10.0;

/// Weapon tuning loaded from the scene config.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    pub max_range: f32,
    pub rest_offset: [f32; 3],
    pub kick_distance: f32,
    pub kick_duration: f32,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            max_range: MAX_RANGE,
            rest_offset: GUN_REST_OFFSET,
            kick_distance: KICK_DISTANCE,
            kick_duration: KICK_DURATION,
        }
    }
}

impl WeaponConfig {
    pub fn is_valid(&self) -> bool {
        self.max_range.is_finite()
            && self.max_range > 0.0
            && self.rest_offset.iter().all(|v| v.is_finite())
            && self.kick_distance.is_finite()
            && self.kick_duration.is_finite()
            && self.kick_duration >= 0.0
    }
}

/// A shot: where it leaves the gun and which way it travels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileEvent {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl ProjectileEvent {
    /// Shot from a gun mounted at `gun_offset` (camera-local) on a camera with `eye` pose.
    /// Travels along the camera's forward, not the barrel's.
    pub fn from_view(eye: &Transform, gun_offset: Vec3) -> Self {
        Self {
            origin: eye.transform_point(gun_offset),
            direction: eye.forward().as_vec3(),
        }
    }
}

/// The outcome of one shot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShotResult {
    pub event: ProjectileEvent,
    pub hit: Option<RayHit>,
}

/// Resolve a shot against the scene: nearest hit strictly within `max_range`.
pub fn fire(event: ProjectileEvent, colliders: &SceneColliders, max_range: f32) -> ShotResult {
    let hit = Ray::new(event.origin, event.direction).and_then(|ray| colliders.cast(&ray, max_range));
    ShotResult { event, hit }
}

/// Camera-local gun position for this frame.
///
/// Walking sways the gun down-right on a sine/cosine path; a recent shot pushes it back.
/// `kick_remaining` counts down from the kick duration to zero.
pub fn gun_offset(config: &WeaponConfig, elapsed: f32, moving: bool, kick_remaining: f32) -> Vec3 {
    let mut offset = Vec3::from_array(config.rest_offset);
    if moving {
        let phase = elapsed * BOB_RATE;
        offset.x += 0.1 + phase.cos() * 0.01;
        offset.y += -0.1 + phase.sin() * 0.03;
    }
    if kick_remaining > 0.0 {
        offset.z += config.kick_distance;
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raycast::{Collider, ColliderTag};

    const EPS: f32 = 1e-4;

    fn wall_at(z: f32) -> SceneColliders {
        let mut scene = SceneColliders::default();
        scene.insert(
            ColliderTag::Placeholder,
            Collider::Box {
                min: Vec3::new(-5.0, -5.0, z - 0.5),
                max: Vec3::new(5.0, 5.0, z + 0.5),
            },
        );
        scene
    }

    #[test]
    fn test_from_view_uses_gun_origin_and_camera_forward() {
        let eye = Transform::from_xyz(0.0, 1.6, 5.0);
        let event = ProjectileEvent::from_view(&eye, Vec3::from_array(GUN_REST_OFFSET));
        assert!((event.origin - Vec3::new(0.3, 1.4, 4.5)).length() < EPS);
        assert!((event.direction - Vec3::NEG_Z).length() < EPS);

        // Turned 90 degrees left: gun offset rotates with the camera
        let eye = eye.with_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        let event = ProjectileEvent::from_view(&eye, Vec3::from_array(GUN_REST_OFFSET));
        assert!((event.direction - Vec3::NEG_X).length() < EPS);
        assert!((event.origin - Vec3::new(-0.5, 1.4, 4.7)).length() < EPS);
    }

    #[test]
    fn test_fire_reports_nearest_hit() {
        let scene = wall_at(-10.0);
        let event = ProjectileEvent {
            origin: Vec3::ZERO,
            direction: Vec3::NEG_Z,
        };
        let result = fire(event, &scene, MAX_RANGE);
        let hit = result.hit.unwrap();
        assert!((hit.point - Vec3::new(0.0, 0.0, -9.5)).length() < EPS);
        assert!((hit.distance - 9.5).abs() < EPS);
        assert_eq!(result.event, event);
    }

    #[test]
    fn test_fire_out_of_range_misses() {
        let scene = wall_at(-80.0);
        let event = ProjectileEvent {
            origin: Vec3::ZERO,
            direction: Vec3::NEG_Z,
        };
        assert!(fire(event, &scene, MAX_RANGE).hit.is_none());
    }

    #[test]
    fn test_fire_with_degenerate_direction_misses() {
        let scene = wall_at(-10.0);
        let event = ProjectileEvent {
            origin: Vec3::ZERO,
            direction: Vec3::ZERO,
        };
        assert!(fire(event, &scene, MAX_RANGE).hit.is_none());
    }

    #[test]
    fn test_gun_offset_rest_and_kick() {
        let config = WeaponConfig::default();
        let rest = gun_offset(&config, 0.0, false, 0.0);
        assert_eq!(rest, Vec3::from_array(GUN_REST_OFFSET));

        let kicked = gun_offset(&config, 0.0, false, 0.05);
        assert!((kicked.z - (rest.z + KICK_DISTANCE)).abs() < EPS);
    }

    #[test]
    fn test_gun_offset_bob_stays_in_band() {
        let config = WeaponConfig::default();
        for i in 0..100 {
            let offset = gun_offset(&config, i as f32 * 0.037, true, 0.0);
            assert!(offset.x >= 0.39 - EPS && offset.x <= 0.41 + EPS);
            assert!(offset.y >= -0.33 - EPS && offset.y <= -0.27 + EPS);
        }
    }
}
