//! Short-lived cosmetic effects spawned by shots.
//!
//! Every effect carries its own duration. The client ticks the queue once per frame,
//! reads `opacity`/`scale` to drive visuals and despawns whatever `tick` reports expired.

use bevy::prelude::*;

/// Bullet trail visible time (s)
pub const BULLET_TRAIL_DURATION: f32 = 0.1;

/// Starting opacity of the trail
pub const BULLET_TRAIL_OPACITY: f32 = 0.7;

/// Trail cylinder length (m)
pub const BULLET_TRAIL_LENGTH: f32 = 50.0;

/// Trail starts this far in front of the muzzle
pub const BULLET_TRAIL_MUZZLE_GAP: f32 = 0.5;

/// Spark visible time (s)
pub const SPARK_DURATION: f32 = 0.2;

/// Spark grows to this multiple of its size by the end
pub const SPARK_MAX_SCALE: f32 = 3.0;

/// Stable handle used to match an effect with its visual entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Component)]
pub struct EffectId(pub u64);

/// Tagged effect variants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EffectKind {
    /// Fading beam along a shot
    BulletTrail { origin: Vec3, direction: Vec3 },
    /// Expanding, fading flash where a shot landed
    SparkBurst { position: Vec3, normal: Vec3 },
}

impl EffectKind {
    pub fn duration(&self) -> f32 {
        match self {
            EffectKind::BulletTrail { .. } => BULLET_TRAIL_DURATION,
            EffectKind::SparkBurst { .. } => SPARK_DURATION,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimedEffect {
    pub id: EffectId,
    pub kind: EffectKind,
    /// Seconds since spawn
    pub age: f32,
}

impl TimedEffect {
    /// 0 at spawn, 1 at expiry.
    pub fn progress(&self) -> f32 {
        (self.age / self.kind.duration()).clamp(0.0, 1.0)
    }

    pub fn is_expired(&self) -> bool {
        self.age >= self.kind.duration()
    }

    pub fn opacity(&self) -> f32 {
        let t = self.progress();
        match self.kind {
            EffectKind::BulletTrail { .. } => BULLET_TRAIL_OPACITY * (1.0 - t),
            EffectKind::SparkBurst { .. } => 1.0 - t,
        }
    }

    /// Uniform scale multiplier for the visual.
    pub fn scale(&self) -> f32 {
        match self.kind {
            EffectKind::BulletTrail { .. } => 1.0,
            EffectKind::SparkBurst { .. } => 1.0 + (SPARK_MAX_SCALE - 1.0) * self.progress(),
        }
    }

    /// Current world pose of the visual: placed from the payload, scaled by [`Self::scale`].
    pub fn transform(&self) -> Transform {
        let (translation, rotation) = match self.kind {
            EffectKind::BulletTrail { origin, direction } => bullet_trail_pose(origin, direction),
            EffectKind::SparkBurst { position, normal } => (
                position,
                Quat::from_rotation_arc(Vec3::Y, normal.normalize_or(Vec3::Y)),
            ),
        };
        Transform::from_translation(translation)
            .with_rotation(rotation)
            .with_scale(Vec3::splat(self.scale()))
    }
}

/// World-space center and rotation for a trail cylinder (Bevy cylinders run along +Y).
pub fn bullet_trail_pose(origin: Vec3, direction: Vec3) -> (Vec3, Quat) {
    let dir = direction.normalize_or_zero();
    if dir == Vec3::ZERO {
        return (origin, Quat::IDENTITY);
    }
    let center = origin + dir * (BULLET_TRAIL_MUZZLE_GAP + BULLET_TRAIL_LENGTH * 0.5);
    (center, Quat::from_rotation_arc(Vec3::Y, dir))
}

/// Live effects, ticked once per frame.
#[derive(Resource, Default, Debug)]
pub struct EffectQueue {
    effects: Vec<TimedEffect>,
    next_id: u64,
}

impl EffectQueue {
    pub fn push(&mut self, kind: EffectKind) -> EffectId {
        let id = EffectId(self.next_id);
        self.next_id += 1;
        self.effects.push(TimedEffect { id, kind, age: 0.0 });
        id
    }

    /// Age every effect by `dt` and drop the expired ones, returning their ids.
    pub fn tick(&mut self, dt: f32) -> Vec<EffectId> {
        let mut expired = Vec::new();
        self.effects.retain_mut(|effect| {
            effect.age += dt.max(0.0);
            if effect.is_expired() {
                expired.push(effect.id);
                false
            } else {
                true
            }
        });
        expired
    }

    pub fn get(&self, id: EffectId) -> Option<&TimedEffect> {
        self.effects.iter().find(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimedEffect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
