//! First-person movement integrator.
//!
//! One call to [`step_player`] advances the player by one rendered frame:
//! - Walks/runs along the ground-projected look direction
//! - Applies jump, gravity and the floor/ceiling clamps
//!
//! In Bevy: +X right, +Y up, -Z forward.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::input::InputState;
use crate::player::{CEILING_EYE_HEIGHT, GROUND_EYE_HEIGHT, PITCH_LIMIT};

/// Reference frame rate the default tuning was authored at.
pub const REFERENCE_HZ: f32 = 60.0;

/// Tunable movement constants, all per-second.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Walking speed in m/s
    pub walk_speed: f32,
    /// Speed while the run key is held (m/s)
    pub run_speed: f32,
    /// Upward velocity given by a jump (m/s)
    pub jump_velocity: f32,
    /// Gravity magnitude in m/s^2 (applied downward)
    pub gravity: f32,
    /// Minimum eye height; landing clamps here
    pub ground_height: f32,
    /// Maximum eye height
    pub ceiling_height: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        // 0.15 / 0.3 units per frame, 0.2 jump, 0.01 gravity per frame at 60 Hz.
        Self {
            walk_speed: 0.15 * REFERENCE_HZ,
            run_speed: 0.3 * REFERENCE_HZ,
            jump_velocity: 0.2 * REFERENCE_HZ,
            gravity: 0.01 * REFERENCE_HZ * REFERENCE_HZ,
            ground_height: GROUND_EYE_HEIGHT,
            ceiling_height: CEILING_EYE_HEIGHT,
        }
    }
}

impl MovementConfig {
    /// Speeds and gravity must be finite and non-negative, heights finite, and the ceiling
    /// no lower than the ground.
    pub fn is_valid(&self) -> bool {
        let rates = [self.walk_speed, self.run_speed, self.jump_velocity, self.gravity];
        rates.iter().all(|v| v.is_finite() && *v >= 0.0)
            && self.ground_height.is_finite()
            && self.ceiling_height.is_finite()
            && self.ceiling_height >= self.ground_height
    }
}

/// Look orientation. Yaw 0 faces -Z.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Look {
    pub yaw: f32,
    pub pitch: f32,
}

impl Look {
    pub fn new(yaw: f32, pitch: f32) -> Self {
        Self {
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
        }
    }

    /// Derive yaw/pitch from a look direction. A zero vector yields the default orientation.
    pub fn from_direction(direction: Vec3) -> Self {
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO {
            return Self::default();
        }
        let yaw = (-dir.x).atan2(-dir.z);
        let pitch = dir.y.clamp(-1.0, 1.0).asin();
        Self::new(yaw, pitch)
    }

    /// Apply a mouse delta in pixels.
    pub fn rotate(&mut self, delta: Vec2, sensitivity: f32) {
        self.yaw -= delta.x * sensitivity;
        self.pitch = (self.pitch - delta.y * sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// Unit look direction (what the camera's forward would be).
    pub fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_Z
    }
}

/// Per-frame player state, owned by the movement step.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct PlayerState {
    /// Eye position
    pub position: Vec3,
    pub look: Look,
    pub vertical_velocity: f32,
    pub grounded: bool,
}

impl PlayerState {
    pub fn new(position: Vec3, look: Look) -> Self {
        Self {
            position,
            look,
            vertical_velocity: 0.0,
            grounded: true,
        }
    }
}

/// What happened during a step (for logging and effects).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepOutcome {
    pub jumped: bool,
    pub landed: bool,
}

/// Ground-projected forward and strafe-right unit vectors for a look orientation.
pub fn horizontal_basis(look: &Look) -> (Vec3, Vec3) {
    let mut forward = look.forward();
    forward.y = 0.0;
    let forward = forward.normalize_or_zero();
    let right = Vec3::new(-forward.z, 0.0, forward.x);
    (forward, right)
}

/// Advance the player by one frame of `dt` seconds.
pub fn step_player(
    input: &InputState,
    state: &mut PlayerState,
    config: &MovementConfig,
    dt: f32,
) -> StepOutcome {
    let mut outcome = StepOutcome::default();

    // --- Horizontal ---
    // Each held direction adds its own full-speed step; diagonals are not normalized.
    let (forward, right) = horizontal_basis(&state.look);
    let speed = if input.run {
        config.run_speed
    } else {
        config.walk_speed
    };
    let step = speed * dt;

    if input.move_forward {
        state.position += forward * step;
    }
    if input.move_back {
        state.position -= forward * step;
    }
    if input.move_left {
        state.position -= right * step;
    }
    if input.move_right {
        state.position += right * step;
    }

    // --- Jump ---
    if input.jump && state.grounded && state.position.y <= config.ground_height {
        state.vertical_velocity = config.jump_velocity;
        state.grounded = false;
        outcome.jumped = true;
    }

    // --- Gravity + integrate ---
    state.vertical_velocity -= config.gravity * dt;
    state.position.y += state.vertical_velocity * dt;

    // --- Ceiling ---
    // Checked before the floor so the floor always wins, even with a ceiling below it.
    let ceiling = config.ceiling_height.max(config.ground_height);
    if state.position.y > ceiling {
        state.position.y = ceiling;
        state.vertical_velocity = 0.0;
    }

    // --- Floor ---
    if state.position.y < config.ground_height {
        state.position.y = config.ground_height;
        state.vertical_velocity = 0.0;
        outcome.landed = !state.grounded;
        state.grounded = true;
    }

    outcome
}
