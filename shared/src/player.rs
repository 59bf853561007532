//! Player-related constants

/// Y of the visible ground plane.
pub const GROUND_PLANE_Y: f32 = -1.0;

/// Lowest eye height the player can stand at (camera Y when grounded).
pub const GROUND_EYE_HEIGHT: f32 = 0.5;

/// Highest eye height before the invisible ceiling stops the player.
pub const CEILING_EYE_HEIGHT: f32 = 10.0;

/// Spawn position for the player's eye
pub const SPAWN_POSITION: [f32; 3] = [0.0, 1.6, 5.0];

/// Dummy body sits this far below the eye.
pub const BODY_BELOW_EYE: f32 = 1.3;

/// Body capsule radius
pub const PLAYER_RADIUS: f32 = 0.3;

/// Length of the capsule's cylindrical section
pub const PLAYER_BODY_LENGTH: f32 = 1.0;

/// Mouse sensitivity for look (radians per pixel)
pub const MOUSE_SENSITIVITY: f32 = 0.002;

/// Pitch is kept just short of straight up/down so the ground-projected forward never vanishes.
pub const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;
