//! Scene configuration, deserialized from RON by the client.
//!
//! Every field has a default so a partial (or missing) file still produces a playable scene.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::movement::{Look, MovementConfig};
use crate::player::{MOUSE_SENSITIVITY, SPAWN_POSITION};
use crate::weapon::WeaponConfig;

/// Desk model placement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    /// glTF path relative to the asset root
    pub model: String,
    pub position: [f32; 3],
    pub scale: f32,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            model: "models/desk.glb".to_string(),
            position: [0.0, -0.96, 0.0],
            scale: 1.0,
        }
    }
}

/// Texture paths relative to the asset root.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    pub grass_color: String,
    pub grass_normal: String,
    pub grass_roughness: String,
    pub wood_color: String,
    pub wood_normal: String,
    pub wood_roughness: String,
    /// How many times the grass tiles across the ground
    pub grass_repeat: f32,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            grass_color: "textures/grass/color.jpg".to_string(),
            grass_normal: "textures/grass/normal.jpg".to_string(),
            grass_roughness: "textures/grass/roughness.jpg".to_string(),
            wood_color: "textures/wood/color.jpg".to_string(),
            wood_normal: "textures/wood/normal.jpg".to_string(),
            wood_roughness: "textures/wood/roughness.jpg".to_string(),
            grass_repeat: 25.0,
        }
    }
}

#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub movement: MovementConfig,
    pub weapon: WeaponConfig,
    /// Eye position at startup
    pub spawn: [f32; 3],
    /// Initial look direction
    pub spawn_look: [f32; 3],
    /// Radians per pixel of mouse motion
    pub mouse_sensitivity: f32,
    pub desk: DeskConfig,
    pub textures: TextureConfig,
    /// Name shown on chat bubbles
    pub profile_name: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            movement: MovementConfig::default(),
            weapon: WeaponConfig::default(),
            spawn: SPAWN_POSITION,
            spawn_look: [0.0, 0.0, -1.0],
            mouse_sensitivity: MOUSE_SENSITIVITY,
            desk: DeskConfig::default(),
            textures: TextureConfig::default(),
            profile_name: "User".to_string(),
        }
    }
}

impl SceneConfig {
    pub fn spawn_position(&self) -> Vec3 {
        Vec3::from_array(self.spawn)
    }

    pub fn spawn_look(&self) -> Look {
        Look::from_direction(Vec3::from_array(self.spawn_look))
    }

    /// Reset every section holding unusable values (non-finite numbers, negative speeds,
    /// a ceiling under the ground...) to its default. Returns the names of the reset sections.
    pub fn sanitize(&mut self) -> Vec<&'static str> {
        let defaults = Self::default();
        let finite = |v: &[f32]| v.iter().all(|x| x.is_finite());
        let mut reset = Vec::new();

        if !self.movement.is_valid() {
            self.movement = defaults.movement;
            reset.push("movement");
        }
        if !self.weapon.is_valid() {
            self.weapon = defaults.weapon;
            reset.push("weapon");
        }
        if !finite(&self.spawn) {
            self.spawn = defaults.spawn;
            reset.push("spawn");
        }
        if !finite(&self.spawn_look) || Vec3::from_array(self.spawn_look) == Vec3::ZERO {
            self.spawn_look = defaults.spawn_look;
            reset.push("spawn_look");
        }
        if !(self.mouse_sensitivity.is_finite() && self.mouse_sensitivity > 0.0) {
            self.mouse_sensitivity = defaults.mouse_sensitivity;
            reset.push("mouse_sensitivity");
        }
        if !(finite(&self.desk.position) && self.desk.scale.is_finite() && self.desk.scale > 0.0) {
            self.desk = defaults.desk;
            reset.push("desk");
        }
        if !(self.textures.grass_repeat.is_finite() && self.textures.grass_repeat > 0.0) {
            self.textures.grass_repeat = defaults.textures.grass_repeat;
            reset.push("textures.grass_repeat");
        }
        reset
    }

    /// Name for chat bubbles; blank names fall back to "User".
    pub fn display_name(&self) -> &str {
        let name = self.profile_name.trim();
        if name.is_empty() { "User" } else { name }
    }
}
