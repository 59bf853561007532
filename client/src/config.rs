//! Scene configuration loading (RON)
//!
//! The file is optional: a missing or broken config logs a warning and the built-in
//! defaults are used instead.

use std::fs;
use std::path::Path;

use bevy::asset::io::file::FileAssetReader;
use bevy::prelude::*;
use desk_shared::SceneConfig;

/// Config file location relative to the asset root
pub const SCENE_CONFIG_PATH: &str = "config/scene.ron";

pub fn parse_scene_config(text: &str) -> Result<SceneConfig, ron::error::SpannedError> {
    ron::from_str(text)
}

/// Read `<asset_root>/config/scene.ron`, falling back to defaults. Relative roots resolve
/// the same way the asset server resolves them.
pub fn load_scene_config(asset_root: &str) -> SceneConfig {
    let path = FileAssetReader::get_base_path()
        .join(Path::new(asset_root))
        .join(SCENE_CONFIG_PATH);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) => {
            info!("No scene config at {:?} ({err}); using defaults", path);
            return SceneConfig::default();
        }
    };

    match parse_scene_config(&text) {
        Ok(mut config) => {
            info!("Loaded scene config from {:?}", path);
            for section in config.sanitize() {
                warn!("Invalid `{section}` in {:?}; using defaults for it", path);
            }
            config
        }
        Err(err) => {
            warn!("Failed to parse scene config {:?}: {err}; using defaults", path);
            SceneConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = parse_scene_config(
            "(movement: (walk_speed: 4.5), profile_name: \"Desk Tester\")",
        )
        .unwrap();
        assert_eq!(config.movement.walk_speed, 4.5);
        assert_eq!(config.movement.run_speed, SceneConfig::default().movement.run_speed);
        assert_eq!(config.display_name(), "Desk Tester");
        assert_eq!(config.desk, SceneConfig::default().desk);
    }

    #[test]
    fn test_empty_struct_is_default() {
        assert_eq!(parse_scene_config("()").unwrap(), SceneConfig::default());
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        assert!(parse_scene_config("(movement: (walk_speed: \"fast\"))").is_err());
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let config = parse_scene_config(include_str!("../assets/config/scene.ron")).unwrap();
        let defaults = SceneConfig::default();
        assert_eq!(config.weapon, defaults.weapon);
        assert_eq!(config.desk, defaults.desk);
        assert_eq!(config.spawn, defaults.spawn);
        assert_eq!(config.spawn_look, defaults.spawn_look);
        assert_eq!(config.textures, defaults.textures);
        assert!(config.clone().sanitize().is_empty());
        assert!((config.movement.gravity - defaults.movement.gravity).abs() < 1e-3);
        assert!((config.movement.walk_speed - defaults.movement.walk_speed).abs() < 1e-3);
    }

    #[test]
    fn test_inverted_heights_fall_back_to_default_movement() {
        let mut config = parse_scene_config(
            "(movement: (ground_height: 0.5, ceiling_height: 0.2), mouse_sensitivity: 0.003)",
        )
        .unwrap();
        assert_eq!(config.sanitize(), vec!["movement"]);
        assert_eq!(config.movement, SceneConfig::default().movement);
        assert_eq!(config.mouse_sensitivity, 0.003);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = load_scene_config("/definitely/not/a/real/asset/root");
        assert_eq!(config, SceneConfig::default());
    }
}
