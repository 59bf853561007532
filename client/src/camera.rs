//! First-person camera
//!
//! The camera sits exactly at the player's eye; the gun view-model is parented to it.

use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::prelude::*;
use desk_shared::{PlayerState, SceneConfig};

use crate::player::LocalPlayer;

/// Vertical field of view
const FOV: f32 = 75.0_f32.to_radians();
const NEAR: f32 = 0.05;
const FAR: f32 = 1000.0;

/// Marker for the player's view camera
#[derive(Component)]
pub struct MainCamera;

/// Spawn at the configured eye pose so the first (loading) frames already match the player
pub fn spawn_camera(mut commands: Commands, config: Res<SceneConfig>) {
    let state = PlayerState::new(config.spawn_position(), config.spawn_look());

    commands.spawn((
        MainCamera,
        Camera3d::default(),
        Tonemapping::AcesFitted,
        Projection::from(PerspectiveProjection {
            fov: FOV,
            near: NEAR,
            far: FAR,
            ..default()
        }),
        eye_transform(&state),
    ));
}

/// Eye pose for a player state.
pub fn eye_transform(state: &PlayerState) -> Transform {
    Transform::from_translation(state.position).with_rotation(state.look.rotation())
}

/// Snap the camera to the player's eye
pub fn update_camera(
    player_query: Query<&PlayerState, With<LocalPlayer>>,
    mut camera_query: Query<&mut Transform, With<MainCamera>>,
) {
    let Some(state) = player_query.iter().next() else {
        return;
    };
    let Ok(mut camera_transform) = camera_query.single_mut() else {
        return;
    };
    *camera_transform = eye_transform(state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use desk_shared::movement::Look;

    #[test]
    fn test_camera_spawns_at_configured_eye() {
        let mut app = App::new();
        let config = SceneConfig {
            spawn: [2.0, 3.0, -4.0],
            spawn_look: [1.0, 0.0, 0.0],
            ..default()
        };
        app.insert_resource(config);
        app.add_systems(Update, spawn_camera);
        app.update();

        let mut cameras = app.world_mut().query_filtered::<&Transform, With<MainCamera>>();
        let transform = cameras.single(app.world()).unwrap();
        assert_eq!(transform.translation, Vec3::new(2.0, 3.0, -4.0));
        assert!((transform.forward().as_vec3() - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_eye_transform_looks_along_player_forward() {
        let state = PlayerState::new(Vec3::new(0.0, 1.6, 5.0), Look::new(0.7, -0.2));
        let eye = eye_transform(&state);
        assert_eq!(eye.translation, state.position);
        assert!((eye.forward().as_vec3() - state.look.forward()).length() < 1e-5);
    }
}
