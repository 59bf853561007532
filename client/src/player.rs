//! Local player: movement step and the dummy body that follows the camera

use bevy::prelude::*;
use desk_shared::movement::{step_player, PlayerState};
use desk_shared::player::{BODY_BELOW_EYE, PLAYER_BODY_LENGTH, PLAYER_RADIUS};
use desk_shared::SceneConfig;

use crate::input::PlayerInput;

/// Marker for the locally controlled player (carries [`PlayerState`])
#[derive(Component)]
pub struct LocalPlayer;

const BODY_COLOR: Color = Color::srgb(0.2, 0.4, 1.0);

/// Spawn the player at the configured eye position with a blue capsule body
pub fn spawn_local_player(
    mut commands: Commands,
    config: Res<SceneConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let state = PlayerState::new(config.spawn_position(), config.spawn_look());

    commands.spawn((
        LocalPlayer,
        state,
        Mesh3d(meshes.add(Capsule3d::new(PLAYER_RADIUS, PLAYER_BODY_LENGTH))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: BODY_COLOR,
            perceptual_roughness: 0.7,
            metallic: 0.1,
            ..default()
        })),
        body_transform(&state),
    ));

    info!("Spawned local player at {:?}", state.position);
}

/// Body pose for a player state: below the eye, turned to the look yaw.
pub fn body_transform(state: &PlayerState) -> Transform {
    Transform::from_translation(state.position - Vec3::Y * BODY_BELOW_EYE)
        .with_rotation(Quat::from_rotation_y(state.look.yaw))
}

/// Advance movement, gravity and jump by one frame
pub fn step_local_player(
    input: Res<PlayerInput>,
    config: Res<SceneConfig>,
    time: Res<Time>,
    mut player: Query<&mut PlayerState, With<LocalPlayer>>,
) {
    let Ok(mut state) = player.single_mut() else {
        return;
    };

    let outcome = step_player(&input.0, &mut state, &config.movement, time.delta_secs());
    if outcome.jumped {
        debug!("Jump from {:.2}", state.position.y);
    }
    if outcome.landed {
        debug!("Landed at {:?}", state.position);
    }
}

pub fn sync_player_body(mut player: Query<(&PlayerState, &mut Transform), With<LocalPlayer>>) {
    for (state, mut transform) in player.iter_mut() {
        *transform = body_transform(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use desk_shared::movement::Look;

    #[test]
    fn test_body_hangs_below_eye_and_faces_yaw() {
        let state = PlayerState::new(Vec3::new(1.0, 1.6, 2.0), Look::new(std::f32::consts::FRAC_PI_2, 0.3));
        let transform = body_transform(&state);
        assert!((transform.translation - Vec3::new(1.0, 0.3, 2.0)).length() < 1e-5);

        // Body forward matches the look direction projected on the ground
        let body_forward = transform.rotation * Vec3::NEG_Z;
        assert!((body_forward - Vec3::NEG_X).length() < 1e-5);
    }
}
