//! Crosshair UI for first-person shooting
//!
//! Green cross with a center dot, shown only while the pointer is locked.

use bevy::prelude::*;

use crate::input::PointerLock;

/// Marker component for the crosshair UI
#[derive(Component)]
pub struct Crosshair;

const CROSSHAIR_COLOR: Color = Color::srgba(0.0, 1.0, 0.0, 0.8);
const ARM_LENGTH: f32 = 10.0;
const ARM_THICKNESS: f32 = 2.0;
const ARM_GAP: f32 = 4.0;

/// Spawn the crosshair UI
pub fn spawn_crosshair(mut commands: Commands) {
    // Root container (full screen, centered)
    commands
        .spawn((
            Crosshair,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                position_type: PositionType::Absolute,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            Visibility::Hidden,
            Pickable::IGNORE,
        ))
        .with_children(|parent| {
            // Zero-size anchor at the screen center; every piece is placed around it
            parent
                .spawn(Node {
                    width: Val::Px(0.0),
                    height: Val::Px(0.0),
                    ..default()
                })
                .with_children(|anchor| {
                    let half = ARM_THICKNESS * 0.5;
                    let far = -(ARM_GAP + ARM_LENGTH);
                    // (width, height, left, top)
                    let pieces = [
                        (4.0, 4.0, -2.0, -2.0),
                        (ARM_THICKNESS, ARM_LENGTH, -half, far),
                        (ARM_THICKNESS, ARM_LENGTH, -half, ARM_GAP),
                        (ARM_LENGTH, ARM_THICKNESS, far, -half),
                        (ARM_LENGTH, ARM_THICKNESS, ARM_GAP, -half),
                    ];
                    for (width, height, left, top) in pieces {
                        anchor.spawn((
                            Node {
                                width: Val::Px(width),
                                height: Val::Px(height),
                                position_type: PositionType::Absolute,
                                left: Val::Px(left),
                                top: Val::Px(top),
                                ..default()
                            },
                            BackgroundColor(CROSSHAIR_COLOR),
                        ));
                    }
                });
        });
}

/// Update crosshair visibility based on pointer lock
pub fn update_crosshair_visibility(
    pointer: Res<PointerLock>,
    mut crosshair_query: Query<&mut Visibility, With<Crosshair>>,
) {
    if !pointer.is_changed() {
        return;
    }
    for mut visibility in crosshair_query.iter_mut() {
        *visibility = if pointer.locked {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
    }
}
