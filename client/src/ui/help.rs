//! Help overlay (Tab), start prompt and the always-on controls guide

use bevy::prelude::*;
use desk_shared::ChatInput;

use super::styles::*;
use crate::input::{PointerLock, PointerLockRequest};

pub struct HelpPlugin;

impl Plugin for HelpPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HelpOverlayState>();
        app.add_systems(
            Startup,
            (spawn_help_overlay, spawn_start_prompt, spawn_controls_guide),
        );
        app.add_systems(Update, (toggle_help_overlay, dismiss_start_prompt));
    }
}

#[derive(Resource, Default)]
pub struct HelpOverlayState {
    pub visible: bool,
}

/// Marker for the help overlay root
#[derive(Component)]
struct HelpOverlayRoot;

/// Marker for the "click to start" prompt
#[derive(Component)]
struct StartPrompt;

const CONTROLS: [(&str, &str); 7] = [
    ("W, A, S, D", "Move"),
    ("Shift", "Run"),
    ("Space", "Jump"),
    ("Mouse", "Look around"),
    ("Left click", "Fire"),
    ("1 - 5", "Quick emotes"),
    ("Enter", "Chat"),
];

const INFO: [(&str, &str); 4] = [
    ("Goal", "Explore freely and enjoy the shooting!"),
    ("VR", "Not available in the desktop build"),
    ("Esc", "Release the mouse pointer"),
    ("Tab", "Close this help"),
];

fn spawn_help_overlay(mut commands: Commands) {
    commands
        .spawn((
            HelpOverlayRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                position_type: PositionType::Absolute,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                display: Display::None,
                ..default()
            },
            BackgroundColor(OVERLAY_BACKGROUND),
            ZIndex(Z_OVERLAY),
        ))
        .with_children(|parent| {
            parent
                .spawn((
                    Node {
                        width: Val::Percent(80.0),
                        max_width: Val::Px(800.0),
                        flex_direction: FlexDirection::Column,
                        padding: UiRect::all(Val::Px(20.0)),
                        row_gap: Val::Px(16.0),
                        ..default()
                    },
                    BackgroundColor(PANEL_BACKGROUND),
                    BorderRadius::all(Val::Px(10.0)),
                ))
                .with_children(|panel| {
                    panel.spawn((
                        Text::new("Desk Range Help"),
                        title_text_style(),
                        TextColor(ACCENT_COLOR),
                        Node {
                            align_self: AlignSelf::Center,
                            ..default()
                        },
                    ));

                    panel
                        .spawn(Node {
                            flex_direction: FlexDirection::Row,
                            column_gap: Val::Px(20.0),
                            ..default()
                        })
                        .with_children(|columns| {
                            spawn_help_column(columns, "Controls", &CONTROLS);
                            spawn_help_column(columns, "Game info", &INFO);
                        });

                    panel.spawn((
                        Text::new("Press Tab again to close this help."),
                        body_text_style(),
                        TextColor(ACCENT_COLOR),
                        Node {
                            align_self: AlignSelf::Center,
                            ..default()
                        },
                    ));
                });
        });
}

fn spawn_help_column(parent: &mut ChildSpawnerCommands<'_>, title: &str, rows: &[(&str, &str)]) {
    parent
        .spawn(Node {
            flex_direction: FlexDirection::Column,
            flex_grow: 1.0,
            flex_basis: Val::Percent(50.0),
            row_gap: Val::Px(10.0),
            ..default()
        })
        .with_children(|column| {
            column.spawn((
                Text::new(title),
                heading_text_style(),
                TextColor(ACCENT_COLOR),
                Node {
                    border: UiRect::bottom(Val::Px(1.0)),
                    padding: UiRect::bottom(Val::Px(5.0)),
                    ..default()
                },
                BorderColor::all(ACCENT_COLOR),
            ));
            for (key, description) in rows {
                column
                    .spawn((Text::new(*key), body_text_style(), TextColor(ACCENT_COLOR)))
                    .with_child((
                        TextSpan::new(format!(" - {description}")),
                        body_text_style(),
                        TextColor(TEXT_COLOR),
                    ));
            }
        });
}

fn spawn_start_prompt(mut commands: Commands) {
    commands
        .spawn((
            StartPrompt,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                position_type: PositionType::Absolute,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            ZIndex(Z_OVERLAY),
            Pickable::IGNORE,
        ))
        .with_children(|parent| {
            parent
                .spawn((
                    Node {
                        flex_direction: FlexDirection::Column,
                        align_items: AlignItems::Center,
                        padding: UiRect::all(Val::Px(20.0)),
                        row_gap: Val::Px(6.0),
                        ..default()
                    },
                    BackgroundColor(OVERLAY_BACKGROUND),
                    BorderRadius::all(Val::Px(10.0)),
                ))
                .with_children(|card| {
                    card.spawn((
                        Text::new("Click the screen to start"),
                        TextFont {
                            font_size: 24.0,
                            ..default()
                        },
                        TextColor(TEXT_COLOR),
                    ));
                    for hint in [
                        "(Press Esc to release the mouse)",
                        "Press Tab to see the help",
                    ] {
                        card.spawn((Text::new(hint), small_text_style(), TextColor(TEXT_MUTED)));
                    }
                });
        });
}

/// Remove the start prompt after the first pointer lock
fn dismiss_start_prompt(
    mut commands: Commands,
    pointer: Res<PointerLock>,
    prompts: Query<Entity, With<StartPrompt>>,
) {
    if !pointer.ever_locked {
        return;
    }
    for entity in prompts.iter() {
        commands.entity(entity).despawn();
    }
}

fn spawn_controls_guide(mut commands: Commands) {
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                position_type: PositionType::Absolute,
                top: Val::Px(20.0),
                justify_content: JustifyContent::Center,
                ..default()
            },
            ZIndex(Z_GUIDE),
            Pickable::IGNORE,
        ))
        .with_children(|parent| {
            parent
                .spawn((
                    Node {
                        flex_direction: FlexDirection::Row,
                        column_gap: Val::Px(20.0),
                        padding: UiRect::axes(Val::Px(20.0), Val::Px(10.0)),
                        ..default()
                    },
                    BackgroundColor(GUIDE_BACKGROUND),
                    BorderRadius::all(Val::Px(10.0)),
                ))
                .with_children(|guide| {
                    // Movement keys
                    spawn_guide_group(guide, "Move", |keys| {
                        for key in ["W", "A", "S", "D"] {
                            spawn_key_cap(keys, key);
                        }
                    });
                    // Everything else, with descriptions
                    spawn_guide_group(guide, "Other", |keys| {
                        keys.spawn(Node {
                            flex_direction: FlexDirection::Column,
                            row_gap: Val::Px(5.0),
                            ..default()
                        })
                        .with_children(|rows| {
                            for (key, description) in
                                [("Tab", "Game help"), ("Esc", "Release mouse pointer")]
                            {
                                rows.spawn(Node {
                                    align_items: AlignItems::Center,
                                    column_gap: Val::Px(5.0),
                                    ..default()
                                })
                                .with_children(|row| {
                                    spawn_key_cap(row, key);
                                    row.spawn((
                                        Text::new(description),
                                        small_text_style(),
                                        TextColor(TEXT_COLOR),
                                    ));
                                });
                            }
                        });
                    });
                });
        });
}

fn spawn_guide_group(
    parent: &mut ChildSpawnerCommands<'_>,
    title: &str,
    keys: impl FnOnce(&mut ChildSpawnerCommands<'_>),
) {
    parent
        .spawn(Node {
            flex_direction: FlexDirection::Column,
            align_items: AlignItems::Center,
            row_gap: Val::Px(10.0),
            ..default()
        })
        .with_children(|group| {
            group.spawn((Text::new(title), body_text_style(), TextColor(TEXT_COLOR)));
            group
                .spawn(Node {
                    column_gap: Val::Px(5.0),
                    flex_wrap: FlexWrap::Wrap,
                    justify_content: JustifyContent::Center,
                    ..default()
                })
                .with_children(keys);
        });
}

fn spawn_key_cap(parent: &mut ChildSpawnerCommands<'_>, key: &str) {
    parent
        .spawn((
            key_cap_style(),
            BackgroundColor(KEY_CAP_BACKGROUND),
            BorderRadius::all(Val::Px(5.0)),
        ))
        .with_child((Text::new(key), body_text_style(), TextColor(KEY_CAP_TEXT)));
}

/// Tab shows/hides the help. Showing releases the pointer; hiding re-locks it unless the
/// chat box has focus.
fn toggle_help_overlay(
    keyboard: Res<ButtonInput<KeyCode>>,
    chat: Res<ChatInput>,
    mut help: ResMut<HelpOverlayState>,
    mut overlays: Query<&mut Node, With<HelpOverlayRoot>>,
    mut requests: MessageWriter<PointerLockRequest>,
) {
    if !keyboard.just_pressed(KeyCode::Tab) {
        return;
    }

    help.visible = !help.visible;
    if help.visible {
        requests.write(PointerLockRequest::Release);
    } else if !chat.focused {
        requests.write(PointerLockRequest::Lock);
    }

    for mut node in overlays.iter_mut() {
        node.display = if help.visible {
            Display::Flex
        } else {
            Display::None
        };
    }
    info!("Help overlay {}", if help.visible { "shown" } else { "hidden" });
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::message::Messages;

    fn app() -> App {
        let mut app = App::new();
        app.add_message::<PointerLockRequest>();
        app.init_resource::<ButtonInput<KeyCode>>();
        app.init_resource::<ChatInput>();
        app.init_resource::<HelpOverlayState>();
        app.add_systems(Update, toggle_help_overlay);
        app
    }

    fn press_tab(app: &mut App) -> Vec<PointerLockRequest> {
        {
            let mut keys = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
            keys.release(KeyCode::Tab);
            keys.clear();
            keys.press(KeyCode::Tab);
        }
        app.update();
        let messages = app.world().resource::<Messages<PointerLockRequest>>();
        let mut cursor = messages.get_cursor();
        cursor.read(messages).copied().collect()
    }

    #[test]
    fn test_tab_toggles_and_relocks() {
        let mut app = app();
        assert_eq!(press_tab(&mut app), vec![PointerLockRequest::Release]);
        assert!(app.world().resource::<HelpOverlayState>().visible);

        let requests = press_tab(&mut app);
        assert!(requests.contains(&PointerLockRequest::Lock));
        assert!(!app.world().resource::<HelpOverlayState>().visible);
    }

    #[test]
    fn test_closing_help_with_chat_focused_keeps_pointer_free() {
        let mut app = app();
        press_tab(&mut app);
        app.world_mut().resource_mut::<ChatInput>().focus();

        let requests = press_tab(&mut app);
        assert!(!requests.contains(&PointerLockRequest::Lock));
    }
}
