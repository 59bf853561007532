//! Emotion and chat speech bubbles
//!
//! Emotions stack in the top right corner, chat messages in the top left. Each bubble
//! mirrors an entry of the shared [`BubbleBoard`] and fades with it.

use bevy::prelude::*;
use desk_shared::bubbles::{emotion_for_digit, BubbleId, BubbleKind};
use desk_shared::{BubbleBoard, ChatInput};

use super::styles::*;

pub struct BubblesPlugin;

impl Plugin for BubblesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BubbleBoard>();
        app.add_systems(Startup, spawn_bubble_columns);
        app.add_systems(Update, (emotion_hotkeys, tick_bubbles, sync_bubble_nodes).chain());
    }
}

#[derive(Component)]
struct EmotionColumn;

#[derive(Component)]
struct ChatColumn;

/// Text inside a bubble; `base` is its color at full opacity
#[derive(Component)]
struct BubbleText {
    base: Color,
}

/// Digit key -> preset number
pub fn digit_for_key(key: KeyCode) -> Option<u8> {
    match key {
        KeyCode::Digit1 | KeyCode::Numpad1 => Some(1),
        KeyCode::Digit2 | KeyCode::Numpad2 => Some(2),
        KeyCode::Digit3 | KeyCode::Numpad3 => Some(3),
        KeyCode::Digit4 | KeyCode::Numpad4 => Some(4),
        KeyCode::Digit5 | KeyCode::Numpad5 => Some(5),
        _ => None,
    }
}

fn spawn_bubble_columns(mut commands: Commands) {
    let column = |left: Option<f32>, right: Option<f32>, align: AlignItems| Node {
        position_type: PositionType::Absolute,
        top: Val::Px(20.0),
        left: left.map_or(Val::Auto, Val::Px),
        right: right.map_or(Val::Auto, Val::Px),
        max_width: Val::Px(300.0),
        flex_direction: FlexDirection::Column,
        align_items: align,
        row_gap: Val::Px(10.0),
        ..default()
    };

    commands.spawn((
        EmotionColumn,
        column(None, Some(20.0), AlignItems::FlexEnd),
        ZIndex(Z_BUBBLES),
        Pickable::IGNORE,
    ));
    commands.spawn((
        ChatColumn,
        column(Some(20.0), None, AlignItems::FlexStart),
        ZIndex(Z_BUBBLES),
        Pickable::IGNORE,
    ));
}

/// Keys 1-5 pop an emotion bubble, unless the chat box is taking the keyboard
fn emotion_hotkeys(
    keyboard: Res<ButtonInput<KeyCode>>,
    chat: Res<ChatInput>,
    mut board: ResMut<BubbleBoard>,
) {
    if chat.focused {
        return;
    }
    for key in keyboard.get_just_pressed() {
        let Some(text) = digit_for_key(*key).and_then(emotion_for_digit) else {
            continue;
        };
        board.push_emotion(text);
        debug!("Emotion: {text}");
    }
}

fn tick_bubbles(time: Res<Time>, mut board: ResMut<BubbleBoard>) {
    board.tick(time.delta_secs());
}

/// Spawn nodes for new bubbles, fade live ones, remove the rest
fn sync_bubble_nodes(
    mut commands: Commands,
    board: Res<BubbleBoard>,
    emotion_column: Query<Entity, With<EmotionColumn>>,
    chat_column: Query<Entity, With<ChatColumn>>,
    mut nodes: Query<(Entity, &BubbleId, &mut BackgroundColor, &Children)>,
    mut texts: Query<(&BubbleText, &mut TextColor)>,
) {
    let mut shown = Vec::new();

    for (entity, id, mut background, children) in nodes.iter_mut() {
        let Some(bubble) = board.get(*id) else {
            commands.entity(entity).despawn();
            continue;
        };
        shown.push(*id);

        let opacity = bubble.opacity();
        let base = match bubble.kind {
            BubbleKind::Emotion => EMOTION_BUBBLE_BACKGROUND,
            BubbleKind::Chat { .. } => CHAT_BUBBLE_BACKGROUND,
        };
        background.0 = faded(base, opacity);
        for child in children.iter() {
            if let Ok((text, mut color)) = texts.get_mut(child) {
                color.0 = faded(text.base, opacity);
            }
        }
    }

    for bubble in board.iter().filter(|b| !shown.contains(&b.id)) {
        let (column, background, text_color) = match bubble.kind {
            BubbleKind::Emotion => (
                emotion_column.single(),
                EMOTION_BUBBLE_BACKGROUND,
                EMOTION_BUBBLE_TEXT,
            ),
            BubbleKind::Chat { .. } => {
                (chat_column.single(), CHAT_BUBBLE_BACKGROUND, CHAT_BUBBLE_TEXT)
            }
        };
        let Ok(column) = column else { continue };
        let opacity = bubble.opacity();

        let node = commands
            .spawn((
                bubble.id,
                Node {
                    flex_direction: FlexDirection::Column,
                    padding: UiRect::axes(Val::Px(15.0), Val::Px(10.0)),
                    row_gap: Val::Px(4.0),
                    ..default()
                },
                BackgroundColor(faded(background, opacity)),
                BorderRadius::all(Val::Px(20.0)),
            ))
            .with_children(|parent| {
                if let BubbleKind::Chat { username } = &bubble.kind {
                    parent.spawn((
                        BubbleText { base: ACCENT_COLOR },
                        Text::new(username.clone()),
                        heading_text_style(),
                        TextColor(faded(ACCENT_COLOR, opacity)),
                    ));
                }
                parent.spawn((
                    BubbleText { base: text_color },
                    Text::new(bubble.text.clone()),
                    body_text_style(),
                    TextColor(faded(text_color, opacity)),
                ));
            })
            .id();
        commands.entity(column).add_child(node);
    }
}

fn faded(base: Color, opacity: f32) -> Color {
    let mut color = base;
    color.set_alpha(base.alpha() * opacity.clamp(0.0, 1.0));
    color
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_keys_map_to_presets() {
        assert_eq!(digit_for_key(KeyCode::Digit1), Some(1));
        assert_eq!(digit_for_key(KeyCode::Numpad5), Some(5));
        assert_eq!(digit_for_key(KeyCode::Digit6), None);
        assert_eq!(digit_for_key(KeyCode::KeyW), None);
    }

    #[test]
    fn test_faded_scales_alpha() {
        let color = faded(EMOTION_BUBBLE_BACKGROUND, 0.5);
        assert!((color.alpha() - 0.4).abs() < 1e-5);
        assert_eq!(faded(CHAT_BUBBLE_TEXT, 2.0).alpha(), 1.0);
    }

    fn hotkey_app(focused: bool) -> App {
        let mut app = App::new();
        app.init_resource::<ButtonInput<KeyCode>>();
        app.init_resource::<BubbleBoard>();
        app.insert_resource(ChatInput {
            focused,
            ..default()
        });
        app.add_systems(Update, emotion_hotkeys);
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::Digit2);
        app.update();
        app
    }

    #[test]
    fn test_hotkey_pushes_emotion() {
        let app = hotkey_app(false);
        let board = app.world().resource::<BubbleBoard>();
        let texts: Vec<_> = board.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, vec!["Nice!"]);
    }

    #[test]
    fn test_hotkeys_ignored_while_typing() {
        let app = hotkey_app(true);
        assert!(app.world().resource::<BubbleBoard>().is_empty());
    }
}
