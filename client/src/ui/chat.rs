//! Chat box at the bottom of the screen
//!
//! Enter focuses the box (and frees the pointer), typing fills the shared [`ChatInput`]
//! buffer, Enter again posts the message as a chat bubble.

use bevy::input::keyboard::{Key, KeyboardInput};
use bevy::prelude::*;
use desk_shared::{BubbleBoard, ChatInput, SceneConfig};

use super::styles::*;
use crate::input::PointerLockRequest;

pub struct ChatPlugin;

impl Plugin for ChatPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ChatInput>();
        app.add_systems(Startup, spawn_chat_box);
        app.add_systems(Update, (handle_chat_keys, update_chat_box).chain());
    }
}

#[derive(Component)]
struct ChatBox;

#[derive(Component)]
struct ChatBoxText;

const PLACEHOLDER: &str = "Press Enter to chat";

/// What the box shows: the buffer with a caret while focused, a hint otherwise
pub fn chat_box_label(chat: &ChatInput) -> String {
    if chat.focused {
        format!("{}_", chat.buffer)
    } else if chat.buffer.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        chat.buffer.clone()
    }
}

/// Ctrl+V, or Cmd+V on macOS
pub fn is_paste_shortcut(key: &Key, command_held: bool) -> bool {
    command_held && matches!(key, Key::Character(c) if c.eq_ignore_ascii_case("v"))
}

fn spawn_chat_box(mut commands: Commands) {
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                position_type: PositionType::Absolute,
                bottom: Val::Px(20.0),
                justify_content: JustifyContent::Center,
                ..default()
            },
            ZIndex(Z_GUIDE),
            Pickable::IGNORE,
        ))
        .with_children(|parent| {
            parent
                .spawn((
                    ChatBox,
                    Node {
                        width: Val::Px(400.0),
                        padding: UiRect::all(Val::Px(10.0)),
                        border: UiRect::all(Val::Px(2.0)),
                        ..default()
                    },
                    BackgroundColor(GUIDE_BACKGROUND),
                    BorderColor::all(TEXT_MUTED),
                    BorderRadius::all(Val::Px(5.0)),
                ))
                .with_child((
                    ChatBoxText,
                    Text::new(PLACEHOLDER),
                    body_text_style(),
                    TextColor(TEXT_MUTED),
                ));
        });
}

fn handle_chat_keys(
    mut key_events: MessageReader<KeyboardInput>,
    keyboard: Res<ButtonInput<KeyCode>>,
    config: Res<SceneConfig>,
    mut chat: ResMut<ChatInput>,
    mut board: ResMut<BubbleBoard>,
    mut requests: MessageWriter<PointerLockRequest>,
) {
    let command_held = keyboard.any_pressed([
        KeyCode::ControlLeft,
        KeyCode::ControlRight,
        KeyCode::SuperLeft,
        KeyCode::SuperRight,
    ]);

    for event in key_events.read() {
        if !event.state.is_pressed() {
            continue;
        }

        if !chat.focused {
            if event.logical_key == Key::Enter && !event.repeat {
                chat.focus();
                requests.write(PointerLockRequest::Release);
            }
            continue;
        }

        match &event.logical_key {
            Key::Enter => {
                if let Some(message) = chat.submit() {
                    let name = config.display_name();
                    info!("{name}: {message}");
                    board.push_chat(name, &message);
                }
            }
            Key::Escape => chat.cancel(),
            Key::Backspace => chat.backspace(),
            Key::Space => chat.insert_str(" "),
            key if is_paste_shortcut(key, command_held) => paste_clipboard(&mut chat),
            Key::Character(text) if !command_held => chat.insert_str(text),
            _ => {}
        }
    }
}

fn paste_clipboard(chat: &mut ChatInput) {
    let text = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.get_text());
    match text {
        Ok(text) => chat.insert_str(&text),
        Err(err) => warn!("Clipboard unavailable: {err}"),
    }
}

fn update_chat_box(
    chat: Res<ChatInput>,
    mut boxes: Query<&mut BorderColor, With<ChatBox>>,
    mut texts: Query<(&mut Text, &mut TextColor), With<ChatBoxText>>,
) {
    if !chat.is_changed() {
        return;
    }

    for mut border in boxes.iter_mut() {
        *border = BorderColor::all(if chat.focused { ACCENT_COLOR } else { TEXT_MUTED });
    }
    for (mut text, mut color) in texts.iter_mut() {
        text.0 = chat_box_label(&chat);
        color.0 = if chat.focused || !chat.buffer.is_empty() {
            TEXT_COLOR
        } else {
            TEXT_MUTED
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::message::Messages;
    use bevy::input::ButtonState;

    #[test]
    fn test_label_shows_caret_or_placeholder() {
        let mut chat = ChatInput::default();
        assert_eq!(chat_box_label(&chat), PLACEHOLDER);
        chat.focus();
        assert_eq!(chat_box_label(&chat), "_");
        chat.insert_str("hi");
        assert_eq!(chat_box_label(&chat), "hi_");
    }

    #[test]
    fn test_paste_shortcut_needs_modifier() {
        assert!(is_paste_shortcut(&Key::Character("v".into()), true));
        assert!(is_paste_shortcut(&Key::Character("V".into()), true));
        assert!(!is_paste_shortcut(&Key::Character("v".into()), false));
        assert!(!is_paste_shortcut(&Key::Character("c".into()), true));
    }

    fn app() -> App {
        let mut app = App::new();
        app.add_message::<KeyboardInput>();
        app.add_message::<PointerLockRequest>();
        app.init_resource::<ButtonInput<KeyCode>>();
        app.init_resource::<ChatInput>();
        app.init_resource::<BubbleBoard>();
        app.insert_resource(SceneConfig::default());
        app.add_systems(Update, handle_chat_keys);
        app
    }

    fn press(app: &mut App, key_code: KeyCode, logical_key: Key) {
        app.world_mut().write_message(KeyboardInput {
            key_code,
            logical_key,
            state: ButtonState::Pressed,
            text: None,
            repeat: false,
            window: Entity::PLACEHOLDER,
        });
    }

    #[test]
    fn test_type_and_submit_posts_bubble() {
        let mut app = app();
        press(&mut app, KeyCode::Enter, Key::Enter);
        app.update();
        assert!(app.world().resource::<ChatInput>().focused);
        let messages = app.world().resource::<Messages<PointerLockRequest>>();
        let mut cursor = messages.get_cursor();
        let requests: Vec<_> = cursor.read(messages).copied().collect();
        assert_eq!(requests, vec![PointerLockRequest::Release]);

        press(&mut app, KeyCode::KeyH, Key::Character("h".into()));
        press(&mut app, KeyCode::KeyI, Key::Character("i".into()));
        press(&mut app, KeyCode::Space, Key::Space);
        press(&mut app, KeyCode::Enter, Key::Enter);
        app.update();

        let chat = app.world().resource::<ChatInput>();
        assert!(!chat.focused);
        assert!(chat.buffer.is_empty());
        let board = app.world().resource::<BubbleBoard>();
        let bubble = board.iter().next().unwrap();
        assert_eq!(bubble.text, "hi");
    }

    #[test]
    fn test_escape_cancels() {
        let mut app = app();
        press(&mut app, KeyCode::Enter, Key::Enter);
        press(&mut app, KeyCode::KeyA, Key::Character("a".into()));
        press(&mut app, KeyCode::Escape, Key::Escape);
        app.update();

        let chat = app.world().resource::<ChatInput>();
        assert!(!chat.focused);
        assert!(chat.buffer.is_empty());
        assert!(app.world().resource::<BubbleBoard>().is_empty());
    }
}
