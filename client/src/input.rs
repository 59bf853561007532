//! Player input handling
//!
//! Keyboard state becomes a [`desk_shared::InputState`] each frame, mouse motion turns the
//! view while the pointer is locked, and every lock/unlock goes through
//! [`PointerLockRequest`] so the overlays can ask for it too.

use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, CursorOptions, PrimaryWindow};
use desk_shared::{ChatInput, InputState, PlayerState, SceneConfig};

use crate::player::LocalPlayer;
use crate::ui::help::HelpOverlayState;

/// Logical actions for this frame
#[derive(Resource, Default)]
pub struct PlayerInput(pub InputState);

/// Mirrors the primary window's cursor grab.
#[derive(Resource, Default)]
pub struct PointerLock {
    pub locked: bool,
    /// Set on the first successful lock (hides the start prompt)
    pub ever_locked: bool,
}

/// Ask for the pointer to be locked or released. Applied once per frame in `PostUpdate`.
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerLockRequest {
    Lock,
    Release,
}

/// Sample the keyboard. Chat focus suspends movement but keeps fire.
pub fn read_player_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    chat: Res<ChatInput>,
    mut input: ResMut<PlayerInput>,
) {
    let mut state = InputState::from_pressed(|key| keyboard.pressed(key));
    state.fire = mouse_button.just_pressed(MouseButton::Left);
    if chat.focused {
        state = state.without_movement();
    }
    input.0 = state;
}

/// Handle mouse input for looking around
pub fn handle_mouse_look(
    mut mouse_motion: MessageReader<MouseMotion>,
    pointer: Res<PointerLock>,
    config: Res<SceneConfig>,
    mut player: Query<&mut PlayerState, With<LocalPlayer>>,
) {
    if !pointer.locked {
        mouse_motion.clear();
        return;
    }

    let mut delta = Vec2::ZERO;
    for motion in mouse_motion.read() {
        delta += motion.delta;
    }
    if delta == Vec2::ZERO {
        return;
    }

    let Ok(mut state) = player.single_mut() else {
        return;
    };
    state.look.rotate(delta, config.mouse_sensitivity);
}

/// Clicking the scene locks the pointer (and takes focus away from the chat box).
pub fn grab_cursor(
    mouse_button: Res<ButtonInput<MouseButton>>,
    pointer: Res<PointerLock>,
    help: Res<HelpOverlayState>,
    mut chat: ResMut<ChatInput>,
    mut requests: MessageWriter<PointerLockRequest>,
) {
    if pointer.locked || help.visible || !mouse_button.just_pressed(MouseButton::Left) {
        return;
    }
    if chat.focused {
        chat.focused = false;
    }
    requests.write(PointerLockRequest::Lock);
}

/// Esc releases the pointer.
pub fn release_cursor_on_escape(
    keyboard: Res<ButtonInput<KeyCode>>,
    pointer: Res<PointerLock>,
    mut requests: MessageWriter<PointerLockRequest>,
) {
    if pointer.locked && keyboard.just_pressed(KeyCode::Escape) {
        requests.write(PointerLockRequest::Release);
    }
}

/// Apply the last lock request of the frame and sync [`PointerLock`] with the window.
pub fn apply_pointer_lock(
    mut requests: MessageReader<PointerLockRequest>,
    windows: Query<Entity, With<PrimaryWindow>>,
    mut cursor_opts: Query<&mut CursorOptions>,
    mut pointer: ResMut<PointerLock>,
) {
    let Ok(window_entity) = windows.single() else {
        requests.clear();
        return;
    };
    let Ok(mut cursor) = cursor_opts.get_mut(window_entity) else {
        requests.clear();
        return;
    };

    if let Some(request) = requests.read().last().copied() {
        let lock = request == PointerLockRequest::Lock;
        cursor.grab_mode = if lock {
            CursorGrabMode::Locked
        } else {
            CursorGrabMode::None
        };
        cursor.visible = !lock;
        info!("Pointer {}", if lock { "locked" } else { "released" });
    }

    let locked = cursor.grab_mode != CursorGrabMode::None;
    if pointer.locked != locked {
        pointer.locked = locked;
    }
    if locked && !pointer.ever_locked {
        pointer.ever_locked = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        let mut app = App::new();
        app.add_message::<PointerLockRequest>();
        app.init_resource::<PointerLock>();
        app.add_systems(Update, apply_pointer_lock);
        app.world_mut().spawn((Window::default(), CursorOptions::default(), PrimaryWindow));
        app
    }

    #[test]
    fn test_lock_request_grabs_and_hides_cursor() {
        let mut app = app();
        app.world_mut().write_message(PointerLockRequest::Lock);
        app.update();

        let pointer = app.world().resource::<PointerLock>();
        assert!(pointer.locked);
        assert!(pointer.ever_locked);

        let mut cursors = app.world_mut().query::<&CursorOptions>();
        let cursor = cursors.single(app.world()).unwrap();
        assert_eq!(cursor.grab_mode, CursorGrabMode::Locked);
        assert!(!cursor.visible);
    }

    #[test]
    fn test_last_request_wins_and_ever_locked_sticks() {
        let mut app = app();
        app.world_mut().write_message(PointerLockRequest::Lock);
        app.update();
        app.world_mut().write_message(PointerLockRequest::Lock);
        app.world_mut().write_message(PointerLockRequest::Release);
        app.update();

        let pointer = app.world().resource::<PointerLock>();
        assert!(!pointer.locked);
        assert!(pointer.ever_locked);
    }
}
