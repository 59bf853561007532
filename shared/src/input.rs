//! Logical player actions and the key-to-action adapter.
//!
//! The integrator never looks at raw keys. The client builds an [`InputState`] once per
//! frame from whatever is held down and hands it to [`crate::movement::step_player`].

use bevy::prelude::*;

/// Everything the player can ask the integrator to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    MoveForward,
    MoveBack,
    MoveLeft,
    MoveRight,
    Run,
    Jump,
    Fire,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::MoveForward,
        Action::MoveBack,
        Action::MoveLeft,
        Action::MoveRight,
        Action::Run,
        Action::Jump,
        Action::Fire,
    ];

    /// Keyboard keys bound to this action. Fire comes from the mouse.
    pub fn keys(self) -> &'static [KeyCode] {
        match self {
            Action::MoveForward => &[KeyCode::KeyW, KeyCode::ArrowUp],
            Action::MoveBack => &[KeyCode::KeyS, KeyCode::ArrowDown],
            Action::MoveLeft => &[KeyCode::KeyA, KeyCode::ArrowLeft],
            Action::MoveRight => &[KeyCode::KeyD, KeyCode::ArrowRight],
            Action::Run => &[KeyCode::ShiftLeft, KeyCode::ShiftRight],
            Action::Jump => &[KeyCode::Space],
            Action::Fire => &[],
        }
    }
}

/// Snapshot of the logical actions for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputState {
    pub move_forward: bool,
    pub move_back: bool,
    pub move_left: bool,
    pub move_right: bool,
    pub run: bool,
    pub jump: bool,
    pub fire: bool,
}

impl InputState {
    /// Build the keyboard part of the state from a "is this key held" predicate.
    ///
    /// Several keys may drive one action (W and Up both move forward); the action is active
    /// while any of them is held, so releasing one does not cancel the other.
    pub fn from_pressed(pressed: impl Fn(KeyCode) -> bool) -> Self {
        let mut state = Self::default();
        for action in Action::ALL {
            if action.keys().iter().any(|&key| pressed(key)) {
                state.set(action, true);
            }
        }
        state
    }

    pub fn set(&mut self, action: Action, active: bool) {
        match action {
            Action::MoveForward => self.move_forward = active,
            Action::MoveBack => self.move_back = active,
            Action::MoveLeft => self.move_left = active,
            Action::MoveRight => self.move_right = active,
            Action::Run => self.run = active,
            Action::Jump => self.jump = active,
            Action::Fire => self.fire = active,
        }
    }

    /// True while any directional key is held (drives the gun bob).
    pub fn is_moving(&self) -> bool {
        self.move_forward || self.move_back || self.move_left || self.move_right
    }

    /// Drop every movement request but keep `fire`.
    pub fn without_movement(self) -> Self {
        Self {
            fire: self.fire,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only(action: Action) -> InputState {
        let mut state = InputState::default();
        state.set(action, true);
        state
    }

    #[test]
    fn test_wasd_and_arrows_are_equivalent() {
        for (key, action) in [
            (KeyCode::KeyW, Action::MoveForward),
            (KeyCode::ArrowUp, Action::MoveForward),
            (KeyCode::KeyA, Action::MoveLeft),
            (KeyCode::ArrowRight, Action::MoveRight),
            (KeyCode::ShiftRight, Action::Run),
            (KeyCode::Space, Action::Jump),
        ] {
            assert_eq!(InputState::from_pressed(|k| k == key), only(action), "{key:?}");
        }
        assert_eq!(InputState::from_pressed(|k| k == KeyCode::KeyQ), InputState::default());
    }

    #[test]
    fn test_from_pressed_holds_action_while_any_key_is_down() {
        // W released, Up still held
        let state = InputState::from_pressed(|key| key == KeyCode::ArrowUp);
        assert!(state.move_forward);
        assert!(!state.move_back);

        let state = InputState::from_pressed(|key| matches!(key, KeyCode::KeyD | KeyCode::ShiftLeft));
        assert!(state.move_right);
        assert!(state.run);
        assert!(!state.jump);
        assert!(!state.fire);
    }

    #[test]
    fn test_without_movement_keeps_fire() {
        let mut state = InputState::from_pressed(|key| key == KeyCode::KeyW || key == KeyCode::Space);
        state.fire = true;
        let frozen = state.without_movement();
        assert!(!frozen.is_moving());
        assert!(!frozen.jump);
        assert!(frozen.fire);
    }
}
