//! Text buffer behind the chat box.

use bevy::prelude::*;

/// Longest message the box accepts (chars)
pub const MAX_MESSAGE_CHARS: usize = 200;

#[derive(Resource, Default, Debug, Clone, PartialEq, Eq)]
pub struct ChatInput {
    pub buffer: String,
    /// While focused, keystrokes go to the buffer instead of the player.
    pub focused: bool,
}

impl ChatInput {
    pub fn focus(&mut self) {
        self.focused = true;
    }

    /// Drop focus and whatever was typed.
    pub fn cancel(&mut self) {
        self.focused = false;
        self.buffer.clear();
    }

    /// Append text, dropping control characters and anything past the length cap.
    pub fn insert_str(&mut self, text: &str) {
        let room = MAX_MESSAGE_CHARS.saturating_sub(self.buffer.chars().count());
        self.buffer
            .extend(text.chars().filter(|c| !c.is_control()).take(room));
    }

    pub fn backspace(&mut self) {
        self.buffer.pop();
    }

    /// Take the trimmed message and unfocus. Empty messages leave the box focused.
    pub fn submit(&mut self) -> Option<String> {
        let message = self.buffer.trim().to_string();
        if message.is_empty() {
            self.buffer.clear();
            return None;
        }
        self.buffer.clear();
        self.focused = false;
        Some(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_trims_and_clears() {
        let mut chat = ChatInput::default();
        chat.focus();
        chat.insert_str("  hello desk  ");
        assert_eq!(chat.submit(), Some("hello desk".to_string()));
        assert!(chat.buffer.is_empty());
        assert!(!chat.focused);
    }

    #[test]
    fn test_submit_rejects_blank() {
        let mut chat = ChatInput::default();
        chat.focus();
        chat.insert_str("   ");
        assert_eq!(chat.submit(), None);
        assert!(chat.buffer.is_empty());
        assert!(chat.focused);
    }

    #[test]
    fn test_backspace_handles_multibyte() {
        let mut chat = ChatInput::default();
        chat.insert_str("héé");
        chat.backspace();
        assert_eq!(chat.buffer, "hé");
    }

    #[test]
    fn test_insert_filters_control_chars_and_caps_length() {
        let mut chat = ChatInput::default();
        chat.insert_str("a\nb\tc");
        assert_eq!(chat.buffer, "abc");

        chat.insert_str(&"x".repeat(MAX_MESSAGE_CHARS * 2));
        assert_eq!(chat.buffer.chars().count(), MAX_MESSAGE_CHARS);
    }

    #[test]
    fn test_cancel_drops_text() {
        let mut chat = ChatInput::default();
        chat.focus();
        chat.insert_str("draft");
        chat.cancel();
        assert!(!chat.focused);
        assert!(chat.buffer.is_empty());
    }
}
