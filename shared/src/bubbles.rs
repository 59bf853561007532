//! Speech bubbles drawn over the view: emotion presets and chat messages.

use bevy::prelude::*;

/// Fade-in time (s)
pub const BUBBLE_FADE_IN: f32 = 0.5;

/// Bubble is fully visible until this age (s)
pub const BUBBLE_HOLD_UNTIL: f32 = 5.0;

/// Fade-out time after the hold (s)
pub const BUBBLE_FADE_OUT: f32 = 0.5;

/// Total on-screen time (s)
pub const BUBBLE_LIFETIME: f32 = BUBBLE_HOLD_UNTIL + BUBBLE_FADE_OUT;

/// Canned phrases bound to digit keys 1..=5.
pub const EMOTION_PRESETS: [&str; 5] = ["Hello!", "Nice!", "Help me!", "Thank you!", "Well done!"];

/// Preset for a digit key, `1` being the first.
pub fn emotion_for_digit(digit: u8) -> Option<&'static str> {
    let index = usize::from(digit).checked_sub(1)?;
    EMOTION_PRESETS.get(index).copied()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BubbleKind {
    /// Quick reaction, shown top right
    Emotion,
    /// Typed message, shown top left under the sender's name
    Chat { username: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Component)]
pub struct BubbleId(pub u64);

#[derive(Clone, Debug, PartialEq)]
pub struct Bubble {
    pub id: BubbleId,
    pub kind: BubbleKind,
    pub text: String,
    pub age: f32,
}

impl Bubble {
    /// Fade in, hold, fade out.
    pub fn opacity(&self) -> f32 {
        if self.age < BUBBLE_FADE_IN {
            (self.age / BUBBLE_FADE_IN).max(0.0)
        } else if self.age < BUBBLE_HOLD_UNTIL {
            1.0
        } else {
            (1.0 - (self.age - BUBBLE_HOLD_UNTIL) / BUBBLE_FADE_OUT).max(0.0)
        }
    }

    pub fn is_expired(&self) -> bool {
        self.age >= BUBBLE_LIFETIME
    }
}

/// All live bubbles, oldest first.
#[derive(Resource, Default, Debug)]
pub struct BubbleBoard {
    bubbles: Vec<Bubble>,
    next_id: u64,
}

impl BubbleBoard {
    /// Blank or whitespace-only text is ignored.
    pub fn push(&mut self, kind: BubbleKind, text: &str) -> Option<BubbleId> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let id = BubbleId(self.next_id);
        self.next_id += 1;
        self.bubbles.push(Bubble {
            id,
            kind,
            text: text.to_string(),
            age: 0.0,
        });
        Some(id)
    }

    pub fn push_emotion(&mut self, text: &str) -> Option<BubbleId> {
        self.push(BubbleKind::Emotion, text)
    }

    pub fn push_chat(&mut self, username: &str, text: &str) -> Option<BubbleId> {
        self.push(
            BubbleKind::Chat {
                username: username.to_string(),
            },
            text,
        )
    }

    /// Age every bubble and drop expired ones, returning their ids.
    pub fn tick(&mut self, dt: f32) -> Vec<BubbleId> {
        let mut expired = Vec::new();
        self.bubbles.retain_mut(|bubble| {
            bubble.age += dt.max(0.0);
            if bubble.is_expired() {
                expired.push(bubble.id);
                false
            } else {
                true
            }
        });
        expired
    }

    pub fn get(&self, id: BubbleId) -> Option<&Bubble> {
        self.bubbles.iter().find(|b| b.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bubble> {
        self.bubbles.iter()
    }

    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_digit_presets() {
        assert_eq!(emotion_for_digit(1), Some("Hello!"));
        assert_eq!(emotion_for_digit(5), Some("Well done!"));
        assert_eq!(emotion_for_digit(0), None);
        assert_eq!(emotion_for_digit(6), None);
    }

    #[test]
    fn test_blank_text_is_ignored() {
        let mut board = BubbleBoard::default();
        assert!(board.push_emotion("").is_none());
        assert!(board.push_chat("User", "   \t").is_none());
        assert!(board.is_empty());
    }

    #[test]
    fn test_opacity_lifecycle() {
        let mut board = BubbleBoard::default();
        let id = board.push_emotion("Nice!").unwrap();
        assert!(board.get(id).unwrap().opacity().abs() < EPS);

        board.tick(0.25);
        assert!((board.get(id).unwrap().opacity() - 0.5).abs() < EPS);

        board.tick(2.0);
        assert_eq!(board.get(id).unwrap().opacity(), 1.0);

        board.tick(3.0);
        assert!((board.get(id).unwrap().opacity() - 0.5).abs() < 1e-4);

        let expired = board.tick(0.3);
        assert_eq!(expired, vec![id]);
        assert!(board.get(id).is_none());
    }

    #[test]
    fn test_chat_bubble_keeps_username_and_trimmed_text() {
        let mut board = BubbleBoard::default();
        let id = board.push_chat("User", "  hi there ").unwrap();
        let bubble = board.get(id).unwrap();
        assert_eq!(bubble.text, "hi there");
        assert_eq!(
            bubble.kind,
            BubbleKind::Chat {
                username: "User".to_string()
            }
        );
    }

    #[test]
    fn test_bubbles_expire_in_order() {
        let mut board = BubbleBoard::default();
        let first = board.push_emotion("Hello!").unwrap();
        board.tick(1.0);
        let second = board.push_emotion("Help me!").unwrap();

        assert_eq!(board.tick(4.6), vec![first]);
        assert_eq!(board.len(), 1);
        assert_eq!(board.tick(1.0), vec![second]);
    }
}
