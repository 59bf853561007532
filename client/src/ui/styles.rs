//! Shared UI styles - translucent dark panels with a green accent

use bevy::prelude::*;

/// Full-screen dimmer behind the help overlay and start prompt
pub const OVERLAY_BACKGROUND: Color = Color::srgba(0.0, 0.0, 0.0, 0.7);

/// Help panel card
pub const PANEL_BACKGROUND: Color = Color::srgba(0.2, 0.2, 0.2, 0.8);

/// Controls guide strip at the top of the screen
pub const GUIDE_BACKGROUND: Color = Color::srgba(0.0, 0.0, 0.0, 0.6);

/// Accent color - material green (#4CAF50)
pub const ACCENT_COLOR: Color = Color::srgb(0.298, 0.686, 0.314);

/// Text colors
pub const TEXT_COLOR: Color = Color::WHITE;
pub const TEXT_MUTED: Color = Color::srgb(0.75, 0.75, 0.75);

/// Key caps in the controls guide
pub const KEY_CAP_BACKGROUND: Color = Color::WHITE;
pub const KEY_CAP_TEXT: Color = Color::BLACK;

/// Speech bubbles (alpha is multiplied by the bubble's fade)
pub const EMOTION_BUBBLE_BACKGROUND: Color = Color::srgba(1.0, 1.0, 1.0, 0.8);
pub const EMOTION_BUBBLE_TEXT: Color = Color::BLACK;
pub const CHAT_BUBBLE_BACKGROUND: Color = Color::srgba(0.0, 0.0, 0.0, 0.8);
pub const CHAT_BUBBLE_TEXT: Color = Color::WHITE;

/// Error banner
pub const ERROR_BACKGROUND: Color = Color::srgba(0.55, 0.08, 0.08, 0.85);

/// Draw order, back to front
pub const Z_BUBBLES: i32 = 10;
pub const Z_GUIDE: i32 = 20;
pub const Z_OVERLAY: i32 = 30;

/// Title text style
pub fn title_text_style() -> TextFont {
    TextFont {
        font_size: 28.0,
        ..default()
    }
}

/// Section heading inside the help panel
pub fn heading_text_style() -> TextFont {
    TextFont {
        font_size: 20.0,
        ..default()
    }
}

pub fn body_text_style() -> TextFont {
    TextFont {
        font_size: 16.0,
        ..default()
    }
}

pub fn small_text_style() -> TextFont {
    TextFont {
        font_size: 12.0,
        ..default()
    }
}

/// Square key cap
pub fn key_cap_style() -> Node {
    Node {
        min_width: Val::Px(30.0),
        height: Val::Px(30.0),
        padding: UiRect::horizontal(Val::Px(6.0)),
        justify_content: JustifyContent::Center,
        align_items: AlignItems::Center,
        ..default()
    }
}
