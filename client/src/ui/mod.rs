//! UI module

pub mod bubbles;
pub mod chat;
pub mod help;
pub mod loading;
pub mod styles;

pub use bubbles::BubblesPlugin;
pub use chat::ChatPlugin;
pub use help::HelpPlugin;
pub use loading::LoadingPlugin;
