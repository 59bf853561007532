//! Shared game logic for the desk range: movement, shooting, effects and overlays state.
//!
//! Nothing here touches rendering or windowing; the client drives these types once per frame.

pub mod bubbles;
pub mod chat;
pub mod config;
pub mod effects;
pub mod input;
pub mod movement;
pub mod player;
pub mod raycast;
pub mod weapon;

pub use bubbles::{BubbleBoard, BubbleKind};
pub use chat::ChatInput;
pub use config::SceneConfig;
pub use effects::{EffectId, EffectKind, EffectQueue};
pub use input::{Action, InputState};
pub use movement::{step_player, Look, MovementConfig, PlayerState};
pub use raycast::{Collider, ColliderTag, Ray, RayHit, SceneColliders};
pub use weapon::{fire, ProjectileEvent, ShotResult, WeaponConfig};
