//! Loading overlay and the load error banner

use bevy::prelude::*;

use super::styles::*;
use crate::scene::{LoadProgress, LoadStatus};
use crate::states::GameState;

pub struct LoadingPlugin;

impl Plugin for LoadingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LoadStatus>();
        app.add_systems(Startup, spawn_loading_overlay);
        app.add_systems(Update, update_loading_text.run_if(in_state(GameState::Loading)));
        app.add_systems(OnExit(GameState::Loading), hide_loading_overlay);
        app.add_systems(Update, (spawn_error_banner, tick_error_banner).chain());
    }
}

#[derive(Component)]
struct LoadingOverlay;

#[derive(Component)]
struct LoadingText;

#[derive(Component)]
struct ErrorBanner;

#[derive(Component)]
struct ErrorBannerText;

/// "Loading... 42%"
pub fn loading_label(progress: &LoadProgress) -> String {
    format!("Loading... {:.0}%", progress.fraction() * 100.0)
}

fn spawn_loading_overlay(mut commands: Commands) {
    commands
        .spawn((
            LoadingOverlay,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                position_type: PositionType::Absolute,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(OVERLAY_BACKGROUND),
            ZIndex(Z_OVERLAY + 1),
            Pickable::IGNORE,
        ))
        .with_child((
            LoadingText,
            Text::new(loading_label(&LoadProgress::default())),
            title_text_style(),
            TextColor(TEXT_COLOR),
        ));
}

fn update_loading_text(status: Res<LoadStatus>, mut texts: Query<&mut Text, With<LoadingText>>) {
    if !status.is_changed() {
        return;
    }
    for mut text in texts.iter_mut() {
        **text = loading_label(&status.progress);
    }
}

fn hide_loading_overlay(mut commands: Commands, overlays: Query<Entity, With<LoadingOverlay>>) {
    for entity in overlays.iter() {
        commands.entity(entity).despawn();
    }
}

/// Show (or refresh) the banner whenever a new error is reported
fn spawn_error_banner(
    mut commands: Commands,
    status: Res<LoadStatus>,
    banners: Query<Entity, With<ErrorBanner>>,
    mut texts: Query<&mut Text, With<ErrorBannerText>>,
) {
    if !status.is_changed() {
        return;
    }
    let Some(message) = status.error.as_deref() else {
        return;
    };
    let label = error_label(message);

    if !banners.is_empty() {
        for mut text in texts.iter_mut() {
            if text.0 != label {
                text.0 = label.clone();
            }
        }
        return;
    }

    commands
        .spawn((
            ErrorBanner,
            Node {
                width: Val::Percent(100.0),
                position_type: PositionType::Absolute,
                bottom: Val::Px(80.0),
                justify_content: JustifyContent::Center,
                ..default()
            },
            ZIndex(Z_OVERLAY + 2),
            Pickable::IGNORE,
        ))
        .with_children(|parent| {
            parent
                .spawn((
                    Node {
                        padding: UiRect::axes(Val::Px(16.0), Val::Px(8.0)),
                        ..default()
                    },
                    BackgroundColor(ERROR_BACKGROUND),
                    BorderRadius::all(Val::Px(6.0)),
                ))
                .with_child((
                    ErrorBannerText,
                    Text::new(label),
                    body_text_style(),
                    TextColor(TEXT_COLOR),
                ));
        });
}

fn error_label(message: &str) -> String {
    format!("A loading error occurred: {message}")
}

/// Count the banner down and remove it when time is up
fn tick_error_banner(
    mut commands: Commands,
    time: Res<Time>,
    mut status: ResMut<LoadStatus>,
    banners: Query<Entity, With<ErrorBanner>>,
) {
    if status.error.is_none() {
        return;
    }

    status.error_remaining -= time.delta_secs();
    if status.error_remaining > 0.0 {
        return;
    }

    status.error = None;
    status.error_remaining = 0.0;
    for entity in banners.iter() {
        commands.entity(entity).despawn();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::TrackedState;

    #[test]
    fn test_loading_label_rounds_percent() {
        let progress = LoadProgress::from_states([
            TrackedState::Loaded,
            TrackedState::Pending,
            TrackedState::Pending,
        ]);
        assert_eq!(loading_label(&progress), "Loading... 33%");
        assert_eq!(loading_label(&LoadProgress::default()), "Loading... 100%");
    }

    #[test]
    fn test_error_banner_expires() {
        let mut app = App::new();
        app.insert_resource(Time::<()>::default());
        app.insert_resource(LoadStatus {
            error: Some(error_label("models/desk.glb")),
            error_remaining: 0.0,
            ..default()
        });
        app.add_systems(Update, tick_error_banner);
        app.update();
        assert!(app.world().resource::<LoadStatus>().error.is_none());
    }
}
