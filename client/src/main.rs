//! Desk Range - first-person walk-and-shoot scene around a desk

mod camera;
mod config;
mod crosshair;
mod input;
mod player;
mod scene;
mod states;
mod ui;
mod weapons;

use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::window::WindowResolution;
use desk_shared::{EffectQueue, SceneColliders};
use states::GameState;

/// Get the asset path - for bundled macOS apps, use path relative to executable
fn get_asset_path() -> String {
    // Try to find assets relative to executable (for .app bundles)
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let bundled_assets = exe_dir.join("assets");
            if bundled_assets.exists() {
                info!("Using bundled assets at: {:?}", bundled_assets);
                return bundled_assets.to_string_lossy().to_string();
            }
        }
    }
    // Fall back to default "assets" folder (for development)
    "assets".to_string()
}

fn main() {
    let asset_path = get_asset_path();

    let mut app = App::new();

    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Desk Range".to_string(),
                    resolution: WindowResolution::new(1280, 720),
                    ..default()
                }),
                ..default()
            })
            .set(AssetPlugin {
                file_path: asset_path.clone(),
                ..default()
            }),
    );

    // Config is read after the log plugin is up so fallbacks get reported
    app.insert_resource(config::load_scene_config(&asset_path));

    app.init_state::<GameState>();
    app.add_message::<input::PointerLockRequest>();

    app.init_resource::<input::PlayerInput>();
    app.init_resource::<input::PointerLock>();
    app.init_resource::<SceneColliders>();
    app.init_resource::<EffectQueue>();
    app.init_resource::<weapons::GunKick>();

    // UI plugins
    app.add_plugins(ui::HelpPlugin);
    app.add_plugins(ui::LoadingPlugin);
    app.add_plugins(ui::BubblesPlugin);
    app.add_plugins(ui::ChatPlugin);

    app.add_systems(
        Startup,
        (
            scene::setup_lighting,
            scene::spawn_scene,
            player::spawn_local_player,
            (camera::spawn_camera, weapons::spawn_gun_model).chain(),
            weapons::setup_weapon_visual_assets,
            crosshair::spawn_crosshair,
        ),
    );

    // Asset tracking runs in every state; it is what moves Loading -> Playing
    app.add_systems(
        Update,
        (scene::track_asset_loading, scene::apply_desk_material),
    );

    // ORDER MATTERS: input -> integrator -> body/camera -> shooting (reads the fresh pose)
    app.add_systems(
        Update,
        (
            input::read_player_input,
            input::handle_mouse_look,
            player::step_local_player,
            player::sync_player_body,
            camera::update_camera,
            weapons::handle_shoot_input,
            weapons::animate_gun,
        )
            .chain()
            .run_if(in_state(GameState::Playing)),
    );

    app.add_systems(
        Update,
        (
            input::grab_cursor,
            input::release_cursor_on_escape,
            weapons::update_effect_visuals,
            weapons::update_spark_fragments,
            crosshair::update_crosshair_visibility,
        )
            .run_if(in_state(GameState::Playing)),
    );

    // Lock requests from input and overlays land once per frame
    app.add_systems(PostUpdate, input::apply_pointer_lock);

    info!("XR session support is unavailable in this build; running desktop only");
    app.run();
}
