//! Static scene: lights, grass ground, desk model and its colliders
//!
//! The desk glTF is loaded asynchronously. Once it resolves, its triangles are baked into a
//! ray collider and every mesh gets the wood material; if it fails, a wooden placeholder box
//! takes its place.

use bevy::asset::{RecursiveDependencyLoadState, UntypedAssetId};
use bevy::image::{ImageAddressMode, ImageLoaderSettings, ImageSampler, ImageSamplerDescriptor};
use bevy::light::CascadeShadowConfigBuilder;
use bevy::math::Affine2;
use bevy::prelude::*;
use bevy::render::render_resource::PrimitiveTopology;
use bevy_mesh::VertexAttributeValues;
use desk_shared::player::GROUND_PLANE_Y;
use desk_shared::raycast::{Collider, ColliderTag, SceneColliders, Triangle};
use desk_shared::SceneConfig;

use crate::states::GameState;

/// Ground plane edge length (m)
pub const GROUND_SIZE: f32 = 100.0;

/// Fallback desk box (used when the model fails to load)
const PLACEHOLDER_SIZE: Vec3 = Vec3::new(0.8, 0.2, 0.4);
const PLACEHOLDER_POSITION: Vec3 = Vec3::new(0.0, -0.9, 0.0);

/// Sky blue (#87CEEB)
const SKY_COLOR: Color = Color::srgb(0.529, 0.808, 0.922);

/// Untextured fallbacks
const GRASS_FALLBACK: Color = Color::srgb(0.33, 0.55, 0.22);
const WOOD_FALLBACK: Color = Color::srgb(0.55, 0.38, 0.22);

// =============================================================================
// COMPONENTS & RESOURCES
// =============================================================================

/// Root of the loaded desk scene
#[derive(Component)]
pub struct DeskRoot;

/// Desk meshes still need the wood material
#[derive(Component)]
pub struct NeedsDeskSetup;

/// Marker for the fallback desk box
#[derive(Component)]
pub struct PlaceholderDesk;

#[derive(Component)]
pub struct Ground;

/// Handles shared between the ground, the desk and the placeholder
#[derive(Resource)]
pub struct SceneAssets {
    pub desk_scene: Handle<Scene>,
    pub ground_material: Handle<StandardMaterial>,
    pub wood_material: Handle<StandardMaterial>,
}

/// Where a tracked asset is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackedState {
    Pending,
    Loaded,
    Failed,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadProgress {
    pub total: usize,
    pub loaded: usize,
    pub failed: usize,
}

impl LoadProgress {
    pub fn from_states(states: impl IntoIterator<Item = TrackedState>) -> Self {
        let mut progress = Self::default();
        for state in states {
            progress.total += 1;
            match state {
                TrackedState::Loaded => progress.loaded += 1,
                TrackedState::Failed => progress.failed += 1,
                TrackedState::Pending => {}
            }
        }
        progress
    }

    /// Share of assets that have resolved either way (1.0 when nothing is tracked).
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            return 1.0;
        }
        (self.loaded + self.failed) as f32 / self.total as f32
    }

    pub fn is_settled(&self) -> bool {
        self.loaded + self.failed == self.total
    }
}

struct TrackedAsset {
    label: String,
    id: UntypedAssetId,
    state: TrackedState,
    is_desk: bool,
}

/// Every asset the loading overlay waits for
#[derive(Resource, Default)]
pub struct LoadTracker {
    assets: Vec<TrackedAsset>,
}

impl LoadTracker {
    fn track(&mut self, label: impl Into<String>, id: impl Into<UntypedAssetId>, is_desk: bool) {
        self.assets.push(TrackedAsset {
            label: label.into(),
            id: id.into(),
            state: TrackedState::Pending,
            is_desk,
        });
    }

    pub fn progress(&self) -> LoadProgress {
        LoadProgress::from_states(self.assets.iter().map(|a| a.state))
    }
}

/// Loading outcome shown by the overlay
#[derive(Resource, Default)]
pub struct LoadStatus {
    pub progress: LoadProgress,
    /// Banner text for the most recent failure
    pub error: Option<String>,
    /// Seconds the error banner stays up
    pub error_remaining: f32,
}

/// How long a load error stays on screen (s)
pub const LOAD_ERROR_DURATION: f32 = 5.0;

// =============================================================================
// SETUP
// =============================================================================

pub fn setup_lighting(mut commands: Commands) {
    commands.insert_resource(ClearColor(SKY_COLOR));
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 400.0,
        affects_lightmapped_meshes: true,
    });

    // Key light with shadows
    commands.spawn((
        DirectionalLight {
            illuminance: 12_000.0,
            shadows_enabled: true,
            ..default()
        },
        CascadeShadowConfigBuilder {
            num_cascades: 2,
            maximum_distance: 50.0,
            first_cascade_far_bound: 10.0,
            ..default()
        }
        .build(),
        Transform::from_xyz(5.0, 10.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Fill light from the opposite side
    commands.spawn((
        DirectionalLight {
            illuminance: 6_000.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(-5.0, 3.0, -5.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

fn load_texture(asset_server: &AssetServer, path: &str, srgb: bool) -> Handle<Image> {
    asset_server.load_with_settings(path.to_string(), move |settings: &mut ImageLoaderSettings| {
        settings.is_srgb = srgb;
        settings.sampler = ImageSampler::Descriptor(ImageSamplerDescriptor {
            address_mode_u: ImageAddressMode::Repeat,
            address_mode_v: ImageAddressMode::Repeat,
            ..ImageSamplerDescriptor::linear()
        });
    })
}

/// Kick off every asset load and spawn the ground and the desk root
pub fn spawn_scene(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    config: Res<SceneConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut colliders: ResMut<SceneColliders>,
) {
    let textures = &config.textures;
    let mut tracker = LoadTracker::default();
    colliders.clear();

    // --- Ground ---
    let grass_color = load_texture(&asset_server, &textures.grass_color, true);
    let grass_normal = load_texture(&asset_server, &textures.grass_normal, false);
    let grass_roughness = load_texture(&asset_server, &textures.grass_roughness, false);
    tracker.track(&textures.grass_color, grass_color.id(), false);
    tracker.track(&textures.grass_normal, grass_normal.id(), false);
    tracker.track(&textures.grass_roughness, grass_roughness.id(), false);

    let ground_material = materials.add(StandardMaterial {
        base_color_texture: Some(grass_color),
        normal_map_texture: Some(grass_normal),
        metallic_roughness_texture: Some(grass_roughness),
        perceptual_roughness: 1.0,
        metallic: 0.0,
        uv_transform: Affine2::from_scale(Vec2::splat(textures.grass_repeat)),
        ..default()
    });

    let plane = Mesh::from(Plane3d::new(Vec3::Y, Vec2::splat(GROUND_SIZE * 0.5)));
    let plane = match plane.clone().with_generated_tangents() {
        Ok(mesh) => mesh,
        Err(err) => {
            warn!("Ground tangents unavailable ({err}); normal map disabled");
            plane
        }
    };

    commands.spawn((
        Ground,
        Mesh3d(meshes.add(plane)),
        MeshMaterial3d(ground_material.clone()),
        Transform::from_xyz(0.0, GROUND_PLANE_Y, 0.0),
    ));
    colliders.insert(
        ColliderTag::Ground,
        Collider::Ground {
            center: Vec3::new(0.0, GROUND_PLANE_Y, 0.0),
            half_extent: GROUND_SIZE * 0.5,
        },
    );

    // --- Desk ---
    let wood_color = load_texture(&asset_server, &textures.wood_color, true);
    let wood_normal = load_texture(&asset_server, &textures.wood_normal, false);
    let wood_roughness = load_texture(&asset_server, &textures.wood_roughness, false);
    tracker.track(&textures.wood_color, wood_color.id(), false);
    tracker.track(&textures.wood_normal, wood_normal.id(), false);
    tracker.track(&textures.wood_roughness, wood_roughness.id(), false);

    let wood_material = materials.add(StandardMaterial {
        base_color_texture: Some(wood_color),
        normal_map_texture: Some(wood_normal),
        metallic_roughness_texture: Some(wood_roughness),
        perceptual_roughness: 0.6,
        metallic: 0.1,
        ..default()
    });

    let desk_scene: Handle<Scene> =
        asset_server.load(GltfAssetLabel::Scene(0).from_asset(config.desk.model.clone()));
    tracker.track(&config.desk.model, desk_scene.id(), true);

    commands.spawn((
        DeskRoot,
        NeedsDeskSetup,
        SceneRoot(desk_scene.clone()),
        desk_transform(&config),
    ));

    info!(
        "Loading desk {} and {} textures",
        config.desk.model,
        tracker.assets.len() - 1
    );

    commands.insert_resource(tracker);
    commands.insert_resource(SceneAssets {
        desk_scene,
        ground_material,
        wood_material,
    });
}

fn desk_transform(config: &SceneConfig) -> Transform {
    Transform::from_translation(Vec3::from_array(config.desk.position))
        .with_scale(Vec3::splat(config.desk.scale))
}

// =============================================================================
// LOADING
// =============================================================================

/// Poll tracked assets, react to each one resolving, and leave `Loading` once all settle
#[allow(clippy::too_many_arguments)]
pub fn track_asset_loading(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    config: Res<SceneConfig>,
    scene_assets: Option<Res<SceneAssets>>,
    tracker: Option<ResMut<LoadTracker>>,
    mut status: ResMut<LoadStatus>,
    scenes: Res<Assets<Scene>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut colliders: ResMut<SceneColliders>,
    desk_roots: Query<Entity, With<DeskRoot>>,
    state: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let (Some(scene_assets), Some(mut tracker)) = (scene_assets, tracker) else {
        return;
    };

    let mut settled = Vec::new();
    for asset in tracker.assets.iter_mut() {
        if asset.state != TrackedState::Pending {
            continue;
        }
        match asset_server.get_recursive_dependency_load_state(asset.id) {
            Some(RecursiveDependencyLoadState::Loaded) => {
                asset.state = TrackedState::Loaded;
                settled.push(asset.label.clone());
                if asset.is_desk {
                    bake_desk_collider(&scenes, &meshes, &config, &scene_assets, &mut colliders);
                }
            }
            Some(RecursiveDependencyLoadState::Failed(err)) => {
                asset.state = TrackedState::Failed;
                settled.push(asset.label.clone());
                warn!("Failed to load {}: {err}", asset.label);
                status.error = Some(format!("Failed to load {}", asset.label));
                status.error_remaining = LOAD_ERROR_DURATION;

                if asset.is_desk {
                    for entity in desk_roots.iter() {
                        commands.entity(entity).despawn();
                    }
                    spawn_placeholder_desk(
                        &mut commands,
                        &mut meshes,
                        &scene_assets,
                        &mut colliders,
                    );
                } else if let Ok(image_id) = asset.id.try_typed::<Image>() {
                    for handle in [&scene_assets.ground_material, &scene_assets.wood_material] {
                        if let Some(material) = materials.get_mut(handle) {
                            strip_texture(material, image_id);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    let progress = tracker.progress();
    for label in &settled {
        info!("{}", progress_log_line(&progress, label));
    }
    if status.progress != progress {
        status.progress = progress;
    }

    if progress.is_settled() && *state.get() == GameState::Loading {
        info!(
            "Scene ready: {} loaded, {} failed",
            progress.loaded, progress.failed
        );
        next_state.set(GameState::Playing);
    }
}

/// "Loading... 42% (textures/grass/color.jpg)"
pub fn progress_log_line(progress: &LoadProgress, label: &str) -> String {
    format!("Loading... {:.0}% ({label})", progress.fraction() * 100.0)
}

/// Drop a texture that failed to load from a material, falling back to a flat color
pub fn strip_texture(material: &mut StandardMaterial, image: AssetId<Image>) {
    let is_failed = |slot: &Option<Handle<Image>>| slot.as_ref().is_some_and(|h| h.id() == image);

    if is_failed(&material.base_color_texture) {
        material.base_color_texture = None;
        material.base_color = if material.metallic > 0.0 {
            WOOD_FALLBACK
        } else {
            GRASS_FALLBACK
        };
    }
    if is_failed(&material.normal_map_texture) {
        material.normal_map_texture = None;
    }
    if is_failed(&material.metallic_roughness_texture) {
        material.metallic_roughness_texture = None;
    }
}

fn spawn_placeholder_desk(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    scene_assets: &SceneAssets,
    colliders: &mut SceneColliders,
) {
    commands.spawn((
        PlaceholderDesk,
        Mesh3d(meshes.add(Cuboid::from_size(PLACEHOLDER_SIZE))),
        MeshMaterial3d(scene_assets.wood_material.clone()),
        Transform::from_translation(PLACEHOLDER_POSITION),
    ));

    colliders.remove_tag(ColliderTag::Desk);
    colliders.insert(
        ColliderTag::Placeholder,
        Collider::Box {
            min: PLACEHOLDER_POSITION - PLACEHOLDER_SIZE * 0.5,
            max: PLACEHOLDER_POSITION + PLACEHOLDER_SIZE * 0.5,
        },
    );
    warn!("Desk model unavailable, using placeholder box");
}

// =============================================================================
// DESK SETUP
// =============================================================================

/// Give every spawned desk mesh the wood material
pub fn apply_desk_material(
    mut commands: Commands,
    scene_assets: Option<Res<SceneAssets>>,
    desks: Query<Entity, (With<DeskRoot>, With<NeedsDeskSetup>)>,
    children: Query<&Children>,
    mut mesh_materials: Query<&mut MeshMaterial3d<StandardMaterial>, With<Mesh3d>>,
) {
    let Some(scene_assets) = scene_assets else { return };

    for desk in desks.iter() {
        let mut applied = 0;
        for descendant in children.iter_descendants(desk) {
            if let Ok(mut material) = mesh_materials.get_mut(descendant) {
                material.0 = scene_assets.wood_material.clone();
                applied += 1;
            }
        }
        // Scene instance has not spawned yet
        if applied == 0 {
            continue;
        }
        commands.entity(desk).remove::<NeedsDeskSetup>();
        info!("Applied wood material to {applied} desk meshes");
    }
}

fn bake_desk_collider(
    scenes: &Assets<Scene>,
    meshes: &Assets<Mesh>,
    config: &SceneConfig,
    scene_assets: &SceneAssets,
    colliders: &mut SceneColliders,
) {
    let Some(scene) = scenes.get(&scene_assets.desk_scene) else {
        warn!("Desk scene reported loaded but is not in Assets<Scene>");
        return;
    };

    let root = desk_transform(config).to_matrix();
    let triangles = collect_scene_triangles(scene, meshes, root);
    let count = triangles.len();

    colliders.remove_tag(ColliderTag::Desk);
    match Collider::triangle_mesh(triangles) {
        Some(collider) => {
            colliders.insert(ColliderTag::Desk, collider);
            info!("Baked desk collider ({count} triangles)");
        }
        None => warn!("Desk model has no triangle geometry; shots will pass through it"),
    }
}

/// World-space triangles of every triangle-list mesh in a scene, placed under `root`.
fn collect_scene_triangles(scene: &Scene, meshes: &Assets<Mesh>, root: Mat4) -> Vec<Triangle> {
    let mut out = Vec::new();
    let world = &scene.world;

    #[allow(deprecated)]
    for entity_ref in world.iter_entities() {
        let Some(mesh3d) = entity_ref.get::<Mesh3d>() else { continue };
        let Some(mesh) = meshes.get(&mesh3d.0) else { continue };
        if mesh.primitive_topology() != PrimitiveTopology::TriangleList {
            continue;
        }
        let Some(VertexAttributeValues::Float32x3(positions)) =
            mesh.attribute(Mesh::ATTRIBUTE_POSITION)
        else {
            continue;
        };

        let indices: Option<Vec<usize>> = mesh.indices().map(|i| i.iter().collect());
        let mat = root * world_matrix_for(entity_ref.id(), world);
        out.extend(triangles_from_buffers(positions, indices.as_deref(), mat));
    }

    out
}

fn world_matrix_for(entity: Entity, world: &World) -> Mat4 {
    let mut mat = Mat4::IDENTITY;
    let mut current = entity;

    loop {
        if let Some(t) = world.get::<Transform>(current) {
            mat = t.to_matrix() * mat;
        }

        if let Some(parent) = world.get::<ChildOf>(current) {
            current = parent.parent();
        } else {
            break;
        }
    }

    mat
}

/// Assemble triangles from a position buffer and an optional index list.
/// Out-of-range indices and trailing partial triangles are skipped.
pub fn triangles_from_buffers(
    positions: &[[f32; 3]],
    indices: Option<&[usize]>,
    mat: Mat4,
) -> Vec<Triangle> {
    let vertex = |i: usize| positions.get(i).map(|p| mat.transform_point3(Vec3::from_array(*p)));

    let corners: Box<dyn Iterator<Item = [usize; 3]>> = match indices {
        Some(indices) => Box::new(indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]])),
        None => Box::new((0..positions.len() / 3).map(|t| [t * 3, t * 3 + 1, t * 3 + 2])),
    };

    corners
        .filter_map(|[a, b, c]| {
            Some(Triangle {
                vertices: [vertex(a)?, vertex(b)?, vertex(c)?],
            })
        })
        .collect()
}
