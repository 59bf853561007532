//! Client-side weapon systems
//!
//! Handles the view-model gun, shooting input, and the trail/spark effects of each shot.

use bevy::prelude::*;
use desk_shared::effects::{EffectId, EffectKind, EffectQueue, BULLET_TRAIL_LENGTH, SPARK_DURATION};
use desk_shared::weapon::{fire, gun_offset, ProjectileEvent};
use desk_shared::{PlayerState, SceneColliders, SceneConfig};

use crate::camera::{eye_transform, MainCamera};
use crate::input::{PlayerInput, PointerLock};
use crate::player::LocalPlayer;

/// Marker for the gun group parented to the camera
#[derive(Component)]
pub struct GunModel;

/// Time left on the current recoil kick
#[derive(Resource, Default)]
pub struct GunKick {
    pub remaining: f32,
}

/// Links a rendered entity to its entry in the [`EffectQueue`]
#[derive(Component)]
pub struct EffectVisual {
    pub id: EffectId,
}

/// Debris flung from a spark burst
#[derive(Component)]
pub struct SparkFragment {
    pub velocity: Vec3,
    pub lifetime: f32,
    pub max_lifetime: f32,
}

/// Cached weapon-related render assets (avoid per-shot allocations).
#[derive(Resource)]
pub struct WeaponVisualAssets {
    pub trail_mesh: Handle<Mesh>,
    pub spark_mesh: Handle<Mesh>,
    pub fragment_mesh: Handle<Mesh>,
    pub fragment_material: Handle<StandardMaterial>,
}

const TRAIL_COLOR: Color = Color::srgba(0.0, 1.0, 1.0, 0.7);
const SPARK_COLOR: Color = Color::srgb(1.0, 1.0, 0.0);

const SPARK_RADIUS: f32 = 0.05;
const FRAGMENT_COUNT: usize = 6;
const FRAGMENT_SPEED: f32 = 3.0;
const FRAGMENT_GRAVITY: f32 = -9.8;

// =============================================================================
// SETUP
// =============================================================================

pub fn setup_weapon_visual_assets(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.insert_resource(WeaponVisualAssets {
        trail_mesh: meshes.add(Cylinder::new(0.01, BULLET_TRAIL_LENGTH)),
        spark_mesh: meshes.add(Sphere::new(SPARK_RADIUS).mesh().uv(8, 8)),
        fragment_mesh: meshes.add(Sphere::new(0.012).mesh().uv(6, 4)),
        fragment_material: materials.add(StandardMaterial {
            base_color: Color::srgb(1.0, 0.85, 0.3),
            emissive: LinearRgba::new(4.0, 3.0, 0.5, 1.0),
            unlit: true,
            ..default()
        }),
    });
}

/// Build the gun from boxes and a cylinder and hang it off the camera
pub fn spawn_gun_model(
    mut commands: Commands,
    config: Res<SceneConfig>,
    camera: Query<Entity, With<MainCamera>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Ok(camera) = camera.single() else {
        warn!("No camera to attach the gun to");
        return;
    };

    let body_material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0x33, 0x33, 0x33),
        perceptual_roughness: 0.5,
        metallic: 0.7,
        ..default()
    });
    let handle_material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0x22, 0x22, 0x22),
        perceptual_roughness: 0.8,
        metallic: 0.2,
        ..default()
    });
    let barrel_material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0x11, 0x11, 0x11),
        perceptual_roughness: 0.3,
        metallic: 0.8,
        ..default()
    });

    let gun = commands
        .spawn((
            GunModel,
            Transform::from_translation(Vec3::from_array(config.weapon.rest_offset)),
            Visibility::default(),
        ))
        .with_children(|parent| {
            parent.spawn((
                Mesh3d(meshes.add(Cuboid::new(0.05, 0.08, 0.3))),
                MeshMaterial3d(body_material),
                Transform::default(),
            ));
            parent.spawn((
                Mesh3d(meshes.add(Cuboid::new(0.04, 0.12, 0.05))),
                MeshMaterial3d(handle_material),
                Transform::from_xyz(0.0, -0.08, -0.1),
            ));
            // Barrel along -Z, in front of the body
            parent.spawn((
                Mesh3d(meshes.add(Cylinder::new(0.015, 0.1))),
                MeshMaterial3d(barrel_material),
                Transform::from_xyz(0.0, 0.0, -0.2)
                    .with_rotation(Quat::from_rotation_x(std::f32::consts::FRAC_PI_2)),
            ));
        })
        .id();
    commands.entity(camera).add_child(gun);
}

// =============================================================================
// SHOOTING
// =============================================================================

/// Fire on click while the pointer is locked
#[allow(clippy::too_many_arguments)]
pub fn handle_shoot_input(
    mut commands: Commands,
    input: Res<PlayerInput>,
    pointer: Res<PointerLock>,
    config: Res<SceneConfig>,
    colliders: Res<SceneColliders>,
    visuals: Option<Res<WeaponVisualAssets>>,
    mut effects: ResMut<EffectQueue>,
    mut kick: ResMut<GunKick>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    player: Query<&PlayerState, With<LocalPlayer>>,
    gun: Query<&Transform, With<GunModel>>,
) {
    if !input.0.fire || !pointer.locked {
        return;
    }
    let Some(visuals) = visuals else { return };
    let Ok(state) = player.single() else { return };

    let muzzle = gun
        .single()
        .map(|t| t.translation)
        .unwrap_or_else(|_| Vec3::from_array(config.weapon.rest_offset));
    let event = ProjectileEvent::from_view(&eye_transform(state), muzzle);
    let shot = fire(event, &colliders, config.weapon.max_range);

    // Trail
    let trail = EffectKind::BulletTrail {
        origin: event.origin,
        direction: event.direction,
    };
    let id = effects.push(trail);
    if let Some(effect) = effects.get(id) {
        commands.spawn((
            EffectVisual { id },
            Mesh3d(visuals.trail_mesh.clone()),
            MeshMaterial3d(materials.add(effect_material(TRAIL_COLOR))),
            effect.transform(),
        ));
    }

    // Spark
    if let Some(hit) = shot.hit {
        debug!("Hit {:?} at {:?} ({:.2}m)", hit.tag, hit.point, hit.distance);
        let id = effects.push(EffectKind::SparkBurst {
            position: hit.point,
            normal: hit.normal,
        });
        if let Some(effect) = effects.get(id) {
            commands.spawn((
                EffectVisual { id },
                Mesh3d(visuals.spark_mesh.clone()),
                MeshMaterial3d(materials.add(effect_material(SPARK_COLOR))),
                effect.transform(),
            ));
        }

        for _ in 0..FRAGMENT_COUNT {
            let jitter = Vec3::new(
                rand::random::<f32>() * 2.0 - 1.0,
                rand::random::<f32>() * 2.0 - 1.0,
                rand::random::<f32>() * 2.0 - 1.0,
            );
            let speed = FRAGMENT_SPEED * (0.5 + rand::random::<f32>() * 0.5);
            commands.spawn((
                SparkFragment {
                    velocity: scatter_direction(hit.normal, jitter) * speed,
                    lifetime: SPARK_DURATION,
                    max_lifetime: SPARK_DURATION,
                },
                Mesh3d(visuals.fragment_mesh.clone()),
                MeshMaterial3d(visuals.fragment_material.clone()),
                Transform::from_translation(hit.point + hit.normal * 0.01),
            ));
        }
    }

    kick.remaining = config.weapon.kick_duration;
}

fn effect_material(color: Color) -> StandardMaterial {
    StandardMaterial {
        base_color: color,
        unlit: true,
        alpha_mode: AlphaMode::Blend,
        ..default()
    }
}

/// Direction in the hemisphere around `normal`, biased outward.
pub fn scatter_direction(normal: Vec3, jitter: Vec3) -> Vec3 {
    let normal = normal.normalize_or(Vec3::Y);
    let mut dir = jitter;
    if dir.dot(normal) < 0.0 {
        dir = -dir;
    }
    (dir + normal).normalize_or(normal)
}

/// Walking bob and recoil kick for the view-model
pub fn animate_gun(
    time: Res<Time>,
    input: Res<PlayerInput>,
    config: Res<SceneConfig>,
    mut kick: ResMut<GunKick>,
    mut gun: Query<&mut Transform, With<GunModel>>,
) {
    let Ok(mut transform) = gun.single_mut() else {
        return;
    };

    transform.translation = gun_offset(
        &config.weapon,
        time.elapsed_secs(),
        input.0.is_moving(),
        kick.remaining,
    );
    kick.remaining = (kick.remaining - time.delta_secs()).max(0.0);
}

// =============================================================================
// EFFECTS
// =============================================================================

/// Age every effect, fade/scale the live ones and despawn the expired ones
pub fn update_effect_visuals(
    mut commands: Commands,
    time: Res<Time>,
    mut effects: ResMut<EffectQueue>,
    mut visuals: Query<(Entity, &EffectVisual, &mut Transform, &MeshMaterial3d<StandardMaterial>)>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let expired = effects.tick(time.delta_secs());

    for (entity, visual, mut transform, material_handle) in visuals.iter_mut() {
        if expired.contains(&visual.id) {
            commands.entity(entity).despawn();
            continue;
        }
        // Orphaned visual (queue entry already gone)
        let Some(effect) = effects.get(visual.id) else {
            commands.entity(entity).despawn();
            continue;
        };

        *transform = effect.transform();
        if let Some(material) = materials.get_mut(&material_handle.0) {
            material.base_color.set_alpha(effect.opacity());
        }
    }
}

pub fn update_spark_fragments(
    mut commands: Commands,
    time: Res<Time>,
    mut fragments: Query<(Entity, &mut SparkFragment, &mut Transform)>,
) {
    let dt = time.delta_secs();

    for (entity, mut fragment, mut transform) in fragments.iter_mut() {
        fragment.lifetime -= dt;
        if fragment.lifetime <= 0.0 {
            commands.entity(entity).despawn();
            continue;
        }

        fragment.velocity.y += FRAGMENT_GRAVITY * dt;
        transform.translation += fragment.velocity * dt;
        transform.scale = Vec3::splat(fragment.lifetime / fragment.max_lifetime);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scatter_stays_on_normal_side() {
        let normal = Vec3::Z;
        for jitter in [Vec3::NEG_Z, Vec3::new(0.3, -0.9, -0.2), Vec3::X, Vec3::ZERO] {
            let dir = scatter_direction(normal, jitter);
            assert!(dir.dot(normal) > 0.0, "{jitter:?} -> {dir:?}");
            assert!((dir.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_kick_pushes_gun_back_then_recovers() {
        let mut app = App::new();
        app.insert_resource(Time::<()>::default());
        app.init_resource::<PlayerInput>();
        app.insert_resource(SceneConfig::default());
        app.insert_resource(GunKick {
            remaining: SceneConfig::default().weapon.kick_duration,
        });
        app.add_systems(Update, animate_gun);
        let gun = app.world_mut().spawn((GunModel, Transform::default())).id();

        app.update();
        let rest = Vec3::from_array(SceneConfig::default().weapon.rest_offset);
        let kicked = app.world().get::<Transform>(gun).unwrap().translation;
        assert!(kicked.z > rest.z);

        app.world_mut().resource_mut::<GunKick>().remaining = 0.0;
        app.update();
        let settled = app.world().get::<Transform>(gun).unwrap().translation;
        assert_eq!(settled, rest);
    }
}
