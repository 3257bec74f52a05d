//! Scene setup and motor model loading.
//!
//! The model is loaded once and instanced twice at mirrored placements. When
//! an instance is ready its mesh nodes are walked: nodes on the allow-list
//! become [`RotatingPart`]s with a bright metal finish, everything else gets
//! the housing material.

use bevy::asset::LoadState;
use bevy::ecs::system::SystemParam;
use bevy::gltf::{Gltf, GltfAssetLabel};
use bevy::light::GlobalAmbientLight;
use bevy::prelude::*;
use bevy::scene::SceneInstanceReady;
use motor_twin::{PartAllowList, parts};

use crate::camera::OrbitCamera;
use crate::controller::RotatingPart;
use crate::launch_params::LaunchParams;

/// Scene background.
const BACKGROUND: Color = Color::srgb(0.102, 0.102, 0.102);

/// Scale from unitless light intensities to illuminance in lux.
const LUX_PER_INTENSITY: f32 = 4_000.0;

/// Scale from unitless ambient intensity to Bevy's ambient brightness.
const AMBIENT_PER_INTENSITY: f32 = 250.0;

/// Plugin for the scene and motor model.
pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(BACKGROUND))
            .insert_resource(GlobalAmbientLight {
                color: Color::WHITE,
                brightness: 2.0 * AMBIENT_PER_INTENSITY,
                ..default()
            })
            .add_systems(Startup, (setup_scene, spawn_motors))
            .add_systems(
                Update,
                report_model_load.run_if(resource_exists::<MotorModel>),
            );
    }
}

/// Handles for the loaded model.
#[derive(Resource)]
struct MotorModel {
    path: String,
    gltf: Handle<Gltf>,
    settled: bool,
}

/// Materials assigned to the model's meshes.
#[derive(Resource, Clone)]
struct MotorMaterials {
    rotating: Handle<StandardMaterial>,
    housing: Handle<StandardMaterial>,
}

/// Allow-list of rotating part names, shared with the observer.
#[derive(Resource, Deref)]
struct RotatingPartNames(PartAllowList);

/// Marks one copy of the motor model.
#[derive(Component)]
pub struct MotorInstance {
    pub index: usize,
}

/// Set up camera and lights.
fn setup_scene(mut commands: Commands) {
    let eye = Vec3::new(0.0, 1.5, 6.0);
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: 75.0_f32.to_radians(),
            near: 0.1,
            far: 1000.0,
            ..default()
        }),
        Transform::from_translation(eye).looking_at(Vec3::ZERO, Vec3::Y),
        OrbitCamera::looking_at_origin_from(eye),
    ));

    // Key light from above, fill light from below.
    let lights = [
        (Vec3::new(5.0, 10.0, 5.0), 1.2),
        (Vec3::new(-5.0, -5.0, 5.0), 1.0),
    ];
    for (position, intensity) in lights {
        commands.spawn((
            DirectionalLight {
                color: Color::WHITE,
                illuminance: intensity * LUX_PER_INTENSITY,
                ..default()
            },
            Transform::from_translation(position).looking_at(Vec3::ZERO, Vec3::Y),
        ));
    }

    tracing::info!("Scene setup complete - drag to orbit, scroll to zoom");
}

/// Start loading the model and spawn both instances.
#[allow(clippy::needless_pass_by_value)]
fn spawn_motors(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    params: Res<LaunchParams>,
) {
    commands.insert_resource(MotorMaterials {
        rotating: materials.add(StandardMaterial {
            base_color: Color::WHITE,
            metallic: 0.8,
            perceptual_roughness: 0.2,
            ..default()
        }),
        housing: materials.add(StandardMaterial {
            base_color: Color::srgb_u8(0x00, 0x77, 0xcc),
            metallic: 0.6,
            perceptual_roughness: 0.4,
            ..default()
        }),
    });
    commands.insert_resource(RotatingPartNames(params.rotating_parts.clone()));

    let path = params.model_path.clone();
    let scene: Handle<Scene> =
        asset_server.load(GltfAssetLabel::Scene(0).from_asset(path.clone()));
    commands.insert_resource(MotorModel {
        gltf: asset_server.load(path.clone()),
        path,
        settled: false,
    });

    for (index, placement) in parts::mirrored_pair().into_iter().enumerate() {
        commands
            .spawn((
                SceneRoot(scene.clone()),
                Transform {
                    translation: placement.translation,
                    rotation: Quat::from_rotation_y(placement.yaw),
                    scale: Vec3::splat(placement.scale),
                },
                MotorInstance { index },
            ))
            .observe(on_motor_scene_ready);
    }

    tracing::info!("Loading motor model: {}", params.model_path);
}

/// Log the outcome of the model load once.
///
/// A failed load leaves the scene without the motor and without rotating
/// parts; nothing else reacts to it.
#[allow(clippy::needless_pass_by_value)]
fn report_model_load(asset_server: Res<AssetServer>, mut model: ResMut<MotorModel>) {
    if model.settled {
        return;
    }

    match asset_server.load_state(&model.gltf) {
        LoadState::Loaded => {
            tracing::info!("Loaded motor model {}", model.path);
            model.settled = true;
        }
        LoadState::Failed(err) => {
            tracing::error!("Failed to load motor model {}: {}", model.path, err);
            model.settled = true;
        }
        LoadState::NotLoaded | LoadState::Loading => {}
    }
}

/// Result of walking one model instance.
#[derive(Debug, Default)]
pub struct PartScan {
    /// Nodes that spin.
    pub rotating: Vec<Entity>,
    /// Mesh entities belonging to spinning nodes.
    pub rotating_meshes: Vec<Entity>,
    /// All other mesh entities.
    pub other_meshes: Vec<Entity>,
}

/// Read access to a spawned model's node hierarchy.
#[derive(SystemParam)]
pub struct ModelNodes<'w, 's> {
    children: Query<'w, 's, &'static Children>,
    meshes: Query<'w, 's, Option<&'static ChildOf>, With<Mesh3d>>,
    names: Query<'w, 's, &'static Name>,
}

impl ModelNodes<'_, '_> {
    /// Classify every mesh below `root`.
    ///
    /// glTF primitives are spawned as children of the named node, so a mesh
    /// counts as rotating if either it or its parent is on the allow-list.
    /// The matching node is the one that gets rotated.
    pub fn scan(&self, root: Entity, allow: &PartAllowList) -> PartScan {
        let matches = |entity: Entity| {
            self.names
                .get(entity)
                .is_ok_and(|name| allow.matches(name.as_str()))
        };

        let mut scan = PartScan::default();
        for entity in self.children.iter_descendants(root) {
            let Ok(parent) = self.meshes.get(entity) else {
                continue;
            };

            let owner = if matches(entity) {
                Some(entity)
            } else {
                parent.map(ChildOf::parent).filter(|&p| matches(p))
            };

            match owner {
                Some(owner) => {
                    scan.rotating_meshes.push(entity);
                    if !scan.rotating.contains(&owner) {
                        scan.rotating.push(owner);
                    }
                }
                None => scan.other_meshes.push(entity),
            }
        }
        scan
    }
}

/// Everything needed to tag one spawned motor instance.
#[derive(SystemParam)]
struct InstanceTagger<'w, 's> {
    commands: Commands<'w, 's>,
    nodes: ModelNodes<'w, 's>,
    transforms: Query<'w, 's, &'static Transform>,
    instances: Query<'w, 's, &'static MotorInstance>,
    materials: Res<'w, MotorMaterials>,
    names: Res<'w, RotatingPartNames>,
}

impl InstanceTagger<'_, '_> {
    /// Assign materials below `root` and mark its rotating nodes.
    ///
    /// Each node keeps its loaded rotation as the rest orientation it spins
    /// about.
    fn tag(&mut self, root: Entity) {
        let scan = self.nodes.scan(root, &self.names);

        for &mesh in &scan.rotating_meshes {
            self.commands
                .entity(mesh)
                .insert(MeshMaterial3d(self.materials.rotating.clone()));
        }
        for &mesh in &scan.other_meshes {
            self.commands
                .entity(mesh)
                .insert(MeshMaterial3d(self.materials.housing.clone()));
        }
        for &part in &scan.rotating {
            let rest = self
                .transforms
                .get(part)
                .map(|t| t.rotation)
                .unwrap_or_default();
            self.commands.entity(part).insert(RotatingPart::new(rest));
        }

        let index = self.instances.get(root).map(|i| i.index).unwrap_or_default();
        if scan.rotating.is_empty() {
            tracing::warn!(
                "Motor instance {index} has no parts named {:?}",
                self.names.names()
            );
        } else {
            tracing::info!(
                "Motor instance {index} ready: {} rotating parts, {} meshes",
                scan.rotating.len(),
                scan.rotating_meshes.len() + scan.other_meshes.len()
            );
        }
    }
}

/// Observer called when one motor instance finishes spawning.
#[allow(clippy::needless_pass_by_value)]
fn on_motor_scene_ready(trigger: On<SceneInstanceReady>, mut tagger: InstanceTagger) {
    tagger.tag(trigger.event_target());
}
