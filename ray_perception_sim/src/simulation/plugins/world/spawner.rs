// ray_perception_sim/src/simulation/plugins/world/spawner.rs

use avian3d::prelude::{Collider, CollisionLayers, LayerMask as PhysicsLayerMask, RigidBody};

use crate::cli::Cli;
use crate::prelude::*;

pub struct WorldSpawnerPlugin;

impl Plugin for WorldSpawnerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            (
                // Lights and a camera are only useful with a window.
                spawn_lighting_and_camera.run_if(not(is_headless)),
                spawn_obstacles.in_set(SceneBuildSet::Physics),
            ),
        );
    }
}

fn is_headless(cli: Option<Res<Cli>>) -> bool {
    cli.is_some_and(|cli| cli.headless)
}

/// Spawns every obstacle from the scenario as a static box collider. Obstacles
/// get a visible mesh only when the render assets are available.
fn spawn_obstacles(
    mut commands: Commands,
    config: Res<ScenarioConfig>,
    meshes: Option<ResMut<Assets<Mesh>>>,
    materials: Option<ResMut<Assets<StandardMaterial>>>,
) {
    let mut render_assets = meshes.zip(materials);

    for obstacle in &config.obstacles {
        let [x, y, z] = obstacle.size;
        info!(
            "[SPAWN] Obstacle '{}' ({:.1} x {:.1} x {:.1}) on layers {:#b}",
            obstacle.name, x, y, z, obstacle.layers
        );

        let mut entity_commands = commands.spawn((
            Name::new(obstacle.name.clone()),
            obstacle.pose.to_bevy_transform(),
            RigidBody::Static,
            Collider::cuboid(x, y, z),
            CollisionLayers::new(obstacle.layers, PhysicsLayerMask::ALL),
        ));

        if let Some((meshes, materials)) = render_assets.as_mut() {
            entity_commands.insert((
                Mesh3d(meshes.add(Cuboid::new(x, y, z))),
                MeshMaterial3d(materials.add(StandardMaterial {
                    base_color: obstacle_color(obstacle.layers),
                    ..default()
                })),
            ));
        }
    }
}

/// Obstacles outside the default layer are drawn translucent.
fn obstacle_color(layers: u32) -> Color {
    if layers & 1 == 0 {
        Color::srgba(0.4, 0.7, 0.9, 0.4)
    } else {
        Color::srgb(0.6, 0.6, 0.6)
    }
}

fn spawn_lighting_and_camera(mut commands: Commands) {
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            illuminance: 15_000.0,
            ..default()
        },
        Transform::from_xyz(4.0, 10.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // A static camera looking down the corridor.
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(-12.0, 14.0, 14.0).looking_at(Vec3::new(0.0, 0.0, -4.0), Vec3::Y),
    ));
}
