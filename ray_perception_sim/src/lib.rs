// ray_perception_sim/src/lib.rs

use bevy::prelude::*;

// Import the plugins defined within the simulation crate.
use crate::simulation::config::ConfigPlugin;
use crate::simulation::core::simulation_setup::SimulationSetupPlugin;
use crate::simulation::plugins::sensors::raycasting::LidarSensorPlugin;
use crate::simulation::plugins::world::spawner::WorldSpawnerPlugin;

// This prelude is for convenience for other files WITHIN the ray_perception_sim crate.
pub mod prelude;

// This module contains all the simulation-specific logic.
pub mod cli;
pub mod simulation;

/// The main plugin that brings together all the simulation parts.
/// A binary only has to add this one plugin (plus physics) to its Bevy App.
pub struct RayPerceptionSimulationPlugin;

impl Plugin for RayPerceptionSimulationPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            // Validates the scenario and leaves the Loading state.
            ConfigPlugin,
            // Core setup (spawns agents, sets up stages, etc.)
            SimulationSetupPlugin,
            // Spawns the obstacles, lighting, camera.
            WorldSpawnerPlugin,
            // Ray perception sensors.
            LidarSensorPlugin,
        ));
    }
}
