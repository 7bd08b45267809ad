// ray_perception_sim/src/simulation/config/mod.rs

//! This module handles loading and validating the scenario configuration from disk.

pub mod structs;

use bevy::prelude::*;
use figment::{
    providers::{Format, Toml},
    Figment,
};
use std::path::Path;

use crate::prelude::AppState;
pub use structs::{AgentConfig, LidarConfig, ObstacleConfig, ScenarioConfig};

impl ScenarioConfig {
    /// Loads a scenario TOML file. A missing file is an error, not an empty scenario.
    pub fn load(path: &Path) -> Result<Self, figment::Error> {
        Figment::new().merge(Toml::file_exact(path)).extract()
    }
}

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app
            // Falls back to an empty scenario if the app did not insert one.
            .init_resource::<ScenarioConfig>()
            .add_systems(
                OnEnter(AppState::Loading),
                (validate_scenario, transition_to_scene_building).chain(),
            );
    }
}

/// Reports every sensor whose ray settings the perception engine would reject.
/// Those sensors are skipped at spawn time; the rest of the scenario still runs.
fn validate_scenario(config: Res<ScenarioConfig>) {
    info!(
        "Scenario has {} agent(s) and {} obstacle(s).",
        config.agents.len(),
        config.obstacles.len()
    );

    for agent in &config.agents {
        for sensor in &agent.sensors {
            if let Err(e) = sensor.rays.validate() {
                error!(
                    "Sensor '{}' on agent '{}' has invalid ray settings: {}. It will not be spawned.",
                    sensor.name, agent.name, e
                );
            }
        }
    }
}

fn transition_to_scene_building(mut next_state: ResMut<NextState<AppState>>) {
    info!("Configuration loading complete. Transitioning to SceneBuilding state.");
    next_state.set(AppState::SceneBuilding);
}
