// ray_perception_sim/src/prelude.rs

// Re-export the entire Bevy prelude for convenience.
pub use bevy::prelude::*;

// Re-export the entire ray_perception_core prelude so you can easily access
// pure types like `RaySettings`, `RayPerceptionSensor`, `LayerMask`, etc.
pub use ray_perception_core::prelude::*;

// Re-export common simulation-specific types for easy access in other plugins.
pub use crate::simulation::config::structs::*;
pub use crate::simulation::core::app_state::{AppState, SceneBuildSet, SimulationSet};
pub use crate::simulation::core::events::LidarObservation;
pub use crate::simulation::core::spawn_requests::SpawnAgentConfigRequest;

// Re-export the Bevy components that wrap the pure sensor.
pub use crate::simulation::plugins::sensors::raycasting::{LidarSensor, LidarSettings};
