// ray_perception_sim/src/simulation/core/events.rs
use bevy::prelude::{Entity, Event};

/// One step's observation vector from a ray perception sensor.
///
/// This is the hand-off point to a learning pipeline: `values` has the
/// sensor's declared length and keeps the same ray order on every step.
#[derive(Event, Clone, Debug)]
pub struct LidarObservation {
    pub agent: Entity,
    pub sensor: Entity,
    pub timestamp: f64,
    pub values: Vec<f32>,
}
