// ray_perception_core/src/perception/mod.rs

//! The ray perception pipeline: angles, evaluation strategies, the engine
//! that owns the latest snapshot, and the observation writer.

pub mod engine;
pub mod evaluator;
pub mod geometry;
pub mod observation;
pub mod sensor;
