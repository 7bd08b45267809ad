// ray_perception_core/src/error.rs

use thiserror::Error;

/// A configuration snapshot that the engine refuses to run with.
///
/// These are raised by `reconfigure` (and construction), never by `update`,
/// so a bad setting is caught before it can turn into NaN observations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("cast length must be a finite value greater than zero, got {0}")]
    InvalidCastLength(f32),

    #[error("cone half-angle must be a finite value in [0, 180] degrees, got {0}")]
    InvalidConeAngle(f32),

    #[error("at most {max} rays per side are supported, got {requested}")]
    TooManyRays { requested: u32, max: u32 },
}

/// The scene's raycast facility could not complete a query.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OracleError {
    #[error("the scene is not ready for raycast queries")]
    SceneNotReady,

    #[error("raycast backend failure: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PerceptionError {
    #[error("invalid ray configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("raycast oracle failed: {0}")]
    Oracle(#[from] OracleError),

    #[error("oracle returned {actual} hit records for a batch of {expected} rays")]
    BatchSize { expected: usize, actual: usize },

    /// `write` was called while the snapshot and the observation buffer disagree
    /// in length. Only happens when the ray count changed and no `update` ran since.
    #[error("snapshot holds {snapshot} ray results but the observation buffer has {buffer} slots")]
    LengthMismatch { snapshot: usize, buffer: usize },
}
