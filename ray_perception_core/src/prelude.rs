// ray_perception_core/src/prelude.rs

// --- Core Abstractions (The main contracts of the library) ---
pub use crate::config::TransformSource;
pub use crate::oracle::RaycastOracle;
pub use crate::perception::evaluator::RayBatchEvaluator;

// --- Core Data Structures ---
pub use crate::config::{LidarPerceptionInput, RaySettings, SharedTransform};
pub use crate::error::{ConfigurationError, OracleError, PerceptionError};
pub use crate::perception::engine::{LidarPerceptionOutput, PerceptionEngine};
pub use crate::perception::evaluator::{BatchedEvaluator, SequentialEvaluator, StrategyKind};
pub use crate::perception::sensor::RayPerceptionSensor;
pub use crate::types::{CastType, LayerMask, RayHit, RayQuery};
