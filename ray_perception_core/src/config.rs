// ray_perception_core/src/config.rs

use nalgebra::Isometry3;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::{Arc, RwLock};

use crate::error::ConfigurationError;
use crate::perception::evaluator::StrategyKind;
use crate::types::{CastType, LayerMask};

/// Upper bound on `rays_per_side` accepted by `validate`.
pub const MAX_RAYS_PER_SIDE: u32 = 50;

/// Upper bound on the cone half-angle, in degrees. 180° closes the fan into a half circle on each side.
pub const MAX_CONE_HALF_ANGLE_DEG: f32 = 180.0;

// =========================================================================
// == Ray Settings ==
// =========================================================================

/// The user-facing ray configuration. Immutable for the duration of one update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaySettings {
    /// Rays on each side of the forward ray. Total rays = `2 * rays_per_side + 1`.
    pub rays_per_side: u32,
    /// Angle between the forward ray and the outermost ray on either side.
    pub cone_half_angle_deg: f32,
    /// Max distance of each ray, in world units.
    pub cast_length: f32,
    #[serde(default)]
    pub cast_type: CastType,
    #[serde(default)]
    pub layer_mask: LayerMask,
    /// Submit all rays as one parallel batch. Only honored for `CastType::Volumetric`.
    #[serde(default)]
    pub use_batching: bool,
}

impl Default for RaySettings {
    fn default() -> Self {
        Self {
            rays_per_side: 3,
            cone_half_angle_deg: 70.0,
            cast_length: 20.0,
            cast_type: CastType::Volumetric,
            layer_mask: LayerMask::ALL,
            use_batching: false,
        }
    }
}

impl RaySettings {
    /// The number of rays in the fan, which is also the observation length.
    pub fn total_rays(&self) -> usize {
        2 * self.rays_per_side as usize + 1
    }

    /// Which evaluator these settings select.
    pub fn strategy(&self) -> StrategyKind {
        if self.use_batching && self.cast_type == CastType::Volumetric {
            StrategyKind::Batched
        } else {
            StrategyKind::Sequential
        }
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !self.cast_length.is_finite() || self.cast_length <= 0.0 {
            return Err(ConfigurationError::InvalidCastLength(self.cast_length));
        }
        if !self.cone_half_angle_deg.is_finite()
            || !(0.0..=MAX_CONE_HALF_ANGLE_DEG).contains(&self.cone_half_angle_deg)
        {
            return Err(ConfigurationError::InvalidConeAngle(
                self.cone_half_angle_deg,
            ));
        }
        if self.rays_per_side > MAX_RAYS_PER_SIDE {
            return Err(ConfigurationError::TooManyRays {
                requested: self.rays_per_side,
                max: MAX_RAYS_PER_SIDE,
            });
        }
        Ok(())
    }
}

// =========================================================================
// == Agent Transform Reference ==
// =========================================================================

/// Read-only access to the pose of the agent that carries the sensor.
///
/// The agent owns its transform; the sensor only ever reads it, once per update.
pub trait TransformSource: Debug + Send + Sync {
    /// The agent's local-to-world transform at the time of the call.
    fn local_to_world(&self) -> Isometry3<f64>;
}

// A fixed pose, handy for static sensors and tests.
impl TransformSource for Isometry3<f64> {
    fn local_to_world(&self) -> Isometry3<f64> {
        *self
    }
}

/// A pose the owning agent keeps writing to while sensors read from it.
#[derive(Debug, Default)]
pub struct SharedTransform {
    pose: RwLock<Isometry3<f64>>,
}

impl SharedTransform {
    pub fn new(pose: Isometry3<f64>) -> Self {
        Self {
            pose: RwLock::new(pose),
        }
    }

    pub fn set(&self, pose: Isometry3<f64>) {
        // A poisoned lock still holds a fully written pose.
        let mut guard = self.pose.write().unwrap_or_else(|e| e.into_inner());
        *guard = pose;
    }
}

impl TransformSource for SharedTransform {
    fn local_to_world(&self) -> Isometry3<f64> {
        *self.pose.read().unwrap_or_else(|e| e.into_inner())
    }
}

// =========================================================================
// == Configuration Snapshot ==
// =========================================================================

/// The configuration snapshot pushed into the `PerceptionEngine`.
///
/// It is always replaced as a whole, never patched field by field, so an
/// update can never observe a half-applied configuration.
#[derive(Debug, Clone)]
pub struct LidarPerceptionInput {
    pub settings: RaySettings,
    pub transform: Arc<dyn TransformSource>,
}

impl LidarPerceptionInput {
    pub fn new(settings: RaySettings, transform: Arc<dyn TransformSource>) -> Self {
        Self {
            settings,
            transform,
        }
    }

    /// A snapshot for a sensor that never moves.
    pub fn with_fixed_pose(settings: RaySettings, pose: Isometry3<f64>) -> Self {
        Self::new(settings, Arc::new(pose))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Translation3, UnitQuaternion};

    #[test]
    fn test_total_rays_is_always_odd() {
        for rays_per_side in 0..=MAX_RAYS_PER_SIDE {
            let settings = RaySettings {
                rays_per_side,
                ..Default::default()
            };
            assert_eq!(settings.total_rays(), 2 * rays_per_side as usize + 1);
            assert_eq!(settings.total_rays() % 2, 1);
        }
    }

    #[test]
    fn test_strategy_selection() {
        let mut settings = RaySettings::default();
        assert_eq!(settings.strategy(), StrategyKind::Sequential);

        settings.use_batching = true;
        assert_eq!(settings.strategy(), StrategyKind::Batched);

        settings.cast_type = CastType::Planar;
        assert_eq!(settings.strategy(), StrategyKind::Sequential);
    }

    #[test]
    fn test_validate_rejects_bad_cast_length() {
        for cast_length in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let settings = RaySettings {
                cast_length,
                ..Default::default()
            };
            assert!(matches!(
                settings.validate(),
                Err(ConfigurationError::InvalidCastLength(_))
            ));
        }
    }

    #[test]
    fn test_validate_rejects_bad_cone_angle() {
        for cone_half_angle_deg in [-1.0, 180.5, f32::NAN] {
            let settings = RaySettings {
                cone_half_angle_deg,
                ..Default::default()
            };
            assert!(matches!(
                settings.validate(),
                Err(ConfigurationError::InvalidConeAngle(_))
            ));
        }
    }

    #[test]
    fn test_validate_rejects_too_many_rays() {
        let settings = RaySettings {
            rays_per_side: MAX_RAYS_PER_SIDE + 1,
            ..Default::default()
        };
        assert_eq!(
            settings.validate(),
            Err(ConfigurationError::TooManyRays {
                requested: MAX_RAYS_PER_SIDE + 1,
                max: MAX_RAYS_PER_SIDE
            })
        );
    }

    #[test]
    fn test_validate_accepts_edge_values() {
        let settings = RaySettings {
            rays_per_side: 0,
            cone_half_angle_deg: 0.0,
            cast_length: f32::MIN_POSITIVE,
            ..Default::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_shared_transform_reflects_latest_pose() {
        let shared = SharedTransform::new(Isometry3::identity());
        let moved = Isometry3::from_parts(
            Translation3::new(1.0, 2.0, 3.0),
            UnitQuaternion::from_euler_angles(0.0, 0.0, 0.5),
        );
        shared.set(moved);
        assert_eq!(shared.local_to_world(), moved);
    }
}
