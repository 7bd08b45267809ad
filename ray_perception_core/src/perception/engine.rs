// ray_perception_core/src/perception/engine.rs

use log::{debug, warn};

use crate::config::LidarPerceptionInput;
use crate::error::PerceptionError;
use crate::oracle::RaycastOracle;
use crate::perception::evaluator::{RayBatchEvaluator, StrategyKind};
use crate::perception::geometry::RayAngleSet;
use crate::types::CastType;

/// The latest per-ray result of a `PerceptionEngine`: one hit fraction per ray, in ray order.
#[derive(Debug, Clone, PartialEq)]
pub struct LidarPerceptionOutput {
    hit_fractions: Vec<f32>,
}

impl LidarPerceptionOutput {
    /// A snapshot of `ray_count` rays that have not seen anything yet.
    pub fn unobstructed(ray_count: usize) -> Self {
        Self {
            hit_fractions: vec![1.0; ray_count],
        }
    }

    pub fn hit_fractions(&self) -> &[f32] {
        &self.hit_fractions
    }

    pub fn len(&self) -> usize {
        self.hit_fractions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hit_fractions.is_empty()
    }
}

/// Owns the current configuration snapshot and the latest perception result.
#[derive(Debug, Clone)]
pub struct PerceptionEngine {
    input: LidarPerceptionInput,
    angle_set: RayAngleSet,
    evaluator: Box<dyn RayBatchEvaluator>,
    output: LidarPerceptionOutput,
}

impl PerceptionEngine {
    pub fn new(input: LidarPerceptionInput) -> Result<Self, PerceptionError> {
        input.settings.validate()?;

        let settings = &input.settings;
        let angle_set = RayAngleSet::new(settings.rays_per_side, settings.cone_half_angle_deg);
        let output = LidarPerceptionOutput::unobstructed(settings.total_rays());
        let evaluator = select_evaluator(&input);

        Ok(Self {
            input,
            angle_set,
            evaluator,
            output,
        })
    }

    /// Replaces the configuration snapshot. No ray is cast until the next `update`.
    ///
    /// An invalid snapshot is rejected and the previous configuration stays active.
    pub fn reconfigure(&mut self, input: LidarPerceptionInput) -> Result<(), PerceptionError> {
        input.settings.validate()?;

        if input.settings.strategy() != self.evaluator.kind() {
            self.evaluator = select_evaluator(&input);
        }
        self.input = input;
        Ok(())
    }

    /// Re-evaluates every ray against `oracle` and publishes the new snapshot.
    ///
    /// Either every ray is evaluated and published, or the update fails and the
    /// previously published snapshot is left untouched.
    pub fn update(&mut self, oracle: &dyn RaycastOracle) -> Result<(), PerceptionError> {
        let settings = self.input.settings;

        if self
            .angle_set
            .is_stale(settings.rays_per_side, settings.cone_half_angle_deg)
        {
            self.angle_set = RayAngleSet::new(settings.rays_per_side, settings.cone_half_angle_deg);
        }

        let pose = self.input.transform.local_to_world();
        let mut fractions = Vec::with_capacity(self.angle_set.len());
        if let Err(e) =
            self.evaluator
                .evaluate(self.angle_set.angles(), &settings, &pose, oracle, &mut fractions)
        {
            warn!(
                "{:?} ray evaluation failed, keeping previous snapshot: {}",
                self.evaluator.kind(),
                e
            );
            return Err(e);
        }

        if fractions.len() == self.output.len() {
            self.output.hit_fractions.copy_from_slice(&fractions);
        } else {
            debug!(
                "Ray count changed from {} to {}, reallocating snapshot.",
                self.output.len(),
                fractions.len()
            );
            self.output = LidarPerceptionOutput {
                hit_fractions: fractions,
            };
        }
        Ok(())
    }

    /// The observation length the current configuration declares.
    pub fn declared_length(&self) -> usize {
        self.input.settings.total_rays()
    }

    pub fn input(&self) -> &LidarPerceptionInput {
        &self.input
    }

    pub fn output(&self) -> &LidarPerceptionOutput {
        &self.output
    }

    pub fn strategy(&self) -> StrategyKind {
        self.evaluator.kind()
    }

    /// The ray angles used by the most recent update.
    pub fn ray_angles(&self) -> &[f32] {
        self.angle_set.angles()
    }
}

fn select_evaluator(input: &LidarPerceptionInput) -> Box<dyn RayBatchEvaluator> {
    let settings = &input.settings;
    if settings.use_batching && settings.cast_type == CastType::Planar {
        debug!("Batching is only available for volumetric casts, using sequential evaluation.");
    }
    settings.strategy().evaluator()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RaySettings;
    use crate::error::{ConfigurationError, OracleError};
    use crate::scene::{AnalyticScene, SceneShape};
    use crate::types::LayerMask;
    use approx::assert_abs_diff_eq;
    use nalgebra::{Isometry3, Point3};

    fn settings(rays_per_side: u32) -> RaySettings {
        RaySettings {
            rays_per_side,
            cone_half_angle_deg: 45.0,
            cast_length: 10.0,
            cast_type: CastType::Volumetric,
            layer_mask: LayerMask::ALL,
            use_batching: false,
        }
    }

    fn engine(settings: RaySettings) -> PerceptionEngine {
        PerceptionEngine::new(LidarPerceptionInput::with_fixed_pose(
            settings,
            Isometry3::identity(),
        ))
        .unwrap()
    }

    #[test]
    fn test_open_field_reads_all_ones() {
        let mut engine = engine(settings(1));
        engine.update(&AnalyticScene::new()).unwrap();

        assert_eq!(engine.ray_angles(), &[45.0, 90.0, 135.0]);
        assert_eq!(engine.output().hit_fractions(), &[1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_obstacle_straight_ahead_reads_half() {
        // A 1-unit cube whose near face sits 5 units ahead along local +Z.
        let mut scene = AnalyticScene::new();
        scene.add(SceneShape::cuboid(
            Point3::new(0.0, 0.0, 5.5),
            [1.0, 1.0, 1.0],
            LayerMask::ALL,
        ));

        let mut engine = engine(settings(0));
        engine.update(&scene).unwrap();

        assert_eq!(engine.ray_angles(), &[90.0]);
        assert_abs_diff_eq!(engine.output().hit_fractions()[0], 0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_new_rejects_invalid_settings() {
        let mut bad = settings(1);
        bad.cast_length = 0.0;
        let result = PerceptionEngine::new(LidarPerceptionInput::with_fixed_pose(
            bad,
            Isometry3::identity(),
        ));
        assert!(matches!(
            result,
            Err(PerceptionError::Configuration(
                ConfigurationError::InvalidCastLength(_)
            ))
        ));
    }

    #[test]
    fn test_reconfigure_rejects_and_keeps_previous_config() {
        let mut engine = engine(settings(1));
        let mut bad = settings(4);
        bad.cone_half_angle_deg = -10.0;

        let result = engine.reconfigure(LidarPerceptionInput::with_fixed_pose(
            bad,
            Isometry3::identity(),
        ));

        assert!(result.is_err());
        assert_eq!(engine.input().settings, settings(1));
        assert_eq!(engine.declared_length(), 3);
    }

    #[test]
    fn test_reconfigure_defers_work_until_update() {
        let mut engine = engine(settings(1));
        engine
            .reconfigure(LidarPerceptionInput::with_fixed_pose(
                settings(3),
                Isometry3::identity(),
            ))
            .unwrap();

        // Declared length follows the new config, the snapshot does not yet.
        assert_eq!(engine.declared_length(), 7);
        assert_eq!(engine.output().len(), 3);

        engine.update(&AnalyticScene::new()).unwrap();
        assert_eq!(engine.output().len(), 7);
        assert_eq!(engine.ray_angles().len(), 7);
    }

    #[test]
    fn test_shrinking_ray_count_leaves_no_residue() {
        let mut scene = AnalyticScene::new();
        scene.add(SceneShape::sphere(Point3::new(0.0, 0.0, 3.0), 1.0, LayerMask::ALL));

        let mut engine = engine(settings(5));
        engine.update(&scene).unwrap();
        assert_eq!(engine.output().len(), 11);

        engine
            .reconfigure(LidarPerceptionInput::with_fixed_pose(
                settings(0),
                Isometry3::identity(),
            ))
            .unwrap();
        engine.update(&scene).unwrap();

        assert_eq!(engine.output().len(), 1);
        assert_abs_diff_eq!(engine.output().hit_fractions()[0], 0.2, epsilon = 1e-5);
    }

    #[test]
    fn test_reconfigure_switches_strategy() {
        let mut engine = engine(settings(1));
        assert_eq!(engine.strategy(), StrategyKind::Sequential);

        let mut batched = settings(1);
        batched.use_batching = true;
        engine
            .reconfigure(LidarPerceptionInput::with_fixed_pose(
                batched,
                Isometry3::identity(),
            ))
            .unwrap();
        assert_eq!(engine.strategy(), StrategyKind::Batched);

        batched.cast_type = CastType::Planar;
        engine
            .reconfigure(LidarPerceptionInput::with_fixed_pose(
                batched,
                Isometry3::identity(),
            ))
            .unwrap();
        assert_eq!(engine.strategy(), StrategyKind::Sequential);
    }

    #[test]
    fn test_failed_update_keeps_previous_snapshot() {
        let mut scene = AnalyticScene::new();
        scene.add(SceneShape::sphere(Point3::new(0.0, 0.0, 5.0), 1.0, LayerMask::ALL));

        for use_batching in [false, true] {
            let mut config = settings(2);
            config.use_batching = use_batching;
            let mut engine = engine(config);

            engine.update(&scene).unwrap();
            let before = engine.output().clone();

            scene.set_ready(false);
            let result = engine.update(&scene);
            scene.set_ready(true);

            assert_eq!(result, Err(PerceptionError::Oracle(OracleError::SceneNotReady)));
            assert_eq!(engine.output(), &before);
        }
    }

    #[test]
    fn test_failed_update_after_resize_keeps_old_length() {
        let mut scene = AnalyticScene::new();
        let mut engine = engine(settings(1));
        engine.update(&scene).unwrap();

        engine
            .reconfigure(LidarPerceptionInput::with_fixed_pose(
                settings(4),
                Isometry3::identity(),
            ))
            .unwrap();
        scene.set_ready(false);
        assert!(engine.update(&scene).is_err());

        assert_eq!(engine.output().len(), 3);
    }
}
