// ray_perception_core/src/perception/evaluator.rs

use dyn_clone::DynClone;
use nalgebra::Isometry3;
use std::fmt::Debug;

use crate::config::RaySettings;
use crate::error::PerceptionError;
use crate::oracle::RaycastOracle;
use crate::perception::geometry::ray_extents;
use crate::types::{hit_fraction, RayQuery};

/// Which of the two interchangeable evaluators a configuration selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    Sequential,
    Batched,
}

impl StrategyKind {
    pub fn evaluator(self) -> Box<dyn RayBatchEvaluator> {
        match self {
            StrategyKind::Sequential => Box::new(SequentialEvaluator),
            StrategyKind::Batched => Box::new(BatchedEvaluator),
        }
    }
}

/// The contract for anything that turns a fan of ray angles into hit fractions.
///
/// Every implementation must produce the same fractions for the same scene,
/// pose and angles; they may only differ in how they talk to the oracle.
pub trait RayBatchEvaluator: DynClone + Debug + Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Evaluates every ray and appends one hit fraction per angle to `out`, in angle order.
    ///
    /// On error `out` may hold a partial result; callers must discard it.
    fn evaluate(
        &self,
        angles: &[f32],
        settings: &RaySettings,
        pose: &Isometry3<f64>,
        oracle: &dyn RaycastOracle,
        out: &mut Vec<f32>,
    ) -> Result<(), PerceptionError>;
}

dyn_clone::clone_trait_object!(RayBatchEvaluator);

/// One oracle query per ray, issued in ray order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialEvaluator;

impl RayBatchEvaluator for SequentialEvaluator {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Sequential
    }

    fn evaluate(
        &self,
        angles: &[f32],
        settings: &RaySettings,
        pose: &Isometry3<f64>,
        oracle: &dyn RaycastOracle,
        out: &mut Vec<f32>,
    ) -> Result<(), PerceptionError> {
        for &angle in angles {
            let query = ray_extents(angle, settings.cast_length, settings.cast_type, pose).to_query();
            let hit = oracle.cast_single(&query, settings.cast_length, settings.layer_mask)?;
            out.push(hit_fraction(hit, settings.cast_length));
        }
        Ok(())
    }
}

/// Every ray of the fan submitted as a single batch query.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchedEvaluator;

impl RayBatchEvaluator for BatchedEvaluator {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Batched
    }

    fn evaluate(
        &self,
        angles: &[f32],
        settings: &RaySettings,
        pose: &Isometry3<f64>,
        oracle: &dyn RaycastOracle,
        out: &mut Vec<f32>,
    ) -> Result<(), PerceptionError> {
        let queries: Vec<RayQuery> = angles
            .iter()
            .map(|&angle| {
                ray_extents(angle, settings.cast_length, settings.cast_type, pose).to_query()
            })
            .collect();

        let hits = oracle.cast_batch(&queries, settings.cast_length, settings.layer_mask)?;
        if hits.len() != queries.len() {
            return Err(PerceptionError::BatchSize {
                expected: queries.len(),
                actual: hits.len(),
            });
        }

        out.extend(
            hits.into_iter()
                .map(|hit| hit_fraction(hit, settings.cast_length)),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OracleError;
    use crate::types::{CastType, LayerMask, RayHit};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Hits everything at a fixed distance and counts how it was queried.
    #[derive(Default)]
    struct CountingOracle {
        distance: Option<f32>,
        single_calls: AtomicUsize,
        batch_calls: AtomicUsize,
    }

    impl RaycastOracle for CountingOracle {
        fn cast_single(
            &self,
            _ray: &RayQuery,
            _max_distance: f32,
            _layer_mask: LayerMask,
        ) -> Result<Option<RayHit>, OracleError> {
            self.single_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.distance.map(|distance| RayHit { distance }))
        }

        fn cast_batch(
            &self,
            rays: &[RayQuery],
            _max_distance: f32,
            _layer_mask: LayerMask,
        ) -> Result<Vec<Option<RayHit>>, OracleError> {
            self.batch_calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![self.distance.map(|distance| RayHit { distance }); rays.len()])
        }
    }

    /// Always answers a batch with one record too few.
    struct ShortBatchOracle;

    impl RaycastOracle for ShortBatchOracle {
        fn cast_single(
            &self,
            _ray: &RayQuery,
            _max_distance: f32,
            _layer_mask: LayerMask,
        ) -> Result<Option<RayHit>, OracleError> {
            Ok(None)
        }

        fn cast_batch(
            &self,
            rays: &[RayQuery],
            _max_distance: f32,
            _layer_mask: LayerMask,
        ) -> Result<Vec<Option<RayHit>>, OracleError> {
            Ok(vec![None; rays.len().saturating_sub(1)])
        }
    }

    fn settings() -> RaySettings {
        RaySettings {
            rays_per_side: 2,
            cone_half_angle_deg: 60.0,
            cast_length: 10.0,
            cast_type: CastType::Volumetric,
            layer_mask: LayerMask::ALL,
            use_batching: true,
        }
    }

    #[test]
    fn test_sequential_issues_one_query_per_ray() {
        let oracle = CountingOracle {
            distance: Some(2.5),
            ..Default::default()
        };
        let angles = [30.0, 60.0, 90.0, 120.0, 150.0];
        let mut out = Vec::new();

        SequentialEvaluator
            .evaluate(&angles, &settings(), &Isometry3::identity(), &oracle, &mut out)
            .unwrap();

        assert_eq!(out, vec![0.25; 5]);
        assert_eq!(oracle.single_calls.load(Ordering::SeqCst), 5);
        assert_eq!(oracle.batch_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_batched_issues_a_single_batch() {
        let oracle = CountingOracle::default();
        let angles = [30.0, 60.0, 90.0, 120.0, 150.0];
        let mut out = Vec::new();

        BatchedEvaluator
            .evaluate(&angles, &settings(), &Isometry3::identity(), &oracle, &mut out)
            .unwrap();

        assert_eq!(out, vec![1.0; 5]);
        assert_eq!(oracle.single_calls.load(Ordering::SeqCst), 0);
        assert_eq!(oracle.batch_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_batched_rejects_wrong_record_count() {
        let mut out = Vec::new();
        let result = BatchedEvaluator.evaluate(
            &[60.0, 90.0, 120.0],
            &settings(),
            &Isometry3::identity(),
            &ShortBatchOracle,
            &mut out,
        );
        assert_eq!(
            result,
            Err(PerceptionError::BatchSize {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_strategy_kind_builds_matching_evaluator() {
        assert_eq!(
            StrategyKind::Sequential.evaluator().kind(),
            StrategyKind::Sequential
        );
        assert_eq!(StrategyKind::Batched.evaluator().kind(), StrategyKind::Batched);
    }
}
