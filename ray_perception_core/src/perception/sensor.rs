// ray_perception_core/src/perception/sensor.rs

use crate::config::LidarPerceptionInput;
use crate::error::PerceptionError;
use crate::oracle::RaycastOracle;
use crate::perception::engine::PerceptionEngine;
use crate::perception::observation::ObservationWriter;

/// A ray perception sensor as seen by a learning pipeline: a fixed-length,
/// order-stable observation refreshed once per simulation step.
///
/// Call `update` then `write` every step. Both are cheap to call repeatedly;
/// `write` always reflects the most recent successful `update`.
#[derive(Debug, Clone)]
pub struct RayPerceptionSensor {
    engine: PerceptionEngine,
    writer: ObservationWriter,
}

impl RayPerceptionSensor {
    pub fn new(input: LidarPerceptionInput) -> Result<Self, PerceptionError> {
        let engine = PerceptionEngine::new(input)?;
        let writer = ObservationWriter::new(engine.declared_length());
        Ok(Self { engine, writer })
    }

    /// The number of values `write` produces, `2 * rays_per_side + 1`.
    pub fn declared_length(&self) -> usize {
        self.engine.declared_length()
    }

    /// Pushes a new configuration snapshot. The observation buffer follows the
    /// new declared length right away; the snapshot follows on the next `update`.
    pub fn reconfigure(&mut self, input: LidarPerceptionInput) -> Result<(), PerceptionError> {
        self.engine.reconfigure(input)?;
        self.writer.resize(self.engine.declared_length());
        Ok(())
    }

    pub fn update(&mut self, oracle: &dyn RaycastOracle) -> Result<(), PerceptionError> {
        self.engine.update(oracle)
    }

    /// Writes the latest snapshot into the observation buffer and returns the
    /// buffer together with the number of values written.
    pub fn write(&mut self) -> Result<(&[f32], usize), PerceptionError> {
        let count = self.writer.write(self.engine.output())?;
        debug_assert_eq!(count, self.declared_length());
        Ok((self.writer.values(), count))
    }

    pub fn engine(&self) -> &PerceptionEngine {
        &self.engine
    }
}
