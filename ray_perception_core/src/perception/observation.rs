// ray_perception_core/src/perception/observation.rs

use crate::error::PerceptionError;
use crate::perception::engine::LidarPerceptionOutput;

/// Flattens a perception snapshot into the fixed-size buffer a learning pipeline consumes.
///
/// The buffer is allocated once and reused; it is only reallocated through
/// `resize` when the sensor's ray count changes.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationWriter {
    buffer: Vec<f32>,
}

impl ObservationWriter {
    pub fn new(declared_length: usize) -> Self {
        Self {
            buffer: vec![0.0; declared_length],
        }
    }

    /// Reallocates the buffer if `declared_length` differs from its current length.
    pub fn resize(&mut self, declared_length: usize) {
        if self.buffer.len() != declared_length {
            self.buffer = vec![0.0; declared_length];
        }
    }

    /// Copies each ray's hit fraction into the slot of the same index and
    /// returns how many values were written.
    pub fn write(&mut self, output: &LidarPerceptionOutput) -> Result<usize, PerceptionError> {
        let fractions = output.hit_fractions();
        if fractions.len() != self.buffer.len() {
            return Err(PerceptionError::LengthMismatch {
                snapshot: fractions.len(),
                buffer: self.buffer.len(),
            });
        }

        self.buffer.fill(0.0);
        self.buffer.copy_from_slice(fractions);
        Ok(fractions.len())
    }

    pub fn values(&self) -> &[f32] {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
