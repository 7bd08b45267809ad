// ray_perception_core/src/types.rs

use nalgebra::{Point3, Unit, Vector3};
use serde::{Deserialize, Serialize};

// --- Core Identifiers ---

/// Whether the ray fan is confined to the agent's 2D plane or spread across
/// its horizontal plane in 3D.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CastType {
    /// Rays lie in the local XY plane. Forward (90°) is local +Y.
    Planar,
    /// Rays lie in the local XZ plane. Forward (90°) is local +Z.
    #[default]
    Volumetric,
}

/// A collision-layer bit mask. Bit `n` set means "layer `n` is visible to the sensor".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const ALL: Self = Self(u32::MAX);
    pub const NONE: Self = Self(0);

    /// Returns true when the two masks share at least one layer.
    pub fn intersects(self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

impl From<u32> for LayerMask {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}

// --- Oracle Query Types ---

/// A single ray handed to the raycast oracle, in WORLD coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayQuery {
    pub origin: Point3<f64>,
    pub direction: Unit<Vector3<f64>>,
}

/// The result of a ray that struck something.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance from the ray origin to the first obstruction.
    pub distance: f32,
}

/// Converts an optional oracle hit into the normalized range reading stored per ray.
///
/// A miss reads `1.0`; a hit reads `distance / cast_length`, clamped into `[0, 1]`
/// so an oracle reporting slightly past its max distance never leaks out of range.
pub fn hit_fraction(hit: Option<RayHit>, cast_length: f32) -> f32 {
    match hit {
        Some(hit) => (hit.distance / cast_length).clamp(0.0, 1.0),
        None => 1.0,
    }
}
