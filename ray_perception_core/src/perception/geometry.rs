// ray_perception_core/src/perception/geometry.rs

use nalgebra::{Isometry3, Point3, Unit, Vector3};

use crate::types::{CastType, RayQuery};

/// The angle of the forward ray, in degrees. Angles are measured from the local
/// "right" axis, so the fan is symmetric around this value.
pub const FORWARD_ANGLE_DEG: f32 = 90.0;

/// Generates the ordered ray angles (degrees) of a fan.
///
/// Returns `2 * rays_per_side + 1` angles, evenly spaced by
/// `cone_half_angle_deg / rays_per_side` and centred on 90°. With zero rays per
/// side only the forward ray remains.
pub fn generate_angles(rays_per_side: u32, cone_half_angle_deg: f32) -> Vec<f32> {
    if rays_per_side == 0 {
        return vec![FORWARD_ANGLE_DEG];
    }

    let total = 2 * rays_per_side as usize + 1;
    let increment = cone_half_angle_deg / rays_per_side as f32;
    let side = rays_per_side as i64;

    (0..total as i64)
        .map(|i| FORWARD_ANGLE_DEG + (i - side) as f32 * increment)
        .collect()
}

/// The angles of a fan together with the two parameters they were generated from.
#[derive(Debug, Clone, PartialEq)]
pub struct RayAngleSet {
    rays_per_side: u32,
    cone_half_angle_deg: f32,
    angles: Vec<f32>,
}

impl RayAngleSet {
    pub fn new(rays_per_side: u32, cone_half_angle_deg: f32) -> Self {
        Self {
            rays_per_side,
            cone_half_angle_deg,
            angles: generate_angles(rays_per_side, cone_half_angle_deg),
        }
    }

    /// True when the set was generated from different parameters and must be rebuilt.
    pub fn is_stale(&self, rays_per_side: u32, cone_half_angle_deg: f32) -> bool {
        self.rays_per_side != rays_per_side
            || self.cone_half_angle_deg.to_bits() != cone_half_angle_deg.to_bits()
    }

    pub fn angles(&self) -> &[f32] {
        &self.angles
    }

    pub fn len(&self) -> usize {
        self.angles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }
}

/// The world-space start and end of one ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayExtents {
    pub start: Point3<f64>,
    pub end: Point3<f64>,
}

impl RayExtents {
    /// The oracle query for this ray: origin at `start`, pointing at `end`.
    pub fn to_query(&self) -> RayQuery {
        RayQuery {
            origin: self.start,
            direction: Unit::new_normalize(self.end - self.start),
        }
    }
}

/// The ray's end point in the agent's LOCAL frame, before the transform is applied.
pub fn local_offset(angle_deg: f32, cast_length: f32, cast_type: CastType) -> Vector3<f64> {
    let theta = (angle_deg as f64).to_radians();
    let length = cast_length as f64;
    match cast_type {
        CastType::Planar => Vector3::new(length * theta.cos(), length * theta.sin(), 0.0),
        CastType::Volumetric => Vector3::new(length * theta.cos(), 0.0, length * theta.sin()),
    }
}

/// Converts a ray angle into its world-space extents.
///
/// `start` is the agent's position and `end` is the local offset carried into
/// the world by the agent's local-to-world transform.
pub fn ray_extents(
    angle_deg: f32,
    cast_length: f32,
    cast_type: CastType,
    transform: &Isometry3<f64>,
) -> RayExtents {
    let offset = local_offset(angle_deg, cast_length, cast_type);
    RayExtents {
        start: transform * Point3::origin(),
        end: transform * Point3::from(offset),
    }
}
