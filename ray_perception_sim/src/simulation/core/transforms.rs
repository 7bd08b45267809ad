// ray_perception_sim/src/simulation/core/transforms.rs

use bevy::prelude::{GlobalTransform, Transform as BevyTransform, Vec3 as BevyVec3};
use nalgebra::{Isometry3, Point3, Quaternion, Translation3, UnitQuaternion, Vector3};

// =========================================================================
// == Bevy <-> nalgebra Conversion Helpers ==
// =========================================================================
// The perception core works in nalgebra types; the physics engine in Bevy's.
// These helpers copy components as-is and never swap axes, so both sides
// describe the same Y-up world.

/// Converts a Bevy `Transform` into a `nalgebra::Isometry3<f64>`. Scale is dropped.
pub fn bevy_transform_to_nalgebra_isometry(transform: &BevyTransform) -> Isometry3<f64> {
    let t = transform.translation;
    let r = transform.rotation;
    Isometry3::from_parts(
        Translation3::new(t.x as f64, t.y as f64, t.z as f64),
        UnitQuaternion::from_quaternion(Quaternion::new(
            r.w as f64, r.x as f64, r.y as f64, r.z as f64,
        )),
    )
}

/// Converts a Bevy `GlobalTransform` into a `nalgebra::Isometry3<f64>`.
pub fn bevy_global_transform_to_nalgebra_isometry(transform: &GlobalTransform) -> Isometry3<f64> {
    bevy_transform_to_nalgebra_isometry(&transform.compute_transform())
}

pub fn nalgebra_point_to_bevy_vec3(point: &Point3<f64>) -> BevyVec3 {
    BevyVec3::new(point.x as f32, point.y as f32, point.z as f32)
}

pub fn nalgebra_vector_to_bevy_vec3(vector: &Vector3<f64>) -> BevyVec3 {
    BevyVec3::new(vector.x as f32, vector.y as f32, vector.z as f32)
}
