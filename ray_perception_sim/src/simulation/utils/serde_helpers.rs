// ray_perception_sim/src/simulation/utils/serde_helpers.rs

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Deserializer};

/// Reads a `[x, y, z]` array of `f32` into a `Vector3<f64>`.
pub fn vec3_f64_from_f32_array<'de, D>(deserializer: D) -> Result<Vector3<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let arr: [f32; 3] = Deserialize::deserialize(deserializer)?;
    Ok(Vector3::new(arr[0] as f64, arr[1] as f64, arr[2] as f64))
}

/// Reads `[roll, pitch, yaw]` in degrees into a rotation.
/// Roll, pitch and yaw rotate about the X, Y and Z axes respectively.
pub fn quat_f64_from_euler_deg_f32<'de, D>(deserializer: D) -> Result<UnitQuaternion<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let arr: [f32; 3] = Deserialize::deserialize(deserializer)?;
    Ok(UnitQuaternion::from_euler_angles(
        (arr[0]).to_radians() as f64, // Roll
        (arr[1]).to_radians() as f64, // Pitch
        (arr[2]).to_radians() as f64, // Yaw
    ))
}
