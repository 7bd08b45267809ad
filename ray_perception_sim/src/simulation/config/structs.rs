// ray_perception_sim/src/simulation/config/structs.rs

use bevy::prelude::{Resource, Transform};
use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use ray_perception_core::config::RaySettings;
use serde::Deserialize;

use crate::simulation::utils::serde_helpers;

// =========================================================================
// == Top-Level Configuration Resource ==
// =========================================================================

/// # ScenarioConfig
/// The Bevy resource holding all configuration for a simulation run.
/// This struct is the root of the data parsed from a `scenario.toml` file.
#[derive(Resource, Debug, Deserialize, Default, Clone)]
#[serde(deny_unknown_fields)] // Fail if the TOML has fields not in our struct
pub struct ScenarioConfig {
    #[serde(default)] // Use default if the [simulation] section is missing
    pub simulation: Simulation,

    // The TOML has `[[obstacles]]`, which becomes a Vec of ObstacleConfig structs.
    #[serde(default)]
    pub obstacles: Vec<ObstacleConfig>,

    #[serde(default)]
    pub agents: Vec<AgentConfig>,
}

// =========================================================================
// == Configuration Sub-Structs ==
// =========================================================================

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Simulation {
    /// Rate of the fixed simulation step, in Hz. Sensors tick on this schedule.
    #[serde(default = "default_fixed_rate_hz")]
    pub fixed_rate_hz: f64,
    /// Stop the run after this many seconds. Runs forever when absent.
    #[serde(default)]
    pub duration_seconds: Option<f32>,
}

fn default_fixed_rate_hz() -> f64 {
    60.0
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            fixed_rate_hz: default_fixed_rate_hz(),
            duration_seconds: None,
        }
    }
}

/// A static box the sensors can see.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ObstacleConfig {
    pub name: String,
    #[serde(default)]
    pub pose: Pose,
    /// Full side lengths along X, Y and Z.
    pub size: [f32; 3],
    /// Collision layers the obstacle belongs to, as a bit mask.
    #[serde(default = "default_obstacle_layers")]
    pub layers: u32,
}

fn default_obstacle_layers() -> u32 {
    1
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    pub name: String,
    #[serde(default)]
    pub starting_pose: Pose,
    /// Constant turn rate about the vertical axis, in degrees per second.
    #[serde(default)]
    pub yaw_rate_deg: f32,
    /// Radius of the agent's own collider. Its sensors never see it.
    #[serde(default = "default_agent_radius")]
    pub radius: f32,
    #[serde(default)]
    pub sensors: Vec<LidarConfig>,
}

fn default_agent_radius() -> f32 {
    0.5
}

/// One ray perception sensor mounted on an agent.
// No `deny_unknown_fields` here: it does not combine with `flatten`.
#[derive(Debug, Deserialize, Clone)]
pub struct LidarConfig {
    pub name: String,
    /// Update rate in Hz.
    pub rate: f32,
    /// Mounting pose relative to the agent.
    #[serde(default)]
    pub transform: Pose,
    #[serde(flatten)]
    pub rays: RaySettings,
}

impl LidarConfig {
    pub fn get_rate(&self) -> f32 {
        self.rate
    }

    pub fn get_relative_pose(&self) -> &Pose {
        &self.transform
    }
}

// =========================================================================
// == Helper Structs for Nested Configuration ==
// =========================================================================

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    #[serde(deserialize_with = "serde_helpers::vec3_f64_from_f32_array", default)]
    pub translation: Vector3<f64>,

    #[serde(deserialize_with = "serde_helpers::quat_f64_from_euler_deg_f32", default)]
    pub rotation: UnitQuaternion<f64>,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
        }
    }
}

impl Pose {
    pub fn to_isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::from(self.translation), self.rotation)
    }

    pub fn to_bevy_transform(&self) -> Transform {
        let t = self.translation;
        let r = self.rotation.coords;
        Transform::from_xyz(t.x as f32, t.y as f32, t.z as f32).with_rotation(
            bevy::prelude::Quat::from_xyzw(r.x as f32, r.y as f32, r.z as f32, r.w as f32),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use figment::{
        providers::{Format, Toml},
        Figment,
    };
    use ray_perception_core::types::{CastType, LayerMask};

    const SCENARIO: &str = r#"
        [simulation]
        fixed_rate_hz = 50.0
        duration_seconds = 3.0

        [[obstacles]]
        name = "north_wall"
        size = [10.0, 2.0, 0.5]
        layers = 3
        [obstacles.pose]
        translation = [0.0, 1.0, -6.0]

        [[agents]]
        name = "scout"
        yaw_rate_deg = 30.0

        [[agents.sensors]]
        name = "front_rays"
        rate = 10.0
        rays_per_side = 4
        cone_half_angle_deg = 60.0
        cast_length = 12.0
        cast_type = "Volumetric"
        layer_mask = 1
        use_batching = true
        [agents.sensors.transform]
        translation = [0.0, 0.5, 0.0]
        rotation = [0.0, 180.0, 0.0]
    "#;

    fn parse(source: &str) -> ScenarioConfig {
        Figment::new().merge(Toml::string(source)).extract().unwrap()
    }

    #[test]
    fn test_parse_full_scenario() {
        let config = parse(SCENARIO);

        assert_eq!(config.simulation.fixed_rate_hz, 50.0);
        assert_eq!(config.simulation.duration_seconds, Some(3.0));

        let wall = &config.obstacles[0];
        assert_eq!(wall.name, "north_wall");
        assert_eq!(wall.layers, 3);
        assert_abs_diff_eq!(wall.pose.translation.z, -6.0, epsilon = 1e-9);

        let agent = &config.agents[0];
        assert_eq!(agent.radius, 0.5);
        let sensor = &agent.sensors[0];
        assert_eq!(sensor.get_rate(), 10.0);
        assert_eq!(
            sensor.rays,
            RaySettings {
                rays_per_side: 4,
                cone_half_angle_deg: 60.0,
                cast_length: 12.0,
                cast_type: CastType::Volumetric,
                layer_mask: LayerMask(1),
                use_batching: true,
            }
        );
        assert_abs_diff_eq!(
            sensor.get_relative_pose().rotation.angle(),
            std::f64::consts::PI,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_sensor_defaults() {
        let config = parse(
            r#"
            [[agents]]
            name = "minimal"
            [[agents.sensors]]
            name = "rays"
            rate = 5.0
            rays_per_side = 0
            cone_half_angle_deg = 0.0
            cast_length = 4.0
            "#,
        );

        assert_eq!(config.simulation.fixed_rate_hz, 60.0);
        assert!(config.obstacles.is_empty());
        let rays = config.agents[0].sensors[0].rays;
        assert_eq!(rays.cast_type, CastType::Volumetric);
        assert_eq!(rays.layer_mask, LayerMask::ALL);
        assert!(!rays.use_batching);
    }

    #[test]
    fn test_unknown_top_level_field_is_rejected() {
        let result: Result<ScenarioConfig, _> = Figment::new()
            .merge(Toml::string("gravity = [0.0, -9.81, 0.0]"))
            .extract();
        assert!(result.is_err());
    }

    #[test]
    fn test_pose_to_bevy_transform() {
        let pose = Pose {
            translation: Vector3::new(1.0, 2.0, 3.0),
            rotation: UnitQuaternion::from_euler_angles(0.0, std::f64::consts::FRAC_PI_2, 0.0),
        };
        let transform = pose.to_bevy_transform();
        assert_abs_diff_eq!(transform.translation.x, 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(transform.translation.z, 3.0, epsilon = 1e-6);

        // +90° about Y turns local +Z into +X.
        let forward = transform.rotation * bevy::prelude::Vec3::Z;
        assert_abs_diff_eq!(forward.x, 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(forward.z, 0.0, epsilon = 1e-6);
    }
}
