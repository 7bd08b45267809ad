// ray_perception_sim/src/simulation/plugins/sensors/raycasting.rs
use avian3d::prelude::SpatialQuery;
use nalgebra::Isometry3;
use std::sync::Arc;
use std::time::Duration;

// --- Simulation Crate Imports ---
use crate::prelude::*;
use crate::simulation::core::events::LidarObservation;
use crate::simulation::core::transforms::bevy_global_transform_to_nalgebra_isometry;
use crate::simulation::plugins::sensors::oracle::SpatialQueryOracle;

// =========================================================================
// == Components & Plugin ==
// =========================================================================

/// The live ray settings of a sensor. Mutating this component reconfigures the
/// sensor on the next fixed step; the observation length follows right away.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct LidarSettings(pub RaySettings);

/// A ray perception sensor mounted on an agent.
#[derive(Component, Debug)]
pub struct LidarSensor {
    pub timer: Timer,
    pub sensor: RayPerceptionSensor,
    /// World pose of the sensor, shared with the perception engine.
    pub pose: Arc<SharedTransform>,
}

impl LidarSensor {
    pub fn new(
        rate_hz: f32,
        settings: RaySettings,
        initial_pose: Isometry3<f64>,
    ) -> Result<Self, PerceptionError> {
        let pose = Arc::new(SharedTransform::new(initial_pose));
        let sensor =
            RayPerceptionSensor::new(LidarPerceptionInput::new(settings, pose.clone()))?;
        Ok(Self {
            timer: Timer::new(Duration::from_secs_f32(1.0 / rate_hz), TimerMode::Repeating),
            sensor,
            pose,
        })
    }
}

pub struct LidarSensorPlugin;

impl Plugin for LidarSensorPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            spawn_lidar_sensors.in_set(SceneBuildSet::ProcessSensors),
        )
        .add_systems(
            FixedUpdate,
            (apply_lidar_settings, sync_sensor_poses)
                .in_set(SimulationSet::Precomputation)
                .run_if(in_state(AppState::Running)),
        )
        .add_systems(
            FixedUpdate,
            lidar_sensor_system
                .in_set(SimulationSet::Sensors)
                .run_if(in_state(AppState::Running)),
        );
    }
}

// =========================================================================
// == Spawning System ==
// =========================================================================

fn spawn_lidar_sensors(
    mut commands: Commands,
    request_query: Query<(Entity, &Name, &SpawnAgentConfigRequest)>,
) {
    for (agent_entity, agent_name, request) in &request_query {
        let agent_pose = request.0.starting_pose.to_isometry();

        for lidar_config in &request.0.sensors {
            let rate = lidar_config.get_rate();
            if !rate.is_finite() || rate <= 0.0 {
                error!(
                    "  -> Skipping sensor '{}' on agent '{}': rate must be positive, got {}",
                    lidar_config.name,
                    agent_name.as_str(),
                    rate
                );
                continue;
            }

            let mount = lidar_config.get_relative_pose();
            let sensor = match LidarSensor::new(
                rate,
                lidar_config.rays,
                agent_pose * mount.to_isometry(),
            ) {
                Ok(sensor) => sensor,
                Err(e) => {
                    error!(
                        "  -> Skipping sensor '{}' on agent '{}': {}",
                        lidar_config.name,
                        agent_name.as_str(),
                        e
                    );
                    continue;
                }
            };

            info!(
                "  -> Spawning ray sensor '{}' for agent '{}' with {} rays at {:.1} Hz ({:?})",
                lidar_config.name,
                agent_name.as_str(),
                sensor.sensor.declared_length(),
                rate,
                sensor.sensor.engine().strategy()
            );

            let sensor_entity = commands
                .spawn((
                    Name::new(lidar_config.name.clone()),
                    LidarSettings(lidar_config.rays),
                    sensor,
                    mount.to_bevy_transform(),
                ))
                .id();

            commands.entity(agent_entity).add_child(sensor_entity);
        }
    }
}

// =========================================================================
// == Precomputation Systems ==
// =========================================================================

/// Pushes edited `LidarSettings` into the perception engine. Rejected settings
/// are logged and the sensor keeps running with its previous configuration.
fn apply_lidar_settings(
    mut query: Query<(&Name, &LidarSettings, &mut LidarSensor), Changed<LidarSettings>>,
) {
    for (name, settings, mut lidar) in &mut query {
        if lidar.sensor.engine().input().settings == settings.0 {
            continue;
        }

        let input = LidarPerceptionInput::new(settings.0, lidar.pose.clone());
        match lidar.sensor.reconfigure(input) {
            Ok(()) => info!(
                "Sensor '{}' reconfigured: {} rays, {:?} strategy.",
                name.as_str(),
                lidar.sensor.declared_length(),
                lidar.sensor.engine().strategy()
            ),
            Err(e) => error!(
                "Sensor '{}' rejected new settings, keeping the old ones: {}",
                name.as_str(),
                e
            ),
        }
    }
}

fn sync_sensor_poses(query: Query<(&GlobalTransform, &LidarSensor)>) {
    for (transform, lidar) in &query {
        lidar
            .pose
            .set(bevy_global_transform_to_nalgebra_isometry(transform));
    }
}

// =========================================================================
// == Runtime System ==
// =========================================================================

/// Updates every sensor whose timer fired and publishes its observation.
fn lidar_sensor_system(
    mut observation_writer: EventWriter<LidarObservation>,
    time: Res<Time>,
    spatial_query: SpatialQuery,
    parent_query: Query<(Entity, &Children)>,
    mut sensor_query: Query<(Entity, &Name, &mut LidarSensor)>,
) {
    let dt = time.delta();

    for (agent_entity, children) in &parent_query {
        for &child_entity in children {
            let Ok((sensor_entity, name, mut lidar)) = sensor_query.get_mut(child_entity) else {
                continue;
            };

            lidar.timer.tick(dt);
            if !lidar.timer.just_finished() {
                continue;
            }

            // The sensor never sees its own agent.
            let oracle = SpatialQueryOracle::new(&spatial_query, agent_entity);
            if let Err(e) = lidar.sensor.update(&oracle) {
                warn!("Sensor '{}' update failed: {}", name.as_str(), e);
                continue;
            }

            match lidar.sensor.write() {
                Ok((values, _)) => {
                    observation_writer.write(LidarObservation {
                        agent: agent_entity,
                        sensor: sensor_entity,
                        timestamp: time.elapsed_secs_f64(),
                        values: values.to_vec(),
                    });
                }
                Err(e) => warn!("Sensor '{}' write failed: {}", name.as_str(), e),
            }
        }
    }
}
