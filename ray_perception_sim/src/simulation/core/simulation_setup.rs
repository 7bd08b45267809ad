// ray_perception_sim/src/simulation/core/simulation_setup.rs

use avian3d::prelude::{AngularVelocity, Collider, RigidBody};

use crate::prelude::*;
use crate::simulation::core::events::LidarObservation;

pub struct SimulationSetupPlugin;

impl Plugin for SimulationSetupPlugin {
    fn build(&self, app: &mut App) {
        // This plugin's job is to read the config and add resources and startup systems.
        let fixed_rate_hz = match app.world().get_resource::<ScenarioConfig>() {
            Some(config) => config.simulation.fixed_rate_hz,
            None => {
                warn!("ScenarioConfig not inserted before SimulationSetupPlugin, using defaults.");
                Simulation::default().fixed_rate_hz
            }
        };

        // --- INITIALIZE RESOURCES & EVENTS ---
        app.add_event::<LidarObservation>()
            .insert_resource(Time::<Fixed>::from_hz(fixed_rate_hz));

        // --- CONFIGURE THE SPAWNING PIPELINE ---
        // This chain of SystemSets guarantees the correct spawning order.
        app.configure_sets(
            OnEnter(AppState::SceneBuilding),
            (
                SceneBuildSet::CreateRequests,
                SceneBuildSet::ProcessSensors,
                SceneBuildSet::Physics,
                SceneBuildSet::Cleanup,
            )
                .chain(),
        );

        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            (
                // This system reads the config and creates entities with "request" components.
                spawn_agent_shells.in_set(SceneBuildSet::CreateRequests),
                // This system removes the temporary request components after all processing is done.
                cleanup_spawn_requests.in_set(SceneBuildSet::Cleanup),
                // This system transitions to the main simulation loop after building is complete.
                transition_to_running
                    .in_set(SceneBuildSet::Cleanup)
                    .after(cleanup_spawn_requests),
            ),
        );

        // Configure the runtime schedule graph.
        app.configure_sets(
            FixedUpdate,
            (SimulationSet::Precomputation, SimulationSet::Sensors).chain(),
        );

        app.add_systems(Update, stop_after_duration.run_if(in_state(AppState::Running)));
    }
}

fn spawn_agent_shells(mut commands: Commands, config: Res<ScenarioConfig>) {
    for agent_config in &config.agents {
        info!(
            "[SPAWN] Posting spawn request for agent: {}",
            &agent_config.name
        );

        let start_transform = agent_config.starting_pose.to_bevy_transform();

        commands.spawn((
            Name::new(agent_config.name.clone()),
            start_transform,
            // Kinematic: the agent turns at a constant rate and nothing pushes it around.
            RigidBody::Kinematic,
            Collider::sphere(agent_config.radius),
            AngularVelocity(Vec3::Y * agent_config.yaw_rate_deg.to_radians()),
            // Multiple systems in the spawning pipeline read from the agent config.
            SpawnAgentConfigRequest(agent_config.clone()),
        ));
    }
}

fn cleanup_spawn_requests(
    mut commands: Commands,
    query: Query<Entity, With<SpawnAgentConfigRequest>>,
) {
    info!("[CLEANUP] Removing spawn request components.");
    for entity in &query {
        commands.entity(entity).remove::<SpawnAgentConfigRequest>();
    }
}

/// Runs once at the end of the `OnEnter(SceneBuilding)` chain.
/// Its only job is to move the app into the main `Running` state.
fn transition_to_running(mut next_state: ResMut<NextState<AppState>>) {
    info!("Scene building complete. Transitioning to Running state.");
    next_state.set(AppState::Running);
}

fn stop_after_duration(
    time: Res<Time>,
    config: Res<ScenarioConfig>,
    mut exit: EventWriter<AppExit>,
) {
    let Some(duration) = config.simulation.duration_seconds else {
        return;
    };
    if time.elapsed_secs() >= duration {
        info!("Scenario duration of {:.1}s reached, exiting.", duration);
        exit.write(AppExit::Success);
    }
}
