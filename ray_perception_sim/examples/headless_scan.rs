// ray_perception_sim/examples/headless_scan.rs

//! Runs a scenario and prints the ray observations its sensors publish.
//!
//! This example demonstrates how to:
//! 1. Load a scenario chosen on the command line.
//! 2. Run the simulation with or without a window.
//! 3. Consume `LidarObservation` events the way a learning pipeline would.
//! 4. Reconfigure a sensor while it runs by editing its `LidarSettings`.
//!
//! To run this example:
//! `cargo run --example headless_scan -- --headless`

// --- Bevy Imports ---
use avian3d::prelude::*;
use bevy::{
    asset::AssetPlugin, log::LogPlugin, prelude::*, scene::ScenePlugin, state::app::StatesPlugin,
};
use clap::Parser;

// --- Project-Specific Imports ---
use ray_perception_sim::cli::Cli;
use ray_perception_sim::prelude::{AppState, LidarObservation, LidarSettings, ScenarioConfig};
use ray_perception_sim::RayPerceptionSimulationPlugin;

/// Seconds into the run at which every sensor's ray count is doubled.
const RECONFIGURE_AT_SECONDS: f32 = 3.0;

fn main() {
    // --- 1. Load Simulation Configuration ---
    let cli = Cli::parse();
    println!("Loading scenario from: {}", cli.scenario.display());

    let config = ScenarioConfig::load(&cli.scenario).unwrap_or_else(|err| {
        panic!(
            "Could not load scenario file at '{}'. Error: {}",
            cli.scenario.display(),
            err
        );
    });

    let log_plugin = LogPlugin {
        level: bevy::log::Level::INFO,
        filter: "info,wgpu_core=error,wgpu_hal=error,ray_perception_sim=debug,ray_perception_core=debug"
            .to_string(),
        ..default()
    };

    let mut app = App::new();

    // --- 2. Add Core Bevy Plugins & Resources ---
    if cli.headless {
        app.add_plugins((
            MinimalPlugins,
            TransformPlugin,
            AssetPlugin::default(),
            ScenePlugin,
            StatesPlugin,
            log_plugin,
        ))
        // Physics still looks up mesh assets for mesh-backed colliders.
        .init_asset::<Mesh>();
    } else {
        app.add_plugins(DefaultPlugins.set(log_plugin))
            .add_plugins(PhysicsDebugPlugin::default());
    }

    app.add_plugins(PhysicsPlugins::default())
        .insert_resource(config)
        .insert_resource(cli);

    app.init_state::<AppState>();

    // --- 3. Add the Main Simulation Plugin ---
    app.add_plugins(RayPerceptionSimulationPlugin);

    // --- 4. Add Example-Specific Systems ---
    app.add_systems(
        Update,
        (report_observations, double_ray_count_once).run_if(in_state(AppState::Running)),
    );

    // --- 5. Run the App ---
    println!("Starting ray perception simulation...");
    app.run();
}

/// Prints one line per observation, truncated to the first few values.
fn report_observations(
    mut observations: EventReader<LidarObservation>,
    names: Query<&Name>,
) {
    for observation in observations.read() {
        let agent = names
            .get(observation.agent)
            .map(|n| n.as_str())
            .unwrap_or("?");
        let sensor = names
            .get(observation.sensor)
            .map(|n| n.as_str())
            .unwrap_or("?");
        let preview: Vec<String> = observation
            .values
            .iter()
            .take(7)
            .map(|v| format!("{:.2}", v))
            .collect();

        info!(
            "[{:>6.2}s] {}/{} ({} values): [{}{}]",
            observation.timestamp,
            agent,
            sensor,
            observation.values.len(),
            preview.join(", "),
            if observation.values.len() > 7 { ", ..." } else { "" }
        );
    }
}

/// Doubles every sensor's rays per side once, to show the observation length
/// following a live configuration change.
fn double_ray_count_once(
    time: Res<Time>,
    mut done: Local<bool>,
    mut settings: Query<(&Name, &mut LidarSettings)>,
) {
    if *done || time.elapsed_secs() < RECONFIGURE_AT_SECONDS {
        return;
    }
    *done = true;

    for (name, mut lidar_settings) in &mut settings {
        let rays_per_side = (lidar_settings.0.rays_per_side * 2).max(1);
        info!(
            "Changing '{}' from {} to {} rays per side.",
            name.as_str(),
            lidar_settings.0.rays_per_side,
            rays_per_side
        );
        lidar_settings.0.rays_per_side = rays_per_side;
    }
}
