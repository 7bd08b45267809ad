use bevy::prelude::Resource;
use clap::Parser;
use std::path::PathBuf;

/// Runs agents carrying ray perception sensors through a scenario.
///
/// This struct defines the command-line arguments shared by every binary
/// built on the ray perception simulation library.
#[derive(Parser, Debug, Resource, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the scenario TOML file to run.
    #[arg(short, long, default_value = "assets/scenarios/corridor.toml")]
    pub scenario: PathBuf,

    /// Run the simulation in headless mode (without a graphical window).
    #[arg(long, default_value_t = false)]
    pub headless: bool,
}
