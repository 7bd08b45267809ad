// ray_perception_core/src/lib.rs

// This file defines the public modules of the library.
pub mod config;
pub mod error;
pub mod oracle;
pub mod perception;
pub mod prelude;
pub mod scene;
pub mod types;
