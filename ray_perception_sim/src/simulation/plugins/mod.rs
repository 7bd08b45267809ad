pub mod sensors;
pub mod world;
