pub mod oracle;
pub mod raycasting;
