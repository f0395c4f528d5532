// Library exports for the pose-coach CLI
// This allows testing of internal modules

pub mod commands;
pub mod config;
