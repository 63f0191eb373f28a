// src/cli/handlers/mod.rs

// One module per CLI action.

pub mod commons;
pub mod get;
pub mod resources;
pub mod show;
pub mod targets;
