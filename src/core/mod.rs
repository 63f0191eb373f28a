// src/core/mod.rs

pub mod config_loader;
pub mod config_resolver;
pub mod config_store;
pub mod interpolator;
pub mod paths;
pub mod resources;
pub mod target_resolver;
