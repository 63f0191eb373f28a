//! # System Interaction Layer
//!
//! The collaborators the configuration core talks to. Each one sits behind a trait so the
//! core can be driven by fakes in tests.
//!
//! ## Modules
//!
//! - **`executor`**: Runs an external command and captures its standard output.
//! - **`host_resolver`**: Hostname lookups (through `executor`) and internal/external
//!   address classification.
//! - **`filesystem`**: Creation of missing output directories.
//! - **`error_sink`**: Collects the messages of recoverable, unit-of-work level failures.
//! - **`plugins`**: Plugin groups and their load order.

pub mod error_sink;
pub mod executor;
pub mod filesystem;
pub mod host_resolver;
pub mod plugins;
