//! Application Layer
//!
//! User-facing CLI and configuration management.

pub mod cli;
pub mod config;

pub use cli::{Cli, Mode};
pub use config::Config;
