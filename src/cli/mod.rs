//! CLI command implementations.

pub mod agent_env;
pub mod config;
pub mod endpoint;
