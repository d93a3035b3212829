//! Configuration Management
//!
//! Scenario settings: fixture binary, address and timeouts.

pub mod scenario;

// Re-export main types
pub use scenario::{default_fixture_bin, ScenarioConfig, ScenarioConfigBuilder, FIXTURE_SERVER_BIN};
