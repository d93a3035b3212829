//! Scenario Configuration
//!
//! Where the fixture server binary lives and how scenarios reach it

use std::path::PathBuf;
use std::time::Duration;

use crate::error::TesterResult;
use crate::runtime::free_port;

pub const FIXTURE_SERVER_BIN: &str = "fixture-server";

#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    /// Executable started as the fixture
    pub fixture_bin: PathBuf,
    pub host: String,
    /// 0 picks a free port when the scenario is built
    pub port: u16,
    /// How long a test waits for the fixture to answer
    pub ready_timeout: Duration,
    /// Per-test limit
    pub test_timeout: Duration,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            fixture_bin: default_fixture_bin(),
            host: "127.0.0.1".to_string(),
            port: 8080,
            ready_timeout: Duration::from_secs(10),
            test_timeout: Duration::from_secs(30),
        }
    }
}

impl ScenarioConfig {
    pub fn builder() -> ScenarioConfigBuilder {
        ScenarioConfigBuilder::new()
    }

    /// The configured port, or a free one when it is 0
    pub fn resolve_port(&self) -> TesterResult<u16> {
        if self.port == 0 {
            free_port(&self.host)
        } else {
            Ok(self.port)
        }
    }

    pub fn addr(&self, port: u16) -> String {
        format!("{}:{}", self.host, port)
    }
}

/// `fixture-server` next to the running executable
pub fn default_fixture_bin() -> PathBuf {
    std::env::current_exe()
        .map(|exe| exe.with_file_name(FIXTURE_SERVER_BIN))
        .unwrap_or_else(|_| PathBuf::from(FIXTURE_SERVER_BIN))
}

pub struct ScenarioConfigBuilder {
    config: ScenarioConfig,
}

impl ScenarioConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ScenarioConfig::default(),
        }
    }

    pub fn fixture_bin(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.fixture_bin = path.into();
        self
    }

    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn ready_timeout(mut self, timeout: Duration) -> Self {
        self.config.ready_timeout = timeout;
        self
    }

    pub fn test_timeout(mut self, timeout: Duration) -> Self {
        self.config.test_timeout = timeout;
        self
    }

    pub fn build(self) -> ScenarioConfig {
        self.config
    }
}

impl Default for ScenarioConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_defaults() {
        let config = ScenarioConfig::builder()
            .host("localhost")
            .port(9090)
            .fixture_bin("/opt/bin/fixture-server")
            .build();

        assert_eq!(config.addr(config.port), "localhost:9090");
        assert_eq!(config.fixture_bin, PathBuf::from("/opt/bin/fixture-server"));
        assert_eq!(config.ready_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_port_zero_resolves_to_free_port() {
        let config = ScenarioConfig::builder().port(0).build();
        assert_ne!(config.resolve_port().unwrap(), 0);

        let fixed = ScenarioConfig::builder().port(8123).build();
        assert_eq!(fixed.resolve_port().unwrap(), 8123);
    }

    #[test]
    fn test_default_fixture_bin_name() {
        assert_eq!(
            default_fixture_bin().file_name().unwrap(),
            FIXTURE_SERVER_BIN
        );
    }
}
