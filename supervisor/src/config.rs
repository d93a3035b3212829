//! Supervisor Configuration
//!
//! Timeouts, signals and the policies for the ambiguous cases (a second `start`
//! on a live key, `stop`/`kill` on a key nobody started).

use nix::sys::signal::Signal;
use shared::{SharedError, SharedResult};
use std::str::FromStr;
use std::time::Duration;

pub const ENV_STOP_TIMEOUT_MS: &str = "FIXTURE_STOP_TIMEOUT_MS";
pub const ENV_KILL_TIMEOUT_MS: &str = "FIXTURE_KILL_TIMEOUT_MS";
pub const ENV_LAUNCH_CHECK_MS: &str = "FIXTURE_LAUNCH_CHECK_MS";
pub const ENV_MISSING_HANDLE: &str = "FIXTURE_MISSING_HANDLE";
pub const ENV_DUPLICATE_START: &str = "FIXTURE_DUPLICATE_START";
pub const ENV_STOP_SIGNAL: &str = "FIXTURE_STOP_SIGNAL";

/// What `stop`/`kill` do when nothing is registered under the requested script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingHandlePolicy {
    /// Log and report `Termination::NotRegistered`
    #[default]
    Ignore,
    /// Fail with `SupervisorError::NotRegistered`
    Error,
}

impl FromStr for MissingHandlePolicy {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ignore" | "noop" => Ok(MissingHandlePolicy::Ignore),
            "error" => Ok(MissingHandlePolicy::Error),
            other => Err(SharedError::invalid_config(ENV_MISSING_HANDLE, other)),
        }
    }
}

/// What `start` does when a live handle already exists for the script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateStartPolicy {
    /// Kill the old process and register the new one
    Replace,
    /// Fail with `SupervisorError::AlreadyRunning`
    #[default]
    Error,
}

impl FromStr for DuplicateStartPolicy {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "replace" => Ok(DuplicateStartPolicy::Replace),
            "error" => Ok(DuplicateStartPolicy::Error),
            other => Err(SharedError::invalid_config(ENV_DUPLICATE_START, other)),
        }
    }
}

/// How fixture options reach the child process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptionChannel {
    /// `--name value` arguments
    Args,
    /// `FIXTURE_<NAME>` variables plus `FIXTURE_OPTIONS` JSON
    Env,
    #[default]
    Both,
}

impl OptionChannel {
    pub fn uses_args(&self) -> bool {
        matches!(self, OptionChannel::Args | OptionChannel::Both)
    }

    pub fn uses_env(&self) -> bool {
        matches!(self, OptionChannel::Env | OptionChannel::Both)
    }
}

/// Where fixture stdout/stderr go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Inherit,
    Null,
}

#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Signal sent by `stop`
    pub stop_signal: Signal,
    /// How long `stop` waits for a graceful exit
    pub stop_timeout: Duration,
    /// How long `kill` (and escalation) waits for the process to be reaped
    pub kill_timeout: Duration,
    /// How long `start` watches for an immediate exit; zero disables the check
    pub launch_check: Duration,
    /// Send SIGKILL when `stop_timeout` elapses
    pub escalate_on_timeout: bool,
    pub missing_handle: MissingHandlePolicy,
    pub duplicate_start: DuplicateStartPolicy,
    pub option_channel: OptionChannel,
    pub output: OutputMode,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            stop_signal: Signal::SIGTERM,
            stop_timeout: Duration::from_secs(5),
            kill_timeout: Duration::from_secs(2),
            launch_check: Duration::from_millis(100),
            escalate_on_timeout: true,
            missing_handle: MissingHandlePolicy::default(),
            duplicate_start: DuplicateStartPolicy::default(),
            option_channel: OptionChannel::default(),
            output: OutputMode::default(),
        }
    }
}

impl SupervisorConfig {
    /// Create a new builder
    pub fn builder() -> SupervisorConfigBuilder {
        SupervisorConfigBuilder::new()
    }

    /// Defaults overlaid with any `FIXTURE_*` variables present in the environment
    pub fn from_env() -> SharedResult<Self> {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a key lookup (the environment, or a map in tests)
    pub fn overlay<F>(mut self, lookup: F) -> SharedResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_STOP_TIMEOUT_MS) {
            self.stop_timeout = parse_millis(ENV_STOP_TIMEOUT_MS, &value)?;
        }
        if let Some(value) = lookup(ENV_KILL_TIMEOUT_MS) {
            self.kill_timeout = parse_millis(ENV_KILL_TIMEOUT_MS, &value)?;
        }
        if let Some(value) = lookup(ENV_LAUNCH_CHECK_MS) {
            self.launch_check = parse_millis(ENV_LAUNCH_CHECK_MS, &value)?;
        }
        if let Some(value) = lookup(ENV_MISSING_HANDLE) {
            self.missing_handle = value.parse()?;
        }
        if let Some(value) = lookup(ENV_DUPLICATE_START) {
            self.duplicate_start = value.parse()?;
        }
        if let Some(value) = lookup(ENV_STOP_SIGNAL) {
            self.stop_signal = parse_signal(&value)?;
        }
        Ok(self)
    }
}

fn parse_millis(field: &str, value: &str) -> SharedResult<Duration> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| SharedError::invalid_config(field, value))
}

/// Accepts `SIGINT`, `sigint` and `INT`
pub fn parse_signal(value: &str) -> SharedResult<Signal> {
    let upper = value.trim().to_uppercase();
    let name = if upper.starts_with("SIG") {
        upper
    } else {
        format!("SIG{upper}")
    };
    Signal::from_str(&name).map_err(|_| SharedError::invalid_config(ENV_STOP_SIGNAL, value))
}

pub struct SupervisorConfigBuilder {
    config: SupervisorConfig,
}

impl SupervisorConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SupervisorConfig::default(),
        }
    }

    /// Signal used for graceful stop (SIGTERM by default)
    pub fn stop_signal(mut self, signal: Signal) -> Self {
        self.config.stop_signal = signal;
        self
    }

    pub fn stop_timeout(mut self, timeout: Duration) -> Self {
        self.config.stop_timeout = timeout;
        self
    }

    pub fn kill_timeout(mut self, timeout: Duration) -> Self {
        self.config.kill_timeout = timeout;
        self
    }

    pub fn launch_check(mut self, window: Duration) -> Self {
        self.config.launch_check = window;
        self
    }

    pub fn escalate_on_timeout(mut self, escalate: bool) -> Self {
        self.config.escalate_on_timeout = escalate;
        self
    }

    pub fn missing_handle(mut self, policy: MissingHandlePolicy) -> Self {
        self.config.missing_handle = policy;
        self
    }

    pub fn duplicate_start(mut self, policy: DuplicateStartPolicy) -> Self {
        self.config.duplicate_start = policy;
        self
    }

    pub fn option_channel(mut self, channel: OptionChannel) -> Self {
        self.config.option_channel = channel;
        self
    }

    pub fn output(mut self, output: OutputMode) -> Self {
        self.config.output = output;
        self
    }

    pub fn build(self) -> SupervisorConfig {
        self.config
    }
}

impl Default for SupervisorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = SupervisorConfig::default();
        assert_eq!(config.stop_signal, Signal::SIGTERM);
        assert_eq!(config.missing_handle, MissingHandlePolicy::Ignore);
        assert_eq!(config.duplicate_start, DuplicateStartPolicy::Error);
        assert!(config.escalate_on_timeout);
    }

    #[test]
    fn test_overlay_reads_all_keys() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_STOP_TIMEOUT_MS, "250"),
            (ENV_KILL_TIMEOUT_MS, "75"),
            (ENV_LAUNCH_CHECK_MS, "0"),
            (ENV_MISSING_HANDLE, "error"),
            (ENV_DUPLICATE_START, "Replace"),
            (ENV_STOP_SIGNAL, "int"),
        ]);

        let config = SupervisorConfig::default()
            .overlay(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.stop_timeout, Duration::from_millis(250));
        assert_eq!(config.kill_timeout, Duration::from_millis(75));
        assert_eq!(config.launch_check, Duration::ZERO);
        assert_eq!(config.missing_handle, MissingHandlePolicy::Error);
        assert_eq!(config.duplicate_start, DuplicateStartPolicy::Replace);
        assert_eq!(config.stop_signal, Signal::SIGINT);
    }

    #[test]
    fn test_overlay_rejects_garbage() {
        let result = SupervisorConfig::default().overlay(|key| {
            (key == ENV_STOP_TIMEOUT_MS).then(|| "soon".to_string())
        });
        assert!(result.is_err());

        assert!(parse_signal("SIGNOPE").is_err());
        assert!("sometimes".parse::<MissingHandlePolicy>().is_err());
    }

    #[test]
    fn test_builder() {
        let config = SupervisorConfig::builder()
            .stop_signal(Signal::SIGINT)
            .stop_timeout(Duration::from_millis(10))
            .duplicate_start(DuplicateStartPolicy::Replace)
            .option_channel(OptionChannel::Env)
            .output(OutputMode::Null)
            .build();

        assert_eq!(config.stop_signal, Signal::SIGINT);
        assert_eq!(config.stop_timeout, Duration::from_millis(10));
        assert!(!config.option_channel.uses_args());
        assert!(config.option_channel.uses_env());
        assert_eq!(config.output, OutputMode::Null);
    }
}
