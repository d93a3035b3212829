//! Core shared types and identifiers

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use crate::errors::{SharedError, SharedResult};

/// Global component identity - set once at startup
static COMPONENT_ID: OnceLock<ComponentId> = OnceLock::new();

/// Environment variable carrying the whole option map as JSON
pub const OPTIONS_ENV_VAR: &str = "FIXTURE_OPTIONS";

/// Prefix for the per-option environment variables
pub const OPTION_ENV_PREFIX: &str = "FIXTURE_";

/// Identifies which binary of the workspace is emitting logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentId {
    /// Library use of the supervisor (tests, embedding)
    Supervisor,
    /// The test-group runner binary
    Tester,
    /// The HTTP fixture binary
    FixtureServer,
}

impl ComponentId {
    pub fn init_tester() -> &'static ComponentId {
        COMPONENT_ID.get_or_init(|| ComponentId::Tester)
    }

    pub fn init_fixture_server() -> &'static ComponentId {
        COMPONENT_ID.get_or_init(|| ComponentId::FixtureServer)
    }

    /// Current component, falling back to `Supervisor` when nothing was initialized
    pub fn current() -> &'static ComponentId {
        COMPONENT_ID.get().unwrap_or(&ComponentId::Supervisor)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentId::Supervisor => write!(f, "supervisor"),
            ComponentId::Tester => write!(f, "tester"),
            ComponentId::FixtureServer => write!(f, "fixture-server"),
        }
    }
}

/// Startup configuration for a fixture process: option name to value.
///
/// Ordered so that the generated argument list is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FixtureOptions(BTreeMap<String, String>);

impl FixtureOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an option (fluent API)
    pub fn with(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.0.insert(name.into(), value.to_string());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl ToString) {
        self.0.insert(name.into(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Option names must be non-empty and made of ASCII alphanumerics, `-` or `_`.
    /// No two names may share an environment key, and none may take `FIXTURE_OPTIONS`.
    pub fn validate(&self) -> SharedResult<()> {
        let mut keys: BTreeMap<String, &str> = BTreeMap::new();

        for name in self.0.keys() {
            let valid = !name.is_empty()
                && !name.starts_with('-')
                && name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
            if !valid {
                return Err(SharedError::InvalidOptionName { name: name.clone() });
            }

            let key = Self::env_key(name);
            if key == OPTIONS_ENV_VAR {
                return Err(SharedError::InvalidOptionName { name: name.clone() });
            }
            if let Some(first) = keys.insert(key.clone(), name) {
                return Err(SharedError::OptionKeyCollision {
                    first: first.to_string(),
                    second: name.clone(),
                    key,
                });
            }
        }
        Ok(())
    }

    /// `--name value` pairs in key order
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.0.len() * 2);
        for (name, value) in &self.0 {
            args.push(format!("--{name}"));
            args.push(value.clone());
        }
        args
    }

    /// One `FIXTURE_<NAME>` variable per option plus `FIXTURE_OPTIONS` with the JSON map
    pub fn to_env_vars(&self) -> SharedResult<Vec<(String, String)>> {
        let mut vars: Vec<(String, String)> = self
            .0
            .iter()
            .map(|(name, value)| (Self::env_key(name), value.clone()))
            .collect();

        let json = serde_json::to_string(&self.0).map_err(|e| SharedError::SerializationError {
            message: e.to_string(),
        })?;
        vars.push((OPTIONS_ENV_VAR.to_string(), json));

        Ok(vars)
    }

    /// `port` -> `FIXTURE_PORT`, `log-level` -> `FIXTURE_LOG_LEVEL`
    pub fn env_key(name: &str) -> String {
        format!("{OPTION_ENV_PREFIX}{}", name.to_ascii_uppercase().replace('-', "_"))
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for FixtureOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = Self::new();
        for (name, value) in iter {
            options.insert(name, value);
        }
        options
    }
}
