//! Outcome types reported by the supervisor

use serde::{Deserialize, Serialize};
use std::fmt;
use std::os::unix::process::ExitStatusExt;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

/// How a fixture process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitInfo {
    pub code: Option<i32>,
    pub signal: Option<i32>,
}

impl From<ExitStatus> for ExitInfo {
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
            signal: status.signal(),
        }
    }
}

impl fmt::Display for ExitInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code, self.signal) {
            (Some(code), _) => write!(f, "exit code {code}"),
            (None, Some(signal)) => write!(f, "signal {signal}"),
            (None, None) => write!(f, "unknown status"),
        }
    }
}

/// Result of a `stop` or `kill` request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// Exited in response to the graceful signal
    Exited(ExitInfo),
    /// Ignored the graceful signal and was killed after the stop timeout
    Escalated(ExitInfo),
    /// Killed by SIGKILL
    Killed(ExitInfo),
    /// Had already exited before the request
    AlreadyExited,
    /// Still alive after the stop timeout, escalation disabled
    StillRunning,
    /// Nothing registered under the requested script
    NotRegistered,
}

impl Termination {
    /// True when the process is known to be gone (or never existed)
    pub fn is_terminated(&self) -> bool {
        !matches!(self, Termination::StillRunning)
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Exited(info) => write!(f, "exited ({info})"),
            Termination::Escalated(info) => write!(f, "killed after stop timeout ({info})"),
            Termination::Killed(info) => write!(f, "killed ({info})"),
            Termination::AlreadyExited => write!(f, "already exited"),
            Termination::StillRunning => write!(f, "still running"),
            Termination::NotRegistered => write!(f, "not registered"),
        }
    }
}

/// Snapshot of a registered fixture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveFixture {
    pub script: PathBuf,
    pub pid: u32,
    pub uptime: Duration,
    pub running: bool,
}
