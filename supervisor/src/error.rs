//! Supervisor-specific error types

use shared::SharedError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("Fixture script not found: {}", script.display())]
    ScriptNotFound { script: PathBuf },

    #[error("Fixture script is not executable: {}", script.display())]
    NotExecutable { script: PathBuf },

    #[error("Failed to spawn fixture {}: {source}", script.display())]
    SpawnFailed {
        script: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Fixture {} exited during launch ({status})", script.display())]
    ExitedDuringLaunch { script: PathBuf, status: String },

    #[error("Fixture already running: {} (pid {pid})", script.display())]
    AlreadyRunning { script: PathBuf, pid: u32 },

    #[error("No fixture registered for {}", script.display())]
    NotRegistered { script: PathBuf },

    #[error("Failed to send {signal} to pid {pid}: {source}")]
    SignalFailed {
        pid: u32,
        signal: String,
        #[source]
        source: nix::errno::Errno,
    },

    #[error("Failed to wait for pid {pid}: {source}")]
    WaitFailed {
        pid: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("Fixture pid {pid} still running after {timeout:?}")]
    StillRunning { pid: u32, timeout: Duration },

    #[error("Shared component error: {0}")]
    SharedError(#[from] SharedError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SupervisorError {
    /// Errors raised while bringing a fixture up, as opposed to tearing it down
    pub fn is_launch_failure(&self) -> bool {
        matches!(
            self,
            SupervisorError::ScriptNotFound { .. }
                | SupervisorError::NotExecutable { .. }
                | SupervisorError::SpawnFailed { .. }
                | SupervisorError::ExitedDuringLaunch { .. }
                | SupervisorError::AlreadyRunning { .. }
        )
    }
}

pub type SupervisorResult<T> = Result<T, SupervisorError>;
