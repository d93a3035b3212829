//! Process Handle
//!
//! Wraps the spawned child. Every fixture leads its own process group (pgid ==
//! pid), so signals go to the whole group and reach anything a wrapper script
//! forked without `exec`. Once the leader has been reaped the group is still swept,
//! but the result is reported as `ProcessGone`.

use nix::errno::Errno;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::time::{Duration, Instant};
use tokio::process::Child;
use tracing::debug;

use crate::error::{SupervisorError, SupervisorResult};

/// Whether a signal reached a live process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalDelivery {
    Delivered,
    ProcessGone,
}

#[derive(Debug)]
pub struct ProcessHandle {
    child: Child,
    pid: u32,
    script: PathBuf,
    started_at: Instant,
    exit_status: Option<ExitStatus>,
}

impl ProcessHandle {
    pub(crate) fn new(child: Child, script: PathBuf) -> Self {
        let pid = child.id().unwrap_or(0);
        Self {
            child,
            pid,
            script,
            started_at: Instant::now(),
            exit_status: None,
        }
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn script(&self) -> &Path {
        &self.script
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Non-blocking exit check; caches the status once observed
    pub fn poll_exit(&mut self) -> SupervisorResult<Option<ExitStatus>> {
        if let Some(status) = self.exit_status {
            return Ok(Some(status));
        }

        let status = self.child.try_wait().map_err(|source| SupervisorError::WaitFailed {
            pid: self.pid,
            source,
        })?;
        self.exit_status = status;
        Ok(status)
    }

    pub fn is_running(&mut self) -> bool {
        matches!(self.poll_exit(), Ok(None))
    }

    /// Send a signal to the fixture's process group
    ///
    /// `Delivered` means the group leader was still alive. When the leader has
    /// already exited, leftover group members get the signal too.
    pub fn signal(&mut self, sig: Signal) -> SupervisorResult<SignalDelivery> {
        if self.pid == 0 {
            return Ok(SignalDelivery::ProcessGone);
        }
        let leader_exited = self.poll_exit()?.is_some();

        match killpg(self.pgid(), sig) {
            Ok(()) if leader_exited => {
                debug!("🧹 Sent {} to leftovers of process group {}", sig, self.pid);
                Ok(SignalDelivery::ProcessGone)
            }
            Ok(()) => {
                debug!("📤 Sent {} to process group {}", sig, self.pid);
                Ok(SignalDelivery::Delivered)
            }
            Err(Errno::ESRCH) => {
                debug!("✅ Process group {} already gone", self.pid);
                Ok(SignalDelivery::ProcessGone)
            }
            Err(_) if leader_exited => Ok(SignalDelivery::ProcessGone),
            Err(source) => Err(SupervisorError::SignalFailed {
                pid: self.pid,
                signal: sig.to_string(),
                source,
            }),
        }
    }

    fn pgid(&self) -> Pid {
        Pid::from_raw(self.pid as i32)
    }

    /// Wait up to `timeout` for the process to exit and reap it
    pub async fn wait_for_exit(&mut self, timeout: Duration) -> SupervisorResult<Option<ExitStatus>> {
        if let Some(status) = self.poll_exit()? {
            return Ok(Some(status));
        }

        match tokio::time::timeout(timeout, self.child.wait()).await {
            Ok(Ok(status)) => {
                self.exit_status = Some(status);
                Ok(Some(status))
            }
            Ok(Err(source)) => Err(SupervisorError::WaitFailed { pid: self.pid, source }),
            Err(_) => Ok(None),
        }
    }

    /// Fire-and-forget SIGKILL to the whole group, used from `Drop`
    pub(crate) fn start_kill(&mut self) {
        if self.pid == 0 {
            return;
        }
        let _ = killpg(self.pgid(), Signal::SIGKILL);
        if self.exit_status.is_none() {
            let _ = self.child.start_kill();
        }
    }
}
