//! Fixture Process Supervisor
//!
//! Owns every fixture process it starts, keyed by script path. There is no global
//! registry: each supervisor is an explicit context, so unrelated test groups that
//! use separate supervisors never see each other's processes.

use async_trait::async_trait;
use nix::sys::signal::Signal;
use std::collections::HashMap;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::{DuplicateStartPolicy, MissingHandlePolicy, OutputMode, SupervisorConfig};
use crate::descriptor::FixtureDescriptor;
use crate::error::{SupervisorError, SupervisorResult};
use crate::handle::{ProcessHandle, SignalDelivery};
use crate::traits::FixtureControl;
use crate::types::{ActiveFixture, ExitInfo, Termination};
use shared::{component_debug, component_info, component_warn};

pub struct FixtureSupervisor {
    config: SupervisorConfig,

    /// Live handles; at most one per script path
    handles: Mutex<HashMap<PathBuf, ProcessHandle>>,
}

impl FixtureSupervisor {
    pub fn new(config: SupervisorConfig) -> Self {
        Self {
            config,
            handles: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    /// Absolute form of a script path, so `./x` and `/abs/x` share a key
    fn registry_key(script: &Path) -> SupervisorResult<PathBuf> {
        Ok(std::path::absolute(script)?)
    }

    /// Spawn the fixture described by `descriptor` and register its handle
    pub async fn start(&self, descriptor: &FixtureDescriptor) -> SupervisorResult<u32> {
        let key = Self::registry_key(descriptor.script())?;

        Self::check_script(&key).await?;
        descriptor.options().validate()?;

        let mut handles = self.handles.lock().await;

        if let Some(existing) = handles.get_mut(&key) {
            if existing.is_running() {
                match self.config.duplicate_start {
                    DuplicateStartPolicy::Error => {
                        return Err(SupervisorError::AlreadyRunning {
                            script: key,
                            pid: existing.pid(),
                        });
                    }
                    DuplicateStartPolicy::Replace => {
                        component_warn!(
                            "♻️ Replacing running fixture {} (pid {})",
                            key.display(),
                            existing.pid()
                        );
                        let _ = self.force_kill(existing).await?;
                    }
                }
            }
            handles.remove(&key);
        }

        let mut cmd = self.build_command(&key, descriptor)?;
        let child = cmd.spawn().map_err(|source| SupervisorError::SpawnFailed {
            script: key.clone(),
            source,
        })?;

        let mut handle = ProcessHandle::new(child, key.clone());
        let pid = handle.pid();

        if !self.config.launch_check.is_zero() {
            if let Some(status) = handle.wait_for_exit(self.config.launch_check).await? {
                return Err(SupervisorError::ExitedDuringLaunch {
                    script: key,
                    status: ExitInfo::from(status).to_string(),
                });
            }
        }

        component_info!(
            "🚀 Started fixture {} (PID: {}) with {} option(s)",
            descriptor.name(),
            pid,
            descriptor.options().len()
        );

        handles.insert(key, handle);
        Ok(pid)
    }

    /// Graceful termination. The handle stays registered so a following `kill`
    /// can confirm the process is gone.
    pub async fn stop(&self, script: &Path) -> SupervisorResult<Termination> {
        let key = Self::registry_key(script)?;
        let mut handles = self.handles.lock().await;

        let Some(handle) = handles.get_mut(&key) else {
            return self.missing_handle(key);
        };

        let pid = handle.pid();
        if handle.signal(self.config.stop_signal)? == SignalDelivery::ProcessGone {
            component_debug!("✅ Fixture {} (pid {}) already exited", key.display(), pid);
            return Ok(Termination::AlreadyExited);
        }

        if let Some(status) = handle.wait_for_exit(self.config.stop_timeout).await? {
            let info = ExitInfo::from(status);
            component_info!("🛑 Stopped fixture {} (pid {}): {}", key.display(), pid, info);
            return Ok(Termination::Exited(info));
        }

        if !self.config.escalate_on_timeout {
            component_warn!(
                "⏰ Fixture {} (pid {}) still running after {:?}",
                key.display(),
                pid,
                self.config.stop_timeout
            );
            return Ok(Termination::StillRunning);
        }

        component_warn!(
            "🔨 Fixture {} (pid {}) didn't respond to {}, using SIGKILL",
            key.display(),
            pid,
            self.config.stop_signal
        );
        match self.force_kill(handle).await? {
            Termination::Killed(info) => Ok(Termination::Escalated(info)),
            other => Ok(other),
        }
    }

    /// Forceful termination; tolerates an already-exited process. Always discards
    /// the handle.
    pub async fn kill(&self, script: &Path) -> SupervisorResult<Termination> {
        let key = Self::registry_key(script)?;
        let mut handles = self.handles.lock().await;

        let Some(mut handle) = handles.remove(&key) else {
            return self.missing_handle(key);
        };

        let termination = self.force_kill(&mut handle).await?;
        component_info!("🔪 Kill {}: {}", key.display(), termination);
        Ok(termination)
    }

    /// Kill every registered fixture; errors are logged, not returned
    pub async fn shutdown_all(&self) -> usize {
        let mut handles = self.handles.lock().await;
        let count = handles.len();

        for (script, mut handle) in handles.drain() {
            if let Err(e) = self.force_kill(&mut handle).await {
                component_warn!("⚠️ Failed to kill fixture {}: {}", script.display(), e);
            }
        }

        if count > 0 {
            component_info!("🛑 Shut down {} fixture(s)", count);
        }
        count
    }

    pub async fn is_running(&self, script: &Path) -> bool {
        let Ok(key) = Self::registry_key(script) else {
            return false;
        };
        let mut handles = self.handles.lock().await;
        handles.get_mut(&key).map(|h| h.is_running()).unwrap_or(false)
    }

    pub async fn pid(&self, script: &Path) -> Option<u32> {
        let key = Self::registry_key(script).ok()?;
        self.handles.lock().await.get(&key).map(|h| h.pid())
    }

    /// Snapshot of every registered handle, sorted by script path
    pub async fn active(&self) -> Vec<ActiveFixture> {
        let mut handles = self.handles.lock().await;
        let mut fixtures: Vec<ActiveFixture> = handles
            .values_mut()
            .map(|h| ActiveFixture {
                script: h.script().to_path_buf(),
                pid: h.pid(),
                uptime: h.uptime(),
                running: h.is_running(),
            })
            .collect();
        fixtures.sort_by(|a, b| a.script.cmp(&b.script));
        fixtures
    }

    async fn force_kill(&self, handle: &mut ProcessHandle) -> SupervisorResult<Termination> {
        if handle.signal(Signal::SIGKILL)? == SignalDelivery::ProcessGone {
            return Ok(Termination::AlreadyExited);
        }

        match handle.wait_for_exit(self.config.kill_timeout).await? {
            Some(status) => Ok(Termination::Killed(status.into())),
            None => Err(SupervisorError::StillRunning {
                pid: handle.pid(),
                timeout: self.config.kill_timeout,
            }),
        }
    }

    fn missing_handle(&self, key: PathBuf) -> SupervisorResult<Termination> {
        match self.config.missing_handle {
            MissingHandlePolicy::Ignore => {
                component_debug!("⏭️ No fixture registered for {}", key.display());
                Ok(Termination::NotRegistered)
            }
            MissingHandlePolicy::Error => Err(SupervisorError::NotRegistered { script: key }),
        }
    }

    async fn check_script(script: &Path) -> SupervisorResult<()> {
        let metadata = match tokio::fs::metadata(script).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SupervisorError::ScriptNotFound {
                    script: script.to_path_buf(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        if !metadata.is_file() || metadata.permissions().mode() & 0o111 == 0 {
            return Err(SupervisorError::NotExecutable {
                script: script.to_path_buf(),
            });
        }
        Ok(())
    }

    fn build_command(&self, script: &Path, descriptor: &FixtureDescriptor) -> SupervisorResult<Command> {
        let mut cmd = Command::new(script);
        let channel = self.config.option_channel;

        if channel.uses_args() {
            cmd.args(descriptor.options().to_args());
        }
        cmd.args(descriptor.extra_args());

        if channel.uses_env() {
            cmd.envs(descriptor.options().to_env_vars()?);
        }

        if let Some(dir) = descriptor.working_dir() {
            cmd.current_dir(dir);
        }

        let (stdout, stderr) = match self.config.output {
            OutputMode::Inherit => (Stdio::inherit(), Stdio::inherit()),
            OutputMode::Null => (Stdio::null(), Stdio::null()),
        };
        cmd.stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .process_group(0)
            .kill_on_drop(true);

        debug!("🔧 Command for {}: {:?}", script.display(), cmd.as_std());
        Ok(cmd)
    }
}

impl Default for FixtureSupervisor {
    fn default() -> Self {
        Self::new(SupervisorConfig::default())
    }
}

#[async_trait]
impl FixtureControl for FixtureSupervisor {
    async fn start(&self, descriptor: &FixtureDescriptor) -> SupervisorResult<u32> {
        FixtureSupervisor::start(self, descriptor).await
    }

    async fn stop(&self, script: &Path) -> SupervisorResult<Termination> {
        FixtureSupervisor::stop(self, script).await
    }

    async fn kill(&self, script: &Path) -> SupervisorResult<Termination> {
        FixtureSupervisor::kill(self, script).await
    }
}

impl Drop for FixtureSupervisor {
    fn drop(&mut self) {
        // Emergency cleanup - force kill anything nobody stopped, leftovers included
        for (script, handle) in self.handles.get_mut().iter_mut() {
            if handle.is_running() {
                component_warn!(
                    "🚨 Emergency cleanup: force killing fixture {} (pid {})",
                    script.display(),
                    handle.pid()
                );
            }
            handle.start_kill();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::FixtureOptions;

    #[tokio::test]
    async fn test_supervisor_creation() {
        let supervisor = FixtureSupervisor::default();
        assert!(supervisor.active().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_script_is_reported() {
        let supervisor = FixtureSupervisor::default();
        let descriptor = FixtureDescriptor::new("/nonexistent/fixture_12345", FixtureOptions::new());

        let err = supervisor.start(&descriptor).await.unwrap_err();
        assert!(matches!(err, SupervisorError::ScriptNotFound { .. }));
        assert!(err.is_launch_failure());
    }

    #[tokio::test]
    async fn test_unregistered_stop_and_kill_are_noops_by_default() {
        let supervisor = FixtureSupervisor::default();
        let script = Path::new("/nonexistent/fixture_12345");

        assert_eq!(supervisor.stop(script).await.unwrap(), Termination::NotRegistered);
        assert_eq!(supervisor.kill(script).await.unwrap(), Termination::NotRegistered);
    }

    #[tokio::test]
    async fn test_unregistered_stop_errors_under_strict_policy() {
        let config = SupervisorConfig::builder()
            .missing_handle(MissingHandlePolicy::Error)
            .build();
        let supervisor = FixtureSupervisor::new(config);

        let result = supervisor.stop(Path::new("/nonexistent/fixture_12345")).await;
        assert!(matches!(result, Err(SupervisorError::NotRegistered { .. })));
    }

    #[test]
    fn test_registry_key_is_absolute() {
        let key = FixtureSupervisor::registry_key(Path::new("procs/server")).unwrap();
        assert!(key.is_absolute());
        assert!(key.ends_with("procs/server"));
    }

    #[tokio::test]
    async fn test_directory_is_not_executable_fixture() {
        let supervisor = FixtureSupervisor::default();
        let descriptor = FixtureDescriptor::new("/tmp", FixtureOptions::new());

        let err = supervisor.start(&descriptor).await.unwrap_err();
        assert!(matches!(err, SupervisorError::NotExecutable { .. }));
    }
}
