//! Shell-script fixtures written into a temp directory

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use nix::errno::Errno;
use nix::sys::signal;
use nix::unistd::Pid;
use supervisor::{
    FixtureDescriptor, FixtureSupervisor, OutputMode, SupervisorConfig, SupervisorError,
    SupervisorResult,
};
use tempfile::TempDir;

/// Runs until signalled
pub const SLEEPER: &str = "#!/bin/sh\nexec sleep 30\n";

/// Ignores graceful signals
pub const STUBBORN: &str = "#!/bin/sh\ntrap '' TERM INT\nwhile true; do sleep 0.05; done\n";

/// Exits before the launch check completes
pub const CRASHER: &str = "#!/bin/sh\nexit 3\n";

pub struct ScriptDir {
    dir: TempDir,
}

impl ScriptDir {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write an executable script
    pub fn script(&self, name: &str, body: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, body).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// Wrapper that forks a server without `exec` and records the server's pid in `gc`
    pub fn wrapper(&self, name: &str) -> PathBuf {
        let body = format!(
            "#!/bin/sh\nsleep 30 &\necho $! > '{gc}.tmp'\nmv '{gc}.tmp' '{gc}'\nwait\n",
            gc = self.dir.path().join("gc").display(),
        );
        self.script(name, &body)
    }

    /// Script that records its arguments and FIXTURE_* environment, then sleeps
    pub fn recorder(&self, name: &str) -> PathBuf {
        let out = self.dir.path();
        let body = format!(
            "#!/bin/sh\nprintf '%s\\n' \"$@\" > '{args}.tmp'\nenv | grep '^FIXTURE_' | sort > '{env}'\nmv '{args}.tmp' '{args}'\nexec sleep 30\n",
            args = out.join("args").display(),
            env = out.join("env").display(),
        );
        self.script(name, &body)
    }
}

pub fn quiet_config() -> SupervisorConfig {
    SupervisorConfig::builder()
        .output(OutputMode::Null)
        .launch_check(Duration::from_millis(50))
        .stop_timeout(Duration::from_secs(2))
        .build()
}

/// `start`, retrying the rare ETXTBSY from exec'ing a freshly written script
pub async fn start(supervisor: &FixtureSupervisor, descriptor: &FixtureDescriptor) -> SupervisorResult<u32> {
    for _ in 0..10 {
        match supervisor.start(descriptor).await {
            Err(SupervisorError::SpawnFailed { source, .. })
                if source.raw_os_error() == Some(Errno::ETXTBSY as i32) =>
            {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
            other => return other,
        }
    }
    supervisor.start(descriptor).await
}

/// True while the pid exists (including as an unreaped zombie)
pub fn pid_exists(pid: u32) -> bool {
    !matches!(signal::kill(Pid::from_raw(pid as i32), None), Err(Errno::ESRCH))
}

/// Poll until `path` exists and read it
pub async fn read_when_ready(path: &Path) -> String {
    for _ in 0..100 {
        if let Ok(contents) = fs::read_to_string(path) {
            return contents;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("{} never appeared", path.display());
}

/// True while `pid` is running; zombies waiting for a reaper count as gone
pub fn pid_alive(pid: u32) -> bool {
    match fs::read_to_string(format!("/proc/{pid}/stat")) {
        Ok(stat) => {
            // state is the first field after the parenthesised command name
            let state = stat.rsplit(')').next().and_then(|rest| rest.trim_start().chars().next());
            !matches!(state, Some('Z') | Some('X'))
        }
        Err(_) => pid_exists(pid),
    }
}

/// Poll until `pid` is no longer running
pub async fn wait_until_gone(pid: u32) -> bool {
    for _ in 0..100 {
        if !pid_alive(pid) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}
