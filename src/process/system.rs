//! Launcher backed by real child processes
//!
//! Children inherit stdin/stdout/stderr and are tied to this process: they
//! are killed if the handle is dropped and, on Linux, receive SIGTERM when
//! the parent dies. An interactive Ctrl-C reaches the child through the
//! terminal's process group, so the parent keeps waiting for it instead of
//! exiting first.

use crate::error::{RunxError, RunxResult};
use crate::process::launcher::{LaunchSpec, ProcessLauncher};
use async_trait::async_trait;
use std::process::{ExitStatus, Stdio};
use tokio::process::{Child, Command};
use tracing::debug;

/// Launcher that spawns real processes
pub struct SystemLauncher;

impl SystemLauncher {
    /// Create a new system launcher
    pub fn new() -> Self {
        Self
    }

    fn command(spec: &LaunchSpec) -> Command {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args).envs(&spec.envs).kill_on_drop(true);
        if let Some(dir) = &spec.current_dir {
            cmd.current_dir(dir);
        }
        tie_to_parent(&mut cmd);
        cmd
    }
}

impl Default for SystemLauncher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessLauncher for SystemLauncher {
    async fn run(&self, spec: &LaunchSpec) -> RunxResult<i32> {
        debug!("Executing: {}", spec);

        let mut child = Self::command(spec)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| RunxError::launch(&spec.program, e))?;

        let status = wait_for(&mut child, &spec.program).await?;
        Ok(exit_code(status))
    }

    async fn capture(&self, spec: &LaunchSpec) -> Option<String> {
        debug!("Capturing: {}", spec);

        let output = Self::command(spec)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await
            .ok()?;

        output
            .status
            .success()
            .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Wait for the child, riding out interrupts delivered to the process group
async fn wait_for(child: &mut Child, program: &str) -> RunxResult<ExitStatus> {
    loop {
        tokio::select! {
            status = child.wait() => {
                return status.map_err(|e| RunxError::io(format!("waiting for {}", program), e));
            }
            interrupt = tokio::signal::ctrl_c() => {
                if interrupt.is_err() {
                    return child
                        .wait()
                        .await
                        .map_err(|e| RunxError::io(format!("waiting for {}", program), e));
                }
                debug!("Interrupt received, waiting for {} to exit", program);
            }
        }
    }
}

/// Exit code as a shell would report it
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

#[cfg(target_os = "linux")]
fn tie_to_parent(cmd: &mut Command) {
    // SAFETY: prctl only changes the child's own death-signal setting and
    // is async-signal-safe.
    unsafe {
        cmd.pre_exec(|| {
            if libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM as libc::c_ulong) == -1 {
                return Err(std::io::Error::last_os_error());
            }
            Ok(())
        });
    }
}

#[cfg(not(target_os = "linux"))]
fn tie_to_parent(_cmd: &mut Command) {}
