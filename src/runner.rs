use anyhow::{Context, Result};
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use std::os::unix::process::CommandExt;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// An external computation program running in its own process group.
///
/// The program produces work-unit files for the pipeline to pick up. It
/// is spawned as a process-group leader so that cancellation can take
/// down every descendant it forked, not just the leader.
pub struct SupervisedTask {
    child: tokio::process::Child,
    pgid: Pid,
}

impl SupervisedTask {
    pub fn spawn(program: &Path, args: &[String]) -> Result<Self> {
        if !program.exists() {
            anyhow::bail!("cannot find computation program: {}", program.display());
        }

        let mut command = std::process::Command::new(program);
        command.args(args);
        // New process group with the child as leader (pgid == pid).
        command.process_group(0);

        let child = tokio::process::Command::from(command)
            .spawn()
            .context(format!("Failed to start {}", program.display()))?;

        let pid = child
            .id()
            .context("spawned computation program has no pid")? as i32;

        tracing::info!(pid, program = %program.display(), "computation program started");

        Ok(Self {
            child,
            pgid: Pid::from_raw(pid),
        })
    }

    /// Wait for the program to exit on its own, or hard-kill its entire
    /// process group as soon as `token` is cancelled. Either way this
    /// returns only after the process has actually exited.
    pub async fn supervise(mut self, token: CancellationToken) -> Result<()> {
        tokio::select! {
            status = self.child.wait() => {
                let status = status.context("Failed to await computation program")?;
                if status.success() {
                    tracing::info!("computation program exited successfully");
                } else {
                    tracing::warn!(%status, "computation program exited with error");
                }
            }
            _ = token.cancelled() => {
                tracing::info!("cancelled, killing computation process group");
                if let Err(e) = killpg(self.pgid, Signal::SIGKILL) {
                    tracing::warn!(error = %e, "failed to kill process group");
                }
                // Teardown is complete only once the process is gone.
                let _ = self.child.wait().await;
            }
        }
        Ok(())
    }
}
