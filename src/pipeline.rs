use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use veritee_core::{generate, Verifier, VerifyError};
use veritee_models::WorkUnit;

/// What happened to a single work-unit file.
#[derive(Debug)]
enum Outcome {
    /// Verified and deleted.
    Verified,
    /// Unreadable or malformed; left in place for inspection.
    Skipped,
    /// Generation or verification failed.
    Failed(VerifyError),
}

/// Polls a work directory for pending claims and verifies them.
pub struct Pipeline {
    verifier: Verifier,
    work_dir: PathBuf,
    poll_interval: Duration,
    stop_at_first_failure: bool,
}

impl Pipeline {
    pub fn new(
        verifier: Verifier,
        work_dir: PathBuf,
        poll_interval: Duration,
        stop_at_first_failure: bool,
    ) -> Self {
        Self {
            verifier,
            work_dir,
            poll_interval,
            stop_at_first_failure,
        }
    }

    /// Poll until cancelled. Returns an error only when a verification
    /// failure halts the pipeline under the stop-at-first-failure policy
    /// (the token is cancelled first, so a supervised runner dies too).
    pub async fn run(&self, token: CancellationToken) -> Result<()> {
        loop {
            if token.is_cancelled() {
                break;
            }

            self.scan_once(&token)?;

            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }

        tracing::info!("pipeline stopped");
        Ok(())
    }

    /// One pass over the work directory. Directory read errors are
    /// transient (logged, retried next poll); only the failure policy
    /// produces a hard error.
    fn scan_once(&self, token: &CancellationToken) -> Result<()> {
        tracing::debug!(dir = %self.work_dir.display(), "checking for work units");

        let entries = match std::fs::read_dir(&self.work_dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %self.work_dir.display(), error = %e, "failed to read work directory");
                return Ok(());
            }
        };

        let mut found = false;
        for entry in entries {
            // Re-check cancellation between units to bound wasted work.
            if token.is_cancelled() {
                return Ok(());
            }

            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to read directory entry");
                    continue;
                }
            };
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            found = true;

            match self.process_file(&path) {
                Outcome::Verified | Outcome::Skipped => {}
                Outcome::Failed(e) => {
                    tracing::error!(file = %path.display(), error = %e, "claim verification failed");
                    if self.stop_at_first_failure {
                        token.cancel();
                        return Err(e).context(format!(
                            "stopping after failed verification of {}",
                            path.display()
                        ));
                    }
                    // Failed units are consumed too, otherwise the next
                    // poll would retry them forever.
                    if let Err(e) = std::fs::remove_file(&path) {
                        tracing::warn!(file = %path.display(), error = %e, "failed to remove rejected work unit");
                    }
                }
            }
        }

        if !found {
            tracing::debug!("no pending work units");
        }
        Ok(())
    }

    fn process_file(&self, path: &Path) -> Outcome {
        tracing::info!(file = %path.display(), "processing work unit");

        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "failed to read work unit, skipping");
                return Outcome::Skipped;
            }
        };

        let unit = match WorkUnit::from_json(&data) {
            Ok(unit) => unit,
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "malformed work unit left in place");
                return Outcome::Skipped;
            }
        };

        match self.verify_unit(unit) {
            Ok(()) => {
                tracing::info!(file = %path.display(), "claim verified");
                if let Err(e) = std::fs::remove_file(path) {
                    tracing::warn!(file = %path.display(), error = %e, "failed to remove verified work unit");
                }
                Outcome::Verified
            }
            Err(e) => Outcome::Failed(e),
        }
    }

    fn verify_unit(&self, unit: WorkUnit) -> veritee_core::Result<()> {
        let input = unit.input_bytes();
        let result = unit.result_bytes();

        let (claim, context) = generate(
            unit.claim.computation,
            input,
            result,
            unit.context.report,
            unit.claim.nonce,
        )?;

        self.verifier.verify(&claim, &context)
    }
}
