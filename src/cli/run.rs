use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use veritee_core::{AppraisalPolicy, TrustStore, Verifier};

use crate::config::VeriteeConfig;
use crate::pipeline::Pipeline;
use crate::runner::SupervisedTask;

pub async fn execute(
    config: &VeriteeConfig,
    program_override: Option<PathBuf>,
    work_dir_override: Option<PathBuf>,
    keep_going: bool,
) -> Result<()> {
    // Configuration failures surface here, before any work is picked up.
    let trust = TrustStore::load(&config.trust_store).context(format!(
        "Failed to load trust store from {}",
        config.trust_store.display()
    ))?;
    let policy = AppraisalPolicy::load(&config.policy).context(format!(
        "Failed to load appraisal policy from {}",
        config.policy.display()
    ))?;
    tracing::info!(keys = trust.len(), "trust store loaded");

    let verifier = Verifier::new(trust, policy);
    let work_dir = work_dir_override.unwrap_or_else(|| config.work_dir.clone());
    let stop_at_first_failure = if keep_going {
        false
    } else {
        config.stop_at_first_failure
    };

    let token = CancellationToken::new();

    // Ctrl-C triggers cooperative cancellation of both tasks.
    let signal_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("received ctrl-c, shutting down");
            signal_token.cancel();
        }
    });

    let program = program_override.or_else(|| config.program.clone());
    let runner = match program {
        Some(program) => {
            let task = SupervisedTask::spawn(&program, &config.program_args)?;
            Some(tokio::spawn(task.supervise(token.clone())))
        }
        None => {
            tracing::info!("no computation program configured, polling only");
            None
        }
    };

    let pipeline = Pipeline::new(
        verifier,
        work_dir,
        Duration::from_secs(config.poll_interval_secs),
        stop_at_first_failure,
    );
    let outcome = pipeline.run(token.clone()).await;

    // Whatever stopped the pipeline also stops the runner; wait for the
    // supervised process to actually go away before returning.
    token.cancel();
    if let Some(handle) = runner {
        handle.await.context("runner task panicked")??;
    }

    outcome
}
