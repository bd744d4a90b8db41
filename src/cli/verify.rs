use anyhow::{Context, Result};
use std::path::Path;
use veritee_core::{generate, AppraisalPolicy, TrustStore, Verifier};
use veritee_models::WorkUnit;

use crate::config::VeriteeConfig;

pub fn execute(config: &VeriteeConfig, file: &Path, output_json: bool) -> Result<()> {
    let trust = TrustStore::load(&config.trust_store).context(format!(
        "Failed to load trust store from {}",
        config.trust_store.display()
    ))?;
    let policy = AppraisalPolicy::load(&config.policy).context(format!(
        "Failed to load appraisal policy from {}",
        config.policy.display()
    ))?;
    let verifier = Verifier::new(trust, policy);

    let data = std::fs::read(file)
        .context(format!("Failed to read work unit: {}", file.display()))?;
    let unit = WorkUnit::from_json(&data)
        .context(format!("Failed to parse work unit: {}", file.display()))?;

    let computation = unit.claim.computation.clone();
    let input = unit.input_bytes();
    let result = unit.result_bytes();

    let verdict = generate(
        unit.claim.computation,
        input,
        result,
        unit.context.report,
        unit.claim.nonce,
    )
    .and_then(|(claim, context)| verifier.verify(&claim, &context));

    if output_json {
        let json = serde_json::json!({
            "file": file.display().to_string(),
            "computation": computation,
            "verified": verdict.is_ok(),
            "error": verdict.as_ref().err().map(|e| e.to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
        verdict?;
    } else {
        println!("===========================================");
        println!(" Computation Claim Verification");
        println!("===========================================");
        println!();
        println!("File:        {}", file.display());
        println!("Computation: {}", computation);
        println!();

        match &verdict {
            Ok(()) => {
                println!("===========================================");
                println!(" ✓ CLAIM VERIFIED");
                println!("===========================================");
                println!();
                println!("The evidence is signed by pinned attestation keys,");
                println!("bound to the claim's nonce, compliant with the");
                println!("appraisal policy, and its quotes match the claimed");
                println!("digest history exactly.");
            }
            Err(e) => {
                println!("===========================================");
                println!(" ✗ CLAIM REJECTED");
                println!("===========================================");
                println!();
                println!("Reason: {}", e);
            }
        }
        verdict?;
    }

    Ok(())
}
