use anyhow::{Context, Result};
use std::path::Path;
use veritee_models::{ClaimRecord, ContextRecord, WorkUnit};

pub fn execute(
    computation: &str,
    input_path: &Path,
    result_path: &Path,
    evidence_path: &Path,
    nonce: Option<String>,
    output: &Path,
) -> Result<()> {
    let input: serde_json::Value = serde_json::from_slice(
        &std::fs::read(input_path)
            .context(format!("Failed to read input: {}", input_path.display()))?,
    )
    .context("Input is not valid JSON")?;

    let result: serde_json::Value = serde_json::from_slice(
        &std::fs::read(result_path)
            .context(format!("Failed to read result: {}", result_path.display()))?,
    )
    .context("Result is not valid JSON")?;

    let evidence = std::fs::read(evidence_path)
        .context(format!("Failed to read evidence: {}", evidence_path.display()))?;

    let nonce = nonce
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
        .into_bytes();

    // Run the generator now so malformed evidence or an empty nonce is
    // reported here, before a unit ever lands in the work directory.
    let (claim, _) = veritee_core::generate(
        computation,
        serde_json::to_vec(&input)?,
        serde_json::to_vec(&result)?,
        evidence.clone(),
        nonce.clone(),
    )?;

    let unit = WorkUnit {
        claim: ClaimRecord {
            computation: computation.to_string(),
            input,
            result,
            nonce: nonce.clone(),
        },
        context: ContextRecord {
            report: evidence,
            nonce,
        },
    };

    std::fs::write(output, unit.to_json()?)
        .context(format!("Failed to write work unit: {}", output.display()))?;

    println!("Work unit written to {}", output.display());
    println!("  Computation:    {}", computation);
    println!("  Digest history: {} events", claim.digest_history.len());

    Ok(())
}
