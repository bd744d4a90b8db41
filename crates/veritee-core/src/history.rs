//! Corroboration of a claim's digest history against evidence quotes.

use crate::error::{Result, VerifyError};
use crate::evidence::{Digest, Quote};

/// Check that the ordered evidence quotes match the claimed digest
/// history exactly: same length, same digest at every position.
///
/// Order is significant; the sequence is monotonic by execution order
/// and must not be re-sorted. The error carries the first index at which
/// the two sequences diverge (for a pure length mismatch, the length of
/// the shorter sequence).
pub fn verify_history(quotes: &[Quote], claimed: &[Digest]) -> Result<()> {
    let common = quotes.len().min(claimed.len());

    for index in 0..common {
        if quotes[index].digest != claimed[index] {
            return Err(VerifyError::HistoryMismatch { index });
        }
    }

    if quotes.len() != claimed.len() {
        return Err(VerifyError::HistoryMismatch { index: common });
    }

    Ok(())
}
