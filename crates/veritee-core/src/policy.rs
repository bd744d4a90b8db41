//! Appraisal of decoded machine state against expected measurements.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VerifyError};
use crate::evidence::{DecodedMachineState, Digest};

/// Allowed measurement values per platform register.
///
/// Read-only once loaded. The policy expresses allowed-value-set matching
/// and nothing richer; the secure-boot requirement is not part of the
/// policy and cannot be relaxed by it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppraisalPolicy {
    /// Register index -> set of acceptable digests.
    measurements: BTreeMap<u32, Vec<Digest>>,
}

impl AppraisalPolicy {
    /// Load the policy from a JSON file. A policy that cannot be loaded
    /// is fatal: verification cannot run without one.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| VerifyError::PolicyUnavailable(e.to_string()))?;
        serde_json::from_str(&contents).map_err(|e| VerifyError::PolicyUnavailable(e.to_string()))
    }

    pub fn from_measurements(measurements: BTreeMap<u32, Vec<Digest>>) -> Self {
        Self { measurements }
    }

    /// Evaluate machine state against this policy.
    ///
    /// Secure boot is checked first and unconditionally: a machine state
    /// with secure boot disabled fails even when the policy itself says
    /// nothing about it. Each register the policy names must then be
    /// present and carry one of its allowed digests.
    pub fn evaluate(&self, state: &DecodedMachineState) -> Result<()> {
        if !state.secure_boot {
            return Err(VerifyError::SecureBootDisabled);
        }

        for (register, allowed) in &self.measurements {
            match state.registers.get(register) {
                Some(digest) if allowed.contains(digest) => {}
                Some(digest) => {
                    return Err(VerifyError::PolicyViolation {
                        register: *register,
                        digest: digest.to_string(),
                    });
                }
                None => {
                    return Err(VerifyError::PolicyViolation {
                        register: *register,
                        digest: "missing".to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}
