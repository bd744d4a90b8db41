pub mod claim;
pub mod encoding;
pub mod error;
pub mod evidence;
pub mod history;
pub mod policy;
pub mod trust;
pub mod verifier;

#[cfg(test)]
pub(crate) mod testutil;

pub use claim::{generate, ComputationClaim, VerificationContext};
pub use error::{Result, VerifyError};
pub use evidence::{DecodedMachineState, Digest, Quote};
pub use policy::AppraisalPolicy;
pub use trust::{TrustStore, TrustedAttestationKey};
pub use verifier::Verifier;
