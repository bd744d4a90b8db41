//! Test-only construction of signed attestation evidence.

use std::collections::BTreeMap;

use ed25519_dalek::{Signer as _, SigningKey};
use sha2::{Digest as Sha2Digest, Sha256};

use crate::evidence::{Digest, EvidenceEnvelope, MachineStateBody, Quote};
use crate::policy::AppraisalPolicy;
use crate::trust::{TrustStore, TrustedAttestationKey};

/// Builds evidence the way a real TEE attestation subsystem would:
/// a machine-state body signed by an attestation key and a platform
/// security-module key, with one quote per execution event.
pub(crate) struct EvidenceBuilder {
    nonce: Vec<u8>,
    secure_boot: bool,
    events: Vec<String>,
    registers: BTreeMap<u32, Digest>,
    ak_seed: u8,
    platform_seed: u8,
}

impl EvidenceBuilder {
    pub(crate) fn new(nonce: &[u8]) -> Self {
        let mut registers = BTreeMap::new();
        registers.insert(0, sha256_digest(b"firmware"));
        registers.insert(4, sha256_digest(b"kernel"));

        Self {
            nonce: nonce.to_vec(),
            secure_boot: true,
            events: vec!["boot".to_string(), "exec".to_string(), "commit".to_string()],
            registers,
            ak_seed: 7,
            platform_seed: 8,
        }
    }

    pub(crate) fn with_events(mut self, events: &[&str]) -> Self {
        self.events = events.iter().map(|e| e.to_string()).collect();
        self
    }

    pub(crate) fn with_secure_boot(mut self, enabled: bool) -> Self {
        self.secure_boot = enabled;
        self
    }

    pub(crate) fn with_seeds(mut self, ak_seed: u8, platform_seed: u8) -> Self {
        self.ak_seed = ak_seed;
        self.platform_seed = platform_seed;
        self
    }

    /// Digests recorded for the builder's execution events, in order.
    pub(crate) fn event_digests(&self) -> Vec<Digest> {
        self.events.iter().map(|e| sha256_digest(e.as_bytes())).collect()
    }

    pub(crate) fn build(&self) -> Vec<u8> {
        self.build_inner(false)
    }

    /// Evidence whose body was mutated after signing.
    pub(crate) fn build_tampered(&self) -> Vec<u8> {
        self.build_inner(true)
    }

    fn build_inner(&self, tamper: bool) -> Vec<u8> {
        let body = MachineStateBody {
            nonce: self.nonce.clone(),
            secure_boot: self.secure_boot,
            registers: self.registers.clone(),
            quotes: self
                .event_digests()
                .into_iter()
                .map(|digest| Quote { digest })
                .collect(),
        };
        let mut body_bytes = serde_json::to_vec(&body).expect("body serializes");

        let ak = SigningKey::from_bytes(&[self.ak_seed; 32]);
        let platform = SigningKey::from_bytes(&[self.platform_seed; 32]);
        let ak_signature = ak.sign(&body_bytes);
        let platform_signature = platform.sign(&body_bytes);

        if tamper {
            let last = body_bytes.len() - 1;
            body_bytes[last] ^= 0x01;
        }

        let envelope = EvidenceEnvelope {
            body: body_bytes,
            ak_public_key: ak.verifying_key().as_bytes().to_vec(),
            platform_public_key: platform.verifying_key().as_bytes().to_vec(),
            ak_signature: ak_signature.to_bytes().to_vec(),
            platform_signature: platform_signature.to_bytes().to_vec(),
        };

        serde_json::to_vec(&envelope).expect("envelope serializes")
    }

    /// Trust store pinning exactly this builder's signing keys.
    pub(crate) fn trust_store(&self) -> TrustStore {
        let keys = [self.ak_seed, self.platform_seed]
            .iter()
            .map(|seed| {
                let key = SigningKey::from_bytes(&[*seed; 32]);
                TrustedAttestationKey::from_bytes(key.verifying_key().as_bytes())
                    .expect("valid key")
            })
            .collect();
        TrustStore::from_keys(keys).expect("non-empty")
    }

    /// Policy that allows exactly this builder's register values.
    pub(crate) fn matching_policy(&self) -> AppraisalPolicy {
        let measurements = self
            .registers
            .iter()
            .map(|(register, digest)| (*register, vec![digest.clone()]))
            .collect();
        AppraisalPolicy::from_measurements(measurements)
    }

    /// Policy expecting a digest this builder's evidence does not carry.
    pub(crate) fn mismatching_policy(&self, register: u32) -> AppraisalPolicy {
        let mut measurements: BTreeMap<u32, Vec<Digest>> = self
            .registers
            .iter()
            .map(|(r, digest)| (*r, vec![digest.clone()]))
            .collect();
        measurements.insert(register, vec![sha256_digest(b"something else")]);
        AppraisalPolicy::from_measurements(measurements)
    }
}

fn sha256_digest(data: &[u8]) -> Digest {
    Digest::new(Sha256::digest(data).to_vec())
}
