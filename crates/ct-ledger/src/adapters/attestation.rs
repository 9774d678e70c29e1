//! # Ed25519 Attestation Verifier
//!
//! Checks that a callback's proof is the oracle's Ed25519 signature over the
//! BLAKE3 attestation digest of `(request_id, plaintexts)`.

use crate::domain::{DecryptionProof, RequestId};
use crate::ports::AttestationVerifier;
use ct_crypto::{AttestationPublicKey, AttestationSignature};
use tracing::debug;

/// Verifier pinned to one oracle public key.
#[derive(Clone, Copy, Debug)]
pub struct Ed25519AttestationVerifier {
    oracle_key: AttestationPublicKey,
}

impl Ed25519AttestationVerifier {
    /// Create a verifier for `oracle_key`.
    pub fn new(oracle_key: AttestationPublicKey) -> Self {
        Self { oracle_key }
    }

    /// The pinned key.
    pub fn oracle_key(&self) -> &AttestationPublicKey {
        &self.oracle_key
    }
}

impl AttestationVerifier for Ed25519AttestationVerifier {
    fn verify(&self, request_id: &RequestId, plaintexts: &[u64], proof: &DecryptionProof) -> bool {
        let signature = match AttestationSignature::from_slice(&proof.0) {
            Ok(sig) => sig,
            Err(e) => {
                debug!(%request_id, error = %e, "Malformed attestation");
                return false;
            }
        };
        self.oracle_key
            .verify_batch(request_id.as_bytes(), plaintexts, &signature)
            .is_ok()
    }
}
