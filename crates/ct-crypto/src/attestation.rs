//! # Oracle Attestation
//!
//! Ed25519 keys the decryption oracle uses to prove that a plaintext batch
//! really is the decryption of the handles it was asked about. The ledger
//! only ever holds the public half.

use crate::hashing::attestation_digest;
use crate::CryptoError;
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};

/// Oracle public key (32 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttestationPublicKey([u8; 32]);

impl AttestationPublicKey {
    /// Create from bytes, rejecting points not on the curve.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        VerifyingKey::from_bytes(&bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self(bytes))
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Verify that `signature` attests `plaintexts` for `request_id`.
    pub fn verify_batch(
        &self,
        request_id: &[u8],
        plaintexts: &[u64],
        signature: &AttestationSignature,
    ) -> Result<(), CryptoError> {
        let verifying_key =
            VerifyingKey::from_bytes(&self.0).map_err(|_| CryptoError::InvalidPublicKey)?;
        let digest = attestation_digest(request_id, plaintexts);
        let sig = ed25519_dalek::Signature::from_bytes(&signature.0);

        verifying_key
            .verify(&digest, &sig)
            .map_err(|_| CryptoError::SignatureVerificationFailed)
    }
}

/// Attestation signature (64 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttestationSignature([u8; 64]);

impl AttestationSignature {
    /// Create from a byte slice of exactly 64 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let array: [u8; 64] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidSignatureFormat(bytes.len()))?;
        Ok(Self(array))
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

/// Oracle signing keypair. The secret half is wiped when dropped.
pub struct AttestationKeyPair {
    signing_key: SigningKey,
}

impl AttestationKeyPair {
    /// Generate a random keypair.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut rand::thread_rng()),
        }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&seed),
        }
    }

    /// Get the public key the ledger should be configured with.
    pub fn public_key(&self) -> AttestationPublicKey {
        AttestationPublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a decrypted batch for `request_id`.
    pub fn attest_batch(&self, request_id: &[u8], plaintexts: &[u64]) -> AttestationSignature {
        let digest = attestation_digest(request_id, plaintexts);
        AttestationSignature(self.signing_key.sign(&digest).to_bytes())
    }
}
