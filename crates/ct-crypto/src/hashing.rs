//! # BLAKE3 Hashing
//!
//! Handle derivation and the digest an oracle signs when it returns
//! plaintexts. Both use BLAKE3 key derivation contexts so a handle can never
//! collide with an attestation digest.

use blake3::Hasher;

/// BLAKE3 output (256-bit).
pub type Digest = [u8; 32];

/// Derivation context for value handles.
const HANDLE_CONTEXT: &str = "ct-ledger 2024 cipher handle v1";

/// Derivation context for decryption attestations.
const ATTESTATION_CONTEXT: &str = "ct-ledger 2024 decryption attestation v1";

/// Stateful BLAKE3 hasher bound to a derivation context.
pub struct Blake3Hasher {
    inner: Hasher,
}

impl Blake3Hasher {
    /// Create a hasher for the given derivation context.
    pub fn for_context(context: &str) -> Self {
        Self {
            inner: Hasher::new_derive_key(context),
        }
    }

    /// Update with data.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.inner.update(data);
        self
    }

    /// Finalize and return the digest.
    pub fn finalize(&self) -> Digest {
        *self.inner.finalize().as_bytes()
    }
}

/// Derive the opaque handle for a sealed value.
///
/// `sequence` is the runtime's monotonic counter, so sealing the same
/// plaintext twice still yields distinct handles.
pub fn derive_handle(ciphertext: &[u8], nonce: &[u8], sequence: u64) -> Digest {
    let mut hasher = Blake3Hasher::for_context(HANDLE_CONTEXT);
    hasher
        .update(&sequence.to_le_bytes())
        .update(nonce)
        .update(ciphertext);
    hasher.finalize()
}

/// Digest binding a batch of plaintexts to the request that produced them.
///
/// The batch length is hashed before the values so that a truncated batch
/// never shares a digest with its prefix.
pub fn attestation_digest(request_id: &[u8], plaintexts: &[u64]) -> Digest {
    let mut hasher = Blake3Hasher::for_context(ATTESTATION_CONTEXT);
    hasher
        .update(&(request_id.len() as u64).to_le_bytes())
        .update(request_id)
        .update(&(plaintexts.len() as u64).to_le_bytes());
    for value in plaintexts {
        hasher.update(&value.to_le_bytes());
    }
    hasher.finalize()
}
