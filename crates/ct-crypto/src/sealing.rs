//! # Value Sealing
//!
//! XChaCha20-Poly1305 sealing of individual plaintext readings. A sealed
//! value is what sits behind an opaque handle in the reference runtime.

use crate::CryptoError;
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use zeroize::{Zeroize, Zeroizing};

/// Sealing key (256-bit), held only by the runtime/oracle.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SealingKey([u8; 32]);

impl SealingKey {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Generate a random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
        Self(bytes)
    }

    fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for SealingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SealingKey(***)")
    }
}

/// A sealed `u64` reading.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SealedValue {
    /// AEAD ciphertext including the Poly1305 tag.
    pub ciphertext: Vec<u8>,
    /// 24-byte XChaCha20 nonce.
    pub nonce: [u8; 24],
}

/// Seal a plaintext reading.
///
/// # Errors
///
/// Returns `CryptoError::SealFailed` if the AEAD rejects the input.
pub fn seal_value(key: &SealingKey, value: u64) -> Result<SealedValue, CryptoError> {
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
    let mut nonce = [0u8; 24];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut nonce);

    let ciphertext = cipher
        .encrypt(XNonce::from_slice(&nonce), value.to_le_bytes().as_slice())
        .map_err(|e| CryptoError::SealFailed(e.to_string()))?;

    Ok(SealedValue { ciphertext, nonce })
}

/// Open a sealed reading.
///
/// # Errors
///
/// Returns `CryptoError::OpenFailed` on a wrong key or tampered blob.
pub fn open_value(key: &SealingKey, sealed: &SealedValue) -> Result<u64, CryptoError> {
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());

    let plaintext = Zeroizing::new(
        cipher
            .decrypt(XNonce::from_slice(&sealed.nonce), sealed.ciphertext.as_slice())
            .map_err(|e| CryptoError::OpenFailed(e.to_string()))?,
    );

    let bytes: [u8; 8] =
        plaintext
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidPlaintextLength {
                expected: 8,
                actual: plaintext.len(),
            })?;
    Ok(u64::from_le_bytes(bytes))
}
