//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Sealing a plaintext failed
    #[error("Seal failed: {0}")]
    SealFailed(String),

    /// Opening a sealed value failed (wrong key or tampered blob)
    #[error("Open failed: {0}")]
    OpenFailed(String),

    /// Opened plaintext has the wrong width
    #[error("Invalid plaintext length: expected {expected}, got {actual}")]
    InvalidPlaintextLength {
        /// Expected length in bytes
        expected: usize,
        /// Actual length in bytes
        actual: usize,
    },

    /// Signature verification failed
    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    /// Invalid signature encoding
    #[error("Invalid signature format: expected 64 bytes, got {0}")]
    InvalidSignatureFormat(usize),

    /// Invalid public key
    #[error("Invalid public key")]
    InvalidPublicKey,
}
