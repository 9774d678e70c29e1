//! # CT Crypto - Primitives behind the opaque value handles
//!
//! The ledger never touches these directly: they are consumed by the
//! reference FHE runtime and the oracle attestation verifier.
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `sealing` | XChaCha20-Poly1305 | Sealing plaintext readings behind handles |
//! | `hashing` | BLAKE3 | Handle derivation, attestation digests |
//! | `attestation` | Ed25519 | Oracle proof of decryption authenticity |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod attestation;
pub mod errors;
pub mod hashing;
pub mod sealing;

// Re-exports
pub use attestation::{AttestationKeyPair, AttestationPublicKey, AttestationSignature};
pub use errors::CryptoError;
pub use hashing::{attestation_digest, derive_handle, Blake3Hasher, Digest};
pub use sealing::{open_value, seal_value, SealedValue, SealingKey};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
