//! # Outbound Ports
//!
//! Traits for external dependencies: the encryption backend, the
//! decryption oracle, its attestation scheme, time and events.

use crate::domain::{
    Address, CipherHandle, DecryptionProof, GrantTable, LedgerEvent, LedgerResult, RequestId,
    Timestamp,
};
use async_trait::async_trait;

/// Encryption backend - outbound port.
///
/// Turns a plaintext into an opaque handle. The backend never learns who
/// may later decrypt it; that lives in the ledger's [`GrantTable`].
pub trait CipherBackend: Send + Sync {
    /// Encrypt one value.
    fn encrypt(&self, value: u64) -> LedgerResult<CipherHandle>;
}

/// Decryption oracle request primitive - outbound port.
///
/// The response arrives later through
/// [`crate::ConfidentialLedgerApi::on_decrypted`].
#[async_trait]
pub trait DecryptionOracle: Send + Sync {
    /// Queue decryption of `handles`. The oracle must refuse handles on which
    /// `grants` gives `requester` no capability.
    async fn request_decryption(
        &self,
        handles: &[CipherHandle],
        grants: &GrantTable,
        requester: Address,
    ) -> LedgerResult<RequestId>;
}

/// Oracle attestation check - outbound port.
pub trait AttestationVerifier: Send + Sync {
    /// Whether `proof` authenticates `plaintexts` as the answer to `request_id`.
    fn verify(&self, request_id: &RequestId, plaintexts: &[u64], proof: &DecryptionProof) -> bool;
}

/// Abstract time source for testability.
pub trait TimeSource: Send + Sync {
    /// Current unix timestamp in seconds.
    fn now(&self) -> Timestamp;
}

/// System time implementation.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Event sink - outbound port.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event. Returns the number of subscribers that received it.
    async fn publish(&self, event: LedgerEvent) -> usize;

    /// Total events published.
    fn events_published(&self) -> u64;
}
