//! # In-Memory FHE Runtime
//!
//! Reference encryption backend and decryption oracle. Values are sealed
//! with XChaCha20-Poly1305 and addressed by a BLAKE3-derived handle; the
//! oracle side checks the ledger's grant table, queues requests, and on
//! `fulfill` returns plaintexts signed with its Ed25519 attestation key.
//!
//! Requests are not answered automatically: the harness decides when (and
//! whether) to deliver each [`DecryptionResponse`] to the ledger.

use crate::domain::{
    Address, CipherHandle, DecryptionProof, DecryptionResponse, GrantTable, LedgerError,
    LedgerResult, RequestId,
};
use crate::ports::{CipherBackend, DecryptionOracle};
use async_trait::async_trait;
use ct_crypto::{
    derive_handle, open_value, seal_value, AttestationKeyPair, AttestationPublicKey, SealedValue,
    SealingKey,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// In-memory encryption backend plus decryption oracle.
///
/// Sealed values are never evicted, including those sealed by a submission
/// that later failed.
pub struct InMemoryFheRuntime {
    sealing_key: SealingKey,
    attestation: AttestationKeyPair,
    values: RwLock<HashMap<CipherHandle, SealedValue>>,
    requests: RwLock<HashMap<RequestId, Vec<CipherHandle>>>,
    sequence: AtomicU64,
}

impl Default for InMemoryFheRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryFheRuntime {
    /// Create a runtime with fresh random keys.
    pub fn new() -> Self {
        Self::with_keys(SealingKey::generate(), AttestationKeyPair::generate())
    }

    /// Create a runtime with the given keys.
    pub fn with_keys(sealing_key: SealingKey, attestation: AttestationKeyPair) -> Self {
        Self {
            sealing_key,
            attestation,
            values: RwLock::new(HashMap::new()),
            requests: RwLock::new(HashMap::new()),
            sequence: AtomicU64::new(0),
        }
    }

    /// Public key the ledger verifies callbacks against.
    pub fn attestation_key(&self) -> AttestationPublicKey {
        self.attestation.public_key()
    }

    /// Number of values held.
    pub fn value_count(&self) -> usize {
        self.values.read().len()
    }

    /// Requests queued and not yet fulfilled.
    pub fn queued_requests(&self) -> Vec<RequestId> {
        self.requests.read().keys().copied().collect()
    }

    fn open(&self, handle: &CipherHandle) -> LedgerResult<u64> {
        let values = self.values.read();
        let sealed = values
            .get(handle)
            .ok_or_else(|| LedgerError::Oracle(format!("unknown handle {handle}")))?;
        Ok(open_value(&self.sealing_key, sealed)?)
    }

    /// Decrypt a queued request and sign the result.
    ///
    /// The request leaves the queue; the caller owns delivery.
    pub fn fulfill(&self, request_id: RequestId) -> LedgerResult<DecryptionResponse> {
        let handles = self
            .requests
            .write()
            .remove(&request_id)
            .ok_or(LedgerError::UnknownRequest(request_id))?;

        let plaintexts = handles
            .iter()
            .map(|h| self.open(h))
            .collect::<LedgerResult<Vec<u64>>>()?;
        let signature = self
            .attestation
            .attest_batch(request_id.as_bytes(), &plaintexts);

        debug!(%request_id, values = plaintexts.len(), "[ct-oracle] Request fulfilled");

        Ok(DecryptionResponse {
            request_id,
            plaintexts,
            proof: DecryptionProof(signature.as_bytes().to_vec()),
        })
    }

    /// Direct read-back for a capability holder.
    pub fn user_decrypt(
        &self,
        handle: &CipherHandle,
        grants: &GrantTable,
        requester: &Address,
    ) -> LedgerResult<u64> {
        if !grants.is_allowed(handle, requester) {
            return Err(LedgerError::NoCapability);
        }
        self.open(handle)
    }
}

impl CipherBackend for InMemoryFheRuntime {
    fn encrypt(&self, value: u64) -> LedgerResult<CipherHandle> {
        let sealed = seal_value(&self.sealing_key, value)?;
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let handle = CipherHandle::new(derive_handle(&sealed.ciphertext, &sealed.nonce, sequence));
        self.values.write().insert(handle, sealed);
        Ok(handle)
    }
}

#[async_trait]
impl DecryptionOracle for InMemoryFheRuntime {
    async fn request_decryption(
        &self,
        handles: &[CipherHandle],
        grants: &GrantTable,
        requester: Address,
    ) -> LedgerResult<RequestId> {
        {
            let values = self.values.read();
            for handle in handles {
                if !values.contains_key(handle) {
                    return Err(LedgerError::Oracle(format!("unknown handle {handle}")));
                }
                if !grants.is_allowed(handle, &requester) {
                    warn!(%handle, "[ct-oracle] Decryption refused: no capability");
                    return Err(LedgerError::NoCapability);
                }
            }
        }

        let request_id = uuid::Uuid::new_v4();
        self.requests.write().insert(request_id, handles.to_vec());
        debug!(%request_id, handles = handles.len(), "[ct-oracle] Decryption queued");
        Ok(request_id)
    }
}
