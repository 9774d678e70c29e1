//! # Test Fixtures
//!
//! A ledger wired to one [`InMemoryFheRuntime`] (backend and oracle), a
//! manual clock and a broadcast event bus.

use std::sync::Arc;

use ct_crypto::{AttestationKeyPair, SealingKey};
use ct_ledger::{
    Address, CipherHandle, ConfidentialLedgerApi, DecryptionProof, DecryptionResponse,
    Ed25519AttestationVerifier, FieldValues, InMemoryEventBus, InMemoryFheRuntime, LedgerConfig,
    LedgerPorts, LedgerResult, LedgerService, ManualTimeSource, PeriodId, RequestId,
    SummaryRequestOutcome,
};

/// Owner identity.
pub const OWNER: Address = [0xA0; 20];
/// Reviewer identity.
pub const REVIEWER: Address = [0xB0; 20];
/// Reporter identities.
pub const REPORTERS: [Address; 3] = [[0x01; 20], [0x02; 20], [0x03; 20]];
/// Seed of the oracle attestation key, so tests can play a misbehaving oracle.
pub const ORACLE_SEED: [u8; 32] = [0x5E; 32];
/// Start of the test clock.
pub const GENESIS: u64 = 1_700_000_000;

/// Service type under test.
pub type TestLedger =
    LedgerService<InMemoryFheRuntime, InMemoryFheRuntime, Ed25519AttestationVerifier>;

/// Ports type under test.
pub type TestPorts =
    LedgerPorts<InMemoryFheRuntime, InMemoryFheRuntime, Ed25519AttestationVerifier>;

fn wire(
    runtime: &Arc<InMemoryFheRuntime>,
    clock: &Arc<ManualTimeSource>,
    bus: &Arc<InMemoryEventBus>,
) -> TestPorts {
    LedgerPorts {
        cipher: runtime.clone(),
        oracle: runtime.clone(),
        verifier: Ed25519AttestationVerifier::new(runtime.attestation_key()),
        clock: clock.clone(),
        events: bus.clone(),
    }
}

/// Sign `plaintexts` for `request_id` with the oracle's key.
pub fn oracle_signature(request_id: RequestId, plaintexts: &[u64]) -> DecryptionProof {
    let oracle = AttestationKeyPair::from_seed(ORACLE_SEED);
    DecryptionProof(
        oracle
            .attest_batch(request_id.as_bytes(), plaintexts)
            .as_bytes()
            .to_vec(),
    )
}

/// Wired ledger plus handles on its collaborators.
pub struct LedgerHarness {
    /// Ledger under test.
    pub ledger: TestLedger,
    /// Backend and oracle.
    pub runtime: Arc<InMemoryFheRuntime>,
    /// Clock.
    pub clock: Arc<ManualTimeSource>,
    /// Event bus.
    pub bus: Arc<InMemoryEventBus>,
}

impl LedgerHarness {
    /// Ports for a ledger sharing this harness's collaborators.
    pub fn ports(&self) -> TestPorts {
        wire(&self.runtime, &self.clock, &self.bus)
    }

    /// Ledger with `config`, every reporter and the reviewer authorized.
    pub async fn new(config: LedgerConfig) -> Self {
        let runtime = Arc::new(InMemoryFheRuntime::with_keys(
            SealingKey::generate(),
            AttestationKeyPair::from_seed(ORACLE_SEED),
        ));
        let clock = Arc::new(ManualTimeSource::new(GENESIS));
        let bus = Arc::new(InMemoryEventBus::new());
        let ports = wire(&runtime, &clock, &bus);
        let ledger = LedgerService::new(config, OWNER, ports).expect("valid config");

        for reporter in REPORTERS {
            ledger
                .authorize_reporter(OWNER, reporter)
                .await
                .expect("owner authorizes");
        }
        ledger
            .authorize_reviewer(OWNER, REVIEWER)
            .await
            .expect("owner authorizes");

        Self {
            ledger,
            runtime,
            clock,
            bus,
        }
    }

    /// Harness with the testing config (60 second periods).
    pub async fn default_roles() -> Self {
        Self::new(LedgerConfig::for_testing()).await
    }

    /// Submit one reading per reporter, in order.
    pub async fn submit_all(&self, readings: &[FieldValues]) {
        for (reporter, values) in REPORTERS.iter().zip(readings) {
            self.ledger
                .submit(*reporter, *values)
                .await
                .expect("submission accepted");
        }
    }

    /// Let the current window elapse.
    pub fn expire_period(&self) {
        self.clock
            .advance(self.ledger.config().period_duration_secs);
    }

    /// Request the summary and expect an oracle round-trip.
    pub async fn request_pending(&self) -> RequestId {
        match self
            .ledger
            .request_summary(REVIEWER)
            .await
            .expect("summary requested")
        {
            SummaryRequestOutcome::Pending(id) => id,
            SummaryRequestOutcome::FinalizedEmpty => panic!("roster unexpectedly empty"),
        }
    }

    /// Have the oracle answer `request_id`.
    pub fn oracle_answer(&self, request_id: RequestId) -> DecryptionResponse {
        self.runtime.fulfill(request_id).expect("oracle fulfills")
    }

    /// Deliver an oracle response to the ledger.
    pub async fn deliver(&self, response: DecryptionResponse) -> LedgerResult<PeriodId> {
        self.ledger
            .on_decrypted(response.request_id, response.plaintexts, response.proof)
            .await
    }

    /// Decrypt `handle` as `who`, through the ledger's current grants.
    pub async fn decrypt_as(&self, handle: CipherHandle, who: Address) -> LedgerResult<u64> {
        let grants = self.ledger.grant_table().await;
        self.runtime.user_decrypt(&handle, &grants, &who)
    }
}
