//! # Ledger Service
//!
//! Application service orchestrating the confidential ledger: role checks,
//! the period lifecycle, encrypted submissions, emergency access and the
//! decrypt-verify-aggregate protocol.
//!
//! ## Execution model
//!
//! Every operation takes the single state lock for its whole duration, so
//! operations are totally ordered and never interleave. Within an operation
//! all checks and all fallible backend calls run first; state is mutated
//! only once nothing can fail any more, and events are published after the
//! mutation. A rejected operation leaves no trace in ledger state.

use async_trait::async_trait;
use ct_telemetry::{log_period_event, metrics};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::algorithms::{evaluate, floor_average, gather_handles, reduce_batch};
use crate::config::LedgerConfig;
use crate::domain::{
    invariant_batch_shape, invariant_reporting_window, invariant_single_submission,
    invariant_summary_window, AccessRegistry, Address, AggregateSummary, CipherHandle,
    DecryptionProof, EncryptedStore, Field, FieldValues, GrantTable, LedgerError, LedgerEvent,
    LedgerResult, PendingDecryptionRequest, PeriodHistory, PeriodId, PeriodInfo, PeriodManager,
    Reading, ReportStatus, RequestId, Role, FIELD_COUNT,
};
use crate::ports::{
    AttestationVerifier, CipherBackend, ConfidentialLedgerApi, DecryptionOracle, EventPublisher,
    SubmissionReceipt, SummaryRequestOutcome, TimeSource,
};

/// Snapshot format written by [`LedgerService::export_state`].
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Logical persisted state: periods, readings, roles, grants, pending requests.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerState {
    access: AccessRegistry,
    periods: PeriodManager,
    store: EncryptedStore,
    pending: HashMap<RequestId, PendingDecryptionRequest>,
}

impl LedgerState {
    fn new(owner: Address) -> Self {
        Self {
            access: AccessRegistry::new(owner),
            periods: PeriodManager::new(),
            store: EncryptedStore::new(),
            pending: HashMap::new(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct LedgerSnapshot {
    format_version: u32,
    config: LedgerConfig,
    state: LedgerState,
}

/// Collaborators the ledger talks to.
pub struct LedgerPorts<C, O, V> {
    /// Encryption backend.
    pub cipher: Arc<C>,
    /// Decryption oracle request primitive.
    pub oracle: Arc<O>,
    /// Oracle attestation check.
    pub verifier: V,
    /// Clock.
    pub clock: Arc<dyn TimeSource>,
    /// Event sink.
    pub events: Arc<dyn EventPublisher>,
}

/// Confidential ledger service.
pub struct LedgerService<C, O, V> {
    config: LedgerConfig,
    state: Mutex<LedgerState>,
    cipher: Arc<C>,
    oracle: Arc<O>,
    verifier: V,
    clock: Arc<dyn TimeSource>,
    events: Arc<dyn EventPublisher>,
}

fn short(id: &Address) -> String {
    hex::encode(&id[..4])
}

/// Count and log a rejected operation, then pass the result through.
fn observe<T>(operation: &'static str, result: LedgerResult<T>) -> LedgerResult<T> {
    if let Err(err) = &result {
        metrics::OPERATIONS_REJECTED
            .with_label_values(&[err.kind().label()])
            .inc();
        debug!(operation, code = err.code(), "[ct-ledger] Rejected: {}", err);
    }
    result
}

impl<C, O, V> LedgerService<C, O, V>
where
    C: CipherBackend,
    O: DecryptionOracle,
    V: AttestationVerifier,
{
    /// Create an empty ledger administered by `owner`.
    pub fn new(
        config: LedgerConfig,
        owner: Address,
        ports: LedgerPorts<C, O, V>,
    ) -> LedgerResult<Self> {
        config.validate()?;
        Ok(Self::assemble(config, LedgerState::new(owner), ports))
    }

    /// Restore a ledger from [`Self::export_state`] output.
    ///
    /// The snapshot carries its own configuration, so pending requests are
    /// reduced with the field list they were issued under.
    pub fn from_snapshot(bytes: &[u8], ports: LedgerPorts<C, O, V>) -> LedgerResult<Self> {
        let snapshot: LedgerSnapshot =
            bincode::deserialize(bytes).map_err(|e| LedgerError::Snapshot(e.to_string()))?;
        if snapshot.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(LedgerError::Snapshot(format!(
                "unsupported format version {}",
                snapshot.format_version
            )));
        }
        snapshot.config.validate()?;
        info!(
            owner = %hex::encode(snapshot.state.access.owner()),
            periods = snapshot.state.periods.len(),
            readings = snapshot.state.store.reading_count(),
            pending = snapshot.state.pending.len(),
            "[ct-ledger] Restored from snapshot"
        );
        metrics::PENDING_AGGREGATIONS.set(snapshot.state.pending.len() as f64);
        Ok(Self::assemble(snapshot.config, snapshot.state, ports))
    }

    fn assemble(config: LedgerConfig, state: LedgerState, ports: LedgerPorts<C, O, V>) -> Self {
        Self {
            config,
            state: Mutex::new(state),
            cipher: ports.cipher,
            oracle: ports.oracle,
            verifier: ports.verifier,
            clock: ports.clock,
            events: ports.events,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Serialize the full logical state.
    pub async fn export_state(&self) -> LedgerResult<Vec<u8>> {
        let state = self.state.lock().await;
        let snapshot = LedgerSnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            config: self.config.clone(),
            state: state.clone(),
        };
        bincode::serialize(&snapshot).map_err(|e| LedgerError::Snapshot(e.to_string()))
    }

    /// Copy of the grant table, as handed to the oracle.
    pub async fn grant_table(&self) -> GrantTable {
        self.state.lock().await.store.grants().clone()
    }

    /// Whether `id` holds the reporter role.
    pub async fn is_reporter(&self, id: Address) -> bool {
        self.state.lock().await.access.is_reporter(&id)
    }

    /// Whether `id` holds the reviewer role.
    pub async fn is_reviewer(&self, id: Address) -> bool {
        self.state.lock().await.access.is_reviewer(&id)
    }

    async fn publish_all(&self, events: Vec<LedgerEvent>) {
        for event in events {
            self.events.publish(event).await;
        }
    }

    fn encrypt_summary(
        &self,
        reporter_count: u64,
        averages: &[(Field, u64)],
    ) -> LedgerResult<AggregateSummary> {
        let reporter_count = self.cipher.encrypt(reporter_count)?;
        let averages = averages
            .iter()
            .map(|(field, value)| Ok((*field, self.cipher.encrypt(*value)?)))
            .collect::<LedgerResult<Vec<_>>>()?;
        Ok(AggregateSummary {
            reporter_count,
            averages,
        })
    }

    fn zero_summary(&self) -> LedgerResult<AggregateSummary> {
        let zeros: Vec<(Field, u64)> = self
            .config
            .aggregated_fields
            .iter()
            .map(|f| (*f, 0))
            .collect();
        self.encrypt_summary(0, &zeros)
    }

    async fn authorize(&self, caller: Address, role: Role, id: Address) -> LedgerResult<()> {
        let mut state = self.state.lock().await;
        if !state.access.authorize(&caller, role, id)? {
            debug!(role = ?role, id = %short(&id), "[ct-ledger] Already authorized");
            return Ok(());
        }

        info!(role = ?role, id = %short(&id), "[ct-ledger] Authorized");
        let event = match role {
            Role::Reporter => LedgerEvent::ReporterAuthorized { reporter: id },
            Role::Reviewer => LedgerEvent::ReviewerAuthorized { reviewer: id },
        };
        self.publish_all(vec![event]).await;
        Ok(())
    }

    async fn do_start_period(&self, caller: Address) -> LedgerResult<PeriodId> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        state.access.require_owner(&caller)?;

        let now = self.clock.now();
        state.periods.check_can_start(now)?;
        let summary = self.zero_summary()?;
        let handles = summary.handles();

        let superseded = state.periods.current().filter(|p| p.active()).map(|p| p.id);
        let period_id = state
            .periods
            .open(now, self.config.period_duration_secs, summary)?;
        state
            .store
            .grants_mut()
            .allow_all(handles, self.config.ledger_identity);

        let end = now.saturating_add(self.config.period_duration_secs);
        if let Some(old) = superseded {
            warn!(
                period_id = old,
                "[ct-ledger] Expired period superseded without aggregation"
            );
        }
        metrics::PERIODS_STARTED.inc();
        log_period_event!(info, period_id, "[ct-ledger] Period started", end = end);

        self.publish_all(vec![LedgerEvent::PeriodStarted {
            period_id,
            start: now,
            end,
        }])
        .await;
        Ok(period_id)
    }

    async fn do_submit(
        &self,
        caller: Address,
        values: FieldValues,
    ) -> LedgerResult<SubmissionReceipt> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        state.access.require_reporter(&caller)?;

        let now = self.clock.now();
        let period = state.periods.current().ok_or(LedgerError::NoActivePeriod)?;
        invariant_reporting_window(period, now)?;
        invariant_single_submission(&state.store, period, &caller)?;
        let period_id = period.id;

        // Plaintext is only visible here, before encryption.
        let alerts = evaluate(&values, &self.config.alert_thresholds);
        let mut handles = [CipherHandle::new([0u8; 32]); FIELD_COUNT];
        for (slot, value) in handles.iter_mut().zip(values) {
            *slot = self.cipher.encrypt(value)?;
        }

        state
            .store
            .insert_reading(period_id, caller, Reading::new(handles, now))?;
        let grants = state.store.grants_mut();
        grants.allow_all(handles, self.config.ledger_identity);
        grants.allow_all(handles, caller);
        state.periods.enroll(period_id, caller)?;

        metrics::READINGS_SUBMITTED.inc();
        for kind in &alerts {
            metrics::ALERTS_RAISED.with_label_values(&[kind.label()]).inc();
        }
        log_period_event!(
            info,
            period_id,
            "[ct-ledger] Reading submitted",
            reporter = %short(&caller),
            alerts = alerts.len()
        );

        let mut events = vec![LedgerEvent::ReadingSubmitted {
            period_id,
            reporter: caller,
            timestamp: now,
        }];
        events.extend(alerts.iter().map(|kind| LedgerEvent::AlertRaised {
            period_id,
            reporter: caller,
            kind: *kind,
        }));
        self.publish_all(events).await;

        Ok(SubmissionReceipt {
            period_id,
            submitted_at: now,
            alerts,
        })
    }

    async fn do_request_summary(&self, caller: Address) -> LedgerResult<SummaryRequestOutcome> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        state.access.require_reviewer(&caller)?;

        let now = self.clock.now();
        let period = state.periods.current().ok_or(LedgerError::NoActivePeriod)?;
        invariant_summary_window(period, now)?;
        let period_id = period.id;
        let roster = period.roster.clone();

        if roster.is_empty() {
            let summary = self.zero_summary()?;
            let handles = summary.handles();
            state.periods.finalize(period_id, summary)?;
            state
                .store
                .grants_mut()
                .allow_all(handles, self.config.ledger_identity);

            metrics::SUMMARIES_FINALIZED.inc();
            log_period_event!(info, period_id, "[ct-ledger] Empty period finalized");
            self.publish_all(vec![LedgerEvent::SummaryFinalized {
                period_id,
                reporter_count: 0,
            }])
            .await;
            return Ok(SummaryRequestOutcome::FinalizedEmpty);
        }

        let fields = self.config.aggregated_fields.clone();
        let handles = gather_handles(&state.store, period_id, &roster, &fields)?;
        let request_id = self
            .oracle
            .request_decryption(&handles, state.store.grants(), self.config.ledger_identity)
            .await?;

        state.periods.begin_aggregation(period_id, request_id)?;
        state.pending.insert(
            request_id,
            PendingDecryptionRequest {
                request_id,
                period_id,
                fields,
                reporter_count: roster.len(),
                requested_at: now,
            },
        );

        metrics::SUMMARIES_REQUESTED.inc();
        metrics::PENDING_AGGREGATIONS.inc();
        log_period_event!(
            info,
            period_id,
            "[ct-ledger] Summary requested",
            request_id = %request_id,
            reporters = roster.len()
        );
        self.publish_all(vec![LedgerEvent::SummaryRequested {
            period_id,
            request_id,
            reporter_count: roster.len(),
        }])
        .await;
        Ok(SummaryRequestOutcome::Pending(request_id))
    }

    async fn do_on_decrypted(
        &self,
        request_id: RequestId,
        plaintexts: Vec<u64>,
        proof: DecryptionProof,
    ) -> LedgerResult<PeriodId> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        if !self.verifier.verify(&request_id, &plaintexts, &proof) {
            metrics::PROOF_FAILURES.inc();
            warn!(%request_id, "[ct-ledger] Decryption proof rejected");
            return Err(LedgerError::InvalidProof(request_id));
        }

        let pending = state
            .pending
            .get(&request_id)
            .ok_or(LedgerError::UnknownRequest(request_id))?;
        invariant_batch_shape(pending, &plaintexts)?;

        let sums = reduce_batch(&plaintexts, pending.reporter_count, pending.stride())?;
        let averages: Vec<(Field, u64)> = pending
            .fields
            .iter()
            .zip(&sums)
            .map(|(field, sum)| (*field, floor_average(*sum, pending.reporter_count)))
            .collect();
        let period_id = pending.period_id;
        let reporter_count = pending.reporter_count;
        let summary = self.encrypt_summary(reporter_count as u64, &averages)?;
        let handles = summary.handles();

        state.periods.finalize(period_id, summary)?;
        state
            .store
            .grants_mut()
            .allow_all(handles, self.config.ledger_identity);
        state.pending.remove(&request_id);

        metrics::SUMMARIES_FINALIZED.inc();
        metrics::PENDING_AGGREGATIONS.dec();
        log_period_event!(
            info,
            period_id,
            "[ct-ledger] Summary finalized",
            request_id = %request_id,
            reporters = reporter_count
        );
        self.publish_all(vec![LedgerEvent::SummaryFinalized {
            period_id,
            reporter_count,
        }])
        .await;
        Ok(period_id)
    }

    async fn do_grant_emergency_access(
        &self,
        caller: Address,
        reporter: Address,
        period_id: PeriodId,
    ) -> LedgerResult<()> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        state.access.require_reviewer(&caller)?;

        let handles = state
            .store
            .reading(period_id, &reporter)
            .ok_or(LedgerError::NoData(period_id))?
            .handles;
        state.store.grants_mut().allow_all(handles, caller);

        log_period_event!(
            warn,
            period_id,
            "[ct-ledger] Emergency access granted",
            reviewer = %short(&caller),
            reporter = %short(&reporter)
        );
        self.publish_all(vec![LedgerEvent::EmergencyAccessGranted {
            period_id,
            reviewer: caller,
            reporter,
        }])
        .await;
        Ok(())
    }

    fn finalized_summary(
        state: &LedgerState,
        caller: &Address,
        period_id: PeriodId,
    ) -> LedgerResult<AggregateSummary> {
        state.access.require_reviewer(caller)?;
        let period = state.periods.require(period_id)?;
        if !period.summary_finalized() {
            return Err(LedgerError::SummaryNotFinalized(period_id));
        }
        Ok(period.summary.clone())
    }

    async fn do_grant_summary_access(
        &self,
        caller: Address,
        period_id: PeriodId,
    ) -> LedgerResult<()> {
        let mut state = self.state.lock().await;
        let summary = Self::finalized_summary(&state, &caller, period_id)?;
        state
            .store
            .grants_mut()
            .allow_all(summary.handles(), caller);

        log_period_event!(
            info,
            period_id,
            "[ct-ledger] Summary access granted",
            reviewer = %short(&caller)
        );
        self.publish_all(vec![LedgerEvent::SummaryAccessGranted {
            period_id,
            reviewer: caller,
        }])
        .await;
        Ok(())
    }
}

#[async_trait]
impl<C, O, V> ConfidentialLedgerApi for LedgerService<C, O, V>
where
    C: CipherBackend + 'static,
    O: DecryptionOracle + 'static,
    V: AttestationVerifier + 'static,
{
    async fn authorize_reporter(&self, caller: Address, reporter: Address) -> LedgerResult<()> {
        observe(
            "authorize_reporter",
            self.authorize(caller, Role::Reporter, reporter).await,
        )
    }

    async fn authorize_reviewer(&self, caller: Address, reviewer: Address) -> LedgerResult<()> {
        observe(
            "authorize_reviewer",
            self.authorize(caller, Role::Reviewer, reviewer).await,
        )
    }

    async fn start_period(&self, caller: Address) -> LedgerResult<PeriodId> {
        observe("start_period", self.do_start_period(caller).await)
    }

    async fn submit(
        &self,
        caller: Address,
        values: FieldValues,
    ) -> LedgerResult<SubmissionReceipt> {
        observe("submit", self.do_submit(caller, values).await)
    }

    async fn request_summary(&self, caller: Address) -> LedgerResult<SummaryRequestOutcome> {
        observe("request_summary", self.do_request_summary(caller).await)
    }

    async fn on_decrypted(
        &self,
        request_id: RequestId,
        plaintexts: Vec<u64>,
        proof: DecryptionProof,
    ) -> LedgerResult<PeriodId> {
        observe(
            "on_decrypted",
            self.do_on_decrypted(request_id, plaintexts, proof).await,
        )
    }

    async fn grant_emergency_access(
        &self,
        caller: Address,
        reporter: Address,
        period_id: PeriodId,
    ) -> LedgerResult<()> {
        observe(
            "grant_emergency_access",
            self.do_grant_emergency_access(caller, reporter, period_id)
                .await,
        )
    }

    async fn read_period_history(
        &self,
        caller: Address,
        period_id: PeriodId,
    ) -> LedgerResult<PeriodHistory> {
        let state = self.state.lock().await;
        let result = state
            .access
            .require_reviewer(&caller)
            .and_then(|_| state.periods.require(period_id))
            .map(|p| p.history());
        observe("read_period_history", result)
    }

    async fn is_active(&self) -> bool {
        let now = self.clock.now();
        self.state.lock().await.periods.is_active(now)
    }

    async fn time_remaining(&self) -> u64 {
        let now = self.clock.now();
        self.state.lock().await.periods.time_remaining(now)
    }

    async fn report_status(&self, reporter: Address) -> ReportStatus {
        let state = self.state.lock().await;
        state
            .periods
            .current()
            .map(|p| state.store.report_status(p.id, &reporter))
            .unwrap_or_default()
    }

    async fn current_period_info(&self) -> Option<PeriodInfo> {
        self.state.lock().await.periods.current().map(|p| p.info())
    }

    async fn reading_handles(
        &self,
        caller: Address,
        period_id: PeriodId,
        reporter: Address,
    ) -> LedgerResult<[CipherHandle; FIELD_COUNT]> {
        let state = self.state.lock().await;
        let result = state
            .store
            .reading(period_id, &reporter)
            .ok_or(LedgerError::NoData(period_id))
            .and_then(|reading| {
                if state.store.grants().all_allowed(&reading.handles, &caller) {
                    Ok(reading.handles)
                } else {
                    Err(LedgerError::NoCapability)
                }
            });
        observe("reading_handles", result)
    }

    async fn has_capability(&self, handle: CipherHandle, grantee: Address) -> bool {
        self.state
            .lock()
            .await
            .store
            .grants()
            .is_allowed(&handle, &grantee)
    }

    async fn summary_handles(
        &self,
        caller: Address,
        period_id: PeriodId,
    ) -> LedgerResult<AggregateSummary> {
        let state = self.state.lock().await;
        observe(
            "summary_handles",
            Self::finalized_summary(&state, &caller, period_id),
        )
    }

    async fn grant_summary_access(&self, caller: Address, period_id: PeriodId) -> LedgerResult<()> {
        observe(
            "grant_summary_access",
            self.do_grant_summary_access(caller, period_id).await,
        )
    }

    async fn pending_request(&self, period_id: PeriodId) -> Option<RequestId> {
        self.state
            .lock()
            .await
            .periods
            .get(period_id)
            .and_then(|p| p.pending_request)
    }
}
