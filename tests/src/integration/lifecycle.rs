//! # Period Lifecycle Flows
//!
//! Start → submit → expire → request → oracle callback → read back, plus
//! the same flow across several periods and through a snapshot restore.

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use tokio::time::timeout;

    use crate::fixtures::{LedgerHarness, GENESIS, OWNER, REPORTERS, REVIEWER};
    use ct_ledger::{
        ConfidentialLedgerApi, EventPublisher, Field, LedgerConfig, LedgerError, LedgerEvent,
        LedgerService, SummaryRequestOutcome,
    };

    const READINGS: [[u64; 5]; 3] = [
        [75, 120, 36, 90, 97],
        [80, 125, 37, 95, 98],
        [70, 118, 35, 88, 99],
    ];

    // =============================================================================
    // AGGREGATION
    // =============================================================================

    /// Reference scenario: floor averages 75 / 121 / 91 over three reporters.
    #[tokio::test]
    async fn test_reference_aggregation() {
        let h = LedgerHarness::default_roles().await;
        let period_id = h.ledger.start_period(OWNER).await.unwrap();
        h.submit_all(&READINGS).await;
        h.expire_period();

        let request_id = h.request_pending().await;
        let response = h.oracle_answer(request_id);
        assert_eq!(response.plaintexts.len(), 9);
        assert_eq!(h.deliver(response).await.unwrap(), period_id);

        h.ledger
            .grant_summary_access(REVIEWER, period_id)
            .await
            .unwrap();
        let summary = h.ledger.summary_handles(REVIEWER, period_id).await.unwrap();

        assert_eq!(h.decrypt_as(summary.reporter_count, REVIEWER).await.unwrap(), 3);
        let average = |field| summary.average(field).unwrap();
        assert_eq!(h.decrypt_as(average(Field::Metric1), REVIEWER).await.unwrap(), 75);
        assert_eq!(h.decrypt_as(average(Field::Metric2), REVIEWER).await.unwrap(), 121);
        assert_eq!(h.decrypt_as(average(Field::Metric4), REVIEWER).await.unwrap(), 91);
        assert!(summary.average(Field::Metric3).is_none());
        assert!(summary.average(Field::Metric5).is_none());

        let history = h.ledger.read_period_history(REVIEWER, period_id).await.unwrap();
        assert!(history.finalized);
        assert_eq!(history.reporter_count, 3);
        assert_eq!(history.start, GENESIS);
        assert_eq!(history.end, GENESIS + 60);
    }

    /// With every field configured, metrics 3 and 5 are averaged too.
    #[tokio::test]
    async fn test_all_fields_aggregation() {
        let h = LedgerHarness::new(LedgerConfig::for_testing().with_all_fields()).await;
        let period_id = h.ledger.start_period(OWNER).await.unwrap();
        h.submit_all(&READINGS).await;
        h.expire_period();

        let request_id = h.request_pending().await;
        let response = h.oracle_answer(request_id);
        assert_eq!(response.plaintexts.len(), 15);
        h.deliver(response).await.unwrap();

        h.ledger
            .grant_summary_access(REVIEWER, period_id)
            .await
            .unwrap();
        let summary = h.ledger.summary_handles(REVIEWER, period_id).await.unwrap();
        let expected = [75, 121, 36, 91, 98];
        for field in Field::ALL {
            let handle = summary.average(field).unwrap();
            assert_eq!(
                h.decrypt_as(handle, REVIEWER).await.unwrap(),
                expected[field.index()]
            );
        }
    }

    /// Zero reporters: finalized synchronously, event still fires.
    #[tokio::test]
    async fn test_empty_period() {
        let h = LedgerHarness::default_roles().await;
        let mut events = h.bus.subscribe();
        let period_id = h.ledger.start_period(OWNER).await.unwrap();
        h.expire_period();

        assert_eq!(
            h.ledger.request_summary(REVIEWER).await.unwrap(),
            SummaryRequestOutcome::FinalizedEmpty
        );
        assert!(h.runtime.queued_requests().is_empty());
        assert_eq!(h.ledger.pending_request(period_id).await, None);

        let mut saw_finalized = false;
        while let Ok(event) = events.try_recv() {
            if event
                == (LedgerEvent::SummaryFinalized {
                    period_id,
                    reporter_count: 0,
                })
            {
                saw_finalized = true;
            }
        }
        assert!(saw_finalized);

        // A fresh period can start right away.
        assert_eq!(h.ledger.start_period(OWNER).await.unwrap(), period_id + 1);
    }

    // =============================================================================
    // PERIOD TIMING
    // =============================================================================

    #[tokio::test]
    async fn test_activity_window() {
        let h = LedgerHarness::default_roles().await;
        assert!(!h.ledger.is_active().await);

        h.ledger.start_period(OWNER).await.unwrap();
        assert!(h.ledger.is_active().await);
        assert_eq!(h.ledger.time_remaining().await, 60);

        h.clock.advance(59);
        assert!(h.ledger.is_active().await);
        assert_eq!(h.ledger.time_remaining().await, 1);

        h.clock.advance(1);
        assert!(!h.ledger.is_active().await);
        assert_eq!(h.ledger.time_remaining().await, 0);
        let info = h.ledger.current_period_info().await.unwrap();
        assert!(info.active);
        assert_eq!(info.end, GENESIS + 60);
    }

    /// Restart after expiry: new id, empty roster, everyone unsubmitted.
    #[tokio::test]
    async fn test_restart_after_expiry() {
        let h = LedgerHarness::default_roles().await;
        h.ledger.start_period(OWNER).await.unwrap();
        h.submit_all(&READINGS[..2]).await;
        assert!(h.ledger.report_status(REPORTERS[0]).await.submitted);

        h.expire_period();
        let second = h.ledger.start_period(OWNER).await.unwrap();
        assert_eq!(second, 2);
        assert_eq!(h.ledger.current_period_info().await.unwrap().reporter_count, 0);
        for reporter in REPORTERS {
            let status = h.ledger.report_status(reporter).await;
            assert!(!status.submitted);
            assert_eq!(status.timestamp, 0);
        }

        // Reporters may submit again in the new period.
        h.ledger.submit(REPORTERS[0], READINGS[0]).await.unwrap();
        let first = h.ledger.read_period_history(REVIEWER, 1).await.unwrap();
        assert_eq!(first.reporter_count, 2);
        assert!(!first.finalized);
    }

    /// Consecutive aggregated periods keep independent summaries.
    #[tokio::test]
    async fn test_consecutive_periods() {
        let h = LedgerHarness::default_roles().await;

        for (round, scale) in [(1u64, 1u64), (2, 2)] {
            let period_id = h.ledger.start_period(OWNER).await.unwrap();
            assert_eq!(period_id, round);
            let scaled: Vec<[u64; 5]> = READINGS
                .iter()
                .map(|r| r.map(|v| v * scale))
                .collect();
            h.submit_all(&scaled).await;
            h.expire_period();
            let request_id = h.request_pending().await;
            let response = h.oracle_answer(request_id);
            h.deliver(response).await.unwrap();
        }

        for (period_id, expected) in [(1, 75), (2, 150)] {
            h.ledger
                .grant_summary_access(REVIEWER, period_id)
                .await
                .unwrap();
            let summary = h.ledger.summary_handles(REVIEWER, period_id).await.unwrap();
            let handle = summary.average(Field::Metric1).unwrap();
            assert_eq!(h.decrypt_as(handle, REVIEWER).await.unwrap(), expected);
        }
    }

    // =============================================================================
    // READ-BACK AND EMERGENCY ACCESS
    // =============================================================================

    #[tokio::test]
    async fn test_reporter_reads_back_own_values() {
        let h = LedgerHarness::default_roles().await;
        let period_id = h.ledger.start_period(OWNER).await.unwrap();
        h.submit_all(&READINGS).await;

        let own = h
            .ledger
            .reading_handles(REPORTERS[1], period_id, REPORTERS[1])
            .await
            .unwrap();
        for (handle, value) in own.iter().zip(READINGS[1]) {
            assert_eq!(h.decrypt_as(*handle, REPORTERS[1]).await.unwrap(), value);
        }

        assert!(matches!(
            h.ledger
                .reading_handles(REPORTERS[0], period_id, REPORTERS[1])
                .await,
            Err(LedgerError::NoCapability)
        ));
        assert!(matches!(
            h.decrypt_as(own[0], REPORTERS[0]).await,
            Err(LedgerError::NoCapability)
        ));
    }

    #[tokio::test]
    async fn test_emergency_access_opens_one_reading() {
        let h = LedgerHarness::default_roles().await;
        let period_id = h.ledger.start_period(OWNER).await.unwrap();
        h.submit_all(&READINGS[..2]).await;

        assert!(matches!(
            h.ledger
                .grant_emergency_access(REVIEWER, REPORTERS[2], period_id)
                .await,
            Err(LedgerError::NoData(_))
        ));

        h.ledger
            .grant_emergency_access(REVIEWER, REPORTERS[0], period_id)
            .await
            .unwrap();
        let handles = h
            .ledger
            .reading_handles(REVIEWER, period_id, REPORTERS[0])
            .await
            .unwrap();
        for (handle, value) in handles.iter().zip(READINGS[0]) {
            assert!(h.ledger.has_capability(*handle, REVIEWER).await);
            assert_eq!(h.decrypt_as(*handle, REVIEWER).await.unwrap(), value);
        }

        // Only the named reporter's reading is opened up.
        assert!(matches!(
            h.ledger
                .reading_handles(REVIEWER, period_id, REPORTERS[1])
                .await,
            Err(LedgerError::NoCapability)
        ));

        // The grant outlives the period.
        h.expire_period();
        h.ledger.start_period(OWNER).await.unwrap();
        assert!(h.ledger.has_capability(handles[0], REVIEWER).await);
    }

    // =============================================================================
    // EVENTS AND AUTHORIZATION
    // =============================================================================

    #[tokio::test]
    async fn test_event_sequence() {
        let h = LedgerHarness::default_roles().await;
        let mut events = h.bus.subscribe();

        let period_id = h.ledger.start_period(OWNER).await.unwrap();
        h.ledger
            .submit(REPORTERS[0], [130, 150, 0, 150, 0])
            .await
            .unwrap();
        h.expire_period();
        let request_id = h.request_pending().await;
        let response = h.oracle_answer(request_id);
        h.deliver(response).await.unwrap();

        let mut names = Vec::new();
        while let Ok(event) = timeout(Duration::from_millis(50), events.recv()).await {
            let event = event.unwrap();
            assert_eq!(event.period_id(), Some(period_id));
            names.push(event.name());
        }
        assert_eq!(
            names,
            vec![
                "period_started",
                "reading_submitted",
                "alert_raised",
                "alert_raised",
                "alert_raised",
                "summary_requested",
                "summary_finalized",
            ]
        );
    }

    #[tokio::test]
    async fn test_authorization_is_idempotent() {
        let h = LedgerHarness::default_roles().await;
        let published = h.bus.events_published();

        h.ledger
            .authorize_reporter(OWNER, REPORTERS[0])
            .await
            .unwrap();
        h.ledger.authorize_reviewer(OWNER, REVIEWER).await.unwrap();
        assert_eq!(h.bus.events_published(), published);
        assert!(h.ledger.is_reporter(REPORTERS[0]).await);
        assert!(h.ledger.is_reviewer(REVIEWER).await);

        assert!(matches!(
            h.ledger.authorize_reporter(REVIEWER, [0x77; 20]).await,
            Err(LedgerError::NotOwner)
        ));
        assert!(!h.ledger.is_reporter([0x77; 20]).await);
    }

    // =============================================================================
    // SNAPSHOT
    // =============================================================================

    /// A restored ledger completes an aggregation requested before export.
    #[tokio::test]
    async fn test_snapshot_resumes_pending_aggregation() {
        let h = LedgerHarness::default_roles().await;
        let period_id = h.ledger.start_period(OWNER).await.unwrap();
        h.submit_all(&READINGS).await;
        h.expire_period();
        let request_id = h.request_pending().await;

        let bytes = h.ledger.export_state().await.unwrap();
        let restored = LedgerService::from_snapshot(&bytes, h.ports()).unwrap();
        assert_eq!(restored.config(), h.ledger.config());
        assert_eq!(restored.pending_request(period_id).await, Some(request_id));
        assert!(matches!(
            restored.start_period(OWNER).await,
            Err(LedgerError::AggregationPending { .. })
        ));

        let response = h.oracle_answer(request_id);
        restored
            .on_decrypted(response.request_id, response.plaintexts, response.proof)
            .await
            .unwrap();
        let history = restored
            .read_period_history(REVIEWER, period_id)
            .await
            .unwrap();
        assert!(history.finalized);
        assert_eq!(history.reporter_count, 3);
    }
}
