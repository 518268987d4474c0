//! Poll loop — fetch a snapshot, reconcile, deliver alerts, sleep.
//!
//! One task owns the store for the lifetime of the process. A failed fetch
//! skips the cycle without touching the store; a failed delivery is logged
//! and dropped.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, info, warn};

use flightwatch_core::{reconcile_detailed, Region, Result, Store};

use crate::notification::Notifier;
use crate::provider::FlightProvider;

/// Summary of one completed reconciliation cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub flights_observed: usize,
    pub alerts: usize,
    pub deliveries_failed: usize,
}

pub struct Watcher<P, N> {
    store: Store,
    region: Region,
    destinations: Vec<String>,
    provider: P,
    notifier: N,
}

impl<P: FlightProvider, N: Notifier> Watcher<P, N> {
    pub fn new(
        store: Store,
        region: Region,
        destinations: Vec<String>,
        provider: P,
        notifier: N,
    ) -> Self {
        Watcher {
            store,
            region,
            destinations,
            provider,
            notifier,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Run a single fetch → reconcile → deliver pass.
    ///
    /// Returns the provider error if the snapshot could not be fetched; the
    /// store is untouched in that case.
    pub async fn run_cycle(&mut self) -> Result<CycleReport> {
        let flights = self.provider.query_flights(&self.region).await?;

        let outcome = reconcile_detailed(&mut self.store, &flights);
        for callsign in &outcome.still_present {
            debug!(callsign = %callsign, "still in region");
        }

        let events = outcome.events;
        let mut report = CycleReport {
            flights_observed: flights.len(),
            alerts: events.len(),
            deliveries_failed: 0,
        };

        for event in &events {
            info!(
                callsign = %event.callsign,
                kind = event.kind.as_str(),
                "{}",
                event.message
            );
            let outcomes = self.notifier.deliver(&event.message, &self.destinations).await;
            for err in outcomes.into_iter().filter_map(|o| o.err()) {
                warn!(error = %err, "alert delivery failed");
                report.deliveries_failed += 1;
            }
        }

        Ok(report)
    }

    /// Poll forever, sleeping `interval` between cycles. Returns on Ctrl-C.
    pub async fn run(&mut self, interval: Duration) {
        self.run_until(interval, tokio::signal::ctrl_c()).await
    }

    /// Poll until `shutdown` completes, whether mid-cycle or mid-sleep.
    ///
    /// `shutdown` is polled for the whole run so a signal that lands during
    /// a fetch or delivery is not lost.
    pub async fn run_until<F: Future>(&mut self, interval: Duration, shutdown: F) {
        info!(
            tracked = self.store.len(),
            destinations = self.destinations.len(),
            interval_secs = interval.as_secs(),
            "watcher started"
        );
        tokio::pin!(shutdown);

        loop {
            let result = tokio::select! {
                result = self.run_cycle() => Some(result),
                _ = &mut shutdown => None,
            };
            let Some(result) = result else {
                info!("shutdown requested, abandoning cycle");
                return;
            };
            self.log_cycle(result);

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = &mut shutdown => {
                    info!("shutdown requested");
                    return;
                }
            }
        }
    }

    fn log_cycle(&self, result: Result<CycleReport>) {
        match result {
            Ok(report) => debug!(
                flights = report.flights_observed,
                alerts = report.alerts,
                failed_deliveries = report.deliveries_failed,
                present = self.store().present_count(),
                "cycle complete"
            ),
            Err(e) => warn!(error = %e, "snapshot fetch failed, skipping cycle"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
