//! Poll loop — fetch → diff → alert → log → sleep, one cycle at a time.
//!
//! A cycle runs to completion before the next begins; the sleep is the
//! only suspension point, so the state store has exactly one writer
//! and no locking. Fetch failures are logged and survived: the state
//! store keeps the last good snapshot and the next tick retries.

pub mod catalog;
pub mod diff;
pub mod snapshot;

use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tracing::debug;

use crate::api::Fetcher;
use crate::notify::{self, Notifier};
use crate::report::CycleReporter;
use catalog::RegionCatalog;
use snapshot::Snapshot;

/// Everything that lives for exactly one monitoring run: the last good
/// snapshot and the set of regions already seen. Owned by the poll
/// loop, reset only by process restart.
pub struct RunState {
    previous: Option<Snapshot>,
    catalog: RegionCatalog,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            previous: None,
            catalog: RegionCatalog::with_baseline(),
        }
    }

    pub fn previous(&self) -> Option<&Snapshot> {
        self.previous.as_ref()
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

/// The monitoring engine: drives poll cycles against an injected
/// fetcher and notifier.
pub struct Monitor {
    fetcher: Arc<dyn Fetcher>,
    notifier: Arc<dyn Notifier>,
    reporter: CycleReporter,
    state: RunState,
}

impl Monitor {
    pub fn new(fetcher: Arc<dyn Fetcher>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            fetcher,
            notifier,
            reporter: CycleReporter::new(),
            state: RunState::new(),
        }
    }

    /// Run one poll cycle. On success the state store is overwritten
    /// with the fresh snapshot; on fetch failure it is left untouched
    /// so the next cycle diffs against the last good snapshot.
    pub async fn poll_once(&mut self) {
        match self.fetcher.fetch().await {
            Ok(current) => {
                let events =
                    diff::diff(self.state.previous.as_ref(), &current, &mut self.state.catalog);
                notify::dispatch(self.notifier.as_ref(), &events).await;
                self.reporter.record_cycle(&current, &events);
                self.state.previous = Some(current);
            }
            Err(e) => {
                self.reporter.record_failure(&e);
            }
        }
    }

    /// Poll forever at the given (already floor-clamped) interval.
    /// Cancellation comes from outside: the caller selects between
    /// this future and the shutdown signal, so a ctrl-c lands either
    /// during the sleep or before the next fetch.
    pub async fn run(&mut self, poll_delay: Duration) {
        loop {
            self.poll_once().await;
            debug!(delay_ms = poll_delay.as_millis() as u64, "Sleeping until next poll");
            time::sleep(poll_delay).await;
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &RunState {
        &self.state
    }
}
