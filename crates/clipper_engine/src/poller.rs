//! Post-upload polling loop.
//!
//! Cycles are strictly sequential: the next fetch is scheduled only after the
//! previous response has been processed, so at most one status request per job
//! is ever in flight. The cancellation token is checked before every
//! suspension point.

use std::time::Duration;

use clipper_core::{estimate, DisplayedHighlightSet, JobId, Percent, PhaseVocabulary};
use clipper_logging::{clipper_debug, clipper_info, clipper_warn};
use tokio_util::sync::CancellationToken;

use crate::{ClientSettings, PollError, StatusSource};

/// Callbacks of one polling run.
pub trait PollObserver: Send + Sync {
    fn on_update(&self, label: &str, percent: Percent);
    fn on_highlights_changed(&self, highlights: &[String]);
    fn on_complete(&self);
    fn on_poll_failed(&self, error: &PollError);
}

#[derive(Debug, Clone)]
pub struct PollSettings {
    pub interval: Duration,
    /// Consecutive failed fetches tolerated before giving up. Zero behaves as one.
    pub max_consecutive_failures: u32,
    pub vocabulary: PhaseVocabulary,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self::from(&ClientSettings::default())
    }
}

impl From<&ClientSettings> for PollSettings {
    fn from(settings: &ClientSettings) -> Self {
        Self {
            interval: settings.poll_interval,
            max_consecutive_failures: settings.max_consecutive_poll_failures,
            vocabulary: settings.vocabulary.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Terminal sentinel observed after `cycles` fetch attempts.
    Completed { cycles: u32 },
    Failed(PollError),
    Cancelled,
}

pub struct JobStatusPoller<'a> {
    source: &'a dyn StatusSource,
    settings: PollSettings,
}

impl<'a> JobStatusPoller<'a> {
    pub fn new(source: &'a dyn StatusSource, settings: PollSettings) -> Self {
        Self { source, settings }
    }

    pub async fn run(
        &self,
        job_id: &JobId,
        observer: &dyn PollObserver,
        cancel: &CancellationToken,
    ) -> PollOutcome {
        let max_failures = self.settings.max_consecutive_failures.max(1);
        // A new job never inherits an earlier job's snapshot.
        let mut displayed = DisplayedHighlightSet::new();
        let mut cycles = 0u32;
        let mut failures = 0u32;

        loop {
            let fetched = tokio::select! {
                biased;
                _ = cancel.cancelled() => return self.cancelled(job_id),
                fetched = self.source.fetch_status(job_id) => fetched,
            };
            cycles += 1;

            match fetched {
                Ok(status) => {
                    failures = 0;
                    let current = estimate(&status, &self.settings.vocabulary);
                    clipper_debug!(
                        "Poll cycle={} job_id={} step={:?} percent={:?}",
                        cycles,
                        job_id,
                        status.step,
                        current.percent
                    );
                    observer.on_update(&current.label, current.percent);

                    if displayed.reconcile(&status.highlights) {
                        observer.on_highlights_changed(displayed.last_known());
                    }

                    // Only the sentinel ends the job; 100% on a sub-step does not.
                    if self.settings.vocabulary.is_terminal(&status.step) {
                        clipper_info!("Job finished job_id={} cycles={}", job_id, cycles);
                        observer.on_complete();
                        return PollOutcome::Completed { cycles };
                    }
                }
                Err(err) => {
                    failures += 1;
                    if failures >= max_failures {
                        let err = err.with_attempts(failures);
                        clipper_warn!("Giving up on job_id={}: {}", job_id, err);
                        observer.on_poll_failed(&err);
                        return PollOutcome::Failed(err);
                    }
                    clipper_warn!(
                        "Status fetch failed job_id={} attempt={}/{}: {}",
                        job_id,
                        failures,
                        max_failures,
                        err
                    );
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return self.cancelled(job_id),
                _ = tokio::time::sleep(self.settings.interval) => {}
            }
        }
    }

    fn cancelled(&self, job_id: &JobId) -> PollOutcome {
        clipper_debug!("Poller for job_id={} cancelled", job_id);
        PollOutcome::Cancelled
    }
}
