//! Daily overdue-loan sweep.
//!
//! The sweep runs on its own tokio task, once per calendar day at a fixed
//! wall-clock time (UTC). Each run looks up overdue loans and sends one
//! broadcast notification to their borrowers. Failures are logged and not
//! retried; the next daily run is the only recovery.
//!
//! Runs never overlap: the loop awaits each sweep before computing the next
//! trigger, so a slow sweep delays the following one instead.

use chrono::{DateTime, Days, NaiveTime, Utc};
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::application::{
    ServiceDependencies,
    loan::{OverdueNotice, SweepReport, notify_overdue_loans},
};

/// Scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepState {
    Idle,
    Running,
}

/// Next trigger strictly after `after` at time-of-day `run_at`.
pub fn next_run_after(after: DateTime<Utc>, run_at: NaiveTime) -> DateTime<Utc> {
    let today = after.date_naive().and_time(run_at).and_utc();
    if today > after {
        return today;
    }

    let tomorrow = after
        .date_naive()
        .checked_add_days(Days::new(1))
        .unwrap_or(after.date_naive());
    tomorrow.and_time(run_at).and_utc()
}

/// Background job notifying borrowers of overdue loans.
pub struct OverdueSweepScheduler {
    deps: ServiceDependencies,
    run_at: NaiveTime,
    threshold_days: u32,
    notice: OverdueNotice,
    state: watch::Sender<SweepState>,
}

impl OverdueSweepScheduler {
    pub fn new(
        deps: ServiceDependencies,
        run_at: NaiveTime,
        threshold_days: u32,
        notice: OverdueNotice,
    ) -> Self {
        let (state, _) = watch::channel(SweepState::Idle);
        Self {
            deps,
            run_at,
            threshold_days,
            notice,
            state,
        }
    }

    /// Current state.
    pub fn state(&self) -> SweepState {
        *self.state.borrow()
    }

    /// Run one sweep for `today`.
    ///
    /// Returns `None` when the sweep failed; the error is logged.
    pub async fn run_once(&self, today: chrono::NaiveDate) -> Option<SweepReport> {
        self.state.send_replace(SweepState::Running);
        debug!(%today, threshold_days = self.threshold_days, "Starting overdue sweep");

        let result =
            notify_overdue_loans(&self.deps, self.threshold_days, today, &self.notice).await;

        self.state.send_replace(SweepState::Idle);

        match result {
            Ok(report) => {
                info!(
                    overdue = report.overdue,
                    notified = report.notified,
                    "Overdue sweep finished"
                );
                Some(report)
            }
            Err(e) => {
                error!(error = %e, source = ?std::error::Error::source(&e), "Overdue sweep failed");
                None
            }
        }
    }

    /// Start the scheduler background task.
    ///
    /// The task exits when `shutdown` changes or its sender is dropped.
    pub fn start(self, mut shutdown: watch::Receiver<bool>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut next = next_run_after(Utc::now(), self.run_at);
            info!(next_run = %next, "Overdue sweep scheduled");

            loop {
                let wait = (next - Utc::now()).to_std().unwrap_or_default();

                tokio::select! {
                    _ = tokio::time::sleep(wait) => {
                        self.run_once(next.date_naive()).await;
                        next = next_run_after(next.max(Utc::now()), self.run_at);
                        debug!(next_run = %next, "Next overdue sweep scheduled");
                    }
                    _ = shutdown.changed() => {
                        info!("Overdue sweep scheduler stopped");
                        break;
                    }
                }
            }
        })
    }
}
