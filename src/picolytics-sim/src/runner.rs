//! Session runner — drives one simulated page through load, pings, and the
//! scripted steps until the session deadline.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use picolytics_beacon::{BeaconContext, BeaconHost, Lifecycle, SendOutcome, Signal};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::host::SimHost;
use crate::scenario::Step;

/// Per-outcome counts for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub queued: u64,
    pub rejected: u64,
    pub suppressed: u64,
    pub unserializable: u64,
    pub pings: u64,
}

impl RunSummary {
    fn record(&mut self, outcome: SendOutcome) {
        match outcome {
            SendOutcome::Queued => self.queued += 1,
            SendOutcome::Rejected => self.rejected += 1,
            SendOutcome::Suppressed(_) => self.suppressed += 1,
            SendOutcome::Unserializable => self.unserializable += 1,
        }
    }
}

pub struct SessionRunner {
    host: Arc<SimHost>,
    lifecycle: Lifecycle,
    steps: VecDeque<Step>,
    step_interval: Duration,
    duration: Duration,
}

impl SessionRunner {
    pub fn new(
        host: Arc<SimHost>,
        context: BeaconContext,
        steps: Vec<Step>,
        step_interval: Duration,
        duration: Duration,
    ) -> Self {
        let lifecycle = Lifecycle::new(context, host.visibility_state());
        Self {
            host,
            lifecycle,
            steps: steps.into(),
            step_interval,
            duration,
        }
    }

    pub async fn run(mut self) -> RunSummary {
        let start = Instant::now();
        let deadline = tokio::time::sleep(self.duration);
        tokio::pin!(deadline);

        let mut summary = RunSummary::default();
        let mut pings: Option<Interval> = None;
        let step_period = self.step_interval.max(Duration::from_millis(1));
        let mut step_timer = interval_at(start + step_period, step_period);

        let load = self.lifecycle.dispatch(&*self.host, Signal::Load);
        summary.record(load.outcome);
        if let Some(period) = load.arm_ping {
            pings = Some(ping_timer(period));
        }

        loop {
            tokio::select! {
                biased;

                _ = &mut deadline => break,
                _ = next_tick(&mut pings) => {
                    summary.pings += 1;
                    let dispatch = self.lifecycle.dispatch(&*self.host, Signal::Ping);
                    summary.record(dispatch.outcome);
                }
                _ = step_timer.tick(), if !self.steps.is_empty() => {
                    let Some(step) = self.steps.pop_front() else { continue };
                    debug!(?step, "applying step");
                    if let Some(signal) = step.apply(&self.host) {
                        let dispatch = self.lifecycle.dispatch(&*self.host, signal);
                        summary.record(dispatch.outcome);
                    }
                }
            }
        }

        info!(
            queued = summary.queued,
            rejected = summary.rejected,
            suppressed = summary.suppressed,
            unserializable = summary.unserializable,
            pings = summary.pings,
            dispatched = self.host.dispatched(),
            final_url = %self.host.page().href,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "session finished"
        );
        summary
    }
}

/// Recurring ping timer; the first tick lands one period after arming.
fn ping_timer(period: Duration) -> Interval {
    let period = period.max(Duration::from_millis(1));
    let mut timer = interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}

async fn next_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
