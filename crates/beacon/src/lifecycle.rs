//! Page lifecycle — routes signals to the emitter and arms the ping timer
//! exactly once, on the first load.
//!
//! The lifecycle never owns a timer itself. When load arms it, the
//! [`Dispatch`] tells the caller to start one; the caller feeds
//! [`Signal::Ping`] back on every tick for the rest of the page's life.

use std::time::Duration;

use picolytics_core::VisibilityState;
use tracing::info;

use crate::context::BeaconContext;
use crate::emitter::{BeaconEmitter, SendOutcome};
use crate::host::BeaconHost;
use crate::trigger::Signal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    /// Ping timer running. Terminal.
    Armed,
}

/// Result of dispatching one signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    pub outcome: SendOutcome,
    /// Set on the single transition to [`LifecycleState::Armed`]: start a
    /// recurring timer with this period.
    pub arm_ping: Option<Duration>,
}

pub struct Lifecycle {
    emitter: BeaconEmitter,
    state: LifecycleState,
    last_visibility: VisibilityState,
}

impl Lifecycle {
    pub fn new(context: BeaconContext, initial_visibility: VisibilityState) -> Self {
        Self {
            emitter: BeaconEmitter::new(context),
            state: LifecycleState::Uninitialized,
            last_visibility: initial_visibility,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn emitter(&self) -> &BeaconEmitter {
        &self.emitter
    }

    pub fn dispatch<H: BeaconHost + ?Sized>(&mut self, host: &H, signal: Signal) -> Dispatch {
        let outcome = match &signal {
            Signal::VisibilityChange(current) => {
                let previous = std::mem::replace(&mut self.last_visibility, *current);
                self.emitter.send_visibility_change(host, previous, *current)
            }
            other => self.emitter.send_metrics(host, other.event_name()),
        };

        let arm_ping = match (&signal, self.state) {
            (Signal::Load, LifecycleState::Uninitialized) => {
                self.state = LifecycleState::Armed;
                let period = self.emitter.context().ping_interval();
                info!(
                    period_ms = period.as_millis() as u64,
                    endpoint = %self.emitter.context().endpoint(),
                    "beacon armed"
                );
                Some(period)
            }
            _ => None,
        };

        Dispatch { outcome, arm_ping }
    }
}
