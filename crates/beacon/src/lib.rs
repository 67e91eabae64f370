//! Picolytics beacon — reports page views and engagement to the collection
//! endpoint that served the script.
//!
//! # Modules
//!
//! - [`host`] — Capabilities the beacon consumes from its environment
//! - [`context`] — Endpoint resolution at script load
//! - [`emitter`] — Builds, gates, and transmits one event
//! - [`trigger`] — Browser signals the beacon listens to
//! - [`lifecycle`] — Load/ping state machine driving the emitter
//! - [`capture`] — In-memory host for tests and simulations
//! - `web` — `wasm32` binding over `web-sys` (browser builds only)

pub mod capture;
pub mod context;
pub mod emitter;
pub mod host;
pub mod lifecycle;
pub mod trigger;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use capture::CaptureHost;
pub use context::BeaconContext;
pub use emitter::{BeaconEmitter, SendOutcome, SuppressReason};
pub use host::{BeaconHost, PageState};
pub use lifecycle::{Dispatch, Lifecycle, LifecycleState};
pub use trigger::{Signal, Trigger};
