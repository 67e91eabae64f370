//! Beacon delivery for the simulator.
//!
//! Mirrors the browser primitive: `dispatch` returns as soon as the body is
//! queued and never reports whether it arrived.

use std::sync::Arc;
use std::time::Duration;

use picolytics_core::{Endpoint, PicolyticsError, PicolyticsResult};
use tracing::{debug, warn};

/// Fire-and-forget delivery of one beacon body.
pub trait BeaconTransport: Send + Sync {
    /// Returns whether the body was accepted for delivery.
    fn dispatch(&self, endpoint: &Endpoint, body: String) -> bool;
}

/// Content type browsers attach to a string `sendBeacon` body.
pub const BEACON_CONTENT_TYPE: &str = "text/plain;charset=UTF-8";

/// POSTs each body from a detached task on the current tokio runtime.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> PicolyticsResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PicolyticsError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

impl BeaconTransport for HttpTransport {
    fn dispatch(&self, endpoint: &Endpoint, body: String) -> bool {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("no runtime available, beacon dropped");
            return false;
        };

        let request = self
            .client
            .post(endpoint.as_str())
            .header(reqwest::header::CONTENT_TYPE, BEACON_CONTENT_TYPE)
            .body(body);
        let endpoint = endpoint.clone();

        runtime.spawn(async move {
            match request.send().await {
                Ok(response) => {
                    debug!(endpoint = %endpoint, status = %response.status(), "beacon delivered");
                }
                Err(e) => {
                    warn!(endpoint = %endpoint, error = %e, "beacon delivery failed");
                }
            }
        });
        true
    }
}

/// Prints each body as one NDJSON line instead of sending it.
pub struct StdoutTransport;

impl BeaconTransport for StdoutTransport {
    fn dispatch(&self, _endpoint: &Endpoint, body: String) -> bool {
        println!("{body}");
        true
    }
}

pub fn http_transport(timeout: Duration) -> PicolyticsResult<Arc<dyn BeaconTransport>> {
    Ok(Arc::new(HttpTransport::new(timeout)?))
}

pub fn stdout_transport() -> Arc<dyn BeaconTransport> {
    Arc::new(StdoutTransport)
}

#[cfg(test)]
pub(crate) mod testing {
    use parking_lot::Mutex;

    use super::*;

    /// Records every body it is handed.
    #[derive(Default)]
    pub struct RecordingTransport {
        bodies: Mutex<Vec<String>>,
    }

    impl RecordingTransport {
        pub fn bodies(&self) -> Vec<String> {
            self.bodies.lock().clone()
        }
    }

    impl BeaconTransport for RecordingTransport {
        fn dispatch(&self, _endpoint: &Endpoint, body: String) -> bool {
            self.bodies.lock().push(body);
            true
        }
    }
}
