//! Emit context resolved once when the script loads.

use std::time::Duration;

use picolytics_core::{BeaconOptions, Endpoint};
use tracing::{debug, warn};

/// Resolved endpoint plus options, passed to the emitter instead of living
/// in module-level state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeaconContext {
    endpoint: Endpoint,
    options: BeaconOptions,
}

impl BeaconContext {
    /// Resolve the context from the executing script's source URL.
    pub fn initialize(script_src: &str) -> Self {
        Self::with_options(script_src, BeaconOptions::default())
    }

    pub fn with_options(script_src: &str, options: BeaconOptions) -> Self {
        let endpoint = Endpoint::from_script_src(script_src);
        if endpoint.is_valid() {
            debug!(endpoint = %endpoint, "beacon endpoint resolved");
        } else {
            // Still used: delivery to it fails silently at the network layer.
            warn!(script_src, endpoint = %endpoint, "beacon endpoint is not a valid URL");
        }
        Self { endpoint, options }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn options(&self) -> &BeaconOptions {
        &self.options
    }

    pub fn ping_interval(&self) -> Duration {
        self.options.ping_interval()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_uses_defaults() {
        let ctx = BeaconContext::initialize("https://analytics.example.com:9999/static/picolytics.js");
        assert_eq!(ctx.endpoint().as_str(), "https://analytics.example.com:9999/p");
        assert_eq!(ctx.ping_interval(), Duration::from_millis(5000));
        assert!(ctx.options().capture_utm);
    }

    #[test]
    fn test_malformed_source_still_builds_context() {
        let ctx = BeaconContext::initialize("");
        assert_eq!(ctx.endpoint().as_str(), "///p");
    }

    #[test]
    fn test_custom_options() {
        let ctx = BeaconContext::with_options(
            "http://localhost:8080/pico.js",
            BeaconOptions {
                ping_interval_ms: 250,
                capture_utm: false,
            },
        );
        assert_eq!(ctx.ping_interval(), Duration::from_millis(250));
        assert!(!ctx.options().capture_utm);
    }
}
