//! Simulated page: an in-memory [`PageState`] plus a delivery transport.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use picolytics_beacon::{BeaconHost, PageState};
use picolytics_core::config::PageConfig;
use picolytics_core::{DoNotTrack, Endpoint, NavigationTiming, ScreenInfo, VisibilityState};

use crate::transport::BeaconTransport;

/// Milliseconds since the epoch the simulated navigation started at.
const NAVIGATION_START_MS: f64 = 1_700_000_000_000.0;

pub struct SimHost {
    page: Mutex<PageState>,
    transport: Arc<dyn BeaconTransport>,
    dispatched: AtomicU64,
}

impl SimHost {
    pub fn new(page: PageState, transport: Arc<dyn BeaconTransport>) -> Self {
        Self {
            page: Mutex::new(page),
            transport,
            dispatched: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &PageConfig, transport: Arc<dyn BeaconTransport>) -> Self {
        Self::new(page_from_config(config), transport)
    }

    pub fn update(&self, f: impl FnOnce(&mut PageState)) {
        f(&mut *self.page.lock());
    }

    pub fn page(&self) -> PageState {
        self.page.lock().clone()
    }

    /// Bodies handed to the transport so far.
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }
}

/// Build the simulated page. Timing milestones are laid out from a fixed
/// navigation start so the reported deltas match the configured values.
pub fn page_from_config(config: &PageConfig) -> PageState {
    let mut page = PageState::new(config.url.clone());
    page.referrer = config.referrer.clone();
    page.visibility = if config.start_hidden {
        VisibilityState::Hidden
    } else {
        VisibilityState::Visible
    };
    page.do_not_track = DoNotTrack::from_signal(config.do_not_track.as_deref());
    page.timing = NavigationTiming {
        navigation_start: NAVIGATION_START_MS,
        response_start: NAVIGATION_START_MS + config.first_byte_ms as f64,
        load_event_end: NAVIGATION_START_MS + config.load_time_ms as f64,
    };
    page.screen = ScreenInfo {
        width: Some(config.screen_width),
        height: Some(config.screen_height),
        pixel_ratio: Some(config.pixel_ratio),
        pixel_depth: Some(config.pixel_depth),
    };
    page.timezone = Some(config.timezone.clone()).filter(|tz| !tz.is_empty());
    page
}

impl BeaconHost for SimHost {
    fn visibility_state(&self) -> VisibilityState {
        self.page.lock().visibility
    }

    fn do_not_track(&self) -> DoNotTrack {
        self.page.lock().do_not_track
    }

    fn navigation_timing(&self) -> NavigationTiming {
        self.page.lock().timing
    }

    fn location_href(&self) -> String {
        self.page.lock().href.clone()
    }

    fn referrer(&self) -> String {
        self.page.lock().referrer.clone()
    }

    fn screen(&self) -> ScreenInfo {
        self.page.lock().screen
    }

    fn timezone(&self) -> Option<String> {
        self.page.lock().timezone.clone()
    }

    fn send_beacon(&self, endpoint: &Endpoint, body: String) -> bool {
        let accepted = self.transport.dispatch(endpoint, body);
        if accepted {
            self.dispatched.fetch_add(1, Ordering::Relaxed);
        }
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::testing::RecordingTransport;

    #[test]
    fn test_page_from_config() {
        let config = PageConfig {
            url: "https://shop.example.com/".into(),
            referrer: "https://search.example.org/".into(),
            do_not_track: Some("1".into()),
            start_hidden: true,
            first_byte_ms: 120,
            load_time_ms: 900,
            ..Default::default()
        };
        let page = page_from_config(&config);
        assert_eq!(page.href, "https://shop.example.com/");
        assert_eq!(page.visibility, VisibilityState::Hidden);
        assert!(page.do_not_track.is_enabled());
        assert_eq!(page.timing.first_byte_ms(), 120);
        assert_eq!(page.timing.load_time_ms(), 900);
        assert_eq!(page.screen.width, Some(1920));
        assert_eq!(page.timezone.as_deref(), Some("UTC"));
    }

    #[test]
    fn test_send_counts_dispatched() {
        let transport = Arc::new(RecordingTransport::default());
        let host = SimHost::new(PageState::new("https://example.com/"), transport.clone());
        let endpoint = Endpoint::from_script_src("https://a.example.com/pico.js");

        assert!(host.send_beacon(&endpoint, "{}".into()));
        assert_eq!(host.dispatched(), 1);
        assert_eq!(transport.bodies(), vec!["{}".to_string()]);
    }
}
