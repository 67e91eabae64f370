//! In-memory host that records every beacon instead of sending it.

use parking_lot::Mutex;
use picolytics_core::{DoNotTrack, Endpoint, NavigationTiming, PageEvent, ScreenInfo, VisibilityState};

use crate::host::{BeaconHost, PageState};

/// A beacon the host accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedBeacon {
    pub endpoint: String,
    pub body: String,
}

/// Host backed by a mutable [`PageState`], capturing beacons for assertions.
pub struct CaptureHost {
    page: Mutex<PageState>,
    beacons: Mutex<Vec<CapturedBeacon>>,
    accept: bool,
}

impl CaptureHost {
    pub fn new(href: impl Into<String>) -> Self {
        Self::from_page(PageState::new(href))
    }

    pub fn from_page(page: PageState) -> Self {
        Self {
            page: Mutex::new(page),
            beacons: Mutex::new(Vec::new()),
            accept: true,
        }
    }

    /// A host whose beacon primitive refuses every payload.
    pub fn rejecting(href: impl Into<String>) -> Self {
        Self {
            accept: false,
            ..Self::new(href)
        }
    }

    pub fn update(&self, f: impl FnOnce(&mut PageState)) {
        f(&mut *self.page.lock());
    }

    pub fn page(&self) -> PageState {
        self.page.lock().clone()
    }

    pub fn set_visibility(&self, visibility: VisibilityState) {
        self.page.lock().visibility = visibility;
    }

    pub fn set_do_not_track(&self, dnt: DoNotTrack) {
        self.page.lock().do_not_track = dnt;
    }

    pub fn set_fragment(&self, fragment: &str) {
        self.page.lock().set_fragment(fragment);
    }

    pub fn beacons(&self) -> Vec<CapturedBeacon> {
        self.beacons.lock().clone()
    }

    /// Captured bodies decoded back into events. Bodies that fail to decode
    /// are skipped.
    pub fn events(&self) -> Vec<PageEvent> {
        self.beacons
            .lock()
            .iter()
            .filter_map(|b| PageEvent::from_wire(&b.body).ok())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.beacons.lock().len()
    }

    pub fn count_named(&self, name: &str) -> usize {
        self.events().iter().filter(|e| e.name == name).count()
    }

    pub fn clear(&self) {
        self.beacons.lock().clear();
    }
}

impl BeaconHost for CaptureHost {
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
        if !self.accept {
            return false;
        }
        self.beacons.lock().push(CapturedBeacon {
            endpoint: endpoint.to_string(),
            body,
        });
        true
    }
}
