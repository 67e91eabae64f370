//! Beacon emitter — builds one [`PageEvent`] from the host, applies the
//! privacy and visibility gates, and hands the body to the host's beacon
//! primitive. Delivery is at-most-once with no retry.

use picolytics_core::{PageEvent, UtmParams, VisibilityState};
use tracing::{debug, warn};

use crate::context::BeaconContext;
use crate::host::BeaconHost;

/// Why a send was skipped. Not an error: both are deliberate no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    DoNotTrack,
    NotVisible,
}

/// What happened to one send. Browser callers ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The host accepted the body for delivery.
    Queued,
    /// The host refused the body (e.g. beacon quota exceeded).
    Rejected,
    Suppressed(SuppressReason),
    Unserializable,
}

impl SendOutcome {
    pub fn is_queued(&self) -> bool {
        matches!(self, SendOutcome::Queued)
    }
}

#[derive(Debug, Clone)]
pub struct BeaconEmitter {
    context: BeaconContext,
}

impl BeaconEmitter {
    pub fn new(context: BeaconContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &BeaconContext {
        &self.context
    }

    /// Send `event_name` unless Do-Not-Track is set or the page is not
    /// currently visible.
    pub fn send_metrics<H: BeaconHost + ?Sized>(&self, host: &H, event_name: &str) -> SendOutcome {
        let visible = host.visibility_state().is_visible();
        self.send_gated(host, event_name, visible)
    }

    /// Send a visibility transition. The page counts as visible when it was
    /// visible on either side of the change, so hiding a visible page is
    /// reported while hidden-to-hidden repeats are not.
    pub fn send_visibility_change<H: BeaconHost + ?Sized>(
        &self,
        host: &H,
        previous: VisibilityState,
        current: VisibilityState,
    ) -> SendOutcome {
        let visible = previous.is_visible() || current.is_visible();
        self.send_gated(host, current.as_str(), visible)
    }

    fn send_gated<H: BeaconHost + ?Sized>(
        &self,
        host: &H,
        event_name: &str,
        visible: bool,
    ) -> SendOutcome {
        if host.do_not_track().is_enabled() {
            debug!(event = event_name, "beacon suppressed: do-not-track");
            return SendOutcome::Suppressed(SuppressReason::DoNotTrack);
        }
        if !visible {
            debug!(event = event_name, "beacon suppressed: page not visible");
            return SendOutcome::Suppressed(SuppressReason::NotVisible);
        }

        let event = self.build_event(host, event_name);
        let body = match event.to_wire() {
            Ok(body) => body,
            Err(e) => {
                warn!(event = event_name, error = %e, "failed to serialize beacon");
                return SendOutcome::Unserializable;
            }
        };

        if host.send_beacon(self.context.endpoint(), body) {
            debug!(event = event_name, endpoint = %self.context.endpoint(), "beacon queued");
            SendOutcome::Queued
        } else {
            debug!(event = event_name, endpoint = %self.context.endpoint(), "beacon rejected by host");
            SendOutcome::Rejected
        }
    }

    /// Snapshot the host into a fresh event record.
    pub fn build_event<H: BeaconHost + ?Sized>(&self, host: &H, event_name: &str) -> PageEvent {
        let location = host.location_href();
        let timing = host.navigation_timing();
        let screen = host.screen();
        let utm = if self.context.options().capture_utm {
            UtmParams::from_page_url(&location)
        } else {
            UtmParams::default()
        };

        PageEvent {
            name: event_name.to_string(),
            referrer: host.referrer(),
            load_time_ms: timing.load_time_ms(),
            first_byte_ms: timing.first_byte_ms(),
            screen_width: screen.width,
            screen_height: screen.height,
            timezone: host.timezone().filter(|tz| !tz.is_empty()),
            pixel_ratio: screen.pixel_ratio.filter(|pr| pr.is_finite()),
            pixel_depth: screen.pixel_depth,
            location,
            utm,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::capture::CaptureHost;
    use picolytics_core::{BeaconOptions, DoNotTrack, NavigationTiming, ScreenInfo};

    fn emitter() -> BeaconEmitter {
        BeaconEmitter::new(BeaconContext::initialize(
            "https://analytics.example.com/static/picolytics.js",
        ))
    }

    #[test]
    fn test_send_builds_full_payload() {
        let host = CaptureHost::new("https://example.com/pricing");
        host.update(|page| {
            page.referrer = "https://news.example.org/".into();
            page.timing = NavigationTiming {
                navigation_start: 1000.0,
                response_start: 1060.0,
                load_event_end: 1400.0,
            };
            page.screen = ScreenInfo {
                width: Some(2560),
                height: Some(1440),
                pixel_ratio: Some(2.0),
                pixel_depth: Some(30),
            };
            page.timezone = Some("America/Chicago".into());
        });

        let outcome = emitter().send_metrics(&host, "load");
        assert_eq!(outcome, SendOutcome::Queued);

        let beacons = host.beacons();
        assert_eq!(beacons.len(), 1);
        assert_eq!(beacons[0].endpoint, "https://analytics.example.com/p");

        let event = host.events().remove(0);
        assert_eq!(event.name, "load");
        assert_eq!(event.location, "https://example.com/pricing");
        assert_eq!(event.referrer, "https://news.example.org/");
        assert_eq!(event.load_time_ms, 400);
        assert_eq!(event.first_byte_ms, 60);
        assert_eq!(event.screen_width, Some(2560));
        assert_eq!(event.screen_height, Some(1440));
        assert_eq!(event.timezone.as_deref(), Some("America/Chicago"));
        assert_eq!(event.pixel_ratio, Some(2.0));
        assert_eq!(event.pixel_depth, Some(30));
    }

    #[test]
    fn test_do_not_track_suppresses() {
        let host = CaptureHost::new("https://example.com/");
        host.update(|page| page.do_not_track = DoNotTrack::Enabled);

        let outcome = emitter().send_metrics(&host, "load");
        assert_eq!(outcome, SendOutcome::Suppressed(SuppressReason::DoNotTrack));
        assert_eq!(host.count(), 0);
    }

    #[test]
    fn test_hidden_page_suppresses() {
        let host = CaptureHost::new("https://example.com/");
        host.set_visibility(VisibilityState::Hidden);

        let outcome = emitter().send_metrics(&host, "ping");
        assert_eq!(outcome, SendOutcome::Suppressed(SuppressReason::NotVisible));
        assert_eq!(host.count(), 0);
    }

    #[test]
    fn test_do_not_track_checked_before_visibility() {
        let host = CaptureHost::new("https://example.com/");
        host.update(|page| {
            page.do_not_track = DoNotTrack::Enabled;
            page.visibility = VisibilityState::Hidden;
        });
        let outcome = emitter().send_metrics(&host, "ping");
        assert_eq!(outcome, SendOutcome::Suppressed(SuppressReason::DoNotTrack));
    }

    #[test]
    fn test_visibility_change_gate() {
        let host = CaptureHost::new("https://example.com/");
        let emitter = emitter();

        host.set_visibility(VisibilityState::Hidden);
        let hide = emitter.send_visibility_change(
            &host,
            VisibilityState::Visible,
            VisibilityState::Hidden,
        );
        assert_eq!(hide, SendOutcome::Queued);

        let repeat = emitter.send_visibility_change(
            &host,
            VisibilityState::Hidden,
            VisibilityState::Hidden,
        );
        assert_eq!(repeat, SendOutcome::Suppressed(SuppressReason::NotVisible));

        host.set_visibility(VisibilityState::Visible);
        let show = emitter.send_visibility_change(
            &host,
            VisibilityState::Hidden,
            VisibilityState::Visible,
        );
        assert_eq!(show, SendOutcome::Queued);

        let names: Vec<String> = host.events().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["hidden", "visible"]);
    }

    #[test]
    fn test_rejected_by_host() {
        let host = CaptureHost::rejecting("https://example.com/");
        assert_eq!(emitter().send_metrics(&host, "load"), SendOutcome::Rejected);
        assert_eq!(host.count(), 0);
    }

    #[test]
    fn test_utm_capture_toggle() {
        let host = CaptureHost::new("https://example.com/?utm_source=ads&utm_campaign=q3");

        let event = emitter().build_event(&host, "load");
        assert_eq!(event.utm.source.as_deref(), Some("ads"));
        assert_eq!(event.utm.campaign.as_deref(), Some("q3"));

        let no_utm = BeaconEmitter::new(BeaconContext::with_options(
            "https://analytics.example.com/picolytics.js",
            BeaconOptions {
                capture_utm: false,
                ..Default::default()
            },
        ));
        assert!(no_utm.build_event(&host, "load").utm.is_empty());
    }

    #[test]
    fn test_unusable_host_values_are_dropped() {
        let host = CaptureHost::new("https://example.com/");
        host.update(|page| {
            page.timezone = Some(String::new());
            page.screen.pixel_ratio = Some(f64::NAN);
        });
        let event = emitter().build_event(&host, "load");
        assert_eq!(event.timezone, None);
        assert_eq!(event.pixel_ratio, None);
    }
}
