//! Host capabilities — everything the beacon reads from, or hands to, the
//! environment it runs in.
//!
//! The browser binding implements [`BeaconHost`] over `web-sys`; tests and
//! the simulator implement it over an in-memory [`PageState`].

use picolytics_core::{DoNotTrack, Endpoint, NavigationTiming, ScreenInfo, VisibilityState};

/// Opaque capabilities consumed from the host environment.
pub trait BeaconHost {
    fn visibility_state(&self) -> VisibilityState;

    fn do_not_track(&self) -> DoNotTrack;

    fn navigation_timing(&self) -> NavigationTiming;

    /// Full URL of the current page.
    fn location_href(&self) -> String;

    fn referrer(&self) -> String;

    fn screen(&self) -> ScreenInfo;

    /// Resolved IANA timezone, if the host can report one.
    fn timezone(&self) -> Option<String>;

    /// Queue `body` for non-blocking, unload-safe delivery to `endpoint`.
    ///
    /// Returns whether the host accepted the payload. Acceptance says
    /// nothing about delivery; there is no completion to observe.
    fn send_beacon(&self, endpoint: &Endpoint, body: String) -> bool;
}

/// In-memory page used by non-browser hosts.
#[derive(Debug, Clone, PartialEq)]
pub struct PageState {
    pub href: String,
    pub referrer: String,
    pub visibility: VisibilityState,
    pub do_not_track: DoNotTrack,
    pub timing: NavigationTiming,
    pub screen: ScreenInfo,
    pub timezone: Option<String>,
}

impl PageState {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            referrer: String::new(),
            visibility: VisibilityState::Visible,
            do_not_track: DoNotTrack::Disabled,
            timing: NavigationTiming::default(),
            screen: ScreenInfo::default(),
            timezone: None,
        }
    }

    /// Full navigation to a new URL.
    pub fn navigate(&mut self, href: impl Into<String>) {
        self.href = href.into();
    }

    /// Hash-only navigation: replace the fragment, keep everything else.
    /// Accepts the fragment with or without its leading `#`.
    pub fn set_fragment(&mut self, fragment: &str) {
        let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
        match url::Url::parse(&self.href) {
            Ok(mut parsed) => {
                parsed.set_fragment(Some(fragment));
                self.href = parsed.into();
            }
            Err(_) => {
                let base = self.href.split('#').next().unwrap_or_default();
                self.href = format!("{base}#{fragment}");
            }
        }
    }
}

impl Default for PageState {
    fn default() -> Self {
        Self::new("about:blank")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_fragment_appends_and_replaces() {
        let mut page = PageState::new("https://example.com/docs/intro");
        page.set_fragment("#section2");
        assert_eq!(page.href, "https://example.com/docs/intro#section2");

        page.set_fragment("section3");
        assert_eq!(page.href, "https://example.com/docs/intro#section3");
    }

    #[test]
    fn test_set_fragment_on_unparseable_href() {
        let mut page = PageState::new("relative/page#old");
        page.set_fragment("#new");
        assert_eq!(page.href, "relative/page#new");
    }

    #[test]
    fn test_navigate() {
        let mut page = PageState::default();
        page.navigate("https://example.com/next");
        assert_eq!(page.href, "https://example.com/next");
        assert!(page.visibility.is_visible());
    }
}
