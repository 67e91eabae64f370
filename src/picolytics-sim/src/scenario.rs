//! Scripted page interactions replayed by the simulator.

use std::str::FromStr;

use picolytics_beacon::Signal;
use picolytics_core::{DoNotTrack, PicolyticsError, VisibilityState};

use crate::host::SimHost;

/// One scripted interaction, parsed from `--step`.
///
/// | Syntax | Effect |
/// |---|---|
/// | `hidden` / `visible` | visibility change |
/// | `popstate[:<url>]` | history traversal, optionally to a new URL |
/// | `hashchange:<#fragment>` | hash-only navigation |
/// | `dnt:on` / `dnt:off` | toggle Do-Not-Track (no event) |
/// | `event:<name>` | custom event through the manual hook |
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Visibility(VisibilityState),
    PopState(Option<String>),
    HashChange(String),
    DoNotTrack(bool),
    Custom(String),
}

impl Step {
    /// Apply the step to the page and return the signal it raises, if any.
    pub fn apply(&self, host: &SimHost) -> Option<Signal> {
        match self {
            Step::Visibility(state) => {
                host.update(|page| page.visibility = *state);
                Some(Signal::VisibilityChange(*state))
            }
            Step::PopState(url) => {
                if let Some(url) = url {
                    host.update(|page| page.navigate(url.clone()));
                }
                Some(Signal::PopState)
            }
            Step::HashChange(fragment) => {
                host.update(|page| page.set_fragment(fragment));
                Some(Signal::HashChange)
            }
            Step::DoNotTrack(enabled) => {
                let dnt = if *enabled {
                    DoNotTrack::Enabled
                } else {
                    DoNotTrack::Disabled
                };
                host.update(|page| page.do_not_track = dnt);
                None
            }
            Step::Custom(name) => Some(Signal::Manual(name.clone())),
        }
    }
}

impl FromStr for Step {
    type Err = PicolyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PicolyticsError::InvalidStep(s.to_string());
        let (kind, arg) = match s.split_once(':') {
            Some((kind, arg)) => (kind, Some(arg)),
            None => (s, None),
        };

        match (kind, arg) {
            ("hidden" | "visible", None) => Ok(Step::Visibility(kind.parse()?)),
            ("popstate", None) => Ok(Step::PopState(None)),
            ("popstate", Some(url)) if !url.is_empty() => Ok(Step::PopState(Some(url.to_string()))),
            ("hashchange", Some(fragment)) if !fragment.is_empty() => {
                Ok(Step::HashChange(fragment.to_string()))
            }
            ("dnt", Some("on")) => Ok(Step::DoNotTrack(true)),
            ("dnt", Some("off")) => Ok(Step::DoNotTrack(false)),
            ("event", Some(name)) if !name.is_empty() => Ok(Step::Custom(name.to_string())),
            _ => Err(invalid()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use picolytics_beacon::PageState;

    use super::*;
    use crate::transport::testing::RecordingTransport;

    #[test]
    fn test_parse_steps() {
        assert_eq!("hidden".parse::<Step>().unwrap(), Step::Visibility(VisibilityState::Hidden));
        assert_eq!("visible".parse::<Step>().unwrap(), Step::Visibility(VisibilityState::Visible));
        assert_eq!("popstate".parse::<Step>().unwrap(), Step::PopState(None));
        assert_eq!(
            "popstate:https://example.com/back".parse::<Step>().unwrap(),
            Step::PopState(Some("https://example.com/back".into()))
        );
        assert_eq!(
            "hashchange:#section2".parse::<Step>().unwrap(),
            Step::HashChange("#section2".into())
        );
        assert_eq!("dnt:on".parse::<Step>().unwrap(), Step::DoNotTrack(true));
        assert_eq!("event:signup".parse::<Step>().unwrap(), Step::Custom("signup".into()));
    }

    #[test]
    fn test_reject_bad_steps() {
        for bad in ["", "hashchange", "hashchange:", "dnt:maybe", "hidden:now", "event:", "scroll"] {
            let err = bad.parse::<Step>().unwrap_err();
            assert!(matches!(err, PicolyticsError::InvalidStep(_)), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_apply_updates_page() {
        let host = SimHost::new(
            PageState::new("https://example.com/guide"),
            Arc::new(RecordingTransport::default()),
        );

        let signal = Step::HashChange("#faq".into()).apply(&host);
        assert_eq!(signal, Some(Signal::HashChange));
        assert_eq!(host.page().href, "https://example.com/guide#faq");

        let signal = Step::Visibility(VisibilityState::Hidden).apply(&host);
        assert_eq!(signal, Some(Signal::VisibilityChange(VisibilityState::Hidden)));
        assert_eq!(host.page().visibility, VisibilityState::Hidden);

        assert_eq!(Step::DoNotTrack(true).apply(&host), None);
        assert!(host.page().do_not_track.is_enabled());

        let signal = Step::PopState(Some("https://example.com/".into())).apply(&host);
        assert_eq!(signal, Some(Signal::PopState));
        assert_eq!(host.page().href, "https://example.com/");
    }
}
