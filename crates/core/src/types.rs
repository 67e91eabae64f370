use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PicolyticsError, PicolyticsResult};
use crate::utm::UtmParams;

/// One telemetry event as it goes over the wire. Built fresh for every send
/// and never mutated afterwards.
///
/// Keys are kept short to keep the beacon body small. Values the host could
/// not supply are left out of the body entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageEvent {
    #[serde(rename = "n")]
    pub name: String,
    #[serde(rename = "l")]
    pub location: String,
    #[serde(rename = "r")]
    pub referrer: String,
    /// Load time in ms, never negative.
    #[serde(rename = "lt")]
    pub load_time_ms: u64,
    /// Time to first byte in ms, never negative.
    #[serde(rename = "fb")]
    pub first_byte_ms: u64,
    #[serde(rename = "sw", default, skip_serializing_if = "Option::is_none")]
    pub screen_width: Option<u32>,
    #[serde(rename = "sh", default, skip_serializing_if = "Option::is_none")]
    pub screen_height: Option<u32>,
    /// IANA timezone name, e.g. "Europe/Berlin".
    #[serde(rename = "tz", default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(rename = "pr", default, skip_serializing_if = "Option::is_none")]
    pub pixel_ratio: Option<f64>,
    #[serde(rename = "pd", default, skip_serializing_if = "Option::is_none")]
    pub pixel_depth: Option<u32>,
    #[serde(flatten)]
    pub utm: UtmParams,
}

impl PageEvent {
    /// Compact JSON body for the beacon.
    pub fn to_wire(&self) -> PicolyticsResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_wire(body: &str) -> PicolyticsResult<Self> {
        Ok(serde_json::from_str(body)?)
    }
}

/// Screen geometry as reported by the host. Any field may be unavailable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenInfo {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub pixel_ratio: Option<f64>,
    pub pixel_depth: Option<u32>,
}

/// Page visibility as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityState {
    Visible,
    Hidden,
}

impl VisibilityState {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisibilityState::Visible => "visible",
            VisibilityState::Hidden => "hidden",
        }
    }

    pub fn is_visible(&self) -> bool {
        matches!(self, VisibilityState::Visible)
    }
}

impl fmt::Display for VisibilityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VisibilityState {
    type Err = PicolyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "visible" => Ok(VisibilityState::Visible),
            "hidden" => Ok(VisibilityState::Hidden),
            other => Err(PicolyticsError::InvalidVisibility(other.to_string())),
        }
    }
}

/// The user agent's Do-Not-Track preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoNotTrack {
    Enabled,
    #[default]
    Disabled,
}

impl DoNotTrack {
    /// Interpret the raw `navigator.doNotTrack` value. Only an explicit
    /// opt-out ("1" or "yes") counts; null, "0", "no" and "unspecified" do
    /// not.
    pub fn from_signal(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("1") => DoNotTrack::Enabled,
            Some(v) if v.eq_ignore_ascii_case("yes") => DoNotTrack::Enabled,
            _ => DoNotTrack::Disabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, DoNotTrack::Enabled)
    }
}
