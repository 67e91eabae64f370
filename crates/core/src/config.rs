use std::time::Duration;

use serde::Deserialize;

use crate::error::PicolyticsResult;

/// Options carried by the beacon's emit context. The browser build always
/// runs with the defaults; the simulator may override them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BeaconOptions {
    #[serde(default = "default_ping_interval_ms")]
    pub ping_interval_ms: u64,
    #[serde(default = "default_capture_utm")]
    pub capture_utm: bool,
}

fn default_ping_interval_ms() -> u64 { 5000 }
fn default_capture_utm() -> bool { true }

impl BeaconOptions {
    pub fn ping_interval(&self) -> Duration {
        Duration::from_millis(self.ping_interval_ms)
    }
}

impl Default for BeaconOptions {
    fn default() -> Self {
        Self {
            ping_interval_ms: default_ping_interval_ms(),
            capture_utm: default_capture_utm(),
        }
    }
}

/// Root simulator configuration. Loaded from environment variables
/// with the prefix `PICOLYTICS__`.
#[derive(Debug, Clone, Deserialize)]
pub struct SimConfig {
    #[serde(default = "default_script_src")]
    pub script_src: String,
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u64,
    #[serde(default = "default_step_interval_ms")]
    pub step_interval_ms: u64,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub beacon: BeaconOptions,
    #[serde(default)]
    pub page: PageConfig,
}

fn default_script_src() -> String { "http://localhost:8080/picolytics.js".to_string() }
fn default_duration_secs() -> u64 { 30 }
fn default_step_interval_ms() -> u64 { 2000 }
fn default_request_timeout_ms() -> u64 { 5000 }

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            script_src: default_script_src(),
            duration_secs: default_duration_secs(),
            step_interval_ms: default_step_interval_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            beacon: BeaconOptions::default(),
            page: PageConfig::default(),
        }
    }
}

// ─── Simulated Page ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct PageConfig {
    #[serde(default = "default_page_url")]
    pub url: String,
    #[serde(default)]
    pub referrer: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_screen_width")]
    pub screen_width: u32,
    #[serde(default = "default_screen_height")]
    pub screen_height: u32,
    #[serde(default = "default_pixel_ratio")]
    pub pixel_ratio: f64,
    #[serde(default = "default_pixel_depth")]
    pub pixel_depth: u32,
    /// Raw Do-Not-Track value, as `navigator.doNotTrack` would report it.
    #[serde(default)]
    pub do_not_track: Option<String>,
    #[serde(default)]
    pub start_hidden: bool,
    #[serde(default = "default_first_byte_ms")]
    pub first_byte_ms: u64,
    #[serde(default = "default_load_time_ms")]
    pub load_time_ms: u64,
}

fn default_page_url() -> String { "http://localhost:8080/".to_string() }
fn default_timezone() -> String { "UTC".to_string() }
fn default_screen_width() -> u32 { 1920 }
fn default_screen_height() -> u32 { 1080 }
fn default_pixel_ratio() -> f64 { 1.0 }
fn default_pixel_depth() -> u32 { 24 }
fn default_first_byte_ms() -> u64 { 80 }
fn default_load_time_ms() -> u64 { 450 }

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            url: default_page_url(),
            referrer: String::new(),
            timezone: default_timezone(),
            screen_width: default_screen_width(),
            screen_height: default_screen_height(),
            pixel_ratio: default_pixel_ratio(),
            pixel_depth: default_pixel_depth(),
            do_not_track: None,
            start_hidden: false,
            first_byte_ms: default_first_byte_ms(),
            load_time_ms: default_load_time_ms(),
        }
    }
}

impl SimConfig {
    /// Load configuration from environment variables.
    pub fn load() -> PicolyticsResult<Self> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("PICOLYTICS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }

    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SimConfig::default();
        assert_eq!(config.beacon.ping_interval(), Duration::from_secs(5));
        assert!(config.beacon.capture_utm);
        assert_eq!(config.page.screen_width, 1920);
        assert!(config.page.do_not_track.is_none());
        assert_eq!(config.duration(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_deserialize_fills_defaults() {
        let config: SimConfig = serde_json::from_str(
            r#"{"script_src":"https://a.example.com/pico.js","beacon":{"ping_interval_ms":1000},"page":{"start_hidden":true}}"#,
        )
        .unwrap();
        assert_eq!(config.script_src, "https://a.example.com/pico.js");
        assert_eq!(config.beacon.ping_interval_ms, 1000);
        assert!(config.beacon.capture_utm);
        assert!(config.page.start_hidden);
        assert_eq!(config.page.timezone, "UTC");
        assert_eq!(config.step_interval_ms, 2000);
    }
}
