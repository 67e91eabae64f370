//! Collection endpoint derived from the beacon script's own URL.
//!
//! The snippet reports to whichever host served it, so the endpoint is
//! rebuilt from the scheme and authority of the script source with the
//! collection path appended. No configuration step is involved.

use std::fmt;

/// Path the collection server accepts beacons on.
pub const COLLECT_PATH: &str = "/p";

/// Resolved collection endpoint, immutable for the page's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint(String);

impl Endpoint {
    /// Derive `{scheme}//{host}/p` from a script source URL.
    ///
    /// The source is split on `/`; segment 0 is the scheme (with its colon)
    /// and segment 2 is the authority, port included. A malformed source
    /// yields a malformed endpoint rather than an error: delivery to it
    /// simply fails at the network layer.
    pub fn from_script_src(script_src: &str) -> Self {
        let mut parts = script_src.split('/');
        let scheme = parts.next().unwrap_or_default();
        let host = parts.nth(1).unwrap_or_default();
        Self(format!("{scheme}//{host}{COLLECT_PATH}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Whether the derived endpoint is an absolute http(s) URL with a host.
    /// Only used for diagnostics; invalid endpoints are still used as-is.
    pub fn is_valid(&self) -> bool {
        match url::Url::parse(&self.0) {
            Ok(parsed) => {
                matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some()
            }
            Err(_) => false,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Endpoint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
