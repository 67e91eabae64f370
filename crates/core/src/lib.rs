pub mod config;
pub mod endpoint;
pub mod error;
pub mod timing;
pub mod types;
pub mod utm;

pub use config::{BeaconOptions, SimConfig};
pub use endpoint::Endpoint;
pub use error::{PicolyticsError, PicolyticsResult};
pub use timing::NavigationTiming;
pub use types::{DoNotTrack, PageEvent, ScreenInfo, VisibilityState};
pub use utm::UtmParams;
