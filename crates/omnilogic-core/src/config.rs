// ── Runtime client configuration ──
//
// How to reach the cloud services and how long derived state stays
// fresh. The embedding application constructs a `ClientConfig` and
// hands it in -- core never reads config files.

use std::time::Duration;

use omnilogic_api::auth::AuthConfig;
use omnilogic_api::transport::TransportConfig;

/// Configuration for one [`OmniLogic`](crate::OmniLogic) client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Auth service endpoint and timeout.
    pub auth: AuthConfig,
    /// Mobile endpoint and timeout.
    pub transport: TransportConfig,
    /// How long a telemetry snapshot answers reads before the next one
    /// goes to the wire.
    pub cache_validity: Duration,
    /// How often the background task re-examines the token.
    pub token_check_interval: Duration,
    /// Remaining lifetime under which the token gets refreshed.
    pub token_refresh_threshold: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            auth: AuthConfig::default(),
            transport: TransportConfig::default(),
            cache_validity: Duration::from_secs(30),
            token_check_interval: Duration::from_secs(60 * 60),
            token_refresh_threshold: Duration::from_secs(24 * 60 * 60),
        }
    }
}
