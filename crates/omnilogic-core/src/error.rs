// ── Core error types ──
//
// User-facing errors from omnilogic-core. Consumers never handle raw
// transport failures -- the `From<omnilogic_api::Error>` impl folds the
// wire layer into these domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session errors ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Not connected: {message}")]
    NotConnected { message: String },

    // ── Command errors ───────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Equipment error: {message}")]
    Equipment { message: String },

    // ── Wire errors (wrapped, not exposed raw) ───────────────────────
    #[error("Parse error at {path}: {message}")]
    Parse { path: String, message: String },

    #[error("API error: {message}")]
    Api { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<omnilogic_api::Error> for CoreError {
    fn from(err: omnilogic_api::Error) -> Self {
        match err {
            omnilogic_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            omnilogic_api::Error::Parse { path, message } => CoreError::Parse { path, message },
            omnilogic_api::Error::Api { status, message } => CoreError::Api {
                message: format!("HTTP {status}: {message}"),
            },
            omnilogic_api::Error::Transport(e) => CoreError::Api {
                message: e.to_string(),
            },
            omnilogic_api::Error::InvalidUrl(e) => CoreError::Api {
                message: format!("invalid URL: {e}"),
            },
        }
    }
}
