use thiserror::Error;

/// Top-level error type for the `omnilogic-api` crate.
///
/// Covers every failure mode across the wire surfaces: authentication,
/// HTTP transport, the mobile command endpoint, and response parsing.
/// `omnilogic-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login or token refresh failed (bad credentials, revoked token,
    /// unreachable auth service -- the caller's remedy is the same).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Mobile endpoint ─────────────────────────────────────────────
    /// Non-success HTTP status from the command endpoint.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// Response parsing failed; `path` locates the offending field
    /// (e.g. `STATUS/Filter[0]/@filterSpeed`).
    #[error("Parse error at {path}: {message}")]
    Parse { path: String, message: String },
}

impl Error {
    /// Parse failure at a known document location.
    pub(crate) fn parse(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if this error means the credential material was
    /// rejected and re-authentication might resolve it.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient transport failure worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}
