// ── Auth service (JSON) ──
//
// The auth service is a separate surface from the mobile endpoint: it
// speaks JSON, wants an application id header, and hands out the bearer
// token the XML commands carry as their first parameter.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::error::Error;

/// Production auth service base. The trailing slash matters: relative
/// joins replace the last path segment without it.
pub const DEFAULT_AUTH_URL: &str = "https://services-gamma.haywardcloud.net/auth-service/v2/";

/// Application id header the auth service requires on every call.
pub const APP_ID_HEADER: &str = "X-Hayward-App-Id";

/// Application id of the official mobile app.
pub const APP_ID: &str = "6jf6n7jt9fqqe9qkbutaqajl2i";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A bearer/refresh token pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub token: String,
    pub refresh_token: String,
}

/// Everything a successful login returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(flatten)]
    pub token: Token,
    /// Account id, spelled `userID` on the wire.
    #[serde(rename = "userID")]
    pub user_id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Token lifetime in seconds. Not all deployments report it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
}

/// Settings for the auth client.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_AUTH_URL).expect("default auth URL is valid"),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Stateless client for the auth service.
///
/// Holds no token. Callers own the credential lifecycle; this type just
/// performs the two calls.
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: Url,
}

impl AuthClient {
    pub fn new(config: &AuthConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    /// Wrap an existing reqwest client, pointed at `base_url`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: Url::parse(base_url)?,
        })
    }

    /// Exchange credentials for a session.
    ///
    /// Every failure mode here, wire trouble included, is an
    /// authentication failure from the caller's point of view.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<Session, Error> {
        debug!(%email, "logging in");

        let url = self.base_url.join("login")?;
        let resp = self
            .http
            .post(url)
            .header(APP_ID_HEADER, APP_ID)
            .json(&json!({
                "email": email,
                "password": password.expose_secret(),
            }))
            .send()
            .await
            .map_err(|e| Error::Authentication {
                message: format!("login request failed: {e}"),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {body}"),
            });
        }

        let session: Session = resp.json().await.map_err(|e| Error::Authentication {
            message: format!("could not decode login response: {e}"),
        })?;
        debug!(user_id = session.user_id, "login succeeded");
        Ok(session)
    }

    /// Trade the current pair for a fresh one.
    pub async fn refresh(&self, token: &Token) -> Result<Token, Error> {
        if token.token.is_empty() || token.refresh_token.is_empty() {
            return Err(Error::Authentication {
                message: "cannot refresh without a token/refreshToken pair".into(),
            });
        }

        debug!("refreshing token");

        let url = self.base_url.join("refresh")?;
        let resp = self
            .http
            .post(url)
            .header(APP_ID_HEADER, APP_ID)
            .bearer_auth(&token.token)
            .json(&json!({ "refreshToken": token.refresh_token }))
            .send()
            .await
            .map_err(|e| Error::Authentication {
                message: format!("refresh request failed: {e}"),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("refresh failed (HTTP {status}): {body}"),
            });
        }

        resp.json().await.map_err(|e| Error::Authentication {
            message: format!("could not decode refresh response: {e}"),
        })
    }
}
