// ── Mobile-endpoint transport ──

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use url::Url;
use xmltree::Element;

use crate::error::Error;
use crate::request::Request;

/// Production mobile-interface endpoint.
pub const DEFAULT_ENDPOINT: &str =
    "https://www.haywardomnilogic.com/MobileInterface/MobileInterface.ashx";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for the XML command transport.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Endpoint all commands are POSTed to.
    pub endpoint: Url,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL"),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl TransportConfig {
    /// Build a reqwest client with this configuration applied.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        Ok(reqwest::Client::builder().timeout(self.timeout).build()?)
    }
}

/// Sends a command and returns the response document.
///
/// One command in, one document out. Failures surface on the single
/// error channel; there are no partial results.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> Result<Element, Error>;
}

/// HTTP transport speaking the XML command protocol.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(config: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: config.build_client()?,
            endpoint: config.endpoint.clone(),
        })
    }

    /// Wrap an existing reqwest client. Lets tests point the transport
    /// at a local server without rebuilding the config.
    pub fn from_reqwest(endpoint: &str, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self {
            http,
            endpoint: Url::parse(endpoint)?,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> Result<Element, Error> {
        debug!(command = %request.name, "sending command");

        let resp = self
            .http
            .post(self.endpoint.clone())
            .header(reqwest::header::CONTENT_TYPE, "text/xml")
            .body(request.to_xml())
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            let preview: String = body.chars().take(200).collect();
            return Err(Error::Api {
                status: status.as_u16(),
                message: preview,
            });
        }

        Element::parse(body.as_bytes())
            .map_err(|e| Error::parse(request.name.clone(), e.to_string()))
    }
}
