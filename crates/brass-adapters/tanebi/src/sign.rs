//! Signing service access.
//!
//! The QQ servers only accept packets signed by an official client. A signing
//! service does that on the adapter's behalf and also publishes the
//! application metadata the protocol client has to impersonate.
//!
//! | Request | Method | Body | Response |
//! |---------|--------|------|----------|
//! | `{url}/appinfo` | GET | (none) | [`AppInfo`] |
//! | `{url}` | POST | `{cmd, seq, src}` (hex) | `{value: {sign, token, extra}}` (hex) |

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::client::{AppInfo, ClientError, ClientResult, SignProvider, SignResult};

/// Signing service as seen by the bootstrap.
#[async_trait]
pub trait SignService: Send + Sync {
    /// Fetches application metadata.
    async fn app_info(&self) -> ClientResult<AppInfo>;

    /// Returns the provider the protocol client signs packets with.
    fn provider(&self) -> Arc<dyn SignProvider>;
}

/// HTTP signing service rooted at a URL.
pub struct UrlSignService {
    provider: Arc<UrlSignProvider>,
}

impl UrlSignService {
    /// Creates a signing service for `url` with a 30 second request timeout.
    pub fn new(url: impl Into<String>) -> ClientResult<Self> {
        Self::with_timeout(url, Duration::from_secs(30))
    }

    /// Creates a signing service with a custom request timeout.
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Sign(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            provider: Arc::new(UrlSignProvider {
                http,
                url: url.into(),
            }),
        })
    }

    /// Returns the signing endpoint.
    pub fn url(&self) -> &str {
        &self.provider.url
    }
}

#[async_trait]
impl SignService for UrlSignService {
    async fn app_info(&self) -> ClientResult<AppInfo> {
        let url = appinfo_url(&self.provider.url);
        debug!(url = %url, "Fetching app info from signing service");

        let info: AppInfo = self
            .provider
            .http
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ClientError::Sign(e.to_string()))?
            .json()
            .await
            .map_err(|e| ClientError::Sign(format!("invalid app info: {e}")))?;

        debug!(
            os = %info.os,
            version = %info.current_version,
            sub_app_id = info.sub_app_id,
            "App info fetched"
        );
        Ok(info)
    }

    fn provider(&self) -> Arc<dyn SignProvider> {
        Arc::clone(&self.provider) as Arc<dyn SignProvider>
    }
}

/// Packet signer backed by an HTTP signing endpoint.
pub struct UrlSignProvider {
    http: Client,
    url: String,
}

#[derive(Serialize)]
struct SignRequest<'a> {
    cmd: &'a str,
    seq: u32,
    src: String,
}

#[derive(Deserialize)]
struct SignResponse {
    value: SignValue,
}

#[derive(Deserialize)]
struct SignValue {
    sign: String,
    #[serde(default)]
    token: String,
    #[serde(default)]
    extra: String,
}

#[async_trait]
impl SignProvider for UrlSignProvider {
    async fn sign(&self, cmd: &str, seq: u32, src: &[u8]) -> ClientResult<SignResult> {
        trace!(cmd = %cmd, seq = seq, len = src.len(), "Signing packet");

        let request = SignRequest {
            cmd,
            seq,
            src: hex::encode(src),
        };
        let response: SignResponse = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ClientError::Sign(e.to_string()))?
            .json()
            .await
            .map_err(|e| ClientError::Sign(format!("invalid sign response: {e}")))?;

        decode_sign_value(response.value)
    }
}

fn decode_sign_value(value: SignValue) -> ClientResult<SignResult> {
    let decode = |field: &str, s: &str| {
        hex::decode(s).map_err(|e| ClientError::Sign(format!("bad hex in '{field}': {e}")))
    };
    Ok(SignResult {
        sign: decode("sign", &value.sign)?,
        token: decode("token", &value.token)?,
        extra: decode("extra", &value.extra)?,
    })
}

fn appinfo_url(base: &str) -> String {
    format!("{}/appinfo", base.trim_end_matches('/'))
}
