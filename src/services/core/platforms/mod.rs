// Platform Adapters - uniform fetch contract over per-platform remote functions
//
// Each connected platform is reachable as an isolated HTTP function behind a
// shared base URL. Adapters translate a (client, date range) request into that
// remote call and the vendor-shaped response into one NormalizedMetrics
// variant. Failures cross the fan-out boundary as FetchError values, never as
// early returns that could abort sibling calls.

use crate::types::{NormalizedMetrics, PlatformId};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use worker::{Fetch, Headers, Method, Request, RequestInit};

pub mod ads;
pub mod analytics;
pub mod commerce;

pub use ads::{GoogleAdsAdapter, MetaAdsAdapter};
pub use analytics::GoogleAnalyticsAdapter;
pub use commerce::{ShopifyAdapter, WooCommerceAdapter};

/// Failure of one platform fetch.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("{platform}: remote call failed: {message}")]
    Remote {
        platform: PlatformId,
        message: String,
    },
    #[error("{platform}: platform reported error: {message}")]
    Platform {
        platform: PlatformId,
        message: String,
    },
    #[error("{platform}: timed out after {timeout_ms}ms")]
    Timeout { platform: PlatformId, timeout_ms: u64 },
    #[error("{platform}: malformed payload: {message}")]
    Malformed {
        platform: PlatformId,
        message: String,
    },
}

impl FetchError {
    pub fn platform(&self) -> PlatformId {
        match self {
            FetchError::Remote { platform, .. }
            | FetchError::Platform { platform, .. }
            | FetchError::Timeout { platform, .. }
            | FetchError::Malformed { platform, .. } => *platform,
        }
    }
}

/// One adapter invocation. Credentials are the decrypted blob from the
/// integration row; the remote function forwards them to the vendor.
#[derive(Debug, Clone, Serialize)]
pub struct FetchRequest {
    pub client_id: String,
    pub start_date: String,
    pub end_date: String,
    pub credentials: String,
}

// Adapter futures carry JS handles, so they are never Send; ?Send keeps the
// trait object usable on both targets.
#[async_trait(?Send)]
pub trait PlatformAdapter {
    fn platform(&self) -> PlatformId;
    async fn fetch_metrics(&self, request: &FetchRequest)
        -> Result<NormalizedMetrics, FetchError>;
}

pub type DynAdapter = Box<dyn PlatformAdapter>;

/// Shared HTTP client for the per-platform metric functions.
#[derive(Debug, Clone)]
pub struct PlatformFunctionClient {
    base_url: String,
    call_timeout_ms: u64,
}

impl PlatformFunctionClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            call_timeout_ms: 30_000,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.call_timeout_ms = timeout_ms;
        self
    }

    /// POST the uniform request body to the platform's function and return
    /// its JSON payload. Non-2xx responses and `{"error": ...}` bodies become
    /// FetchError values.
    pub async fn invoke(
        &self,
        platform: PlatformId,
        request: &FetchRequest,
    ) -> Result<serde_json::Value, FetchError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), platform);

        let body = serde_json::to_string(request).map_err(|e| FetchError::Malformed {
            platform,
            message: format!("request serialization: {}", e),
        })?;

        let mut headers = Headers::new();
        headers
            .set("Content-Type", "application/json")
            .map_err(|e| FetchError::Remote {
                platform,
                message: e.to_string(),
            })?;

        let outbound = Request::new_with_init(
            &url,
            RequestInit::new()
                .with_method(Method::Post)
                .with_headers(headers)
                .with_body(Some(body.into())),
        )
        .map_err(|e| FetchError::Remote {
            platform,
            message: e.to_string(),
        })?;

        let fetch_req = Fetch::Request(outbound);
        let fetch = Box::pin(fetch_req.send());
        let timeout = Box::pin(worker::Delay::from(Duration::from_millis(
            self.call_timeout_ms,
        )));

        let mut response = match futures::future::select(fetch, timeout).await {
            futures::future::Either::Left((result, _)) => {
                result.map_err(|e| FetchError::Remote {
                    platform,
                    message: e.to_string(),
                })?
            }
            futures::future::Either::Right(_) => {
                return Err(FetchError::Timeout {
                    platform,
                    timeout_ms: self.call_timeout_ms,
                })
            }
        };

        if !(200..300).contains(&response.status_code()) {
            return Err(FetchError::Remote {
                platform,
                message: format!("HTTP {}", response.status_code()),
            });
        }

        let text = response.text().await.map_err(|e| FetchError::Remote {
            platform,
            message: e.to_string(),
        })?;
        let payload: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| FetchError::Malformed {
                platform,
                message: e.to_string(),
            })?;

        if let Some(error) = payload.get("error") {
            let message = error
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(FetchError::Platform { platform, message });
        }

        Ok(payload)
    }
}

/// Build the adapter for one platform.
pub fn adapter_for(client: &PlatformFunctionClient, platform: PlatformId) -> DynAdapter {
    match platform {
        PlatformId::GoogleAds => Box::new(GoogleAdsAdapter::new(client.clone())),
        PlatformId::MetaAds => Box::new(MetaAdsAdapter::new(client.clone())),
        PlatformId::GoogleAnalytics => Box::new(GoogleAnalyticsAdapter::new(client.clone())),
        PlatformId::Shopify => Box::new(ShopifyAdapter::new(client.clone())),
        PlatformId::WooCommerce => Box::new(WooCommerceAdapter::new(client.clone())),
    }
}

/// Read a numeric field under any of the given names, tolerating vendors
/// that encode numbers as strings.
pub(crate) fn num_field(payload: &serde_json::Value, names: &[&str]) -> Option<f64> {
    for name in names {
        match payload.get(name) {
            Some(serde_json::Value::Number(n)) => return n.as_f64(),
            Some(serde_json::Value::String(s)) => {
                if let Ok(parsed) = s.parse::<f64>() {
                    return Some(parsed);
                }
            }
            _ => {}
        }
    }
    None
}

pub(crate) fn count_field(payload: &serde_json::Value, names: &[&str]) -> Option<u64> {
    num_field(payload, names).map(|n| n.max(0.0).round() as u64)
}
