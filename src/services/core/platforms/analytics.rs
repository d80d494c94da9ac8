// Web analytics adapter (Google Analytics 4)

use super::{num_field, count_field, FetchError, FetchRequest, PlatformAdapter, PlatformFunctionClient};
use crate::types::{AnalyticsMetrics, NormalizedMetrics, PlatformId};
use async_trait::async_trait;

pub struct GoogleAnalyticsAdapter {
    client: PlatformFunctionClient,
}

impl GoogleAnalyticsAdapter {
    pub fn new(client: PlatformFunctionClient) -> Self {
        Self { client }
    }

    pub fn parse_payload(payload: &serde_json::Value) -> Result<AnalyticsMetrics, String> {
        let sessions = count_field(payload, &["sessions"]).ok_or("missing sessions")?;

        Ok(AnalyticsMetrics {
            sessions,
            users: count_field(payload, &["totalUsers", "users"]).unwrap_or(0),
            pageviews: count_field(payload, &["screenPageViews", "pageviews"]).unwrap_or(0),
            conversions: count_field(payload, &["conversions", "keyEvents"]).unwrap_or(0),
            bounce_rate: num_field(payload, &["bounceRate", "bounce_rate"]).unwrap_or(0.0),
        })
    }
}

#[async_trait(?Send)]
impl PlatformAdapter for GoogleAnalyticsAdapter {
    fn platform(&self) -> PlatformId {
        PlatformId::GoogleAnalytics
    }

    async fn fetch_metrics(
        &self,
        request: &FetchRequest,
    ) -> Result<NormalizedMetrics, FetchError> {
        let payload = self.client.invoke(self.platform(), request).await?;
        let metrics = Self::parse_payload(&payload).map_err(|message| FetchError::Malformed {
            platform: self.platform(),
            message: message.to_string(),
        })?;
        Ok(NormalizedMetrics::Analytics(metrics))
    }
}
