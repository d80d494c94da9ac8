// Advertising network adapters (Google Ads, Meta Ads)

use super::{num_field, count_field, FetchError, FetchRequest, PlatformAdapter, PlatformFunctionClient};
use crate::types::{AdsMetrics, NormalizedMetrics, PlatformId};
use async_trait::async_trait;

pub struct GoogleAdsAdapter {
    client: PlatformFunctionClient,
}

impl GoogleAdsAdapter {
    pub fn new(client: PlatformFunctionClient) -> Self {
        Self { client }
    }

    /// Google reports spend in micros; some report shapes already carry a
    /// decimal `cost` field instead.
    pub fn parse_payload(payload: &serde_json::Value) -> Result<AdsMetrics, String> {
        let spend = if let Some(micros) = num_field(payload, &["cost_micros"]) {
            micros / 1_000_000.0
        } else {
            num_field(payload, &["cost", "spend"]).ok_or("missing cost_micros/cost/spend")?
        };

        Ok(AdsMetrics {
            spend,
            impressions: count_field(payload, &["impressions"]).unwrap_or(0),
            clicks: count_field(payload, &["clicks"]).unwrap_or(0),
            conversions: count_field(payload, &["conversions"]).unwrap_or(0),
            conversion_value: num_field(payload, &["conversions_value", "conversion_value"])
                .unwrap_or(0.0),
        })
    }
}

#[async_trait(?Send)]
impl PlatformAdapter for GoogleAdsAdapter {
    fn platform(&self) -> PlatformId {
        PlatformId::GoogleAds
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
        Ok(NormalizedMetrics::Ads(metrics))
    }
}

pub struct MetaAdsAdapter {
    client: PlatformFunctionClient,
}

impl MetaAdsAdapter {
    pub fn new(client: PlatformFunctionClient) -> Self {
        Self { client }
    }

    /// Meta insights encode most numbers as strings.
    pub fn parse_payload(payload: &serde_json::Value) -> Result<AdsMetrics, String> {
        let spend = num_field(payload, &["spend"]).ok_or("missing spend")?;

        Ok(AdsMetrics {
            spend,
            impressions: count_field(payload, &["impressions"]).unwrap_or(0),
            clicks: count_field(payload, &["clicks", "inline_link_clicks"]).unwrap_or(0),
            conversions: count_field(payload, &["conversions", "purchases"]).unwrap_or(0),
            conversion_value: num_field(payload, &["purchase_value", "conversion_value"])
                .unwrap_or(0.0),
        })
    }
}

#[async_trait(?Send)]
impl PlatformAdapter for MetaAdsAdapter {
    fn platform(&self) -> PlatformId {
        PlatformId::MetaAds
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
        Ok(NormalizedMetrics::Ads(metrics))
    }
}
