use serde::{Deserialize, Serialize};

/// Supported external data platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlatformId {
    GoogleAds,
    MetaAds,
    GoogleAnalytics,
    Shopify,
    WooCommerce,
}

impl PlatformId {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformId::GoogleAds => "google-ads",
            PlatformId::MetaAds => "meta-ads",
            PlatformId::GoogleAnalytics => "google-analytics",
            PlatformId::Shopify => "shopify",
            PlatformId::WooCommerce => "woocommerce",
        }
    }

    pub fn parse(s: &str) -> Option<PlatformId> {
        match s.trim().to_lowercase().as_str() {
            "google-ads" | "google_ads" => Some(PlatformId::GoogleAds),
            "meta-ads" | "meta_ads" | "facebook-ads" => Some(PlatformId::MetaAds),
            "google-analytics" | "google_analytics" | "ga4" => Some(PlatformId::GoogleAnalytics),
            "shopify" => Some(PlatformId::Shopify),
            "woocommerce" | "woo-commerce" => Some(PlatformId::WooCommerce),
            _ => None,
        }
    }

    /// The full catalog, in stable order.
    pub fn all() -> [PlatformId; 5] {
        [
            PlatformId::GoogleAds,
            PlatformId::MetaAds,
            PlatformId::GoogleAnalytics,
            PlatformId::Shopify,
            PlatformId::WooCommerce,
        ]
    }

    pub fn is_ads(&self) -> bool {
        matches!(self, PlatformId::GoogleAds | PlatformId::MetaAds)
    }

    pub fn is_commerce(&self) -> bool {
        matches!(self, PlatformId::Shopify | PlatformId::WooCommerce)
    }
}

impl std::fmt::Display for PlatformId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Metrics reported by an advertising platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdsMetrics {
    pub spend: f64,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub conversion_value: f64,
}

/// Metrics reported by a web analytics platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsMetrics {
    pub sessions: u64,
    pub users: u64,
    pub pageviews: u64,
    pub conversions: u64,
    pub bounce_rate: f64,
}

/// Metrics reported by a storefront/commerce platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommerceMetrics {
    pub revenue: f64,
    pub orders: u64,
    pub average_order_value: f64,
    pub customers: u64,
}

/// Normalized per-platform payload. Adapters translate vendor responses into
/// exactly one of these variants; nothing downstream ever sees vendor JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NormalizedMetrics {
    Ads(AdsMetrics),
    Analytics(AnalyticsMetrics),
    Commerce(CommerceMetrics),
}

impl NormalizedMetrics {
    /// Extract the cross-platform summary subset. Dimensions a platform does
    /// not report are zero.
    pub fn summary(&self) -> MetricsSummary {
        match self {
            NormalizedMetrics::Ads(m) => MetricsSummary {
                revenue: m.conversion_value,
                spend: m.spend,
                orders: 0,
                conversions: m.conversions,
            },
            NormalizedMetrics::Analytics(m) => MetricsSummary {
                revenue: 0.0,
                spend: 0.0,
                orders: 0,
                conversions: m.conversions,
            },
            NormalizedMetrics::Commerce(m) => MetricsSummary {
                revenue: m.revenue,
                spend: 0.0,
                orders: m.orders,
                conversions: 0,
            },
        }
    }
}

/// Summary metrics extracted from a snapshot, additive across platforms.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub revenue: f64,
    pub spend: f64,
    pub orders: u64,
    pub conversions: u64,
}

impl MetricsSummary {
    pub fn add(&mut self, other: &MetricsSummary) {
        self.revenue += other.revenue;
        self.spend += other.spend;
        self.orders += other.orders;
        self.conversions += other.conversions;
    }

    /// Return on ad spend. Zero spend yields 0, never NaN or infinity.
    pub fn roas(&self) -> f64 {
        if self.spend > 0.0 {
            self.revenue / self.spend
        } else {
            0.0
        }
    }

    /// Return on investment as a fraction of spend. Zero spend yields 0.
    pub fn roi(&self) -> f64 {
        if self.spend > 0.0 {
            (self.revenue - self.spend) / self.spend
        } else {
            0.0
        }
    }
}

/// A client's connection record for one platform. Written by the surrounding
/// CRUD system; this engine only reads it and touches `last_synced_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Integration {
    pub client_id: String,
    pub platform: PlatformId,
    pub connected: bool,
    pub credentials_enc: String,
    pub last_synced_at: Option<u64>,
}

/// Cached result of one platform fetch for one client. At most one current
/// row per (client_id, platform); refreshed in place, never appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub client_id: String,
    pub platform: PlatformId,
    pub payload: NormalizedMetrics,
    pub metrics: MetricsSummary,
    pub snapshot_date: String,
    pub updated_at: u64,
}

impl Snapshot {
    pub fn age_minutes(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.updated_at) / 60_000
    }
}

/// Per-platform slice of an overview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformBreakdown {
    pub platform: PlatformId,
    pub metrics: MetricsSummary,
    pub roas: f64,
    pub fresh: bool,
    pub updated_at: u64,
}

/// Derived aggregate across a client's current snapshots. Never persisted;
/// only as fresh as the snapshots it was computed from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Overview {
    pub client_id: String,
    pub total_revenue: f64,
    pub total_spend: f64,
    pub total_orders: u64,
    pub total_conversions: u64,
    pub roi: f64,
    pub platforms: Vec<PlatformBreakdown>,
    pub stale_platforms: Vec<PlatformId>,
    pub oldest_snapshot_age_minutes: Option<u64>,
    pub from_cache: bool,
    pub generated_at: u64,
}

/// Health status levels for monitored services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Unhealthy => "unhealthy",
        }
    }

    pub fn parse(s: &str) -> Option<HealthStatus> {
        match s {
            "healthy" => Some(HealthStatus::Healthy),
            "degraded" => Some(HealthStatus::Degraded),
            "unhealthy" => Some(HealthStatus::Unhealthy),
            _ => None,
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One observation of one monitored service. Append-only time series;
/// insertion order defines recency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthRecord {
    pub record_id: String,
    pub service_name: String,
    pub status: HealthStatus,
    pub latency_ms: f64,
    pub message: Option<String>,
    pub alert_sent: bool,
    pub checked_at: u64,
}

/// Per-user alert opt-in for one service. Read-only input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringPreference {
    pub user_id: String,
    pub service_name: String,
    pub notify_on_down: bool,
    pub notify_on_recovery: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Down,
    Recovered,
}

/// A detected health transition, carried from detection to dispatch. Inferred
/// from record history each cycle, never persisted as its own entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertCandidate {
    pub service_name: String,
    pub kind: AlertKind,
    pub previous_status: Option<HealthStatus>,
    pub downtime_ms: Option<u64>,
    pub record_ids: Vec<String>,
    pub message: String,
}

/// Inclusive calendar-day range for metric queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
}

impl DateRange {
    pub fn new(start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        Self {
            start_date: start_date.into(),
            end_date: end_date.into(),
        }
    }

    /// Trailing window ending today (UTC), the default when a request omits
    /// its dates.
    pub fn trailing_days(days: i64) -> Self {
        let end = chrono::Utc::now().date_naive();
        let start = end - chrono::Duration::days(days);
        Self {
            start_date: start.format("%Y-%m-%d").to_string(),
            end_date: end.format("%Y-%m-%d").to_string(),
        }
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self::trailing_days(30)
    }
}

/// Outcome of a forced multi-platform sync for one client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSummary {
    pub client_id: String,
    pub synced: Vec<PlatformId>,
    pub failed: Vec<SyncFailure>,
    pub completed_at: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncFailure {
    pub platform: PlatformId,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_id_round_trip() {
        for platform in PlatformId::all() {
            assert_eq!(PlatformId::parse(platform.as_str()), Some(platform));
        }
        assert_eq!(PlatformId::parse("tiktok-ads"), None);
    }

    #[test]
    fn test_summary_guards_zero_spend() {
        let summary = MetricsSummary {
            revenue: 120.0,
            spend: 0.0,
            orders: 3,
            conversions: 3,
        };
        assert_eq!(summary.roas(), 0.0);
        assert_eq!(summary.roi(), 0.0);
    }

    #[test]
    fn test_summary_ratios() {
        let summary = MetricsSummary {
            revenue: 300.0,
            spend: 100.0,
            orders: 0,
            conversions: 10,
        };
        assert_eq!(summary.roas(), 3.0);
        assert_eq!(summary.roi(), 2.0);
    }

    #[test]
    fn test_normalized_metrics_summary_subsets() {
        let ads = NormalizedMetrics::Ads(AdsMetrics {
            spend: 100.0,
            impressions: 5000,
            clicks: 250,
            conversions: 5,
            conversion_value: 400.0,
        });
        let summary = ads.summary();
        assert_eq!(summary.spend, 100.0);
        assert_eq!(summary.revenue, 400.0);
        assert_eq!(summary.orders, 0);

        let commerce = NormalizedMetrics::Commerce(CommerceMetrics {
            revenue: 900.0,
            orders: 12,
            average_order_value: 75.0,
            customers: 10,
        });
        let summary = commerce.summary();
        assert_eq!(summary.revenue, 900.0);
        assert_eq!(summary.orders, 12);
        assert_eq!(summary.spend, 0.0);
    }

    #[test]
    fn test_health_status_parse() {
        assert_eq!(
            HealthStatus::parse("degraded"),
            Some(HealthStatus::Degraded)
        );
        assert_eq!(HealthStatus::parse("offline"), None);
        assert!(!HealthStatus::Degraded.is_healthy());
    }
}
