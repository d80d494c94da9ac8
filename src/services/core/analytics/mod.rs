// Analytics - cache-gated aggregation across platform snapshots

pub mod aggregator;
pub mod cache_gate;

pub use aggregator::{build_overview, AnalyticsConfig, AnalyticsService, PlatformRead};
pub use cache_gate::{is_fresh, CacheDecision, RefreshReason, FRESHNESS_WINDOW_MINUTES};
