// Cache gate behavior: freshness window, force refresh, oldest-snapshot rule

use metric_edge::services::core::analytics::cache_gate::{
    decide, is_fresh, CacheDecision, RefreshReason, FRESHNESS_WINDOW_MINUTES,
};
use metric_edge::types::{AdsMetrics, NormalizedMetrics, PlatformId, Snapshot};

const MINUTE_MS: u64 = 60_000;

fn snapshot(platform: PlatformId, updated_at: u64) -> Snapshot {
    let payload = NormalizedMetrics::Ads(AdsMetrics {
        spend: 25.0,
        impressions: 1_000,
        clicks: 40,
        conversions: 2,
        conversion_value: 80.0,
    });
    Snapshot {
        client_id: "client-1".to_string(),
        platform,
        metrics: payload.summary(),
        payload,
        snapshot_date: "2024-05-01".to_string(),
        updated_at,
    }
}

#[test]
fn five_minute_old_snapshot_serves_from_cache() {
    // The reference scenario: snapshot 5 minutes old, window 15 minutes.
    // The gate serves cache, so no adapter call is ever issued.
    let now = 1_000 * MINUTE_MS;
    let snapshots = vec![snapshot(PlatformId::GoogleAds, now - 5 * MINUTE_MS)];
    let connected = vec![PlatformId::GoogleAds];

    assert_eq!(
        decide(&snapshots, &connected, false, now, FRESHNESS_WINDOW_MINUTES),
        CacheDecision::ServeCached
    );
}

#[test]
fn force_refresh_always_bypasses_the_gate() {
    let now = 1_000 * MINUTE_MS;
    let snapshots = vec![snapshot(PlatformId::GoogleAds, now)];
    let connected = vec![PlatformId::GoogleAds];

    assert_eq!(
        decide(&snapshots, &connected, true, now, FRESHNESS_WINDOW_MINUTES),
        CacheDecision::Refresh(RefreshReason::Forced)
    );
}

#[test]
fn freshness_is_monotonic_in_elapsed_time() {
    let updated_at = 500 * MINUTE_MS;
    let mut previous = true;
    for elapsed in 0..(4 * FRESHNESS_WINDOW_MINUTES) {
        let fresh = is_fresh(updated_at, updated_at + elapsed * MINUTE_MS, FRESHNESS_WINDOW_MINUTES);
        assert!(
            previous || !fresh,
            "stale snapshot flipped back to fresh at {} minutes",
            elapsed
        );
        previous = fresh;
    }
}

#[test]
fn clock_skew_does_not_underflow() {
    // updated_at in the future (writer clock ahead): still fresh, no panic
    assert!(is_fresh(10 * MINUTE_MS, 5 * MINUTE_MS, FRESHNESS_WINDOW_MINUTES));
}

#[test]
fn overview_gate_uses_the_oldest_contributor() {
    let now = 1_000 * MINUTE_MS;
    let snapshots = vec![
        snapshot(PlatformId::GoogleAds, now - 2 * MINUTE_MS),
        snapshot(PlatformId::Shopify, now - 16 * MINUTE_MS),
    ];
    let connected = vec![PlatformId::GoogleAds, PlatformId::Shopify];

    assert_eq!(
        decide(&snapshots, &connected, false, now, FRESHNESS_WINDOW_MINUTES),
        CacheDecision::Refresh(RefreshReason::StaleSnapshot)
    );
}

#[test]
fn unrepresented_connected_platform_forces_refresh() {
    let now = 1_000 * MINUTE_MS;
    let snapshots = vec![snapshot(PlatformId::GoogleAds, now - MINUTE_MS)];
    let connected = vec![PlatformId::GoogleAds, PlatformId::WooCommerce];

    assert_eq!(
        decide(&snapshots, &connected, false, now, FRESHNESS_WINDOW_MINUTES),
        CacheDecision::Refresh(RefreshReason::MissingPlatforms)
    );
}
