// Overview computation: additive totals, stale flags, guarded ratios

use metric_edge::services::core::analytics::build_overview;
use metric_edge::types::{
    AdsMetrics, CommerceMetrics, MetricsSummary, NormalizedMetrics, PlatformId, Snapshot,
};

const MINUTE_MS: u64 = 60_000;

fn ads_snapshot(platform: PlatformId, spend: f64, conversions: u64, updated_at: u64) -> Snapshot {
    let payload = NormalizedMetrics::Ads(AdsMetrics {
        spend,
        impressions: 0,
        clicks: 0,
        conversions,
        conversion_value: 0.0,
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

fn commerce_snapshot(platform: PlatformId, revenue: f64, orders: u64, updated_at: u64) -> Snapshot {
    let payload = NormalizedMetrics::Commerce(CommerceMetrics {
        revenue,
        orders,
        average_order_value: if orders > 0 { revenue / orders as f64 } else { 0.0 },
        customers: orders,
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
fn fresh_and_stale_snapshots_merge_additively() {
    // Platform A refreshed a minute ago; platform B's fetch failed, so its
    // 3-hour-old snapshot still contributes, flagged stale.
    let now = 10_000 * MINUTE_MS;
    let snapshots = vec![
        ads_snapshot(PlatformId::GoogleAds, 100.0, 5, now - MINUTE_MS),
        ads_snapshot(PlatformId::MetaAds, 50.0, 2, now - 180 * MINUTE_MS),
    ];

    let overview = build_overview("client-1", &snapshots, now, 15, false);

    assert_eq!(overview.total_spend, 150.0);
    assert_eq!(overview.total_conversions, 7);
    assert_eq!(overview.stale_platforms, vec![PlatformId::MetaAds]);
    assert_eq!(overview.oldest_snapshot_age_minutes, Some(180));
    assert_eq!(overview.platforms.len(), 2);
    assert!(overview.platforms[0].fresh);
    assert!(!overview.platforms[1].fresh);
}

#[test]
fn totals_equal_sum_of_per_platform_metrics() {
    let now = 10_000 * MINUTE_MS;
    let snapshots = vec![
        ads_snapshot(PlatformId::GoogleAds, 120.0, 6, now),
        ads_snapshot(PlatformId::MetaAds, 80.0, 4, now),
        commerce_snapshot(PlatformId::Shopify, 900.0, 12, now),
    ];

    let overview = build_overview("client-1", &snapshots, now, 15, false);

    let mut expected = MetricsSummary::default();
    for snapshot in &snapshots {
        expected.add(&snapshot.metrics);
    }
    assert_eq!(overview.total_revenue, expected.revenue);
    assert_eq!(overview.total_spend, expected.spend);
    assert_eq!(overview.total_orders, expected.orders);
    assert_eq!(overview.total_conversions, expected.conversions);
}

#[test]
fn zero_platforms_yield_the_zero_valued_summary() {
    let overview = build_overview("client-1", &[], 42 * MINUTE_MS, 15, false);

    assert_eq!(overview.total_revenue, 0.0);
    assert_eq!(overview.total_spend, 0.0);
    assert_eq!(overview.total_orders, 0);
    assert_eq!(overview.total_conversions, 0);
    assert_eq!(overview.roi, 0.0);
    assert!(overview.platforms.is_empty());
    assert_eq!(overview.oldest_snapshot_age_minutes, None);
}

#[test]
fn roi_and_roas_never_divide_by_zero() {
    let now = 10_000 * MINUTE_MS;
    // revenue without any ad spend
    let snapshots = vec![commerce_snapshot(PlatformId::Shopify, 500.0, 10, now)];

    let overview = build_overview("client-1", &snapshots, now, 15, false);

    assert_eq!(overview.roi, 0.0);
    assert!(overview.roi.is_finite());
    assert_eq!(overview.platforms[0].roas, 0.0);
}

#[test]
fn roi_reflects_revenue_over_spend() {
    let now = 10_000 * MINUTE_MS;
    let snapshots = vec![
        ads_snapshot(PlatformId::GoogleAds, 100.0, 5, now),
        commerce_snapshot(PlatformId::Shopify, 300.0, 4, now),
    ];

    let overview = build_overview("client-1", &snapshots, now, 15, false);

    // (300 - 100) / 100
    assert_eq!(overview.roi, 2.0);
}
