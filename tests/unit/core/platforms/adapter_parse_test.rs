// Vendor payload translation into the normalized union

use metric_edge::services::core::platforms::{
    FetchError, GoogleAdsAdapter, GoogleAnalyticsAdapter, MetaAdsAdapter, ShopifyAdapter,
    WooCommerceAdapter,
};
use metric_edge::types::PlatformId;

#[test]
fn google_ads_converts_cost_micros() {
    let payload = serde_json::json!({
        "cost_micros": 125_500_000,
        "impressions": 4_200,
        "clicks": 310,
        "conversions": 9,
        "conversions_value": 510.5
    });

    let metrics = GoogleAdsAdapter::parse_payload(&payload).unwrap();
    assert_eq!(metrics.spend, 125.5);
    assert_eq!(metrics.impressions, 4_200);
    assert_eq!(metrics.conversions, 9);
    assert_eq!(metrics.conversion_value, 510.5);
}

#[test]
fn google_ads_accepts_plain_cost() {
    let payload = serde_json::json!({ "cost": 42.0, "clicks": 7 });
    let metrics = GoogleAdsAdapter::parse_payload(&payload).unwrap();
    assert_eq!(metrics.spend, 42.0);
    assert_eq!(metrics.clicks, 7);
    assert_eq!(metrics.impressions, 0);
}

#[test]
fn google_ads_rejects_payload_without_spend() {
    let payload = serde_json::json!({ "impressions": 100 });
    assert!(GoogleAdsAdapter::parse_payload(&payload).is_err());
}

#[test]
fn meta_ads_parses_string_encoded_numbers() {
    let payload = serde_json::json!({
        "spend": "87.20",
        "impressions": "12000",
        "clicks": "640",
        "purchases": "11",
        "purchase_value": "930.00"
    });

    let metrics = MetaAdsAdapter::parse_payload(&payload).unwrap();
    assert_eq!(metrics.spend, 87.2);
    assert_eq!(metrics.impressions, 12_000);
    assert_eq!(metrics.conversions, 11);
    assert_eq!(metrics.conversion_value, 930.0);
}

#[test]
fn analytics_maps_ga4_field_names() {
    let payload = serde_json::json!({
        "sessions": 5400,
        "totalUsers": 3200,
        "screenPageViews": 18000,
        "keyEvents": 85,
        "bounceRate": 0.41
    });

    let metrics = GoogleAnalyticsAdapter::parse_payload(&payload).unwrap();
    assert_eq!(metrics.sessions, 5_400);
    assert_eq!(metrics.users, 3_200);
    assert_eq!(metrics.pageviews, 18_000);
    assert_eq!(metrics.conversions, 85);
    assert_eq!(metrics.bounce_rate, 0.41);
}

#[test]
fn shopify_computes_missing_average_order_value() {
    let payload = serde_json::json!({
        "total_sales": 1500.0,
        "orders_count": 30,
        "customers_count": 25
    });

    let metrics = ShopifyAdapter::parse_payload(&payload).unwrap();
    assert_eq!(metrics.revenue, 1_500.0);
    assert_eq!(metrics.orders, 30);
    assert_eq!(metrics.average_order_value, 50.0);
}

#[test]
fn woocommerce_handles_zero_orders() {
    let payload = serde_json::json!({
        "total_sales": 0.0,
        "total_orders": 0
    });

    let metrics = WooCommerceAdapter::parse_payload(&payload).unwrap();
    assert_eq!(metrics.orders, 0);
    assert_eq!(metrics.average_order_value, 0.0);
}

#[test]
fn fetch_error_reports_its_platform() {
    let error = FetchError::Platform {
        platform: PlatformId::MetaAds,
        message: "timeout".to_string(),
    };
    assert_eq!(error.platform(), PlatformId::MetaAds);
    assert!(error.to_string().contains("meta-ads"));
    assert!(error.to_string().contains("timeout"));
}
