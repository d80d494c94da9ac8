// Outage detection timeline scenarios and the cooldown gate

use metric_edge::services::core::monitoring::{
    cooldown_active, detect_transition, DetectorConfig,
};
use metric_edge::types::{AlertKind, HealthRecord, HealthStatus};

const MINUTE_MS: u64 = 60_000;

fn record(id: &str, service: &str, status: HealthStatus, checked_at: u64) -> HealthRecord {
    HealthRecord {
        record_id: id.to_string(),
        service_name: service.to_string(),
        status,
        latency_ms: 80.0,
        message: None,
        alert_sent: false,
        checked_at,
    }
}

#[test]
fn reference_timeline_down_then_recovered() {
    // healthy at T0, unhealthy at T1, unhealthy at T1+6min: down fires once
    let t0 = 0;
    let t1 = 5 * MINUTE_MS;
    let config = DetectorConfig::default();

    let mut history = vec![
        record("a", "google-ads", HealthStatus::Healthy, t0),
        record("b", "google-ads", HealthStatus::Unhealthy, t1),
        record("c", "google-ads", HealthStatus::Unhealthy, t1 + 6 * MINUTE_MS),
    ];

    let down = detect_transition("google-ads", &history, &config).expect("down candidate");
    assert_eq!(down.kind, AlertKind::Down);
    assert_eq!(down.record_ids, vec!["b".to_string(), "c".to_string()]);

    // the batch is dispatched and its records marked
    history[1].alert_sent = true;
    history[2].alert_sent = true;
    assert!(detect_transition("google-ads", &history, &config).is_none());

    // healthy at T1+10min: recovery fires immediately, downtime ~10 minutes
    history.push(record(
        "d",
        "google-ads",
        HealthStatus::Healthy,
        t1 + 10 * MINUTE_MS,
    ));
    let recovered = detect_transition("google-ads", &history, &config).expect("recovery");
    assert_eq!(recovered.kind, AlertKind::Recovered);
    assert_eq!(recovered.downtime_ms, Some(10 * MINUTE_MS));
    assert_eq!(recovered.previous_status, Some(HealthStatus::Unhealthy));
}

#[test]
fn single_unhealthy_sample_is_debounced() {
    let history = vec![
        record("a", "shopify", HealthStatus::Healthy, 0),
        record("b", "shopify", HealthStatus::Unhealthy, MINUTE_MS),
    ];
    assert!(detect_transition("shopify", &history, &DetectorConfig::default()).is_none());
}

#[test]
fn two_samples_under_the_threshold_are_debounced() {
    let history = vec![
        record("a", "shopify", HealthStatus::Healthy, 0),
        record("b", "shopify", HealthStatus::Unhealthy, MINUTE_MS),
        record("c", "shopify", HealthStatus::Unhealthy, 4 * MINUTE_MS),
    ];
    assert!(detect_transition("shopify", &history, &DetectorConfig::default()).is_none());
}

#[test]
fn down_from_service_start_without_any_healthy_sample() {
    // a service that was never healthy still alerts once the run qualifies
    let history = vec![
        record("a", "identity-api", HealthStatus::Unhealthy, 0),
        record("b", "identity-api", HealthStatus::Unhealthy, 6 * MINUTE_MS),
    ];
    let candidate =
        detect_transition("identity-api", &history, &DetectorConfig::default()).unwrap();
    assert_eq!(candidate.kind, AlertKind::Down);
    assert_eq!(candidate.previous_status, None);
}

#[test]
fn cooldown_drops_a_second_batch_for_another_service() {
    // batch for service X sent at t=100min; a candidate for unrelated
    // service Y five minutes later is suppressed by the shared cooldown
    let sent_at = 100 * MINUTE_MS;
    assert!(cooldown_active(Some(sent_at), sent_at + 5 * MINUTE_MS, 15));

    // after the window the gate opens again
    assert!(!cooldown_active(Some(sent_at), sent_at + 15 * MINUTE_MS, 15));

    // no batch ever sent: nothing to cool down from
    assert!(!cooldown_active(None, sent_at, 15));
}

#[test]
fn recovery_needs_a_preceding_failure() {
    let history = vec![
        record("a", "meta-ads", HealthStatus::Healthy, 0),
        record("b", "meta-ads", HealthStatus::Healthy, MINUTE_MS),
    ];
    assert!(detect_transition("meta-ads", &history, &DetectorConfig::default()).is_none());
}
