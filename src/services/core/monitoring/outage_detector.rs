// Outage Detector - sustained-failure and recovery detection over health history
//
// Pure over record history: every decision is derived from persisted
// HealthRecords, never from process-local state, so a cycle can run on any
// isolate and reach the same conclusion.

use crate::types::{AlertCandidate, AlertKind, HealthRecord};
use crate::utils::time::MINUTE_MS;

#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Minimum uninterrupted non-healthy duration before a down alert.
    pub continuous_failure_minutes: u64,
    /// Minimum samples inside that run; debounces single-probe blips.
    pub min_failure_samples: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            continuous_failure_minutes: 5,
            min_failure_samples: 2,
        }
    }
}

/// Trailing contiguous run of non-healthy records, oldest first.
fn trailing_failure_run(history: &[HealthRecord]) -> &[HealthRecord] {
    let run_start = history
        .iter()
        .rposition(|record| record.status.is_healthy())
        .map(|index| index + 1)
        .unwrap_or(0);
    &history[run_start..]
}

/// Evaluate one service's history (ascending by checked_at) against the
/// debounce rules. Returns at most one candidate per cycle.
pub fn detect_transition(
    service_name: &str,
    history: &[HealthRecord],
    config: &DetectorConfig,
) -> Option<AlertCandidate> {
    let latest = history.last()?;

    if latest.status.is_healthy() {
        // Recovery fires immediately on the first healthy sample after a
        // non-healthy one.
        let previous = &history[..history.len() - 1];
        let prior = previous.last()?;
        if prior.status.is_healthy() {
            return None;
        }

        let run = trailing_failure_run(previous);
        let outage_started_at = run.first().map(|r| r.checked_at).unwrap_or(prior.checked_at);
        let downtime_ms = latest.checked_at.saturating_sub(outage_started_at);

        return Some(AlertCandidate {
            service_name: service_name.to_string(),
            kind: AlertKind::Recovered,
            previous_status: Some(prior.status),
            downtime_ms: Some(downtime_ms),
            record_ids: vec![latest.record_id.clone()],
            message: format!(
                "{} recovered after {} minutes of downtime",
                service_name,
                downtime_ms / MINUTE_MS
            ),
        });
    }

    // Down detection: the whole trailing run must be non-healthy, long
    // enough, dense enough, and not already alerted.
    let run = trailing_failure_run(history);
    if run.len() < config.min_failure_samples {
        return None;
    }

    let span_ms = run
        .last()
        .map(|r| r.checked_at)
        .unwrap_or(0)
        .saturating_sub(run.first().map(|r| r.checked_at).unwrap_or(0));
    if span_ms < config.continuous_failure_minutes * MINUTE_MS {
        return None;
    }

    if run.iter().any(|record| record.alert_sent) {
        return None;
    }

    let previous_status = history[..history.len() - run.len()]
        .last()
        .map(|record| record.status);

    Some(AlertCandidate {
        service_name: service_name.to_string(),
        kind: AlertKind::Down,
        previous_status,
        downtime_ms: Some(span_ms),
        record_ids: run.iter().map(|r| r.record_id.clone()).collect(),
        message: format!(
            "{} has been {} for {} minutes",
            service_name,
            run.last().map(|r| r.status.as_str()).unwrap_or("unhealthy"),
            span_ms / MINUTE_MS
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HealthStatus;

    fn record(id: &str, status: HealthStatus, checked_at: u64) -> HealthRecord {
        HealthRecord {
            record_id: id.to_string(),
            service_name: "google-ads".to_string(),
            status,
            latency_ms: 120.0,
            message: None,
            alert_sent: false,
            checked_at,
        }
    }

    #[test]
    fn test_single_blip_does_not_alert() {
        let history = vec![
            record("a", HealthStatus::Healthy, 0),
            record("b", HealthStatus::Unhealthy, MINUTE_MS),
        ];
        assert!(detect_transition("google-ads", &history, &DetectorConfig::default()).is_none());
    }

    #[test]
    fn test_sustained_failure_raises_one_down_candidate() {
        let history = vec![
            record("a", HealthStatus::Healthy, 0),
            record("b", HealthStatus::Unhealthy, MINUTE_MS),
            record("c", HealthStatus::Unhealthy, 7 * MINUTE_MS),
        ];
        let candidate =
            detect_transition("google-ads", &history, &DetectorConfig::default()).unwrap();
        assert_eq!(candidate.kind, AlertKind::Down);
        assert_eq!(candidate.record_ids, vec!["b", "c"]);
        assert_eq!(candidate.previous_status, Some(HealthStatus::Healthy));
    }

    #[test]
    fn test_short_run_does_not_alert() {
        // two samples only 2 minutes apart: dense enough, not long enough
        let history = vec![
            record("a", HealthStatus::Healthy, 0),
            record("b", HealthStatus::Unhealthy, MINUTE_MS),
            record("c", HealthStatus::Unhealthy, 3 * MINUTE_MS),
        ];
        assert!(detect_transition("google-ads", &history, &DetectorConfig::default()).is_none());
    }

    #[test]
    fn test_alerted_run_is_not_raised_again() {
        let mut history = vec![
            record("a", HealthStatus::Healthy, 0),
            record("b", HealthStatus::Unhealthy, MINUTE_MS),
            record("c", HealthStatus::Unhealthy, 7 * MINUTE_MS),
            record("d", HealthStatus::Unhealthy, 12 * MINUTE_MS),
        ];
        history[1].alert_sent = true;
        history[2].alert_sent = true;
        assert!(detect_transition("google-ads", &history, &DetectorConfig::default()).is_none());
    }

    #[test]
    fn test_degraded_counts_as_failure() {
        let history = vec![
            record("a", HealthStatus::Healthy, 0),
            record("b", HealthStatus::Degraded, MINUTE_MS),
            record("c", HealthStatus::Unhealthy, 8 * MINUTE_MS),
        ];
        let candidate =
            detect_transition("google-ads", &history, &DetectorConfig::default()).unwrap();
        assert_eq!(candidate.kind, AlertKind::Down);
    }

    #[test]
    fn test_recovery_fires_immediately_with_downtime() {
        let history = vec![
            record("a", HealthStatus::Healthy, 0),
            record("b", HealthStatus::Unhealthy, MINUTE_MS),
            record("c", HealthStatus::Unhealthy, 7 * MINUTE_MS),
            record("d", HealthStatus::Healthy, 11 * MINUTE_MS),
        ];
        let candidate =
            detect_transition("google-ads", &history, &DetectorConfig::default()).unwrap();
        assert_eq!(candidate.kind, AlertKind::Recovered);
        assert_eq!(candidate.downtime_ms, Some(10 * MINUTE_MS));
        assert_eq!(candidate.record_ids, vec!["d"]);
    }

    #[test]
    fn test_steady_healthy_history_is_quiet() {
        let history = vec![
            record("a", HealthStatus::Healthy, 0),
            record("b", HealthStatus::Healthy, MINUTE_MS),
        ];
        assert!(detect_transition("google-ads", &history, &DetectorConfig::default()).is_none());
    }
}
