// Alerter - preference filtering, cooldown gating, webhook dispatch
//
// Cooldown state lives in storage: the gate reads the most recent record
// marked alert_sent rather than any process-local timestamp, so concurrent
// isolates agree on it.

use crate::services::core::infrastructure::HealthRecordStore;
use crate::types::{AlertCandidate, AlertKind, MonitoringPreference};
use crate::utils::logger::Logger;
use crate::utils::time::{current_timestamp_ms, MINUTE_MS};
use crate::utils::{DashboardError, DashboardResult};
use serde::Serialize;
use worker::{Fetch, Headers, Method, Request, RequestInit};

#[derive(Debug, Clone)]
pub struct AlerterConfig {
    /// Minimum spacing between two notification batches, across all services.
    pub cooldown_minutes: u64,
}

impl Default for AlerterConfig {
    fn default() -> Self {
        Self {
            cooldown_minutes: 15,
        }
    }
}

/// What happened to this cycle's candidates.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    pub raised: usize,
    pub dispatched: usize,
    pub dropped_by_cooldown: usize,
    pub filtered_out: usize,
}

pub struct Alerter {
    config: AlerterConfig,
    store: HealthRecordStore,
    webhook_url: String,
    logger: Logger,
}

impl Alerter {
    pub fn new(
        config: AlerterConfig,
        store: HealthRecordStore,
        webhook_url: String,
        logger: Logger,
    ) -> Self {
        Self {
            config,
            store,
            webhook_url,
            logger,
        }
    }

    /// Filter candidates by user opt-in, gate the batch on the global
    /// cooldown, dispatch once, and mark the contributing records.
    /// Candidates suppressed by cooldown are dropped, not queued; a
    /// still-down service is re-raised by the detector on a later cycle.
    pub async fn dispatch(
        &self,
        candidates: Vec<AlertCandidate>,
        preferences: &[MonitoringPreference],
    ) -> DashboardResult<DispatchReport> {
        let raised = candidates.len();
        let notifiable: Vec<AlertCandidate> = candidates
            .into_iter()
            .filter(|candidate| has_subscriber(candidate, preferences))
            .collect();
        let filtered_out = raised - notifiable.len();

        if notifiable.is_empty() {
            return Ok(DispatchReport {
                raised,
                dispatched: 0,
                dropped_by_cooldown: 0,
                filtered_out,
            });
        }

        let now_ms = current_timestamp_ms();
        let last_sent = self.store.latest_alert_sent_at().await?;
        if cooldown_active(last_sent, now_ms, self.config.cooldown_minutes) {
            self.logger.info(&format!(
                "Cooldown active; dropping {} alert candidate(s)",
                notifiable.len()
            ));
            return Ok(DispatchReport {
                raised,
                dispatched: 0,
                dropped_by_cooldown: notifiable.len(),
                filtered_out,
            });
        }

        self.send_batch(&notifiable).await?;

        let record_ids: Vec<String> = notifiable
            .iter()
            .flat_map(|candidate| candidate.record_ids.iter().cloned())
            .collect();
        self.store.mark_alert_sent(&record_ids).await?;

        self.logger.info(&format!(
            "Dispatched alert batch with {} candidate(s)",
            notifiable.len()
        ));

        Ok(DispatchReport {
            raised,
            dispatched: notifiable.len(),
            dropped_by_cooldown: 0,
            filtered_out,
        })
    }

    async fn send_batch(&self, candidates: &[AlertCandidate]) -> DashboardResult<()> {
        let lines: Vec<String> = candidates
            .iter()
            .map(|candidate| match candidate.kind {
                AlertKind::Down => format!("🔴 {}", candidate.message),
                AlertKind::Recovered => format!("🟢 {}", candidate.message),
            })
            .collect();

        let body = serde_json::json!({
            "text": lines.join("\n"),
            "alerts": candidates,
        });

        let mut headers = Headers::new();
        headers.set("Content-Type", "application/json")?;

        let request = Request::new_with_init(
            &self.webhook_url,
            RequestInit::new()
                .with_method(Method::Post)
                .with_headers(headers)
                .with_body(Some(body.to_string().into())),
        )?;

        let response = Fetch::Request(request).send().await.map_err(|e| {
            DashboardError::internal_error(format!("Alert webhook unreachable: {}", e))
        })?;

        if !(200..300).contains(&response.status_code()) {
            return Err(DashboardError::internal_error(format!(
                "Alert webhook rejected batch (HTTP {})",
                response.status_code()
            )));
        }

        Ok(())
    }
}

/// The batch gate. Spacing is global: the most recent dispatched batch for
/// any service suppresses new batches for every service.
pub fn cooldown_active(last_sent_at: Option<u64>, now_ms: u64, cooldown_minutes: u64) -> bool {
    match last_sent_at {
        Some(last_sent) => now_ms.saturating_sub(last_sent) < cooldown_minutes * MINUTE_MS,
        None => false,
    }
}

pub fn has_subscriber(candidate: &AlertCandidate, preferences: &[MonitoringPreference]) -> bool {
    preferences
        .iter()
        .filter(|pref| pref.service_name == candidate.service_name)
        .any(|pref| match candidate.kind {
            AlertKind::Down => pref.notify_on_down,
            AlertKind::Recovered => pref.notify_on_recovery,
        })
}
