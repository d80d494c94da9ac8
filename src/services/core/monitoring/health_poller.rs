// Health Poller - fixed-catalog service probes on a schedule
//
// One probe per catalog entry per cycle, all issued concurrently and each
// bounded by its own timeout so an unreachable dependency cannot stall the
// cycle. A record is appended for every service every cycle, status change
// or not, to keep the series dense for the continuous-failure check.

use crate::services::core::infrastructure::{D1Service, HealthRecordStore};
use crate::types::{HealthRecord, HealthStatus, PlatformId};
use crate::utils::logger::Logger;
use crate::utils::time::{current_timestamp_ms, DAY_MS};
use crate::utils::DashboardResult;
use futures::future::{join_all, select, Either};
use std::sync::Arc;
use std::time::Duration;
use worker::{Fetch, Headers, Method, Request, RequestInit};

/// Always-on system entries, monitored regardless of integrations.
pub const SYSTEM_SERVICES: [&str; 2] = ["analytics-db", "identity-api"];

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub probe_timeout_ms: u64,
    pub degraded_latency_ms: f64,
    pub retention_days: u64,
    pub history_scan_limit: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: 10_000,
            degraded_latency_ms: 1_000.0,
            retention_days: 30,
            history_scan_limit: 50,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ProbeTarget {
    Http(String),
    Database,
}

#[derive(Debug, Clone)]
pub struct ServiceProbe {
    pub name: String,
    pub target: ProbeTarget,
}

/// The fixed probe catalog: every platform function plus the system set.
pub fn build_catalog(platform_fn_base_url: &str, identity_api_url: &str) -> Vec<ServiceProbe> {
    let base = platform_fn_base_url.trim_end_matches('/');
    let mut catalog: Vec<ServiceProbe> = PlatformId::all()
        .iter()
        .map(|platform| ServiceProbe {
            name: platform.as_str().to_string(),
            target: ProbeTarget::Http(format!("{}/{}/health", base, platform)),
        })
        .collect();

    catalog.push(ServiceProbe {
        name: "analytics-db".to_string(),
        target: ProbeTarget::Database,
    });
    catalog.push(ServiceProbe {
        name: "identity-api".to_string(),
        target: ProbeTarget::Http(format!(
            "{}/health",
            identity_api_url.trim_end_matches('/')
        )),
    });

    catalog
}

struct ProbeOutcome {
    service_name: String,
    status: HealthStatus,
    latency_ms: f64,
    message: Option<String>,
}

pub struct HealthPoller {
    config: MonitorConfig,
    store: HealthRecordStore,
    d1: Arc<D1Service>,
    catalog: Vec<ServiceProbe>,
    logger: Logger,
}

impl HealthPoller {
    pub fn new(
        config: MonitorConfig,
        store: HealthRecordStore,
        d1: Arc<D1Service>,
        catalog: Vec<ServiceProbe>,
        logger: Logger,
    ) -> Self {
        Self {
            config,
            store,
            d1,
            catalog,
            logger,
        }
    }

    pub fn catalog(&self) -> &[ServiceProbe] {
        &self.catalog
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Probe the whole catalog, append one record per service, prune expired
    /// history. Returns the records appended this cycle.
    pub async fn poll_all(&self) -> DashboardResult<Vec<HealthRecord>> {
        let probes = self
            .catalog
            .iter()
            .map(|probe| self.run_probe(probe))
            .collect::<Vec<_>>();
        let outcomes = join_all(probes).await;

        let now_ms = current_timestamp_ms();
        let mut records = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            let record = HealthRecord {
                record_id: uuid::Uuid::new_v4().to_string(),
                service_name: outcome.service_name,
                status: outcome.status,
                latency_ms: outcome.latency_ms,
                message: outcome.message,
                alert_sent: false,
                checked_at: now_ms,
            };
            if let Err(error) = self.store.insert(&record).await {
                self.logger.error(&format!(
                    "Health record insert failed for {}: {}",
                    record.service_name, error
                ));
            }
            records.push(record);
        }

        let cutoff = now_ms.saturating_sub(self.config.retention_days * DAY_MS);
        match self.store.prune_older_than(cutoff).await {
            Ok(0) => {}
            Ok(deleted) => self
                .logger
                .debug(&format!("Pruned {} expired health records", deleted)),
            Err(error) => self
                .logger
                .warn(&format!("Health record pruning failed: {}", error)),
        }

        Ok(records)
    }

    async fn run_probe(&self, probe: &ServiceProbe) -> ProbeOutcome {
        let started_at = current_timestamp_ms();
        let (status, message) = match &probe.target {
            ProbeTarget::Http(url) => self.probe_http(url).await,
            ProbeTarget::Database => self.probe_database().await,
        };
        let latency_ms = current_timestamp_ms().saturating_sub(started_at) as f64;

        // 2xx within budget is healthy; 2xx over budget degrades
        let status = match status {
            HealthStatus::Healthy if latency_ms > self.config.degraded_latency_ms => {
                HealthStatus::Degraded
            }
            other => other,
        };

        ProbeOutcome {
            service_name: probe.name.clone(),
            status,
            latency_ms,
            message,
        }
    }

    /// A timeout or connection failure is recorded as unhealthy, never
    /// propagated as an error.
    async fn probe_http(&self, url: &str) -> (HealthStatus, Option<String>) {
        let mut headers = Headers::new();
        if headers.set("Accept", "application/json").is_err() {
            return (HealthStatus::Unhealthy, Some("header setup failed".into()));
        }

        let request = match Request::new_with_init(
            url,
            RequestInit::new()
                .with_method(Method::Get)
                .with_headers(headers),
        ) {
            Ok(request) => request,
            Err(error) => return (HealthStatus::Unhealthy, Some(error.to_string())),
        };

        let fetch_req = Fetch::Request(request);
        let fetch = Box::pin(fetch_req.send());
        let timeout = Box::pin(worker::Delay::from(Duration::from_millis(
            self.config.probe_timeout_ms,
        )));

        let mut response = match select(fetch, timeout).await {
            Either::Left((Ok(response), _)) => response,
            Either::Left((Err(error), _)) => {
                return (HealthStatus::Unhealthy, Some(error.to_string()))
            }
            Either::Right(_) => {
                return (
                    HealthStatus::Unhealthy,
                    Some(format!("timeout after {}ms", self.config.probe_timeout_ms)),
                )
            }
        };

        if !(200..300).contains(&response.status_code()) {
            return (
                HealthStatus::Unhealthy,
                Some(format!("HTTP {}", response.status_code())),
            );
        }

        // A 2xx body may still carry a warning status
        if let Ok(body) = response.json::<serde_json::Value>().await {
            if let Some(reported) = body.get("status").and_then(|s| s.as_str()) {
                if reported != "healthy" && reported != "ok" {
                    return (HealthStatus::Degraded, Some(format!("reports {}", reported)));
                }
            }
        }

        (HealthStatus::Healthy, None)
    }

    async fn probe_database(&self) -> (HealthStatus, Option<String>) {
        match self.d1.health_check().await {
            Ok(true) => (HealthStatus::Healthy, None),
            Ok(false) => (HealthStatus::Unhealthy, Some("empty probe result".into())),
            Err(error) => (HealthStatus::Unhealthy, Some(error.to_string())),
        }
    }
}
