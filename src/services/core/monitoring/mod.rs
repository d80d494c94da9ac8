// Monitoring - health polling, outage detection, alert dispatch

pub mod alerter;
pub mod health_poller;
pub mod outage_detector;

pub use alerter::{cooldown_active, has_subscriber, Alerter, AlerterConfig, DispatchReport};
pub use health_poller::{build_catalog, HealthPoller, MonitorConfig, ProbeTarget, ServiceProbe};
pub use outage_detector::{detect_transition, DetectorConfig};

use crate::services::core::infrastructure::{HealthRecordStore, IntegrationRepository};
use crate::types::AlertCandidate;
use crate::utils::logger::Logger;
use crate::utils::DashboardResult;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct MonitorCycleReport {
    pub services_polled: usize,
    pub alerts: DispatchReport,
}

/// One full monitor cycle: poll, detect, alert. Runs from the scheduled
/// event and from the manual trigger route; both paths are idempotent with
/// respect to the stored history.
pub struct MonitoringService {
    poller: HealthPoller,
    alerter: Alerter,
    store: HealthRecordStore,
    integrations: IntegrationRepository,
    detector_config: DetectorConfig,
    logger: Logger,
}

impl MonitoringService {
    pub fn new(
        poller: HealthPoller,
        alerter: Alerter,
        store: HealthRecordStore,
        integrations: IntegrationRepository,
        detector_config: DetectorConfig,
        logger: Logger,
    ) -> Self {
        Self {
            poller,
            alerter,
            store,
            integrations,
            detector_config,
            logger,
        }
    }

    pub async fn run_cycle(&self) -> DashboardResult<MonitorCycleReport> {
        let records = self.poller.poll_all().await?;
        self.logger
            .info(&format!("Health cycle polled {} services", records.len()));

        // Alerting scope: system set plus platforms with a connected
        // integration. The rest of the catalog is informational only.
        let mut monitored: Vec<String> = health_poller::SYSTEM_SERVICES
            .iter()
            .map(|s| s.to_string())
            .collect();
        for platform in self.integrations.connected_platforms().await? {
            monitored.push(platform.as_str().to_string());
        }

        let scan_limit = self.poller.config().history_scan_limit;
        let mut candidates: Vec<AlertCandidate> = Vec::new();
        for service_name in &monitored {
            let history = self
                .store
                .recent_for_service(service_name, scan_limit)
                .await?;
            if let Some(candidate) =
                detect_transition(service_name, &history, &self.detector_config)
            {
                self.logger.info(&format!(
                    "Transition detected for {}: {:?}",
                    service_name, candidate.kind
                ));
                candidates.push(candidate);
            }
        }

        let preferences = self.integrations.monitoring_preferences().await?;
        let alerts = self.alerter.dispatch(candidates, &preferences).await?;

        Ok(MonitorCycleReport {
            services_polled: records.len(),
            alerts,
        })
    }
}
