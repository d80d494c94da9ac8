// Service container - per-request wiring of services from the Worker Env

use crate::services::core::analytics::{AnalyticsConfig, AnalyticsService};
use crate::services::core::infrastructure::{
    D1Service, HealthRecordStore, IntegrationRepository, SnapshotStore,
};
use crate::services::core::monitoring::{
    build_catalog, Alerter, AlerterConfig, DetectorConfig, HealthPoller, MonitorConfig,
    MonitoringService,
};
use crate::services::core::platforms::PlatformFunctionClient;
use crate::utils::crypto::CredentialCipher;
use crate::utils::logger::{LogLevel, Logger};
use crate::utils::{DashboardError, DashboardResult};
use std::sync::Arc;
use worker::Env;

fn required_var(env: &Env, name: &str) -> DashboardResult<String> {
    env.var(name)
        .map(|v| v.to_string())
        .map_err(|_| DashboardError::config_error(format!("Missing {}", name)))
}

/// Builds every service from bindings and environment variables. Cheap
/// enough to construct per request; all durable state lives in D1.
pub struct ServiceContainer {
    pub analytics: AnalyticsService,
    pub monitoring: MonitoringService,
    pub d1: Arc<D1Service>,
    pub logger: Logger,
}

impl ServiceContainer {
    pub fn from_env(env: &Env) -> DashboardResult<Self> {
        let d1 = Arc::new(D1Service::new(env)?);

        let platform_fn_base_url = required_var(env, "PLATFORM_FN_BASE_URL")?;
        let identity_api_url = required_var(env, "IDENTITY_API_URL")?;
        let alert_webhook_url = required_var(env, "ALERT_WEBHOOK_URL")?;
        let encryption_key = required_var(env, "CREDENTIALS_ENCRYPTION_KEY")?;

        let log_level = env
            .var("LOG_LEVEL")
            .map(|v| v.to_string())
            .unwrap_or_else(|_| "info".to_string());
        let logger = Logger::new(LogLevel::from_string(&log_level));

        let analytics = AnalyticsService::new(
            AnalyticsConfig::default(),
            IntegrationRepository::new(d1.clone()),
            SnapshotStore::new(d1.clone()),
            PlatformFunctionClient::new(platform_fn_base_url.clone()),
            CredentialCipher::new(encryption_key),
            logger.clone(),
        );

        let monitor_config = MonitorConfig::default();
        let poller = HealthPoller::new(
            monitor_config,
            HealthRecordStore::new(d1.clone()),
            d1.clone(),
            build_catalog(&platform_fn_base_url, &identity_api_url),
            logger.clone(),
        );
        let alerter = Alerter::new(
            AlerterConfig::default(),
            HealthRecordStore::new(d1.clone()),
            alert_webhook_url,
            logger.clone(),
        );
        let monitoring = MonitoringService::new(
            poller,
            alerter,
            HealthRecordStore::new(d1.clone()),
            IntegrationRepository::new(d1.clone()),
            DetectorConfig::default(),
            logger.clone(),
        );

        Ok(Self {
            analytics,
            monitoring,
            d1,
            logger,
        })
    }
}
