// Integration & monitoring-preference repositories
//
// Both tables are owned by the surrounding CRUD system. This engine reads
// them as inputs; the only write it ever performs is the last_synced_at
// touch after a sync attempt.

use super::d1::D1Service;
use crate::types::{Integration, MonitoringPreference, PlatformId};
use crate::utils::{DashboardError, DashboardResult};
use serde::Deserialize;
use std::sync::Arc;
use worker::wasm_bindgen::JsValue;

#[derive(Debug, Deserialize)]
struct IntegrationRow {
    client_id: String,
    platform: String,
    connected: u64,
    credentials_enc: String,
    last_synced_at: Option<u64>,
}

impl IntegrationRow {
    fn into_integration(self) -> DashboardResult<Integration> {
        let platform = PlatformId::parse(&self.platform).ok_or_else(|| {
            DashboardError::storage_error(format!("Unknown platform in row: {}", self.platform))
        })?;

        Ok(Integration {
            client_id: self.client_id,
            platform,
            connected: self.connected != 0,
            credentials_enc: self.credentials_enc,
            last_synced_at: self.last_synced_at,
        })
    }
}

#[derive(Debug, Deserialize)]
struct PreferenceRow {
    user_id: String,
    service_name: String,
    notify_on_down: u64,
    notify_on_recovery: u64,
}

#[derive(Debug, Deserialize)]
struct ClientIdRow {
    client_id: String,
}

#[derive(Debug, Deserialize)]
struct PlatformRow {
    platform: String,
}

pub struct IntegrationRepository {
    d1: Arc<D1Service>,
}

impl IntegrationRepository {
    pub fn new(d1: Arc<D1Service>) -> Self {
        Self { d1 }
    }

    /// Integrations with connected = true for one client.
    pub async fn connected_integrations(
        &self,
        client_id: &str,
    ) -> DashboardResult<Vec<Integration>> {
        let rows: Vec<IntegrationRow> = self
            .d1
            .query_all(
                "SELECT client_id, platform, connected, credentials_enc, last_synced_at \
                 FROM client_integrations WHERE client_id = ?1 AND connected = 1 \
                 ORDER BY platform",
                &[JsValue::from(client_id)],
            )
            .await?;

        rows.into_iter().map(IntegrationRow::into_integration).collect()
    }

    pub async fn get(
        &self,
        client_id: &str,
        platform: PlatformId,
    ) -> DashboardResult<Option<Integration>> {
        let row: Option<IntegrationRow> = self
            .d1
            .query_first(
                "SELECT client_id, platform, connected, credentials_enc, last_synced_at \
                 FROM client_integrations WHERE client_id = ?1 AND platform = ?2",
                &[JsValue::from(client_id), JsValue::from(platform.as_str())],
            )
            .await?;

        row.map(IntegrationRow::into_integration).transpose()
    }

    /// Every client with at least one connected platform; the daily sync
    /// sweep iterates this set.
    pub async fn active_client_ids(&self) -> DashboardResult<Vec<String>> {
        let rows: Vec<ClientIdRow> = self
            .d1
            .query_all(
                "SELECT DISTINCT client_id FROM client_integrations \
                 WHERE connected = 1 ORDER BY client_id",
                &[],
            )
            .await?;

        Ok(rows.into_iter().map(|r| r.client_id).collect())
    }

    /// Platforms referenced by at least one connected integration, across
    /// all clients. Defines the alerting scope of the health monitor.
    pub async fn connected_platforms(&self) -> DashboardResult<Vec<PlatformId>> {
        let rows: Vec<PlatformRow> = self
            .d1
            .query_all(
                "SELECT DISTINCT platform FROM client_integrations WHERE connected = 1",
                &[],
            )
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|r| PlatformId::parse(&r.platform))
            .collect())
    }

    pub async fn touch_last_synced(
        &self,
        client_id: &str,
        platform: PlatformId,
        now_ms: u64,
    ) -> DashboardResult<()> {
        self.d1
            .execute(
                "UPDATE client_integrations SET last_synced_at = ?1 \
                 WHERE client_id = ?2 AND platform = ?3",
                &[
                    JsValue::from(now_ms as f64),
                    JsValue::from(client_id),
                    JsValue::from(platform.as_str()),
                ],
            )
            .await?;

        Ok(())
    }

    /// All alert opt-ins. The alerter filters candidates against these.
    pub async fn monitoring_preferences(&self) -> DashboardResult<Vec<MonitoringPreference>> {
        let rows: Vec<PreferenceRow> = self
            .d1
            .query_all(
                "SELECT user_id, service_name, notify_on_down, notify_on_recovery \
                 FROM monitoring_preferences",
                &[],
            )
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| MonitoringPreference {
                user_id: r.user_id,
                service_name: r.service_name,
                notify_on_down: r.notify_on_down != 0,
                notify_on_recovery: r.notify_on_recovery != 0,
            })
            .collect())
    }
}
