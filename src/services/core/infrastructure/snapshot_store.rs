// Snapshot Store - durable per-(client, platform) cache of normalized fetches
//
// One logical row per (client_id, platform). Writes are single-statement
// upserts, so a concurrent refresh of the same key lands either fully-old or
// fully-new, and a failed fetch never touches the previous good row.

use super::d1::D1Service;
use crate::types::{MetricsSummary, NormalizedMetrics, PlatformId, Snapshot};
use crate::utils::{DashboardError, DashboardResult};
use serde::Deserialize;
use std::sync::Arc;
use worker::wasm_bindgen::JsValue;

const UPSERT_SQL: &str = "INSERT INTO client_snapshots \
    (client_id, platform, payload, metrics, snapshot_date, updated_at) \
    VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
    ON CONFLICT(client_id, platform) DO UPDATE SET \
    payload = excluded.payload, metrics = excluded.metrics, \
    snapshot_date = excluded.snapshot_date, updated_at = excluded.updated_at";

#[derive(Debug, Deserialize)]
struct SnapshotRow {
    client_id: String,
    platform: String,
    payload: String,
    metrics: String,
    snapshot_date: String,
    updated_at: u64,
}

impl SnapshotRow {
    fn into_snapshot(self) -> DashboardResult<Snapshot> {
        let platform = PlatformId::parse(&self.platform).ok_or_else(|| {
            DashboardError::storage_error(format!("Unknown platform in row: {}", self.platform))
        })?;
        let payload: NormalizedMetrics = serde_json::from_str(&self.payload)
            .map_err(|e| DashboardError::storage_error(format!("Corrupt payload column: {}", e)))?;
        let metrics: MetricsSummary = serde_json::from_str(&self.metrics)
            .map_err(|e| DashboardError::storage_error(format!("Corrupt metrics column: {}", e)))?;

        Ok(Snapshot {
            client_id: self.client_id,
            platform,
            payload,
            metrics,
            snapshot_date: self.snapshot_date,
            updated_at: self.updated_at,
        })
    }
}

pub struct SnapshotStore {
    d1: Arc<D1Service>,
}

impl SnapshotStore {
    pub fn new(d1: Arc<D1Service>) -> Self {
        Self { d1 }
    }

    pub async fn get(
        &self,
        client_id: &str,
        platform: PlatformId,
    ) -> DashboardResult<Option<Snapshot>> {
        let row: Option<SnapshotRow> = self
            .d1
            .query_first(
                "SELECT client_id, platform, payload, metrics, snapshot_date, updated_at \
                 FROM client_snapshots WHERE client_id = ?1 AND platform = ?2",
                &[JsValue::from(client_id), JsValue::from(platform.as_str())],
            )
            .await?;

        row.map(SnapshotRow::into_snapshot).transpose()
    }

    pub async fn get_all(&self, client_id: &str) -> DashboardResult<Vec<Snapshot>> {
        let rows: Vec<SnapshotRow> = self
            .d1
            .query_all(
                "SELECT client_id, platform, payload, metrics, snapshot_date, updated_at \
                 FROM client_snapshots WHERE client_id = ?1 ORDER BY platform",
                &[JsValue::from(client_id)],
            )
            .await?;

        rows.into_iter().map(SnapshotRow::into_snapshot).collect()
    }

    /// Replace-or-insert the current snapshot for one (client, platform).
    pub async fn upsert(
        &self,
        client_id: &str,
        platform: PlatformId,
        payload: &NormalizedMetrics,
        snapshot_date: &str,
        now_ms: u64,
    ) -> DashboardResult<()> {
        let metrics = payload.summary();
        let payload_json = serde_json::to_string(payload)
            .map_err(|e| DashboardError::serialization_error(format!("payload: {}", e)))?;
        let metrics_json = serde_json::to_string(&metrics)
            .map_err(|e| DashboardError::serialization_error(format!("metrics: {}", e)))?;

        self.d1
            .execute(
                UPSERT_SQL,
                &[
                    JsValue::from(client_id),
                    JsValue::from(platform.as_str()),
                    JsValue::from(payload_json),
                    JsValue::from(metrics_json),
                    JsValue::from(snapshot_date),
                    JsValue::from(now_ms as f64),
                ],
            )
            .await?;

        Ok(())
    }
}
