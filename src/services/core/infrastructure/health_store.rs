// Health record store - append-only time series behind the monitor

use super::d1::D1Service;
use crate::types::{HealthRecord, HealthStatus};
use crate::utils::{DashboardError, DashboardResult};
use serde::Deserialize;
use std::sync::Arc;
use worker::wasm_bindgen::JsValue;

#[derive(Debug, Deserialize)]
struct HealthRecordRow {
    record_id: String,
    service_name: String,
    status: String,
    latency_ms: f64,
    message: Option<String>,
    alert_sent: u64,
    checked_at: u64,
}

impl HealthRecordRow {
    fn into_record(self) -> DashboardResult<HealthRecord> {
        let status = HealthStatus::parse(&self.status).ok_or_else(|| {
            DashboardError::storage_error(format!("Unknown health status: {}", self.status))
        })?;

        Ok(HealthRecord {
            record_id: self.record_id,
            service_name: self.service_name,
            status,
            latency_ms: self.latency_ms,
            message: self.message,
            alert_sent: self.alert_sent != 0,
            checked_at: self.checked_at,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TimestampRow {
    checked_at: u64,
}

pub struct HealthRecordStore {
    d1: Arc<D1Service>,
}

impl HealthRecordStore {
    pub fn new(d1: Arc<D1Service>) -> Self {
        Self { d1 }
    }

    pub async fn insert(&self, record: &HealthRecord) -> DashboardResult<()> {
        self.d1
            .execute(
                "INSERT INTO service_health_records \
                 (record_id, service_name, status, latency_ms, message, alert_sent, checked_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                &[
                    JsValue::from(record.record_id.as_str()),
                    JsValue::from(record.service_name.as_str()),
                    JsValue::from(record.status.as_str()),
                    JsValue::from(record.latency_ms),
                    match &record.message {
                        Some(message) => JsValue::from(message.as_str()),
                        None => JsValue::NULL,
                    },
                    JsValue::from(if record.alert_sent { 1.0 } else { 0.0 }),
                    JsValue::from(record.checked_at as f64),
                ],
            )
            .await?;

        Ok(())
    }

    /// Most recent records for one service, oldest first. `limit` bounds the
    /// scan; insertion order defines recency.
    pub async fn recent_for_service(
        &self,
        service_name: &str,
        limit: u32,
    ) -> DashboardResult<Vec<HealthRecord>> {
        let rows: Vec<HealthRecordRow> = self
            .d1
            .query_all(
                "SELECT record_id, service_name, status, latency_ms, message, alert_sent, checked_at \
                 FROM service_health_records WHERE service_name = ?1 \
                 ORDER BY checked_at DESC LIMIT ?2",
                &[JsValue::from(service_name), JsValue::from(limit as f64)],
            )
            .await?;

        let mut records = rows
            .into_iter()
            .map(HealthRecordRow::into_record)
            .collect::<DashboardResult<Vec<_>>>()?;
        records.reverse();
        Ok(records)
    }

    /// Timestamp of the most recent record marked alert_sent, across all
    /// services. The cooldown gate reads this instead of any in-process state.
    pub async fn latest_alert_sent_at(&self) -> DashboardResult<Option<u64>> {
        let row: Option<TimestampRow> = self
            .d1
            .query_first(
                "SELECT checked_at FROM service_health_records \
                 WHERE alert_sent = 1 ORDER BY checked_at DESC LIMIT 1",
                &[],
            )
            .await?;

        Ok(row.map(|r| r.checked_at))
    }

    pub async fn mark_alert_sent(&self, record_ids: &[String]) -> DashboardResult<()> {
        for record_id in record_ids {
            self.d1
                .execute(
                    "UPDATE service_health_records SET alert_sent = 1 WHERE record_id = ?1",
                    &[JsValue::from(record_id.as_str())],
                )
                .await?;
        }

        Ok(())
    }

    /// Retention housekeeping; returns deleted row count.
    pub async fn prune_older_than(&self, cutoff_ms: u64) -> DashboardResult<u64> {
        self.d1
            .execute(
                "DELETE FROM service_health_records WHERE checked_at < ?1",
                &[JsValue::from(cutoff_ms as f64)],
            )
            .await
    }
}
