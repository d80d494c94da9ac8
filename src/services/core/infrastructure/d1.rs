//! D1 Database Service Module
//!
//! Thin interface over the Cloudflare D1 binding: prepared statements with
//! typed row deserialization and uniform error mapping.

use crate::utils::{DashboardError, DashboardResult};
use serde::Deserialize;
use worker::wasm_bindgen::JsValue;
use worker::{D1Database, Env};

pub const D1_BINDING: &str = "MetricEdgeDB";

pub struct D1Service {
    database: D1Database,
}

impl D1Service {
    pub fn new(env: &Env) -> DashboardResult<Self> {
        let database = env.d1(D1_BINDING).map_err(|e| {
            DashboardError::database_error(format!("Failed to get D1 database: {}", e))
        })?;

        Ok(Self { database })
    }

    pub fn from_database(database: D1Database) -> Self {
        Self { database }
    }

    /// Execute a query and return the first result row, if any.
    pub async fn query_first<T>(&self, query: &str, params: &[JsValue]) -> DashboardResult<Option<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        let statement = self
            .database
            .prepare(query)
            .bind(params)
            .map_err(|e| DashboardError::database_error(format!("D1 bind failed: {}", e)))?;

        statement
            .first::<T>(None)
            .await
            .map_err(|e| DashboardError::database_error(format!("D1 query failed: {}", e)))
    }

    /// Execute a query and return all result rows.
    pub async fn query_all<T>(&self, query: &str, params: &[JsValue]) -> DashboardResult<Vec<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        let statement = self
            .database
            .prepare(query)
            .bind(params)
            .map_err(|e| DashboardError::database_error(format!("D1 bind failed: {}", e)))?;

        let result = statement
            .all()
            .await
            .map_err(|e| DashboardError::database_error(format!("D1 query failed: {}", e)))?;

        result.results::<T>().map_err(|e| {
            DashboardError::database_error(format!("D1 result parsing failed: {}", e))
        })
    }

    /// Execute a write statement (INSERT, UPDATE, DELETE); returns changed rows.
    pub async fn execute(&self, query: &str, params: &[JsValue]) -> DashboardResult<u64> {
        let statement = self
            .database
            .prepare(query)
            .bind(params)
            .map_err(|e| DashboardError::database_error(format!("D1 bind failed: {}", e)))?;

        let result = statement
            .run()
            .await
            .map_err(|e| DashboardError::database_error(format!("D1 execute failed: {}", e)))?;

        let changes = result
            .meta()
            .ok()
            .flatten()
            .and_then(|meta| meta.changes)
            .unwrap_or(0);

        Ok(changes as u64)
    }

    /// Connectivity probe used by the health endpoints and the poller.
    pub async fn health_check(&self) -> DashboardResult<bool> {
        let probe: Option<serde_json::Value> = self.query_first("SELECT 1 AS ok", &[]).await?;
        Ok(probe.is_some())
    }
}
