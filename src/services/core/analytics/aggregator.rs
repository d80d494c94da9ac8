// Analytics Aggregator - fan-out fetch, snapshot write-back, overview math
//
// One slow or broken platform must never blank out data for healthy ones:
// adapter calls settle independently, failures degrade that platform to its
// prior snapshot, and the overview is always computed from whatever current
// snapshots exist.

use crate::services::core::analytics::cache_gate::{self, CacheDecision};
use crate::services::core::infrastructure::{IntegrationRepository, SnapshotStore};
use crate::services::core::platforms::{
    adapter_for, FetchError, FetchRequest, PlatformFunctionClient,
};
use crate::types::{
    DateRange, Integration, MetricsSummary, NormalizedMetrics, Overview, PlatformBreakdown,
    PlatformId, Snapshot, SyncFailure, SyncSummary,
};
use crate::utils::crypto::CredentialCipher;
use crate::utils::logger::Logger;
use crate::utils::{DashboardError, DashboardResult, TimeService};
use futures::future::join_all;
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    pub freshness_window_minutes: u64,
    pub default_range_days: i64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            freshness_window_minutes: cache_gate::FRESHNESS_WINDOW_MINUTES,
            default_range_days: 30,
        }
    }
}

/// Result of a single-platform read.
#[derive(Debug, Clone, Serialize)]
pub struct PlatformRead {
    pub snapshot: Snapshot,
    pub fresh: bool,
    pub refreshed: bool,
}

pub struct AnalyticsService {
    config: AnalyticsConfig,
    integrations: IntegrationRepository,
    snapshots: SnapshotStore,
    platform_client: PlatformFunctionClient,
    cipher: CredentialCipher,
    logger: Logger,
    time: TimeService,
}

impl AnalyticsService {
    pub fn new(
        config: AnalyticsConfig,
        integrations: IntegrationRepository,
        snapshots: SnapshotStore,
        platform_client: PlatformFunctionClient,
        cipher: CredentialCipher,
        logger: Logger,
    ) -> Self {
        Self {
            config,
            integrations,
            snapshots,
            platform_client,
            cipher,
            logger,
            time: TimeService::new(),
        }
    }

    /// Cross-platform overview for one client, cache-gated.
    pub async fn overview(
        &self,
        client_id: &str,
        range: &DateRange,
        force_refresh: bool,
    ) -> DashboardResult<Overview> {
        if client_id.trim().is_empty() {
            return Err(DashboardError::validation_error("clientId is required"));
        }

        let connected = self.integrations.connected_integrations(client_id).await?;
        let stored = self.snapshots.get_all(client_id).await?;

        if connected.is_empty() && stored.is_empty() {
            return Err(DashboardError::not_found(format!(
                "No connected platforms for client {}",
                client_id
            )));
        }

        let connected_ids: Vec<PlatformId> = connected.iter().map(|i| i.platform).collect();
        let now_ms = self.time.current_timestamp_ms();

        if let CacheDecision::ServeCached = cache_gate::decide(
            &stored,
            &connected_ids,
            force_refresh,
            now_ms,
            self.config.freshness_window_minutes,
        ) {
            self.logger.debug(&format!(
                "Overview cache hit for client {} ({} snapshots)",
                client_id,
                stored.len()
            ));
            return Ok(build_overview(
                client_id,
                &stored,
                now_ms,
                self.config.freshness_window_minutes,
                true,
            ));
        }

        let settled = self.refresh_platforms(&connected, range).await;
        let mut first_failure: Option<FetchError> = None;
        for (platform, result) in settled {
            match result {
                Ok(payload) => {
                    self.write_snapshot(client_id, platform, &payload).await;
                }
                Err(error) => {
                    self.logger.warn(&format!(
                        "Platform fetch degraded to stale snapshot: {}",
                        error
                    ));
                    first_failure.get_or_insert(error);
                }
            }
            // attempted syncs are recorded either way
            if let Err(error) = self
                .integrations
                .touch_last_synced(client_id, platform, now_ms)
                .await
            {
                self.logger
                    .warn(&format!("last_synced_at update failed: {}", error));
            }
        }

        let current = self.snapshots.get_all(client_id).await?;
        if current.is_empty() {
            // Every fetch failed and nothing was ever cached: zero usable data
            return Err(match first_failure {
                Some(error) => {
                    DashboardError::adapter_error(error.platform().as_str(), error.to_string())
                }
                None => DashboardError::not_found(format!(
                    "No snapshots available for client {}",
                    client_id
                )),
            });
        }

        let now_ms = self.time.current_timestamp_ms();
        Ok(build_overview(
            client_id,
            &current,
            now_ms,
            self.config.freshness_window_minutes,
            false,
        ))
    }

    /// Single-platform read with the same gate and stale-fallback semantics.
    pub async fn platform_metrics(
        &self,
        client_id: &str,
        platform: PlatformId,
        range: &DateRange,
        force_refresh: bool,
    ) -> DashboardResult<PlatformRead> {
        if client_id.trim().is_empty() {
            return Err(DashboardError::validation_error("clientId is required"));
        }

        let stored = self.snapshots.get(client_id, platform).await?;
        let now_ms = self.time.current_timestamp_ms();

        if !force_refresh {
            if let Some(snapshot) = &stored {
                if cache_gate::is_fresh(
                    snapshot.updated_at,
                    now_ms,
                    self.config.freshness_window_minutes,
                ) {
                    return Ok(PlatformRead {
                        snapshot: snapshot.clone(),
                        fresh: true,
                        refreshed: false,
                    });
                }
            }
        }

        let integration = match self.integrations.get(client_id, platform).await? {
            Some(integration) if integration.connected => integration,
            // Disconnected platforms still serve their last known good data
            _ => {
                return match stored {
                    Some(snapshot) => {
                        let fresh = cache_gate::is_fresh(
                            snapshot.updated_at,
                            now_ms,
                            self.config.freshness_window_minutes,
                        );
                        Ok(PlatformRead {
                            snapshot,
                            fresh,
                            refreshed: false,
                        })
                    }
                    None => Err(DashboardError::not_found(format!(
                        "Platform {} is not connected for client {}",
                        platform, client_id
                    ))),
                }
            }
        };
        let settled = self
            .refresh_platforms(std::slice::from_ref(&integration), range)
            .await;
        let (_, result) = settled.into_iter().next().unwrap_or((
            platform,
            Err(FetchError::Remote {
                platform,
                message: "adapter produced no result".to_string(),
            }),
        ));

        if let Err(error) = self
            .integrations
            .touch_last_synced(client_id, platform, now_ms)
            .await
        {
            self.logger
                .warn(&format!("last_synced_at update failed: {}", error));
        }

        match result {
            Ok(payload) => {
                self.write_snapshot(client_id, platform, &payload).await;
                let snapshot = self
                    .snapshots
                    .get(client_id, platform)
                    .await?
                    .ok_or_else(|| {
                        DashboardError::storage_error("Snapshot missing after upsert")
                    })?;
                Ok(PlatformRead {
                    snapshot,
                    fresh: true,
                    refreshed: true,
                })
            }
            Err(error) => match stored {
                // Prior good snapshot survives a failed refresh untouched
                Some(snapshot) => {
                    self.logger.warn(&format!(
                        "Serving stale snapshot after failed refresh: {}",
                        error
                    ));
                    Ok(PlatformRead {
                        snapshot,
                        fresh: false,
                        refreshed: false,
                    })
                }
                None => Err(DashboardError::adapter_error(
                    platform.as_str(),
                    error.to_string(),
                )),
            },
        }
    }

    /// Forced refresh of every connected platform for one client.
    pub async fn sync_client(
        &self,
        client_id: &str,
        range: &DateRange,
    ) -> DashboardResult<SyncSummary> {
        if client_id.trim().is_empty() {
            return Err(DashboardError::validation_error("clientId is required"));
        }

        let connected = self.integrations.connected_integrations(client_id).await?;
        if connected.is_empty() {
            return Err(DashboardError::not_found(format!(
                "No connected platforms for client {}",
                client_id
            )));
        }

        let now_ms = self.time.current_timestamp_ms();
        let settled = self.refresh_platforms(&connected, range).await;

        let mut synced = Vec::new();
        let mut failed = Vec::new();
        for (platform, result) in settled {
            match result {
                Ok(payload) => {
                    self.write_snapshot(client_id, platform, &payload).await;
                    synced.push(platform);
                }
                Err(error) => failed.push(SyncFailure {
                    platform,
                    message: error.to_string(),
                }),
            }
            if let Err(error) = self
                .integrations
                .touch_last_synced(client_id, platform, now_ms)
                .await
            {
                self.logger
                    .warn(&format!("last_synced_at update failed: {}", error));
            }
        }

        Ok(SyncSummary {
            client_id: client_id.to_string(),
            synced,
            failed,
            completed_at: self.time.current_timestamp_ms(),
        })
    }

    /// Daily sweep: refresh every client with at least one connected
    /// platform. Per-client failures are logged and do not stop the sweep.
    pub async fn sync_all_clients(&self, range: &DateRange) -> DashboardResult<Vec<SyncSummary>> {
        let client_ids = self.integrations.active_client_ids().await?;
        self.logger.info(&format!(
            "Starting daily sync for {} clients",
            client_ids.len()
        ));

        let mut summaries = Vec::new();
        for client_id in client_ids {
            match self.sync_client(&client_id, range).await {
                Ok(summary) => summaries.push(summary),
                Err(error) => {
                    self.logger
                        .error(&format!("Daily sync failed for {}: {}", client_id, error));
                }
            }
        }

        Ok(summaries)
    }

    /// Issue all adapter calls concurrently and wait for every one to settle.
    /// No short-circuit: a failure is carried as a value next to its siblings.
    async fn refresh_platforms(
        &self,
        integrations: &[Integration],
        range: &DateRange,
    ) -> Vec<(PlatformId, Result<NormalizedMetrics, FetchError>)> {
        let mut tasks = Vec::new();

        for integration in integrations {
            let platform = integration.platform;
            let adapter = adapter_for(&self.platform_client, platform);
            let credentials = self.cipher.decrypt(&integration.credentials_enc);
            let request = FetchRequest {
                client_id: integration.client_id.clone(),
                start_date: range.start_date.clone(),
                end_date: range.end_date.clone(),
                credentials: credentials.as_deref().unwrap_or("").to_string(),
            };
            let credential_error = credentials.err();

            let task = async move {
                if let Some(error) = credential_error {
                    return (
                        platform,
                        Err(FetchError::Malformed {
                            platform,
                            message: format!("credential decrypt: {}", error),
                        }),
                    );
                }
                (platform, adapter.fetch_metrics(&request).await)
            };
            tasks.push(task);
        }

        join_all(tasks).await
    }

    async fn write_snapshot(
        &self,
        client_id: &str,
        platform: PlatformId,
        payload: &NormalizedMetrics,
    ) {
        let snapshot_date = self.time.current_date();
        let now_ms = self.time.current_timestamp_ms();
        if let Err(error) = self
            .snapshots
            .upsert(client_id, platform, payload, &snapshot_date, now_ms)
            .await
        {
            // A write failure must not fail the request or corrupt the prior
            // row; the store's upsert is a single statement, so it cannot.
            self.logger
                .error(&format!("Snapshot upsert failed for {}: {}", platform, error));
        }
    }
}

/// Sum snapshots into the derived overview. Total by construction: an empty
/// snapshot set yields the zero-valued summary.
pub fn build_overview(
    client_id: &str,
    snapshots: &[Snapshot],
    now_ms: u64,
    window_minutes: u64,
    from_cache: bool,
) -> Overview {
    let mut totals = MetricsSummary::default();
    let mut platforms = Vec::with_capacity(snapshots.len());
    let mut stale_platforms = Vec::new();
    let mut oldest_age: Option<u64> = None;

    for snapshot in snapshots {
        totals.add(&snapshot.metrics);

        let fresh = cache_gate::is_fresh(snapshot.updated_at, now_ms, window_minutes);
        if !fresh {
            stale_platforms.push(snapshot.platform);
        }

        let age = snapshot.age_minutes(now_ms);
        oldest_age = Some(oldest_age.map_or(age, |current| current.max(age)));

        platforms.push(PlatformBreakdown {
            platform: snapshot.platform,
            metrics: snapshot.metrics,
            roas: snapshot.metrics.roas(),
            fresh,
            updated_at: snapshot.updated_at,
        });
    }

    Overview {
        client_id: client_id.to_string(),
        total_revenue: totals.revenue,
        total_spend: totals.spend,
        total_orders: totals.orders,
        total_conversions: totals.conversions,
        roi: totals.roi(),
        platforms,
        stale_platforms,
        oldest_snapshot_age_minutes: oldest_age,
        from_cache,
        generated_at: now_ms,
    }
}
