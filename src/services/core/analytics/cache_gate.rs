// Cache Gate - pure freshness decisions for snapshot-backed reads
//
// The gate never touches storage or the network; callers hand it the
// snapshots they already read and act on the decision.

use crate::types::{PlatformId, Snapshot};
use crate::utils::time::MINUTE_MS;

/// Freshness window applied uniformly across platforms.
pub const FRESHNESS_WINDOW_MINUTES: u64 = 15;

/// True while the snapshot's age is strictly inside the window. Monotonic:
/// once stale at a given `now_ms`, no later `now_ms` makes it fresh again.
pub fn is_fresh(updated_at_ms: u64, now_ms: u64, window_minutes: u64) -> bool {
    now_ms.saturating_sub(updated_at_ms) < window_minutes * MINUTE_MS
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDecision {
    ServeCached,
    Refresh(RefreshReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    Forced,
    NoSnapshots,
    MissingPlatforms,
    StaleSnapshot,
}

/// Gate a full-overview read. Cached data is served only when every connected
/// platform is represented and the oldest contributing snapshot is fresh;
/// `force_refresh` bypasses the gate regardless of age.
pub fn decide(
    snapshots: &[Snapshot],
    connected: &[PlatformId],
    force_refresh: bool,
    now_ms: u64,
    window_minutes: u64,
) -> CacheDecision {
    if force_refresh {
        return CacheDecision::Refresh(RefreshReason::Forced);
    }

    if snapshots.is_empty() {
        return CacheDecision::Refresh(RefreshReason::NoSnapshots);
    }

    let covered = |platform: &PlatformId| snapshots.iter().any(|s| s.platform == *platform);
    if !connected.iter().all(covered) {
        return CacheDecision::Refresh(RefreshReason::MissingPlatforms);
    }

    let oldest = snapshots
        .iter()
        .map(|s| s.updated_at)
        .min()
        .unwrap_or(0);
    if !is_fresh(oldest, now_ms, window_minutes) {
        return CacheDecision::Refresh(RefreshReason::StaleSnapshot);
    }

    CacheDecision::ServeCached
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AdsMetrics, NormalizedMetrics};

    fn snapshot(platform: PlatformId, updated_at: u64) -> Snapshot {
        let payload = NormalizedMetrics::Ads(AdsMetrics {
            spend: 10.0,
            impressions: 100,
            clicks: 10,
            conversions: 1,
            conversion_value: 30.0,
        });
        Snapshot {
            client_id: "client-1".to_string(),
            platform,
            metrics: payload.summary(),
            payload,
            snapshot_date: "2024-05-01".to_string(),
            updated_at,
        }
    }

    #[test]
    fn test_is_fresh_window_boundary() {
        let now = 100 * MINUTE_MS;
        assert!(is_fresh(now - 14 * MINUTE_MS, now, 15));
        assert!(!is_fresh(now - 15 * MINUTE_MS, now, 15));
    }

    #[test]
    fn test_is_fresh_monotonic() {
        let updated_at = 50 * MINUTE_MS;
        let mut was_fresh = true;
        for elapsed_minutes in 0..60 {
            let fresh = is_fresh(updated_at, updated_at + elapsed_minutes * MINUTE_MS, 15);
            // increasing elapsed time never flips stale back to fresh
            assert!(!(fresh && !was_fresh));
            was_fresh = fresh;
        }
        assert!(!was_fresh);
    }

    #[test]
    fn test_force_refresh_bypasses_fresh_cache() {
        let now = 100 * MINUTE_MS;
        let snapshots = vec![snapshot(PlatformId::GoogleAds, now - MINUTE_MS)];
        let connected = vec![PlatformId::GoogleAds];

        assert_eq!(
            decide(&snapshots, &connected, true, now, 15),
            CacheDecision::Refresh(RefreshReason::Forced)
        );
        assert_eq!(
            decide(&snapshots, &connected, false, now, 15),
            CacheDecision::ServeCached
        );
    }

    #[test]
    fn test_missing_platform_forces_refresh() {
        let now = 100 * MINUTE_MS;
        let snapshots = vec![snapshot(PlatformId::GoogleAds, now - MINUTE_MS)];
        let connected = vec![PlatformId::GoogleAds, PlatformId::Shopify];

        assert_eq!(
            decide(&snapshots, &connected, false, now, 15),
            CacheDecision::Refresh(RefreshReason::MissingPlatforms)
        );
    }

    #[test]
    fn test_oldest_snapshot_governs_overview_gate() {
        let now = 100 * MINUTE_MS;
        let snapshots = vec![
            snapshot(PlatformId::GoogleAds, now - MINUTE_MS),
            snapshot(PlatformId::Shopify, now - 20 * MINUTE_MS),
        ];
        let connected = vec![PlatformId::GoogleAds, PlatformId::Shopify];

        assert_eq!(
            decide(&snapshots, &connected, false, now, 15),
            CacheDecision::Refresh(RefreshReason::StaleSnapshot)
        );
    }

    #[test]
    fn test_empty_store_refreshes() {
        assert_eq!(
            decide(&[], &[PlatformId::GoogleAds], false, MINUTE_MS, 15),
            CacheDecision::Refresh(RefreshReason::NoSnapshots)
        );
    }
}
