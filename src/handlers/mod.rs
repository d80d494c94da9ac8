pub mod analytics;
pub mod health;

pub use analytics::*;
pub use health::*;

use crate::responses::ApiResponse;
use crate::types::DateRange;
use crate::utils::DashboardError;
use worker::{Response, Result, Url};

/// Map a service error onto the response envelope with its HTTP status.
pub fn error_response(err: DashboardError) -> Result<Response> {
    let status = err.status_code();
    Ok(Response::from_json(&ApiResponse::<()>::error(err.message))?.with_status(status))
}

pub(crate) fn query_param(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.to_string())
}

pub(crate) fn query_flag(url: &Url, key: &str) -> bool {
    matches!(
        query_param(url, key).as_deref(),
        Some("true") | Some("1") | Some("yes")
    )
}

/// Date range from query params, defaulting to the trailing 30 days.
pub(crate) fn range_from_query(url: &Url) -> DateRange {
    match (
        query_param(url, "startDate"),
        query_param(url, "endDate"),
    ) {
        (Some(start), Some(end)) => DateRange::new(start, end),
        _ => DateRange::default(),
    }
}
