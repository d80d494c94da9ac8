use super::{error_response, query_flag, query_param, range_from_query};
use crate::middleware::auth::authenticate;
use crate::responses::ApiResponse;
use crate::services::ServiceContainer;
use crate::types::{DateRange, PlatformId};
use crate::utils::DashboardError;
use serde::Deserialize;
use worker::{Env, Request, Response, Result};

#[derive(Deserialize)]
struct SyncRequestBody {
    client_id: String,
    start_date: Option<String>,
    end_date: Option<String>,
}

/// GET /api/v1/analytics/overview
pub async fn handle_overview(req: Request, env: Env) -> Result<Response> {
    if let Err(err) = authenticate(&req, &env).await {
        return error_response(err);
    }

    let url = req.url()?;
    let client_id = match query_param(&url, "clientId") {
        Some(client_id) if !client_id.trim().is_empty() => client_id,
        _ => return error_response(DashboardError::validation_error("clientId is required")),
    };
    let range = range_from_query(&url);
    let force_refresh = query_flag(&url, "forceRefresh");

    let container = match ServiceContainer::from_env(&env) {
        Ok(container) => container,
        Err(err) => return error_response(err),
    };

    match container
        .analytics
        .overview(&client_id, &range, force_refresh)
        .await
    {
        Ok(overview) => Response::from_json(&ApiResponse::success(overview)),
        Err(err) => error_response(err),
    }
}

/// GET /api/v1/analytics/platform
pub async fn handle_platform_metrics(req: Request, env: Env) -> Result<Response> {
    if let Err(err) = authenticate(&req, &env).await {
        return error_response(err);
    }

    let url = req.url()?;
    let client_id = match query_param(&url, "clientId") {
        Some(client_id) if !client_id.trim().is_empty() => client_id,
        _ => return error_response(DashboardError::validation_error("clientId is required")),
    };
    let platform = match query_param(&url, "platform").as_deref().and_then(PlatformId::parse) {
        Some(platform) => platform,
        None => {
            return error_response(DashboardError::validation_error(
                "platform is missing or unknown",
            ))
        }
    };
    let range = range_from_query(&url);
    let force_refresh = query_flag(&url, "forceRefresh");

    let container = match ServiceContainer::from_env(&env) {
        Ok(container) => container,
        Err(err) => return error_response(err),
    };

    match container
        .analytics
        .platform_metrics(&client_id, platform, &range, force_refresh)
        .await
    {
        Ok(read) => Response::from_json(&ApiResponse::success(read)),
        Err(err) => error_response(err),
    }
}

/// POST /api/v1/analytics/sync
pub async fn handle_sync(mut req: Request, env: Env) -> Result<Response> {
    if let Err(err) = authenticate(&req, &env).await {
        return error_response(err);
    }

    let body: SyncRequestBody = match req.json().await {
        Ok(body) => body,
        Err(_) => {
            return error_response(DashboardError::validation_error(
                "Request body must be JSON with a client_id",
            ))
        }
    };
    if body.client_id.trim().is_empty() {
        return error_response(DashboardError::validation_error("client_id is required"));
    }

    let range = match (body.start_date, body.end_date) {
        (Some(start), Some(end)) => DateRange::new(start, end),
        _ => DateRange::default(),
    };

    let container = match ServiceContainer::from_env(&env) {
        Ok(container) => container,
        Err(err) => return error_response(err),
    };

    match container.analytics.sync_client(&body.client_id, &range).await {
        Ok(summary) => Response::from_json(&ApiResponse::success(summary)),
        Err(err) => error_response(err),
    }
}
