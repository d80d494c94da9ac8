use super::error_response;
use crate::middleware::auth::authenticate;
use crate::responses::ApiResponse;
use crate::services::core::infrastructure::D1Service;
use crate::services::ServiceContainer;
use worker::{Env, Request, Response, Result};

const SERVICE_NAME: &str = "MetricEdge Analytics API";
const SERVICE_VERSION: &str = "1.0.0";

/// Basic health check endpoint. Unauthenticated by design: external
/// schedulers and load balancers probe it.
pub async fn handle_health_check(_req: Request, _env: Env) -> Result<Response> {
    let response = ApiResponse::success(serde_json::json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "version": SERVICE_VERSION,
        "timestamp": chrono::Utc::now().timestamp_millis(),
        "features": [
            "analytics-aggregation",
            "snapshot-cache",
            "health-monitor"
        ]
    }));
    Response::from_json(&response)
}

/// Detailed health check endpoint that tests live dependencies
pub async fn handle_detailed_health_check(_req: Request, env: Env) -> Result<Response> {
    // Test the D1 binding with a real query
    let d1_operational = match D1Service::new(&env) {
        Ok(d1) => d1.health_check().await.unwrap_or(false),
        Err(_) => false,
    };

    // Configuration presence checks for the external collaborators
    let platform_fns_configured = env.var("PLATFORM_FN_BASE_URL").is_ok();
    let identity_configured = env.var("IDENTITY_API_URL").is_ok();
    let alerting_configured = env.var("ALERT_WEBHOOK_URL").is_ok();
    let credentials_configured = env.var("CREDENTIALS_ENCRYPTION_KEY").is_ok();

    let overall_healthy = d1_operational
        && platform_fns_configured
        && identity_configured
        && alerting_configured
        && credentials_configured;

    let response = ApiResponse::success(serde_json::json!({
        "status": if overall_healthy { "healthy" } else { "degraded" },
        "services": {
            "analytics_db": if d1_operational { "online" } else { "offline" },
            "platform_functions": if platform_fns_configured { "configured" } else { "missing" },
            "identity_api": if identity_configured { "configured" } else { "missing" },
            "alert_webhook": if alerting_configured { "configured" } else { "missing" },
            "credential_cipher": if credentials_configured { "configured" } else { "missing" }
        },
        "timestamp": chrono::Utc::now().timestamp_millis()
    }));
    Response::from_json(&response)
}

/// POST /api/v1/monitor/run - manual trigger for one monitor cycle
pub async fn handle_monitor_run(req: Request, env: Env) -> Result<Response> {
    if let Err(err) = authenticate(&req, &env).await {
        return error_response(err);
    }

    let container = match ServiceContainer::from_env(&env) {
        Ok(container) => container,
        Err(err) => return error_response(err),
    };

    match container.monitoring.run_cycle().await {
        Ok(report) => Response::from_json(&ApiResponse::success(report)),
        Err(err) => error_response(err),
    }
}
