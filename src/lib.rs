use worker::*;

// Module declarations
pub mod handlers;
pub mod middleware;
pub mod responses;
pub mod services;
pub mod types;
pub mod utils;

use handlers::{
    handle_detailed_health_check, handle_health_check, handle_monitor_run, handle_overview,
    handle_platform_metrics, handle_sync,
};
use services::ServiceContainer;
use types::DateRange;

#[cfg(target_arch = "wasm32")]
use worker::console_log;

#[cfg(not(target_arch = "wasm32"))]
macro_rules! console_log {
    ($($arg:tt)*) => {
        println!($($arg)*)
    };
}

/// Cron expression of the daily full-sync schedule; every other schedule
/// runs a health-monitor cycle.
const DAILY_SYNC_CRON: &str = "0 2 * * *";

#[event(fetch)]
pub async fn main(req: Request, env: Env, _ctx: Context) -> Result<Response> {
    utils::logger::set_panic_hook();

    let url = req.url()?;
    let path = url.path();
    let method = req.method();

    console_log!("Request: {} {}", method, path);

    // Handle preflight requests
    if method == Method::Options {
        let mut cors_headers = Headers::new();
        cors_headers.set("Access-Control-Allow-Origin", "*")?;
        cors_headers.set(
            "Access-Control-Allow-Methods",
            "GET, POST, PUT, DELETE, OPTIONS",
        )?;
        cors_headers.set(
            "Access-Control-Allow-Headers",
            "Content-Type, Authorization",
        )?;
        return Ok(Response::empty()?.with_headers(cors_headers));
    }

    let response = match (method.clone(), path) {
        // Health endpoints - no authentication
        (Method::Get, "/api/v1/health") => handle_health_check(req, env).await,
        (Method::Get, "/api/v1/health/detailed") => handle_detailed_health_check(req, env).await,

        // Analytics endpoints
        (Method::Get, "/api/v1/analytics/overview") => handle_overview(req, env).await,
        (Method::Get, "/api/v1/analytics/platform") => handle_platform_metrics(req, env).await,
        (Method::Post, "/api/v1/analytics/sync") => handle_sync(req, env).await,

        // Monitoring
        (Method::Post, "/api/v1/monitor/run") => handle_monitor_run(req, env).await,

        _ => {
            console_log!("Route not found: {} {}", method, path);
            Response::error("Not Found", 404)
        }
    };

    response.and_then(middleware::cors::add_cors_headers)
}

#[event(scheduled)]
pub async fn scheduled(event: ScheduledEvent, env: Env, _ctx: ScheduleContext) {
    utils::logger::set_panic_hook();
    console_log!("Scheduled event triggered: {}", event.cron());

    let container = match ServiceContainer::from_env(&env) {
        Ok(container) => container,
        Err(error) => {
            console_log!("Scheduled run aborted, container setup failed: {}", error);
            return;
        }
    };

    if event.cron() == DAILY_SYNC_CRON {
        match container.analytics.sync_all_clients(&DateRange::default()).await {
            Ok(summaries) => {
                console_log!("Daily sync completed for {} clients", summaries.len())
            }
            Err(error) => console_log!("Daily sync failed: {}", error),
        }
    } else {
        match container.monitoring.run_cycle().await {
            Ok(report) => console_log!(
                "Monitor cycle: {} services polled, {} alert(s) dispatched",
                report.services_polled,
                report.alerts.dispatched
            ),
            Err(error) => console_log!("Monitor cycle failed: {}", error),
        }
    }
}
