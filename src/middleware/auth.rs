use crate::utils::{DashboardError, DashboardResult};
use serde::Deserialize;
use worker::{Env, Fetch, Headers, Method, Request, RequestInit};

/// Verified caller identity, as reported by the identity collaborator.
#[derive(Debug, Clone)]
pub struct CallerIdentity {
    pub user_id: String,
}

#[derive(Deserialize)]
struct VerifyResponse {
    user_id: String,
}

/// Extract the bearer token from the Authorization header.
pub fn extract_bearer_token(req: &Request) -> DashboardResult<String> {
    let header = req
        .headers()
        .get("Authorization")
        .map_err(|e| DashboardError::internal_error(format!("Header read failed: {}", e)))?
        .ok_or_else(|| DashboardError::authentication_error("Missing Authorization header"))?;

    match header.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(DashboardError::authentication_error(
            "Authorization header is not a bearer token",
        )),
    }
}

/// Validate the caller's token against the external identity service. All
/// analytics routes require this; only the health endpoints skip it.
pub async fn authenticate(req: &Request, env: &Env) -> DashboardResult<CallerIdentity> {
    let token = extract_bearer_token(req)?;

    let base_url = env
        .var("IDENTITY_API_URL")
        .map_err(|_| DashboardError::config_error("Missing IDENTITY_API_URL"))?
        .to_string();
    let verify_url = format!("{}/v1/verify", base_url.trim_end_matches('/'));

    let mut headers = Headers::new();
    headers.set("Authorization", &format!("Bearer {}", token))?;
    headers.set("Accept", "application/json")?;

    let request = Request::new_with_init(
        &verify_url,
        RequestInit::new()
            .with_method(Method::Get)
            .with_headers(headers),
    )?;

    let mut response = Fetch::Request(request).send().await.map_err(|e| {
        DashboardError::internal_error(format!("Identity service unreachable: {}", e))
    })?;

    if !(200..300).contains(&response.status_code()) {
        return Err(DashboardError::authentication_error(format!(
            "Token rejected by identity service ({})",
            response.status_code()
        )));
    }

    let verified: VerifyResponse = response
        .json()
        .await
        .map_err(|e| DashboardError::internal_error(format!("Identity response parse: {}", e)))?;

    Ok(CallerIdentity {
        user_id: verified.user_id,
    })
}
