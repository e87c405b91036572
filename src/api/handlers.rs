use actix_web::{http::header::AUTHORIZATION, web, HttpRequest, HttpResponse, Result};
use tracing::info;

use crate::api::types::SnapshotResponse;
use crate::utils::validation::validate_account;
use crate::AppState;

pub async fn snapshot_default(app_state: AppState, req: HttpRequest) -> Result<HttpResponse> {
    let account = app_state.default_account.clone();
    serve_snapshot(app_state, account, req).await
}

pub async fn snapshot(
    app_state: AppState,
    path: web::Path<String>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    serve_snapshot(app_state, path.into_inner(), req).await
}

async fn serve_snapshot(
    app_state: AppState,
    account: String,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(err) = validate_account(&account) {
        return Ok(err.into());
    }

    // A caller-supplied bearer wins over the process-wide token.
    let token = bearer_token(&req).or_else(|| app_state.token.clone());
    let outcome = app_state.snapshots.get_snapshot(&account, token.as_deref()).await;

    info!("Snapshot served for {} ({:?})", account, outcome.source);
    Ok(HttpResponse::Ok().json(SnapshotResponse {
        account,
        source: outcome.source,
        snapshot: outcome.snapshot,
    }))
}

pub async fn content(app_state: AppState) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(&app_state.content))
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    let header = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    header
        .strip_prefix("token ")
        .or_else(|| header.strip_prefix("Bearer "))
        .map(str::to_string)
}
