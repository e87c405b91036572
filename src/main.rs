mod api;
mod content;
mod github;
mod snapshot;
mod utils;

use actix_files::Files;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::handlers;
use crate::github::GitHubClient;
use crate::snapshot::{RandomVisitorCounter, SnapshotService, CONTRIBUTION_DIR, DEFAULT_ACCOUNT};
use crate::utils::storage::{JsonFileStore, SystemClock};

pub type AppState = web::Data<Arc<AppData>>;

pub struct AppData {
    pub snapshots: SnapshotService,
    pub content: content::SiteContent,
    pub default_account: String,
    pub token: Option<String>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    info!("Starting GitHub snapshot service");

    let token = std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty());
    if token.is_some() {
        info!("GitHub token configured for enhanced rate limits");
    } else {
        warn!("No GitHub token configured - using anonymous access with lower rate limits");
    }

    let default_account =
        std::env::var("GITHUB_ACCOUNT").unwrap_or_else(|_| DEFAULT_ACCOUNT.to_string());
    let static_dir = PathBuf::from(
        std::env::var("STATIC_DIR").unwrap_or_else(|_| "./static".to_string()),
    );
    let cache_file = std::env::var("SNAPSHOT_CACHE_FILE")
        .unwrap_or_else(|_| "./github_snapshot_cache.json".to_string());

    let snapshots = SnapshotService::new(
        Arc::new(GitHubClient::new()),
        Arc::new(JsonFileStore::new(&cache_file)),
        Arc::new(SystemClock),
        Arc::new(RandomVisitorCounter),
        static_dir.clone(),
    );

    let app_data = Arc::new(AppData {
        snapshots,
        content: content::site_content(),
        default_account,
        token,
    });

    let port = std::env::var("PORT").unwrap_or_else(|_| "9000".to_string());
    let bind_address = format!("0.0.0.0:{}", port);

    info!("Binding to: {}", bind_address);

    let contribution_dir = static_dir.join(CONTRIBUTION_DIR);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_data.clone()))
            .wrap(Logger::default())
            .service(
                web::scope("/api")
                    .route("/snapshot", web::get().to(handlers::snapshot_default))
                    .route("/snapshot/{account}", web::get().to(handlers::snapshot))
                    .route("/content", web::get().to(handlers::content)),
            )
            .service(Files::new(
                &format!("/{}", CONTRIBUTION_DIR),
                contribution_dir.clone(),
            ))
            .service(Files::new("/static", static_dir.clone()).index_file("index.html"))
            .route("/", web::get().to(serve_index))
            .default_service(web::route().to(not_found))
    })
    .bind(&bind_address)?
    .run()
    .await
}

async fn serve_index() -> Result<HttpResponse> {
    let index_content = std::fs::read_to_string("./static/index.html").unwrap_or_else(|_| {
        r#"<!DOCTYPE html>
<html>
<head><title>GitHub Snapshot Service</title></head>
<body>
    <h1>GitHub Snapshot Service</h1>
    <p>Static files not found. Please make sure static/index.html exists.</p>
</body>
</html>"#
            .to_string()
    });

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(index_content))
}

async fn not_found() -> Result<HttpResponse> {
    Ok(HttpResponse::NotFound().json(serde_json::json!({
        "error": "Not found",
        "error_code": "NOT_FOUND"
    })))
}
