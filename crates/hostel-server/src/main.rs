mod config;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::http::HeaderValue;
use tracing::{error, info};

use hostel_api::accounts;
use hostel_api::auth::{AppState, AppStateInner};
use hostel_api::routes;
use hostel_api::token::TokenService;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hostel=debug,hostel_api=debug,hostel_db=info,tower_http=debug".into()),
        )
        .init();

    // Config
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Refusing to start: {}", e);
            std::process::exit(1);
        }
    };

    accounts::init().map_err(|e| anyhow::anyhow!("credential setup failed: {:?}", e))?;

    // Init database
    let db = hostel_db::Database::open(&PathBuf::from(&config.db_path))?;

    if let Some(admin) = &config.bootstrap_admin {
        let created = accounts::ensure_admin(
            &db,
            &admin.name,
            &admin.email,
            &admin.roll_number,
            &admin.password,
        )
        .map_err(|e| anyhow::anyhow!("admin bootstrap failed: {}", e))?;
        if created {
            info!("Admin user created successfully");
        }
    }

    // Shared state
    let tokens = TokenService::new(
        &config.jwt_secret,
        chrono::Duration::minutes(config.token_ttl_minutes),
    );
    let state: AppState = Arc::new(AppStateInner { db, tokens });

    let cors_origin = HeaderValue::from_str(&config.cors_origin)?;
    let app = routes::router(state, cors_origin);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Hostel complaint API listening on {}", addr);
    info!("CORS origin: {}", config.cors_origin);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
