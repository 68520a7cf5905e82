//! # photogate
//!
//! Login-gated photo listing proxy.
//!
//! Users log in against a static credential file; each successful login bumps a
//! per-user counter and opens a one-hour session in Redis. Logged-in users can read a
//! third-party photo listing that is cached in Redis for all users for 30 seconds.
//!
//! ## Architecture
//!
//! - **Auth**: JSON or TOML credential list, exact username/password matching
//! - **Store**: Redis (`GET`, `SET EX`, `INCR`) behind the `KvStore` trait
//! - **Photos**: upstream listing fetched with reqwest behind the `PhotoSource` trait
//! - **HTTP**: Axum router with request IDs, tracing, and graceful shutdown

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used)]

mod auth;
mod config;
mod http;
mod photos;
mod store;

use std::sync::Arc;

use anyhow::Context;
use axum::serve;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::auth::load_credentials;
use crate::config::{AppConfig, Cli};
use crate::http::{router, AppState, Ttls};
use crate::photos::HttpPhotoSource;
use crate::store::RedisStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging().context("failed to initialize logging")?;

    let cli = Cli::parse();
    let config = AppConfig::from_cli(cli).context("failed to load configuration")?;
    let credentials = load_credentials(&config.users_file).with_context(|| {
        format!(
            "failed to load credentials file {}",
            config.users_file.display()
        )
    })?;
    info!(
        bind = %config.bind,
        users_file = %config.users_file.display(),
        user_count = credentials.user_count(),
        photos_url = %config.photos_url,
        session_ttl_seconds = config.session_ttl_seconds,
        photo_cache_ttl_seconds = config.photo_cache_ttl_seconds,
        "configuration loaded"
    );

    let store = RedisStore::open(&config.redis_url).context("invalid redis url")?;
    // Requests keep failing with 500 until Redis comes up; the listener starts anyway.
    if let Err(err) = store.connect().await {
        error!(error = %err, "error connecting to redis");
    }

    let photos = HttpPhotoSource::new(config.photos_url.clone(), config.upstream_timeout);
    info!(url = %photos.url(), "photo source configured");

    let state = AppState {
        credentials: Arc::new(credentials),
        store: Arc::new(store),
        photos: Arc::new(photos),
        ttls: Ttls {
            session_seconds: config.session_ttl_seconds,
            photo_cache_seconds: config.photo_cache_ttl_seconds,
        },
    };

    let app = router(state);
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    let shutdown = tokio::signal::ctrl_c();
    info!(bind = %config.bind, "photogate listening");

    serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = shutdown.await;
            info!("shutting down gracefully");
        })
        .await
        .context("server exited with error")
}

/// Initialize tracing subscriber with `RUST_LOG` env filter (default: `info`).
fn init_logging() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    Ok(())
}
