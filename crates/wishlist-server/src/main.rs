mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};

use wishlist_api::{AppStateInner, create_router};
use wishlist_backend::{Backend, LocalBackend, SupabaseBackend};

use crate::config::{BackendConfig, Config};

/// Used when `RUST_LOG` is unset. Covers every crate in the workspace.
const DEFAULT_LOG_FILTER: &str =
    "wishlist=debug,wishlist_api=debug,wishlist_backend=debug,wishlist_db=debug,tower_http=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .init();

    let config = Config::from_env()?;
    if config.uses_placeholder_secret() {
        warn!("WISHLIST_JWT_SECRET is unset or a placeholder; local sessions can be forged");
    }

    let backend: Arc<dyn Backend> = match config.backend {
        BackendConfig::Supabase(supabase) => {
            if supabase.service_role_key.is_none() {
                warn!("SUPABASE_SERVICE_ROLE_KEY is unset; shared lists will fail to load");
            }
            info!("Using hosted backend at {}", supabase.url);
            Arc::new(SupabaseBackend::new(supabase))
        }
        BackendConfig::Local { db_path, jwt_secret } => {
            info!("Using local backend at {}", db_path.display());
            let db = wishlist_db::Database::open(&db_path)?;
            Arc::new(LocalBackend::new(db, jwt_secret))
        }
    };

    let state = Arc::new(AppStateInner::new(backend, &config.site_url, config.secure_cookies));
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Wishlist server listening on {} (public URL {})", addr, config.site_url);

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
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_log_filter_covers_the_workspace() {
        for target in ["wishlist_api", "wishlist_backend", "wishlist_db", "tower_http"] {
            assert!(
                DEFAULT_LOG_FILTER.contains(&format!("{target}=debug")),
                "{target} missing from the default filter"
            );
        }
        assert!(tracing_subscriber::EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
    }
}
