//! Backend entry-point: loads settings, prepares storage and serves the REST API.

use std::net::SocketAddr;

use actix_web::web;
#[cfg(feature = "metrics")]
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use color_eyre::eyre::{WrapErr as _, eyre};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig as _;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use redecor_backend::AppSettings;
use redecor_backend::inbound::http::health::HealthState;
use redecor_backend::inbound::http::session_config::{BuildMode, session_settings_from_env};
use redecor_backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};

mod server;

use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|err| eyre!("failed to load settings: {err}"))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("invalid session configuration")?;
    info!(
        fingerprint = %session.key_fingerprint(),
        cookie_secure = session.cookie_secure,
        "session key loaded"
    );

    let bind_addr: SocketAddr = format!("{}:{}", settings.host(), settings.port())
        .parse()
        .wrap_err("invalid bind address")?;

    let db_pool = connect_database(&settings).await?;

    let mut config = ServerConfig::new(
        settings,
        session.key,
        session.cookie_secure,
        session.same_site,
        bind_addr,
    );
    if let Some(pool) = db_pool {
        config = config.with_db_pool(pool);
    }
    #[cfg(feature = "metrics")]
    {
        config = config.with_metrics(make_metrics());
    }

    let health_state = web::Data::new(HealthState::new());
    create_server(health_state, config)?.await?;
    Ok(())
}

/// Migrate and pool the configured database, if any.
async fn connect_database(settings: &AppSettings) -> color_eyre::Result<Option<DbPool>> {
    let Some(url) = settings.database_url() else {
        warn!("REDECOR_DATABASE_URL not set; data is kept in memory only");
        return Ok(None);
    };

    run_pending_migrations(url)
        .await
        .wrap_err("database migrations failed")?;
    let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.db_max_connections()))
        .await
        .wrap_err("database pool creation failed")?;
    info!("database ready");
    Ok(Some(pool))
}

#[cfg(feature = "metrics")]
fn make_metrics() -> Option<PrometheusMetrics> {
    match PrometheusMetricsBuilder::new("redecor")
        .endpoint("/metrics")
        .build()
    {
        Ok(metrics) => Some(metrics),
        Err(error) => {
            warn!(%error, "metrics exporter unavailable; continuing without it");
            None
        }
    }
}
