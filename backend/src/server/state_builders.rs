//! Builders wiring adapters and domain services into [`HttpState`].
//!
//! Repositories come from PostgreSQL when a pool is configured and from one
//! shared [`InMemoryStore`] otherwise. The detector is injectable so
//! integration tests can drive the full stack with a scripted detector.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use reqwest::Url;
use tracing::info;

use redecor_backend::domain::ports::{
    DetectionMetrics, InventoryRepository, ListingRepository, NoOpDetectionMetrics,
    ObjectDetector, UserRepository,
};
use redecor_backend::domain::{
    AccountService, DetectionService, DetectionServicePorts, HealthService, InventoryService,
    MarketplaceService, SuggestionService,
};
use redecor_backend::inbound::http::state::{HttpState, HttpStatePorts};
use redecor_backend::outbound::detection::HttpObjectDetector;
use redecor_backend::outbound::hashing::Argon2PasswordHasher;
use redecor_backend::outbound::memory::InMemoryStore;
use redecor_backend::outbound::persistence::{
    DieselInventoryRepository, DieselListingRepository, DieselUserRepository,
};
use redecor_backend::outbound::storage::LocalImageStore;

use super::ServerConfig;

/// Detector adapter plus the location quoted when it cannot be reached.
pub struct DetectorHandle {
    pub detector: Arc<dyn ObjectDetector>,
    pub location: String,
}

/// Build the HTTP detector adapter from settings.
///
/// # Errors
/// Returns an error when the configured URL is invalid or the HTTP client
/// cannot be built.
pub fn build_detector(config: &ServerConfig) -> std::io::Result<DetectorHandle> {
    let url = Url::parse(config.settings.ml_service_url()).map_err(|err| {
        std::io::Error::other(format!(
            "invalid detector URL {}: {err}",
            config.settings.ml_service_url()
        ))
    })?;
    let detector = HttpObjectDetector::new(url, config.settings.detector_timeouts())
        .map_err(|err| std::io::Error::other(format!("detector client failed: {err}")))?;
    let location = detector.location().to_owned();
    Ok(DetectorHandle {
        detector: Arc::new(detector),
        location,
    })
}

#[cfg(feature = "metrics")]
fn build_detection_metrics(config: &ServerConfig) -> std::io::Result<Arc<dyn DetectionMetrics>> {
    use redecor_backend::outbound::metrics::PrometheusDetectionMetrics;

    match &config.prometheus {
        Some(prom) => PrometheusDetectionMetrics::new(&prom.registry)
            .map(|metrics| Arc::new(metrics) as Arc<dyn DetectionMetrics>)
            .map_err(|err| {
                std::io::Error::other(format!("detection metrics registration failed: {err}"))
            }),
        None => Ok(Arc::new(NoOpDetectionMetrics)),
    }
}

#[cfg(not(feature = "metrics"))]
#[expect(
    clippy::unnecessary_wraps,
    reason = "matches the fallible metrics-enabled builder"
)]
fn build_detection_metrics(_config: &ServerConfig) -> std::io::Result<Arc<dyn DetectionMetrics>> {
    Ok(Arc::new(NoOpDetectionMetrics))
}

/// Adapters shared by every service.
struct Shared {
    clock: Arc<dyn Clock>,
    detector: DetectorHandle,
    metrics: Arc<dyn DetectionMetrics>,
    images: Arc<LocalImageStore>,
}

fn assemble<U, I, L>(
    config: &ServerConfig,
    users: Arc<U>,
    inventory: Arc<I>,
    listings: Arc<L>,
    shared: Shared,
) -> HttpState
where
    U: UserRepository + 'static,
    I: InventoryRepository + 'static,
    L: ListingRepository + 'static,
{
    let Shared {
        clock,
        detector,
        metrics,
        images,
    } = shared;
    let inventory_service = Arc::new(InventoryService::new(Arc::clone(&inventory), Arc::clone(&clock)));
    let marketplace = Arc::new(MarketplaceService::new(listings, Arc::clone(&clock)));
    let detection = DetectionService::new(
        DetectionServicePorts {
            detector: Arc::clone(&detector.detector),
            images,
            inventory,
            metrics,
        },
        Arc::clone(&clock),
        config.settings.retry_policy(),
        detector.location,
    );

    HttpState::new(HttpStatePorts {
        accounts: Arc::new(AccountService::new(
            users,
            Arc::new(Argon2PasswordHasher),
            Arc::clone(&clock),
        )),
        inventory: inventory_service.clone(),
        inventory_query: inventory_service,
        marketplace: marketplace.clone(),
        marketplace_query: marketplace,
        detection: Arc::new(detection),
        suggestions: Arc::new(SuggestionService::new(Arc::clone(&detector.detector))),
        service_health: Arc::new(HealthService::new(detector.detector)),
        clock,
    })
}

/// Build handler state around an already constructed detector.
///
/// # Errors
/// Returns an error when the upload directory cannot be opened or metrics
/// cannot be registered.
pub fn build_http_state_with_detector(
    config: &ServerConfig,
    detector: DetectorHandle,
) -> std::io::Result<web::Data<HttpState>> {
    let upload_dir = config.settings.upload_dir();
    let shared = Shared {
        clock: Arc::new(DefaultClock),
        detector,
        metrics: build_detection_metrics(config)?,
        images: Arc::new(LocalImageStore::open(&upload_dir)?),
    };

    let state = match &config.db_pool {
        Some(pool) => {
            info!("using PostgreSQL repositories");
            assemble(
                config,
                Arc::new(DieselUserRepository::new(pool.clone())),
                Arc::new(DieselInventoryRepository::new(pool.clone())),
                Arc::new(DieselListingRepository::new(pool.clone())),
                shared,
            )
        }
        None => {
            info!("no database configured; using the in-memory store");
            let store = Arc::new(InMemoryStore::new());
            assemble(
                config,
                Arc::clone(&store),
                Arc::clone(&store),
                store,
                shared,
            )
        }
    };
    Ok(web::Data::new(state))
}

/// Build handler state with the HTTP detector from settings.
///
/// # Errors
/// See [`build_detector`] and [`build_http_state_with_detector`].
pub fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let detector = build_detector(config)?;
    build_http_state_with_detector(config, detector)
}
