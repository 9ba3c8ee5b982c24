//! Request metrics middleware that degrades to a pass-through.
//!
//! `main` only builds a Prometheus exporter when the registry can be created;
//! [`RequestMetrics`] lets the app factory wrap unconditionally either way so
//! the service type stays the same.

use std::sync::Arc;

use actix_service::{
    Service, ServiceExt as _, Transform,
    boxed::{self, BoxService},
};
use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Compat;
use actix_web_prom::PrometheusMetrics;
use futures_util::future::LocalBoxFuture;

type BoxedHttpService = BoxService<ServiceRequest, ServiceResponse<BoxBody>, actix_web::Error>;

/// Wraps an optional Prometheus exporter.
#[derive(Clone)]
pub(crate) struct RequestMetrics {
    exporter: Option<Arc<PrometheusMetrics>>,
}

impl RequestMetrics {
    pub(crate) fn new(exporter: Option<PrometheusMetrics>) -> Self {
        Self {
            exporter: exporter.map(Arc::new),
        }
    }

    pub(crate) fn is_recording(&self) -> bool {
        self.exporter.is_some()
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestMetrics
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = BoxedHttpService;
    type Future = LocalBoxFuture<'static, Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        let Some(exporter) = self.exporter.as_deref().cloned() else {
            let passthrough =
                service.map(|res: ServiceResponse<B>| res.map_into_boxed_body());
            return Box::pin(async move { Ok(boxed::service(passthrough)) });
        };

        let pending = Compat::new(exporter).new_transform(service);
        Box::pin(async move { pending.await.map(boxed::service) })
    }
}
