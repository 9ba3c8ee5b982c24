//! Request correlation middleware.
//!
//! Each request runs inside [`TraceId::scope`] under an `http_request` span.
//! A well-formed `trace-id` request header is adopted so a browser session or
//! proxy can correlate its own logs; otherwise a fresh id is generated. The
//! id is echoed in the `trace-id` response header and, through the domain
//! error envelope, in every error body.

use std::rc::Rc;
use std::task::{Context, Poll};

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{Instrument, debug, info_span, warn};

use crate::domain::{TRACE_ID_HEADER, TraceId};

/// Middleware scoping each request to a [`TraceId`].
///
/// # Examples
/// ```
/// use actix_web::App;
/// use redecor_backend::Trace;
///
/// let app = App::new().wrap(Trace);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Trace;

impl<S, B> Transform<S, ServiceRequest> for Trace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceService {
            inner: Rc::new(service),
        }))
    }
}

/// Service produced by [`Trace`].
pub struct TraceService<S> {
    inner: Rc<S>,
}

/// Caller-supplied id when valid, otherwise a fresh one.
fn trace_id_for(req: &ServiceRequest) -> TraceId {
    let supplied = req
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok());
    match supplied.map(|raw| (raw, TraceId::from_header(raw))) {
        Some((_, Some(id))) => id,
        Some((raw, None)) => {
            debug!(supplied = raw.len(), "ignoring malformed trace-id header");
            TraceId::generate()
        }
        None => TraceId::generate(),
    }
}

fn stamp<B>(res: &mut ServiceResponse<B>, trace_id: TraceId) {
    match HeaderValue::from_str(&trace_id.to_string()) {
        Ok(value) => {
            res.response_mut()
                .headers_mut()
                .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
        }
        Err(error) => warn!(%error, "trace id is not a valid header value"),
    }
}

impl<S, B> Service<ServiceRequest> for TraceService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let trace_id = trace_id_for(&req);
        let span = info_span!(
            "http_request",
            %trace_id,
            method = %req.method(),
            path = %req.path(),
        );
        let inner = Rc::clone(&self.inner);
        let handled = async move {
            let mut res = inner.call(req).await?;
            debug!(status = res.status().as_u16(), "request completed");
            stamp(&mut res, trace_id);
            Ok(res)
        };
        Box::pin(TraceId::scope(trace_id, handled).instrument(span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;

    use crate::domain::Error as DomainError;

    const CLIENT_ID: &str = "5d7f0b7e-2a4c-4f38-9e51-1c2b3d4e5f60";

    async fn echo_current() -> HttpResponse {
        match TraceId::current() {
            Some(id) => HttpResponse::Ok().body(id.to_string()),
            None => HttpResponse::InternalServerError().finish(),
        }
    }

    async fn missing_item() -> Result<HttpResponse, DomainError> {
        Err(DomainError::not_found("inventory item not found"))
    }

    fn header(res: &ServiceResponse) -> String {
        res.headers()
            .get(TRACE_ID_HEADER)
            .expect("trace id header")
            .to_str()
            .expect("ascii header")
            .to_owned()
    }

    #[rstest]
    #[case(None)]
    #[case(Some("not-a-uuid"))]
    #[case(Some("00000000-0000-0000-0000-000000000000"))]
    #[actix_web::test]
    async fn handler_and_header_share_a_generated_id(#[case] supplied: Option<&str>) {
        let app = test::init_service(App::new().wrap(Trace).route("/", web::get().to(echo_current)))
            .await;
        let mut req = test::TestRequest::get().uri("/");
        if let Some(value) = supplied {
            req = req.insert_header((TRACE_ID_HEADER, value));
        }

        let res = test::call_service(&app, req.to_request()).await;
        let id = header(&res);
        let body = test::read_body(res).await;

        assert_eq!(std::str::from_utf8(&body).expect("utf8"), id);
        assert_ne!(Some(id.as_str()), supplied);
    }

    #[actix_web::test]
    async fn valid_client_id_is_adopted() {
        let app = test::init_service(App::new().wrap(Trace).route("/", web::get().to(echo_current)))
            .await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/")
                .insert_header((TRACE_ID_HEADER, CLIENT_ID))
                .to_request(),
        )
        .await;

        assert_eq!(header(&res), CLIENT_ID);
    }

    #[actix_web::test]
    async fn error_envelope_carries_the_request_id() {
        let app = test::init_service(App::new().wrap(Trace).route("/", web::get().to(missing_item)))
            .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        let id = header(&res);
        let body: serde_json::Value = test::read_body_json(res).await;

        assert_eq!(body["traceId"].as_str(), Some(id.as_str()));
        assert_eq!(body["code"], "not_found");
    }
}
