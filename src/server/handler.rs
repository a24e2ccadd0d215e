// src/server/handler.rs
use crate::health::HealthResponse;
use crate::poller::HEALTH_PATH;
use hyper::{header, Body, Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::task::{Context, Poll};
use tower::Service;

const ROOT_MESSAGE: &str = "Health Platform API";

/// Answers `GET /health` for pollers pointed at this process.
#[derive(Clone, Default)]
pub struct HealthEndpoint;

impl HealthEndpoint {
    pub fn new() -> Self {
        Self
    }

    fn respond(req: &Request<Body>) -> Response<Body> {
        if req.method() != Method::GET {
            return plain(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
        }

        match req.uri().path() {
            HEALTH_PATH => json(&HealthResponse::healthy()),
            "/" => json(&serde_json::json!({ "message": ROOT_MESSAGE })),
            _ => plain(StatusCode::NOT_FOUND, "Not Found"),
        }
    }
}

fn json<T: serde::Serialize>(value: &T) -> Response<Body> {
    match serde_json::to_vec(value) {
        Ok(body) => {
            let mut response = Response::new(Body::from(body));
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                header::HeaderValue::from_static("application/json"),
            );
            response
        }
        Err(e) => {
            tracing::error!(%e, "failed to encode response");
            plain(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}

fn plain(status: StatusCode, message: &'static str) -> Response<Body> {
    let mut response = Response::new(Body::from(message));
    *response.status_mut() = status;
    response
}

impl Service<Request<Body>> for HealthEndpoint {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = futures::future::Ready<Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        tracing::debug!(method = %req.method(), path = req.uri().path(), "request");
        futures::future::ready(Ok(Self::respond(&req)))
    }
}
