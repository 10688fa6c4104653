// src/server/handler.rs
use hyper::header::{HeaderValue, ALLOW, CONTENT_TYPE};
use hyper::{Body, Method, Request, Response, StatusCode};
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use tower::Service;

use crate::stats::DomainAggregator;

/// Answers status queries from the aggregator's latest snapshot.
#[derive(Clone)]
pub struct StatusHandler {
    aggregator: Arc<DomainAggregator>,
}

impl StatusHandler {
    pub fn new(aggregator: Arc<DomainAggregator>) -> Self {
        Self { aggregator }
    }

    pub fn handle(&self, req: &Request<Body>) -> Response<Body> {
        let route = match req.uri().path() {
            "/status" => Route::Availability,
            "/status/details" => Route::Details,
            _ => return text_response(StatusCode::NOT_FOUND, "Not Found"),
        };

        if *req.method() != Method::GET {
            let mut response = text_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static("GET"));
            return response;
        }

        let snapshot = self.aggregator.snapshot();
        match route {
            Route::Availability => json_response(&snapshot.availability()),
            Route::Details => json_response(&*snapshot),
        }
    }
}

enum Route {
    Availability,
    Details,
}

fn text_response(status: StatusCode, message: &'static str) -> Response<Body> {
    let mut response = Response::new(Body::from(message));
    *response.status_mut() = status;
    response
}

fn json_response<T: Serialize>(value: &T) -> Response<Body> {
    match serde_json::to_vec(value) {
        Ok(body) => {
            let mut response = Response::new(Body::from(body));
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            response
        }
        Err(e) => {
            tracing::error!(%e, "failed to serialize status response");
            text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}

impl Service<Request<Body>> for StatusHandler {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = futures::future::Ready<Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        futures::future::ready(Ok(self.handle(&req)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{ProbeOutcome, ProbeResult};
    use std::time::Duration;
    use tower::ServiceExt;

    async fn body_json(response: Response<Body>) -> serde_json::Value {
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn seeded_handler() -> StatusHandler {
        let aggregator = Arc::new(DomainAggregator::new());
        let up = ProbeResult::classify(200, Duration::from_millis(50), Duration::from_millis(500));
        aggregator.record(&ProbeOutcome::new("a.com", up)).await;
        aggregator
            .record(&ProbeOutcome::new("a.com", ProbeResult::TimedOut))
            .await;
        aggregator
            .record(&ProbeOutcome::new("b.com", ProbeResult::TimedOut))
            .await;
        StatusHandler::new(aggregator)
    }

    fn get(path: &str) -> Request<Body> {
        Request::get(path).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn status_returns_integer_availability_per_domain() {
        let response = seeded_handler().await.oneshot(get("/status")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "a.com": 50, "b.com": 0 })
        );
    }

    #[tokio::test]
    async fn status_is_empty_before_any_round() {
        let handler = StatusHandler::new(Arc::new(DomainAggregator::new()));
        let response = handler.oneshot(get("/status")).await.unwrap();
        assert_eq!(body_json(response).await, serde_json::json!({}));
    }

    #[tokio::test]
    async fn details_include_counts_and_latency() {
        let response = seeded_handler()
            .await
            .oneshot(get("/status/details"))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["domains"]["a.com"]["up_count"], 1);
        assert_eq!(body["domains"]["a.com"]["total_count"], 2);
        assert_eq!(body["domains"]["a.com"]["avg_latency_ms"], 50.0);
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let response = seeded_handler().await.oneshot(get("/nope")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn non_get_is_rejected() {
        let request = Request::post("/status").body(Body::empty()).unwrap();
        let response = seeded_handler().await.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[ALLOW], "GET");
    }
}
