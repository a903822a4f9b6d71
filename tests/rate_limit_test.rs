use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::get,
    Router,
};
use job_board_backend::middleware::rate_limit::{
    rate_limit_middleware, MemoryCounterStore, RateLimitRule, RateLimitState,
};
use tower::ServiceExt;

async fn ok_handler() -> &'static str {
    "ok"
}

fn app(max_requests: u64) -> Router {
    // A wide window keeps the test inside a single aligned bucket.
    let rule = RateLimitRule {
        max_requests,
        window: Duration::from_secs(3600),
        scope: "test:endpoint",
    };
    Router::new().route(
        "/limited",
        get(ok_handler).route_layer(axum::middleware::from_fn_with_state(
            RateLimitState::new(Arc::new(MemoryCounterStore::new()), rule),
            rate_limit_middleware,
        )),
    )
}

fn request_from(ip: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri("/limited")
        .header("x-forwarded-for", ip)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn budget_exhaustion_yields_429() {
    let app = app(3);
    for _ in 0..3 {
        let resp = app.clone().oneshot(request_from("203.0.113.7")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
    let resp = app.clone().oneshot(request_from("203.0.113.7")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn clients_have_independent_budgets() {
    let app = app(1);
    let resp = app.clone().oneshot(request_from("203.0.113.7")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = app.clone().oneshot(request_from("203.0.113.7")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

    // A different forwarded address keys a fresh counter.
    let resp = app.clone().oneshot(request_from("203.0.113.8")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn first_forwarded_hop_is_the_client_key() {
    let app = app(1);
    let resp = app
        .clone()
        .oneshot(request_from("203.0.113.9, 10.0.0.1"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Same first hop behind a different proxy chain: same budget.
    let resp = app
        .clone()
        .oneshot(request_from("203.0.113.9, 10.0.0.2"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
}
