use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use job_board_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    middleware::auth,
    middleware::rate_limit::{
        rate_limit_middleware, CounterStore, RateLimitRule, RateLimitState, RedisCounterStore,
    },
    routes, AppState,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let counter_store: Arc<dyn CounterStore> =
        Arc::new(RedisCounterStore::connect(&config.redis_url).await?);
    let app_state = AppState::new(pool, counter_store.clone());

    let rate = |rule: RateLimitRule| {
        axum::middleware::from_fn_with_state(
            RateLimitState::new(counter_store.clone(), rule),
            rate_limit_middleware,
        )
    };
    let require_auth =
        || axum::middleware::from_fn_with_state(app_state.clone(), auth::require_auth);
    let optional_auth =
        || axum::middleware::from_fn_with_state(app_state.clone(), auth::optional_auth);

    // Every job operation carries its own budget; the limiter is outermost
    // so over-budget requests are rejected before touching auth or the
    // database.
    let jobs_collection = get(routes::job::list_jobs)
        .route_layer(optional_auth())
        .route_layer(rate(RateLimitRule::per_second(20, "jobs:list")))
        .merge(
            post(routes::job::create_job)
                .route_layer(require_auth())
                .route_layer(rate(RateLimitRule::per_second(10, "jobs:create"))),
        );

    let jobs_item = get(routes::job::get_job)
        .route_layer(optional_auth())
        .route_layer(rate(RateLimitRule::per_second(20, "jobs:detail")))
        .merge(
            put(routes::job::update_job)
                .route_layer(require_auth())
                .route_layer(rate(RateLimitRule::per_second(10, "jobs:update"))),
        )
        .merge(
            delete(routes::job::delete_job)
                .route_layer(require_auth())
                .route_layer(rate(RateLimitRule::per_second(5, "jobs:delete"))),
        );

    let app = Router::new()
        .route("/health", get(routes::health::health))
        .route("/users", post(routes::user::register_user))
        .route("/users/login", post(routes::user::login))
        .route("/users/refresh_jwt", post(routes::user::refresh_jwt))
        .route("/companies", post(routes::company::create_company))
        .route("/companies/:id", delete(routes::company::delete_company))
        .route("/companies/:id/domains", post(routes::company::create_domain))
        .route(
            "/companies/:id/domains/:domain_id",
            delete(routes::company::delete_domain),
        )
        .route("/jobs", jobs_collection)
        .route("/jobs/:id", jobs_item)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
