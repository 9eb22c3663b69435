use axum::Router;
use axum::extract::{MatchedPath, Request};
use axum::middleware::{self, Next};
use axum::response::IntoResponse;
use axum::{Extension, routing::get};
use config::Config;
use geo::GeoClient;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::future::ready;
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, prelude::*};
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};

mod config;
mod error;
mod geo;
mod handlers;
mod ip_address;
mod verification;

#[derive(Clone, Debug)]
pub struct State {
    pool: MySqlPool,
    config: &'static Config,
    geo: GeoClient,
}

fn main() {
    let config: &'static Config = Box::leak(Box::new(
        Config::new().expect("error: failed to construct config"),
    ));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Corresponds to `#[tokio::main]`.
    // See https://docs.rs/tokio-macros/latest/src/tokio_macros/lib.rs.html#225.
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("error: failed to initialize tokio runtime")
        .block_on(async {
            _ = tokio::spawn(async move { start_main_server(config).await }).await;
        });
}

#[derive(OpenApi)]
#[openapi(info(title = "Whoami API"))]
struct ApiDoc;

fn router(state: State) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(handlers::whoami::whoami))
        .routes(routes!(handlers::myip::myip))
        .routes(routes!(handlers::verify::verify))
        .split_for_parts();

    let json_specification = api.to_pretty_json().expect("API docs generation failed");

    router
        .route("/", get(handlers::whoami::whoami))
        .route("/health", get(handlers::health::check))
        .layer(Extension(state))
        .route(
            "/docs/openapi.json",
            get(move || ready(json_specification.clone())),
        )
}

async fn start_main_server(config: &'static Config) {
    info!("Starting Whoami API v{}", env!("CARGO_PKG_VERSION"));
    // set up connection pool
    let pool = MySqlPoolOptions::new()
        .max_connections(20)
        .connect_with(config.database.connect_options())
        .await
        .expect("can't connect to database.");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("sqlx migration failed");

    let geo = GeoClient::new(&config.geo_api_url)
        .expect("error: failed to construct geolocation client");

    let state = State { pool, config, geo };

    let recorder_handle = setup_metrics_recorder();

    let app = router(state)
        .route("/metrics", get(move || ready(recorder_handle.render())))
        .route_layer(middleware::from_fn(track_metrics))
        .layer(CorsLayer::permissive());

    let listener = TcpListener::bind("0.0.0.0:8080")
        .await
        .expect("error: failed to bind to port");
    info!(
        "Whoami API running on http://{} (Press Ctrl+C to quit)",
        listener.local_addr().unwrap().to_string()
    );
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .expect("error: failed to initialize axum server");
}

fn setup_metrics_recorder() -> PrometheusHandle {
    // Metrics
    const EXPONENTIAL_SECONDS: &[f64] = &[
        0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
    ];

    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_requests_duration_seconds".to_string()),
            EXPONENTIAL_SECONDS,
        )
        .expect("error: failed to build prometheus recorder")
        .install_recorder()
        .expect("error: failed to install prometheus recorder")
}

async fn track_metrics(req: Request, next: Next) -> impl IntoResponse {
    let start = Instant::now();
    let path = if let Some(matched_path) = req.extensions().get::<MatchedPath>() {
        matched_path.as_str().to_owned()
    } else {
        req.uri().path().to_owned()
    };
    let method = req.method().clone();

    let response = next.run(req).await;

    let latency = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    let labels = [
        ("method", method.to_string()),
        ("path", path),
        ("status", status),
    ];

    metrics::increment_counter!("http_requests_total", &labels);
    metrics::histogram!("http_requests_duration_seconds", latency, &labels);

    response
}
