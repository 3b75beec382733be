// Epiweek Calendar - Web Server
// JSON API under /api plus server-rendered year pages

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, Method, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Datelike;
use clap::Parser;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use epiweek_calendar::api::{
    BatchConversionRequest, EpiweekQuery, RangeQuery, TimezoneQuery,
};
use epiweek_calendar::clock::today_in_timezone;
use epiweek_calendar::render::year_page_html;
use epiweek_calendar::{
    logging, AppConfig, ApiService, EpiweekError, ErrorResponse, SharedClock, SystemClock,
    MAX_YEAR, MIN_YEAR, VERSION,
};

/// Epiweek calendar HTTP server.
#[derive(Parser)]
#[command(name = "epiweek-server", version)]
struct Args {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bind address from config.
    #[arg(short, long)]
    bind: Option<String>,
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    service: Arc<ApiService<SharedClock>>,
}

/// Health response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

// ============================================================================
// Responses
// ============================================================================

fn error_response(err: &EpiweekError) -> Response {
    warn!(kind = err.kind(), "request rejected: {}", err);
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::from(err))).into_response()
}

/// Malformed query string or body that never reached the service.
fn rejection_response(message: String) -> Response {
    let err = EpiweekError::InvalidParameters { message };
    error_response(&err)
}

fn respond<T: Serialize>(result: epiweek_calendar::Result<T>) -> Response {
    match result {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => error_response(&e),
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: VERSION,
    })
}

/// GET /api/v1/epiweek?date= | ?epiweek= | ?year=&week=
async fn convert(
    State(state): State<AppState>,
    query: Result<Query<EpiweekQuery>, QueryRejection>,
) -> Response {
    match query {
        Ok(Query(query)) => respond(state.service.convert(&query)),
        Err(rejection) => rejection_response(rejection.body_text()),
    }
}

/// POST /api/v1/epiweek/batch
async fn convert_batch(
    State(state): State<AppState>,
    body: Result<Json<BatchConversionRequest>, JsonRejection>,
) -> Response {
    match body {
        Ok(Json(request)) => respond(state.service.convert_batch(&request)),
        Err(rejection) => rejection_response(rejection.body_text()),
    }
}

/// GET /api/v1/calendar/:year
async fn year_calendar(
    State(state): State<AppState>,
    Path(year): Path<String>,
    query: Result<Query<TimezoneQuery>, QueryRejection>,
) -> Response {
    match query {
        Ok(Query(query)) => respond(state.service.year_calendar(&year, query.timezone.as_deref())),
        Err(rejection) => rejection_response(rejection.body_text()),
    }
}

/// GET /api/v1/calendar/:year/:month
async fn month_calendar(
    State(state): State<AppState>,
    Path((year, month)): Path<(String, String)>,
    query: Result<Query<TimezoneQuery>, QueryRejection>,
) -> Response {
    match query {
        Ok(Query(query)) => respond(
            state
                .service
                .month_calendar(&year, &month, query.timezone.as_deref()),
        ),
        Err(rejection) => rejection_response(rejection.body_text()),
    }
}

/// GET /api/v1/week/:epiweek
async fn week_details(State(state): State<AppState>, Path(epiweek): Path<String>) -> Response {
    respond(state.service.week_details(&epiweek))
}

/// GET /api/v1/current
async fn current(
    State(state): State<AppState>,
    query: Result<Query<TimezoneQuery>, QueryRejection>,
) -> Response {
    match query {
        Ok(Query(query)) => respond(state.service.current(query.timezone.as_deref())),
        Err(rejection) => rejection_response(rejection.body_text()),
    }
}

/// GET /api/v1/range?start=&end=
async fn range(
    State(state): State<AppState>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Response {
    match query {
        Ok(Query(query)) => respond(state.service.range(&query)),
        Err(rejection) => rejection_response(rejection.body_text()),
    }
}

// ============================================================================
// HTML Handlers
// ============================================================================

fn year_page(state: &AppState, year: i32) -> Response {
    let generator = state.service.generator();
    match generator.year_grid(year, state.service.default_timezone()) {
        Ok(grid) => match year_page_html(&grid) {
            Ok(html) => Html(html).into_response(),
            Err(e) => {
                error!("failed to render year page: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::from(&e))).into_response()
            }
        },
        Err(e) => error_response(&e),
    }
}

/// GET / - Current year in the default timezone
async fn serve_index(State(state): State<AppState>) -> Response {
    let today = today_in_timezone(
        state.service.generator().clock(),
        state.service.default_timezone(),
    );
    match today {
        Ok(today) => year_page(&state, today.year()),
        Err(e) => error_response(&e),
    }
}

/// GET /:year - Year page, anything unusable goes back to /
async fn serve_year(State(state): State<AppState>, Path(year): Path<String>) -> Response {
    match year.parse::<i32>() {
        Ok(year) if (MIN_YEAR..=MAX_YEAR).contains(&year) => year_page(&state, year),
        _ => Redirect::to("/").into_response(),
    }
}

// ============================================================================
// Router
// ============================================================================

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([header::CONTENT_LENGTH])
        .max_age(Duration::from_secs(600))
}

fn app(state: AppState) -> Router {
    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/v1/epiweek", get(convert))
        .route("/v1/epiweek/batch", post(convert_batch))
        .route("/v1/calendar/:year", get(year_calendar))
        .route("/v1/calendar/:year/:month", get(month_calendar))
        .route("/v1/week/:epiweek", get(week_details))
        .route("/v1/current", get(current))
        .route("/v1/range", get(range))
        .layer(cors_layer())
        .with_state(state.clone());

    // Build main router
    Router::new()
        .route("/", get(serve_index))
        .route("/:year", get(serve_year))
        .with_state(state)
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    println!("🌐 Epiweek Calendar - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = AppConfig::load(args.config.as_deref())?;
    let clock: SharedClock = Arc::new(SystemClock);
    let service = ApiService::with_clock(clock, &config.server.default_timezone)?;
    println!("✓ Default timezone: {}", service.default_timezone());

    // Create shared state
    let state = AppState {
        service: Arc::new(service),
    };

    // Start server
    let addr = args.bind.unwrap_or(config.server.bind);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    info!(%addr, "listening");

    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: http://{}/api/v1/current", addr);
    println!("   UI:  http://{}/", addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app(state))
        .await
        .context("server error")?;

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
