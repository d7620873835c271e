//! HTTP Server for the dashboard API.
//!
//! The dataset is loaded once at startup and shared read-only by every
//! handler; each request filters and aggregates from scratch.
//!
//! # API Endpoints
//!
//! | Method | Path                           | Description                        |
//! |--------|--------------------------------|------------------------------------|
//! | GET    | `/health`                      | Health check                       |
//! | GET    | `/api/range`                   | Dataset date bounds and metadata   |
//! | GET    | `/api/dashboard`               | Every view for a date range        |
//! | GET    | `/api/daily-orders`            | Daily order count and revenue      |
//! | GET    | `/api/categories`              | Category ranking, best and worst   |
//! | GET    | `/api/demographics/{level}`    | Customer count by `state` / `city` |
//! | GET    | `/api/rfm`                     | RFM metrics per seller             |
//! | GET    | `/api/logs`                    | SSE stream for real-time logs      |
//!
//! Range endpoints take optional `start` and `end` (`YYYY-MM-DD`) query
//! parameters, defaulting to the dataset bounds.

use axum::{
    extract::{Path, Query, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::get,
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, log_info, LOG_BROADCASTER};
use super::types::{
    error_response, CategoriesResponse, CategoryQuery, DailyOrdersResponse, DashboardResponse,
    DatasetMetadata, LocationResponse, RangeQuery, RangeResponse, RfmResponse,
};
use crate::error::ServerError;
use crate::models::{Dataset, DateRange};
use crate::transform::{
    best_performing, build_dashboard, category_quantity, customer_count, daily_orders,
    filter_by_date, rfm, sort_by_count, worst_performing, LocationLevel, TOP_N,
};

type ApiError = (StatusCode, Json<Value>);
type ApiResult<T> = Result<Json<T>, ApiError>;

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            ServerError::Filter(_) | ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn reject(err: impl Into<ServerError>) -> ApiError {
    let err = err.into();
    log_error(format!("Request failed: {}", err));
    (err.status(), Json(error_response(&err.to_string())))
}

/// Build the API router over a loaded dataset.
pub fn router(dataset: Dataset) -> Router {
    // Permissive CORS: the dashboard front-end is served from another origin
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/range", get(date_range))
        .route("/api/dashboard", get(dashboard))
        .route("/api/daily-orders", get(daily))
        .route("/api/categories", get(categories))
        .route("/api/demographics/{level}", get(demographics))
        .route("/api/rfm", get(sellers_rfm))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(dataset)
}

/// Start the HTTP server
pub async fn start_server(dataset: Dataset, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let rows = dataset.len();
    let bounds = dataset.date_bounds();
    let app = router(dataset);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 Salesdash server running on http://localhost:{}", port);
    println!("   GET  /api/dashboard      - Full dashboard (?start=&end=)");
    println!("   GET  /api/range          - Dataset date bounds");
    println!("   GET  /api/logs           - SSE log stream");
    println!("   GET  /health             - Health check");
    println!();
    match bounds {
        Some(b) => println!("📄 {} transactions from {} to {}", rows, b.start, b.end),
        None => println!("📄 Dataset is empty"),
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Parse the query range against the dataset bounds.
fn requested_range(
    dataset: &Dataset,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<Option<DateRange>, ApiError> {
    DateRange::resolve(start, end, dataset.date_bounds()).map_err(reject)
}

/// Health check endpoint
async fn health(State(dataset): State<Dataset>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "salesdash",
        "version": env!("CARGO_PKG_VERSION"),
        "rows": dataset.len(),
    }))
}

async fn date_range(State(dataset): State<Dataset>) -> Json<RangeResponse> {
    Json(RangeResponse {
        bounds: dataset.date_bounds(),
        dataset: DatasetMetadata::from(&dataset),
    })
}

async fn dashboard(
    State(dataset): State<Dataset>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<DashboardResponse> {
    let range = requested_range(&dataset, query.start.as_deref(), query.end.as_deref())?;
    Ok(Json(build_dashboard(&dataset, range).into()))
}

async fn daily(
    State(dataset): State<Dataset>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<DailyOrdersResponse> {
    let range = requested_range(&dataset, query.start.as_deref(), query.end.as_deref())?;
    let rows = filter_by_date(&dataset, range.as_ref());
    Ok(Json(DailyOrdersResponse::new(range, daily_orders(&rows))))
}

async fn categories(
    State(dataset): State<Dataset>,
    Query(query): Query<CategoryQuery>,
) -> ApiResult<CategoriesResponse> {
    let range = requested_range(&dataset, query.start.as_deref(), query.end.as_deref())?;
    let top = query.top.unwrap_or(TOP_N);
    if top == 0 {
        return Err(reject(ServerError::BadRequest("top must be at least 1".into())));
    }

    let rows = filter_by_date(&dataset, range.as_ref());
    let ranked = category_quantity(&rows);

    Ok(Json(CategoriesResponse {
        request_id: uuid::Uuid::new_v4().to_string(),
        range,
        best: best_performing(&ranked, top).to_vec(),
        worst: worst_performing(&ranked, top).to_vec(),
        ranked,
    }))
}

async fn demographics(
    State(dataset): State<Dataset>,
    Path(level): Path<LocationLevel>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<LocationResponse> {
    let range = requested_range(&dataset, query.start.as_deref(), query.end.as_deref())?;
    log_info(format!("Customer count by {}", level));

    let rows = filter_by_date(&dataset, range.as_ref());
    let counts = sort_by_count(customer_count(&rows, level));
    Ok(Json(LocationResponse::new(range, counts)))
}

async fn sellers_rfm(
    State(dataset): State<Dataset>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<RfmResponse> {
    let range = requested_range(&dataset, query.start.as_deref(), query.end.as_deref())?;
    let rows = filter_by_date(&dataset, range.as_ref());
    Ok(Json(RfmResponse::new(range, rfm(&rows))))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    // Lagged receivers skip the entries they missed
    let stream = BroadcastStream::new(rx).filter_map(|result| {
        let entry = result.ok()?;
        let json = serde_json::to_string(&entry).ok()?;
        Some(Ok(Event::default().data(json)))
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
