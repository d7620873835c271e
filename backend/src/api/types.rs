//! REST API types for the dashboard front-end.
//!
//! Every payload is plain data: the front-end draws charts from these tables
//! and formats numbers itself.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::{
    CategoryQuantity, DailyOrders, Dataset, DateRange, LocationCount, RfmRow,
};
use crate::transform::dashboard::Dashboard;

/// `start` / `end` query parameters, `YYYY-MM-DD`, both optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Query for the category ranking.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    /// Length of the best/worst lists (default 5).
    pub top: Option<usize>,
}

/// Loaded file metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetMetadata {
    pub encoding: String,
    pub delimiter: String,
    pub row_count: usize,
    pub skipped_rows: usize,
    pub columns: Vec<String>,
}

impl From<&Dataset> for DatasetMetadata {
    fn from(dataset: &Dataset) -> Self {
        let info = dataset.info();
        Self {
            encoding: info.encoding.clone(),
            delimiter: info.delimiter.to_string(),
            row_count: info.row_count,
            skipped_rows: info.skipped_rows,
            columns: info.headers.clone(),
        }
    }
}

/// Date bounds the date picker should offer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeResponse {
    pub bounds: Option<DateRange>,
    pub dataset: DatasetMetadata,
}

/// Response for `/api/dashboard`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub request_id: String,

    /// "ready" or "empty" (no rows in range)
    pub status: String,

    pub dashboard: Dashboard,
}

impl From<Dashboard> for DashboardResponse {
    fn from(dashboard: Dashboard) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            status: if dashboard.row_count == 0 { "empty" } else { "ready" }.to_string(),
            dashboard,
        }
    }
}

/// Response for the single-table endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableResponse<T> {
    pub request_id: String,
    pub range: Option<DateRange>,
    pub rows: Vec<T>,
}

impl<T> TableResponse<T> {
    pub fn new(range: Option<DateRange>, rows: Vec<T>) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            range,
            rows,
        }
    }
}

pub type DailyOrdersResponse = TableResponse<DailyOrders>;
pub type LocationResponse = TableResponse<LocationCount>;
pub type RfmResponse = TableResponse<RfmRow>;

/// Response for `/api/categories`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoriesResponse {
    pub request_id: String,
    pub range: Option<DateRange>,
    pub ranked: Vec<CategoryQuantity>,
    pub best: Vec<CategoryQuantity>,
    pub worst: Vec<CategoryQuantity>,
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "requestId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
    })
}
