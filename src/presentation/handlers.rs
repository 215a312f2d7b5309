// HTTP request handlers
use crate::application::aggregation::AlarmFilter;
use crate::application::classifier::classify;
use crate::domain::severity::Severity;
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use crate::presentation::error::{ApiError, ApiResult};
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{HeaderMap, Response, StatusCode},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const DEFAULT_READING_LIMIT: usize = 100;
const DEFAULT_ALARM_LIMIT: usize = 100;

#[derive(Deserialize)]
pub struct TopQuery {
    #[serde(alias = "n")]
    pub top: Option<usize>,
}

#[derive(Deserialize)]
pub struct ClassifyQuery {
    pub parameter: String,
    pub value: f64,
}

#[derive(Serialize)]
pub struct ClassifyResponse {
    pub parameter: String,
    pub value: f64,
    pub severity: Severity,
}

#[derive(Deserialize)]
pub struct AlarmQuery {
    pub acknowledged: Option<bool>,
    pub severity: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

impl AlarmQuery {
    fn into_filter(self) -> ApiResult<AlarmFilter> {
        let severity = match self.severity.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(label) => match Severity::from_label(label) {
                Severity::None if !label.eq_ignore_ascii_case("none") => {
                    return Err(ApiError::BadRequest(format!("unknown severity: {}", label)));
                }
                severity => Some(severity),
            },
        };

        Ok(AlarmFilter {
            acknowledged: self.acknowledged,
            severity,
            limit: self.limit.or(Some(DEFAULT_ALARM_LIMIT)),
        })
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Loaded threshold table
pub async fn thresholds(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Response<Body>> {
    let table = state.alarm_service.thresholds();
    Ok(json_response(table, accepts_brotli(&headers)).await?)
}

/// Classify a single value
pub async fn classify_value(
    Query(query): Query<ClassifyQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Response<Body>> {
    let severity = classify(state.alarm_service.thresholds(), &query.parameter, query.value);
    let body = ClassifyResponse {
        parameter: query.parameter,
        value: query.value,
        severity,
    };
    Ok(json_response(&body, false).await?)
}

/// Filtered alarm list, newest first
pub async fn list_alarms(
    Query(query): Query<AlarmQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Response<Body>> {
    let filter = query.into_filter()?;
    let alarms = state.alarm_service.alarms(&filter).await?;
    Ok(json_response(&alarms, accepts_brotli(&headers)).await?)
}

/// Dashboard overview: stats, severity mix, top devices
pub async fn alarm_overview(
    Query(query): Query<TopQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Response<Body>> {
    let top_n = query.top.unwrap_or(state.default_top_n);
    let overview = state.alarm_service.overview(top_n).await?;
    Ok(json_response(&overview, accepts_brotli(&headers)).await?)
}

/// All device aggregates in ranking order
pub async fn device_aggregates(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Response<Body>> {
    let aggregates = state.alarm_service.device_aggregates().await?;
    Ok(json_response(&aggregates, accepts_brotli(&headers)).await?)
}

/// Most alarming devices
pub async fn top_devices(
    Query(query): Query<TopQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Response<Body>> {
    let n = query.top.unwrap_or(state.default_top_n);
    let aggregates = state.alarm_service.top_devices(n).await?;
    Ok(json_response(&aggregates, accepts_brotli(&headers)).await?)
}

/// Alarm summaries per pipeline section
pub async fn sections(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Response<Body>> {
    let sections = state.alarm_service.sections().await?;
    Ok(json_response(&sections, accepts_brotli(&headers)).await?)
}

/// Stream overview snapshots as NDJSON until the client disconnects
pub async fn alarm_feed(
    Query(query): Query<TopQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let top_n = query.top.unwrap_or(state.default_top_n);
    tracing::info!(top_n, refresh = ?state.feed_service.refresh(), "Alarm feed subscriber connected");
    stream_from_receiver(state.feed_service.subscribe(top_n))
}

/// Acknowledge an alarm
pub async fn acknowledge_alarm(
    Path(alarm_id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    state.alarm_service.acknowledge(alarm_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Severity report for a device's recent readings
pub async fn device_severity(
    Path(device_id): Path<String>,
    Query(query): Query<LimitQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Response<Body>> {
    let limit = query.limit.unwrap_or(DEFAULT_READING_LIMIT);
    let report = state.alarm_service.device_severity(&device_id, limit).await?;
    Ok(json_response(&report, accepts_brotli(&headers)).await?)
}
