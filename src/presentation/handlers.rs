// HTTP request handlers
use crate::application::settings_service::SettingsForm;
use crate::domain::filter::SampleFilter;
use crate::domain::view::View;
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::infrastructure::csv_export::{export_csv, export_file_name};
use crate::infrastructure::http_response::{accepts_brotli, csv_attachment, json_response};
use crate::infrastructure::json_mapper::{
    alert_to_json, live_dashboard_to_json, report_dashboard_to_json, sample_to_json,
    settings_to_json, view_to_json, AlertJson, SampleJson, SettingsJson, ViewJson,
};
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiError;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use chrono::{FixedOffset, Local, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const DEFAULT_INCIDENT_DAYS: usize = 14;
const MAX_INCIDENT_DAYS: usize = 366;

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub search: Option<String>,
    pub severity: Option<String>,
    pub device: Option<String>,
    pub range: Option<String>,
    pub days: Option<usize>,
    pub tz_offset_minutes: Option<i32>,
}

impl ReportQuery {
    fn filter(&self) -> Result<SampleFilter, ApiError> {
        Ok(SampleFilter::parse(
            self.search.as_deref(),
            self.severity.as_deref(),
            self.device.as_deref(),
            self.range.as_deref(),
        )?)
    }

    fn days(&self) -> Result<usize, ApiError> {
        match self.days {
            None => Ok(DEFAULT_INCIDENT_DAYS),
            Some(days) if (1..=MAX_INCIDENT_DAYS).contains(&days) => Ok(days),
            Some(days) => Err(ApiError::BadRequest(format!(
                "days must be between 1 and {}, got {}",
                MAX_INCIDENT_DAYS, days
            ))),
        }
    }

    fn time_zone(&self) -> Result<Option<FixedOffset>, ApiError> {
        self.tz_offset_minutes
            .map(|minutes| {
                minutes
                    .checked_mul(60)
                    .and_then(FixedOffset::east_opt)
                    .ok_or_else(|| {
                        ApiError::BadRequest(format!("invalid tz_offset_minutes {}", minutes))
                    })
            })
            .transpose()
    }
}

#[derive(Debug, Deserialize)]
pub struct AlertQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub redirect: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRequest {
    pub notifications: bool,
    pub sampling_interval: f64,
    pub theft_threshold: f64,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Entering the root lands on the login view
pub async fn root_redirect() -> Redirect {
    Redirect::to(&View::resolve("/").path())
}

/// Sidebar navigation entries
pub async fn list_views() -> Json<Vec<ViewJson>> {
    Json(View::NAVIGATION.into_iter().map(view_to_json).collect())
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let view = state.auth_service.login(&request.email, &request.password)?;
    Ok(Json(LoginResponse {
        redirect: view.path(),
    }))
}

/// Latest reading and the real-time flow chart
pub async fn live_dashboard(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let dashboard = state.monitor.live_dashboard();
    json_response(&live_dashboard_to_json(&dashboard), accepts_brotli(&headers))
        .await
        .unwrap_or_else(IntoResponse::into_response)
}

/// Summary cards, charts and the filtered report table
pub async fn reports(
    Query(query): Query<ReportQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let filter = query.filter()?;
    let days = query.days()?;
    let now = Utc::now();

    let dashboard = match query.time_zone()? {
        Some(offset) => state.monitor.report_dashboard(&filter, days, &offset, now),
        None => state.monitor.report_dashboard(&filter, days, &Local, now),
    };

    Ok(json_response(&report_dashboard_to_json(&dashboard), accepts_brotli(&headers)).await?)
}

/// Generate one reading now into the report log, outside the regular schedule
pub async fn add_report_row(State(state): State<Arc<AppState>>) -> Json<SampleJson> {
    let sample = state.monitor.add_report_row(Utc::now());
    Json(sample_to_json(&sample))
}

/// Download the filtered report rows as CSV
pub async fn export_reports_csv(
    Query(query): Query<ReportQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let filter = query.filter()?;
    let now = Utc::now();
    let rows = state.monitor.filtered_rows(&filter, now);

    let data = export_csv(rows.iter())?;
    tracing::debug!("Exporting {} report rows", rows.len());
    Ok(csv_attachment(data, &export_file_name(now))?)
}

pub async fn alerts(
    Query(query): Query<AlertQuery>,
    State(state): State<Arc<AppState>>,
) -> Json<Vec<AlertJson>> {
    let limit = query.limit.unwrap_or(state.alert_limit).min(state.alert_limit);
    Json(state.monitor.alerts(limit).iter().map(alert_to_json).collect())
}

pub async fn get_settings(State(state): State<Arc<AppState>>) -> Json<SettingsJson> {
    Json(settings_to_json(&state.settings_service.current()))
}

/// Validate, apply and echo back the submitted settings
pub async fn save_settings(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SettingsRequest>,
) -> Result<Json<SettingsJson>, ApiError> {
    let saved = state.settings_service.save(SettingsForm {
        notifications_enabled: request.notifications,
        sampling_interval_secs: request.sampling_interval,
        theft_threshold_amps: request.theft_threshold,
    })?;
    Ok(Json(settings_to_json(&saved)))
}

/// Stream new readings as they are generated (progressive updates)
pub async fn stream_live(headers: HeaderMap, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let rx = state.monitor.subscribe();
    stream_from_receiver(rx, accepts_brotli(&headers))
}
