//! Request handlers for the query endpoints.

use axum::Json;
use axum::extract::{FromRequestParts, Query, State};
use axum::http::request::Parts;
use tracing::debug;

use super::AppState;
use super::error::{ApiError, ApiResult};
use crate::storage::{Application, Event};

/// Query-string parameters in request order.
///
/// A repeated parameter resolves to its first occurrence.
#[derive(Debug)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn first(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl<S: Send + Sync> FromRequestParts<S> for QueryParams {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
            .map_err(|e| ApiError::InvalidQuery(e.body_text()))?;
        Ok(Self(pairs))
    }
}

/// `GET /applications`
pub async fn list_applications(State(state): State<AppState>) -> ApiResult<Json<Vec<Application>>> {
    let applications = state.db.list_applications().await?;
    Ok(Json(applications))
}

/// `GET /application?app_key=<key>`
pub async fn get_application(
    State(state): State<AppState>,
    params: QueryParams,
) -> ApiResult<Json<Application>> {
    let app_key = required(params.first("app_key"), "app_key")?;
    let application = state.db.get_application(app_key).await?;
    Ok(Json(application))
}

/// `GET /events?app_key=<key>&time=<minutes>`, newest first.
pub async fn list_events(
    State(state): State<AppState>,
    params: QueryParams,
) -> ApiResult<Json<Vec<Event>>> {
    let app_key = required(params.first("app_key"), "app_key")?;
    let window_minutes = parse_window(params.first("time"))?;

    debug!(app_key, window_minutes, "Events requested");

    let events = state
        .db
        .events_for_application(app_key, window_minutes)
        .await?;
    Ok(Json(events))
}

fn required<'a>(value: Option<&'a str>, name: &'static str) -> ApiResult<&'a str> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::MissingParam(name)),
    }
}

/// Parse the `time` parameter: a non-negative whole number of minutes.
fn parse_window(raw: Option<&str>) -> ApiResult<u64> {
    let raw = required(raw, "time")?;
    let minutes: i64 = raw.parse().map_err(|_| ApiError::InvalidParam {
        name: "time",
        reason: format!("{raw:?} is not an integer number of minutes"),
    })?;
    u64::try_from(minutes).map_err(|_| ApiError::InvalidParam {
        name: "time",
        reason: format!("{minutes} is negative"),
    })
}
