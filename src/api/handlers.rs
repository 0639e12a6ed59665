use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{PreferenceMode, RecommendationItem, RecommendationRequest},
};

use super::AppState;

// Request/Response types

/// Raw query string of `/api/recommend`; every field is optional so missing
/// parameters are reported in the response body rather than as a rejection
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendParams {
    pub username: Option<String>,
    pub genre: Option<String>,
    pub start_year: Option<String>,
    pub end_year: Option<String>,
    pub preference: Option<String>,
}

impl RecommendParams {
    /// Checks required parameters before any upstream work happens
    pub fn validate(self) -> AppResult<RecommendationRequest> {
        let (username, genre, start_year, end_year) = match (
            non_empty(self.username),
            non_empty(self.genre),
            non_empty(self.start_year),
            non_empty(self.end_year),
        ) {
            (Some(u), Some(g), Some(s), Some(e)) => (u, g, s, e),
            _ => {
                return Err(AppError::InvalidInput(
                    "username, genre, startYear, and endYear are required".to_string(),
                ))
            }
        };

        let (start_year, end_year) = match (start_year.parse::<u16>(), end_year.parse::<u16>()) {
            (Ok(s), Ok(e)) => (s, e),
            _ => {
                return Err(AppError::InvalidInput(
                    "startYear and endYear must be years".to_string(),
                ))
            }
        };

        if start_year > end_year {
            return Err(AppError::InvalidInput(
                "startYear must not be after endYear".to_string(),
            ));
        }

        Ok(RecommendationRequest {
            username,
            genre,
            start_year,
            end_year,
            mode: PreferenceMode::from_param(self.preference.as_deref()),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Deserialize)]
pub struct ResetParams {
    pub username: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub success: bool,
    pub results: Vec<RecommendationItem>,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Recommends a few unseen movies for a user
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    query: Result<Query<RecommendParams>, QueryRejection>,
) -> AppResult<Json<RecommendResponse>> {
    let request = query
        .map_err(AppError::from)
        .and_then(|Query(params)| params.validate())
        .inspect_err(|e| {
            tracing::info!(request_id = %request_id, error = %e, "Rejected recommendation request");
        })?;

    tracing::info!(
        request_id = %request_id,
        username = %request.username,
        genre = %request.genre,
        start_year = request.start_year,
        end_year = request.end_year,
        mode = ?request.mode,
        "Processing recommendation request"
    );

    let results = state
        .recommender
        .recommend(&request)
        .await
        .inspect_err(|e| {
            tracing::warn!(request_id = %request_id, error = %e, "Recommendation failed");
        })?;

    tracing::info!(
        request_id = %request_id,
        results = results.len(),
        "Recommendation completed"
    );

    Ok(Json(RecommendResponse {
        success: true,
        results,
    }))
}

/// Clears what has been recommended to a user; a missing username is a no-op
pub async fn reset(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    query: Result<Query<ResetParams>, QueryRejection>,
) -> AppResult<Json<Value>> {
    let Query(params) = query?;

    if let Some(username) = non_empty(params.username) {
        tracing::info!(request_id = %request_id, username = %username, "Resetting recommendations");
        state.recommender.reset(&username).await?;
    }

    Ok(Json(json!({ "success": true })))
}
