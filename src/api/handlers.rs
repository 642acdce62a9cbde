use std::collections::HashSet;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::request_id::RequestId;
use crate::models::{Item, ItemId, PreferenceProfile, ScoredItem};
use crate::services::recommendations::{PublishedRecommendations, RecommendationQuery};

use super::AppState;

// Request types

#[derive(Debug, Deserialize)]
pub struct AddTagRequest {
    pub tag: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecommendationParams {
    /// Item currently being viewed
    pub current: Option<String>,
    /// Comma-separated ids to leave out
    pub exclude: Option<String>,
    pub limit: Option<usize>,
}

impl From<RecommendationParams> for RecommendationQuery {
    fn from(params: RecommendationParams) -> Self {
        let exclude_ids: HashSet<ItemId> = params
            .exclude
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(ItemId::from)
            .collect();

        Self {
            current_item_id: params
                .current
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(ItemId::from),
            exclude_ids,
            limit: params.limit,
        }
    }
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Get the session's preference profile
pub async fn get_preferences(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> Json<PreferenceProfile> {
    Json(state.preferences.load(&session).await)
}

/// Schedules a background refresh for the updated profile and echoes it back
async fn after_mutation(
    state: &AppState,
    session: &str,
    profile: PreferenceProfile,
) -> Json<PreferenceProfile> {
    state
        .refresh_recommendations(session, profile.clone())
        .await;
    Json(profile)
}

/// Remove every favorite tag and item
///
/// An empty profile has no recommendations, so the session's feed is dropped
/// instead of refreshed.
pub async fn clear_preferences(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> AppResult<Json<PreferenceProfile>> {
    let profile = state.preferences.clear(&session).await?;
    state.forget_recommendations(&session).await;
    Ok(Json(profile))
}

/// Add a favorite tag
pub async fn add_tag(
    State(state): State<AppState>,
    Path(session): Path<String>,
    Json(request): Json<AddTagRequest>,
) -> AppResult<Json<PreferenceProfile>> {
    let profile = state.preferences.add_tag(&session, &request.tag).await?;
    Ok(after_mutation(&state, &session, profile).await)
}

/// Remove a single favorite tag
pub async fn remove_tag(
    State(state): State<AppState>,
    Path((session, tag)): Path<(String, String)>,
) -> AppResult<Json<PreferenceProfile>> {
    let profile = state.preferences.remove_tag(&session, &tag).await?;
    Ok(after_mutation(&state, &session, profile).await)
}

/// Remove all favorite tags, keeping favorite items
pub async fn clear_tags(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> AppResult<Json<PreferenceProfile>> {
    let profile = state.preferences.clear_tags(&session).await?;
    Ok(after_mutation(&state, &session, profile).await)
}

/// Add a favorite item
pub async fn add_item(
    State(state): State<AppState>,
    Path(session): Path<String>,
    Json(item): Json<Item>,
) -> AppResult<Json<PreferenceProfile>> {
    let profile = state.preferences.add_item(&session, item).await?;
    Ok(after_mutation(&state, &session, profile).await)
}

/// Remove a favorite item
pub async fn remove_item(
    State(state): State<AppState>,
    Path((session, item_id)): Path<(String, String)>,
) -> AppResult<Json<PreferenceProfile>> {
    let profile = state
        .preferences
        .remove_item(&session, &ItemId::new(item_id))
        .await?;
    Ok(after_mutation(&state, &session, profile).await)
}

/// Compute recommendations for the session's current profile
pub async fn get_recommendations(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(session): Path<String>,
    Query(params): Query<RecommendationParams>,
) -> Json<Vec<ScoredItem>> {
    let query = RecommendationQuery::from(params);

    tracing::info!(
        request_id = %request_id,
        session = %session,
        excluded = query.exclude_ids.len(),
        "Processing recommendation request"
    );

    let profile = state.preferences.load(&session).await;
    let ranked = state.engine.compute_recommendations(&profile, &query).await;

    Json(ranked)
}

/// Latest result of the background refresh triggered by profile changes
pub async fn get_latest_recommendations(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> AppResult<Json<PublishedRecommendations>> {
    let feed = state
        .feeds
        .existing(&session)
        .await
        .ok_or_else(|| AppError::NotFound(format!("No recommendations for session {}", session)))?;

    feed.latest()
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Recommendations are still being computed".to_string()))
}
