//! Tag handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::AppState;
use papershelf_common::{
    db::models::Tag,
    errors::{AppError, Result},
};

/// `POST /tags?name=..&hue=..`
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTagParams {
    #[validate(length(min = 1, max = 64))]
    pub name: String,

    /// Color-wheel angle; stored as given
    pub hue: i32,
}

pub async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<Tag>>> {
    let tags = state.library.list_tags().await?;
    Ok(Json(tags))
}

/// Create a tag; a taken name is a 409
pub async fn create_tag(
    State(state): State<AppState>,
    Query(mut params): Query<CreateTagParams>,
) -> Result<Json<Tag>> {
    params.name = params.name.trim().to_string();
    params.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
    })?;

    let tag = state.library.create_tag(&params.name, params.hue).await?;
    Ok(Json(tag))
}

pub async fn delete_tag(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    state.library.delete_tag(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
