//! Paper handlers

use axum::{
    body::Body,
    extract::{Path, Query, Request, State},
    http::{header, HeaderValue, StatusCode},
    response::Response,
    Json,
};
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::debug;

use crate::AppState;
use papershelf_common::{
    db::models::{Paper, Tag},
    errors::Result,
    services::PaperQuery,
};

/// List papers, optionally filtered by `tag` and `query` and ordered by `sort`
pub async fn list_papers(
    State(state): State<AppState>,
    Query(query): Query<PaperQuery>,
) -> Result<Json<Vec<Paper>>> {
    let papers = state.library.list_papers(query).await?;
    Ok(Json(papers))
}

/// Get a paper by id; viewing stamps `last_accessed`
pub async fn get_paper(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Paper>> {
    let paper = state.library.open_paper(&id).await?;
    Ok(Json(paper))
}

/// Stream the PDF backing a paper
pub async fn get_pdf(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Request,
) -> Result<Response> {
    let (paper, path) = state
        .library
        .resolve_pdf(&id, state.config.library.folder_path())
        .await?;
    debug!(paper_id = %paper.id, path = %path.display(), "Serving PDF");

    let mut response = ServeFile::new_with_mime(
        &path,
        &"application/pdf".parse().expect("static MIME type is valid"),
    )
        .oneshot(request)
        .await
        .unwrap_or_else(|never| match never {})
        .map(Body::new);

    if let Ok(disposition) =
        HeaderValue::from_str(&format!("inline; filename=\"{}\"", paper.filename.replace('"', "")))
    {
        response
            .headers_mut()
            .insert(header::CONTENT_DISPOSITION, disposition);
    }

    Ok(response)
}

/// Remove a paper from the catalog; the file on disk is left alone
pub async fn delete_paper(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.library.delete_paper(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_paper_tags(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Tag>>> {
    let tags = state.library.paper_tags(&id).await?;
    Ok(Json(tags))
}

pub async fn attach_tag(
    State(state): State<AppState>,
    Path((id, tag_id)): Path<(String, i32)>,
) -> Result<StatusCode> {
    state.library.tag_paper(&id, tag_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn detach_tag(
    State(state): State<AppState>,
    Path((id, tag_id)): Path<(String, i32)>,
) -> Result<StatusCode> {
    state.library.untag_paper(&id, tag_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
