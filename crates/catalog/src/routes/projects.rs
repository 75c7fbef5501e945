//! Project routes.

use std::collections::HashMap;

use axum::extract::{Extension, Path, Query, State};
use axum::http::Uri;
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

use super::helpers::{ListResponse, list_response, query_filters, scope_only, user_params};
use crate::error::{AppError, AppResult};
use crate::filter::{ItemListFilters, ProjectListFilters};
use crate::middleware::ResolvedLanguage;
use crate::models::Project;
use crate::pagination::parse_page;
use crate::query;
use crate::state::AppState;

/// Create the project router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/projects", get(list_projects))
        .route("/api/projects/{id}", get(get_project))
}

async fn list_projects(
    State(state): State<AppState>,
    Extension(ResolvedLanguage(language)): Extension<ResolvedLanguage>,
    uri: Uri,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<ListResponse<Project>>> {
    let page = parse_page(&params)?;
    let filter_set = ProjectListFilters::from_params(&user_params(params), &language);
    let filters = query_filters(&filter_set)?;
    let page_size = state.page_size();

    let (items, total) =
        query::paginated_list_projects(state.db(), &filters, page, page_size, true).await?;
    let (_, unfiltered) =
        query::list_projects(state.db(), &scope_only(&filters), 1, 0, true).await?;

    Ok(Json(list_response(
        items,
        total.unwrap_or_default(),
        unfiltered.unwrap_or_default(),
        page,
        page_size,
        uri.path(),
        &filter_set,
        &language,
    )))
}

async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Project>> {
    query::get_project(state.db(), id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}
