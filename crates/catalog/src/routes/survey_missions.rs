//! Survey mission routes, including the per-project listing.

use std::collections::HashMap;

use axum::extract::{Extension, Path, Query, State};
use axum::http::Uri;
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

use super::helpers::{ListResponse, list_response, query_filters, scope_only, user_params};
use crate::error::{AppError, AppResult};
use crate::filter::{ItemListFilters, ProjectIdFilter, SurveyMissionListFilters};
use crate::middleware::ResolvedLanguage;
use crate::models::SurveyMission;
use crate::pagination::parse_page;
use crate::query;
use crate::state::AppState;

/// Create the survey mission router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/survey-missions", get(list_survey_missions))
        .route("/api/survey-missions/{id}", get(get_survey_mission))
        .route(
            "/api/projects/{id}/survey-missions",
            get(list_project_survey_missions),
        )
}

async fn list_survey_missions(
    State(state): State<AppState>,
    Extension(ResolvedLanguage(language)): Extension<ResolvedLanguage>,
    uri: Uri,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<ListResponse<SurveyMission>>> {
    list(&state, &language, uri.path(), user_params(params))
        .await
        .map(Json)
}

async fn list_project_survey_missions(
    State(state): State<AppState>,
    Extension(ResolvedLanguage(language)): Extension<ResolvedLanguage>,
    uri: Uri,
    Path(project_id): Path<Uuid>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<ListResponse<SurveyMission>>> {
    if query::get_project(state.db(), project_id).await?.is_none() {
        return Err(AppError::NotFound);
    }
    let mut params = user_params(params);
    params.insert(
        ProjectIdFilter::PUBLIC_NAME.to_string(),
        project_id.to_string(),
    );
    list(&state, &language, uri.path(), params).await.map(Json)
}

async fn list(
    state: &AppState,
    language: &str,
    collection_url: &str,
    params: HashMap<String, String>,
) -> AppResult<ListResponse<SurveyMission>> {
    let page = parse_page(&params)?;
    let filter_set = SurveyMissionListFilters::from_params(&params, language);
    let filters = query_filters(&filter_set)?;
    let page_size = state.page_size();

    let (items, total) =
        query::paginated_list_survey_missions(state.db(), &filters, page, page_size, true).await?;
    let (_, unfiltered) =
        query::list_survey_missions(state.db(), &scope_only(&filters), 1, 0, true).await?;

    Ok(list_response(
        items,
        total.unwrap_or_default(),
        unfiltered.unwrap_or_default(),
        page,
        page_size,
        collection_url,
        &filter_set,
        language,
    ))
}

async fn get_survey_mission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SurveyMission>> {
    query::get_survey_mission(state.db(), id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}
