//! Survey-related record routes, including the per-mission listing and assets.

use std::collections::HashMap;

use axum::extract::{Extension, Path, Query, State};
use axum::http::Uri;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use uuid::Uuid;

use super::helpers::{ListResponse, list_response, query_filters, scope_only, user_params};
use crate::error::{AppError, AppResult};
use crate::filter::{ItemListFilters, SurveyMissionIdFilter, SurveyRelatedRecordListFilters};
use crate::middleware::ResolvedLanguage;
use crate::models::{RecordAsset, SurveyRelatedRecord};
use crate::pagination::{get_pagination_info, parse_page};
use crate::query;
use crate::state::AppState;

/// Create the survey-related record router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/survey-related-records", get(list_survey_related_records))
        .route(
            "/api/survey-related-records/{id}",
            get(get_survey_related_record),
        )
        .route(
            "/api/survey-related-records/{id}/assets",
            get(list_record_assets),
        )
        .route(
            "/api/survey-missions/{id}/survey-related-records",
            get(list_mission_survey_related_records),
        )
}

/// A record with all of its assets, which are always few.
#[derive(Serialize)]
struct SurveyRelatedRecordDetail {
    #[serde(flatten)]
    record: SurveyRelatedRecord,
    assets: Vec<RecordAsset>,
}

async fn list_survey_related_records(
    State(state): State<AppState>,
    Extension(ResolvedLanguage(language)): Extension<ResolvedLanguage>,
    uri: Uri,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<ListResponse<SurveyRelatedRecord>>> {
    list(&state, &language, uri.path(), user_params(params))
        .await
        .map(Json)
}

async fn list_mission_survey_related_records(
    State(state): State<AppState>,
    Extension(ResolvedLanguage(language)): Extension<ResolvedLanguage>,
    uri: Uri,
    Path(survey_mission_id): Path<Uuid>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<ListResponse<SurveyRelatedRecord>>> {
    if query::get_survey_mission(state.db(), survey_mission_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound);
    }
    let mut params = user_params(params);
    params.insert(
        SurveyMissionIdFilter::PUBLIC_NAME.to_string(),
        survey_mission_id.to_string(),
    );
    list(&state, &language, uri.path(), params).await.map(Json)
}

async fn list(
    state: &AppState,
    language: &str,
    collection_url: &str,
    params: HashMap<String, String>,
) -> AppResult<ListResponse<SurveyRelatedRecord>> {
    let page = parse_page(&params)?;
    let filter_set = SurveyRelatedRecordListFilters::from_params(&params, language);
    let filters = query_filters(&filter_set)?;
    let page_size = state.page_size();

    let (items, total) = query::paginated_list_survey_related_records(
        state.db(),
        &filters,
        page,
        page_size,
        true,
    )
    .await?;
    let (_, unfiltered) =
        query::list_survey_related_records(state.db(), &scope_only(&filters), 1, 0, true)
            .await?;

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

async fn get_survey_related_record(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SurveyRelatedRecordDetail>> {
    let record = query::get_survey_related_record(state.db(), id)
        .await?
        .ok_or(AppError::NotFound)?;
    let assets = query::collect_all_record_assets(state.db(), record.id).await?;
    Ok(Json(SurveyRelatedRecordDetail { record, assets }))
}

async fn list_record_assets(
    State(state): State<AppState>,
    uri: Uri,
    Path(id): Path<Uuid>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<ListResponse<RecordAsset>>> {
    let page = parse_page(&params)?;
    if query::get_survey_related_record(state.db(), id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound);
    }
    let page_size = state.page_size();
    let (limit, offset) = query::page_bounds(page, page_size);
    let (items, total) = query::list_record_assets(state.db(), id, limit, offset, true).await?;
    let total = total.unwrap_or_default();

    Ok(Json(ListResponse {
        items,
        total,
        pagination: get_pagination_info(page, page_size, total, total, uri.path(), ""),
        query_string: String::new(),
        search: String::new(),
    }))
}
