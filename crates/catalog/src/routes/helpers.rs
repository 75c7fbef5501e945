//! Shared helpers for list routes.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::AppError;
use crate::filter::{ItemListFilters, ProjectIdFilter, SurveyMissionIdFilter};
use crate::pagination::{PaginationInfo, get_pagination_info};
use crate::query::QueryFilters;

/// A page of a filtered collection.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    /// Items matching the filters, across all pages.
    pub total: u64,
    pub pagination: PaginationInfo,
    /// The active filters as a query string, for building links.
    pub query_string: String,
    /// Current value of the search box.
    pub search: String,
}

/// Query parameters with path-only scoping keys removed.
///
/// Scoping ids come from the URL path; a query parameter must not be able to
/// set them.
pub fn user_params(mut params: HashMap<String, String>) -> HashMap<String, String> {
    params.remove(ProjectIdFilter::PUBLIC_NAME);
    params.remove(SurveyMissionIdFilter::PUBLIC_NAME);
    params
}

/// Typed query filters for a filter set.
pub fn query_filters<S: ItemListFilters>(filter_set: &S) -> Result<QueryFilters, AppError> {
    QueryFilters::from_kwargs(&filter_set.as_kwargs())
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Filters that keep only the scoping of `filters`, for the unfiltered total.
pub fn scope_only(filters: &QueryFilters) -> QueryFilters {
    QueryFilters {
        project_id: filters.project_id,
        survey_mission_id: filters.survey_mission_id,
        ..Default::default()
    }
}

/// Assemble a list response from a page and its totals.
#[allow(clippy::too_many_arguments)]
pub fn list_response<T, S: ItemListFilters>(
    items: Vec<T>,
    total_filtered: u64,
    total_unfiltered: u64,
    page: u32,
    page_size: u32,
    collection_url: &str,
    filter_set: &S,
    language: &str,
) -> ListResponse<T> {
    let query_string = filter_set.serialize_to_query_string();
    ListResponse {
        items,
        total: total_filtered,
        pagination: get_pagination_info(
            page,
            page_size,
            total_filtered,
            total_unfiltered,
            collection_url,
            &query_string,
        ),
        search: filter_set.get_text_search_filter(language),
        query_string,
    }
}
