//! Page parsing and pagination links.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::AppError;

const PAGE_PARAM: &str = "page";

/// Pagination state of a list view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationInfo {
    /// Current page number (1-indexed).
    pub current_page: u32,
    pub page_size: u32,
    pub total_filtered_items: u64,
    pub total_unfiltered_items: u64,
    pub total_filtered_pages: u64,
    pub total_unfiltered_pages: u64,
    pub next_page: Option<u32>,
    pub previous_page: Option<u32>,
    pub collection_url: String,
    pub next_page_url: Option<String>,
    pub previous_page_url: Option<String>,
}

/// Read the 1-based `page` parameter. Absent means page 1.
pub fn parse_page(params: &HashMap<String, String>) -> Result<u32, AppError> {
    let Some(raw) = params.get(PAGE_PARAM) else {
        return Ok(1);
    };
    match raw.trim().parse::<i64>() {
        Ok(page) if page >= 1 => {
            u32::try_from(page).map_err(|_| AppError::BadRequest("Invalid page number".into()))
        }
        _ => Err(AppError::BadRequest("Invalid page number".into())),
    }
}

/// Pages needed for `total_items`. A zero page size yields zero pages.
pub fn get_page_count(total_items: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total_items.div_ceil(u64::from(page_size))
}

/// Build pagination info for a list view.
///
/// `filter_query` is a filter set serialisation (`?a=1&b=2` or empty). It is
/// carried into the next/previous links so paging keeps the active filters.
pub fn get_pagination_info(
    current_page: u32,
    page_size: u32,
    total_filtered_items: u64,
    total_unfiltered_items: u64,
    collection_url: &str,
    filter_query: &str,
) -> PaginationInfo {
    let total_filtered_pages = get_page_count(total_filtered_items, page_size);
    let total_unfiltered_pages = get_page_count(total_unfiltered_items, page_size);
    let next_page = (u64::from(current_page) < total_filtered_pages)
        .then(|| current_page.saturating_add(1));
    let previous_page = (current_page > 1).then(|| current_page - 1);

    let link = |page: u32| page_url(collection_url, page, filter_query);

    PaginationInfo {
        current_page,
        page_size,
        total_filtered_items,
        total_unfiltered_items,
        total_filtered_pages,
        total_unfiltered_pages,
        next_page,
        previous_page,
        collection_url: collection_url.to_string(),
        next_page_url: next_page.map(&link),
        previous_page_url: previous_page.map(&link),
    }
}

fn page_url(collection_url: &str, page: u32, filter_query: &str) -> String {
    let filters = filter_query.trim_start_matches('?');
    if filters.is_empty() {
        format!("{collection_url}?{PAGE_PARAM}={page}")
    } else {
        format!("{collection_url}?{PAGE_PARAM}={page}&{filters}")
    }
}
