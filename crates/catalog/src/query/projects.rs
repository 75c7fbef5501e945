//! Project queries.

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    CatalogQueryBuilder, CatalogTable, ListOrder, ListResult, QueryFilters, fetch_one_row,
    page_bounds, run_list,
};
use crate::models::Project;

fn projects_query(filters: &QueryFilters) -> CatalogQueryBuilder {
    CatalogQueryBuilder::new(CatalogTable::Project)
        .filters(filters)
        .order(ListOrder::Name("en".to_string()))
}

/// List projects matching `filters`, ordered by English name.
pub async fn list_projects(
    pool: &PgPool,
    filters: &QueryFilters,
    limit: u64,
    offset: u64,
    include_total: bool,
) -> Result<ListResult<Project>> {
    let query = projects_query(filters).list_sql(limit, offset);
    run_list(pool, query, include_total).await
}

pub async fn paginated_list_projects(
    pool: &PgPool,
    filters: &QueryFilters,
    page: u32,
    page_size: u32,
    include_total: bool,
) -> Result<ListResult<Project>> {
    let (limit, offset) = page_bounds(page, page_size);
    list_projects(pool, filters, limit, offset, include_total).await
}

/// Every project matching `filters`.
pub async fn collect_all_projects(pool: &PgPool, filters: &QueryFilters) -> Result<Vec<Project>> {
    let (_, total) = list_projects(pool, filters, 1, 0, true).await?;
    let (items, _) = list_projects(pool, filters, total.unwrap_or_default(), 0, false).await?;
    Ok(items)
}

pub async fn get_project(pool: &PgPool, project_id: Uuid) -> Result<Option<Project>> {
    let sql = CatalogQueryBuilder::new(CatalogTable::Project)
        .where_uuid("id", project_id)
        .build(1, 0);
    fetch_one_row(pool, CatalogTable::Project, &sql).await
}

pub async fn get_project_by_english_name(
    pool: &PgPool,
    english_name: &str,
) -> Result<Option<Project>> {
    let sql = CatalogQueryBuilder::new(CatalogTable::Project)
        .where_english_name(english_name)
        .build(1, 0);
    fetch_one_row(pool, CatalogTable::Project, &sql).await
}
