//! Survey mission queries.

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    CatalogQueryBuilder, CatalogTable, ListOrder, ListResult, QueryFilters, fetch_one_row,
    page_bounds, run_list,
};
use crate::models::SurveyMission;

fn survey_missions_query(filters: &QueryFilters) -> CatalogQueryBuilder {
    CatalogQueryBuilder::new(CatalogTable::SurveyMission)
        .filters(filters)
        .order(ListOrder::Name("en".to_string()))
}

/// List survey missions matching `filters`, ordered by English name.
///
/// `filters.project_id` scopes the list to one project.
pub async fn list_survey_missions(
    pool: &PgPool,
    filters: &QueryFilters,
    limit: u64,
    offset: u64,
    include_total: bool,
) -> Result<ListResult<SurveyMission>> {
    let query = survey_missions_query(filters).list_sql(limit, offset);
    run_list(pool, query, include_total).await
}

pub async fn paginated_list_survey_missions(
    pool: &PgPool,
    filters: &QueryFilters,
    page: u32,
    page_size: u32,
    include_total: bool,
) -> Result<ListResult<SurveyMission>> {
    let (limit, offset) = page_bounds(page, page_size);
    list_survey_missions(pool, filters, limit, offset, include_total).await
}

pub async fn collect_all_survey_missions(
    pool: &PgPool,
    filters: &QueryFilters,
) -> Result<Vec<SurveyMission>> {
    let (_, total) = list_survey_missions(pool, filters, 1, 0, true).await?;
    let (items, _) =
        list_survey_missions(pool, filters, total.unwrap_or_default(), 0, false).await?;
    Ok(items)
}

pub async fn get_survey_mission(
    pool: &PgPool,
    survey_mission_id: Uuid,
) -> Result<Option<SurveyMission>> {
    let sql = CatalogQueryBuilder::new(CatalogTable::SurveyMission)
        .where_uuid("id", survey_mission_id)
        .build(1, 0);
    fetch_one_row(pool, CatalogTable::SurveyMission, &sql).await
}

/// Mission names are unique within a project, not globally.
pub async fn get_survey_mission_by_english_name(
    pool: &PgPool,
    project_id: Uuid,
    english_name: &str,
) -> Result<Option<SurveyMission>> {
    let sql = CatalogQueryBuilder::new(CatalogTable::SurveyMission)
        .where_uuid("project_id", project_id)
        .where_english_name(english_name)
        .build(1, 0);
    fetch_one_row(pool, CatalogTable::SurveyMission, &sql).await
}
