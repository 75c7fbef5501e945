//! Survey-related record queries.

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    CatalogQueryBuilder, CatalogTable, ListOrder, ListResult, QueryFilters, fetch_one_row,
    page_bounds, run_list,
};
use crate::models::SurveyRelatedRecord;

fn survey_related_records_query(filters: &QueryFilters) -> CatalogQueryBuilder {
    CatalogQueryBuilder::new(CatalogTable::SurveyRelatedRecord)
        .filters(filters)
        .order(ListOrder::MostRecent)
}

/// List survey-related records matching `filters`.
///
/// Ordered by most recent temporal extent end, then most recent begin,
/// with unknown dates last.
pub async fn list_survey_related_records(
    pool: &PgPool,
    filters: &QueryFilters,
    limit: u64,
    offset: u64,
    include_total: bool,
) -> Result<ListResult<SurveyRelatedRecord>> {
    let query = survey_related_records_query(filters).list_sql(limit, offset);
    run_list(pool, query, include_total).await
}

pub async fn paginated_list_survey_related_records(
    pool: &PgPool,
    filters: &QueryFilters,
    page: u32,
    page_size: u32,
    include_total: bool,
) -> Result<ListResult<SurveyRelatedRecord>> {
    let (limit, offset) = page_bounds(page, page_size);
    list_survey_related_records(pool, filters, limit, offset, include_total).await
}

pub async fn collect_all_survey_related_records(
    pool: &PgPool,
    filters: &QueryFilters,
) -> Result<Vec<SurveyRelatedRecord>> {
    let (_, total) = list_survey_related_records(pool, filters, 1, 0, true).await?;
    let (items, _) =
        list_survey_related_records(pool, filters, total.unwrap_or_default(), 0, false).await?;
    Ok(items)
}

pub async fn get_survey_related_record(
    pool: &PgPool,
    survey_related_record_id: Uuid,
) -> Result<Option<SurveyRelatedRecord>> {
    let sql = CatalogQueryBuilder::new(CatalogTable::SurveyRelatedRecord)
        .where_uuid("id", survey_related_record_id)
        .build(1, 0);
    fetch_one_row(pool, CatalogTable::SurveyRelatedRecord, &sql).await
}

pub async fn get_survey_related_record_by_english_name(
    pool: &PgPool,
    survey_mission_id: Uuid,
    english_name: &str,
) -> Result<Option<SurveyRelatedRecord>> {
    let sql = CatalogQueryBuilder::new(CatalogTable::SurveyRelatedRecord)
        .where_uuid("survey_mission_id", survey_mission_id)
        .where_english_name(english_name)
        .build(1, 0);
    fetch_one_row(pool, CatalogTable::SurveyRelatedRecord, &sql).await
}
