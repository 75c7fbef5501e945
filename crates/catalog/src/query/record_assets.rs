//! Record asset queries.

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use super::{CatalogQueryBuilder, CatalogTable, ListOrder, ListResult, fetch_one_row, run_list};
use crate::models::RecordAsset;

fn record_assets_query(survey_related_record_id: Uuid) -> CatalogQueryBuilder {
    CatalogQueryBuilder::new(CatalogTable::RecordAsset)
        .where_uuid("survey_related_record_id", survey_related_record_id)
        .order(ListOrder::Name("en".to_string()))
}

/// List the assets of one survey-related record.
pub async fn list_record_assets(
    pool: &PgPool,
    survey_related_record_id: Uuid,
    limit: u64,
    offset: u64,
    include_total: bool,
) -> Result<ListResult<RecordAsset>> {
    let query = record_assets_query(survey_related_record_id).list_sql(limit, offset);
    run_list(pool, query, include_total).await
}

pub async fn collect_all_record_assets(
    pool: &PgPool,
    survey_related_record_id: Uuid,
) -> Result<Vec<RecordAsset>> {
    let (_, total) = list_record_assets(pool, survey_related_record_id, 1, 0, true).await?;
    let (items, _) = list_record_assets(
        pool,
        survey_related_record_id,
        total.unwrap_or_default(),
        0,
        false,
    )
    .await?;
    Ok(items)
}

pub async fn get_record_asset(
    pool: &PgPool,
    record_asset_id: Uuid,
) -> Result<Option<RecordAsset>> {
    let sql = CatalogQueryBuilder::new(CatalogTable::RecordAsset)
        .where_uuid("id", record_asset_id)
        .build(1, 0);
    fetch_one_row(pool, CatalogTable::RecordAsset, &sql).await
}
