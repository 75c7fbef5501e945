//! Paginated catalog queries.
//!
//! Every list operation takes [`QueryFilters`] plus `limit`/`offset` and an
//! `include_total` flag, and returns the page together with the total
//! number of matching rows when it was asked for. Count and page are read
//! in one transaction with a statement timeout.

pub mod builder;
pub mod projects;
pub mod record_assets;
pub mod survey_missions;
pub mod survey_related_records;
pub mod vocabularies;

use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::filter::{
    FilterError, FilterKwargs, FilterValue, Polygon, TemporalExtentFilterValue, names,
};

pub use builder::{CatalogQueryBuilder, CatalogTable, ListOrder, ListSql};
pub use projects::{
    collect_all_projects, get_project, get_project_by_english_name, list_projects,
    paginated_list_projects,
};
pub use record_assets::{collect_all_record_assets, get_record_asset, list_record_assets};
pub use survey_missions::{
    collect_all_survey_missions, get_survey_mission, get_survey_mission_by_english_name,
    list_survey_missions, paginated_list_survey_missions,
};
pub use survey_related_records::{
    collect_all_survey_related_records, get_survey_related_record,
    get_survey_related_record_by_english_name, list_survey_related_records,
    paginated_list_survey_related_records,
};
pub use vocabularies::{
    collect_all_vocabulary_terms, get_vocabulary_term, get_vocabulary_term_by_english_name,
    list_vocabulary_terms,
};

/// Statement timeout applied to list queries.
const STATEMENT_TIMEOUT: &str = "10s";

/// A page of items and, when requested, the total number of matches.
pub type ListResult<T> = (Vec<T>, Option<u64>);

/// Typed query keyword arguments.
///
/// Absent fields add no constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryFilters {
    pub spatial_intersect: Option<Polygon>,
    pub temporal_extent: Option<TemporalExtentFilterValue>,
    pub en_name_filter: Option<String>,
    pub pt_name_filter: Option<String>,
    pub dataset_category_filter: Option<String>,
    pub domain_type_filter: Option<String>,
    pub workflow_stage_filter: Option<String>,
    pub project_id: Option<Uuid>,
    pub survey_mission_id: Option<Uuid>,
}

impl QueryFilters {
    /// Convert filter-set kwargs.
    ///
    /// Keys outside the query vocabulary and values of the wrong kind are
    /// ignored. Scoping ids must be UUIDs.
    pub fn from_kwargs(kwargs: &FilterKwargs) -> Result<Self, FilterError> {
        let mut filters = Self::default();
        for (name, value) in kwargs {
            match (name.as_str(), value) {
                (names::SPATIAL_INTERSECT, FilterValue::BoundingBox(polygon)) => {
                    filters.spatial_intersect = Some(polygon.clone());
                }
                (names::TEMPORAL_EXTENT, FilterValue::TemporalExtent(extent)) => {
                    filters.temporal_extent = Some(*extent);
                }
                (names::EN_NAME, FilterValue::Text(text)) => {
                    filters.en_name_filter = Some(text.clone());
                }
                (names::PT_NAME, FilterValue::Text(text)) => {
                    filters.pt_name_filter = Some(text.clone());
                }
                (names::DATASET_CATEGORY, FilterValue::Text(text)) => {
                    filters.dataset_category_filter = Some(text.clone());
                }
                (names::DOMAIN_TYPE, FilterValue::Text(text)) => {
                    filters.domain_type_filter = Some(text.clone());
                }
                (names::WORKFLOW_STAGE, FilterValue::Text(text)) => {
                    filters.workflow_stage_filter = Some(text.clone());
                }
                (names::PROJECT_ID, FilterValue::Text(text)) => {
                    filters.project_id = Some(parse_identifier(name, text)?);
                }
                (names::SURVEY_MISSION_ID, FilterValue::Text(text)) => {
                    filters.survey_mission_id = Some(parse_identifier(name, text)?);
                }
                _ => tracing::debug!(kwarg = %name, "ignoring unsupported query kwarg"),
            }
        }
        Ok(filters)
    }
}

fn parse_identifier(name: &str, value: &str) -> Result<Uuid, FilterError> {
    Uuid::parse_str(value.trim()).map_err(|_| FilterError::InvalidIdentifier {
        name: name.to_string(),
        value: value.to_string(),
    })
}

/// `(limit, offset)` for a 1-based page. Page 0 is treated as page 1.
pub fn page_bounds(page: u32, page_size: u32) -> (u64, u64) {
    let limit = u64::from(page_size);
    (limit, limit * u64::from(page.saturating_sub(1)))
}

/// Run the page query, and the count query when asked, in one read transaction.
///
/// Takes rendered SQL so no query-builder state is held across an await.
pub(crate) async fn run_list<T>(
    pool: &PgPool,
    query: ListSql,
    include_total: bool,
) -> Result<ListResult<T>>
where
    T: for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin,
{
    let table = query.table.name();
    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    sqlx::query(&format!("SET LOCAL statement_timeout = '{STATEMENT_TIMEOUT}'"))
        .execute(&mut *tx)
        .await
        .context("failed to set statement timeout")?;

    let items: Vec<T> = sqlx::query_as(&query.select)
        .fetch_all(&mut *tx)
        .await
        .with_context(|| format!("failed to list {table}"))?;

    let total = if include_total {
        let count: i64 = sqlx::query_scalar(&query.count)
            .fetch_one(&mut *tx)
            .await
            .with_context(|| format!("failed to count {table}"))?;
        Some(u64::try_from(count).unwrap_or_default())
    } else {
        None
    };

    tx.commit()
        .await
        .context("failed to commit list transaction")?;

    tracing::debug!(
        table,
        limit = query.limit,
        offset = query.offset,
        items = items.len(),
        ?total,
        "listed"
    );
    Ok((items, total))
}

/// Fetch at most one row of `table` with a rendered `SELECT`.
pub(crate) async fn fetch_one_row<T>(
    pool: &PgPool,
    table: CatalogTable,
    sql: &str,
) -> Result<Option<T>>
where
    T: for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin,
{
    sqlx::query_as(sql)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("failed to fetch {}", table.name()))
}
