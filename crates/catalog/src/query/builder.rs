//! Catalog query builder using SeaQuery.
//!
//! Turns [`QueryFilters`] into a `SELECT` with pagination and a matching
//! `COUNT(*)`. Both share one predicate list, so the total always counts
//! the rows the page was drawn from.

use sea_query::{
    Alias, Asterisk, Cond, Expr, NullOrdering, Order, PostgresQueryBuilder, Query,
    SelectStatement, SimpleExpr,
};
use uuid::Uuid;

use super::QueryFilters;
use crate::filter::{Polygon, TemporalExtentFilterValue};

/// SRID of every stored footprint.
pub const SRID: u32 = 4326;

/// Catalog tables readable through the query layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogTable {
    Project,
    SurveyMission,
    SurveyRelatedRecord,
    RecordAsset,
    DatasetCategory,
    DomainType,
    WorkflowStage,
}

impl CatalogTable {
    pub fn name(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::SurveyMission => "surveymission",
            Self::SurveyRelatedRecord => "surveyrelatedrecord",
            Self::RecordAsset => "recordasset",
            Self::DatasetCategory => "datasetcategory",
            Self::DomainType => "domaintype",
            Self::WorkflowStage => "workflowstage",
        }
    }

    /// Plain columns selected for this table. Footprints are added separately.
    fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Project => &[
                "id",
                "owner",
                "name",
                "description",
                "status",
                "root_path",
                "is_valid",
                "links",
                "created_at",
                "updated_at",
                "temporal_extent_begin",
                "temporal_extent_end",
            ],
            Self::SurveyMission => &[
                "id",
                "owner",
                "name",
                "description",
                "project_id",
                "status",
                "relative_path",
                "is_valid",
                "links",
                "created_at",
                "updated_at",
                "temporal_extent_begin",
                "temporal_extent_end",
            ],
            Self::SurveyRelatedRecord => &[
                "id",
                "owner",
                "name",
                "description",
                "status",
                "is_valid",
                "survey_mission_id",
                "dataset_category_id",
                "domain_type_id",
                "workflow_stage_id",
                "relative_path",
                "links",
                "created_at",
                "updated_at",
                "temporal_extent_begin",
                "temporal_extent_end",
            ],
            Self::RecordAsset => &[
                "id",
                "name",
                "description",
                "is_valid",
                "survey_related_record_id",
                "relative_path",
                "links",
            ],
            Self::DatasetCategory | Self::DomainType | Self::WorkflowStage => &["id", "name"],
        }
    }

    fn has_footprint(self) -> bool {
        matches!(
            self,
            Self::Project | Self::SurveyMission | Self::SurveyRelatedRecord
        )
    }
}

/// Result ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListOrder {
    /// Most recent temporal extent end first, then most recent begin. Nulls last.
    MostRecent,
    /// Localized name in the given language.
    Name(String),
    /// Primary key only.
    Id,
}

/// Is `language` safe to splice into a JSONB path?
pub fn is_language_code(language: &str) -> bool {
    !language.is_empty()
        && language.len() <= 8
        && language.chars().all(|c| c.is_ascii_alphabetic())
}

/// `name->>'<lang>'`, falling back to English for anything that is not a
/// plain language code.
pub fn localized_name_expr(language: &str) -> SimpleExpr {
    let language = if is_language_code(language) {
        language
    } else {
        tracing::debug!(language, "not a language code, ordering by english name");
        "en"
    };
    Expr::cust(format!("name->>'{language}'"))
}

/// A page query and its count, rendered to SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSql {
    pub table: CatalogTable,
    pub select: String,
    pub count: String,
    pub limit: u64,
    pub offset: u64,
}

/// Query builder for catalog list and detail queries.
#[derive(Debug, Clone)]
pub struct CatalogQueryBuilder {
    table: CatalogTable,
    conditions: Vec<SimpleExpr>,
    order: ListOrder,
}

impl CatalogQueryBuilder {
    pub fn new(table: CatalogTable) -> Self {
        Self {
            table,
            conditions: Vec::new(),
            order: ListOrder::Id,
        }
    }

    pub fn table(&self) -> CatalogTable {
        self.table
    }

    pub fn order(mut self, order: ListOrder) -> Self {
        self.order = order;
        self
    }

    /// Add every predicate expressed by `filters`.
    ///
    /// Vocabulary filters on survey missions match through the mission's
    /// records. Scoping ids only apply to the table that carries them.
    pub fn filters(mut self, filters: &QueryFilters) -> Self {
        if let Some(ref polygon) = filters.spatial_intersect {
            self.conditions.push(spatial_intersect_condition(polygon));
        }
        if let Some(ref extent) = filters.temporal_extent
            && let Some(condition) = temporal_extent_condition(extent)
        {
            self.conditions.push(condition);
        }
        for (language, value) in [
            ("en", &filters.en_name_filter),
            ("pt", &filters.pt_name_filter),
        ] {
            if let Some(value) = value
                && !value.is_empty()
            {
                self.conditions.push(name_contains_condition(language, value));
            }
        }
        for (column, vocabulary_table, value) in [
            (
                "dataset_category_id",
                CatalogTable::DatasetCategory,
                &filters.dataset_category_filter,
            ),
            (
                "domain_type_id",
                CatalogTable::DomainType,
                &filters.domain_type_filter,
            ),
            (
                "workflow_stage_id",
                CatalogTable::WorkflowStage,
                &filters.workflow_stage_filter,
            ),
        ] {
            if let Some(value) = value
                && !value.is_empty()
                && let Some(condition) = self.vocabulary_condition(column, vocabulary_table, value)
            {
                self.conditions.push(condition);
            }
        }
        if let Some(project_id) = filters.project_id
            && self.table == CatalogTable::SurveyMission
        {
            self = self.where_uuid("project_id", project_id);
        }
        if let Some(survey_mission_id) = filters.survey_mission_id
            && self.table == CatalogTable::SurveyRelatedRecord
        {
            self = self.where_uuid("survey_mission_id", survey_mission_id);
        }
        self
    }

    /// `<column> = <id>`.
    pub fn where_uuid(mut self, column: &str, id: Uuid) -> Self {
        self.conditions.push(Expr::col(Alias::new(column)).eq(id));
        self
    }

    /// Exact match on the English name.
    pub fn where_english_name(mut self, english_name: &str) -> Self {
        self.conditions
            .push(Expr::cust("name->>'en'").eq(english_name.to_string()));
        self
    }

    /// Build the main SELECT query with pagination.
    pub fn build(&self, limit: u64, offset: u64) -> String {
        let mut query = Query::select();
        self.add_select_fields(&mut query);
        query.from(Alias::new(self.table.name()));
        self.add_conditions(&mut query);
        self.add_order(&mut query);
        query.limit(limit);
        query.offset(offset);
        query.to_string(PostgresQueryBuilder)
    }

    /// Render the page and count queries together.
    pub fn list_sql(&self, limit: u64, offset: u64) -> ListSql {
        ListSql {
            table: self.table,
            select: self.build(limit, offset),
            count: self.build_count(),
            limit,
            offset,
        }
    }

    /// Build a COUNT query over the same predicates, without ordering or paging.
    pub fn build_count(&self) -> String {
        let mut query = Query::select();
        query.expr(Expr::col(Asterisk).count());
        query.from(Alias::new(self.table.name()));
        self.add_conditions(&mut query);
        query.to_string(PostgresQueryBuilder)
    }

    fn add_select_fields(&self, query: &mut SelectStatement) {
        for column in self.table.columns() {
            query.column((Alias::new(self.table.name()), Alias::new(*column)));
        }
        if self.table.has_footprint() {
            query.expr_as(Expr::cust("ST_AsText(bbox_4326)"), Alias::new("bbox_wkt"));
        }
    }

    fn add_conditions(&self, query: &mut SelectStatement) {
        for condition in &self.conditions {
            query.and_where(condition.clone());
        }
    }

    fn add_order(&self, query: &mut SelectStatement) {
        match &self.order {
            ListOrder::MostRecent => {
                query.order_by_with_nulls(
                    Alias::new("temporal_extent_end"),
                    Order::Desc,
                    NullOrdering::Last,
                );
                query.order_by_with_nulls(
                    Alias::new("temporal_extent_begin"),
                    Order::Desc,
                    NullOrdering::Last,
                );
            }
            ListOrder::Name(language) => {
                query.order_by_expr(localized_name_expr(language), Order::Asc);
            }
            ListOrder::Id => {}
        }
        query.order_by((Alias::new(self.table.name()), Alias::new("id")), Order::Asc);
    }

    fn vocabulary_condition(
        &self,
        column: &str,
        vocabulary_table: CatalogTable,
        value: &str,
    ) -> Option<SimpleExpr> {
        let term_match = format!(
            "{column} IN (SELECT id FROM {} WHERE id::text = $1 OR name->>'en' = $2)",
            vocabulary_table.name()
        );
        match self.table {
            CatalogTable::SurveyRelatedRecord => Some(Expr::cust_with_values(
                term_match,
                [value.to_string(), value.to_string()],
            )),
            CatalogTable::SurveyMission => Some(Expr::cust_with_values(
                format!(
                    "EXISTS (SELECT 1 FROM surveyrelatedrecord WHERE \
                     surveyrelatedrecord.survey_mission_id = surveymission.id AND {term_match})"
                ),
                [value.to_string(), value.to_string()],
            )),
            _ => {
                tracing::debug!(
                    table = self.table.name(),
                    column,
                    "vocabulary filter does not apply to this table"
                );
                None
            }
        }
    }
}

/// Footprint intersects the polygon, or the footprint is unknown.
fn spatial_intersect_condition(polygon: &Polygon) -> SimpleExpr {
    Cond::any()
        .add(Expr::cust_with_values(
            format!("ST_Intersects(bbox_4326, ST_GeomFromText($1, {SRID}))"),
            [polygon.to_wkt()],
        ))
        .add(Expr::col(Alias::new("bbox_4326")).is_null())
        .into()
}

/// Record extent overlaps the filter range. Unknown record bounds match.
fn temporal_extent_condition(extent: &TemporalExtentFilterValue) -> Option<SimpleExpr> {
    if extent.begin.is_none() && extent.end.is_none() {
        return None;
    }
    let mut cond = Cond::all();
    if let Some(begin) = extent.begin {
        cond = cond.add(
            Cond::any()
                .add(Expr::col(Alias::new("temporal_extent_end")).is_null())
                .add(Expr::col(Alias::new("temporal_extent_end")).gte(begin)),
        );
    }
    if let Some(end) = extent.end {
        cond = cond.add(
            Cond::any()
                .add(Expr::col(Alias::new("temporal_extent_begin")).is_null())
                .add(Expr::col(Alias::new("temporal_extent_begin")).lte(end)),
        );
    }
    Some(cond.into())
}

/// Case-insensitive substring match on a localized name.
fn name_contains_condition(language: &str, value: &str) -> SimpleExpr {
    Expr::cust_with_values(
        format!("name->>'{language}' ILIKE $1"),
        [format!("%{}%", escape_like_wildcards(value))],
    )
}

/// Escape SQL LIKE wildcard characters (`%`, `_`, `\`) in a value.
fn escape_like_wildcards(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn project_id() -> Uuid {
        Uuid::parse_str("0b7b7a3c-5a6b-4a8e-9d6e-0d7f2a1c3e55").unwrap()
    }

    #[test]
    fn simple_query_build() {
        let sql = CatalogQueryBuilder::new(CatalogTable::Project)
            .order(ListOrder::Name("en".to_string()))
            .build(20, 40);

        assert!(sql.contains("FROM \"project\""));
        assert!(sql.contains("ST_AsText(bbox_4326) AS \"bbox_wkt\""));
        assert!(sql.contains("ORDER BY name->>'en' ASC, \"project\".\"id\" ASC"));
        assert!(sql.contains("LIMIT 20"));
        assert!(sql.contains("OFFSET 40"));
        assert!(!sql.contains("WHERE"));
    }

    #[test]
    fn count_query_build() {
        let filters = QueryFilters {
            en_name_filter: Some("north".to_string()),
            ..Default::default()
        };
        let sql = CatalogQueryBuilder::new(CatalogTable::Project)
            .filters(&filters)
            .order(ListOrder::Name("en".to_string()))
            .build_count();

        assert!(sql.contains("COUNT(*)"));
        assert!(sql.contains("FROM \"project\""));
        assert!(sql.contains("name->>'en' ILIKE '%north%'"));
        assert!(!sql.contains("LIMIT"));
        assert!(!sql.contains("ORDER BY"));
    }

    #[test]
    fn vocabulary_tables_have_no_footprint() {
        let sql = CatalogQueryBuilder::new(CatalogTable::DomainType).build(5, 0);
        assert!(sql.contains("FROM \"domaintype\""));
        assert!(!sql.contains("bbox"));
    }

    #[test]
    fn spatial_filter_keeps_records_without_footprint() {
        let filters = QueryFilters {
            spatial_intersect: Some(Polygon::from_bounds(0.0, 0.0, 10.0, 10.0)),
            ..Default::default()
        };
        let sql = CatalogQueryBuilder::new(CatalogTable::SurveyRelatedRecord)
            .filters(&filters)
            .build(10, 0);

        assert!(sql.contains(
            "ST_Intersects(bbox_4326, ST_GeomFromText('POLYGON ((10 0, 10 10, 0 10, 0 0, 10 0))', 4326))"
        ));
        assert!(sql.contains("OR \"bbox_4326\" IS NULL"));
    }

    #[test]
    fn temporal_filter_uses_overlap_with_null_bounds() {
        let filters = QueryFilters {
            temporal_extent: Some(TemporalExtentFilterValue {
                begin: NaiveDate::from_ymd_opt(2023, 1, 1),
                end: NaiveDate::from_ymd_opt(2023, 12, 31),
            }),
            ..Default::default()
        };
        let sql = CatalogQueryBuilder::new(CatalogTable::SurveyMission)
            .filters(&filters)
            .build_count();

        assert!(sql.contains("\"temporal_extent_end\" IS NULL"));
        assert!(sql.contains("\"temporal_extent_end\" >= '2023-01-01'"));
        assert!(sql.contains("\"temporal_extent_begin\" IS NULL"));
        assert!(sql.contains("\"temporal_extent_begin\" <= '2023-12-31'"));
    }

    #[test]
    fn temporal_filter_with_only_end() {
        let filters = QueryFilters {
            temporal_extent: Some(TemporalExtentFilterValue {
                begin: None,
                end: NaiveDate::from_ymd_opt(2020, 6, 1),
            }),
            ..Default::default()
        };
        let sql = CatalogQueryBuilder::new(CatalogTable::Project)
            .filters(&filters)
            .build_count();

        assert!(sql.contains("\"temporal_extent_begin\" <= '2020-06-01'"));
        assert!(!sql.contains("temporal_extent_end"));
    }

    #[test]
    fn empty_name_filters_add_no_predicate() {
        let filters = QueryFilters {
            en_name_filter: Some(String::new()),
            pt_name_filter: Some(String::new()),
            ..Default::default()
        };
        let sql = CatalogQueryBuilder::new(CatalogTable::Project)
            .filters(&filters)
            .build_count();
        assert!(!sql.contains("WHERE"));
    }

    #[test]
    fn both_name_filters_are_conjoined() {
        let filters = QueryFilters {
            en_name_filter: Some("sea".to_string()),
            pt_name_filter: Some("mar".to_string()),
            ..Default::default()
        };
        let sql = CatalogQueryBuilder::new(CatalogTable::SurveyMission)
            .filters(&filters)
            .build_count();
        assert!(sql.contains("name->>'en' ILIKE '%sea%'"));
        assert!(sql.contains(" AND "));
        assert!(sql.contains("name->>'pt' ILIKE '%mar%'"));
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like_wildcards("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like_wildcards("a\\b"), "a\\\\b");
        assert_eq!(escape_like_wildcards("plain"), "plain");
    }

    #[test]
    fn project_scope_on_missions() {
        let filters = QueryFilters {
            project_id: Some(project_id()),
            ..Default::default()
        };
        let sql = CatalogQueryBuilder::new(CatalogTable::SurveyMission)
            .filters(&filters)
            .order(ListOrder::Name("en".to_string()))
            .build(20, 0);
        assert!(sql.contains("\"project_id\" = '0b7b7a3c-5a6b-4a8e-9d6e-0d7f2a1c3e55'"));

        let sql = CatalogQueryBuilder::new(CatalogTable::SurveyRelatedRecord)
            .filters(&filters)
            .build_count();
        assert!(!sql.contains("project_id"));
    }

    #[test]
    fn records_are_ordered_most_recent_first() {
        let sql = CatalogQueryBuilder::new(CatalogTable::SurveyRelatedRecord)
            .order(ListOrder::MostRecent)
            .build(20, 0);
        assert!(sql.contains(
            "ORDER BY \"temporal_extent_end\" DESC NULLS LAST, \"temporal_extent_begin\" DESC NULLS LAST, \"surveyrelatedrecord\".\"id\" ASC"
        ));
    }

    #[test]
    fn vocabulary_filter_on_records_matches_id_or_english_name() {
        let filters = QueryFilters {
            dataset_category_filter: Some("bathymetry".to_string()),
            ..Default::default()
        };
        let sql = CatalogQueryBuilder::new(CatalogTable::SurveyRelatedRecord)
            .filters(&filters)
            .build_count();
        assert!(sql.contains(
            "dataset_category_id IN (SELECT id FROM datasetcategory WHERE id::text = 'bathymetry' OR name->>'en' = 'bathymetry')"
        ));
    }

    #[test]
    fn vocabulary_filter_on_missions_goes_through_records() {
        let filters = QueryFilters {
            workflow_stage_filter: Some("raw".to_string()),
            ..Default::default()
        };
        let sql = CatalogQueryBuilder::new(CatalogTable::SurveyMission)
            .filters(&filters)
            .build_count();
        assert!(sql.contains("EXISTS (SELECT 1 FROM surveyrelatedrecord WHERE"));
        assert!(sql.contains("surveyrelatedrecord.survey_mission_id = surveymission.id"));
        assert!(sql.contains("workflow_stage_id IN (SELECT id FROM workflowstage"));
    }

    #[test]
    fn vocabulary_filter_is_ignored_for_projects() {
        let filters = QueryFilters {
            domain_type_filter: Some("x".to_string()),
            ..Default::default()
        };
        let sql = CatalogQueryBuilder::new(CatalogTable::Project)
            .filters(&filters)
            .build_count();
        assert!(!sql.contains("WHERE"));
    }

    #[test]
    fn english_name_lookup() {
        let sql = CatalogQueryBuilder::new(CatalogTable::SurveyRelatedRecord)
            .where_uuid("survey_mission_id", project_id())
            .where_english_name("North line")
            .build(1, 0);
        assert!(sql.contains("(name->>'en') = 'North line'"));
        assert!(sql.contains("LIMIT 1"));
    }

    #[test]
    fn list_sql_renders_page_and_count_together() {
        let filters = QueryFilters {
            en_name_filter: Some("north".to_string()),
            ..Default::default()
        };
        let builder = CatalogQueryBuilder::new(CatalogTable::Project)
            .filters(&filters)
            .order(ListOrder::Name("en".to_string()));
        let query = builder.list_sql(20, 40);

        assert_eq!(query.table, CatalogTable::Project);
        assert_eq!(query.select, builder.build(20, 40));
        assert_eq!(query.count, builder.build_count());
        assert_eq!((query.limit, query.offset), (20, 40));
        assert!(query.count.contains("ILIKE '%north%'"));
    }

    #[test]
    fn language_codes_are_validated() {
        assert!(is_language_code("pt"));
        assert!(is_language_code("en"));
        assert!(!is_language_code(""));
        assert!(!is_language_code("en'; --"));
        let sql = CatalogQueryBuilder::new(CatalogTable::WorkflowStage)
            .order(ListOrder::Name("x'y".to_string()))
            .build(10, 0);
        assert!(sql.contains("ORDER BY name->>'en' ASC"));
    }
}
