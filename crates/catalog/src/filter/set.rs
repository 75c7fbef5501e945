//! Per-entity composite filter sets.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::Value;

use super::error::FilterError;
use super::single::{
    AnyListFilter, BoundingBoxFilter, DatasetCategoryFilter, DomainTypeFilter, EnNameFilter,
    FilterKwargs, LanguageDependentListFilter, ListFilter, ProjectIdFilter, PtNameFilter,
    SearchNameFilter, SimpleListFilter, SurveyMissionIdFilter, TemporalExtentFilter,
    WorkflowStageFilter, names,
};

/// Builds one filter from raw parameters.
pub type FilterParser = fn(&HashMap<String, String>) -> Result<AnyListFilter, FilterError>;

fn parse<F>(params: &HashMap<String, String>) -> Result<AnyListFilter, FilterError>
where
    F: SimpleListFilter + Into<AnyListFilter>,
{
    F::from_params(params).map(Into::into)
}

/// Filters applicable to one entity type's list view.
///
/// Construction is best-effort: every parser is tried in order, failures
/// are logged and skipped. The language-dependent `search` filter goes
/// last so that it replaces an explicit name filter for the same language.
pub trait ItemListFilters: Sized {
    /// Entity label used in log records.
    const ENTITY: &'static str;

    /// Simple filter parsers, in insertion order.
    const PARSERS: &'static [FilterParser];

    /// Internal names that do not depend on the UI language.
    const STATIC_INTERNAL_NAMES: &'static [&'static str];

    fn from_filters(filters: IndexMap<String, AnyListFilter>) -> Self;

    fn filters(&self) -> &IndexMap<String, AnyListFilter>;

    fn from_params(params: &HashMap<String, String>, current_language: &str) -> Self {
        let mut filters = IndexMap::new();
        for parser in Self::PARSERS {
            match parser(params) {
                Ok(filter) => {
                    filters.insert(filter.internal_name().to_string(), filter);
                }
                Err(e) => tracing::info!(entity = Self::ENTITY, error = %e, "skipping filter"),
            }
        }
        match SearchNameFilter::from_params(params, current_language) {
            Ok(filter) => {
                filters.insert(filter.internal_name().to_string(), filter.into());
            }
            Err(e) => tracing::info!(entity = Self::ENTITY, error = %e, "skipping filter"),
        }
        Self::from_filters(filters)
    }

    /// Parse a JSON object of parameters, as posted by a search form.
    ///
    /// Numbers and booleans are taken in their textual form; `null` and
    /// nested values are ignored.
    fn from_json(raw_params: &str, current_language: &str) -> Result<Self, FilterError> {
        let object: serde_json::Map<String, Value> =
            serde_json::from_str(raw_params).map_err(|e| FilterError::InvalidJson(e.to_string()))?;
        let params = object
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::String(s) => Some((key, s)),
                Value::Number(n) => Some((key, n.to_string())),
                Value::Bool(b) => Some((key, b.to_string())),
                _ => None,
            })
            .collect::<HashMap<_, _>>();
        Ok(Self::from_params(&params, current_language))
    }

    fn as_kwargs(&self) -> FilterKwargs {
        self.filters()
            .values()
            .map(|f| (f.internal_name().to_string(), f.value()))
            .collect()
    }

    /// `?a=1&b=2`, or an empty string when nothing serialises.
    fn serialize_to_query_string(&self) -> String {
        let joined = self
            .filters()
            .values()
            .map(ListFilter::serialize_to_query_string)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("&");
        if joined.is_empty() {
            joined
        } else {
            format!("?{joined}")
        }
    }

    /// Value of the name filter for `current_language`, or `""`.
    fn get_text_search_filter(&self, current_language: &str) -> String {
        self.filters()
            .get(&names::name_filter(current_language))
            .and_then(|f| f.value().as_text().map(str::to_string))
            .unwrap_or_default()
    }

    fn spatial_intersect_filter(&self) -> Option<&BoundingBoxFilter> {
        match self.filters().get(names::SPATIAL_INTERSECT) {
            Some(AnyListFilter::BoundingBox(f)) => Some(f),
            _ => None,
        }
    }

    /// Every internal name this set can produce under `languages`.
    fn known_internal_names(languages: &[String]) -> Vec<String> {
        let mut known: Vec<String> = Self::STATIC_INTERNAL_NAMES
            .iter()
            .map(|name| name.to_string())
            .collect();
        for language in languages {
            let name = names::name_filter(language);
            if !known.contains(&name) {
                known.push(name);
            }
        }
        known
    }
}

macro_rules! filter_set {
    ($(#[$meta:meta])* $name:ident, $entity:literal, [$($filter:ty => $internal:expr),* $(,)?]) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            pub filters: IndexMap<String, AnyListFilter>,
        }

        impl ItemListFilters for $name {
            const ENTITY: &'static str = $entity;
            const PARSERS: &'static [FilterParser] = &[$(parse::<$filter>),*];
            const STATIC_INTERNAL_NAMES: &'static [&'static str] = &[$($internal),*];

            fn from_filters(filters: IndexMap<String, AnyListFilter>) -> Self {
                Self { filters }
            }

            fn filters(&self) -> &IndexMap<String, AnyListFilter> {
                &self.filters
            }
        }
    };
}

filter_set!(
    /// Filters for the project list.
    ProjectListFilters,
    "project",
    [
        BoundingBoxFilter => names::SPATIAL_INTERSECT,
        TemporalExtentFilter => names::TEMPORAL_EXTENT,
        EnNameFilter => names::EN_NAME,
        PtNameFilter => names::PT_NAME,
    ]
);

filter_set!(
    /// Filters for survey missions, optionally scoped to a project.
    SurveyMissionListFilters,
    "survey_mission",
    [
        BoundingBoxFilter => names::SPATIAL_INTERSECT,
        TemporalExtentFilter => names::TEMPORAL_EXTENT,
        EnNameFilter => names::EN_NAME,
        PtNameFilter => names::PT_NAME,
        DatasetCategoryFilter => names::DATASET_CATEGORY,
        DomainTypeFilter => names::DOMAIN_TYPE,
        WorkflowStageFilter => names::WORKFLOW_STAGE,
        ProjectIdFilter => names::PROJECT_ID,
    ]
);

filter_set!(
    /// Filters for survey-related records, optionally scoped to a mission.
    SurveyRelatedRecordListFilters,
    "survey_related_record",
    [
        BoundingBoxFilter => names::SPATIAL_INTERSECT,
        TemporalExtentFilter => names::TEMPORAL_EXTENT,
        EnNameFilter => names::EN_NAME,
        PtNameFilter => names::PT_NAME,
        DatasetCategoryFilter => names::DATASET_CATEGORY,
        DomainTypeFilter => names::DOMAIN_TYPE,
        WorkflowStageFilter => names::WORKFLOW_STAGE,
        SurveyMissionIdFilter => names::SURVEY_MISSION_ID,
    ]
);

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::filter::FilterValue;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_params_build_empty_set() {
        let set = ProjectListFilters::from_params(&params(&[]), "en");
        assert!(set.filters.is_empty());
        assert_eq!(set.serialize_to_query_string(), "");
        assert!(set.as_kwargs().is_empty());
        assert_eq!(set.get_text_search_filter("en"), "");
        assert!(set.spatial_intersect_filter().is_none());
    }

    #[test]
    fn insertion_follows_parser_order() {
        let set = SurveyMissionListFilters::from_params(
            &params(&[
                ("workflow_stage", "ws"),
                ("pt_name", "mar"),
                ("temporalExtentEnd", "2024-01-01"),
            ]),
            "en",
        );
        let keys: Vec<&str> = set.filters.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            ["temporal_extent", "pt_name_filter", "workflow_stage_filter"]
        );
        assert_eq!(
            set.serialize_to_query_string(),
            "?temporalExtentEnd=2024-01-01&pt_name=mar&workflow_stage=ws"
        );
    }

    #[test]
    fn search_keeps_position_of_replaced_filter() {
        let set = ProjectListFilters::from_params(
            &params(&[("en_name", "explicit"), ("pt_name", "nome"), ("search", "wins")]),
            "en",
        );
        let keys: Vec<&str> = set.filters.keys().map(String::as_str).collect();
        assert_eq!(keys, ["en_name_filter", "pt_name_filter"]);
        assert_eq!(set.get_text_search_filter("en"), "wins");
        assert_eq!(set.serialize_to_query_string(), "?en_name=wins&pt_name=nome");
    }

    #[test]
    fn project_set_ignores_mission_only_params() {
        let set = ProjectListFilters::from_params(
            &params(&[("dataset_category", "c"), ("projectId", "p")]),
            "en",
        );
        assert!(set.filters.is_empty());
    }

    #[test]
    fn scoping_ids_reach_kwargs_but_not_query_string() {
        let set = SurveyRelatedRecordListFilters::from_params(
            &params(&[("surveyMissionId", "m-1"), ("domain_type", "dt")]),
            "pt",
        );
        let kwargs = set.as_kwargs();
        assert_eq!(
            kwargs.get("survey_mission_id"),
            Some(&FilterValue::Text("m-1".to_string()))
        );
        assert_eq!(set.serialize_to_query_string(), "?domain_type=dt");
    }

    #[test]
    fn spatial_intersect_filter_is_exposed() {
        let set = SurveyRelatedRecordListFilters::from_params(
            &params(&[
                ("minLon", "1"),
                ("minLat", "2"),
                ("maxLon", "3"),
                ("maxLat", "4"),
            ]),
            "en",
        );
        let bounds = set.spatial_intersect_filter().unwrap().value.bounds();
        assert_eq!(bounds.min_lon, 1.0);
        assert_eq!(bounds.max_lat, 4.0);
    }

    #[test]
    fn from_json_accepts_strings_and_numbers() {
        let set = ProjectListFilters::from_json(
            r#"{"minLon": 0, "minLat": "0", "maxLon": 10.5, "maxLat": "10", "search": "x", "page": null}"#,
            "pt",
        )
        .unwrap();
        assert_eq!(
            set.serialize_to_query_string(),
            "?minLon=0.0&minLat=0.0&maxLon=10.5&maxLat=10.0&pt_name=x"
        );
    }

    #[test]
    fn from_json_rejects_non_objects() {
        let err = ProjectListFilters::from_json("[1, 2]", "en").unwrap_err();
        assert!(matches!(err, FilterError::InvalidJson(_)));
    }

    #[test]
    fn known_internal_names_include_language_filters_once() {
        let names = ProjectListFilters::known_internal_names(&[
            "pt".to_string(),
            "en".to_string(),
            "fr".to_string(),
        ]);
        assert_eq!(
            names,
            [
                "spatial_intersect",
                "temporal_extent",
                "en_name_filter",
                "pt_name_filter",
                "fr_name_filter"
            ]
        );
    }
}
