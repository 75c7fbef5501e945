//! Single-field list filters.
//!
//! Each filter reads one or more raw query parameters, holds one typed
//! [`FilterValue`], and can write itself back as a query-string fragment.
//! [`AnyListFilter`] closes the set so filter sets can store them uniformly.

use std::collections::HashMap;

use chrono::NaiveDate;
use indexmap::IndexMap;

use super::error::FilterError;
use super::value::{FilterValue, Polygon, TemporalExtentFilterValue};

/// Keyword arguments handed to the query layer, keyed by internal name.
pub type FilterKwargs = IndexMap<String, FilterValue>;

/// Internal names understood by the query layer.
pub mod names {
    pub const SPATIAL_INTERSECT: &str = "spatial_intersect";
    pub const TEMPORAL_EXTENT: &str = "temporal_extent";
    pub const EN_NAME: &str = "en_name_filter";
    pub const PT_NAME: &str = "pt_name_filter";
    pub const DATASET_CATEGORY: &str = "dataset_category_filter";
    pub const DOMAIN_TYPE: &str = "domain_type_filter";
    pub const WORKFLOW_STAGE: &str = "workflow_stage_filter";
    pub const PROJECT_ID: &str = "project_id";
    pub const SURVEY_MISSION_ID: &str = "survey_mission_id";

    /// Internal name of the localized name filter for `language`.
    pub fn name_filter(language: &str) -> String {
        format!("{language}_name_filter")
    }
}

const MIN_LON: &str = "minLon";
const MIN_LAT: &str = "minLat";
const MAX_LON: &str = "maxLon";
const MAX_LAT: &str = "maxLat";
const TEMPORAL_EXTENT_BEGIN: &str = "temporalExtentBegin";
const TEMPORAL_EXTENT_END: &str = "temporalExtentEnd";
const SEARCH: &str = "search";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Common interface of every list filter.
pub trait ListFilter {
    /// Keyword used when invoking the query layer.
    fn internal_name(&self) -> &str;

    fn value(&self) -> FilterValue;

    /// Canonical `key=value` fragment, or an empty string when the filter
    /// must not appear in a shareable URL.
    fn serialize_to_query_string(&self) -> String;

    fn as_kwargs(&self) -> FilterKwargs {
        let mut kwargs = FilterKwargs::new();
        kwargs.insert(self.internal_name().to_string(), self.value());
        kwargs
    }
}

/// A filter whose names are fixed.
pub trait SimpleListFilter: ListFilter + Sized {
    fn from_params(params: &HashMap<String, String>) -> Result<Self, FilterError>;
}

/// A filter whose names depend on the active UI language.
pub trait LanguageDependentListFilter: ListFilter + Sized {
    fn from_params(
        params: &HashMap<String, String>,
        current_language: &str,
    ) -> Result<Self, FilterError>;
}

/// Spatial intersect filter built from `minLon`, `minLat`, `maxLon`, `maxLat`.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBoxFilter {
    pub value: Polygon,
}

impl BoundingBoxFilter {
    pub fn new(value: Polygon) -> Self {
        Self { value }
    }
}

impl ListFilter for BoundingBoxFilter {
    fn internal_name(&self) -> &str {
        names::SPATIAL_INTERSECT
    }

    fn value(&self) -> FilterValue {
        FilterValue::BoundingBox(self.value.clone())
    }

    fn serialize_to_query_string(&self) -> String {
        if !self.value.is_valid() {
            tracing::debug!(wkt = %self.value.to_wkt(), "bbox filter geometry is not valid");
            return String::new();
        }
        // `{:?}` keeps the fractional part (`0.0`) and switches to exponent
        // form below 1e-4 (`1e-5`). Both parse back to the same f64.
        let bounds = self.value.bounds();
        [
            format!("{MIN_LON}={:?}", bounds.min_lon),
            format!("{MIN_LAT}={:?}", bounds.min_lat),
            format!("{MAX_LON}={:?}", bounds.max_lon),
            format!("{MAX_LAT}={:?}", bounds.max_lat),
        ]
        .join("&")
    }
}

impl SimpleListFilter for BoundingBoxFilter {
    fn from_params(params: &HashMap<String, String>) -> Result<Self, FilterError> {
        let raw: Vec<(&str, &String)> = [MIN_LON, MIN_LAT, MAX_LON, MAX_LAT]
            .into_iter()
            .filter_map(|name| params.get(name).map(|value| (name, value)))
            .collect();
        if raw.len() != 4 {
            return Err(FilterError::MissingParameter(format!(
                "all of {MIN_LON}, {MIN_LAT}, {MAX_LON} and {MAX_LAT}"
            )));
        }

        let coords = raw
            .into_iter()
            .map(|(name, value)| {
                value
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| FilterError::InvalidNumber {
                        name: name.to_string(),
                        value: value.clone(),
                    })
            })
            .collect::<Result<Vec<f64>, _>>()?;

        Ok(Self::new(Polygon::from_bounds(
            coords[0], coords[1], coords[2], coords[3],
        )))
    }
}

/// Temporal overlap filter built from `temporalExtentBegin` / `temporalExtentEnd`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporalExtentFilter {
    pub value: TemporalExtentFilterValue,
}

impl TemporalExtentFilter {
    pub fn new(value: TemporalExtentFilterValue) -> Self {
        Self { value }
    }
}

fn parse_date(name: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, FilterError> {
    raw.map(|value| {
        NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| FilterError::InvalidDate {
            name: name.to_string(),
            value: value.to_string(),
        })
    })
    .transpose()
}

impl ListFilter for TemporalExtentFilter {
    fn internal_name(&self) -> &str {
        names::TEMPORAL_EXTENT
    }

    fn value(&self) -> FilterValue {
        FilterValue::TemporalExtent(self.value)
    }

    fn serialize_to_query_string(&self) -> String {
        let mut parts = Vec::with_capacity(2);
        if let Some(begin) = self.value.begin {
            parts.push(format!(
                "{TEMPORAL_EXTENT_BEGIN}={}",
                begin.format(DATE_FORMAT)
            ));
        }
        if let Some(end) = self.value.end {
            parts.push(format!("{TEMPORAL_EXTENT_END}={}", end.format(DATE_FORMAT)));
        }
        parts.join("&")
    }
}

impl SimpleListFilter for TemporalExtentFilter {
    fn from_params(params: &HashMap<String, String>) -> Result<Self, FilterError> {
        let raw_begin = params
            .get(TEMPORAL_EXTENT_BEGIN)
            .map(String::as_str)
            .filter(|v| !v.is_empty());
        let raw_end = params
            .get(TEMPORAL_EXTENT_END)
            .map(String::as_str)
            .filter(|v| !v.is_empty());
        if raw_begin.is_none() && raw_end.is_none() {
            return Err(FilterError::MissingParameter(format!(
                "{TEMPORAL_EXTENT_BEGIN} or {TEMPORAL_EXTENT_END}"
            )));
        }
        Ok(Self::new(TemporalExtentFilterValue {
            begin: parse_date(TEMPORAL_EXTENT_BEGIN, raw_begin)?,
            end: parse_date(TEMPORAL_EXTENT_END, raw_end)?,
        }))
    }
}

/// `name=value` with the value percent-encoded, or `""` for an empty value.
fn query_pair(public_name: &str, value: &str) -> String {
    if value.is_empty() {
        String::new()
    } else {
        format!("{public_name}={}", urlencoding::encode(value))
    }
}

/// Declares a filter that reads one named string parameter.
///
/// Filters declared `shareable: false` carry path-derived scoping ids and
/// never serialize into a URL.
macro_rules! string_filter {
    ($(#[$meta:meta])* $name:ident, internal: $internal:expr, public: $public:literal, shareable: $shareable:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            pub value: String,
        }

        impl $name {
            pub const INTERNAL_NAME: &'static str = $internal;
            pub const PUBLIC_NAME: &'static str = $public;
            const SHAREABLE: bool = $shareable;

            pub fn new(value: impl Into<String>) -> Self {
                Self {
                    value: value.into(),
                }
            }

            pub fn public_name(&self) -> &str {
                Self::PUBLIC_NAME
            }
        }

        impl ListFilter for $name {
            fn internal_name(&self) -> &str {
                Self::INTERNAL_NAME
            }

            fn value(&self) -> FilterValue {
                FilterValue::Text(self.value.clone())
            }

            fn serialize_to_query_string(&self) -> String {
                if Self::SHAREABLE {
                    query_pair(Self::PUBLIC_NAME, &self.value)
                } else {
                    String::new()
                }
            }
        }

        impl SimpleListFilter for $name {
            fn from_params(params: &HashMap<String, String>) -> Result<Self, FilterError> {
                params
                    .get(Self::PUBLIC_NAME)
                    .map(|value| Self::new(value.clone()))
                    .ok_or_else(|| FilterError::MissingParameter(Self::PUBLIC_NAME.to_string()))
            }
        }
    };
}

string_filter!(
    /// Case-insensitive fragment of the English name.
    EnNameFilter, internal: names::EN_NAME, public: "en_name", shareable: true
);
string_filter!(
    /// Case-insensitive fragment of the Portuguese name.
    PtNameFilter, internal: names::PT_NAME, public: "pt_name", shareable: true
);
string_filter!(
    DatasetCategoryFilter, internal: names::DATASET_CATEGORY, public: "dataset_category", shareable: true
);
string_filter!(
    DomainTypeFilter, internal: names::DOMAIN_TYPE, public: "domain_type", shareable: true
);
string_filter!(
    WorkflowStageFilter, internal: names::WORKFLOW_STAGE, public: "workflow_stage", shareable: true
);
string_filter!(
    /// Restricts survey missions to one project. Taken from the URL path.
    ProjectIdFilter, internal: names::PROJECT_ID, public: "projectId", shareable: false
);
string_filter!(
    /// Restricts survey-related records to one mission. Taken from the URL path.
    SurveyMissionIdFilter, internal: names::SURVEY_MISSION_ID, public: "surveyMissionId", shareable: false
);

/// Generic `search` box, bound to the name filter of the active language.
///
/// With `current_language == "en"` it behaves as an [`EnNameFilter`] and
/// shares its internal name, so a filter set keeps only one of the two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchNameFilter {
    pub internal_name: String,
    pub public_name: String,
    pub value: String,
}

impl SearchNameFilter {
    pub fn new(current_language: &str, value: impl Into<String>) -> Self {
        Self {
            internal_name: names::name_filter(current_language),
            public_name: format!("{current_language}_name"),
            value: value.into(),
        }
    }

    pub fn public_name(&self) -> &str {
        &self.public_name
    }
}

impl ListFilter for SearchNameFilter {
    fn internal_name(&self) -> &str {
        &self.internal_name
    }

    fn value(&self) -> FilterValue {
        FilterValue::Text(self.value.clone())
    }

    fn serialize_to_query_string(&self) -> String {
        query_pair(&self.public_name, &self.value)
    }
}

impl LanguageDependentListFilter for SearchNameFilter {
    fn from_params(
        params: &HashMap<String, String>,
        current_language: &str,
    ) -> Result<Self, FilterError> {
        params
            .get(SEARCH)
            .map(|value| Self::new(current_language, value.clone()))
            .ok_or_else(|| FilterError::MissingParameter(SEARCH.to_string()))
    }
}

/// Every list filter kind.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyListFilter {
    BoundingBox(BoundingBoxFilter),
    TemporalExtent(TemporalExtentFilter),
    EnName(EnNameFilter),
    PtName(PtNameFilter),
    DatasetCategory(DatasetCategoryFilter),
    DomainType(DomainTypeFilter),
    WorkflowStage(WorkflowStageFilter),
    ProjectId(ProjectIdFilter),
    SurveyMissionId(SurveyMissionIdFilter),
    SearchName(SearchNameFilter),
}

macro_rules! delegate {
    ($self:ident, $f:ident => $body:expr) => {
        match $self {
            AnyListFilter::BoundingBox($f) => $body,
            AnyListFilter::TemporalExtent($f) => $body,
            AnyListFilter::EnName($f) => $body,
            AnyListFilter::PtName($f) => $body,
            AnyListFilter::DatasetCategory($f) => $body,
            AnyListFilter::DomainType($f) => $body,
            AnyListFilter::WorkflowStage($f) => $body,
            AnyListFilter::ProjectId($f) => $body,
            AnyListFilter::SurveyMissionId($f) => $body,
            AnyListFilter::SearchName($f) => $body,
        }
    };
}

impl ListFilter for AnyListFilter {
    fn internal_name(&self) -> &str {
        delegate!(self, f => f.internal_name())
    }

    fn value(&self) -> FilterValue {
        delegate!(self, f => f.value())
    }

    fn serialize_to_query_string(&self) -> String {
        delegate!(self, f => f.serialize_to_query_string())
    }
}

macro_rules! impl_from_filter {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for AnyListFilter {
                fn from(filter: $ty) -> Self {
                    AnyListFilter::$variant(filter)
                }
            }
        )*
    };
}

impl_from_filter!(
    BoundingBox(BoundingBoxFilter),
    TemporalExtent(TemporalExtentFilter),
    EnName(EnNameFilter),
    PtName(PtNameFilter),
    DatasetCategory(DatasetCategoryFilter),
    DomainType(DomainTypeFilter),
    WorkflowStage(WorkflowStageFilter),
    ProjectId(ProjectIdFilter),
    SurveyMissionId(SurveyMissionIdFilter),
    SearchName(SearchNameFilter),
);

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn assert_string_filter<F: ListFilter>(
        filter: &F,
        internal_name: &str,
        value: &str,
        expected_qs: &str,
    ) {
        assert_eq!(filter.internal_name(), internal_name);
        assert_eq!(filter.value(), FilterValue::Text(value.to_string()));
        let kwargs = filter.as_kwargs();
        assert_eq!(kwargs.len(), 1);
        assert_eq!(
            kwargs.get(internal_name),
            Some(&FilterValue::Text(value.to_string()))
        );
        assert_eq!(filter.serialize_to_query_string(), expected_qs);
    }

    #[test]
    fn simple_string_filters() {
        let en = EnNameFilter::new("some_name");
        assert_eq!(en.public_name(), "en_name");
        assert_string_filter(&en, "en_name_filter", "some_name", "en_name=some_name");

        let pt = PtNameFilter::new("um nome");
        assert_eq!(pt.public_name(), "pt_name");
        assert_string_filter(&pt, "pt_name_filter", "um nome", "pt_name=um nome");

        let category = DatasetCategoryFilter::new("cat1");
        assert_eq!(category.public_name(), "dataset_category");
        assert_string_filter(
            &category,
            "dataset_category_filter",
            "cat1",
            "dataset_category=cat1",
        );

        let domain = DomainTypeFilter::new("dt1");
        assert_eq!(domain.public_name(), "domain_type");
        assert_string_filter(&domain, "domain_type_filter", "dt1", "domain_type=dt1");

        let stage = WorkflowStageFilter::new("ws1");
        assert_eq!(stage.public_name(), "workflow_stage");
        assert_string_filter(&stage, "workflow_stage_filter", "ws1", "workflow_stage=ws1");
    }

    #[test]
    fn simple_filter_from_params() {
        let filter = EnNameFilter::from_params(&params(&[("en_name", "fake_value")])).unwrap();
        assert_eq!(filter.value, "fake_value");
        assert_eq!(
            filter
                .as_kwargs()
                .get("en_name_filter")
                .and_then(|v| v.as_text()),
            Some("fake_value")
        );
    }

    #[test]
    fn string_filter_missing_parameter() {
        let err = PtNameFilter::from_params(&params(&[("en_name", "x")])).unwrap_err();
        assert_eq!(err, FilterError::MissingParameter("pt_name".to_string()));
    }

    #[test]
    fn string_filter_values_are_percent_encoded() {
        let filter = EnNameFilter::new("fish & chips=1#2+3");
        assert_eq!(
            filter.serialize_to_query_string(),
            "en_name=fish%20%26%20chips%3D1%232%2B3"
        );

        let search = SearchNameFilter::new("pt", "sísmica 2D");
        assert_eq!(
            search.serialize_to_query_string(),
            "pt_name=s%C3%ADsmica%202D"
        );
    }

    #[test]
    fn bounding_box_small_values_use_exponent_form() {
        let filter = BoundingBoxFilter::new(Polygon::from_bounds(0.00001, 0.0, 1.0, 1.0));
        let query = filter.serialize_to_query_string();
        assert_eq!(query, "minLon=1e-5&minLat=0.0&maxLon=1.0&maxLat=1.0");

        let params: HashMap<String, String> = query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let reparsed = BoundingBoxFilter::from_params(&params).unwrap();
        assert_eq!(reparsed, filter);
    }

    #[test]
    fn empty_string_filter_parses_but_does_not_serialize() {
        let filter = EnNameFilter::from_params(&params(&[("en_name", "")])).unwrap();
        assert_eq!(filter.value, "");
        assert_eq!(filter.serialize_to_query_string(), "");
    }

    #[test]
    fn scoping_id_filters_never_serialize() {
        let project = ProjectIdFilter::from_params(&params(&[("projectId", "abc")])).unwrap();
        assert_eq!(project.internal_name(), "project_id");
        assert_eq!(project.value(), FilterValue::Text("abc".to_string()));
        assert_eq!(project.serialize_to_query_string(), "");

        let mission =
            SurveyMissionIdFilter::from_params(&params(&[("surveyMissionId", "def")])).unwrap();
        assert_eq!(mission.internal_name(), "survey_mission_id");
        assert_eq!(mission.serialize_to_query_string(), "");
    }

    #[test]
    fn bounding_box_from_wkt_serializes_with_float_formatting() {
        let wkt = "POLYGON ((0 0, 10 0, 10 10, 0 10, 0 0))";
        let filter = BoundingBoxFilter::new(Polygon::from_wkt(wkt).unwrap());
        assert_eq!(filter.value.to_wkt(), wkt);
        assert_eq!(filter.internal_name(), "spatial_intersect");
        assert_eq!(
            filter.as_kwargs().get("spatial_intersect"),
            Some(&FilterValue::BoundingBox(Polygon::from_wkt(wkt).unwrap()))
        );
        assert_eq!(
            filter.serialize_to_query_string(),
            "minLon=0.0&minLat=0.0&maxLon=10.0&maxLat=10.0"
        );
    }

    #[test]
    fn bounding_box_from_params() {
        let filter = BoundingBoxFilter::from_params(&params(&[
            ("minLon", "-9.5"),
            ("minLat", "36"),
            ("maxLon", "-6.25"),
            ("maxLat", "42.1"),
        ]))
        .unwrap();
        assert_eq!(
            filter.serialize_to_query_string(),
            "minLon=-9.5&minLat=36.0&maxLon=-6.25&maxLat=42.1"
        );
    }

    #[test]
    fn bounding_box_requires_all_four_parameters() {
        let err = BoundingBoxFilter::from_params(&params(&[
            ("minLon", "0"),
            ("minLat", "0"),
            ("maxLon", "10"),
        ]))
        .unwrap_err();
        assert!(matches!(err, FilterError::MissingParameter(_)));
    }

    #[test]
    fn bounding_box_rejects_non_numeric_values() {
        let err = BoundingBoxFilter::from_params(&params(&[
            ("minLon", "0"),
            ("minLat", "zero"),
            ("maxLon", "10"),
            ("maxLat", "10"),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            FilterError::InvalidNumber {
                name: "minLat".to_string(),
                value: "zero".to_string()
            }
        );
    }

    #[test]
    fn degenerate_bounding_box_serializes_to_empty_string() {
        let filter = BoundingBoxFilter::from_params(&params(&[
            ("minLon", "0"),
            ("minLat", "0"),
            ("maxLon", "0"),
            ("maxLat", "0"),
        ]))
        .unwrap();
        assert_eq!(filter.serialize_to_query_string(), "");
    }

    #[test]
    fn temporal_extent_both_bounds() {
        let filter = TemporalExtentFilter::from_params(&params(&[
            ("temporalExtentBegin", "2023-01-15"),
            ("temporalExtentEnd", "2024-06-30"),
        ]))
        .unwrap();
        assert_eq!(filter.internal_name(), "temporal_extent");
        assert_eq!(filter.value.begin, NaiveDate::from_ymd_opt(2023, 1, 15));
        assert_eq!(filter.value.end, NaiveDate::from_ymd_opt(2024, 6, 30));
        assert_eq!(
            filter.serialize_to_query_string(),
            "temporalExtentBegin=2023-01-15&temporalExtentEnd=2024-06-30"
        );
    }

    #[test]
    fn temporal_extent_single_bound_has_no_leading_ampersand() {
        let end_only =
            TemporalExtentFilter::from_params(&params(&[("temporalExtentEnd", "2024-06-30")]))
                .unwrap();
        assert_eq!(end_only.value.begin, None);
        assert_eq!(
            end_only.serialize_to_query_string(),
            "temporalExtentEnd=2024-06-30"
        );

        let begin_only =
            TemporalExtentFilter::from_params(&params(&[("temporalExtentBegin", "2020-02-29")]))
                .unwrap();
        assert_eq!(
            begin_only.serialize_to_query_string(),
            "temporalExtentBegin=2020-02-29"
        );
    }

    #[test]
    fn temporal_extent_requires_one_bound() {
        let err = TemporalExtentFilter::from_params(&params(&[])).unwrap_err();
        assert!(matches!(err, FilterError::MissingParameter(_)));

        let err = TemporalExtentFilter::from_params(&params(&[
            ("temporalExtentBegin", ""),
            ("temporalExtentEnd", ""),
        ]))
        .unwrap_err();
        assert!(matches!(err, FilterError::MissingParameter(_)));
    }

    #[test]
    fn temporal_extent_rejects_malformed_dates() {
        let err = TemporalExtentFilter::from_params(&params(&[
            ("temporalExtentBegin", "2023-01-15"),
            ("temporalExtentEnd", "30/06/2024"),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            FilterError::InvalidDate {
                name: "temporalExtentEnd".to_string(),
                value: "30/06/2024".to_string()
            }
        );
    }

    #[test]
    fn search_filter_names_follow_language() {
        let en = SearchNameFilter::from_params(&params(&[("search", "survey")]), "en").unwrap();
        assert_eq!(en.internal_name(), "en_name_filter");
        assert_eq!(en.public_name(), "en_name");
        assert_eq!(en.serialize_to_query_string(), "en_name=survey");

        let pt = SearchNameFilter::from_params(&params(&[("search", "levantamento")]), "pt")
            .unwrap();
        assert_eq!(pt.internal_name(), "pt_name_filter");
        assert_eq!(pt.serialize_to_query_string(), "pt_name=levantamento");
    }

    #[test]
    fn search_filter_requires_search_parameter() {
        let err = SearchNameFilter::from_params(&params(&[("en_name", "x")]), "en").unwrap_err();
        assert_eq!(err, FilterError::MissingParameter("search".to_string()));
    }

    #[test]
    fn any_filter_delegates() {
        let filter: AnyListFilter = SearchNameFilter::new("pt", "mar").into();
        assert_eq!(filter.internal_name(), "pt_name_filter");
        assert_eq!(filter.serialize_to_query_string(), "pt_name=mar");

        let filter: AnyListFilter = ProjectIdFilter::new("p1").into();
        assert_eq!(filter.internal_name(), "project_id");
        assert_eq!(filter.serialize_to_query_string(), "");
    }
}
