//! List filters.
//!
//! Raw query parameters are parsed into typed single-field filters, which
//! are collected into a per-entity filter set. A filter set produces the
//! keyword arguments for the query layer and a canonical query string for
//! pagination links. Parsing never fails as a whole: a filter that cannot
//! be built is logged and left out.

pub mod error;
pub mod set;
pub mod single;
pub mod value;

pub use error::FilterError;
pub use set::{
    FilterParser, ItemListFilters, ProjectListFilters, SurveyMissionListFilters,
    SurveyRelatedRecordListFilters,
};
pub use single::{
    AnyListFilter, BoundingBoxFilter, DatasetCategoryFilter, DomainTypeFilter, EnNameFilter,
    FilterKwargs, LanguageDependentListFilter, ListFilter, ProjectIdFilter, PtNameFilter,
    SearchNameFilter, SimpleListFilter, SurveyMissionIdFilter, TemporalExtentFilter,
    WorkflowStageFilter, names,
};
pub use value::{Bounds, Coord, FilterValue, Polygon, TemporalExtentFilterValue};
