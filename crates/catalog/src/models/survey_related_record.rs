//! Survey-related records: datasets produced by a survey mission.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use super::{Link, LocalizableString};

/// A dataset recorded during a survey mission.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SurveyRelatedRecord {
    pub id: Uuid,
    pub owner: String,
    pub name: Json<LocalizableString>,
    pub description: Json<LocalizableString>,
    pub status: String,
    pub is_valid: bool,

    /// Owning survey mission.
    pub survey_mission_id: Uuid,

    /// Vocabulary terms classifying the record. See [`super::Vocabulary`].
    pub dataset_category_id: Option<Uuid>,
    pub domain_type_id: Option<Uuid>,
    pub workflow_stage_id: Option<Uuid>,

    /// Path relative to the mission's path.
    pub relative_path: String,

    pub links: Json<Vec<Link>>,

    /// Footprint as WKT, in EPSG:4326.
    pub bbox_wkt: Option<String>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub temporal_extent_begin: Option<NaiveDate>,
    pub temporal_extent_end: Option<NaiveDate>,
}
