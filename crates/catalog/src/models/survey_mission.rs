//! Survey missions belong to a project.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use super::{Link, LocalizableString};

/// A survey mission within a project.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SurveyMission {
    pub id: Uuid,
    pub owner: String,
    pub name: Json<LocalizableString>,
    pub description: Json<LocalizableString>,

    /// Owning project.
    pub project_id: Uuid,

    pub status: String,

    /// Path relative to the project's root path.
    pub relative_path: String,

    pub is_valid: bool,
    pub links: Json<Vec<Link>>,

    /// Footprint as WKT, in EPSG:4326.
    pub bbox_wkt: Option<String>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub temporal_extent_begin: Option<NaiveDate>,
    pub temporal_extent_end: Option<NaiveDate>,
}
