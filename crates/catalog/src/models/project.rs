//! Projects: the top level of the catalog.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use super::{Link, LocalizableString};

/// A marine survey project.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: Uuid,

    /// User that owns the project.
    pub owner: String,

    pub name: Json<LocalizableString>,

    pub description: Json<LocalizableString>,

    /// Lifecycle status (`draft`, `published`, ...).
    pub status: String,

    /// Root of the project's data on the archive filesystem.
    pub root_path: String,

    pub is_valid: bool,

    pub links: Json<Vec<Link>>,

    /// Footprint as WKT, in EPSG:4326.
    pub bbox_wkt: Option<String>,

    pub created_at: Option<DateTime<Utc>>,

    pub updated_at: Option<DateTime<Utc>>,

    pub temporal_extent_begin: Option<NaiveDate>,

    pub temporal_extent_end: Option<NaiveDate>,
}
