//! Record assets: the files that make up a survey-related record.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use super::{Link, LocalizableString};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RecordAsset {
    pub id: Uuid,
    pub name: Json<LocalizableString>,
    pub description: Json<LocalizableString>,
    pub is_valid: bool,
    pub survey_related_record_id: Uuid,
    pub relative_path: String,
    pub links: Json<Vec<Link>>,
}
