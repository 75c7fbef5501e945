//! Catalog records as stored in PostgreSQL.

pub mod project;
pub mod record_asset;
pub mod survey_mission;
pub mod survey_related_record;
pub mod vocabulary;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use project::Project;
pub use record_asset::RecordAsset;
pub use survey_mission::SurveyMission;
pub use survey_related_record::SurveyRelatedRecord;
pub use vocabulary::{Vocabulary, VocabularyTerm};

/// Language code to text, stored as a JSONB object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizableString(pub BTreeMap<String, String>);

impl LocalizableString {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Text in `language`, else English, else empty.
    pub fn localized(&self, language: &str) -> &str {
        self.0
            .get(language)
            .or_else(|| self.0.get("en"))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// External link attached to a catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    pub media_type: String,
    pub relation: String,
    #[serde(default)]
    pub link_description: LocalizableString,
}
