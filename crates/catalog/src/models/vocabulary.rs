//! Reference vocabularies used to classify survey-related records.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use super::LocalizableString;
use crate::query::CatalogTable;

/// The controlled vocabularies of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vocabulary {
    DatasetCategory,
    DomainType,
    WorkflowStage,
}

impl Vocabulary {
    pub const ALL: [Vocabulary; 3] = [
        Vocabulary::DatasetCategory,
        Vocabulary::DomainType,
        Vocabulary::WorkflowStage,
    ];

    /// Table holding the vocabulary's terms.
    pub fn table(self) -> CatalogTable {
        match self {
            Self::DatasetCategory => CatalogTable::DatasetCategory,
            Self::DomainType => CatalogTable::DomainType,
            Self::WorkflowStage => CatalogTable::WorkflowStage,
        }
    }
}

/// One term of a vocabulary. All vocabularies share this shape.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct VocabularyTerm {
    pub id: Uuid,
    pub name: Json<LocalizableString>,
}
