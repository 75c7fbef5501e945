//! Vocabulary routes: every term, ordered by name in the current language.

use axum::extract::{Extension, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::error::AppResult;
use crate::middleware::ResolvedLanguage;
use crate::models::{Vocabulary, VocabularyTerm};
use crate::query;
use crate::state::AppState;

/// Create the vocabulary router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/dataset-categories", get(list_dataset_categories))
        .route("/api/domain-types", get(list_domain_types))
        .route("/api/workflow-stages", get(list_workflow_stages))
}

async fn list_terms(
    state: &AppState,
    vocabulary: Vocabulary,
    language: &str,
) -> AppResult<Json<Vec<VocabularyTerm>>> {
    let terms = query::collect_all_vocabulary_terms(state.db(), vocabulary, language).await?;
    Ok(Json(terms))
}

async fn list_dataset_categories(
    State(state): State<AppState>,
    Extension(ResolvedLanguage(language)): Extension<ResolvedLanguage>,
) -> AppResult<Json<Vec<VocabularyTerm>>> {
    list_terms(&state, Vocabulary::DatasetCategory, &language).await
}

async fn list_domain_types(
    State(state): State<AppState>,
    Extension(ResolvedLanguage(language)): Extension<ResolvedLanguage>,
) -> AppResult<Json<Vec<VocabularyTerm>>> {
    list_terms(&state, Vocabulary::DomainType, &language).await
}

async fn list_workflow_stages(
    State(state): State<AppState>,
    Extension(ResolvedLanguage(language)): Extension<ResolvedLanguage>,
) -> AppResult<Json<Vec<VocabularyTerm>>> {
    list_terms(&state, Vocabulary::WorkflowStage, &language).await
}
