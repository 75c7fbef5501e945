//! Vocabulary term queries (dataset categories, domain types, workflow stages).

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use super::{CatalogQueryBuilder, ListOrder, ListResult, fetch_one_row, run_list};
use crate::models::{Vocabulary, VocabularyTerm};

/// List terms ordered by their name in `order_language`.
pub async fn list_vocabulary_terms(
    pool: &PgPool,
    vocabulary: Vocabulary,
    limit: u64,
    offset: u64,
    include_total: bool,
    order_language: &str,
) -> Result<ListResult<VocabularyTerm>> {
    let query = CatalogQueryBuilder::new(vocabulary.table())
        .order(ListOrder::Name(order_language.to_string()))
        .list_sql(limit, offset);
    run_list(pool, query, include_total).await
}

pub async fn collect_all_vocabulary_terms(
    pool: &PgPool,
    vocabulary: Vocabulary,
    order_language: &str,
) -> Result<Vec<VocabularyTerm>> {
    let (_, total) = list_vocabulary_terms(pool, vocabulary, 1, 0, true, order_language).await?;
    let (items, _) = list_vocabulary_terms(
        pool,
        vocabulary,
        total.unwrap_or_default(),
        0,
        false,
        order_language,
    )
    .await?;
    Ok(items)
}

pub async fn get_vocabulary_term(
    pool: &PgPool,
    vocabulary: Vocabulary,
    term_id: Uuid,
) -> Result<Option<VocabularyTerm>> {
    let sql = CatalogQueryBuilder::new(vocabulary.table())
        .where_uuid("id", term_id)
        .build(1, 0);
    fetch_one_row(pool, vocabulary.table(), &sql).await
}

pub async fn get_vocabulary_term_by_english_name(
    pool: &PgPool,
    vocabulary: Vocabulary,
    english_name: &str,
) -> Result<Option<VocabularyTerm>> {
    let sql = CatalogQueryBuilder::new(vocabulary.table())
        .where_english_name(english_name)
        .build(1, 0);
    fetch_one_row(pool, vocabulary.table(), &sql).await
}
