use anyhow::Result;
use sqlx::PgPool;

use crate::domain::intent::IntentExample;
use crate::services::VectorIndex;

/// Nearest-neighbor lookup over the labeled intent examples, delegated to
/// the `match_intent_examples` SQL function (pgvector cosine similarity).
pub struct PgIntentExampleIndex {
    pool: PgPool,
}

impl PgIntentExampleIndex {
    pub fn new(pool: PgPool) -> Self {
        PgIntentExampleIndex { pool }
    }
}

#[async_trait::async_trait]
impl VectorIndex for PgIntentExampleIndex {
    async fn nearest(&self, embedding: &[f32], k: usize) -> Result<Vec<IntentExample>> {
        let examples = sqlx::query_as::<_, IntentExample>(
            r#"
            select
                bucket, similarity, intent_weight
            from
                match_intent_examples($1::real[], $2)
            "#,
        )
        .bind(embedding)
        .bind(k as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(examples)
    }
}
