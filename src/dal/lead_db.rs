use anyhow::Result;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::lead::{Lead, StoredLead};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyExists,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeadQuery {
    pub min_intent: i32,
    pub domain: Option<String>,
    pub limit: i64,
}

#[async_trait::async_trait]
pub trait LeadStore: Send + Sync {
    async fn exists(&self, link: &str) -> Result<bool>;

    /// Idempotent keyed by link; a concurrent duplicate resolves to
    /// `AlreadyExists` rather than an error.
    async fn insert(&self, lead: &Lead) -> Result<InsertOutcome>;

    async fn query(&self, filter: &LeadQuery) -> Result<Vec<StoredLead>>;
}

pub struct PgLeadStore {
    pool: PgPool,
}

impl PgLeadStore {
    pub fn new(pool: PgPool) -> Self {
        PgLeadStore { pool }
    }
}

#[async_trait::async_trait]
impl LeadStore for PgLeadStore {
    async fn exists(&self, link: &str) -> Result<bool> {
        let id: Option<Uuid> = sqlx::query_scalar(
            r#"
            select id from leads where link = $1
            "#,
        )
        .bind(link)
        .fetch_optional(&self.pool)
        .await?;

        Ok(id.is_some())
    }

    async fn insert(&self, lead: &Lead) -> Result<InsertOutcome> {
        let result = sqlx::query(
            r#"
            insert into leads
                (id, title, link, domain, intent_score, intent_level, imre_score)
            values
                ($1, $2, $3, $4, $5, $6, $7)
            on conflict (link) do nothing
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&lead.title)
        .bind(&lead.link)
        .bind(&lead.domain)
        .bind(lead.intent_analysis.intent_score)
        .bind(lead.intent_analysis.intent_level.as_str())
        .bind(lead.imre_score)
        .execute(&self.pool)
        .await?;

        match result.rows_affected() {
            0 => Ok(InsertOutcome::AlreadyExists),
            _ => Ok(InsertOutcome::Inserted),
        }
    }

    async fn query(&self, filter: &LeadQuery) -> Result<Vec<StoredLead>> {
        let leads = sqlx::query_as::<_, StoredLead>(
            r#"
            select
                title, link, domain, intent_score, intent_level, imre_score
            from
                leads
            where
                intent_score >= $1 and
                ($2::text is null or domain = $2)
            order by
                imre_score desc
            limit $3
            "#,
        )
        .bind(filter.min_intent)
        .bind(filter.domain.as_deref())
        .bind(filter.limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(leads)
    }
}
