use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Pool, Postgres};
use uuid::Uuid;

use crate::domain::{
    models::{
        ComplianceState, Cost, DeliveryState, DeliveryStatus, MediaItem, Message, MessageContent,
        Recipient, Scheduling,
    },
    repositories::{MessageFilter, MessageRepository},
};

pub type PgPool = Pool<Postgres>;

#[derive(Clone)]
pub struct PostgresMessageRepository {
    pool: PgPool,
}

impl PostgresMessageRepository {
    pub fn new(pool: PgPool) -> Arc<Self> {
        Arc::new(Self { pool })
    }
}

const SELECT_COLUMNS: &str = r#"
    id, tenant_id, sender_id, recipient, text, media, template_id,
    status, provider_message_id, provider_response, sent_at, delivered_at,
    failure_reason, retry_count, max_retries, compliance, scheduling,
    campaign_id, cost, metadata, created_at, updated_at
"#;

#[async_trait]
impl MessageRepository for PostgresMessageRepository {
    async fn insert(&self, message: &Message) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO messages (
                id, tenant_id, sender_id, recipient, text, media, template_id,
                status, provider_message_id, provider_response, sent_at, delivered_at,
                failure_reason, retry_count, max_retries, compliance, scheduling,
                campaign_id, cost, metadata, created_at, updated_at
            ) VALUES (
                $1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$18,$19,$20,$21,$22
            )
            "#,
        )
        .bind(message.id)
        .bind(message.tenant_id)
        .bind(message.sender_id)
        .bind(serde_json::to_value(&message.recipient)?)
        .bind(&message.content.text)
        .bind(serde_json::to_value(&message.content.media)?)
        .bind(message.content.template_id)
        .bind(message.delivery.status.as_str())
        .bind(&message.delivery.provider_message_id)
        .bind(&message.delivery.provider_response)
        .bind(message.delivery.sent_at)
        .bind(message.delivery.delivered_at)
        .bind(&message.delivery.failure_reason)
        .bind(message.delivery.retry_count as i32)
        .bind(message.delivery.max_retries as i32)
        .bind(serde_json::to_value(&message.compliance)?)
        .bind(serde_json::to_value(&message.scheduling)?)
        .bind(message.campaign_id)
        .bind(serde_json::to_value(&message.cost)?)
        .bind(&message.metadata)
        .bind(message.created_at)
        .bind(message.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, message: &Message) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE messages SET
                status = $2,
                provider_message_id = $3,
                provider_response = $4,
                sent_at = $5,
                delivered_at = $6,
                failure_reason = $7,
                retry_count = $8,
                compliance = $9,
                cost = $10,
                updated_at = $11
            WHERE id = $1
            "#,
        )
        .bind(message.id)
        .bind(message.delivery.status.as_str())
        .bind(&message.delivery.provider_message_id)
        .bind(&message.delivery.provider_response)
        .bind(message.delivery.sent_at)
        .bind(message.delivery.delivered_at)
        .bind(&message.delivery.failure_reason)
        .bind(message.delivery.retry_count as i32)
        .bind(serde_json::to_value(&message.compliance)?)
        .bind(serde_json::to_value(&message.cost)?)
        .bind(message.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, message_id: Uuid) -> anyhow::Result<Option<Message>> {
        let record = sqlx::query_as::<_, MessageRecord>(&format!(
            "SELECT {SELECT_COLUMNS} FROM messages WHERE id = $1"
        ))
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await?;
        record.map(Message::try_from).transpose()
    }

    async fn delete(&self, message_id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(message_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(
        &self,
        tenant_id: Uuid,
        filter: MessageFilter,
    ) -> anyhow::Result<(Vec<Message>, bool)> {
        let limit = filter.limit.unwrap_or(50) as i64;
        let offset = filter.offset.unwrap_or(0) as i64;

        // One extra row tells us whether another page exists.
        let records = sqlx::query_as::<_, MessageRecord>(&format!(
            r#"
            SELECT {SELECT_COLUMNS} FROM messages
            WHERE tenant_id = $1
              AND ($2::text IS NULL OR status = $2)
              AND ($3::timestamptz IS NULL OR created_at >= $3)
              AND ($4::timestamptz IS NULL OR created_at <= $4)
            ORDER BY created_at DESC
            LIMIT $5 OFFSET $6
            "#
        ))
        .bind(tenant_id)
        .bind(filter.status.map(|status| status.as_str().to_string()))
        .bind(filter.from)
        .bind(filter.to)
        .bind(limit + 1)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let has_more = records.len() as i64 > limit;
        let messages = records
            .into_iter()
            .take(limit as usize)
            .map(Message::try_from)
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok((messages, has_more))
    }
}

#[derive(FromRow)]
struct MessageRecord {
    id: Uuid,
    tenant_id: Uuid,
    sender_id: Uuid,
    recipient: serde_json::Value,
    text: String,
    media: serde_json::Value,
    template_id: Option<Uuid>,
    status: String,
    provider_message_id: Option<String>,
    provider_response: Option<String>,
    sent_at: Option<DateTime<Utc>>,
    delivered_at: Option<DateTime<Utc>>,
    failure_reason: Option<String>,
    retry_count: i32,
    max_retries: i32,
    compliance: serde_json::Value,
    scheduling: serde_json::Value,
    campaign_id: Option<Uuid>,
    cost: serde_json::Value,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MessageRecord> for Message {
    type Error = anyhow::Error;

    fn try_from(record: MessageRecord) -> anyhow::Result<Self> {
        let recipient: Recipient =
            serde_json::from_value(record.recipient).context("invalid recipient column")?;
        let media: Vec<MediaItem> =
            serde_json::from_value(record.media).context("invalid media column")?;
        let compliance: ComplianceState =
            serde_json::from_value(record.compliance).context("invalid compliance column")?;
        let scheduling: Scheduling =
            serde_json::from_value(record.scheduling).context("invalid scheduling column")?;
        let cost: Option<Cost> =
            serde_json::from_value(record.cost).context("invalid cost column")?;
        let status = DeliveryStatus::from_str(&record.status)
            .with_context(|| format!("unknown delivery status: {}", record.status))?;

        Ok(Message {
            id: record.id,
            tenant_id: record.tenant_id,
            sender_id: record.sender_id,
            recipient,
            content: MessageContent {
                text: record.text,
                media,
                template_id: record.template_id,
            },
            delivery: DeliveryState {
                status,
                provider_message_id: record.provider_message_id,
                provider_response: record.provider_response,
                sent_at: record.sent_at,
                delivered_at: record.delivered_at,
                failure_reason: record.failure_reason,
                retry_count: record.retry_count as u32,
                max_retries: record.max_retries as u32,
            },
            compliance,
            scheduling,
            campaign_id: record.campaign_id,
            cost,
            metadata: record.metadata,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}
