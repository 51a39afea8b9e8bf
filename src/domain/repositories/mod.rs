use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::models::{DeliveryStatus, Message, Template, TenantConfig};

#[derive(Debug, Clone, Default)]
pub struct MessageFilter {
    pub status: Option<DeliveryStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn insert(&self, message: &Message) -> anyhow::Result<()>;
    async fn update(&self, message: &Message) -> anyhow::Result<()>;
    async fn get(&self, message_id: Uuid) -> anyhow::Result<Option<Message>>;
    async fn delete(&self, message_id: Uuid) -> anyhow::Result<bool>;
    async fn list(
        &self,
        tenant_id: Uuid,
        filter: MessageFilter,
    ) -> anyhow::Result<(Vec<Message>, bool)>;
}

/// Tenant/auth collaborator. The gateway consumes tenant configuration and a
/// quota answer; it does not own tenant records.
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    async fn get(&self, tenant_id: Uuid) -> anyhow::Result<Option<TenantConfig>>;
    /// Active subscription, usage ceiling and compliance standing in one
    /// answer.
    async fn can_send(&self, tenant_id: Uuid) -> anyhow::Result<bool>;
    /// Atomic increment-with-ceiling-check; false when the ceiling is hit.
    async fn increment_usage(&self, tenant_id: Uuid) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait TemplateStore: Send + Sync {
    async fn get(&self, template_id: Uuid, tenant_id: Uuid) -> anyhow::Result<Option<Template>>;
    /// Bump send counter and last-used timestamp. Called only after a
    /// successful render.
    async fn record_usage(&self, template_id: Uuid) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy)]
pub struct RateDecision {
    pub allowed: bool,
    pub remaining: u32,
}

#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn check(
        &self,
        tenant_id: Uuid,
        recipient_address: &str,
        max_per_day: u32,
    ) -> anyhow::Result<RateDecision>;
}
