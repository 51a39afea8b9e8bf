use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    models::{Message, Template, TenantConfig},
    repositories::{
        MessageFilter, MessageRepository, RateDecision, RateLimiter, TemplateStore,
        TenantDirectory,
    },
};

#[derive(Default)]
pub struct InMemoryMessageRepository {
    messages: Arc<RwLock<HashMap<Uuid, Message>>>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn insert(&self, message: &Message) -> anyhow::Result<()> {
        let mut messages = self.messages.write().await;
        messages.insert(message.id, message.clone());
        Ok(())
    }

    async fn update(&self, message: &Message) -> anyhow::Result<()> {
        let mut messages = self.messages.write().await;
        messages.insert(message.id, message.clone());
        Ok(())
    }

    async fn get(&self, message_id: Uuid) -> anyhow::Result<Option<Message>> {
        let messages = self.messages.read().await;
        Ok(messages.get(&message_id).cloned())
    }

    async fn delete(&self, message_id: Uuid) -> anyhow::Result<bool> {
        let mut messages = self.messages.write().await;
        Ok(messages.remove(&message_id).is_some())
    }

    async fn list(
        &self,
        tenant_id: Uuid,
        filter: MessageFilter,
    ) -> anyhow::Result<(Vec<Message>, bool)> {
        let messages = self.messages.read().await;
        let mut matching: Vec<Message> = messages
            .values()
            .filter(|m| m.tenant_id == tenant_id)
            .filter(|m| filter.status.is_none_or(|status| m.delivery.status == status))
            .filter(|m| filter.from.is_none_or(|from| m.created_at >= from))
            .filter(|m| filter.to.is_none_or(|to| m.created_at <= to))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let offset = filter.offset.unwrap_or(0) as usize;
        let limit = filter.limit.unwrap_or(50) as usize;
        let page: Vec<Message> = matching.iter().skip(offset).take(limit).cloned().collect();
        let has_more = matching.len() > offset + page.len();
        Ok((page, has_more))
    }
}

pub struct InMemoryTenantDirectory {
    tenants: Arc<RwLock<HashMap<Uuid, TenantConfig>>>,
    standing: Arc<RwLock<HashMap<Uuid, bool>>>,
    usage: Arc<RwLock<HashMap<Uuid, u32>>>,
    daily_ceiling: u32,
}

impl InMemoryTenantDirectory {
    pub fn new(daily_ceiling: u32) -> Self {
        Self {
            tenants: Arc::new(RwLock::new(HashMap::new())),
            standing: Arc::new(RwLock::new(HashMap::new())),
            usage: Arc::new(RwLock::new(HashMap::new())),
            daily_ceiling,
        }
    }

    pub async fn upsert(&self, tenant: TenantConfig) {
        let mut tenants = self.tenants.write().await;
        tenants.insert(tenant.id, tenant);
    }

    pub async fn set_standing(&self, tenant_id: Uuid, good: bool) {
        let mut standing = self.standing.write().await;
        standing.insert(tenant_id, good);
    }

    pub async fn usage_of(&self, tenant_id: Uuid) -> u32 {
        let usage = self.usage.read().await;
        usage.get(&tenant_id).copied().unwrap_or(0)
    }
}

#[async_trait]
impl TenantDirectory for InMemoryTenantDirectory {
    async fn get(&self, tenant_id: Uuid) -> anyhow::Result<Option<TenantConfig>> {
        let tenants = self.tenants.read().await;
        Ok(tenants.get(&tenant_id).cloned())
    }

    async fn can_send(&self, tenant_id: Uuid) -> anyhow::Result<bool> {
        let standing = self.standing.read().await;
        if !standing.get(&tenant_id).copied().unwrap_or(true) {
            return Ok(false);
        }
        let usage = self.usage.read().await;
        Ok(usage.get(&tenant_id).copied().unwrap_or(0) < self.daily_ceiling)
    }

    async fn increment_usage(&self, tenant_id: Uuid) -> anyhow::Result<bool> {
        // Increment and ceiling check under one write lock, so concurrent
        // sends cannot push a tenant past its quota.
        let mut usage = self.usage.write().await;
        let current = usage.entry(tenant_id).or_insert(0);
        if *current >= self.daily_ceiling {
            return Ok(false);
        }
        *current += 1;
        Ok(true)
    }
}

#[derive(Default)]
pub struct InMemoryTemplateStore {
    templates: Arc<RwLock<HashMap<Uuid, Template>>>,
}

impl InMemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert(&self, template: Template) {
        let mut templates = self.templates.write().await;
        templates.insert(template.id, template);
    }

    pub async fn times_used(&self, template_id: Uuid) -> u64 {
        let templates = self.templates.read().await;
        templates.get(&template_id).map(|t| t.times_used).unwrap_or(0)
    }
}

#[async_trait]
impl TemplateStore for InMemoryTemplateStore {
    async fn get(&self, template_id: Uuid, tenant_id: Uuid) -> anyhow::Result<Option<Template>> {
        let templates = self.templates.read().await;
        Ok(templates
            .get(&template_id)
            .filter(|t| t.tenant_id == tenant_id)
            .cloned())
    }

    async fn record_usage(&self, template_id: Uuid) -> anyhow::Result<()> {
        let mut templates = self.templates.write().await;
        if let Some(template) = templates.get_mut(&template_id) {
            template.times_used += 1;
            template.last_used_at = Some(Utc::now());
        }
        Ok(())
    }
}

/// Calendar-day recipient counter. A check that comes back allowed consumes
/// one slot; other window semantics can be swapped in behind the trait.
#[derive(Default)]
pub struct InMemoryRateLimiter {
    counts: Arc<RwLock<HashMap<(Uuid, String, NaiveDate), u32>>>,
}

impl InMemoryRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check(
        &self,
        tenant_id: Uuid,
        recipient_address: &str,
        max_per_day: u32,
    ) -> anyhow::Result<RateDecision> {
        let today = Utc::now().date_naive();
        let key = (tenant_id, recipient_address.to_string(), today);
        let mut counts = self.counts.write().await;
        let count = counts.entry(key).or_insert(0);
        if *count >= max_per_day {
            return Ok(RateDecision {
                allowed: false,
                remaining: 0,
            });
        }
        *count += 1;
        Ok(RateDecision {
            allowed: true,
            remaining: max_per_day - *count,
        })
    }
}
