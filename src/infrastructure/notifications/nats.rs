use async_trait::async_trait;
use uuid::Uuid;

use crate::{application::services::notifier::Notifier, domain::events::MessageEvent};

/// Publishes lifecycle events to per-tenant NATS subjects for real-time
/// consumers (dashboards, websockets). Best-effort by contract.
pub struct NatsNotifier {
    client: async_nats::Client,
    subject_prefix: String,
}

impl NatsNotifier {
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let client = async_nats::connect(url).await?;
        Ok(Self {
            client,
            subject_prefix: "complygate.tenants".to_string(),
        })
    }
}

#[async_trait]
impl Notifier for NatsNotifier {
    async fn publish(&self, tenant_id: Uuid, event: MessageEvent) -> anyhow::Result<()> {
        let subject = format!("{}.{}.messages", self.subject_prefix, tenant_id);
        let payload = serde_json::to_vec(&event)?;
        self.client.publish(subject, payload.into()).await?;
        Ok(())
    }
}
