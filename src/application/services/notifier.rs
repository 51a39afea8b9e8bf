use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::events::MessageEvent;

/// Optional real-time notification collaborator. Callers treat publishes as
/// fire-and-forget; a failure is logged and never fails the dispatch path.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, tenant_id: Uuid, event: MessageEvent) -> anyhow::Result<()>;
}

pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn publish(&self, _tenant_id: Uuid, _event: MessageEvent) -> anyhow::Result<()> {
        Ok(())
    }
}
