use std::sync::Arc;

use crate::application::services::{
    lifecycle::MessageLifecycle, notifier::Notifier, provider::ProviderGateway,
};
use crate::domain::{
    events::{MessageEvent, MessageEventKind},
    models::{Message, TenantConfig},
    repositories::TenantDirectory,
};

#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    Sent,
    Failed { reason: String },
}

/// The immediate dispatch step shared by the send and retry paths: provider
/// call, lifecycle update, tenant usage accounting, notification. Provider
/// and internal errors are absorbed here; the already-persisted message is
/// always left behind for inspection.
pub struct DispatchHandler {
    gateway: Arc<ProviderGateway>,
    lifecycle: Arc<MessageLifecycle>,
    tenants: Arc<dyn TenantDirectory>,
    notifier: Arc<dyn Notifier>,
}

impl DispatchHandler {
    pub fn new(
        gateway: Arc<ProviderGateway>,
        lifecycle: Arc<MessageLifecycle>,
        tenants: Arc<dyn TenantDirectory>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            gateway,
            lifecycle,
            tenants,
            notifier,
        }
    }

    pub async fn dispatch(&self, tenant: &TenantConfig, message: &Message) -> DispatchOutcome {
        match self.gateway.dispatch(&tenant.delivery, message).await {
            Ok(receipt) => match self.lifecycle.mark_sent(message.id, receipt).await {
                Ok(sent) => {
                    if let Ok(false) = self.tenants.increment_usage(tenant.id).await {
                        tracing::warn!(tenant_id = %tenant.id, "usage ceiling reached after send");
                    }
                    tracing::info!(message_id = %sent.id, "message sent");
                    self.notify(tenant.id, message, MessageEventKind::Sent).await;
                    DispatchOutcome::Sent
                }
                Err(err) => {
                    // The provider accepted the message but the local record
                    // refused the transition. Keep the audit trail and report
                    // a failure instead of crashing the serving path.
                    tracing::error!(message_id = %message.id, error = %err, "mark_sent rejected");
                    let reason = err.to_string();
                    self.mark_failed_best_effort(tenant, message, reason.clone())
                        .await;
                    DispatchOutcome::Failed { reason }
                }
            },
            Err(err) => {
                let reason = err.to_string();
                tracing::warn!(message_id = %message.id, error = %reason, "dispatch failed");
                self.mark_failed_best_effort(tenant, message, reason.clone())
                    .await;
                DispatchOutcome::Failed { reason }
            }
        }
    }

    async fn mark_failed_best_effort(&self, tenant: &TenantConfig, message: &Message, reason: String) {
        if let Err(err) = self.lifecycle.mark_failed(message.id, reason.clone()).await {
            tracing::error!(message_id = %message.id, error = %err, "failed to record failure");
        }
        self.notify(tenant.id, message, MessageEventKind::Failed { reason })
            .await;
    }

    async fn notify(&self, tenant_id: uuid::Uuid, message: &Message, kind: MessageEventKind) {
        let event = MessageEvent::new(message.id, tenant_id, kind);
        if let Err(err) = self.notifier.publish(tenant_id, event).await {
            tracing::warn!(message_id = %message.id, error = %err, "notification publish failed");
        }
    }
}
