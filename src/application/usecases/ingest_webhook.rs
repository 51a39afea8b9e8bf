use std::sync::Arc;

use uuid::Uuid;

use crate::application::services::{lifecycle::MessageLifecycle, notifier::Notifier};
use crate::domain::{
    errors::DomainError,
    events::{MessageEvent, MessageEventKind},
    models::Message,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookStatus {
    Delivered,
    Failed,
}

/// Inbound entry point for asynchronous provider callbacks. Uses the same
/// lifecycle transition surface as the synchronous path; terminal statuses
/// are idempotent, so replayed callbacks cannot corrupt state.
pub struct IngestWebhookUseCase {
    lifecycle: Arc<MessageLifecycle>,
    notifier: Arc<dyn Notifier>,
}

impl IngestWebhookUseCase {
    pub fn new(lifecycle: Arc<MessageLifecycle>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            lifecycle,
            notifier,
        }
    }

    pub async fn execute(
        &self,
        message_id: Uuid,
        status: WebhookStatus,
        error: Option<String>,
    ) -> Result<Message, DomainError> {
        let (message, kind) = match status {
            WebhookStatus::Delivered => {
                let message = self.lifecycle.mark_delivered(message_id).await?;
                (message, MessageEventKind::Delivered)
            }
            WebhookStatus::Failed => {
                let reason =
                    error.unwrap_or_else(|| "provider reported delivery failure".to_string());
                let message = self.lifecycle.mark_failed(message_id, reason.clone()).await?;
                (message, MessageEventKind::Failed { reason })
            }
        };

        tracing::info!(%message_id, status = message.delivery.status.as_str(), "webhook applied");
        let event = MessageEvent::new(message.id, message.tenant_id, kind);
        if let Err(err) = self.notifier.publish(message.tenant_id, event).await {
            tracing::warn!(%message_id, error = %err, "notification publish failed");
        }
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::notifier::NoopNotifier;
    use crate::domain::models::{
        ComplianceVerdict, DeliveryStatus, MessageContent, ProviderReceipt, Recipient, Scheduling,
    };
    use crate::domain::repositories::MessageRepository;
    use crate::infrastructure::repositories::in_memory::InMemoryMessageRepository;

    async fn sent_message(repo: &Arc<InMemoryMessageRepository>) -> Message {
        let lifecycle = MessageLifecycle::new(repo.clone());
        let message = Message::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Recipient {
                address: "+15551234567".to_string(),
                display_name: None,
                age_verified: true,
                consent_given: true,
                consented_at: None,
                opted_out: false,
            },
            MessageContent {
                text: "hi 21+".to_string(),
                media: vec![],
                template_id: None,
            },
            &ComplianceVerdict::passing(),
            Scheduling::default(),
            None,
            3,
            serde_json::Value::Null,
        );
        repo.insert(&message).await.unwrap();
        lifecycle
            .mark_sent(
                message.id,
                ProviderReceipt {
                    provider_message_id: "SM1".to_string(),
                    raw_response: None,
                },
            )
            .await
            .unwrap()
    }

    fn usecase(repo: Arc<InMemoryMessageRepository>) -> IngestWebhookUseCase {
        IngestWebhookUseCase::new(
            Arc::new(MessageLifecycle::new(repo)),
            Arc::new(NoopNotifier),
        )
    }

    #[tokio::test]
    async fn delivered_webhook_is_idempotent() {
        let repo = Arc::new(InMemoryMessageRepository::new());
        let message = sent_message(&repo).await;
        let usecase = usecase(repo.clone());

        let first = usecase
            .execute(message.id, WebhookStatus::Delivered, None)
            .await
            .unwrap();
        let second = usecase
            .execute(message.id, WebhookStatus::Delivered, None)
            .await
            .unwrap();

        assert_eq!(first.delivery.delivered_at, second.delivery.delivered_at);
        assert_eq!(second.delivery.status, DeliveryStatus::Delivered);
    }

    #[tokio::test]
    async fn failed_webhook_records_reason() {
        let repo = Arc::new(InMemoryMessageRepository::new());
        let message = sent_message(&repo).await;
        let usecase = usecase(repo.clone());

        let updated = usecase
            .execute(
                message.id,
                WebhookStatus::Failed,
                Some("carrier rejected".to_string()),
            )
            .await
            .unwrap();
        assert_eq!(updated.delivery.status, DeliveryStatus::Failed);
        assert_eq!(
            updated.delivery.failure_reason.as_deref(),
            Some("carrier rejected")
        );
    }

    #[tokio::test]
    async fn unknown_message_is_reported() {
        let repo = Arc::new(InMemoryMessageRepository::new());
        let usecase = usecase(repo);

        let err = usecase
            .execute(Uuid::new_v4(), WebhookStatus::Delivered, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::MessageNotFound(_)));
    }
}
