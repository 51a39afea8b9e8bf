use std::sync::Arc;

use uuid::Uuid;

use crate::application::services::lifecycle::MessageLifecycle;
use crate::domain::{errors::DomainError, repositories::MessageRepository};

/// Cancels a still-pending scheduled message; the record is removed.
pub struct CancelMessageUseCase {
    repo: Arc<dyn MessageRepository>,
    lifecycle: Arc<MessageLifecycle>,
}

impl CancelMessageUseCase {
    pub fn new(repo: Arc<dyn MessageRepository>, lifecycle: Arc<MessageLifecycle>) -> Self {
        Self { repo, lifecycle }
    }

    pub async fn execute(&self, tenant_id: Uuid, message_id: Uuid) -> Result<(), DomainError> {
        self.repo
            .get(message_id)
            .await?
            .filter(|m| m.tenant_id == tenant_id)
            .ok_or(DomainError::MessageNotFound(message_id))?;

        self.lifecycle.cancel(message_id).await?;
        tracing::info!(%message_id, "scheduled message cancelled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{
        ComplianceVerdict, Message, MessageContent, Recipient, Scheduling,
    };
    use crate::infrastructure::repositories::in_memory::InMemoryMessageRepository;

    fn scheduled_message(tenant_id: Uuid) -> Message {
        Message::new(
            tenant_id,
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
                text: "later 21+".to_string(),
                media: vec![],
                template_id: None,
            },
            &ComplianceVerdict::passing(),
            Scheduling {
                scheduled_for: Some(chrono::Utc::now() + chrono::Duration::hours(1)),
                timezone: None,
                is_scheduled: true,
                recurrence: None,
            },
            None,
            3,
            serde_json::Value::Null,
        )
    }

    #[tokio::test]
    async fn cancel_removes_record_then_reports_not_found() {
        let repo = Arc::new(InMemoryMessageRepository::new());
        let lifecycle = Arc::new(MessageLifecycle::new(repo.clone()));
        let usecase = CancelMessageUseCase::new(repo.clone(), lifecycle);

        let tenant_id = Uuid::new_v4();
        let message = scheduled_message(tenant_id);
        repo.insert(&message).await.unwrap();

        usecase.execute(tenant_id, message.id).await.unwrap();
        assert!(repo.get(message.id).await.unwrap().is_none());

        let err = usecase.execute(tenant_id, message.id).await.unwrap_err();
        assert!(matches!(err, DomainError::MessageNotFound(_)));
    }
}
