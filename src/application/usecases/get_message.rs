use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{errors::DomainError, models::Message, repositories::MessageRepository};

pub struct GetMessageUseCase {
    repo: Arc<dyn MessageRepository>,
}

impl GetMessageUseCase {
    pub fn new(repo: Arc<dyn MessageRepository>) -> Self {
        Self { repo }
    }

    /// A message owned by another tenant is indistinguishable from a missing
    /// one.
    pub async fn execute(&self, tenant_id: Uuid, message_id: Uuid) -> Result<Message, DomainError> {
        self.repo
            .get(message_id)
            .await?
            .filter(|m| m.tenant_id == tenant_id)
            .ok_or(DomainError::MessageNotFound(message_id))
    }
}
