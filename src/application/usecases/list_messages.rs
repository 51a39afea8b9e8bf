use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{
    errors::DomainError,
    models::Message,
    repositories::{MessageFilter, MessageRepository},
};

pub struct ListMessagesResponse {
    pub messages: Vec<Message>,
    pub has_more: bool,
    pub next_offset: Option<u32>,
}

pub struct ListMessagesUseCase {
    repo: Arc<dyn MessageRepository>,
}

impl ListMessagesUseCase {
    pub fn new(repo: Arc<dyn MessageRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        tenant_id: Uuid,
        filter: MessageFilter,
    ) -> Result<ListMessagesResponse, DomainError> {
        let offset = filter.offset.unwrap_or(0);
        let (messages, has_more) = self.repo.list(tenant_id, filter).await?;
        let next_offset = has_more.then(|| offset + messages.len() as u32);
        Ok(ListMessagesResponse {
            messages,
            has_more,
            next_offset,
        })
    }
}
