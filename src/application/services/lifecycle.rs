use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{
    errors::DomainError,
    models::{Message, ProviderReceipt},
    repositories::MessageRepository,
};

/// Single writer of delivery status. Transitions are computed by the pure
/// functions on `Message` and persisted here, once, after the decision.
/// A per-message lock serializes concurrent transitions so retry counts
/// cannot race past the ceiling.
pub struct MessageLifecycle {
    repo: Arc<dyn MessageRepository>,
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl MessageLifecycle {
    pub fn new(repo: Arc<dyn MessageRepository>) -> Self {
        Self {
            repo,
            locks: Mutex::new(HashMap::new()),
        }
    }

    async fn lock_for(&self, message_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(message_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drops the registry entry once a message can no longer transition, so
    /// the lock map does not grow with every message ever dispatched. A late
    /// replayed webhook simply re-creates the entry for its no-op.
    async fn release(&self, message_id: Uuid) {
        let mut locks = self.locks.lock().await;
        locks.remove(&message_id);
    }

    #[cfg(test)]
    async fn tracked_locks(&self) -> usize {
        self.locks.lock().await.len()
    }

    pub async fn create(&self, message: &Message) -> Result<(), DomainError> {
        self.repo.insert(message).await?;
        Ok(())
    }

    pub async fn mark_sent(
        &self,
        message_id: Uuid,
        receipt: ProviderReceipt,
    ) -> Result<Message, DomainError> {
        let lock = self.lock_for(message_id).await;
        let _guard = lock.lock().await;

        let message = self.load(message_id).await?;
        let next = message.with_sent(receipt.provider_message_id, receipt.raw_response)?;
        self.repo.update(&next).await?;
        Ok(next)
    }

    pub async fn mark_delivered(&self, message_id: Uuid) -> Result<Message, DomainError> {
        let lock = self.lock_for(message_id).await;
        let _guard = lock.lock().await;

        let message = self.load(message_id).await?;
        let next = message.with_delivered()?;
        self.repo.update(&next).await?;
        drop(_guard);
        self.release(message_id).await;
        Ok(next)
    }

    pub async fn mark_failed(
        &self,
        message_id: Uuid,
        reason: String,
    ) -> Result<Message, DomainError> {
        let lock = self.lock_for(message_id).await;
        let _guard = lock.lock().await;

        let message = self.load(message_id).await?;
        let next = message.with_failed(reason)?;
        self.repo.update(&next).await?;
        if next.delivery.retry_count >= next.delivery.max_retries {
            drop(_guard);
            self.release(message_id).await;
        }
        Ok(next)
    }

    /// Increments the retry counter and re-arms the message for dispatch.
    /// Does not resend; the orchestrator owns the dispatch step.
    pub async fn retry(&self, message_id: Uuid) -> Result<Message, DomainError> {
        let lock = self.lock_for(message_id).await;
        let _guard = lock.lock().await;

        let message = self.load(message_id).await?;
        let next = message.with_retry()?;
        self.repo.update(&next).await?;
        Ok(next)
    }

    /// Removes a still-pending scheduled message. Anything already dispatched
    /// is out of reach.
    pub async fn cancel(&self, message_id: Uuid) -> Result<(), DomainError> {
        let lock = self.lock_for(message_id).await;
        let _guard = lock.lock().await;

        let message = self.load(message_id).await?;
        if !message.is_cancellable() {
            return Err(DomainError::NotCancellable(format!(
                "status is {}, scheduled: {}",
                message.delivery.status.as_str(),
                message.scheduling.is_scheduled
            )));
        }
        if !self.repo.delete(message_id).await? {
            return Err(DomainError::MessageNotFound(message_id));
        }
        drop(_guard);
        self.release(message_id).await;
        Ok(())
    }

    async fn load(&self, message_id: Uuid) -> Result<Message, DomainError> {
        self.repo
            .get(message_id)
            .await?
            .ok_or(DomainError::MessageNotFound(message_id))
    }
}
