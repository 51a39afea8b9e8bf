use std::sync::Arc;

use uuid::Uuid;

use crate::application::{
    handlers::dispatcher::{DispatchHandler, DispatchOutcome},
    services::lifecycle::MessageLifecycle,
};
use crate::domain::{
    errors::DomainError,
    models::DeliveryStatus,
    repositories::{MessageRepository, TenantDirectory},
};

pub struct RetryMessageRequest {
    pub tenant_id: Uuid,
    pub message_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct RetryMessageResponse {
    pub status: DeliveryStatus,
    pub failure_reason: Option<String>,
}

/// Caller-triggered retry: re-validates eligibility, applies the lifecycle
/// retry guard, then walks the same dispatch step as a fresh send.
pub struct RetryMessageUseCase {
    repo: Arc<dyn MessageRepository>,
    tenants: Arc<dyn TenantDirectory>,
    lifecycle: Arc<MessageLifecycle>,
    dispatcher: Arc<DispatchHandler>,
}

impl RetryMessageUseCase {
    pub fn new(
        repo: Arc<dyn MessageRepository>,
        tenants: Arc<dyn TenantDirectory>,
        lifecycle: Arc<MessageLifecycle>,
        dispatcher: Arc<DispatchHandler>,
    ) -> Self {
        Self {
            repo,
            tenants,
            lifecycle,
            dispatcher,
        }
    }

    pub async fn execute(
        &self,
        request: RetryMessageRequest,
    ) -> Result<RetryMessageResponse, DomainError> {
        let message = self
            .repo
            .get(request.message_id)
            .await?
            .filter(|m| m.tenant_id == request.tenant_id)
            .ok_or(DomainError::MessageNotFound(request.message_id))?;

        let tenant = self
            .tenants
            .get(request.tenant_id)
            .await?
            .ok_or_else(|| DomainError::SenderNotEligible("unknown tenant".to_string()))?;
        if !self.tenants.can_send(request.tenant_id).await? {
            return Err(DomainError::SenderNotEligible(
                "tenant is not in good sending standing".to_string(),
            ));
        }

        let rearmed = self.lifecycle.retry(message.id).await?;
        tracing::info!(
            message_id = %rearmed.id,
            attempt = rearmed.delivery.retry_count,
            "retrying dispatch"
        );

        Ok(match self.dispatcher.dispatch(&tenant, &rearmed).await {
            DispatchOutcome::Sent => RetryMessageResponse {
                status: DeliveryStatus::Sent,
                failure_reason: None,
            },
            DispatchOutcome::Failed { reason } => RetryMessageResponse {
                status: DeliveryStatus::Failed,
                failure_reason: Some(reason),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;
    use crate::application::services::{
        notifier::NoopNotifier,
        provider::{DeliveryProvider, ProviderGateway, SendRequest},
    };
    use crate::domain::models::{
        ComplianceVerdict, CompliancePolicy, DeliveryPolicy, DeliveryReport, Message,
        MessageContent, ProviderKind, ProviderReceipt, Recipient, Scheduling, TenantConfig,
    };
    use crate::infrastructure::repositories::in_memory::{
        InMemoryMessageRepository, InMemoryTenantDirectory,
    };

    struct FlakyProvider;

    #[async_trait]
    impl DeliveryProvider for FlakyProvider {
        fn kind(&self) -> ProviderKind {
            ProviderKind::Twilio
        }

        async fn send(
            &self,
            _credentials: &HashMap<String, String>,
            _request: &SendRequest,
        ) -> Result<ProviderReceipt, DomainError> {
            Ok(ProviderReceipt {
                provider_message_id: "SM200".to_string(),
                raw_response: None,
            })
        }

        async fn fetch_status(
            &self,
            _credentials: &HashMap<String, String>,
            _provider_message_id: &str,
        ) -> Result<DeliveryReport, DomainError> {
            unimplemented!("not used by these tests")
        }
    }

    async fn fixture() -> (
        RetryMessageUseCase,
        Arc<InMemoryMessageRepository>,
        TenantConfig,
    ) {
        let repo = Arc::new(InMemoryMessageRepository::new());
        let directory = Arc::new(InMemoryTenantDirectory::new(100));
        let tenant = TenantConfig {
            id: Uuid::new_v4(),
            name: "acme".to_string(),
            compliance: CompliancePolicy {
                require_age_verification: false,
                require_consent: false,
                max_messages_per_recipient_per_day: 10,
                restricted_keywords: vec![],
                required_disclaimers: vec![],
                allowed_media_types: vec![],
            },
            delivery: DeliveryPolicy {
                provider: "twilio".to_string(),
                credentials: HashMap::new(),
                max_retries: 2,
            },
        };
        directory.upsert(tenant.clone()).await;

        let lifecycle = Arc::new(MessageLifecycle::new(repo.clone()));
        let gateway = Arc::new(ProviderGateway::new(
            vec![Arc::new(FlakyProvider)],
            "1".to_string(),
        ));
        let dispatcher = Arc::new(DispatchHandler::new(
            gateway,
            lifecycle.clone(),
            directory.clone(),
            Arc::new(NoopNotifier),
        ));
        (
            RetryMessageUseCase::new(repo.clone(), directory, lifecycle, dispatcher),
            repo,
            tenant,
        )
    }

    fn failed_message(tenant_id: Uuid, retry_count: u32, max_retries: u32) -> Message {
        let mut message = Message::new(
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
                text: "hello 21+".to_string(),
                media: vec![],
                template_id: None,
            },
            &ComplianceVerdict::passing(),
            Scheduling::default(),
            None,
            max_retries,
            serde_json::Value::Null,
        );
        message.delivery.status = DeliveryStatus::Failed;
        message.delivery.failure_reason = Some("timeout".to_string());
        message.delivery.retry_count = retry_count;
        message
    }

    #[tokio::test]
    async fn retry_redispatches_and_marks_sent() {
        let (usecase, repo, tenant) = fixture().await;
        let message = failed_message(tenant.id, 0, 2);
        repo.insert(&message).await.unwrap();

        let response = usecase
            .execute(RetryMessageRequest {
                tenant_id: tenant.id,
                message_id: message.id,
            })
            .await
            .unwrap();
        assert_eq!(response.status, DeliveryStatus::Sent);

        let stored = repo.get(message.id).await.unwrap().unwrap();
        assert_eq!(stored.delivery.retry_count, 1);
        assert!(stored.delivery.failure_reason.is_none());
    }

    #[tokio::test]
    async fn exhausted_message_is_not_retryable() {
        let (usecase, repo, tenant) = fixture().await;
        let message = failed_message(tenant.id, 2, 2);
        repo.insert(&message).await.unwrap();

        let err = usecase
            .execute(RetryMessageRequest {
                tenant_id: tenant.id,
                message_id: message.id,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotRetryable(_)));
    }

    #[tokio::test]
    async fn foreign_tenant_message_is_not_found() {
        let (usecase, repo, tenant) = fixture().await;
        let message = failed_message(Uuid::new_v4(), 0, 2);
        repo.insert(&message).await.unwrap();

        let err = usecase
            .execute(RetryMessageRequest {
                tenant_id: tenant.id,
                message_id: message.id,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::MessageNotFound(_)));
    }
}
