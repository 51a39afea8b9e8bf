use std::sync::Arc;

use chrono::Local;
use uuid::Uuid;

use crate::application::{
    handlers::dispatcher::{DispatchHandler, DispatchOutcome},
    services::{
        compliance::ComplianceEvaluator,
        content::{ContentRequest, ContentResolver},
        lifecycle::MessageLifecycle,
    },
};
use crate::domain::{
    errors::DomainError,
    models::{estimate_cost, Message, MessageContent, ProviderKind, Recipient, Scheduling},
    repositories::TenantDirectory,
};

pub struct SendMessageRequest {
    pub tenant_id: Uuid,
    pub sender_id: Uuid,
    pub recipient: Recipient,
    pub content: ContentRequest,
    pub scheduling: Scheduling,
    pub campaign_id: Option<Uuid>,
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone)]
pub enum SendOutcome {
    Sent { message_id: Uuid },
    Scheduled { message_id: Uuid },
    Failed { message_id: Uuid, reason: String },
    /// Compliance said no. A normal response shape, not an error; the
    /// message was never persisted.
    Rejected { reasons: Vec<String> },
}

/// Top-level coordinator for the send path: eligibility, opt-out, content
/// resolution, compliance, persistence, then dispatch, in that fixed order.
pub struct SendMessageUseCase {
    tenants: Arc<dyn TenantDirectory>,
    resolver: Arc<ContentResolver>,
    evaluator: Arc<ComplianceEvaluator>,
    lifecycle: Arc<MessageLifecycle>,
    dispatcher: Arc<DispatchHandler>,
    clock: fn() -> chrono::DateTime<Local>,
}

impl SendMessageUseCase {
    pub fn new(
        tenants: Arc<dyn TenantDirectory>,
        resolver: Arc<ContentResolver>,
        evaluator: Arc<ComplianceEvaluator>,
        lifecycle: Arc<MessageLifecycle>,
        dispatcher: Arc<DispatchHandler>,
    ) -> Self {
        Self {
            tenants,
            resolver,
            evaluator,
            lifecycle,
            dispatcher,
            clock: Local::now,
        }
    }

    #[cfg(test)]
    fn with_clock(mut self, clock: fn() -> chrono::DateTime<Local>) -> Self {
        self.clock = clock;
        self
    }

    pub async fn execute(&self, request: SendMessageRequest) -> Result<SendOutcome, DomainError> {
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

        if request.recipient.opted_out {
            return Err(DomainError::RecipientOptedOut(
                request.recipient.address.clone(),
            ));
        }

        let resolved = self
            .resolver
            .resolve(request.tenant_id, &request.content)
            .await?;

        let verdict = self
            .evaluator
            .evaluate(&tenant, &request.recipient, &resolved, (self.clock)())
            .await;
        if !verdict.passed {
            tracing::info!(tenant_id = %tenant.id, reasons = ?verdict.reasons, "send rejected by compliance");
            return Ok(SendOutcome::Rejected {
                reasons: verdict.reasons,
            });
        }

        let content = MessageContent {
            text: resolved.text,
            media: resolved.media,
            template_id: resolved.template_id,
        };
        let mut message = Message::new(
            request.tenant_id,
            request.sender_id,
            request.recipient,
            content,
            &verdict,
            request.scheduling,
            request.campaign_id,
            tenant.delivery.max_retries,
            request.metadata,
        );
        if let Ok(kind) = ProviderKind::parse(&tenant.delivery.provider) {
            message.cost = Some(estimate_cost(message.content.media.len(), kind));
        }

        self.lifecycle.create(&message).await?;

        if message.scheduling.is_scheduled {
            tracing::info!(message_id = %message.id, "message scheduled");
            return Ok(SendOutcome::Scheduled {
                message_id: message.id,
            });
        }

        Ok(match self.dispatcher.dispatch(&tenant, &message).await {
            DispatchOutcome::Sent => SendOutcome::Sent {
                message_id: message.id,
            },
            DispatchOutcome::Failed { reason } => SendOutcome::Failed {
                message_id: message.id,
                reason,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::application::services::{
        compliance::ComplianceDefaults,
        notifier::NoopNotifier,
        provider::{DeliveryProvider, ProviderGateway, SendRequest},
    };
    use crate::domain::models::{
        CompliancePolicy, DeliveryPolicy, DeliveryReport, DeliveryStatus, ProviderReceipt,
        TenantConfig,
    };
    use crate::domain::repositories::MessageRepository;
    use crate::infrastructure::repositories::in_memory::{
        InMemoryMessageRepository, InMemoryRateLimiter, InMemoryTemplateStore,
        InMemoryTenantDirectory,
    };

    struct MockProvider {
        fail_with: Option<String>,
    }

    #[async_trait]
    impl DeliveryProvider for MockProvider {
        fn kind(&self) -> ProviderKind {
            ProviderKind::Twilio
        }

        async fn send(
            &self,
            _credentials: &HashMap<String, String>,
            _request: &SendRequest,
        ) -> Result<ProviderReceipt, DomainError> {
            match &self.fail_with {
                Some(detail) => Err(DomainError::ProviderSendFailed {
                    provider: "twilio".to_string(),
                    detail: detail.clone(),
                }),
                None => Ok(ProviderReceipt {
                    provider_message_id: "SM123".to_string(),
                    raw_response: Some("{\"status\":\"queued\"}".to_string()),
                }),
            }
        }

        async fn fetch_status(
            &self,
            _credentials: &HashMap<String, String>,
            _provider_message_id: &str,
        ) -> Result<DeliveryReport, DomainError> {
            unimplemented!("not used by these tests")
        }
    }

    struct Fixture {
        usecase: SendMessageUseCase,
        repo: Arc<InMemoryMessageRepository>,
        directory: Arc<InMemoryTenantDirectory>,
        tenant: TenantConfig,
    }

    async fn fixture(require_verification: bool, provider_failure: Option<String>) -> Fixture {
        let repo = Arc::new(InMemoryMessageRepository::new());
        let directory = Arc::new(InMemoryTenantDirectory::new(100));
        let templates = Arc::new(InMemoryTemplateStore::new());
        let rate_limiter = Arc::new(InMemoryRateLimiter::new());

        let tenant = TenantConfig {
            id: Uuid::new_v4(),
            name: "acme spirits".to_string(),
            compliance: CompliancePolicy {
                require_age_verification: require_verification,
                require_consent: require_verification,
                max_messages_per_recipient_per_day: 10,
                restricted_keywords: vec![],
                required_disclaimers: vec!["21+".to_string()],
                allowed_media_types: vec![],
            },
            delivery: DeliveryPolicy {
                provider: "twilio".to_string(),
                credentials: HashMap::new(),
                max_retries: 3,
            },
        };
        directory.upsert(tenant.clone()).await;

        let lifecycle = Arc::new(MessageLifecycle::new(repo.clone()));
        let gateway = Arc::new(ProviderGateway::new(
            vec![Arc::new(MockProvider {
                fail_with: provider_failure,
            })],
            "1".to_string(),
        ));
        let dispatcher = Arc::new(DispatchHandler::new(
            gateway,
            lifecycle.clone(),
            directory.clone(),
            Arc::new(NoopNotifier),
        ));

        let usecase = SendMessageUseCase::new(
            directory.clone(),
            Arc::new(ContentResolver::new(templates)),
            Arc::new(ComplianceEvaluator::new(
                ComplianceDefaults::default(),
                rate_limiter,
            )),
            lifecycle,
            dispatcher,
        )
        .with_clock(|| {
            chrono::TimeZone::with_ymd_and_hms(&Local, 2026, 6, 2, 10, 0, 0).unwrap()
        });

        Fixture {
            usecase,
            repo,
            directory,
            tenant,
        }
    }

    fn request(tenant_id: Uuid, text: &str, verified: bool) -> SendMessageRequest {
        SendMessageRequest {
            tenant_id,
            sender_id: Uuid::new_v4(),
            recipient: Recipient {
                address: "+15551234567".to_string(),
                display_name: None,
                age_verified: verified,
                consent_given: verified,
                consented_at: verified.then(Utc::now),
                opted_out: false,
            },
            content: ContentRequest {
                text: Some(text.to_string()),
                ..Default::default()
            },
            scheduling: Scheduling::default(),
            campaign_id: None,
            metadata: serde_json::Value::Null,
        }
    }

    #[tokio::test]
    async fn unverified_recipient_is_rejected_and_nothing_persisted() {
        let fixture = fixture(true, None).await;
        let outcome = fixture
            .usecase
            .execute(request(fixture.tenant.id, "Buy now, 21+ only", false))
            .await
            .unwrap();

        match outcome {
            SendOutcome::Rejected { reasons } => {
                assert!(reasons.contains(&"Age verification required".to_string()));
                assert!(reasons.contains(&"Consent verification required".to_string()));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        let (messages, _) = fixture
            .repo
            .list(fixture.tenant.id, Default::default())
            .await
            .unwrap();
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn compliant_send_reaches_sent_with_timestamp() {
        let fixture = fixture(true, None).await;
        let outcome = fixture
            .usecase
            .execute(request(fixture.tenant.id, "Buy now, 21+ only", true))
            .await
            .unwrap();

        let message_id = match outcome {
            SendOutcome::Sent { message_id } => message_id,
            other => panic!("expected sent, got {other:?}"),
        };
        let message = fixture.repo.get(message_id).await.unwrap().unwrap();
        assert_eq!(message.delivery.status, DeliveryStatus::Sent);
        assert!(message.delivery.sent_at.is_some());
        assert_eq!(fixture.directory.usage_of(fixture.tenant.id).await, 1);
    }

    #[tokio::test]
    async fn provider_failure_leaves_failed_record_without_sent_at() {
        let fixture = fixture(true, Some("connection reset".to_string())).await;
        let outcome = fixture
            .usecase
            .execute(request(fixture.tenant.id, "Buy now, 21+ only", true))
            .await
            .unwrap();

        let (message_id, reason) = match outcome {
            SendOutcome::Failed { message_id, reason } => (message_id, reason),
            other => panic!("expected failure, got {other:?}"),
        };
        assert!(reason.contains("connection reset"));

        let message = fixture.repo.get(message_id).await.unwrap().unwrap();
        assert_eq!(message.delivery.status, DeliveryStatus::Failed);
        assert!(message.delivery.sent_at.is_none());
        assert!(message
            .delivery
            .failure_reason
            .as_deref()
            .unwrap()
            .contains("connection reset"));
        assert_eq!(fixture.directory.usage_of(fixture.tenant.id).await, 0);
    }

    #[tokio::test]
    async fn scheduled_send_stays_pending() {
        let fixture = fixture(true, None).await;
        let mut req = request(fixture.tenant.id, "Buy now, 21+ only", true);
        req.scheduling = Scheduling {
            scheduled_for: Some(Utc::now() + chrono::Duration::hours(2)),
            timezone: Some("America/New_York".to_string()),
            is_scheduled: true,
            recurrence: None,
        };

        let outcome = fixture.usecase.execute(req).await.unwrap();
        let message_id = match outcome {
            SendOutcome::Scheduled { message_id } => message_id,
            other => panic!("expected scheduled, got {other:?}"),
        };
        let message = fixture.repo.get(message_id).await.unwrap().unwrap();
        assert_eq!(message.delivery.status, DeliveryStatus::Pending);
        assert!(message.is_cancellable());
    }

    #[tokio::test]
    async fn overlong_text_fails_before_compliance() {
        let fixture = fixture(true, None).await;
        let err = fixture
            .usecase
            .execute(request(fixture.tenant.id, &"x".repeat(1601), true))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ContentTooLong { .. }));
    }

    #[tokio::test]
    async fn opted_out_recipient_is_blocked() {
        let fixture = fixture(true, None).await;
        let mut req = request(fixture.tenant.id, "Buy now, 21+ only", true);
        req.recipient.opted_out = true;

        let err = fixture.usecase.execute(req).await.unwrap_err();
        assert!(matches!(err, DomainError::RecipientOptedOut(_)));
    }

    #[tokio::test]
    async fn suspended_tenant_cannot_send() {
        let fixture = fixture(true, None).await;
        fixture
            .directory
            .set_standing(fixture.tenant.id, false)
            .await;

        let err = fixture
            .usecase
            .execute(request(fixture.tenant.id, "Buy now, 21+ only", true))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::SenderNotEligible(_)));
    }
}
