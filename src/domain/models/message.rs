use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::models::verdict::ComplianceVerdict;

pub const MAX_TEXT_CHARS: usize = 1600;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Pending,
    Sent,
    Delivered,
    Failed,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::Sent => "sent",
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Failed => "failed",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(DeliveryStatus::Pending),
            "sent" => Some(DeliveryStatus::Sent),
            "delivered" => Some(DeliveryStatus::Delivered),
            "failed" => Some(DeliveryStatus::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    pub address: String,
    pub display_name: Option<String>,
    pub age_verified: bool,
    pub consent_given: bool,
    pub consented_at: Option<DateTime<Utc>>,
    pub opted_out: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    Document,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaItem {
    pub kind: MediaKind,
    pub url: String,
    pub filename: String,
    pub byte_size: u64,
    pub mime_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageContent {
    pub text: String,
    pub media: Vec<MediaItem>,
    pub template_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryState {
    pub status: DeliveryStatus,
    pub provider_message_id: Option<String>,
    pub provider_response: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub failure_reason: Option<String>,
    pub retry_count: u32,
    pub max_retries: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceState {
    pub age_verification_passed: bool,
    pub consent_verified: bool,
    pub content_screened: bool,
    pub disclaimers_included: bool,
    pub reasons: Vec<String>,
}

impl ComplianceState {
    /// The invariant gating any transition into `Sent`.
    pub fn satisfied(&self) -> bool {
        self.age_verification_passed && self.consent_verified
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Scheduling {
    pub scheduled_for: Option<DateTime<Utc>>,
    pub timezone: Option<String>,
    pub is_scheduled: bool,
    pub recurrence: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cost {
    pub amount: f64,
    pub currency: String,
}

/// The unit of dispatch and audit. Mutated only through the transition
/// functions below; persistence is the lifecycle manager's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub sender_id: Uuid,
    pub recipient: Recipient,
    pub content: MessageContent,
    pub delivery: DeliveryState,
    pub compliance: ComplianceState,
    pub scheduling: Scheduling,
    pub campaign_id: Option<Uuid>,
    pub cost: Option<Cost>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Message {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tenant_id: Uuid,
        sender_id: Uuid,
        recipient: Recipient,
        content: MessageContent,
        verdict: &ComplianceVerdict,
        scheduling: Scheduling,
        campaign_id: Option<Uuid>,
        max_retries: u32,
        metadata: serde_json::Value,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            sender_id,
            recipient,
            content,
            delivery: DeliveryState {
                status: DeliveryStatus::Pending,
                provider_message_id: None,
                provider_response: None,
                sent_at: None,
                delivered_at: None,
                failure_reason: None,
                retry_count: 0,
                max_retries,
            },
            compliance: ComplianceState {
                age_verification_passed: verdict.age_verified,
                consent_verified: verdict.consent_verified,
                content_screened: verdict.content_screened,
                disclaimers_included: verdict.disclaimers_included,
                reasons: verdict.reasons.clone(),
            },
            scheduling,
            campaign_id,
            cost: None,
            metadata,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_cancellable(&self) -> bool {
        self.scheduling.is_scheduled && self.delivery.status == DeliveryStatus::Pending
    }

    /// Pending -> Sent. Rejected if the persisted compliance sub-record does
    /// not satisfy the age/consent invariant, regardless of any verdict the
    /// evaluator produced earlier.
    pub fn with_sent(
        mut self,
        provider_message_id: String,
        provider_response: Option<String>,
    ) -> Result<Self, DomainError> {
        if !self.compliance.satisfied() {
            return Err(DomainError::InvalidTransition(
                "cannot mark sent: compliance requirements not satisfied".to_string(),
            ));
        }
        if self.delivery.status != DeliveryStatus::Pending {
            return Err(DomainError::InvalidTransition(format!(
                "cannot mark sent from status {}",
                self.delivery.status.as_str()
            )));
        }
        self.delivery.status = DeliveryStatus::Sent;
        self.delivery.provider_message_id = Some(provider_message_id);
        self.delivery.provider_response = provider_response;
        self.delivery.sent_at = Some(Utc::now());
        self.delivery.failure_reason = None;
        self.updated_at = Utc::now();
        Ok(self)
    }

    /// Sent -> Delivered, reachable only via the provider webhook. Replays of
    /// a terminal `delivered` are a no-op so out-of-order callbacks cannot
    /// overwrite the original timestamp.
    pub fn with_delivered(mut self) -> Result<Self, DomainError> {
        match self.delivery.status {
            DeliveryStatus::Delivered => Ok(self),
            DeliveryStatus::Sent => {
                self.delivery.status = DeliveryStatus::Delivered;
                self.delivery.delivered_at = Some(Utc::now());
                self.updated_at = Utc::now();
                Ok(self)
            }
            other => Err(DomainError::InvalidTransition(format!(
                "cannot mark delivered from status {}",
                other.as_str()
            ))),
        }
    }

    pub fn with_failed(mut self, reason: String) -> Result<Self, DomainError> {
        if self.delivery.status == DeliveryStatus::Delivered {
            return Err(DomainError::InvalidTransition(
                "cannot mark failed: message already delivered".to_string(),
            ));
        }
        self.delivery.status = DeliveryStatus::Failed;
        self.delivery.failure_reason = Some(reason);
        self.updated_at = Utc::now();
        Ok(self)
    }

    /// Failed -> Pending for another dispatch attempt. Does not resend by
    /// itself. Once retry_count reaches max_retries the message is terminal.
    pub fn with_retry(mut self) -> Result<Self, DomainError> {
        if self.delivery.status != DeliveryStatus::Failed {
            return Err(DomainError::NotRetryable(format!(
                "status is {}, only failed messages can be retried",
                self.delivery.status.as_str()
            )));
        }
        if self.delivery.retry_count >= self.delivery.max_retries {
            return Err(DomainError::NotRetryable(format!(
                "retry limit of {} reached",
                self.delivery.max_retries
            )));
        }
        self.delivery.retry_count += 1;
        self.delivery.status = DeliveryStatus::Pending;
        self.updated_at = Utc::now();
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::verdict::ComplianceVerdict;

    fn verified_recipient() -> Recipient {
        Recipient {
            address: "+15551234567".to_string(),
            display_name: None,
            age_verified: true,
            consent_given: true,
            consented_at: Some(Utc::now()),
            opted_out: false,
        }
    }

    fn message_with(verdict: &ComplianceVerdict) -> Message {
        Message::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            verified_recipient(),
            MessageContent {
                text: "hello 21+".to_string(),
                media: vec![],
                template_id: None,
            },
            verdict,
            Scheduling::default(),
            None,
            3,
            serde_json::Value::Null,
        )
    }

    #[test]
    fn sent_requires_satisfied_compliance() {
        let mut verdict = ComplianceVerdict::passing();
        verdict.age_verified = false;
        let message = message_with(&verdict);

        let err = message
            .with_sent("SM1".to_string(), None)
            .expect_err("transition should be rejected");
        assert!(matches!(err, DomainError::InvalidTransition(_)));
    }

    #[test]
    fn sent_sets_timestamp_and_clears_failure() {
        let message = message_with(&ComplianceVerdict::passing());
        let sent = message.with_sent("SM1".to_string(), None).unwrap();
        assert_eq!(sent.delivery.status, DeliveryStatus::Sent);
        assert!(sent.delivery.sent_at.is_some());
        assert!(sent.delivery.failure_reason.is_none());
    }

    #[test]
    fn delivered_twice_is_a_noop() {
        let message = message_with(&ComplianceVerdict::passing());
        let delivered = message
            .with_sent("SM1".to_string(), None)
            .unwrap()
            .with_delivered()
            .unwrap();
        let first_at = delivered.delivery.delivered_at;

        let again = delivered.with_delivered().unwrap();
        assert_eq!(again.delivery.delivered_at, first_at);
        assert_eq!(again.delivery.status, DeliveryStatus::Delivered);
    }

    #[test]
    fn retry_stops_at_max() {
        let mut message = message_with(&ComplianceVerdict::passing());
        for _ in 0..3 {
            message = message
                .with_failed("timeout".to_string())
                .unwrap()
                .with_retry()
                .unwrap();
        }
        assert_eq!(message.delivery.retry_count, 3);

        let terminal = message.with_failed("timeout".to_string()).unwrap();
        let err = terminal.with_retry().expect_err("retry past max");
        assert!(matches!(err, DomainError::NotRetryable(_)));
    }

    #[test]
    fn only_pending_scheduled_is_cancellable() {
        let mut message = message_with(&ComplianceVerdict::passing());
        message.scheduling.is_scheduled = true;
        assert!(message.is_cancellable());

        let sent = message.with_sent("SM1".to_string(), None).unwrap();
        assert!(!sent.is_cancellable());
    }
}
