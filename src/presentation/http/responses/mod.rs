use poem_openapi::Object;
use uuid::Uuid;

use crate::presentation::models::{DeliveryStatusDto, MediaKindDto, SendStatusDto};

#[derive(Object)]
pub struct SendMessageResponseDto {
    pub message_id: Option<Uuid>,
    pub status: SendStatusDto,
    /// Populated only when the message was rejected by compliance.
    pub reasons: Vec<String>,
    pub failure_reason: Option<String>,
}

#[derive(Object)]
pub struct ComplianceDto {
    pub age_verification_passed: bool,
    pub consent_verified: bool,
    pub content_screened: bool,
    pub disclaimers_included: bool,
    pub reasons: Vec<String>,
}

#[derive(Object)]
pub struct MediaSummaryDto {
    pub kind: MediaKindDto,
    pub url: String,
    pub mime_type: String,
}

#[derive(Object)]
pub struct CostDto {
    pub amount: f64,
    pub currency: String,
}

#[derive(Object)]
pub struct MessageDto {
    pub id: Uuid,
    pub recipient_address: String,
    pub text: String,
    pub media: Vec<MediaSummaryDto>,
    pub template_id: Option<Uuid>,
    pub status: DeliveryStatusDto,
    pub provider_message_id: Option<String>,
    pub sent_at: Option<String>,
    pub delivered_at: Option<String>,
    pub failure_reason: Option<String>,
    pub retry_count: u32,
    pub max_retries: u32,
    pub compliance: ComplianceDto,
    pub is_scheduled: bool,
    pub scheduled_for: Option<String>,
    pub campaign_id: Option<Uuid>,
    pub cost: Option<CostDto>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Object)]
pub struct PaginatedMessagesDto {
    pub messages: Vec<MessageDto>,
    pub has_more: bool,
    pub next_offset: Option<u32>,
}

#[derive(Object)]
pub struct RetryMessageResponseDto {
    pub status: DeliveryStatusDto,
    pub failure_reason: Option<String>,
}

#[derive(Object)]
pub struct WebhookAckDto {
    pub message_id: Uuid,
    pub status: DeliveryStatusDto,
}
