use std::collections::HashMap;

use poem_openapi::Object;
use uuid::Uuid;

use crate::presentation::models::{MediaKindDto, WebhookStatusDto};

#[derive(Object, Debug)]
pub struct RecipientDto {
    #[oai(validator(min_length = 1))]
    pub address: String,
    pub display_name: Option<String>,
    #[oai(default)]
    pub age_verified: bool,
    #[oai(default)]
    pub consent_given: bool,
    pub consented_at: Option<chrono::DateTime<chrono::Utc>>,
    #[oai(default)]
    pub opted_out: bool,
}

#[derive(Object, Debug)]
pub struct MediaItemDto {
    pub kind: MediaKindDto,
    #[oai(validator(min_length = 1))]
    pub url: String,
    pub filename: String,
    pub byte_size: u64,
    pub mime_type: String,
}

#[derive(Object, Debug)]
pub struct SchedulingDto {
    pub scheduled_for: Option<chrono::DateTime<chrono::Utc>>,
    pub timezone: Option<String>,
    pub recurrence: Option<String>,
}

#[derive(Object, Debug)]
pub struct SendMessageRequestDto {
    pub recipient: RecipientDto,
    pub text: Option<String>,
    #[oai(default)]
    pub media: Vec<MediaItemDto>,
    pub template_id: Option<Uuid>,
    #[oai(default)]
    pub template_variables: HashMap<String, String>,
    pub scheduling: Option<SchedulingDto>,
    pub campaign_id: Option<Uuid>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Object, Debug)]
pub struct DeliveryWebhookDto {
    pub message_id: Uuid,
    pub status: WebhookStatusDto,
    pub error: Option<String>,
}
