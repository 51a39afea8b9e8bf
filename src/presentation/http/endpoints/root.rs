use std::sync::Arc;

use poem_openapi::Tags;

use crate::application::services::jwt::JwtServiceConfig;
use crate::application::usecases::{
    cancel_message::CancelMessageUseCase, get_message::GetMessageUseCase,
    ingest_webhook::IngestWebhookUseCase, list_messages::ListMessagesUseCase,
    retry_message::RetryMessageUseCase, send_message::SendMessageUseCase,
};

#[derive(Clone)]
pub struct ApiState {
    pub send_message_usecase: Arc<SendMessageUseCase>,
    pub get_message_usecase: Arc<GetMessageUseCase>,
    pub list_messages_usecase: Arc<ListMessagesUseCase>,
    pub retry_message_usecase: Arc<RetryMessageUseCase>,
    pub cancel_message_usecase: Arc<CancelMessageUseCase>,
    pub ingest_webhook_usecase: Arc<IngestWebhookUseCase>,
    pub jwt_config: JwtServiceConfig,
}

pub struct Endpoints;

/// Enum of API sections (tags)
#[derive(Tags)]
pub enum EndpointsTags {
    Health,
    Messages,
    Webhooks,
}
