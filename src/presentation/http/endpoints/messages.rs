use std::sync::Arc;

use chrono::{DateTime, Utc};
use poem::Result as PoemResult;
use poem_openapi::{OpenApi, param::Path, param::Query, payload::Json};
use uuid::Uuid;

use crate::{
    application::{
        services::content::ContentRequest,
        usecases::{
            retry_message::RetryMessageRequest,
            send_message::{SendMessageRequest, SendOutcome},
        },
    },
    domain::{
        models::{MediaItem, Recipient, Scheduling},
        repositories::MessageFilter,
    },
    presentation::{
        http::{
            endpoints::root::{ApiState, EndpointsTags},
            errors::to_http_error,
            mappers::map_message,
            requests::SendMessageRequestDto,
            responses::{
                MessageDto, PaginatedMessagesDto, RetryMessageResponseDto, SendMessageResponseDto,
            },
            security::JwtAuth,
        },
        models::{DeliveryStatusDto, SendStatusDto},
    },
};

#[derive(Clone)]
pub struct MessagesEndpoints {
    state: Arc<ApiState>,
}

impl MessagesEndpoints {
    pub fn new(state: Arc<ApiState>) -> Self {
        Self { state }
    }
}

#[OpenApi]
impl MessagesEndpoints {
    #[oai(
        path = "/messages",
        method = "post",
        tag = EndpointsTags::Messages,
    )]
    pub async fn send_message(
        &self,
        auth: JwtAuth,
        request: Json<SendMessageRequestDto>,
    ) -> PoemResult<Json<SendMessageResponseDto>> {
        let tenant = auth.into_tenant(&self.state.jwt_config)?;
        let request = request.0;

        let scheduling = match request.scheduling {
            Some(dto) => Scheduling {
                is_scheduled: dto.scheduled_for.is_some(),
                scheduled_for: dto.scheduled_for,
                timezone: dto.timezone,
                recurrence: dto.recurrence,
            },
            None => Scheduling::default(),
        };

        let payload = SendMessageRequest {
            tenant_id: tenant.tenant_id,
            sender_id: tenant.tenant_id,
            recipient: Recipient {
                address: request.recipient.address,
                display_name: request.recipient.display_name,
                age_verified: request.recipient.age_verified,
                consent_given: request.recipient.consent_given,
                consented_at: request.recipient.consented_at,
                opted_out: request.recipient.opted_out,
            },
            content: ContentRequest {
                text: request.text,
                media: request
                    .media
                    .into_iter()
                    .map(|item| MediaItem {
                        kind: item.kind.into(),
                        url: item.url,
                        filename: item.filename,
                        byte_size: item.byte_size,
                        mime_type: item.mime_type,
                    })
                    .collect(),
                template_id: request.template_id,
                variables: request.template_variables,
            },
            scheduling,
            campaign_id: request.campaign_id,
            metadata: request.metadata.unwrap_or(serde_json::Value::Null),
        };

        let outcome = self
            .state
            .send_message_usecase
            .execute(payload)
            .await
            .map_err(to_http_error)?;

        Ok(Json(match outcome {
            SendOutcome::Sent { message_id } => SendMessageResponseDto {
                message_id: Some(message_id),
                status: SendStatusDto::Sent,
                reasons: Vec::new(),
                failure_reason: None,
            },
            SendOutcome::Scheduled { message_id } => SendMessageResponseDto {
                message_id: Some(message_id),
                status: SendStatusDto::Scheduled,
                reasons: Vec::new(),
                failure_reason: None,
            },
            SendOutcome::Failed { message_id, reason } => SendMessageResponseDto {
                message_id: Some(message_id),
                status: SendStatusDto::Failed,
                reasons: Vec::new(),
                failure_reason: Some(reason),
            },
            SendOutcome::Rejected { reasons } => SendMessageResponseDto {
                message_id: None,
                status: SendStatusDto::Rejected,
                reasons,
                failure_reason: None,
            },
        }))
    }

    #[oai(
        path = "/messages",
        method = "get",
        tag = EndpointsTags::Messages,
    )]
    pub async fn list_messages(
        &self,
        auth: JwtAuth,
        status: Query<Option<DeliveryStatusDto>>,
        from: Query<Option<DateTime<Utc>>>,
        to: Query<Option<DateTime<Utc>>>,
        limit: Query<Option<u32>>,
        offset: Query<Option<u32>>,
    ) -> PoemResult<Json<PaginatedMessagesDto>> {
        let tenant = auth.into_tenant(&self.state.jwt_config)?;

        let filter = MessageFilter {
            status: status.0.map(Into::into),
            from: from.0,
            to: to.0,
            limit: limit.0,
            offset: offset.0,
        };
        let result = self
            .state
            .list_messages_usecase
            .execute(tenant.tenant_id, filter)
            .await
            .map_err(to_http_error)?;

        Ok(Json(PaginatedMessagesDto {
            messages: result.messages.iter().map(map_message).collect(),
            has_more: result.has_more,
            next_offset: result.next_offset,
        }))
    }

    #[oai(
        path = "/messages/:message_id",
        method = "get",
        tag = EndpointsTags::Messages,
    )]
    pub async fn get_message(
        &self,
        auth: JwtAuth,
        message_id: Path<Uuid>,
    ) -> PoemResult<Json<MessageDto>> {
        let tenant = auth.into_tenant(&self.state.jwt_config)?;

        let message = self
            .state
            .get_message_usecase
            .execute(tenant.tenant_id, message_id.0)
            .await
            .map_err(to_http_error)?;

        Ok(Json(map_message(&message)))
    }

    #[oai(
        path = "/messages/:message_id/retry",
        method = "post",
        tag = EndpointsTags::Messages,
    )]
    pub async fn retry_message(
        &self,
        auth: JwtAuth,
        message_id: Path<Uuid>,
    ) -> PoemResult<Json<RetryMessageResponseDto>> {
        let tenant = auth.into_tenant(&self.state.jwt_config)?;

        let response = self
            .state
            .retry_message_usecase
            .execute(RetryMessageRequest {
                tenant_id: tenant.tenant_id,
                message_id: message_id.0,
            })
            .await
            .map_err(to_http_error)?;

        Ok(Json(RetryMessageResponseDto {
            status: response.status.into(),
            failure_reason: response.failure_reason,
        }))
    }

    #[oai(
        path = "/messages/:message_id",
        method = "delete",
        tag = EndpointsTags::Messages,
    )]
    pub async fn cancel_message(&self, auth: JwtAuth, message_id: Path<Uuid>) -> PoemResult<()> {
        let tenant = auth.into_tenant(&self.state.jwt_config)?;

        self.state
            .cancel_message_usecase
            .execute(tenant.tenant_id, message_id.0)
            .await
            .map_err(to_http_error)?;

        Ok(())
    }
}
