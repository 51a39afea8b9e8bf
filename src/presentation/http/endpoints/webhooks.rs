use std::sync::Arc;

use poem::Result as PoemResult;
use poem_openapi::{OpenApi, payload::Json};

use crate::presentation::http::{
    endpoints::root::{ApiState, EndpointsTags},
    errors::to_http_error,
    requests::DeliveryWebhookDto,
    responses::WebhookAckDto,
};

/// Provider-facing callbacks. Providers authenticate with per-tenant webhook
/// secrets at the ingress proxy, not with tenant JWTs.
#[derive(Clone)]
pub struct WebhooksEndpoints {
    state: Arc<ApiState>,
}

impl WebhooksEndpoints {
    pub fn new(state: Arc<ApiState>) -> Self {
        Self { state }
    }
}

#[OpenApi]
impl WebhooksEndpoints {
    #[oai(
        path = "/webhooks/delivery",
        method = "post",
        tag = EndpointsTags::Webhooks,
    )]
    pub async fn ingest_delivery(
        &self,
        request: Json<DeliveryWebhookDto>,
    ) -> PoemResult<Json<WebhookAckDto>> {
        let request = request.0;
        let message = self
            .state
            .ingest_webhook_usecase
            .execute(request.message_id, request.status.into(), request.error)
            .await
            .map_err(to_http_error)?;

        Ok(Json(WebhookAckDto {
            message_id: message.id,
            status: message.delivery.status.into(),
        }))
    }
}
