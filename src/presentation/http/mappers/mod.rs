use crate::{
    domain::models::Message,
    presentation::http::responses::{ComplianceDto, CostDto, MediaSummaryDto, MessageDto},
};

pub fn map_message(message: &Message) -> MessageDto {
    MessageDto {
        id: message.id,
        recipient_address: message.recipient.address.clone(),
        text: message.content.text.clone(),
        media: message
            .content
            .media
            .iter()
            .map(|item| MediaSummaryDto {
                kind: item.kind.into(),
                url: item.url.clone(),
                mime_type: item.mime_type.clone(),
            })
            .collect(),
        template_id: message.content.template_id,
        status: message.delivery.status.into(),
        provider_message_id: message.delivery.provider_message_id.clone(),
        sent_at: message.delivery.sent_at.map(|at| at.to_rfc3339()),
        delivered_at: message.delivery.delivered_at.map(|at| at.to_rfc3339()),
        failure_reason: message.delivery.failure_reason.clone(),
        retry_count: message.delivery.retry_count,
        max_retries: message.delivery.max_retries,
        compliance: ComplianceDto {
            age_verification_passed: message.compliance.age_verification_passed,
            consent_verified: message.compliance.consent_verified,
            content_screened: message.compliance.content_screened,
            disclaimers_included: message.compliance.disclaimers_included,
            reasons: message.compliance.reasons.clone(),
        },
        is_scheduled: message.scheduling.is_scheduled,
        scheduled_for: message.scheduling.scheduled_for.map(|at| at.to_rfc3339()),
        campaign_id: message.campaign_id,
        cost: message.cost.as_ref().map(|cost| CostDto {
            amount: cost.amount,
            currency: cost.currency.clone(),
        }),
        created_at: message.created_at.to_rfc3339(),
        updated_at: message.updated_at.to_rfc3339(),
    }
}
