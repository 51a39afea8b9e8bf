use poem_openapi::Enum;

use crate::application::usecases::ingest_webhook::WebhookStatus;
use crate::domain::models::{DeliveryStatus, MediaKind};

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum DeliveryStatusDto {
    #[oai(rename = "pending")]
    Pending,
    #[oai(rename = "sent")]
    Sent,
    #[oai(rename = "delivered")]
    Delivered,
    #[oai(rename = "failed")]
    Failed,
}

impl From<DeliveryStatus> for DeliveryStatusDto {
    fn from(value: DeliveryStatus) -> Self {
        match value {
            DeliveryStatus::Pending => DeliveryStatusDto::Pending,
            DeliveryStatus::Sent => DeliveryStatusDto::Sent,
            DeliveryStatus::Delivered => DeliveryStatusDto::Delivered,
            DeliveryStatus::Failed => DeliveryStatusDto::Failed,
        }
    }
}

impl From<DeliveryStatusDto> for DeliveryStatus {
    fn from(value: DeliveryStatusDto) -> Self {
        match value {
            DeliveryStatusDto::Pending => DeliveryStatus::Pending,
            DeliveryStatusDto::Sent => DeliveryStatus::Sent,
            DeliveryStatusDto::Delivered => DeliveryStatus::Delivered,
            DeliveryStatusDto::Failed => DeliveryStatus::Failed,
        }
    }
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum SendStatusDto {
    #[oai(rename = "sent")]
    Sent,
    #[oai(rename = "scheduled")]
    Scheduled,
    #[oai(rename = "failed")]
    Failed,
    #[oai(rename = "rejected")]
    Rejected,
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum WebhookStatusDto {
    #[oai(rename = "delivered")]
    Delivered,
    #[oai(rename = "failed")]
    Failed,
}

impl From<WebhookStatusDto> for WebhookStatus {
    fn from(value: WebhookStatusDto) -> Self {
        match value {
            WebhookStatusDto::Delivered => WebhookStatus::Delivered,
            WebhookStatusDto::Failed => WebhookStatus::Failed,
        }
    }
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum MediaKindDto {
    #[oai(rename = "image")]
    Image,
    #[oai(rename = "video")]
    Video,
    #[oai(rename = "audio")]
    Audio,
    #[oai(rename = "document")]
    Document,
}

impl From<MediaKindDto> for MediaKind {
    fn from(value: MediaKindDto) -> Self {
        match value {
            MediaKindDto::Image => MediaKind::Image,
            MediaKindDto::Video => MediaKind::Video,
            MediaKindDto::Audio => MediaKind::Audio,
            MediaKindDto::Document => MediaKind::Document,
        }
    }
}

impl From<MediaKind> for MediaKindDto {
    fn from(value: MediaKind) -> Self {
        match value {
            MediaKind::Image => MediaKindDto::Image,
            MediaKind::Video => MediaKindDto::Video,
            MediaKind::Audio => MediaKindDto::Audio,
            MediaKind::Document => MediaKindDto::Document,
        }
    }
}
