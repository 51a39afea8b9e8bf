use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::models::message::Cost;

/// Closed set of delivery backends. An unrecognized name is an error value,
/// not a lookup miss.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Twilio,
    Vonage,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Twilio => "twilio",
            ProviderKind::Vonage => "vonage",
        }
    }

    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value {
            "twilio" => Ok(ProviderKind::Twilio),
            "vonage" => Ok(ProviderKind::Vonage),
            other => Err(DomainError::UnsupportedProvider(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProviderReceipt {
    pub provider_message_id: String,
    pub raw_response: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderDeliveryStatus {
    Queued,
    Sent,
    Delivered,
    Failed,
    Unknown,
}

#[derive(Debug, Clone)]
pub struct DeliveryReport {
    pub status: ProviderDeliveryStatus,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Per-message price estimate, reporting only; never gates a send.
pub fn estimate_cost(media_count: usize, kind: ProviderKind) -> Cost {
    let (base, per_media) = match kind {
        ProviderKind::Twilio => (0.0079, 0.02),
        ProviderKind::Vonage => (0.0068, 0.025),
    };
    Cost {
        amount: base + per_media * media_count as f64,
        currency: "USD".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_provider_name_is_an_error() {
        let err = ProviderKind::parse("smtp").expect_err("should not parse");
        assert!(matches!(err, DomainError::UnsupportedProvider(name) if name == "smtp"));
    }

    #[test]
    fn cost_grows_with_media_count() {
        let text_only = estimate_cost(0, ProviderKind::Twilio);
        let with_media = estimate_cost(3, ProviderKind::Twilio);
        assert!(with_media.amount > text_only.amount);
        assert_eq!(with_media.currency, "USD");
    }
}
