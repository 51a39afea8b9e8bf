use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    application::services::provider::{DeliveryProvider, SendRequest},
    domain::{
        errors::DomainError,
        models::{DeliveryReport, ProviderDeliveryStatus, ProviderKind, ProviderReceipt},
    },
};

pub struct VonageProvider {
    http: Client,
    rest_url: String,
    api_url: String,
}

impl VonageProvider {
    pub fn new() -> Arc<dyn DeliveryProvider> {
        Arc::new(Self {
            http: Client::builder()
                .user_agent("complygate/vonage")
                .build()
                .expect("failed to build vonage client"),
            rest_url: "https://rest.nexmo.com".to_string(),
            api_url: "https://api.nexmo.com".to_string(),
        }) as Arc<dyn DeliveryProvider>
    }

    fn wrap(err: impl std::fmt::Display) -> DomainError {
        DomainError::ProviderSendFailed {
            provider: ProviderKind::Vonage.as_str().to_string(),
            detail: err.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct VonageCredentials {
    pub api_key: String,
    pub api_secret: String,
    pub from_number: String,
}

impl VonageCredentials {
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self, DomainError> {
        let require = |key: &str| {
            map.get(key)
                .filter(|value| !value.trim().is_empty())
                .cloned()
                .ok_or_else(|| DomainError::ProviderMisconfigured {
                    provider: ProviderKind::Vonage.as_str().to_string(),
                    detail: format!("missing credential field: {key}"),
                })
        };
        Ok(Self {
            api_key: require("api_key")?,
            api_secret: require("api_secret")?,
            from_number: require("from_number")?,
        })
    }
}

#[async_trait]
impl DeliveryProvider for VonageProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Vonage
    }

    async fn send(
        &self,
        credentials: &HashMap<String, String>,
        request: &SendRequest,
    ) -> Result<ProviderReceipt, DomainError> {
        let creds = VonageCredentials::from_map(credentials)?;
        let url = format!("{}/sms/json", self.rest_url);

        let form: Vec<(&str, String)> = vec![
            ("api_key", creds.api_key.clone()),
            ("api_secret", creds.api_secret.clone()),
            ("from", creds.from_number.clone()),
            ("to", request.to.trim_start_matches('+').to_string()),
            ("text", request.text.clone()),
        ];

        let response = self
            .http
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(Self::wrap)?;
        let raw = response.text().await.map_err(Self::wrap)?;
        let payload: VonageSendResponse = serde_json::from_str(&raw).map_err(Self::wrap)?;

        let first = payload
            .messages
            .into_iter()
            .next()
            .ok_or_else(|| Self::wrap("vonage returned an empty message list"))?;

        if first.status != "0" {
            return Err(Self::wrap(
                first
                    .error_text
                    .unwrap_or_else(|| format!("vonage status {}", first.status)),
            ));
        }
        let message_id = first
            .message_id
            .ok_or_else(|| Self::wrap("vonage returned no message id"))?;

        Ok(ProviderReceipt {
            provider_message_id: message_id,
            raw_response: Some(raw),
        })
    }

    async fn fetch_status(
        &self,
        credentials: &HashMap<String, String>,
        provider_message_id: &str,
    ) -> Result<DeliveryReport, DomainError> {
        let creds = VonageCredentials::from_map(credentials)?;
        let url = format!("{}/search/message", self.api_url);

        let payload: VonageSearchResponse = self
            .http
            .get(url)
            .query(&[
                ("api_key", creds.api_key.as_str()),
                ("api_secret", creds.api_secret.as_str()),
                ("id", provider_message_id),
            ])
            .send()
            .await
            .map_err(Self::wrap)?
            .json()
            .await
            .map_err(Self::wrap)?;

        Ok(DeliveryReport {
            status: map_final_status(payload.final_status.as_deref()),
            error_code: payload.error_code,
            error_message: payload.error_code_label,
            updated_at: None,
        })
    }
}

fn map_final_status(status: Option<&str>) -> ProviderDeliveryStatus {
    match status {
        Some("DELIVRD") => ProviderDeliveryStatus::Delivered,
        Some("ACCEPTD") | Some("BUFFERED") => ProviderDeliveryStatus::Sent,
        Some("EXPIRED") | Some("FAILED") | Some("REJECTD") | Some("UNDELIV") => {
            ProviderDeliveryStatus::Failed
        }
        _ => ProviderDeliveryStatus::Unknown,
    }
}

#[derive(Debug, Deserialize)]
struct VonageSendResponse {
    #[serde(default)]
    messages: Vec<VonageMessageResult>,
}

#[derive(Debug, Deserialize)]
struct VonageMessageResult {
    status: String,
    #[serde(rename = "message-id")]
    message_id: Option<String>,
    #[serde(rename = "error-text")]
    error_text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VonageSearchResponse {
    #[serde(rename = "final-status")]
    final_status: Option<String>,
    #[serde(rename = "error-code")]
    error_code: Option<String>,
    #[serde(rename = "error-code-label")]
    error_code_label: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_secret_is_a_misconfiguration() {
        let mut map = HashMap::new();
        map.insert("api_key".to_string(), "key".to_string());
        map.insert("from_number".to_string(), "+15550000000".to_string());

        let err = VonageCredentials::from_map(&map).unwrap_err();
        assert!(matches!(err, DomainError::ProviderMisconfigured { .. }));
    }

    #[test]
    fn final_statuses_map_to_uniform_report() {
        assert_eq!(map_final_status(Some("DELIVRD")), ProviderDeliveryStatus::Delivered);
        assert_eq!(map_final_status(Some("REJECTD")), ProviderDeliveryStatus::Failed);
        assert_eq!(map_final_status(None), ProviderDeliveryStatus::Unknown);
    }
}
