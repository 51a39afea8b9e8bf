use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    application::services::provider::{DeliveryProvider, SendRequest},
    domain::{
        errors::DomainError,
        models::{DeliveryReport, ProviderDeliveryStatus, ProviderKind, ProviderReceipt},
    },
};

pub struct TwilioProvider {
    http: Client,
    base_url: String,
}

impl TwilioProvider {
    pub fn new() -> Arc<dyn DeliveryProvider> {
        Arc::new(Self {
            http: Client::builder()
                .user_agent("complygate/twilio")
                .build()
                .expect("failed to build twilio client"),
            base_url: "https://api.twilio.com".to_string(),
        }) as Arc<dyn DeliveryProvider>
    }

    fn wrap(err: impl std::fmt::Display) -> DomainError {
        DomainError::ProviderSendFailed {
            provider: ProviderKind::Twilio.as_str().to_string(),
            detail: err.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

impl TwilioCredentials {
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self, DomainError> {
        let require = |key: &str| {
            map.get(key)
                .filter(|value| !value.trim().is_empty())
                .cloned()
                .ok_or_else(|| DomainError::ProviderMisconfigured {
                    provider: ProviderKind::Twilio.as_str().to_string(),
                    detail: format!("missing credential field: {key}"),
                })
        };
        Ok(Self {
            account_sid: require("account_sid")?,
            auth_token: require("auth_token")?,
            from_number: require("from_number")?,
        })
    }
}

#[async_trait]
impl DeliveryProvider for TwilioProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Twilio
    }

    async fn send(
        &self,
        credentials: &HashMap<String, String>,
        request: &SendRequest,
    ) -> Result<ProviderReceipt, DomainError> {
        let creds = TwilioCredentials::from_map(credentials)?;
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, creds.account_sid
        );

        let mut form: Vec<(&str, String)> = vec![
            ("To", request.to.clone()),
            ("From", creds.from_number.clone()),
            ("Body", request.text.clone()),
        ];
        for media_url in &request.media_urls {
            form.push(("MediaUrl", media_url.clone()));
        }

        let response = self
            .http
            .post(url)
            .basic_auth(&creds.account_sid, Some(&creds.auth_token))
            .form(&form)
            .send()
            .await
            .map_err(Self::wrap)?;

        let raw = response.text().await.map_err(Self::wrap)?;
        let payload: TwilioMessageResponse =
            serde_json::from_str(&raw).map_err(Self::wrap)?;

        match payload.sid {
            Some(sid) => Ok(ProviderReceipt {
                provider_message_id: sid,
                raw_response: Some(raw),
            }),
            None => Err(Self::wrap(
                payload
                    .message
                    .unwrap_or_else(|| "twilio returned no message sid".to_string()),
            )),
        }
    }

    async fn fetch_status(
        &self,
        credentials: &HashMap<String, String>,
        provider_message_id: &str,
    ) -> Result<DeliveryReport, DomainError> {
        let creds = TwilioCredentials::from_map(credentials)?;
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages/{}.json",
            self.base_url, creds.account_sid, provider_message_id
        );

        let payload: TwilioMessageResponse = self
            .http
            .get(url)
            .basic_auth(&creds.account_sid, Some(&creds.auth_token))
            .send()
            .await
            .map_err(Self::wrap)?
            .json()
            .await
            .map_err(Self::wrap)?;

        Ok(DeliveryReport {
            status: map_status(payload.status.as_deref()),
            error_code: payload.error_code.map(|code| code.to_string()),
            error_message: payload.message,
            updated_at: payload
                .date_updated
                .as_deref()
                .and_then(|value| DateTime::parse_from_rfc2822(value).ok())
                .map(|value| value.to_utc()),
        })
    }
}

fn map_status(status: Option<&str>) -> ProviderDeliveryStatus {
    match status {
        Some("queued") | Some("accepted") | Some("sending") => ProviderDeliveryStatus::Queued,
        Some("sent") => ProviderDeliveryStatus::Sent,
        Some("delivered") => ProviderDeliveryStatus::Delivered,
        Some("failed") | Some("undelivered") => ProviderDeliveryStatus::Failed,
        _ => ProviderDeliveryStatus::Unknown,
    }
}

#[derive(Debug, Deserialize)]
struct TwilioMessageResponse {
    sid: Option<String>,
    status: Option<String>,
    #[serde(rename = "error_code")]
    error_code: Option<i64>,
    message: Option<String>,
    #[serde(rename = "date_updated")]
    date_updated: Option<String>,
}
