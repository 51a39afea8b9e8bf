use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    errors::DomainError,
    models::{DeliveryPolicy, DeliveryReport, Message, ProviderKind, ProviderReceipt},
};

#[derive(Debug, Clone)]
pub struct SendRequest {
    pub to: String,
    pub text: String,
    pub media_urls: Vec<String>,
}

/// Uniform capability surface over heterogeneous delivery backends. Concrete
/// variants live in `infrastructure::providers`; they must wrap every
/// transport fault as `ProviderSendFailed` and never leak backend error types.
#[async_trait]
pub trait DeliveryProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;
    async fn send(
        &self,
        credentials: &HashMap<String, String>,
        request: &SendRequest,
    ) -> Result<ProviderReceipt, DomainError>;
    async fn fetch_status(
        &self,
        credentials: &HashMap<String, String>,
        provider_message_id: &str,
    ) -> Result<DeliveryReport, DomainError>;
}

pub struct ProviderGateway {
    providers: HashMap<ProviderKind, Arc<dyn DeliveryProvider>>,
    default_country_code: String,
}

impl ProviderGateway {
    pub fn new(providers: Vec<Arc<dyn DeliveryProvider>>, default_country_code: String) -> Self {
        let mut map = HashMap::new();
        for provider in providers {
            map.insert(provider.kind(), provider);
        }
        Self {
            providers: map,
            default_country_code,
        }
    }

    pub fn resolve(&self, policy: &DeliveryPolicy) -> Result<Arc<dyn DeliveryProvider>, DomainError> {
        let kind = ProviderKind::parse(&policy.provider)?;
        self.providers
            .get(&kind)
            .cloned()
            .ok_or_else(|| DomainError::UnsupportedProvider(policy.provider.clone()))
    }

    pub async fn dispatch(
        &self,
        policy: &DeliveryPolicy,
        message: &Message,
    ) -> Result<ProviderReceipt, DomainError> {
        let provider = self.resolve(policy)?;
        let to = normalize_address(&message.recipient.address, &self.default_country_code)?;
        let request = SendRequest {
            to,
            text: message.content.text.clone(),
            media_urls: message
                .content
                .media
                .iter()
                .map(|item| item.url.clone())
                .collect(),
        };
        provider.send(&policy.credentials, &request).await
    }

    pub async fn fetch_status(
        &self,
        policy: &DeliveryPolicy,
        provider_message_id: &str,
    ) -> Result<DeliveryReport, DomainError> {
        let provider = self.resolve(policy)?;
        provider
            .fetch_status(&policy.credentials, provider_message_id)
            .await
    }
}

/// E.164-like normalization applied before every send. A bare 10-digit value
/// is treated as domestic and gets the configured country code; other digit
/// strings get a "+" prepended verbatim.
pub fn normalize_address(raw: &str, default_country_code: &str) -> Result<String, DomainError> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect();

    if let Some(rest) = cleaned.strip_prefix('+') {
        if rest.len() >= 8 && rest.len() <= 15 && rest.chars().all(|c| c.is_ascii_digit()) {
            return Ok(cleaned);
        }
        return Err(DomainError::InvalidAddress(raw.to_string()));
    }

    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return Err(DomainError::InvalidAddress(raw.to_string()));
    }
    if cleaned.len() == 10 {
        return Ok(format!("+{default_country_code}{cleaned}"));
    }
    if cleaned.len() >= 8 && cleaned.len() <= 15 {
        return Ok(format!("+{cleaned}"));
    }
    Err(DomainError::InvalidAddress(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domestic_ten_digit_gets_country_code() {
        assert_eq!(
            normalize_address("(555) 123-4567", "1").unwrap(),
            "+15551234567"
        );
    }

    #[test]
    fn plus_prefixed_passes_through() {
        assert_eq!(
            normalize_address("+44 7911 123456", "1").unwrap(),
            "+447911123456"
        );
    }

    #[test]
    fn longer_bare_number_gets_plus() {
        assert_eq!(normalize_address("447911123456", "1").unwrap(), "+447911123456");
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            normalize_address("call me maybe", "1"),
            Err(DomainError::InvalidAddress(_))
        ));
        assert!(matches!(
            normalize_address("+12ab", "1"),
            Err(DomainError::InvalidAddress(_))
        ));
    }

    #[test]
    fn unknown_provider_name_fails_resolution() {
        let gateway = ProviderGateway::new(vec![], "1".to_string());
        let policy = DeliveryPolicy {
            provider: "carrier-pigeon".to_string(),
            credentials: Default::default(),
            max_retries: 3,
        };
        assert!(matches!(
            gateway.resolve(&policy),
            Err(DomainError::UnsupportedProvider(_))
        ));
    }
}
