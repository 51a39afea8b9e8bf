use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Message text is {length} characters, limit is {limit}")]
    ContentTooLong { length: usize, limit: usize },
    #[error("Invalid recipient address: {0}")]
    InvalidAddress(String),
    #[error("Missing required template variables: {}", .0.join(", "))]
    MissingRequiredVariables(Vec<String>),
    #[error("Template not found: {0}")]
    TemplateNotFound(Uuid),
    #[error("Message not found: {0}")]
    MessageNotFound(Uuid),
    #[error("Sender not eligible: {0}")]
    SenderNotEligible(String),
    #[error("Recipient has opted out: {0}")]
    RecipientOptedOut(String),
    #[error("Unsupported delivery provider: {0}")]
    UnsupportedProvider(String),
    #[error("Provider {provider} is misconfigured: {detail}")]
    ProviderMisconfigured { provider: String, detail: String },
    #[error("Provider {provider} send failed: {detail}")]
    ProviderSendFailed { provider: String, detail: String },
    #[error("Message is not retryable: {0}")]
    NotRetryable(String),
    #[error("Message is not cancellable: {0}")]
    NotCancellable(String),
    #[error("Illegal state transition: {0}")]
    InvalidTransition(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DomainError {
    /// Broad category used by the HTTP layer to pick a status code.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ContentTooLong { .. }
            | Self::InvalidAddress(_)
            | Self::MissingRequiredVariables(_) => ErrorKind::Validation,
            Self::TemplateNotFound(_) | Self::MessageNotFound(_) => ErrorKind::NotFound,
            Self::SenderNotEligible(_) | Self::RecipientOptedOut(_) => ErrorKind::Eligibility,
            Self::UnsupportedProvider(_)
            | Self::ProviderMisconfigured { .. }
            | Self::ProviderSendFailed { .. } => ErrorKind::Provider,
            Self::NotRetryable(_) | Self::NotCancellable(_) | Self::InvalidTransition(_) => {
                ErrorKind::State
            }
            Self::Other(_) => ErrorKind::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Eligibility,
    Provider,
    State,
    Internal,
}
