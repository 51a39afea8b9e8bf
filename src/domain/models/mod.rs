pub mod message;
pub mod provider;
pub mod template;
pub mod tenant;
pub mod verdict;

pub use message::{
    ComplianceState, Cost, DeliveryState, DeliveryStatus, MediaItem, MediaKind, Message,
    MessageContent, Recipient, Scheduling, MAX_TEXT_CHARS,
};
pub use provider::{
    estimate_cost, DeliveryReport, ProviderDeliveryStatus, ProviderKind, ProviderReceipt,
};
pub use template::{Template, TemplateVariable};
pub use tenant::{CompliancePolicy, DeliveryPolicy, TenantConfig};
pub use verdict::{CheckKind, CheckOutcome, ComplianceVerdict};
