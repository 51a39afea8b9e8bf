use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Compliance configuration a tenant supplies. The gateway reads this, it
/// does not own the tenant's lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompliancePolicy {
    pub require_age_verification: bool,
    pub require_consent: bool,
    pub max_messages_per_recipient_per_day: u32,
    pub restricted_keywords: Vec<String>,
    pub required_disclaimers: Vec<String>,
    pub allowed_media_types: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryPolicy {
    /// Name of the active provider backend, parsed into `ProviderKind`.
    pub provider: String,
    pub credentials: HashMap<String, String>,
    pub max_retries: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantConfig {
    pub id: Uuid,
    pub name: String,
    pub compliance: CompliancePolicy,
    pub delivery: DeliveryPolicy,
}
