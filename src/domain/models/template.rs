use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateVariable {
    pub name: String,
    pub required: bool,
    pub default_value: Option<String>,
}

/// Owned by the template collaborator; the gateway only renders against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub body: String,
    pub variables: Vec<TemplateVariable>,
    pub times_used: u64,
    pub last_used_at: Option<DateTime<Utc>>,
}
