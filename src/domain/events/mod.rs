use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageEventKind {
    Sent,
    Failed { reason: String },
    Delivered,
}

/// Published to the notification collaborator after lifecycle transitions.
/// Fire-and-forget: a publish failure never fails the dispatch path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEvent {
    pub event_id: Uuid,
    pub message_id: Uuid,
    pub tenant_id: Uuid,
    #[serde(flatten)]
    pub kind: MessageEventKind,
    pub occurred_at: DateTime<Utc>,
}

impl MessageEvent {
    pub fn new(message_id: Uuid, tenant_id: Uuid, kind: MessageEventKind) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            message_id,
            tenant_id,
            kind,
            occurred_at: Utc::now(),
        }
    }
}
