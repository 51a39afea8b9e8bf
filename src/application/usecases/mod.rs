pub mod cancel_message;
pub mod get_message;
pub mod ingest_webhook;
pub mod list_messages;
pub mod retry_message;
pub mod send_message;
