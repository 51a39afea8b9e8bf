pub mod twilio;
pub mod vonage;
