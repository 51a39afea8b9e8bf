pub mod notifications;
pub mod providers;
pub mod repositories;
