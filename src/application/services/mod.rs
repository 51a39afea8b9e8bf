pub mod compliance;
pub mod content;
pub mod jwt;
pub mod lifecycle;
pub mod notifier;
pub mod provider;
