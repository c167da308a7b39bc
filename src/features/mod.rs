pub mod identity;
pub mod moderation;
pub mod notifications;
pub mod platform;
