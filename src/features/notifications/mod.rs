//! User-facing notifications: persistence, realtime fan-out, and the
//! SSE feed moderators and reporters subscribe to.

pub mod dtos;
pub mod handlers;
pub mod hub;
pub mod models;
pub mod routes;
pub mod service;
pub mod transport;

pub use hub::{RealtimeEvent, RealtimeHub};
pub use models::{NewNotification, Notification, NotificationKind, OutboundMessage};
pub use transport::{AppNotificationTransport, NotificationTransport};
