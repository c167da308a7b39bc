//! Gateway-asserted caller identity and role guards.

pub mod guards;
pub mod model;

pub use guards::RequireModerator;
pub use model::AuthenticatedUser;
