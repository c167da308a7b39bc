//! Narrow interfaces onto the surrounding recipe platform.
//!
//! The moderation core never owns users, recipes, or delivery channels; it
//! consumes them through these traits so the engine stays testable without
//! the rest of the platform.

pub mod assets;
pub mod enforcement;
pub mod resolver;

pub use assets::{AssetUrlResolver, PublicAssetResolver};
pub use enforcement::{EnforcementExecutor, PgEnforcementExecutor};
pub use resolver::{IdentityResolver, PgIdentityResolver, RecipeRef, UserRef};
