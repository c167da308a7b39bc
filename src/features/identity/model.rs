use uuid::Uuid;

use crate::shared::constants::{ROLE_ADMIN, ROLE_MODERATOR};

/// Caller identity asserted by the API gateway.
///
/// The gateway terminates authentication and forwards the verified
/// identity via `X-User-Id` and `X-User-Roles` headers. This service
/// trusts those headers and never inspects tokens itself.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub roles: Vec<String>,
}

impl AuthenticatedUser {
    pub fn is_moderator(&self) -> bool {
        self.roles
            .iter()
            .any(|r| r == ROLE_MODERATOR || r == ROLE_ADMIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_roles(roles: &[&str]) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: Uuid::new_v4(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn moderator_role_grants_access() {
        assert!(user_with_roles(&["moderator"]).is_moderator());
    }

    #[test]
    fn admin_role_grants_access() {
        assert!(user_with_roles(&["user", "admin"]).is_moderator());
    }

    #[test]
    fn plain_user_is_not_moderator() {
        assert!(!user_with_roles(&["user"]).is_moderator());
        assert!(!user_with_roles(&[]).is_moderator());
    }
}
