use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::core::error::AppError;
use crate::features::identity::model::AuthenticatedUser;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLES_HEADER: &str = "x-user-roles";

fn identity_from_parts(parts: &Parts) -> Result<AuthenticatedUser, AppError> {
    let user_id = parts
        .headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing identity header".to_string()))?;

    let user_id = Uuid::parse_str(user_id)
        .map_err(|_| AppError::Unauthorized("Malformed identity header".to_string()))?;

    let roles = parts
        .headers
        .get(USER_ROLES_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| {
            v.split(',')
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .collect()
        })
        .unwrap_or_default();

    Ok(AuthenticatedUser { user_id, roles })
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        identity_from_parts(parts)
    }
}

/// Extractor that rejects callers without the moderator or admin role.
pub struct RequireModerator(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireModerator
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = identity_from_parts(parts)?;
        if !user.is_moderator() {
            return Err(AppError::Forbidden(
                "Moderator role required".to_string(),
            ));
        }
        Ok(RequireModerator(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_headers(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn parses_identity_headers() {
        let id = Uuid::new_v4();
        let parts = parts_with_headers(&[
            (USER_ID_HEADER, &id.to_string()),
            (USER_ROLES_HEADER, "user, moderator"),
        ]);

        let user = identity_from_parts(&parts).unwrap();
        assert_eq!(user.user_id, id);
        assert_eq!(user.roles, vec!["user".to_string(), "moderator".to_string()]);
        assert!(user.is_moderator());
    }

    #[test]
    fn missing_header_is_unauthorized() {
        let parts = parts_with_headers(&[]);
        assert!(matches!(
            identity_from_parts(&parts),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn malformed_user_id_is_unauthorized() {
        let parts = parts_with_headers(&[(USER_ID_HEADER, "not-a-uuid")]);
        assert!(matches!(
            identity_from_parts(&parts),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn roles_header_is_optional() {
        let id = Uuid::new_v4();
        let parts = parts_with_headers(&[(USER_ID_HEADER, &id.to_string())]);
        let user = identity_from_parts(&parts).unwrap();
        assert!(user.roles.is_empty());
        assert!(!user.is_moderator());
    }
}
