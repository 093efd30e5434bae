use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use contracts::system::auth::UserInfo;

use super::AuthError;

/// Extractor for getting current user from the verified token
/// Usage in handlers: `async fn handler(CurrentUser(user): CurrentUser) -> Response`
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserInfo);

impl CurrentUser {
    /// Fails with 403 unless the user holds at least one of `roles`
    pub fn require_any_role(&self, roles: &[&str]) -> Result<(), AuthError> {
        if self.0.has_any_role(roles) {
            Ok(())
        } else {
            tracing::warn!(
                "User {} lacks required roles {:?} (has {:?})",
                self.0.user_id,
                roles,
                self.0.roles
            );
            Err(AuthError::Forbidden(roles.join(", ")))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Extract UserInfo from request extensions (set by middleware)
        parts
            .extensions
            .get::<UserInfo>()
            .cloned()
            .map(CurrentUser)
            .ok_or(AuthError::MissingBearerToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::system::auth::{ROLE_ANALYST, ROLE_MANAGER};

    #[test]
    fn test_require_any_role() {
        let user = CurrentUser(UserInfo {
            user_id: "u".into(),
            email: None,
            roles: vec![ROLE_MANAGER.into()],
            permissions: vec![],
        });
        assert!(user.require_any_role(&["admin", ROLE_MANAGER]).is_ok());
        let err = user.require_any_role(&["admin", ROLE_ANALYST]).unwrap_err();
        assert!(matches!(err, AuthError::Forbidden(ref r) if r == "admin, analyst"));
    }
}
