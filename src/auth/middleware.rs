// Authentication extractors and role middleware for protected routes

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::auth::{error::AuthError, models::Role, token::TokenService};

/// Authenticated user extractor for protected routes
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: i32,
    pub email: String,
    pub role: Role,
    /// Set for staff accounts only
    pub facility_id: Option<i32>,
}

/// Pull the bearer token out of the Authorization header
fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| AuthError::InvalidToken)?;
    value
        .strip_prefix("Bearer ")
        .map(|token| Some(token.trim()))
        .ok_or(AuthError::InvalidToken)
}

/// Validate an access token and build the caller identity
pub fn authenticate(tokens: &TokenService, token: &str) -> Result<AuthenticatedUser, AuthError> {
    let claims = tokens.validate_access_token(token)?;
    Ok(AuthenticatedUser {
        user_id: claims.sub,
        email: claims.email,
        role: claims.role,
        facility_id: claims.facility_id,
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<TokenService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?.ok_or(AuthError::MissingToken)?;
        let tokens = Arc::<TokenService>::from_ref(state);
        authenticate(&tokens, token)
    }
}

/// Caller identity for endpoints open to guests.
/// No header means guest; a present but invalid token is still rejected.
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<AuthenticatedUser>);

#[async_trait]
impl<S> FromRequestParts<S> for OptionalUser
where
    Arc<TokenService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match bearer_token(&parts.headers)? {
            Some(token) => {
                let tokens = Arc::<TokenService>::from_ref(state);
                Ok(OptionalUser(Some(authenticate(&tokens, token)?)))
            }
            None => Ok(OptionalUser(None)),
        }
    }
}

/// Authorization middleware that admits a fixed set of roles
#[derive(Debug, Clone)]
pub struct RequireRole {
    allowed: &'static [Role],
}

impl RequireRole {
    pub const fn new(allowed: &'static [Role]) -> Self {
        Self { allowed }
    }

    pub const fn admin() -> Self {
        Self::new(&[Role::Admin])
    }

    /// Admins and facility owners
    pub const fn managers() -> Self {
        Self::new(&[Role::Admin, Role::Owner])
    }

    /// Anyone who works a facility
    pub const fn operators() -> Self {
        Self::new(&[Role::Admin, Role::Owner, Role::Staff])
    }

    /// Check the request headers against the allowed roles
    pub fn check(
        &self,
        tokens: &TokenService,
        headers: &HeaderMap,
        endpoint: &str,
    ) -> Result<AuthenticatedUser, AuthError> {
        let token = bearer_token(headers)?.ok_or_else(|| {
            warn!("Missing Authorization header in request to protected endpoint: {}", endpoint);
            AuthError::MissingToken
        })?;

        let user = authenticate(tokens, token)?;

        if !self.allowed.contains(&user.role) {
            warn!(
                "Authorization failed: user_id={}, role={}, endpoint={}",
                user.user_id, user.role, endpoint
            );
            return Err(AuthError::InsufficientPermissions {
                allowed: self.allowed.to_vec(),
                actual: user.role,
            });
        }

        debug!(
            "Authorization successful: user_id={}, role={}, endpoint={}",
            user.user_id, user.role, endpoint
        );
        Ok(user)
    }

    /// Run the check and forward the request, stashing the user in extensions
    pub async fn middleware(
        self,
        tokens: &TokenService,
        mut request: Request,
        next: Next,
    ) -> Result<Response, AuthError> {
        let endpoint = request.uri().path().to_string();
        let user = self.check(tokens, request.headers(), &endpoint)?;
        request.extensions_mut().insert(user);
        Ok(next.run(request).await)
    }
}

/// Route layer admitting admins only
pub async fn require_admin(
    State(tokens): State<Arc<TokenService>>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    RequireRole::admin().middleware(&tokens, request, next).await
}

/// Route layer admitting admins and owners
pub async fn require_manager(
    State(tokens): State<Arc<TokenService>>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    RequireRole::managers().middleware(&tokens, request, next).await
}

/// Route layer admitting admins, owners and staff
pub async fn require_operator(
    State(tokens): State<Arc<TokenService>>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    RequireRole::operators().middleware(&tokens, request, next).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::TokenSubject;
    use axum::http::Request as HttpRequest;
    use proptest::prelude::*;

    const SECRET: &str = "test_secret_key_for_testing_purposes";

    fn token_service() -> Arc<TokenService> {
        Arc::new(TokenService::new(SECRET.to_string()))
    }

    fn token_for(role: Role, facility_id: Option<i32>) -> String {
        token_service()
            .generate_access_token(&TokenSubject {
                user_id: 42,
                email: "test@example.com".into(),
                role,
                facility_id,
            })
            .unwrap()
    }

    fn parts_with_auth(auth_value: &str) -> Parts {
        let (parts, _) = HttpRequest::builder()
            .uri("/")
            .header(header::AUTHORIZATION, auth_value)
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    fn parts_without_auth() -> Parts {
        let (parts, _) = HttpRequest::builder().uri("/").body(()).unwrap().into_parts();
        parts
    }

    fn headers_with(auth_value: &str) -> HeaderMap {
        parts_with_auth(auth_value).headers
    }

    #[tokio::test]
    async fn test_valid_token_is_accepted() {
        let mut parts = parts_with_auth(&format!("Bearer {}", token_for(Role::Staff, Some(7))));
        let user = AuthenticatedUser::from_request_parts(&mut parts, &token_service())
            .await
            .unwrap();
        assert_eq!(user.user_id, 42);
        assert_eq!(user.role, Role::Staff);
        assert_eq!(user.facility_id, Some(7));
    }

    #[tokio::test]
    async fn test_missing_authorization_header() {
        let mut parts = parts_without_auth();
        let result = AuthenticatedUser::from_request_parts(&mut parts, &token_service()).await;
        assert!(matches!(result, Err(AuthError::MissingToken)));
    }

    #[tokio::test]
    async fn test_invalid_bearer_format() {
        for auth_value in ["InvalidFormat token", "token_without_bearer", "Basic dXNlcjpwYXNz"] {
            let mut parts = parts_with_auth(auth_value);
            let result = AuthenticatedUser::from_request_parts(&mut parts, &token_service()).await;
            assert!(matches!(result, Err(AuthError::InvalidToken)));
        }
    }

    #[tokio::test]
    async fn test_optional_user_without_header_is_guest() {
        let mut parts = parts_without_auth();
        let OptionalUser(user) = OptionalUser::from_request_parts(&mut parts, &token_service())
            .await
            .unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn test_optional_user_rejects_bad_token() {
        let mut parts = parts_with_auth("Bearer not.a.jwt");
        let result = OptionalUser::from_request_parts(&mut parts, &token_service()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_optional_user_with_token() {
        let mut parts = parts_with_auth(&format!("Bearer {}", token_for(Role::Customer, None)));
        let OptionalUser(user) = OptionalUser::from_request_parts(&mut parts, &token_service())
            .await
            .unwrap();
        assert_eq!(user.unwrap().role, Role::Customer);
    }

    #[test]
    fn test_require_role_admin_allows_admin() {
        let headers = headers_with(&format!("Bearer {}", token_for(Role::Admin, None)));
        assert!(RequireRole::admin().check(&token_service(), &headers, "/x").is_ok());
    }

    #[test]
    fn test_require_role_admin_denies_owner() {
        let headers = headers_with(&format!("Bearer {}", token_for(Role::Owner, None)));
        match RequireRole::admin().check(&token_service(), &headers, "/x") {
            Err(AuthError::InsufficientPermissions { allowed, actual }) => {
                assert_eq!(allowed, vec![Role::Admin]);
                assert_eq!(actual, Role::Owner);
            }
            other => panic!("Expected InsufficientPermissions, got {:?}", other),
        }
    }

    #[test]
    fn test_operators_admit_staff_but_not_customers() {
        let staff = headers_with(&format!("Bearer {}", token_for(Role::Staff, Some(1))));
        let customer = headers_with(&format!("Bearer {}", token_for(Role::Customer, None)));
        assert!(RequireRole::operators().check(&token_service(), &staff, "/x").is_ok());
        assert!(RequireRole::operators().check(&token_service(), &customer, "/x").is_err());
    }

    #[test]
    fn test_require_role_missing_token() {
        let result = RequireRole::managers().check(&token_service(), &HeaderMap::new(), "/x");
        assert!(matches!(result, Err(AuthError::MissingToken)));
    }

    proptest! {
        #[test]
        fn prop_malformed_tokens_rejected(malformed in "[a-zA-Z0-9]{10,50}") {
            let headers = headers_with(&format!("Bearer {}", malformed));
            let result = RequireRole::operators().check(&token_service(), &headers, "/x");
            prop_assert!(result.is_err());
        }
    }
}
