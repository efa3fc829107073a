// HTTP handlers for authentication endpoints

use axum::{extract::State, Json};
use validator::Validate;

use crate::auth::{
    error::AuthError,
    middleware::AuthenticatedUser,
    models::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest, UserResponse},
};
use crate::response::{ApiResponse, Created};
use crate::AppState;

/// Register a new customer account
/// POST /api/auth/register
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created and signed in", body = AuthResponse),
        (status = 400, description = "Invalid input data"),
        (status = 409, description = "Email already registered")
    ),
    tag = "auth"
)]
pub async fn register_handler(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Created<AuthResponse>, AuthError> {
    request.validate()?;

    let response = state
        .auth_service
        .register(
            &request.email,
            &request.password,
            &request.full_name,
            request.phone.as_deref(),
        )
        .await?;

    Ok(Created::new(
        "/api/auth/me",
        "Đăng ký tài khoản thành công",
        response,
    ))
}

/// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Wrong email or password"),
        (status = 403, description = "Account disabled")
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<ApiResponse<AuthResponse>, AuthError> {
    request.validate()?;

    let response = state
        .auth_service
        .login(&request.email, &request.password)
        .await?;

    tracing::info!("User {} logged in", response.user.id);
    Ok(ApiResponse::ok("Đăng nhập thành công", response))
}

/// Rotate a refresh token
/// POST /api/auth/refresh
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New token pair; the old refresh token is spent", body = AuthResponse),
        (status = 401, description = "Unknown, expired or already used refresh token")
    ),
    tag = "auth"
)]
pub async fn refresh_handler(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<ApiResponse<AuthResponse>, AuthError> {
    if request.refresh_token.trim().is_empty() {
        return Err(AuthError::MissingToken);
    }

    let response = state
        .auth_service
        .refresh_tokens(request.refresh_token.trim())
        .await?;

    Ok(ApiResponse::ok("Làm mới phiên đăng nhập thành công", response))
}

/// POST /api/auth/logout
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    request_body = RefreshRequest,
    responses((status = 200, description = "Refresh token revoked")),
    tag = "auth"
)]
pub async fn logout_handler(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<ApiResponse<()>, AuthError> {
    state
        .auth_service
        .logout(request.refresh_token.trim())
        .await?;

    Ok(ApiResponse::empty("Đăng xuất thành công"))
}

/// Current user information (protected endpoint)
/// GET /api/auth/me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current account", body = UserResponse),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn me_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<ApiResponse<UserResponse>, AuthError> {
    let current = state.auth_service.get_current_user(user.user_id).await?;
    Ok(ApiResponse::ok("Lấy thông tin tài khoản thành công", current))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{lazy_server, TestAuth};
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_register_rejects_weak_password() {
        let server = lazy_server();
        let response = server
            .post("/api/auth/register")
            .json(&json!({
                "email": "khach@example.com",
                "password": "abcdefgh",
                "full_name": "Nguyễn Văn A"
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        assert_eq!(body["success"], false);
        assert_eq!(
            body["message"],
            "Mật khẩu phải chứa ít nhất một chữ cái và một chữ số"
        );
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_email() {
        let server = lazy_server();
        let response = server
            .post("/api/auth/register")
            .json(&json!({
                "email": "not-an-email",
                "password": "matkhau123",
                "full_name": "Nguyễn Văn A"
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["message"], "Email không hợp lệ");
    }

    #[tokio::test]
    async fn test_refresh_requires_token() {
        let server = lazy_server();
        let response = server
            .post("/api/auth/refresh")
            .json(&json!({ "refresh_token": "  " }))
            .await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token() {
        let server = lazy_server();
        let access = TestAuth::customer(3).access_token();
        let response = server
            .post("/api/auth/refresh")
            .json(&json!({ "refresh_token": access }))
            .await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_me_requires_authentication() {
        let server = lazy_server();
        let response = server.get("/api/auth/me").await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<Value>()["success"], false);
    }
}
