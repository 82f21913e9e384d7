//! Signup and login endpoints

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use openforms_core::is_valid_email;
use std::sync::Arc;

use crate::auth::{hash_password, verify_password};
use crate::error::{ApiError, ApiResult};
use crate::models::*;
use crate::store::SignupOutcome;
use crate::ApiState;

const USER_EXISTS: &str = "User already exist";

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn check_signup(input: &SignupRequest) -> ApiResult<()> {
    if input.name.trim().chars().count() < 3 {
        return Err(ApiError::BadRequest("Name must be at least 3 characters".into()));
    }
    if !is_valid_email(input.email.trim()) {
        return Err(ApiError::BadRequest("Enter a valid email address".into()));
    }
    if input.password.chars().count() < 6 {
        return Err(ApiError::BadRequest("Password must be at least 6 characters".into()));
    }
    Ok(())
}

/// Create an account
#[utoipa::path(
    post,
    path = "/user/signup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "User created", body = UserView),
        (status = 400, description = "Invalid name, email or password"),
        (status = 409, description = "Email already registered")
    ),
    tag = "users"
)]
pub async fn signup(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<UserView>>> {
    let Json(input) = payload?;
    check_signup(&input)?;

    let email = normalize_email(&input.email);
    if state.users.find_by_email(&email).await?.is_some() {
        return Err(ApiError::Conflict(USER_EXISTS.into()));
    }

    let hash = hash_password(input.password, state.config.bcrypt_cost).await?;
    match state
        .users
        .create_unique(User::new(input.name.trim(), email, hash))
        .await?
    {
        SignupOutcome::Created(user) => {
            tracing::info!(user = %user.id, "account created");
            Ok(Json(ApiResponse::success("User created successfully", user.view())))
        }
        SignupOutcome::AlreadyExists => Err(ApiError::Conflict(USER_EXISTS.into())),
    }
}

/// Sign in
#[utoipa::path(
    post,
    path = "/user/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 400, description = "Unknown user or wrong password")
    ),
    tag = "users"
)]
pub async fn login(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(LoginRequest { user_data }) = payload?;

    let user = state
        .users
        .find_by_email(&normalize_email(&user_data.email))
        .await?
        .ok_or_else(|| ApiError::BadRequest("User doesn't exist".into()))?;

    if !verify_password(user_data.password, user.password_hash.clone()).await? {
        tracing::debug!(user = %user.id, "wrong password");
        return Err(ApiError::BadRequest("Invalid credentials.".into()));
    }

    let token = state
        .tokens
        .create_token(&user)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    tracing::info!(user = %user.id, "signed in");
    Ok(Json(LoginResponse {
        message: "Successfully logged in".into(),
        success: true,
        data: user.view(),
        token,
    }))
}

#[cfg(test)]
mod tests {
    use crate::testing::server;
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    fn signup_body(name: &str, email: &str, password: &str) -> Value {
        json!({"name": name, "email": email, "password": password})
    }

    #[tokio::test]
    async fn test_signup_then_duplicate() {
        let server = server();
        let res = server
            .post("/user/signup")
            .json(&signup_body("Ada Lovelace", "ada@example.com", "secret1"))
            .await;
        res.assert_status_ok();
        let body: Value = res.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "User created successfully");
        assert_eq!(body["data"]["email"], "ada@example.com");
        assert!(body["data"].get("password").is_none());

        let res = server
            .post("/user/signup")
            .json(&signup_body("Ada Again", "ADA@example.com ", "secret2"))
            .await;
        assert_eq!(res.status_code(), StatusCode::CONFLICT);
        let body: Value = res.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "User already exist");
        assert_eq!(body["data"], Value::Null);

        let res = server
            .post("/user/login")
            .json(&json!({"userData": {"email": "ada@example.com", "password": "secret2"}}))
            .await;
        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
        let res = server
            .post("/user/login")
            .json(&json!({"userData": {"email": "ada@example.com", "password": "secret1"}}))
            .await;
        res.assert_status_ok();
        assert_eq!(res.json::<Value>()["data"]["name"], "Ada Lovelace");
    }

    #[tokio::test]
    async fn test_signup_validation() {
        let server = server();
        for body in [
            signup_body("Al", "al@example.com", "secret1"),
            signup_body("Alan", "not-an-email", "secret1"),
            signup_body("Alan", "al@example.com", "12345"),
        ] {
            let res = server.post("/user/signup").json(&body).await;
            assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
        }
        let res = server.post("/user/signup").json(&json!({"name": "Alan"})).await;
        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login() {
        let server = server();
        server
            .post("/user/signup")
            .json(&signup_body("Grace", "grace@example.com", "cobol1"))
            .await
            .assert_status_ok();

        let res = server
            .post("/user/login")
            .json(&json!({"userData": {"email": "grace@example.com", "password": "cobol1"}}))
            .await;
        res.assert_status_ok();
        let body: Value = res.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["name"], "Grace");
        assert!(body["data"].get("password").is_none());
        assert!(body["data"].get("password_hash").is_none());
        assert!(!body["token"].as_str().unwrap().is_empty());

        let res = server
            .post("/user/login")
            .json(&json!({"userData": {"email": "grace@example.com", "password": "fortran"}}))
            .await;
        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(res.json::<Value>()["message"], "Invalid credentials.");

        let res = server
            .post("/user/login")
            .json(&json!({"userData": {"email": "nobody@example.com", "password": "x"}}))
            .await;
        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(res.json::<Value>()["message"], "User doesn't exist");
    }
}
