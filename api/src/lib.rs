//! OpenForms REST API
//!
//! Accounts, form definitions and submitted responses over HTTP.
//!
//! # Routes
//!
//! ```text
//! GET    /health
//! POST   /user/signup
//! POST   /user/login
//! POST   /user/add_form                        (bearer, owner)
//! GET    /user/get_forms/:creatorId
//! GET    /user/getA_form/:formId/:creatorId
//! GET    /user/get_form/:formId
//! DELETE /user/delete_form/:formId             (bearer, owner)
//! POST   /user/add_response
//! GET    /user/get_responses/:formId           (bearer, owner)
//! GET    /docs                                 Swagger UI
//! ```
//!
//! Every body is the `{message, success, data}` envelope; login adds `token`.

#![warn(missing_docs)]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

pub use auth::{Session, TokenKeys};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use models::*;
pub use store::{
    FormRepository, InMemoryFormRepository, InMemoryResponseRepository, InMemoryUserRepository,
    RepositoryError, ResponseRepository, SignupOutcome, UserRepository,
};

/// API state
pub struct ApiState {
    /// Effective configuration.
    pub config: ApiConfig,
    /// Session token keys.
    pub tokens: TokenKeys,
    /// Accounts.
    pub users: Arc<dyn UserRepository>,
    /// Form definitions.
    pub forms: Arc<dyn FormRepository>,
    /// Submitted responses.
    pub responses: Arc<dyn ResponseRepository>,
}

impl ApiState {
    /// State backed by the in-memory repositories.
    pub fn new(config: ApiConfig) -> Self {
        Self::with_repositories(
            config,
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryFormRepository::new()),
            Arc::new(InMemoryResponseRepository::new()),
        )
    }

    /// State over caller-supplied repositories.
    pub fn with_repositories(
        config: ApiConfig,
        users: Arc<dyn UserRepository>,
        forms: Arc<dyn FormRepository>,
        responses: Arc<dyn ResponseRepository>,
    ) -> Self {
        let tokens = TokenKeys::new(config.jwt_secret.as_bytes(), config.token_ttl_hours);
        Self {
            config,
            tokens,
            users,
            forms,
            responses,
        }
    }
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "OpenForms API",
        version = "0.1.0",
        description = "Form builder backend: accounts, forms and responses",
        license(name = "Apache-2.0")
    ),
    paths(
        routes::health::health_check,
        routes::users::signup,
        routes::users::login,
        routes::forms::add_form,
        routes::forms::list_forms,
        routes::forms::get_owned_form,
        routes::forms::get_form,
        routes::forms::delete_form,
        routes::responses::add_response,
        routes::responses::list_responses,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            SignupRequest, LoginRequest, Credentials, LoginResponse, UserView,
            AddFormRequest, AddResponseRequest,
            openforms_core::Form, openforms_core::Field, openforms_core::FieldType,
            openforms_core::FormResponse, openforms_core::ResponseEntry
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "Signup and login"),
        (name = "forms", description = "Form definitions"),
        (name = "responses", description = "Submitted responses")
    )
)]
pub struct ApiDoc;

/// Build the API router
pub fn build_router(state: ApiState) -> Router {
    let cors = if state.config.cors_permissive {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(routes::health::health_check))
        .nest("/user", routes::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(Arc::new(state))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    pub fn server() -> TestServer {
        let config = ApiConfig {
            bcrypt_cost: 4,
            ..ApiConfig::default()
        };
        TestServer::new(build_router(ApiState::new(config))).unwrap()
    }

    /// Signs up and logs in, returning `(user_id, token)`.
    pub async fn account(server: &TestServer, email: &str) -> (String, String) {
        server
            .post("/user/signup")
            .json(&json!({"name": "Test User", "email": email, "password": "secret1"}))
            .await
            .assert_status_ok();

        let body: Value = server
            .post("/user/login")
            .json(&json!({"userData": {"email": email, "password": "secret1"}}))
            .await
            .json();
        (
            body["data"]["_id"].as_str().unwrap().to_string(),
            body["token"].as_str().unwrap().to_string(),
        )
    }

    pub fn bearer(token: &str) -> (axum::http::HeaderName, axum::http::HeaderValue) {
        (
            axum::http::header::AUTHORIZATION,
            axum::http::HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_openapi_served() {
        let server = server();
        let doc: Value = server.get("/api-docs/openapi.json").await.json();
        assert!(doc["paths"]["/user/add_form"]["post"].is_object());
        assert!(doc["components"]["securitySchemes"]["bearer"].is_object());
    }
}
