//! API Models

use chrono::{DateTime, Utc};
use openforms_core::{Field, ResponseEntry};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standard API response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Human-readable outcome.
    pub message: String,
    /// `true` on 2xx.
    pub success: bool,
    /// Payload, `null` on failure.
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// A successful envelope carrying `data`.
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            success: true,
            data: Some(data),
        }
    }

    /// A failed envelope with no payload.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: false,
            data: None,
        }
    }
}

// ============ Users ============

/// Stored account. The password is only ever held as a bcrypt hash.
#[derive(Debug, Clone)]
pub struct User {
    /// Account id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Normalised (trimmed, lowercased) email.
    pub email: String,
    /// bcrypt hash.
    pub password_hash: String,
    /// Signup time.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// A new account with a fresh id.
    pub fn new(name: impl Into<String>, email: impl Into<String>, password_hash: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            email: email.into(),
            password_hash,
            created_at: Utc::now(),
        }
    }

    /// The public projection.
    pub fn view(&self) -> UserView {
        UserView {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }
}

/// Public user projection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserView {
    /// Account id.
    #[serde(rename = "_id")]
    pub id: String,
    /// Email.
    pub email: String,
    /// Display name.
    pub name: String,
}

/// Signup request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignupRequest {
    /// At least three characters.
    pub name: String,
    /// A well-formed address.
    pub email: String,
    /// At least six characters.
    pub password: String,
}

/// Email and password pair.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Credentials {
    /// Email.
    pub email: String,
    /// Plain password.
    pub password: String,
}

/// Login request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Credentials to check.
    #[serde(rename = "userData")]
    pub user_data: Credentials,
}

/// Login response: the envelope plus a bearer token.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Human-readable outcome.
    pub message: String,
    /// Always `true`.
    pub success: bool,
    /// The signed-in user.
    pub data: UserView,
    /// Bearer token for the owner-only endpoints.
    pub token: String,
}

// ============ Forms ============

/// Form creation request. Every member is optional on the wire so that a
/// missing one yields the dedicated 400 message.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddFormRequest {
    /// Owner; must match the session.
    pub creator_id: Option<String>,
    /// Form title.
    pub title: Option<String>,
    /// Ordered questions.
    pub fields: Option<Vec<Field>>,
}

// ============ Responses ============

/// Response submission request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddResponseRequest {
    /// Target form.
    pub form_id: String,
    /// One entry per answered field, keyed by label.
    pub responses: Vec<ResponseEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_envelope_shape() {
        let json = serde_json::to_value(ApiResponse::<()>::failure("Form not found")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"message": "Form not found", "success": false, "data": null})
        );
    }

    #[test]
    fn test_user_view_hides_hash() {
        let user = User::new("Ada", "ada@example.com", "$2b$04$hash".into());
        let json = serde_json::to_value(user.view()).unwrap();
        assert_eq!(json["_id"], user.id.as_str());
        assert!(json.get("password").is_none());
    }

    #[test]
    fn test_add_response_rejects_unknown_members() {
        let raw = r#"{"formId":"f1","responses":[],"creatorId":"u1"}"#;
        assert!(serde_json::from_str::<AddResponseRequest>(raw).is_err());
    }
}
