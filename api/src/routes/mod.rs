//! API Routes

pub mod forms;
pub mod health;
pub mod responses;
pub mod users;

use axum::routing::{delete, get, post};
use axum::Router;
use std::sync::Arc;

use crate::ApiState;

/// Everything under `/user`.
pub fn router() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/signup", post(users::signup))
        .route("/login", post(users::login))
        .route("/add_form", post(forms::add_form))
        .route("/get_forms/:creator_id", get(forms::list_forms))
        .route("/getA_form/:form_id/:creator_id", get(forms::get_owned_form))
        .route("/get_form/:form_id", get(forms::get_form))
        .route("/delete_form/:form_id", delete(forms::delete_form))
        .route("/add_response", post(responses::add_response))
        .route("/get_responses/:form_id", get(responses::list_responses))
}
