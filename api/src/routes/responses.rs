//! Response endpoints

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use openforms_core::FormResponse;
use std::sync::Arc;

use crate::auth::Session;
use crate::error::{ApiError, ApiResult};
use crate::models::*;
use crate::ApiState;

/// Submit a response
#[utoipa::path(
    post,
    path = "/user/add_response",
    request_body = AddResponseRequest,
    responses(
        (status = 201, description = "Response stored", body = FormResponse),
        (status = 400, description = "Entries do not match the form"),
        (status = 404, description = "Form not found")
    ),
    tag = "responses"
)]
pub async fn add_response(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<AddResponseRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<FormResponse>>)> {
    let Json(input) = payload?;

    let form = state
        .forms
        .find(&input.form_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Form not found".into()))?;
    form.check_entries(&input.responses)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let response = state
        .responses
        .insert(FormResponse::create(&form, input.responses))
        .await?;
    tracing::info!(form = %form.id, response = %response.id, "response stored");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Response submitted successfully", response)),
    ))
}

/// List a form's responses
#[utoipa::path(
    get,
    path = "/user/get_responses/{form_id}",
    params(("form_id" = String, Path, description = "Form ID")),
    responses(
        (status = 200, description = "Responses in arrival order", body = Vec<FormResponse>),
        (status = 401, description = "No valid session"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Form not found")
    ),
    tag = "responses",
    security(("bearer" = []))
)]
pub async fn list_responses(
    State(state): State<Arc<ApiState>>,
    session: Session,
    Path(form_id): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<FormResponse>>>> {
    let form = state
        .forms
        .find(&form_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Form not found".into()))?;
    if !form.is_owned_by(&session.user_id) {
        return Err(ApiError::Forbidden("Only the owner can read responses".into()));
    }

    let responses = state.responses.list_by_form(&form_id).await?;
    Ok(Json(ApiResponse::success("Responses fetched successfully", responses)))
}

#[cfg(test)]
mod tests {
    use crate::testing::{account, bearer, server};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    async fn create_form(server: &TestServer, user_id: &str, token: &str) -> String {
        let (name, value) = bearer(token);
        let body: Value = server
            .post("/user/add_form")
            .add_header(name, value)
            .json(&json!({
                "creatorId": user_id,
                "title": "Preferences",
                "fields": [
                    {"id": "field-1", "label": "Name", "type": "text", "required": true},
                    {"id": "field-2", "label": "Colours", "type": "checkbox", "options": ["Red", "Green"], "required": false},
                    {"id": "field-3", "label": "Size", "type": "dropdown", "options": ["S", "M"], "required": false}
                ]
            }))
            .await
            .json();
        body["data"]["_id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_submit_and_list() {
        let server = server();
        let (user_id, token) = account(&server, "owner@example.com").await;
        let form_id = create_form(&server, &user_id, &token).await;

        let res = server
            .post("/user/add_response")
            .json(&json!({
                "formId": form_id,
                "responses": [
                    {"key": "Name", "value": "Ada"},
                    {"key": "Colours", "value": ["Red", "Green"]},
                    {"key": "Size", "value": null}
                ]
            }))
            .await;
        assert_eq!(res.status_code(), StatusCode::CREATED);
        let body: Value = res.json();
        assert_eq!(body["data"]["creatorId"], user_id.as_str());
        assert_eq!(body["data"]["responses"][1]["value"][1], "Green");

        let (name, value) = bearer(&token);
        let list: Value = server
            .get(&format!("/user/get_responses/{form_id}"))
            .add_header(name, value)
            .await
            .json();
        assert_eq!(list["data"].as_array().unwrap().len(), 1);
        assert_eq!(list["data"][0]["formId"], form_id.as_str());
    }

    #[tokio::test]
    async fn test_submit_rejections() {
        let server = server();
        let (user_id, token) = account(&server, "owner@example.com").await;
        let form_id = create_form(&server, &user_id, &token).await;

        let res = server
            .post("/user/add_response")
            .json(&json!({"formId": "missing", "responses": []}))
            .await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);

        for responses in [
            json!([{"key": "Age", "value": "3"}]),
            json!([{"key": "Size", "value": "XL"}]),
            json!([{"key": "Colours", "value": ["Blue"]}]),
            json!([{"key": "Name", "value": "a"}, {"key": "Name", "value": "b"}]),
        ] {
            let res = server
                .post("/user/add_response")
                .json(&json!({"formId": form_id, "responses": responses}))
                .await;
            assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
        }

        let res = server
            .post("/user/add_response")
            .json(&json!({"formId": form_id, "responses": [{"fieldName": "Name", "response": "x"}]}))
            .await;
        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_responses_owner_only() {
        let server = server();
        let (user_id, token) = account(&server, "owner@example.com").await;
        let (_, other_token) = account(&server, "other@example.com").await;
        let form_id = create_form(&server, &user_id, &token).await;

        let res = server.get(&format!("/user/get_responses/{form_id}")).await;
        assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);

        let (name, value) = bearer(&other_token);
        let res = server
            .get(&format!("/user/get_responses/{form_id}"))
            .add_header(name, value)
            .await;
        assert_eq!(res.status_code(), StatusCode::FORBIDDEN);
    }
}
