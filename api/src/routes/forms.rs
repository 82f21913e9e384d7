//! Form definition endpoints

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use openforms_core::{Form, NewForm};
use std::sync::Arc;

use crate::auth::Session;
use crate::error::{ApiError, ApiResult};
use crate::models::*;
use crate::ApiState;

const FORM_NOT_FOUND: &str = "Form not found";
const MISSING_FORM_MEMBERS: &str = "Creator ID, title, and fields are required.";

/// Save a new form
#[utoipa::path(
    post,
    path = "/user/add_form",
    request_body = AddFormRequest,
    responses(
        (status = 201, description = "Form saved", body = Form),
        (status = 400, description = "Missing members or invalid schema"),
        (status = 401, description = "No valid session"),
        (status = 403, description = "Creator is not the signed-in user")
    ),
    tag = "forms",
    security(("bearer" = []))
)]
pub async fn add_form(
    State(state): State<Arc<ApiState>>,
    session: Session,
    payload: Result<Json<AddFormRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Form>>)> {
    let Json(input) = payload?;

    let creator_id = input.creator_id.filter(|c| !c.trim().is_empty());
    let title = input.title.filter(|t| !t.trim().is_empty());
    let fields = input.fields.filter(|f| !f.is_empty());
    let (Some(creator_id), Some(title), Some(fields)) = (creator_id, title, fields) else {
        return Err(ApiError::BadRequest(MISSING_FORM_MEMBERS.into()));
    };

    if creator_id != session.user_id {
        return Err(ApiError::Forbidden(
            "Forms can only be created for the signed-in user".into(),
        ));
    }

    let form = Form::create(NewForm {
        creator_id,
        title,
        fields,
    })
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let form = state.forms.insert(form).await?;
    tracing::info!(form = %form.id, creator = %form.creator_id, fields = form.fields.len(), "form saved");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Form saved successfully", form)),
    ))
}

/// List a creator's forms
#[utoipa::path(
    get,
    path = "/user/get_forms/{creator_id}",
    params(("creator_id" = String, Path, description = "Creator user ID")),
    responses(
        (status = 200, description = "Forms in creation order", body = Vec<Form>)
    ),
    tag = "forms"
)]
pub async fn list_forms(
    State(state): State<Arc<ApiState>>,
    Path(creator_id): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<Form>>>> {
    let forms = state.forms.list_by_creator(&creator_id).await?;
    Ok(Json(ApiResponse::success("Forms fetched successfully", forms)))
}

/// Get one of a creator's forms
#[utoipa::path(
    get,
    path = "/user/getA_form/{form_id}/{creator_id}",
    params(
        ("form_id" = String, Path, description = "Form ID"),
        ("creator_id" = String, Path, description = "Creator user ID")
    ),
    responses(
        (status = 200, description = "Form details", body = Form),
        (status = 404, description = "No such form for this creator")
    ),
    tag = "forms"
)]
pub async fn get_owned_form(
    State(state): State<Arc<ApiState>>,
    Path((form_id, creator_id)): Path<(String, String)>,
) -> ApiResult<Json<ApiResponse<Form>>> {
    let form = state
        .forms
        .find_owned(&form_id, &creator_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(FORM_NOT_FOUND.into()))?;
    Ok(Json(ApiResponse::success("Form fetched successfully", form)))
}

/// Get a form by its shareable ID
#[utoipa::path(
    get,
    path = "/user/get_form/{form_id}",
    params(("form_id" = String, Path, description = "Form ID")),
    responses(
        (status = 200, description = "Form details", body = Form),
        (status = 404, description = "Form not found")
    ),
    tag = "forms"
)]
pub async fn get_form(
    State(state): State<Arc<ApiState>>,
    Path(form_id): Path<String>,
) -> ApiResult<Json<ApiResponse<Form>>> {
    let form = state
        .forms
        .find(&form_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(FORM_NOT_FOUND.into()))?;
    Ok(Json(ApiResponse::success("Form fetched successfully", form)))
}

/// Delete a form
#[utoipa::path(
    delete,
    path = "/user/delete_form/{form_id}",
    params(("form_id" = String, Path, description = "Form ID")),
    responses(
        (status = 200, description = "Form deleted", body = Form),
        (status = 401, description = "No valid session"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Form not found")
    ),
    tag = "forms",
    security(("bearer" = []))
)]
pub async fn delete_form(
    State(state): State<Arc<ApiState>>,
    session: Session,
    Path(form_id): Path<String>,
) -> ApiResult<Json<ApiResponse<Form>>> {
    let form = state
        .forms
        .find(&form_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(FORM_NOT_FOUND.into()))?;
    if !form.is_owned_by(&session.user_id) {
        return Err(ApiError::Forbidden("Only the owner can delete this form".into()));
    }

    let form = state.forms.delete(&form_id).await?;
    tracing::info!(form = %form.id, "form deleted");
    Ok(Json(ApiResponse::success("Form deleted successfully", form)))
}
