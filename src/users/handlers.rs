use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::info;

use crate::auth::CallerId;
use crate::db::{UserId, UserUpdate};
use crate::error::AppError;
use crate::{json_response, AppState};

pub async fn list(_caller: CallerId, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let users = state.users.list().await?;
    Ok(json_response(StatusCode::OK, &users))
}

pub async fn get(
    _caller: CallerId,
    path: web::Path<UserId>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user = state.users.get(path.into_inner()).await?;
    Ok(json_response(StatusCode::OK, &user))
}

pub async fn update(
    caller: CallerId,
    path: web::Path<UserId>,
    req: web::Json<UserUpdate>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    info!("User {} updating user {}", caller, id);
    let user = state.users.update(id, req.into_inner()).await?;
    Ok(json_response(StatusCode::OK, &user))
}

pub async fn delete(
    caller: CallerId,
    path: web::Path<UserId>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    info!("User {} deleting user {}", caller, id);
    let deleted = state.users.delete(id).await?;
    Ok(json_response(StatusCode::OK, &json!({ "deleted": deleted })))
}
