use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{error, info};

use crate::auth::CallerId;
use crate::db::{NewTag, TagId, TagUpdate};
use crate::error::AppError;
use crate::{json_response, AppState};

pub async fn create(
    caller: CallerId,
    req: web::Json<NewTag>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    req.validate()?;
    match state.tags.create(caller.id(), &req).await {
        Ok(tag) => Ok(json_response(StatusCode::CREATED, &tag)),
        Err(e) => {
            error!("User {} failed to create tag '{}': {}", caller, req.name, e);
            Err(e)
        }
    }
}

pub async fn list(caller: CallerId, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let tags = state.tags.list(caller.id()).await?;
    Ok(json_response(StatusCode::OK, &tags))
}

pub async fn get(
    caller: CallerId,
    path: web::Path<TagId>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let tag = state.tags.get(caller.id(), path.into_inner()).await?;
    Ok(json_response(StatusCode::OK, &tag))
}

pub async fn update(
    caller: CallerId,
    path: web::Path<TagId>,
    req: web::Json<TagUpdate>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let tag = state.tags.update(caller.id(), id, &req).await?;
    info!("User {} updated tag {}", caller, id);
    Ok(json_response(StatusCode::OK, &tag))
}

pub async fn delete(
    caller: CallerId,
    path: web::Path<TagId>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let deleted = state.tags.delete(caller.id(), path.into_inner()).await?;
    Ok(json_response(StatusCode::OK, &json!({ "deleted": deleted })))
}
