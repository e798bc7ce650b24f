use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use tracing::{error, info};

use crate::auth::CallerId;
use crate::db::{NewNote, NoteId, NoteUpdate, TagId};
use crate::error::AppError;
use crate::{json_response, AppState};

const TAG_PARAM: &str = "tag";

/// Collects every `tag=<id>` pair from a query string, in order.
pub fn tag_ids(query: &str) -> Result<Vec<TagId>, AppError> {
    url::form_urlencoded::parse(query.as_bytes())
        .filter(|(key, _)| key == TAG_PARAM)
        .map(|(_, value)| {
            value
                .parse::<TagId>()
                .map_err(|_| AppError::ValidationError(format!("invalid tag id '{}'", value)))
        })
        .collect()
}

pub async fn create(
    caller: CallerId,
    req: web::Json<NewNote>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    req.validate()?;
    let note = state.notes.create(caller.id(), &req).await?;
    Ok(json_response(StatusCode::CREATED, &note))
}

pub async fn list(caller: CallerId, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let notes = state.notes.list(caller.id()).await?;
    Ok(json_response(StatusCode::OK, &notes))
}

pub async fn get(
    caller: CallerId,
    path: web::Path<NoteId>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let note = state.notes.get(caller.id(), path.into_inner()).await?;
    Ok(json_response(StatusCode::OK, &note))
}

pub async fn update(
    caller: CallerId,
    path: web::Path<NoteId>,
    req: web::Json<NoteUpdate>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    match state.notes.update(caller.id(), id, &req).await {
        Ok(note) => {
            info!("User {} updated note {}", caller, id);
            Ok(json_response(StatusCode::OK, &note))
        }
        Err(e) => {
            error!("Update of note {} by user {} failed: {}", id, caller, e);
            Err(e)
        }
    }
}

pub async fn delete(
    caller: CallerId,
    path: web::Path<NoteId>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let deleted = state.notes.delete(caller.id(), path.into_inner()).await?;
    Ok(json_response(StatusCode::OK, &json!({ "deleted": deleted })))
}

pub async fn set_tags(
    caller: CallerId,
    path: web::Path<NoteId>,
    http: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let tags = tag_ids(http.query_string())?;
    info!("User {} attaching tags {:?} to note {}", caller, tags, id);

    let note = state.notes.set_tags(caller.id(), id, &tags).await?;
    Ok(json_response(StatusCode::OK, &note))
}

pub async fn remove_tags(
    caller: CallerId,
    path: web::Path<NoteId>,
    http: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let tags = tag_ids(http.query_string())?;
    info!("User {} detaching tags {:?} from note {}", caller, tags, id);

    let note = state.notes.remove_tags(caller.id(), id, &tags).await?;
    Ok(json_response(StatusCode::OK, &note))
}

pub async fn with_tags(
    caller: CallerId,
    path: web::Path<NoteId>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let note = state.notes.with_tags(caller.id(), path.into_inner()).await?;
    Ok(json_response(StatusCode::OK, &note))
}

pub async fn all_with_tags(
    caller: CallerId,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let notes = state.notes.all_with_tags(caller.id()).await?;
    Ok(json_response(StatusCode::OK, &notes))
}
