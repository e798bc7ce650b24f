use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use serde::Serialize;
use tracing::{error, info};

use crate::db::Credentials;
use crate::error::AppError;
use crate::{json_response, AppState};

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
}

pub async fn register(
    req: web::Json<Credentials>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Received registration request for username: {}", req.username);
    req.validate()?;

    match state.auth_service.register(&req.username, &req.password).await {
        Ok(identity) => {
            info!("Registration successful for username: {}", req.username);
            Ok(json_response(StatusCode::CREATED, &identity))
        }
        Err(e) => {
            error!("Registration failed for username: {}: {}", req.username, e);
            Err(e)
        }
    }
}

pub async fn login(
    req: web::Json<Credentials>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Received login request for username: {}", req.username);
    req.validate()?;

    match state.auth_service.login(&req.username, &req.password).await {
        Ok(token) => {
            info!("Login successful for username: {}", req.username);
            Ok(json_response(
                StatusCode::OK,
                &AuthResponse {
                    token: format!("Bearer {}", token),
                },
            ))
        }
        Err(e) => {
            error!("Login failed for username: {}: {}", req.username, e);
            Err(e)
        }
    }
}
