pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod notes;
pub mod tags;
pub mod users;

use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

pub use config::Settings;
pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;

use auth::{AuthGate, AuthService, PasswordHasher};
use db::{CredentialStore, NoteStore, TagStore, UserStore};
use notes::NoteService;
use tags::TagService;
use users::UserService;

/// Serializes `body` as the whole response, terminated by a newline.
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> HttpResponse {
    match serde_json::to_string(body) {
        Ok(mut json) => {
            json.push('\n');
            HttpResponse::build(status)
                .content_type(ContentType::json())
                .body(json)
        }
        Err(e) => {
            error!("Failed to serialize response body: {}", e);
            HttpResponse::InternalServerError()
                .content_type(ContentType::json())
                .body("{\"error\":\"internal server error\"}\n")
        }
    }
}

/// Health check endpoint handler
pub async fn health_check() -> HttpResponse {
    json_response(
        StatusCode::OK,
        &serde_json::json!({
            "status": "healthy",
            "timestamp": chrono::Utc::now().to_rfc3339()
        }),
    )
}

/// Application state shared across all workers
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub notes: Arc<NoteService>,
    pub tags: Arc<TagService>,
    pub users: Arc<UserService>,
}

impl AppState {
    /// Wires every service to one backing store.
    pub fn with_store<T>(config: &Settings, store: Arc<T>) -> Self
    where
        T: CredentialStore + UserStore + NoteStore + TagStore + 'static,
    {
        let auth_service = AuthService::from_config(store.clone(), &config.auth);
        let hasher = PasswordHasher::new(config.auth.password_salt.clone());

        Self {
            auth_service: Arc::new(auth_service),
            notes: Arc::new(NoteService::new(store.clone(), store.clone())),
            tags: Arc::new(TagService::new(store.clone())),
            users: Arc::new(UserService::new(store, hasher)),
        }
    }
}

/// Malformed JSON bodies are reported in the same envelope as every other error.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(format!("invalid id: {}", err)).into())
}

/// Registers the public auth routes and the gated resource routes.
pub fn configure(cfg: &mut web::ServiceConfig, state: &web::Data<AppState>) {
    let gate = AuthGate::new(state.auth_service.clone());

    cfg.app_data(state.clone())
        .app_data(json_config())
        .app_data(path_config())
        .route("/health", web::get().to(health_check))
        .route("/register", web::post().to(auth::handlers::register))
        .route("/login", web::post().to(auth::handlers::login))
        .service(
            web::scope("")
                .wrap(gate)
                .service(
                    web::resource("/users")
                        .route(web::get().to(users::handlers::list)),
                )
                .service(
                    web::resource("/users/{id}")
                        .route(web::get().to(users::handlers::get))
                        .route(web::put().to(users::handlers::update))
                        .route(web::delete().to(users::handlers::delete)),
                )
                .service(
                    web::resource("/notes")
                        .route(web::post().to(notes::handlers::create))
                        .route(web::get().to(notes::handlers::list)),
                )
                .service(
                    web::resource("/notes/{id}")
                        .route(web::get().to(notes::handlers::get))
                        .route(web::put().to(notes::handlers::update))
                        .route(web::delete().to(notes::handlers::delete)),
                )
                .route("/notes/{id}/tags", web::get().to(notes::handlers::with_tags))
                .route("/notes/{id}/tags/set", web::put().to(notes::handlers::set_tags))
                .route("/notes/{id}/tags/remove", web::put().to(notes::handlers::remove_tags))
                .route("/allnotes/tags", web::get().to(notes::handlers::all_with_tags))
                .service(
                    web::resource("/tags")
                        .route(web::post().to(tags::handlers::create))
                        .route(web::get().to(tags::handlers::list)),
                )
                .service(
                    web::resource("/tags/{id}")
                        .route(web::get().to(tags::handlers::get))
                        .route(web::put().to(tags::handlers::update))
                        .route(web::delete().to(tags::handlers::delete)),
                ),
        );
}
