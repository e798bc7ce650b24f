mod common;

use actix_web::http::header::AUTHORIZATION;
use actix_web::http::StatusCode;
use actix_web::{test, App};
use chrono::{Duration, Utc};
use notes_server::auth::TokenCodec;
use notes_server::configure;

async fn gated_status(authorization: Option<&str>) -> (StatusCode, String) {
    let (state, _) = common::test_state();
    let app = test::init_service(App::new().configure(|cfg| configure(cfg, &state))).await;

    let mut req = test::TestRequest::get().uri("/notes");
    if let Some(value) = authorization {
        req = req.insert_header((AUTHORIZATION, value));
    }
    let resp = test::call_service(&app, req.to_request()).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[actix_web::test]
async fn test_missing_header() {
    let (status, body) = gated_status(None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, "{\"error\":\"empty auth header\"}\n");
}

#[actix_web::test]
async fn test_empty_header() {
    let (status, body) = gated_status(Some("")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, "{\"error\":\"empty auth header\"}\n");
}

#[actix_web::test]
async fn test_header_without_separator() {
    let (status, body) = gated_status(Some("Bearer")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, "{\"error\":\"invalid auth header\"}\n");
}

#[actix_web::test]
async fn test_header_with_extra_segments() {
    let (state, _) = common::test_state();
    let (_, bearer) = common::bearer_for(&state, "alice").await;
    let token = bearer.trim_start_matches("Bearer ").to_string();

    for value in [
        "Bearer a b".to_string(),
        format!("Bearer  {}", token),
        format!("Bearer {} extra", token),
    ] {
        let (status, body) = gated_status(Some(value.as_str())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", value);
        assert_eq!(body, "{\"error\":\"invalid auth header\"}\n", "{}", value);
    }
}

#[actix_web::test]
async fn test_wrong_scheme() {
    for value in ["Bearrrrrr token", "bearer abc", "Basic dXNlcjpwdw=="] {
        let (status, body) = gated_status(Some(value)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", value);
        assert_eq!(body, "{\"error\":\"invalid auth header\"}\n", "{}", value);
    }
}

#[actix_web::test]
async fn test_empty_token() {
    let (status, body) = gated_status(Some("Bearer ")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, "{\"error\":\"empty token\"}\n");
}

#[actix_web::test]
async fn test_bad_token_is_unauthorized() {
    for value in ["Bearer garbage", "Bearer a.b.c"] {
        let (status, body) = gated_status(Some(value)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", value);
        assert_eq!(body, "{\"error\":\"unauthorized\"}\n", "{}", value);
    }
}

#[actix_web::test]
async fn test_expired_token_is_unauthorized() {
    let settings = common::test_settings();
    let token = TokenCodec::from_config(&settings.auth)
        .issue(1, Utc::now() - Duration::hours(13))
        .unwrap();

    let (status, body) = gated_status(Some(format!("Bearer {}", token).as_str())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, "{\"error\":\"unauthorized\"}\n");
}

#[actix_web::test]
async fn test_token_signed_with_other_secret() {
    let token = TokenCodec::new(b"someone_else", Duration::hours(12))
        .issue(1, Utc::now())
        .unwrap();

    let (status, body) = gated_status(Some(format!("Bearer {}", token).as_str())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, "{\"error\":\"unauthorized\"}\n");
}

#[actix_web::test]
async fn test_valid_token_reaches_handler() {
    let (state, _) = common::test_state();
    let (_, bearer) = common::bearer_for(&state, "alice").await;
    let app = test::init_service(App::new().configure(|cfg| configure(cfg, &state))).await;

    let req = test::TestRequest::get()
        .uri("/notes")
        .insert_header((AUTHORIZATION, bearer))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(test::read_body(resp).await, "[]\n");
}

#[actix_web::test]
async fn test_public_routes_skip_the_gate() {
    let (state, _) = common::test_state();
    let app = test::init_service(App::new().configure(|cfg| configure(cfg, &state))).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}
