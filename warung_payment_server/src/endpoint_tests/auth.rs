use actix_web::{http::StatusCode, test::TestRequest, web::ServiceConfig};

use super::helpers::{get_auth_config, send_request};
use crate::{auth::TokenIssuer, routes::auth};

fn configure(cfg: &mut ServiceConfig) {
    cfg.service(auth);
}

#[actix_web::test]
async fn valid_admin_key_earns_a_token() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/auth").insert_header(("wpg_admin_key", "endpoint-test-admin-key"));
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::OK);
    // The body is the JWT itself; it must verify against the test signing key.
    let issuer = TokenIssuer::new(&get_auth_config());
    let claims = issuer.verify_token(&body).expect("issued token should verify");
    assert_eq!(claims.sub, "admin");
}

#[actix_web::test]
async fn wrong_admin_key_is_unauthorized() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/auth").insert_header(("wpg_admin_key", "not-the-key"));
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("admin key"), "{body}");
}

#[actix_web::test]
async fn missing_admin_key_is_unauthorized() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/auth");
    let (status, _body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
