//! Health, fallback and CORS behaviour.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use common::TestApp;

#[tokio::test]
async fn health_reports_version() {
    let app = TestApp::with_recipes();
    for uri in ["/", "/health"] {
        let (status, json, _) = app.send(Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], menu_mixer_core::version());
    }
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = TestApp::with_recipes();
    let (status, json, _) = app.send(Method::GET, "/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Not found");
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn wrong_method_is_not_found() {
    let app = TestApp::with_recipes();
    let (status, json, _) = app.send(Method::GET, "/auth/validate", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Not found");
}

fn preflight(origin: &str) -> Request<Body> {
    Request::builder()
        .method(Method::OPTIONS)
        .uri("/ai/parse")
        .header(header::ORIGIN, origin)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization,content-type")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn preflight_from_allowed_origin_is_granted() {
    let app = TestApp::with_recipes();
    let (status, _, headers) = app.dispatch(preflight("http://localhost:5173")).await;

    assert!(status.is_success());
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:5173"
    );
    assert_eq!(headers[header::ACCESS_CONTROL_MAX_AGE], "86400");
    assert_eq!(app.provider.calls(), 0);
}

#[tokio::test]
async fn preflight_from_foreign_origin_gets_no_grant() {
    let app = TestApp::with_recipes();
    let (_, _, headers) = app.dispatch(preflight("https://evil.example")).await;
    assert!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[tokio::test]
async fn error_responses_carry_cors_headers() {
    let app = TestApp::with_recipes();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/auth/refresh")
        .header(header::ORIGIN, "https://menu-mixer.github.io")
        .body(Body::empty())
        .unwrap();
    let (status, _, headers) = app.dispatch(req).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://menu-mixer.github.io"
    );
}
