use anyhow::Result;
use axum::http::StatusCode;
use helluo_core::api::routes;
use helluo_server::infra::config::Config;
use serde_json::{Value, json};

#[path = "support/mod.rs"]
mod support;
use support::{ADMIN_PASSWORD, admin, bearer, build_test_app, build_test_app_with};

#[tokio::test]
async fn password_check_outcomes() -> Result<()> {
    let app = build_test_app()?;

    let missing = app.server.post(routes::AUTH).json(&json!({})).await;
    missing.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(missing.json::<Value>()["error"], "Password required");

    let wrong = app
        .server
        .post(routes::AUTH)
        .json(&json!({ "password": "nope" }))
        .await;
    wrong.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.json::<Value>()["error"], "Invalid password");

    let right = app
        .server
        .post(routes::AUTH)
        .json(&json!({ "password": ADMIN_PASSWORD }))
        .await;
    right.assert_status_ok();
    assert_eq!(right.json::<Value>(), json!({ "success": true }));
    Ok(())
}

#[tokio::test]
async fn unconfigured_password_locks_admin_routes() -> Result<()> {
    let app = build_test_app_with(Config::development(None))?;

    app.server
        .post(routes::AUTH)
        .json(&json!({ "password": ADMIN_PASSWORD }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    app.server
        .post(routes::CATEGORIES)
        .add_header("Authorization", admin())
        .json(&json!({ "id": "dessin", "name": "Dessins" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    app.server
        .post(routes::CATEGORIES)
        .add_header("Authorization", bearer(""))
        .json(&json!({ "id": "dessin", "name": "Dessins" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    app.server.get(routes::CATEGORIES).await.assert_status_ok();
    Ok(())
}

#[tokio::test]
async fn bearer_scheme_is_required() -> Result<()> {
    let app = build_test_app()?;

    app.server
        .delete(routes::CATEGORIES)
        .add_header("Authorization", ADMIN_PASSWORD)
        .add_query_param("id", "divers")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    app.server
        .delete(routes::CATEGORIES)
        .add_header("Authorization", admin())
        .add_query_param("id", "divers")
        .await
        .assert_status_ok();
    Ok(())
}

#[tokio::test]
async fn health_reports_ok() -> Result<()> {
    let app = build_test_app()?;

    let response = app.server.get(routes::HEALTH).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    Ok(())
}
