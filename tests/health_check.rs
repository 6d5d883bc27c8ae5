//! Integration tests for server wiring

use std::net::TcpListener;
use std::sync::Arc;

use auth_service::configuration::{JwtSettings, PasswordSettings, RefreshTokenSettings};
use auth_service::repository::InMemoryRepository;
use auth_service::startup::run;

fn jwt_settings(secret: &str) -> JwtSettings {
    JwtSettings {
        secret: secret.to_string(),
        access_token_expiry: 86_400,
    }
}

fn spawn_app() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let server = run(
        listener,
        Arc::new(InMemoryRepository::new()),
        jwt_settings("health-check-secret"),
        PasswordSettings { hash_cost: 4 },
        RefreshTokenSettings::default(),
    )
    .expect("Failed to create server");

    let _ = tokio::spawn(server);

    format!("http://127.0.0.1:{}", port)
}

#[tokio::test]
async fn health_check_works() {
    let addr = spawn_app();

    let response = reqwest::Client::new()
        .get(&format!("{}/health_check", addr))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn server_refuses_to_start_with_empty_secret() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");

    let result = run(
        listener,
        Arc::new(InMemoryRepository::new()),
        jwt_settings(""),
        PasswordSettings { hash_cost: 4 },
        RefreshTokenSettings::default(),
    );

    assert!(result.is_err());
}

#[tokio::test]
async fn server_refuses_to_start_with_unusable_hash_cost() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");

    let result = run(
        listener,
        Arc::new(InMemoryRepository::new()),
        jwt_settings("health-check-secret"),
        PasswordSettings { hash_cost: 2 },
        RefreshTokenSettings::default(),
    );

    assert!(result.is_err());
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let addr = spawn_app();

    let response = reqwest::Client::new()
        .get(&format!("{}/does-not-exist", addr))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(404, response.status().as_u16());
}
