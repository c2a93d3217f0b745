#![allow(dead_code)]

use std::net::TcpListener;

use chirpy::configuration::AuthSettings;
use chirpy::startup::run;
use chirpy::store::Stores;
use reqwest::StatusCode;
use serde_json::{json, Value};

pub const POLKA_KEY: &str = "test-polka-key";

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub password: String,
    pub token: String,
    pub refresh_token: String,
}

pub fn test_auth_settings() -> AuthSettings {
    AuthSettings {
        secret: "integration-test-secret".to_string(),
        issuer: "chirpy".to_string(),
        access_token_lifetime: 3600,
        max_access_token_lifetime: 3600,
        refresh_token_lifetime_days: 60,
        password_cost: 4,
        polka_key: POLKA_KEY.to_string(),
    }
}

pub fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let server = run(listener, Stores::memory(), test_auth_settings())
        .expect("Failed to create server");
    let _ = tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_with_auth(&self, path: &str, authorization: &str) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .header("Authorization", authorization)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn create_user(&self, email: &str, password: &str) -> Value {
        let response = self
            .post_json("/api/users", &json!({ "email": email, "password": password }))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        response.json().await.expect("Failed to parse response")
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post_json("/api/login", &json!({ "email": email, "password": password }))
            .await
    }

    /// Register and log in, returning both tokens
    pub async fn signed_in_user(&self, email: &str) -> TestUser {
        let password = "correct horse battery staple";
        self.create_user(email, password).await;

        let response = self.login(email, password).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = response.json().await.expect("Failed to parse response");

        TestUser {
            id: body["id"].as_str().unwrap().to_string(),
            email: email.to_string(),
            password: password.to_string(),
            token: body["token"].as_str().unwrap().to_string(),
            refresh_token: body["refresh_token"].as_str().unwrap().to_string(),
        }
    }

    pub async fn create_chirp(&self, user: &TestUser, body: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/chirps"))
            .bearer_auth(&user.token)
            .json(&json!({ "body": body }))
            .send()
            .await
            .expect("Failed to execute request.")
    }
}
