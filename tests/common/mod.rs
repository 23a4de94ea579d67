#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};

use taskboard_api::config::AppConfig;
use taskboard_api::database::{MemoryStore, Store};
use taskboard_api::{app, AppState};

pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
}

/// Start the real router on an ephemeral port backed by a fresh in-memory store.
/// Each test gets its own server so no state leaks between tests.
pub async fn spawn_server() -> Result<TestServer> {
    spawn_server_with_store(Arc::new(MemoryStore::new())).await
}

/// Same as [`spawn_server`] over a caller-provided store
pub async fn spawn_server_with_store(store: Arc<dyn Store>) -> Result<TestServer> {
    let mut config = AppConfig::development();
    config.security.bcrypt_cost = 4;
    let state = AppState::new(config, store);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind test listener")?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        axum::serve(listener, app(state)).await.expect("test server crashed");
    });

    Ok(TestServer {
        base_url: format!("http://{}", addr),
        client: reqwest::Client::new(),
    })
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn request(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        self.client.request(method, self.url(path)).bearer_auth(token)
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<Response> {
        Ok(self
            .client
            .post(self.url("/api/register/"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?)
    }

    /// Obtain a token pair; fails the test on anything but 200
    pub async fn tokens(&self, username: &str, password: &str) -> Result<Value> {
        let res = self
            .client
            .post(self.url("/api/token/"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
        Ok(res.json().await?)
    }

    /// Register and log in, returning the access token
    pub async fn signup(&self, username: &str, password: &str) -> Result<String> {
        let res = self.register(username, password).await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());
        let tokens = self.tokens(username, password).await?;
        tokens["access"]
            .as_str()
            .map(str::to_string)
            .context("no access token in response")
    }

    pub async fn create_project(&self, token: &str, title: &str) -> Result<Value> {
        let res = self
            .request(Method::POST, "/api/projects/", token)
            .json(&json!({ "title": title }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create project failed: {}", res.status());
        Ok(res.json().await?)
    }

    pub async fn create_task(&self, token: &str, project_id: i64, title: &str) -> Result<Value> {
        let res = self
            .request(Method::POST, "/api/tasks/", token)
            .json(&json!({ "project": project_id, "title": title }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create task failed: {}", res.status());
        Ok(res.json().await?)
    }
}

pub fn id_of(value: &Value) -> i64 {
    value["id"].as_i64().expect("record without id")
}
