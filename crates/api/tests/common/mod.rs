//! Shared helpers for API integration tests.
//!
//! Tests run against the real router and a real database (via
//! `#[sqlx::test]`), with the object store and image provider replaced by
//! in-memory fakes.

// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, Response, StatusCode};
use axum::Router;
use hmac::{Hmac, Mac};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sha2::Sha256;
use tower::ServiceExt;

use flyerforge_api::auth::jwt::JwtConfig;
use flyerforge_api::config::ServerConfig;
use flyerforge_api::router::build_app_router;
use flyerforge_api::state::AppState;
use flyerforge_core::prompt::CompiledPrompt;
use flyerforge_db::DbPool;
use flyerforge_gemini::{GeneratedFlyer, ImageGenerator, ProviderError};
use flyerforge_storage::{DeleteReport, ObjectStore, StorageError};

/// 1x1 transparent PNG, valid image bytes for upload tests.
pub const TINY_PNG_B64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR4nGNgYGBgAAAABQABh6FO1AAAAABJRU5ErkJggg==";

pub const WEBHOOK_SECRET: &str = "whsec_test_secret";

pub fn tiny_png_data_url() -> String {
    format!("data:image/png;base64,{TINY_PNG_B64}")
}

// ---- fakes ----

/// In-memory object store. Records every put; can be switched to fail
/// uploads or deletes to exercise fallback paths.
#[derive(Default)]
pub struct FakeObjectStore {
    pub puts: Mutex<Vec<(String, String)>>,
    pub deleted: Mutex<Vec<String>>,
    pub fail_puts: bool,
    pub fail_deletes: bool,
}

impl FakeObjectStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_puts() -> Arc<Self> {
        Arc::new(FakeObjectStore {
            fail_puts: true,
            ..Default::default()
        })
    }

    pub fn failing_deletes() -> Arc<Self> {
        Arc::new(FakeObjectStore {
            fail_deletes: true,
            ..Default::default()
        })
    }

    pub fn put_count(&self) -> usize {
        self.puts.lock().unwrap().len()
    }

    fn base_url() -> &'static str {
        "https://assets.test/flyerforge/"
    }
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn put(
        &self,
        key: &str,
        _bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        if self.fail_puts {
            return Err(StorageError::Upload {
                key: key.to_string(),
                message: "fake store is offline".to_string(),
            });
        }
        self.puts
            .lock()
            .unwrap()
            .push((key.to_string(), content_type.to_string()));
        Ok(format!("{}{key}", Self::base_url()))
    }

    async fn delete_batch(&self, keys: &[String]) -> DeleteReport {
        if self.fail_deletes {
            return DeleteReport {
                deleted: vec![],
                failed: keys.to_vec(),
            };
        }
        self.deleted.lock().unwrap().extend(keys.iter().cloned());
        DeleteReport {
            deleted: keys.to_vec(),
            failed: vec![],
        }
    }

    fn key_for_url(&self, url: &str) -> Option<String> {
        url.strip_prefix(Self::base_url())
            .filter(|key| !key.is_empty())
            .map(|key| key.to_string())
    }
}

pub enum StubBehavior {
    Succeed,
    NoImage,
    ApiError,
}

/// Image provider stub. Returns a fixed PNG or a configured failure, and
/// records the prompts it was called with.
pub struct StubGenerator {
    pub behavior: StubBehavior,
    pub calls: AtomicUsize,
    pub prompts: Mutex<Vec<CompiledPrompt>>,
}

impl StubGenerator {
    pub fn succeeding() -> Arc<Self> {
        Arc::new(StubGenerator {
            behavior: StubBehavior::Succeed,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(vec![]),
        })
    }

    pub fn with_behavior(behavior: StubBehavior) -> Arc<Self> {
        Arc::new(StubGenerator {
            behavior,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(vec![]),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageGenerator for StubGenerator {
    async fn generate(&self, prompt: &CompiledPrompt) -> Result<GeneratedFlyer, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.clone());

        match self.behavior {
            StubBehavior::Succeed => Ok(GeneratedFlyer {
                data: TINY_PNG_B64.to_string(),
                mime_type: "image/png".to_string(),
            }),
            StubBehavior::NoImage => Err(ProviderError::NoImage),
            StubBehavior::ApiError => Err(ProviderError::Api {
                status: 500,
                body: "provider exploded".to_string(),
            }),
        }
    }
}

// ---- app assembly ----

pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        billing_webhook_secret: WEBHOOK_SECRET.to_string(),
        jwt: JwtConfig {
            secret: "integration-test-jwt-secret".to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

/// Build the app with happy-path fakes.
pub fn build_test_app(pool: DbPool) -> Router {
    build_test_app_with(pool, FakeObjectStore::new(), StubGenerator::succeeding())
}

/// Build the app with caller-held fakes for assertions.
pub fn build_test_app_with(
    pool: DbPool,
    store: Arc<FakeObjectStore>,
    generator: Arc<StubGenerator>,
) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        store,
        generator,
    };
    build_app_router(state, &config)
}

// ---- request helpers ----

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn get_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(
        app,
        Request::get(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, json_request(Method::POST, uri, None, body)).await
}

pub async fn post_json_auth(app: &Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, json_request(Method::POST, uri, Some(token), body)).await
}

pub async fn put_json_auth(app: &Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, json_request(Method::PUT, uri, Some(token), body)).await
}

pub async fn delete_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(
        app,
        Request::delete(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---- webhook helpers ----

pub fn sign_webhook(body: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(WEBHOOK_SECRET.as_bytes()).unwrap();
    mac.update(body.as_bytes());
    mac.finalize()
        .into_bytes()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// POST a signed billing event.
pub async fn post_webhook(app: &Router, body: Value) -> Response<Body> {
    let raw = body.to_string();
    let signature = sign_webhook(&raw);
    send(
        app,
        Request::post("/api/v1/billing/events")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-billing-signature", signature)
            .body(Body::from(raw))
            .unwrap(),
    )
    .await
}

// ---- seeding helpers ----

/// Register an account through the API and return `(account_id, token)`.
pub async fn register_account(app: &Router, email: &str) -> (i64, String) {
    let response = post_json(
        app,
        "/api/v1/auth/register",
        json!({
            "email": email,
            "password": "password123",
            "displayName": "Test Agent",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    let account_id = body["account"]["id"].as_i64().unwrap();
    let token = body["accessToken"].as_str().unwrap().to_string();
    (account_id, token)
}

/// Set an account's credit balance directly.
pub async fn set_credits(pool: &DbPool, account_id: i64, credits: i32) {
    sqlx::query("UPDATE accounts SET credits_remaining = $1 WHERE id = $2")
        .bind(credits)
        .bind(account_id)
        .execute(pool)
        .await
        .unwrap();
}

/// Fill in the profile fields generation falls back to.
pub async fn set_agent_profile(pool: &DbPool, account_id: i64, phone: &str) {
    sqlx::query("UPDATE accounts SET phone = $1, company_name = 'Test Realty' WHERE id = $2")
        .bind(phone)
        .bind(account_id)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn credits_of(pool: &DbPool, account_id: i64) -> i32 {
    let (credits,): (i32,) =
        sqlx::query_as("SELECT credits_remaining FROM accounts WHERE id = $1")
            .bind(account_id)
            .fetch_one(pool)
            .await
            .unwrap();
    credits
}

pub async fn project_status(pool: &DbPool, project_id: i64) -> String {
    let (status,): (String,) = sqlx::query_as("SELECT status FROM projects WHERE id = $1")
        .bind(project_id)
        .fetch_one(pool)
        .await
        .unwrap();
    status
}

/// A minimal but complete generate payload with the given image payloads.
pub fn generate_payload(images: Vec<String>) -> Value {
    json!({
        "listingType": "FOR SALE",
        "price": "450,000",
        "bedrooms": 3,
        "bathrooms": 2.0,
        "squareFeet": 1850,
        "propertyAddress": "12 Harbor Lane",
        "agentName": "Dana Smith",
        "agentPhone": "555-0100",
        "colorScheme": "navy",
        "style": "modern",
        "aspectRatio": "1:1",
        "propertyImages": images,
    })
}
