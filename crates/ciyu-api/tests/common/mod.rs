use std::sync::Arc;

use axum::{
    Router, middleware,
    body::Body,
    http::{Request, StatusCode},
};
use ciyu_api::{middleware::request_id::request_id_middleware, router, state::ApiState};
use ciyu_db::MemoryStore;
use http_body_util::BodyExt;
use serde::Deserialize;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Test state builder for creating an ApiState over an in-memory store
pub struct TestStateBuilder {
    default_queue_size: usize,
    max_queue_size: usize,
}

impl TestStateBuilder {
    pub fn new() -> Self {
        Self {
            default_queue_size: 20,
            max_queue_size: 200,
        }
    }

    pub fn max_queue_size(mut self, max: usize) -> Self {
        self.max_queue_size = max;
        self.default_queue_size = self.default_queue_size.min(max);
        self
    }

    /// Build the state; the returned store handle can be switched offline.
    pub fn build(self) -> (ApiState, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let state = ApiState {
            store: store.clone(),
            default_queue_size: self.default_queue_size,
            max_queue_size: self.max_queue_size,
        };
        (state, store)
    }
}

impl Default for TestStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Router with the request-id layer, as the server binary wires it
pub fn app(state: ApiState) -> Router {
    router::router()
        .with_state(state)
        .layer(middleware::from_fn(request_id_middleware))
}

/// Helper to make requests to the test app
pub struct TestClient {
    router: Router,
}

impl TestClient {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    /// Send a request and get the response
    pub async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        TestResponse {
            status,
            body: body_bytes.to_vec(),
            headers,
        }
    }

    /// Send a GET request
    pub async fn get(&self, uri: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .expect("Failed to build request");

        self.request(request).await
    }

    /// Send a POST request with JSON body
    pub async fn post_json<T: serde::Serialize>(&self, uri: &str, body: &T) -> TestResponse {
        let json_body = serde_json::to_string(body).expect("Failed to serialize body");

        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(json_body))
            .expect("Failed to build request");

        self.request(request).await
    }
}

/// Test response wrapper
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
    pub headers: axum::http::HeaderMap,
}

impl TestResponse {
    /// Get response body as string
    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("Response body is not valid UTF-8")
    }

    /// Parse response body as JSON
    pub fn json<T: for<'de> Deserialize<'de>>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }

    /// Assert status code
    pub fn assert_status(&self, expected: StatusCode) {
        assert_eq!(
            self.status,
            expected,
            "Expected status {}, got {}. Body: {}",
            expected,
            self.status,
            self.text()
        );
    }
}

/// A pool entry as the content side sends it
pub fn vocab(id: &str, headword: &str, phonetic: &str) -> Value {
    json!({
        "id": id,
        "headword": headword,
        "phonetic": phonetic,
        "meaning": format!("meaning of {headword}"),
        "language": "mandarin",
        "level": "hsk1",
    })
}

/// Open a session and return its id
pub async fn start_session(client: &TestClient, user_id: uuid::Uuid) -> String {
    let response = client
        .post_json(
            &format!("/v1/practice/{user_id}/sessions"),
            &json!({
                "exercise_type": "pinyin_choice",
                "language": "mandarin",
                "level": "hsk1",
                "requested_count": 10,
                "metadata": { "question_count": 10 },
            }),
        )
        .await;
    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    body["id"].as_str().expect("session id").to_string()
}
