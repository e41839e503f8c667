#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! Every [`TestApp`] drives the REAL router, services, and session layer.
//! Only the backends are swapped: an in-memory content store and
//! tower-sessions' `MemoryStore` instead of PostgreSQL and Redis. Each app
//! gets its own store and image directory, so tests never share state.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use tower_sessions::MemoryStore;
use tower_sessions::cookie::SameSite;

use cmsmall_server::models::{NewUser, User};
use cmsmall_server::routes;
use cmsmall_server::session::configure_session_layer;
use cmsmall_server::state::AppState;
use cmsmall_server::storage::{ContentStorage, MemoryContentStorage};

/// Default password for every test user.
pub const PASSWORD: &str = "password";

static NEXT_APP: AtomicUsize = AtomicUsize::new(0);

/// Test application wrapper using the REAL routes and state.
pub struct TestApp {
    router: Router,
    pub storage: Arc<MemoryContentStorage>,
    pub state: AppState,
    pub images_dir: PathBuf,
}

impl TestApp {
    /// Create a fresh application with an empty store and image library.
    pub async fn new() -> Self {
        let images_dir = std::env::temp_dir().join(format!(
            "cmsmall-test-{}-{}",
            std::process::id(),
            NEXT_APP.fetch_add(1, Ordering::Relaxed)
        ));
        let _ = std::fs::remove_dir_all(&images_dir);
        std::fs::create_dir_all(&images_dir).expect("Failed to create image directory");

        let storage = Arc::new(MemoryContentStorage::new());
        let state = AppState::with_storage(storage.clone(), images_dir.clone());

        let session_layer = configure_session_layer(MemoryStore::default(), SameSite::Lax, false);
        let router = routes::build_router(state.clone(), session_layer);

        Self {
            router,
            storage,
            state,
            images_dir,
        }
    }

    /// Put a file into the image library.
    pub fn add_image(&self, name: &str) {
        std::fs::write(self.images_dir.join(name), b"\x89PNG test image")
            .expect("Failed to write test image");
    }

    /// Send a request to the test application.
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }

    /// Send a request, optionally with session cookies, and decode the JSON body.
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        cookies: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookies) = cookies {
            builder = builder.header(header::COOKIE, cookies);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.request(request).await;
        let status = response.status();
        (status, body_json(response).await)
    }

    pub async fn get(&self, uri: &str, cookies: Option<&str>) -> (StatusCode, Value) {
        self.send("GET", uri, cookies, None).await
    }

    /// Login via the JSON API and return session cookies.
    ///
    /// # Panics
    ///
    /// Panics if the login response is not 200 OK.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .request(
                Request::post("/api/sessions")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "username": username,
                            "password": password
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await;

        assert_eq!(
            response.status(),
            StatusCode::OK,
            "Login failed for user '{username}' (status {})",
            response.status()
        );

        extract_cookies(&response)
    }

    /// Create a test user directly in the store.
    pub async fn create_test_user(&self, username: &str) -> User {
        self.create_test_user_inner(username, false).await
    }

    /// Create a test admin directly in the store.
    pub async fn create_test_admin(&self, username: &str) -> User {
        self.create_test_user_inner(username, true).await
    }

    /// Create a user and return it with session cookies.
    pub async fn create_and_login_user(&self, username: &str) -> (User, String) {
        let user = self.create_test_user(username).await;
        let cookies = self.login(username, PASSWORD).await;
        (user, cookies)
    }

    /// Create an admin and return it with session cookies.
    pub async fn create_and_login_admin(&self, username: &str) -> (User, String) {
        let user = self.create_test_admin(username).await;
        let cookies = self.login(username, PASSWORD).await;
        (user, cookies)
    }

    async fn create_test_user_inner(&self, username: &str, is_admin: bool) -> User {
        self.storage
            .create_user(&NewUser {
                email: format!("{username}@test.com"),
                username: username.to_string(),
                pass: test_password_hash(PASSWORD),
                is_admin,
            })
            .await
            .expect("Failed to create test user")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.images_dir);
    }
}

/// Hash with minimal Argon2 params for test speed. Verification reads the
/// params from the PHC string, so the server accepts these hashes.
fn test_password_hash(password: &str) -> String {
    use argon2::{
        Argon2,
        password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
    };

    let salt = SaltString::generate(&mut OsRng);
    let params = argon2::Params::new(4 * 1024, 1, 1, None).expect("test Argon2 params are valid");
    Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params)
        .hash_password(password.as_bytes(), &salt)
        .expect("Failed to hash password")
        .to_string()
}

/// Decode a response body as JSON (`Null` for an empty body).
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    }
}

/// Extract Set-Cookie headers from a response for use in subsequent requests.
pub fn extract_cookies(response: &Response) -> String {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|cookie| {
            // Extract just the cookie name=value, ignoring attributes
            cookie.split(';').next()
        })
        .collect::<Vec<_>>()
        .join("; ")
}
