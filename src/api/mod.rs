//! Bookstore REST API
//!
//! HTTP API layer for the bookstore, built with Axum. The same server
//! hosts uploaded covers and the built storefront bundle.
//!
//! # Endpoints
//!
//! ## Auth
//! - `POST /api/auth/register` - Create an account
//! - `POST /api/auth/login` - Get an access token (JSON or form body)
//! - `GET /api/auth/me` - Current account
//!
//! ## Catalog
//! - `GET /api/books` - Filtered listing
//! - `GET /api/books/:id` - Single book
//! - `POST /api/books`, `PUT /api/books/:id`, `DELETE /api/books/:id` - Admin edits
//! - `GET /api/dicts/{genres,authors,publishers}` - Lookup lists
//!
//! ## Cart & Orders
//! - `GET /api/cart`, `DELETE /api/cart`
//! - `POST /api/cart/items`, `PATCH /api/cart/items/:id`, `DELETE /api/cart/items/:id`
//! - `POST /api/orders`, `GET /api/orders`, `GET /api/orders/:id`
//!
//! ## Profile
//! - `GET /api/users/me`, `PUT /api/users/me`
//! - `POST /api/users/me/password`
//! - `GET /api/users/me/addresses`, `POST /api/users/me/addresses`
//! - `PUT /api/users/me/addresses/:id`, `DELETE /api/users/me/addresses/:id`
//!
//! ## Admin
//! - `/api/admin/{genres,authors,publishers}` - Dictionary CRUD
//! - `GET /api/admin/users`, `PATCH /api/admin/users/:id`
//! - `GET /api/admin/orders`, `GET /api/admin/orders/:id`
//! - `PATCH /api/admin/orders/:id/status`
//! - `POST /api/admin/books/:id/cover`
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! ## Static
//! - `GET /static/covers/*` - Uploaded covers
//! - anything else - Storefront bundle, falling back to `index.html`
//!
//! # Example
//!
//! ```rust,ignore
//! use bookstore::api::{serve, ApiConfig, AppState};
//! use bookstore::auth::TokenKeys;
//! use bookstore::store::Store;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Store::open("bookstore.db")?;
//!     let tokens = TokenKeys::new("secret", 60);
//!     let config = ApiConfig::default();
//!
//!     let state = AppState::new(store, tokens, config.clone());
//!     serve(state, &config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState};

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, patch, post, put},
    Extension, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::covers::COVERS_URL_PREFIX;
use crate::store::DictKind;

type SharedState = Arc<AppState>;

/// Run CPU-heavy work (password hashing) off the async runtime
pub(crate) async fn run_blocking<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("Blocking task failed: {}", e)))?
}

/// Build the full router: API, health probes, covers and storefront
pub fn build_router(state: AppState) -> Router {
    let config = Arc::clone(&state.config);

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let index = config.static_dir.join("index.html");
    let storefront = ServeDir::new(&config.static_dir).fallback(ServeFile::new(index));

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api", api_routes())
        .nest("/health", health_routes)
        .nest_service(COVERS_URL_PREFIX, ServeDir::new(&config.covers_dir))
        .fallback_service(storefront)
        .layer(DefaultBodyLimit::max(config.max_body_size))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_origins))
        .with_state(shared_state)
}

fn api_routes() -> Router<SharedState> {
    Router::new()
        // Auth routes
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/me", get(routes::auth::me))
        // Catalog routes
        .route(
            "/books",
            get(routes::books::list_books).post(routes::books::create_book),
        )
        .route(
            "/books/:id",
            get(routes::books::get_book)
                .put(routes::books::update_book)
                .delete(routes::books::delete_book),
        )
        .route("/dicts/genres", get(routes::dicts::list_genres))
        .route("/dicts/authors", get(routes::dicts::list_authors))
        .route("/dicts/publishers", get(routes::dicts::list_publishers))
        // Cart routes
        .route(
            "/cart",
            get(routes::cart::get_cart).delete(routes::cart::clear_cart),
        )
        .route("/cart/items", post(routes::cart::add_item))
        .route(
            "/cart/items/:id",
            patch(routes::cart::update_item).delete(routes::cart::remove_item),
        )
        // Order routes
        .route(
            "/orders",
            post(routes::orders::create_order).get(routes::orders::list_orders),
        )
        .route("/orders/:id", get(routes::orders::get_order))
        // Profile routes
        .route(
            "/users/me",
            get(routes::users::get_profile).put(routes::users::update_profile),
        )
        .route("/users/me/password", post(routes::users::change_password))
        .route(
            "/users/me/addresses",
            get(routes::users::list_addresses).post(routes::users::create_address),
        )
        .route(
            "/users/me/addresses/:id",
            put(routes::users::update_address).delete(routes::users::delete_address),
        )
        .nest("/admin", admin_routes())
        // Unknown API paths must not fall through to the storefront
        .fallback(api_not_found)
}

fn admin_routes() -> Router<SharedState> {
    Router::new()
        .nest("/genres", dict_routes(DictKind::Genre))
        .nest("/authors", dict_routes(DictKind::Author))
        .nest("/publishers", dict_routes(DictKind::Publisher))
        .route("/users", get(routes::admin::list_users))
        .route("/users/:id", patch(routes::admin::update_user))
        .route("/orders", get(routes::admin::list_orders))
        .route("/orders/:id", get(routes::admin::get_order))
        .route("/orders/:id/status", patch(routes::admin::update_order_status))
        .route("/books/:id/cover", post(routes::admin::upload_cover))
}

fn dict_routes(kind: DictKind) -> Router<SharedState> {
    Router::new()
        .route(
            "/",
            get(routes::admin::list_dict).post(routes::admin::create_dict),
        )
        .route(
            "/:id",
            put(routes::admin::rename_dict)
                .patch(routes::admin::rename_dict)
                .delete(routes::admin::delete_dict),
        )
        .layer(Extension(kind))
}

async fn api_not_found() -> ApiError {
    ApiError::NotFound("Not found".to_string())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Bookstore listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Bookstore shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenKeys;
    use crate::store::Store;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tempfile::{tempdir, TempDir};
    use tower::util::ServiceExt;

    struct TestApp {
        router: Router,
        store: Store,
        dir: TempDir,
    }

    fn create_test_app() -> TestApp {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("test.db")).unwrap();
        let tokens = TokenKeys::new("test-secret", 60);

        let static_dir = dir.path().join("dist");
        std::fs::create_dir_all(&static_dir).unwrap();
        std::fs::write(static_dir.join("index.html"), "<html>storefront</html>").unwrap();

        let api_config = ApiConfig {
            static_dir,
            covers_dir: dir.path().join("covers"),
            max_cover_bytes: 1024,
            ..ApiConfig::default()
        };

        let state = AppState::new(store.clone(), tokens, api_config);
        TestApp {
            router: build_router(state),
            store,
            dir,
        }
    }

    impl TestApp {
        async fn send(&self, request: Request<Body>) -> Response {
            self.router.clone().oneshot(request).await.unwrap()
        }

        async fn call(
            &self,
            method: &str,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header("Authorization", format!("Bearer {}", token));
            }
            let body = match body {
                Some(value) => {
                    builder = builder.header("Content-Type", "application/json");
                    Body::from(value.to_string())
                }
                None => Body::empty(),
            };

            let response = self.send(builder.body(body).unwrap()).await;
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let value = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap_or(Value::Null)
            };
            (status, value)
        }

        async fn register_and_login(&self, email: &str) -> String {
            let (status, _) = self
                .call(
                    "POST",
                    "/api/auth/register",
                    None,
                    Some(json!({
                        "email": email,
                        "full_name": "Test Reader",
                        "password": "secret123"
                    })),
                )
                .await;
            assert_eq!(status, StatusCode::OK);

            let (status, body) = self
                .call(
                    "POST",
                    "/api/auth/login",
                    None,
                    Some(json!({ "email": email, "password": "secret123" })),
                )
                .await;
            assert_eq!(status, StatusCode::OK);
            body["access_token"].as_str().unwrap().to_string()
        }

        async fn admin_token(&self) -> String {
            let token = self.register_and_login("admin@example.com").await;
            let admin = self
                .store
                .get_user_by_email("admin@example.com")
                .unwrap()
                .unwrap();
            self.store.set_admin(admin.user_id, true).unwrap();
            token
        }

        async fn create_book(&self, admin: &str, title: &str, price: f64) -> i64 {
            let (status, body) = self
                .call(
                    "POST",
                    "/api/books",
                    Some(admin),
                    Some(json!({
                        "title": title,
                        "price": price,
                        "publication_year": 1965,
                        "genre_name": "Science Fiction",
                        "author_names": ["Frank Herbert"]
                    })),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED);
            body["book_id"].as_i64().unwrap()
        }
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = create_test_app();

        let (status, _) = app.call("GET", "/health/live", None, None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = app.call("GET", "/health/ready", None, None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = app.call("GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["database"], "ok");
    }

    #[tokio::test]
    async fn test_register_login_me() {
        let app = create_test_app();
        let token = app.register_and_login("Reader@Example.com").await;

        let (status, body) = app.call("GET", "/api/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "reader@example.com");
        assert_eq!(body["is_admin"], false);
        assert!(body.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_and_short_password() {
        let app = create_test_app();
        app.register_and_login("dup@example.com").await;

        let (status, body) = app
            .call(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({
                    "email": "dup@example.com",
                    "full_name": "Another",
                    "password": "secret123"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"]["message"],
            "User with this email already exists"
        );

        let (status, _) = app
            .call(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({
                    "email": "short@example.com",
                    "full_name": "Shorty",
                    "password": "abc"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_with_form_body() {
        let app = create_test_app();
        app.register_and_login("form@example.com").await;

        let response = app
            .send(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/login")
                    .header("Content-Type", "application/x-www-form-urlencoded")
                    .body(Body::from(
                        "username=form%40example.com&password=secret123",
                    ))
                    .unwrap(),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let (status, body) = app
            .call(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": "form@example.com", "password": "wrong-one" })),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["message"], "Incorrect email or password");
    }

    #[tokio::test]
    async fn test_auth_required_and_admin_only() {
        let app = create_test_app();

        let response = app
            .send(
                Request::builder()
                    .uri("/api/cart")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get("www-authenticate").unwrap(),
            "Bearer"
        );

        let (status, _) = app
            .call("GET", "/api/auth/me", Some("not-a-token"), None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let token = app.register_and_login("plain@example.com").await;
        let (status, body) = app
            .call("GET", "/api/admin/users", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["message"], "Not enough permissions");
    }

    #[tokio::test]
    async fn test_book_crud_as_admin() {
        let app = create_test_app();
        let admin = app.admin_token().await;
        let book_id = app.create_book(&admin, "Dune", 12.5).await;

        let (status, body) = app
            .call("GET", &format!("/api/books/{}", book_id), None, None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Dune");
        assert_eq!(body["price"], json!(12.5));
        assert_eq!(body["genre_name"], "Science Fiction");
        assert_eq!(body["author_names"], json!(["Frank Herbert"]));

        let (status, body) = app
            .call(
                "PUT",
                &format!("/api/books/{}", book_id),
                Some(&admin),
                Some(json!({ "price": "9.99" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["price"], json!(9.99));

        let (status, body) = app.call("GET", "/api/dicts/genres", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["name"], "Science Fiction");

        let (status, _) = app
            .call("DELETE", &format!("/api/books/{}", book_id), Some(&admin), None)
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = app
            .call("GET", &format!("/api/books/{}", book_id), None, None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "Book not found");
    }

    #[tokio::test]
    async fn test_book_update_clears_optional_fields() {
        let app = create_test_app();
        let admin = app.admin_token().await;
        let book_id = app.create_book(&admin, "Dune", 12.5).await;
        let uri = format!("/api/books/{}", book_id);

        let (status, body) = app
            .call(
                "PUT",
                &uri,
                Some(&admin),
                Some(json!({ "pages": 412, "description": "Desert planet" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pages"], 412);
        assert_eq!(body["publication_year"], 1965);

        let (status, body) = app
            .call(
                "PUT",
                &uri,
                Some(&admin),
                Some(json!({
                    "title": "Dune",
                    "price": 12.5,
                    "publication_year": null,
                    "pages": null,
                    "description": null,
                    "genre_name": ""
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["publication_year"], Value::Null);
        assert_eq!(body["pages"], Value::Null);
        assert_eq!(body["description"], Value::Null);
        assert_eq!(body["genre_name"], Value::Null);

        let (_, body) = app.call("GET", &uri, None, None).await;
        assert_eq!(body["publication_year"], Value::Null);
        assert_eq!(body["author_names"], json!(["Frank Herbert"]));
    }

    #[tokio::test]
    async fn test_bad_query_and_body_use_error_envelope() {
        let app = create_test_app();

        let (status, body) = app
            .call("GET", "/api/books?order_by=cheapest", None, None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["message"].as_str().unwrap().contains("cheapest"));
        assert!(body["request_id"].is_string());

        let (status, body) = app
            .call("GET", "/api/books?min_price=lots", None, None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, body) = app
            .call(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({ "email": "reader@example.com", "password": "secret123" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["message"].as_str().unwrap().contains("full_name"));

        let request = Request::builder()
            .method("POST")
            .uri("/api/auth/register")
            .header("Content-Type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.send(request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_book_listing_filters() {
        let app = create_test_app();
        let admin = app.admin_token().await;
        app.create_book(&admin, "Dune", 12.5).await;
        app.create_book(&admin, "Dune Messiah", 8.0).await;
        app.create_book(&admin, "Hyperion", 15.0).await;

        let (status, body) = app
            .call("GET", "/api/books?q=dune&order_by=price_asc", None, None)
            .await;
        assert_eq!(status, StatusCode::OK);
        let titles: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["Dune Messiah", "Dune"]);

        let (_, body) = app
            .call("GET", "/api/books?min_price=10&limit=1", None, None)
            .await;
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (status, _) = app
            .call("GET", "/api/books?min_price=20&max_price=10", None, None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_cart_checkout_flow() {
        let app = create_test_app();
        let admin = app.admin_token().await;
        let book_id = app.create_book(&admin, "Dune", 12.5).await;
        let token = app.register_and_login("buyer@example.com").await;

        let (status, body) = app.call("POST", "/api/orders", Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Cart is empty");

        let (status, body) = app
            .call(
                "POST",
                "/api/cart/items",
                Some(&token),
                Some(json!({ "book_id": book_id, "quantity": 2 })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["items"][0]["quantity"], 2);

        let (status, body) = app
            .call(
                "POST",
                "/api/cart/items",
                Some(&token),
                Some(json!({ "book_id": 9999 })),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "Book not found");

        let (status, order) = app.call("POST", "/api/orders", Some(&token), None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(order["status"], "created");
        assert_eq!(order["total_amount"], json!(25.0));

        let (_, cart) = app.call("GET", "/api/cart", Some(&token), None).await;
        assert!(cart["items"].as_array().unwrap().is_empty());

        let order_id = order["order_id"].as_i64().unwrap();
        let (status, orders) = app.call("GET", "/api/orders", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(orders.as_array().unwrap().len(), 1);

        let other = app.register_and_login("other@example.com").await;
        let (status, _) = app
            .call("GET", &format!("/api/orders/{}", order_id), Some(&other), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app
            .call(
                "PATCH",
                &format!("/api/admin/orders/{}/status", order_id),
                Some(&admin),
                Some(json!({ "status": "lost" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = app
            .call(
                "PATCH",
                &format!("/api/admin/orders/{}/status", order_id),
                Some(&admin),
                Some(json!({ "status": "shipped" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "shipped");
    }

    #[tokio::test]
    async fn test_profile_password_and_addresses() {
        let app = create_test_app();
        let token = app.register_and_login("profile@example.com").await;

        let (status, body) = app
            .call(
                "PUT",
                "/api/users/me",
                Some(&token),
                Some(json!({
                    "email": "profile@example.com",
                    "full_name": "Renamed Reader",
                    "phone": "+7 (900) 123-45-67"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["full_name"], "Renamed Reader");

        let (status, body) = app
            .call(
                "POST",
                "/api/users/me/password",
                Some(&token),
                Some(json!({ "current_password": "nope", "new_password": "Better#pass1" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Current password is incorrect");

        let (status, body) = app
            .call(
                "POST",
                "/api/users/me/password",
                Some(&token),
                Some(json!({ "current_password": "secret123", "new_password": "Better#pass1" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["detail"], "Password updated successfully");

        let (status, first) = app
            .call(
                "POST",
                "/api/users/me/addresses",
                Some(&token),
                Some(json!({
                    "city": "Berlin",
                    "street": "Unter den Linden",
                    "house": "5",
                    "postal_code": "10117"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(first["is_default"], true);

        let (status, _) = app
            .call(
                "POST",
                "/api/users/me/addresses",
                Some(&token),
                Some(json!({
                    "city": "B",
                    "street": "Main",
                    "house": "1",
                    "postal_code": "10117"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let address_id = first["address_id"].as_i64().unwrap();
        let (status, _) = app
            .call(
                "DELETE",
                &format!("/api/users/me/addresses/{}", address_id),
                Some(&token),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, profile) = app.call("GET", "/api/users/me", Some(&token), None).await;
        assert!(profile["addresses"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_admin_dictionaries() {
        let app = create_test_app();
        let admin = app.admin_token().await;

        let (status, author) = app
            .call(
                "POST",
                "/api/admin/authors",
                Some(&admin),
                Some(json!({ "full_name": "Ursula K. Le Guin" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let author_id = author["author_id"].as_i64().unwrap();

        let (status, body) = app
            .call(
                "PATCH",
                &format!("/api/admin/authors/{}", author_id),
                Some(&admin),
                Some(json!({ "full_name": "Ursula Le Guin" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["full_name"], "Ursula Le Guin");

        let (status, _) = app
            .call(
                "PUT",
                &format!("/api/admin/authors/{}", author_id),
                Some(&admin),
                Some(json!({ "name": "U. K. Le Guin" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = app
            .call(
                "DELETE",
                &format!("/api/admin/authors/{}", author_id),
                Some(&admin),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, authors) = app.call("GET", "/api/admin/authors", Some(&admin), None).await;
        assert!(authors.as_array().unwrap().is_empty());

        let (status, users) = app.call("GET", "/api/admin/users", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(users[0]["created_at"].is_string());
    }

    #[tokio::test]
    async fn test_cover_upload_and_serving() {
        let app = create_test_app();
        let admin = app.admin_token().await;
        let book_id = app.create_book(&admin, "Dune", 12.5).await;

        let (status, book) = app
            .call(
                "POST",
                &format!("/api/admin/books/{}/cover", book_id),
                Some(&admin),
                Some(json!({ "filename": "dune.png", "content": "aGVsbG8gY292ZXI=" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let cover = book["cover_image"].as_str().unwrap().to_string();
        assert!(cover.starts_with("/static/covers/book_"));
        assert!(cover.ends_with(".png"));

        let response = app
            .send(Request::builder().uri(&cover).body(Body::empty()).unwrap())
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"hello cover");

        let (status, _) = app
            .call(
                "POST",
                &format!("/api/admin/books/{}/cover", book_id),
                Some(&admin),
                Some(json!({ "filename": "x.png", "content": "***" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .call(
                "POST",
                "/api/admin/books/9999/cover",
                Some(&admin),
                Some(json!({ "filename": "x.png", "content": "aGVsbG8=" })),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(app.dir.path().join("covers").exists());
    }

    #[tokio::test]
    async fn test_storefront_fallback_and_api_404() {
        let app = create_test_app();

        let response = app
            .send(
                Request::builder()
                    .uri("/books/42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("storefront"));

        let (status, body) = app.call("GET", "/api/nope", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }
}
