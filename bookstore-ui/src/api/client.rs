//! HTTP API Client
//!
//! Functions for communicating with the bookstore REST API.

use gloo_net::http::{Method, Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::fmt;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use super::types::{
    Address, AdminUser, Author, Book, BookForm, Cart, DictEntry, DictKind, Genre, NewAddress,
    Order, Profile, Publisher, TokenResponse, User,
};

/// Default API base URL, relative to the serving origin
pub const DEFAULT_API_BASE: &str = "/api";

const API_URL_KEY: &str = "bookstore_api_url";
const TOKEN_KEY: &str = "bookstore_token";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|window| window.local_storage().ok().flatten())
}

/// Get the API base URL from local storage or use default
pub fn get_api_base() -> String {
    let url = local_storage()
        .and_then(|storage| storage.get_item(API_URL_KEY).ok().flatten())
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
    // Normalize: remove trailing slash
    url.trim_end_matches('/').to_string()
}

/// Stored access token, if any
pub fn get_token() -> Option<String> {
    local_storage()
        .and_then(|storage| storage.get_item(TOKEN_KEY).ok().flatten())
        .filter(|token| !token.is_empty())
}

/// Store or clear the access token
pub fn set_token(token: Option<&str>) {
    if let Some(storage) = local_storage() {
        let _ = match token {
            Some(token) => storage.set_item(TOKEN_KEY, token),
            None => storage.remove_item(TOKEN_KEY),
        };
    }
}

// ============ Errors ============

/// Failed API call
#[derive(Clone, Debug, PartialEq)]
pub struct ApiError {
    /// HTTP status, absent for network failures
    pub status: Option<u16>,
    pub message: String,
}

impl ApiError {
    fn local(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(serde::Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    message: String,
}

// ============ Request plumbing ============

fn request(method: Method, path: &str) -> RequestBuilder {
    let builder = RequestBuilder::new(&format!("{}{}", get_api_base(), path)).method(method);
    match get_token() {
        Some(token) => builder.header("Authorization", &format!("Bearer {}", token)),
        None => builder,
    }
}

async fn send(request: Request) -> Result<Response, ApiError> {
    let response = request
        .send()
        .await
        .map_err(|e| ApiError::local(format!("Network error: {}", e)))?;

    if response.ok() {
        return Ok(response);
    }

    let status = response.status();
    let message = match response.json::<ErrorEnvelope>().await {
        Ok(envelope) => envelope.error.message,
        Err(_) => format!("Request failed with status {}", status),
    };
    Err(ApiError {
        status: Some(status),
        message,
    })
}

async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    response
        .json()
        .await
        .map_err(|e| ApiError::local(format!("Parse error: {}", e)))
}

async fn get_json<T: DeserializeOwned>(path: &str) -> Result<T, ApiError> {
    let request = request(Method::GET, path)
        .build()
        .map_err(|e| ApiError::local(format!("Request build error: {}", e)))?;
    parse(send(request).await?).await
}

async fn send_json<B: Serialize, T: DeserializeOwned>(
    method: Method,
    path: &str,
    body: &B,
) -> Result<T, ApiError> {
    let request = request(method, path)
        .json(body)
        .map_err(|e| ApiError::local(format!("Request build error: {}", e)))?;
    parse(send(request).await?).await
}

/// Request answered with 204 No Content
async fn send_empty(method: Method, path: &str) -> Result<(), ApiError> {
    let request = request(method, path)
        .build()
        .map_err(|e| ApiError::local(format!("Request build error: {}", e)))?;
    send(request).await.map(|_| ())
}

// ============ Auth ============

/// Log in with the password form; returns the access token
pub async fn login(email: &str, password: &str) -> Result<String, ApiError> {
    let form = format!(
        "username={}&password={}",
        urlencoding::encode(email),
        urlencoding::encode(password)
    );
    let request = request(Method::POST, "/auth/login")
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(form)
        .map_err(|e| ApiError::local(format!("Request build error: {}", e)))?;
    let token: TokenResponse = parse(send(request).await?).await?;
    Ok(token.access_token)
}

pub async fn register(
    email: &str,
    full_name: &str,
    phone: Option<&str>,
    password: &str,
) -> Result<User, ApiError> {
    let body = json!({
        "email": email,
        "full_name": full_name,
        "phone": phone,
        "password": password,
    });
    send_json(Method::POST, "/auth/register", &body).await
}

pub async fn fetch_me() -> Result<User, ApiError> {
    get_json("/auth/me").await
}

// ============ Catalog ============

/// List books; `query` comes from `Filters::to_query`
pub async fn fetch_books(query: &str) -> Result<Vec<Book>, ApiError> {
    get_json(&format!("/books?{}", query)).await
}

pub async fn fetch_book(book_id: i64) -> Result<Book, ApiError> {
    get_json(&format!("/books/{}", book_id)).await
}

pub async fn fetch_genres() -> Result<Vec<Genre>, ApiError> {
    get_json("/dicts/genres").await
}

pub async fn fetch_authors() -> Result<Vec<Author>, ApiError> {
    get_json("/dicts/authors").await
}

pub async fn fetch_publishers() -> Result<Vec<Publisher>, ApiError> {
    get_json("/dicts/publishers").await
}

// ============ Cart & Orders ============

pub async fn fetch_cart() -> Result<Cart, ApiError> {
    get_json("/cart").await
}

pub async fn add_to_cart(book_id: i64, quantity: i64) -> Result<Cart, ApiError> {
    let body = json!({ "book_id": book_id, "quantity": quantity });
    send_json(Method::POST, "/cart/items", &body).await
}

pub async fn update_cart_item(cart_item_id: i64, quantity: i64) -> Result<Cart, ApiError> {
    let body = json!({ "quantity": quantity });
    send_json(
        Method::PATCH,
        &format!("/cart/items/{}", cart_item_id),
        &body,
    )
    .await
}

pub async fn remove_cart_item(cart_item_id: i64) -> Result<(), ApiError> {
    send_empty(Method::DELETE, &format!("/cart/items/{}", cart_item_id)).await
}

/// Check out the cart
pub async fn place_order() -> Result<Order, ApiError> {
    send_json(Method::POST, "/orders", &json!({})).await
}

pub async fn fetch_orders() -> Result<Vec<Order>, ApiError> {
    get_json("/orders").await
}

// ============ Profile ============

pub async fn fetch_profile() -> Result<Profile, ApiError> {
    get_json("/users/me").await
}

pub async fn update_profile(
    email: &str,
    full_name: &str,
    phone: Option<&str>,
) -> Result<Profile, ApiError> {
    let body = json!({ "email": email, "full_name": full_name, "phone": phone });
    send_json(Method::PUT, "/users/me", &body).await
}

/// Returns the server's confirmation message
pub async fn change_password(current: &str, new: &str) -> Result<String, ApiError> {
    #[derive(serde::Deserialize)]
    struct Detail {
        detail: String,
    }

    let body = json!({ "current_password": current, "new_password": new });
    let detail: Detail = send_json(Method::POST, "/users/me/password", &body).await?;
    Ok(detail.detail)
}

pub async fn add_address(address: &NewAddress) -> Result<Address, ApiError> {
    send_json(Method::POST, "/users/me/addresses", address).await
}

pub async fn make_default_address(address_id: i64) -> Result<Address, ApiError> {
    let body = json!({ "is_default": true });
    send_json(
        Method::PUT,
        &format!("/users/me/addresses/{}", address_id),
        &body,
    )
    .await
}

pub async fn delete_address(address_id: i64) -> Result<(), ApiError> {
    send_empty(Method::DELETE, &format!("/users/me/addresses/{}", address_id)).await
}

// ============ Admin ============

pub async fn create_book(form: &BookForm) -> Result<Book, ApiError> {
    send_json(Method::POST, "/books", form).await
}

pub async fn update_book(book_id: i64, form: &BookForm) -> Result<Book, ApiError> {
    send_json(Method::PUT, &format!("/books/{}", book_id), form).await
}

pub async fn delete_book(book_id: i64) -> Result<(), ApiError> {
    send_empty(Method::DELETE, &format!("/books/{}", book_id)).await
}

/// Dictionary entries of one kind, sorted by name
pub async fn fetch_dict(kind: DictKind) -> Result<Vec<DictEntry>, ApiError> {
    Ok(match kind {
        DictKind::Genres => fetch_genres().await?.into_iter().map(Into::into).collect(),
        DictKind::Authors => fetch_authors().await?.into_iter().map(Into::into).collect(),
        DictKind::Publishers => fetch_publishers()
            .await?
            .into_iter()
            .map(Into::into)
            .collect(),
    })
}

fn dict_body(kind: DictKind, name: &str) -> serde_json::Value {
    let mut body = serde_json::Map::new();
    body.insert(kind.name_key().to_string(), name.into());
    serde_json::Value::Object(body)
}

pub async fn create_dict(kind: DictKind, name: &str) -> Result<(), ApiError> {
    let body = dict_body(kind, name);
    let _: serde_json::Value =
        send_json(Method::POST, &format!("/admin/{}", kind.path()), &body).await?;
    Ok(())
}

pub async fn rename_dict(kind: DictKind, id: i64, name: &str) -> Result<(), ApiError> {
    let body = dict_body(kind, name);
    let _: serde_json::Value = send_json(
        Method::PATCH,
        &format!("/admin/{}/{}", kind.path(), id),
        &body,
    )
    .await?;
    Ok(())
}

pub async fn delete_dict(kind: DictKind, id: i64) -> Result<(), ApiError> {
    send_empty(Method::DELETE, &format!("/admin/{}/{}", kind.path(), id)).await
}

pub async fn fetch_all_orders() -> Result<Vec<Order>, ApiError> {
    get_json("/admin/orders").await
}

pub async fn update_order_status(order_id: i64, status: &str) -> Result<Order, ApiError> {
    let body = json!({ "status": status });
    send_json(
        Method::PATCH,
        &format!("/admin/orders/{}/status", order_id),
        &body,
    )
    .await
}

pub async fn fetch_users() -> Result<Vec<AdminUser>, ApiError> {
    get_json("/admin/users").await
}

pub async fn set_user_admin(user_id: i64, is_admin: bool) -> Result<AdminUser, ApiError> {
    let body = json!({ "is_admin": is_admin });
    send_json(Method::PATCH, &format!("/admin/users/{}", user_id), &body).await
}

/// Upload a cover picked in a file input
pub async fn upload_cover(book_id: i64, file: &web_sys::File) -> Result<Book, ApiError> {
    let content = read_data_url(file).await?;
    let body = json!({ "filename": file.name(), "content": content });
    send_json(
        Method::POST,
        &format!("/admin/books/{}/cover", book_id),
        &body,
    )
    .await
}

/// Read a file as a `data:` URL
async fn read_data_url(file: &web_sys::File) -> Result<String, ApiError> {
    let reader = web_sys::FileReader::new()
        .map_err(|_| ApiError::local("File reading is not supported"))?;

    let promise = js_sys::Promise::new(&mut |resolve, reject| {
        let loaded = reader.clone();
        let onload = wasm_bindgen::closure::Closure::once_into_js(move || {
            let result = loaded.result().unwrap_or(JsValue::NULL);
            let _ = resolve.call1(&JsValue::NULL, &result);
        });
        let onerror = wasm_bindgen::closure::Closure::once_into_js(move || {
            let _ = reject.call0(&JsValue::NULL);
        });
        reader.set_onload(Some(onload.unchecked_ref()));
        reader.set_onerror(Some(onerror.unchecked_ref()));
    });

    reader
        .read_as_data_url(file)
        .map_err(|_| ApiError::local("Failed to read the cover file"))?;

    JsFuture::from(promise)
        .await
        .ok()
        .and_then(|value| value.as_string())
        .ok_or_else(|| ApiError::local("Failed to read the cover file"))
}
