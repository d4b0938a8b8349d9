//! In-memory stand-in for the WhatsAMenu HTTP API.
//!
//! Every route the client core calls is served from a [`Store`] behind a
//! `tokio` `RwLock`. All routes sit behind an `X-API-Key` check; keys must
//! carry the `WM.` prefix and must not have been disabled through
//! `PATCH /auth/api-keys/{alias}`. Failures answer `{"error": ...}`, writes
//! answer `{"message": ...}`.

pub mod store;

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{info, warn};
use uuid::Uuid;

pub use store::{Store, StoreError, DEFAULT_USER, MOCK_OTP};
use store::{
    AllergenView, ApiKeyView, Credentials, IngredientInput, KeyUpdate, MenuGroupInput, MenuGroupView, MenuItemInput,
    MenuItemView, MenuView, PasswordReset, RestaurantInput, RestaurantView,
};

pub const API_KEY_HEADER: &str = "x-api-key";
pub const API_KEY_PREFIX: &str = "WM.";

const UPLOAD_FIELD: &str = "fileData";
const DEFAULT_SEARCH_LIMIT: usize = 10;
const DEFAULT_RADIUS_KM: f64 = 5.0;

pub type Db = Arc<RwLock<Store>>;

/// API key of the current request, set by the auth middleware.
#[derive(Debug, Clone)]
pub struct Caller(pub String);

/// Error response with an `{"error": ...}` body.
#[derive(Debug)]
pub struct Rejection {
    status: StatusCode,
    message: String,
}

impl Rejection {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<StoreError> for Rejection {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(message) => Self::new(StatusCode::NOT_FOUND, message),
            StoreError::Conflict(message) => Self::new(StatusCode::CONFLICT, message),
            StoreError::Invalid(message) => Self::new(StatusCode::BAD_REQUEST, message),
            StoreError::Unauthorized(message) => Self::new(StatusCode::UNAUTHORIZED, message),
        }
    }
}

type Reply<T> = Result<Json<T>, Rejection>;

fn message(text: impl Into<String>) -> Json<Value> {
    Json(json!({ "message": text.into() }))
}

pub fn app() -> Router {
    app_with_store(Store::new())
}

pub fn app_with_store(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/restaurants", get(list_restaurants).post(create_restaurant))
        .route("/restaurants/owner", get(restaurants_by_owner))
        .route("/restaurants/search", get(search_restaurants))
        .route("/restaurants/near-me", post(restaurants_near_me))
        .route(
            "/restaurants/{id}",
            get(get_restaurant).put(update_restaurant).delete(delete_restaurant),
        )
        .route("/restaurants/{id}/qrcode", get(restaurant_qr_code))
        .route("/restaurants/{id}/menus", get(restaurant_menus))
        // `{id}` is the alias for GET and the numeric id for POST.
        .route("/restaurants/{id}/alias", get(restaurant_by_alias).post(create_alias))
        .route("/restaurants/{id}/upload", put(upload_restaurant_image))
        .route("/menu/{id}", get(get_menu).delete(delete_menu))
        .route("/menu/{id}/menu-group", post(create_menu_group))
        .route("/menu/{id}/menu-groups", get(menu_groups))
        .route("/menu-group/{id}", put(update_menu_group).delete(delete_menu_group))
        .route("/menu-group/{id}/menu-items", get(menu_items).post(create_menu_item))
        .route(
            "/menu-item/{id}",
            get(get_menu_item).put(update_menu_item).delete(delete_menu_item),
        )
        .route("/menu-item/{id}/allergens", get(item_allergens).post(add_item_allergen))
        .route("/menu-item/{id}/allergens/{allergen_id}", delete(remove_item_allergen))
        .route("/menu-item/{id}/upload", put(upload_menu_item_image))
        .route("/ingredients", post(create_ingredient))
        .route("/ingredients/{id}", put(update_ingredient).delete(delete_ingredient))
        .route("/ingredients/{id}/upload", put(upload_ingredient_image))
        .route("/allergens", get(list_allergens))
        .route("/allergens/{id}", get(get_allergen))
        .route("/auth/sign-up", post(sign_up))
        .route("/auth/sign-in", post(sign_in))
        .route("/auth/api-key", post(create_api_key))
        .route("/auth/api-keys", get(list_api_keys))
        .route("/auth/api-keys/{alias}", get(get_api_key).patch(update_api_key))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
        .route_layer(middleware::from_fn_with_state(db.clone(), require_api_key))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock server listening");
    }
    axum::serve(listener, app()).await
}

async fn require_api_key(State(db): State<Db>, mut request: Request, next: Next) -> Response {
    let key = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let key = match key {
        Some(key) if key.starts_with(API_KEY_PREFIX) => key,
        _ => {
            warn!(path = %request.uri().path(), "rejected request without a valid API key");
            return Rejection::new(StatusCode::UNAUTHORIZED, "missing or malformed API key").into_response();
        }
    };
    if db.read().await.key_is_disabled(&key) {
        warn!(path = %request.uri().path(), "rejected request with a disabled API key");
        return Rejection::new(StatusCode::UNAUTHORIZED, "API key is disabled").into_response();
    }

    request.extensions_mut().insert(Caller(key));
    next.run(request).await
}

// ---------------------------------------------------------------------------
// Restaurants
// ---------------------------------------------------------------------------

async fn list_restaurants(State(db): State<Db>) -> Json<Vec<RestaurantView>> {
    Json(db.read().await.list_restaurants())
}

async fn restaurants_by_owner(State(db): State<Db>, Extension(Caller(key)): Extension<Caller>) -> Json<Vec<RestaurantView>> {
    Json(db.read().await.restaurants_of(&key))
}

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    query: String,
    limit: Option<usize>,
}

async fn search_restaurants(State(db): State<Db>, Query(params): Query<SearchParams>) -> Json<Vec<RestaurantView>> {
    let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    Json(db.read().await.search(&params.query, limit))
}

/// Coordinates may arrive as numbers or numeric strings.
async fn restaurants_near_me(State(db): State<Db>, Json(input): Json<Value>) -> Reply<Vec<RestaurantView>> {
    let number = |field: &str| match input.get(field) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    let (Some(latitude), Some(longitude)) = (number("latitude"), number("longitude")) else {
        return Err(Rejection::new(StatusCode::BAD_REQUEST, "invalid GPS coordinates"));
    };
    let radius = number("radius").unwrap_or(DEFAULT_RADIUS_KM);
    Ok(Json(db.read().await.near(latitude, longitude, radius)))
}

async fn create_restaurant(
    State(db): State<Db>,
    Extension(Caller(key)): Extension<Caller>,
    Json(input): Json<RestaurantInput>,
) -> (StatusCode, Json<Value>) {
    db.write().await.create_restaurant(&key, input);
    (StatusCode::CREATED, message("restaurant created"))
}

async fn get_restaurant(State(db): State<Db>, Path(id): Path<u64>) -> Reply<RestaurantView> {
    Ok(Json(db.read().await.get_restaurant(id)?))
}

async fn update_restaurant(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<RestaurantInput>,
) -> Reply<Value> {
    db.write().await.update_restaurant(id, input)?;
    Ok(message("restaurant updated"))
}

async fn delete_restaurant(State(db): State<Db>, Path(id): Path<u64>) -> Reply<Value> {
    db.write().await.delete_restaurant(id)?;
    Ok(message("restaurant deleted"))
}

async fn restaurant_qr_code(State(db): State<Db>, Path(id): Path<u64>) -> Reply<Value> {
    let image_uri = db.read().await.qr_code(id)?;
    Ok(Json(json!({ "imageUri": image_uri })))
}

async fn restaurant_menus(State(db): State<Db>, Path(id): Path<u64>) -> Reply<Vec<MenuView>> {
    Ok(Json(db.read().await.menus_of(id)?))
}

async fn restaurant_by_alias(State(db): State<Db>, Path(alias): Path<String>) -> Reply<RestaurantView> {
    Ok(Json(db.read().await.restaurant_by_alias(&alias)?))
}

async fn create_alias(State(db): State<Db>, Path(id): Path<String>, Json(alias): Json<String>) -> Reply<Value> {
    let id: u64 = id
        .parse()
        .map_err(|_| Rejection::new(StatusCode::BAD_REQUEST, format!("invalid restaurant id: {id}")))?;
    let alias = db.write().await.set_alias(id, &alias)?;
    Ok(message(alias))
}

async fn upload_restaurant_image(State(db): State<Db>, Path(id): Path<u64>, multipart: Multipart) -> Reply<Value> {
    let extension = read_image(multipart).await?;
    let path = db.write().await.set_restaurant_image(id, extension)?;
    Ok(Json(json!({ "data": path })))
}

// ---------------------------------------------------------------------------
// Menus, groups, items
// ---------------------------------------------------------------------------

async fn get_menu(State(db): State<Db>, Path(id): Path<u64>) -> Reply<Vec<MenuView>> {
    Ok(Json(vec![db.read().await.get_menu(id)?]))
}

async fn delete_menu(State(db): State<Db>, Path(id): Path<u64>) -> Reply<Value> {
    db.write().await.delete_menu(id)?;
    Ok(message("menu deleted"))
}

async fn create_menu_group(
    State(db): State<Db>,
    Path(menu_id): Path<u64>,
    Json(input): Json<MenuGroupInput>,
) -> Result<(StatusCode, Json<Value>), Rejection> {
    db.write().await.create_menu_group(menu_id, input)?;
    Ok((StatusCode::CREATED, message("menu group created")))
}

async fn menu_groups(State(db): State<Db>, Path(menu_id): Path<u64>) -> Reply<Vec<MenuGroupView>> {
    Ok(Json(db.read().await.menu_groups_of(menu_id)?))
}

async fn update_menu_group(State(db): State<Db>, Path(id): Path<u64>, Json(input): Json<MenuGroupInput>) -> Reply<Value> {
    db.write().await.update_menu_group(id, input)?;
    Ok(message("menu group updated"))
}

async fn delete_menu_group(State(db): State<Db>, Path(id): Path<u64>) -> Reply<Value> {
    db.write().await.delete_menu_group(id)?;
    Ok(message("menu group deleted"))
}

async fn create_menu_item(
    State(db): State<Db>,
    Path(group_id): Path<u64>,
    Json(input): Json<MenuItemInput>,
) -> Result<(StatusCode, Json<Value>), Rejection> {
    db.write().await.create_menu_item(group_id, input)?;
    Ok((StatusCode::CREATED, message("menu item created")))
}

async fn menu_items(State(db): State<Db>, Path(group_id): Path<u64>) -> Reply<Vec<MenuItemView>> {
    Ok(Json(db.read().await.menu_items_of(group_id)?))
}

async fn get_menu_item(State(db): State<Db>, Path(id): Path<u64>) -> Reply<MenuItemView> {
    Ok(Json(db.read().await.get_menu_item(id)?))
}

async fn update_menu_item(State(db): State<Db>, Path(id): Path<u64>, Json(input): Json<MenuItemInput>) -> Reply<Value> {
    db.write().await.update_menu_item(id, input)?;
    Ok(message("menu item updated"))
}

async fn delete_menu_item(State(db): State<Db>, Path(id): Path<u64>) -> Reply<Value> {
    db.write().await.delete_menu_item(id)?;
    Ok(message("menu item deleted"))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AllergenRef {
    allergen_id: String,
}

async fn add_item_allergen(State(db): State<Db>, Path(id): Path<u64>, Json(input): Json<AllergenRef>) -> Reply<Value> {
    db.write().await.add_item_allergen(id, &input.allergen_id)?;
    Ok(message("allergen added"))
}

async fn item_allergens(State(db): State<Db>, Path(id): Path<u64>) -> Reply<Vec<AllergenView>> {
    Ok(Json(db.read().await.item_allergens(id)?))
}

async fn remove_item_allergen(State(db): State<Db>, Path((id, allergen_id)): Path<(u64, u64)>) -> Reply<Value> {
    db.write().await.remove_item_allergen(id, allergen_id)?;
    Ok(message("allergen removed"))
}

async fn upload_menu_item_image(State(db): State<Db>, Path(id): Path<u64>, multipart: Multipart) -> Reply<Value> {
    let extension = read_image(multipart).await?;
    let path = db.write().await.set_menu_item_image(id, extension)?;
    Ok(Json(json!({ "data": path })))
}

// ---------------------------------------------------------------------------
// Ingredients, allergens
// ---------------------------------------------------------------------------

async fn create_ingredient(
    State(db): State<Db>,
    Json(input): Json<IngredientInput>,
) -> Result<(StatusCode, Json<Value>), Rejection> {
    db.write().await.create_ingredient(input)?;
    Ok((StatusCode::CREATED, message("ingredient created")))
}

async fn update_ingredient(State(db): State<Db>, Path(id): Path<u64>, Json(input): Json<IngredientInput>) -> Reply<Value> {
    db.write().await.update_ingredient(id, input)?;
    Ok(message("ingredient updated"))
}

async fn delete_ingredient(State(db): State<Db>, Path(id): Path<u64>) -> Reply<Value> {
    db.write().await.delete_ingredient(id)?;
    Ok(message("ingredient deleted"))
}

async fn upload_ingredient_image(State(db): State<Db>, Path(id): Path<u64>, multipart: Multipart) -> Reply<Value> {
    let extension = read_image(multipart).await?;
    let path = db.write().await.set_ingredient_image(id, extension)?;
    Ok(Json(json!({ "data": path })))
}

async fn list_allergens(State(db): State<Db>) -> Json<Vec<AllergenView>> {
    Json(db.read().await.list_allergens())
}

async fn get_allergen(State(db): State<Db>, Path(id): Path<u64>) -> Reply<AllergenView> {
    Ok(Json(db.read().await.get_allergen(id)?))
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

async fn sign_up(State(db): State<Db>, Json(input): Json<Credentials>) -> Result<(StatusCode, Json<Value>), Rejection> {
    let email = input.email.clone();
    db.write().await.sign_up(input)?;
    Ok((StatusCode::CREATED, message(format!("user created: {email}"))))
}

async fn sign_in(State(db): State<Db>, Json(input): Json<Credentials>) -> Reply<Value> {
    let token = db.read().await.sign_in(&input)?;
    Ok(Json(json!({ "token": token })))
}

#[derive(Deserialize)]
struct KeyRequest {
    name: Option<String>,
}

async fn create_api_key(
    State(db): State<Db>,
    Extension(Caller(key)): Extension<Caller>,
    Json(input): Json<KeyRequest>,
) -> (StatusCode, Json<Value>) {
    let api_key = db.write().await.issue_key(&key, input.name);
    (StatusCode::CREATED, Json(json!({ "apiKey": api_key })))
}

async fn list_api_keys(State(db): State<Db>, Extension(Caller(key)): Extension<Caller>) -> Json<Vec<ApiKeyView>> {
    Json(db.read().await.list_keys(&key))
}

async fn get_api_key(State(db): State<Db>, Path(alias): Path<Uuid>) -> Reply<ApiKeyView> {
    Ok(Json(db.read().await.get_key(alias)?))
}

async fn update_api_key(State(db): State<Db>, Path(alias): Path<Uuid>, Json(input): Json<KeyUpdate>) -> Reply<ApiKeyView> {
    Ok(Json(db.write().await.update_key(alias, input)?))
}

/// Always answers the same way so callers cannot probe for accounts.
async fn forgot_password(State(db): State<Db>, Json(email): Json<String>) -> Json<Value> {
    db.write().await.forgot_password(&email);
    message(format!("a one-time PIN has been sent to {email}"))
}

async fn reset_password(State(db): State<Db>, Json(input): Json<PasswordReset>) -> Reply<Value> {
    db.write().await.reset_password(input)?;
    Ok(message("password reset"))
}

// ---------------------------------------------------------------------------
// Uploads
// ---------------------------------------------------------------------------

/// Pull the `fileData` part out of the form and map its media type to a
/// file extension.
async fn read_image(mut multipart: Multipart) -> Result<&'static str, Rejection> {
    let bad_request = |message: String| Rejection::new(StatusCode::BAD_REQUEST, message);
    while let Some(field) = multipart.next_field().await.map_err(|e| bad_request(e.to_string()))? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let extension = match field.content_type() {
            Some("image/png") => "png",
            Some("image/jpeg") | Some("image/jpg") => "jpg",
            other => return Err(bad_request(format!("unsupported media type: {}", other.unwrap_or("none")))),
        };
        let bytes = field.bytes().await.map_err(|e| bad_request(e.to_string()))?;
        if bytes.is_empty() {
            return Err(bad_request("empty upload".to_string()));
        }
        return Ok(extension);
    }
    Err(bad_request(format!("missing form field: {UPLOAD_FIELD}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_statuses() {
        let cases = [
            (StoreError::NotFound("menu not found"), StatusCode::NOT_FOUND),
            (StoreError::Conflict("taken".to_string()), StatusCode::CONFLICT),
            (StoreError::Invalid("bad".to_string()), StatusCode::BAD_REQUEST),
            (StoreError::Unauthorized("no".to_string()), StatusCode::UNAUTHORIZED),
        ];
        for (err, status) in cases {
            assert_eq!(Rejection::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn restaurant_input_defaults_line2() {
        let input: RestaurantInput = serde_json::from_value(json!({
            "line1": "1 Long Street",
            "city": "Cape Town",
            "state": "WESTERN_CAPE",
            "latitude": -33.9,
            "longitude": 18.4,
            "name": "Mzansi",
            "summary": "a place that serves food"
        }))
        .unwrap();
        assert_eq!(input.line2, "");
        assert!(input.country.is_none());
    }

    #[test]
    fn key_update_requires_status() {
        let result: Result<KeyUpdate, _> = serde_json::from_value(json!({ "name": "ci" }));
        assert!(result.is_err());
    }
}
