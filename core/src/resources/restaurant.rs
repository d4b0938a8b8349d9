use serde::Serialize;
use url::form_urlencoded::byte_serialize;

use crate::client::MenuHttpClient;
use crate::error::ApiError;
use crate::schema::registry::CREATE_RESTAURANT;
use crate::schema::to_instance;
use crate::transport::Transport;
use crate::types::{CreateRestaurantInput, MenuResult, QrCode, ResponseMessage, RestaurantResult, UploadResult};
use crate::upload::UploadPayload;
use crate::validator::{validate_alias, validate_coordinates, validate_schema, validate_upload_file};

/// `/restaurants` resource family.
pub struct Restaurants<'a, T> {
    http: &'a MenuHttpClient<T>,
}

impl<'a, T: Transport> Restaurants<'a, T> {
    pub fn new(http: &'a MenuHttpClient<T>) -> Self {
        Self { http }
    }

    pub fn get_restaurants(&self) -> Result<Vec<RestaurantResult>, ApiError> {
        self.http.get("/restaurants")
    }

    pub fn get_restaurant(&self, id: u64) -> Result<RestaurantResult, ApiError> {
        self.http.get(&format!("/restaurants/{id}"))
    }

    /// Look a restaurant up by its public alias. The alias is sent
    /// lower-cased.
    pub fn get_restaurant_by_alias(&self, alias: &str) -> Result<RestaurantResult, ApiError> {
        validate_alias(alias)?;
        self.http.get(&format!("/restaurants/{}/alias", alias.to_lowercase()))
    }

    /// Restaurants owned by the user the API key belongs to.
    pub fn get_by_owner(&self) -> Result<Vec<RestaurantResult>, ApiError> {
        self.http.get("/restaurants/owner")
    }

    pub fn search(&self, query: &str, limit: u32) -> Result<Vec<RestaurantResult>, ApiError> {
        let query: String = byte_serialize(query.as_bytes()).collect();
        self.http.get(&format!("/restaurants/search?query={query}&limit={limit}"))
    }

    /// Proximity search. `input` must carry `latitude` and `longitude`;
    /// it is forwarded unchanged once the coordinates check out.
    pub fn get_near_me<I: Serialize + ?Sized>(&self, input: &I) -> Result<Vec<RestaurantResult>, ApiError> {
        let instance = to_instance(input)?;
        validate_coordinates(&instance)?;
        self.http.post("/restaurants/near-me", &instance)
    }

    pub fn create(&self, input: &CreateRestaurantInput) -> Result<ResponseMessage, ApiError> {
        validate_schema(&CREATE_RESTAURANT, input)?;
        self.http.post("/restaurants", input)
    }

    pub fn update(&self, id: u64, input: &CreateRestaurantInput) -> Result<ResponseMessage, ApiError> {
        validate_schema(&CREATE_RESTAURANT, input)?;
        self.http.put(&format!("/restaurants/{id}"), input)
    }

    pub fn delete(&self, id: u64) -> Result<ResponseMessage, ApiError> {
        self.http.delete(&format!("/restaurants/{id}"))
    }

    /// Base64 PNG QR code linking to the restaurant's menu.
    pub fn get_qr_code(&self, id: u64) -> Result<QrCode, ApiError> {
        self.http.get(&format!("/restaurants/{id}/qrcode"))
    }

    pub fn get_menus(&self, id: u64) -> Result<Vec<MenuResult>, ApiError> {
        self.http.get(&format!("/restaurants/{id}/menus"))
    }

    /// Register a public alias. The server answers with the normalized
    /// alias in `message`.
    pub fn create_alias(&self, id: u64, alias: &str) -> Result<ResponseMessage, ApiError> {
        self.http.post(&format!("/restaurants/{id}/alias"), alias)
    }

    /// Upload the restaurant banner image.
    pub fn upload(&self, id: u64, image: UploadPayload) -> Result<UploadResult, ApiError> {
        validate_upload_file(&image)?;
        self.http.put_form(&format!("/restaurants/{id}/upload"), image.into_form())
    }
}
