use crate::client::MenuHttpClient;
use crate::error::ApiError;
use crate::schema::registry::{ADD_ALLERGEN, CREATE_MENU_ITEM};
use crate::transport::Transport;
use crate::types::{AddAllergenInput, AllergenResult, CreateMenuItemInput, MenuItemResult, ResponseMessage, UploadResult};
use crate::upload::UploadPayload;
use crate::validator::{validate_schema, validate_upload_file};

/// `/menu-item` resource family.
pub struct MenuItems<'a, T> {
    http: &'a MenuHttpClient<T>,
}

impl<'a, T: Transport> MenuItems<'a, T> {
    pub fn new(http: &'a MenuHttpClient<T>) -> Self {
        Self { http }
    }

    pub fn get_menu_item(&self, id: u64) -> Result<MenuItemResult, ApiError> {
        self.http.get(&format!("/menu-item/{id}"))
    }

    pub fn update(&self, id: u64, input: &CreateMenuItemInput) -> Result<ResponseMessage, ApiError> {
        validate_schema(&CREATE_MENU_ITEM, input)?;
        self.http.put(&format!("/menu-item/{id}"), input)
    }

    pub fn delete(&self, id: u64) -> Result<ResponseMessage, ApiError> {
        self.http.delete(&format!("/menu-item/{id}"))
    }

    pub fn add_allergen(&self, id: u64, input: &AddAllergenInput) -> Result<ResponseMessage, ApiError> {
        validate_schema(&ADD_ALLERGEN, input)?;
        self.http.post(&format!("/menu-item/{id}/allergens"), input)
    }

    pub fn get_allergens(&self, id: u64) -> Result<Vec<AllergenResult>, ApiError> {
        self.http.get(&format!("/menu-item/{id}/allergens"))
    }

    pub fn delete_allergen(&self, id: u64, allergen_id: u64) -> Result<ResponseMessage, ApiError> {
        self.http.delete(&format!("/menu-item/{id}/allergens/{allergen_id}"))
    }

    /// Upload the menu item display image.
    pub fn upload(&self, id: u64, image: UploadPayload) -> Result<UploadResult, ApiError> {
        validate_upload_file(&image)?;
        self.http.put_form(&format!("/menu-item/{id}/upload"), image.into_form())
    }
}
