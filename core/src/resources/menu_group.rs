use crate::client::MenuHttpClient;
use crate::error::ApiError;
use crate::schema::registry::{CREATE_MENU_GROUP, CREATE_MENU_ITEM};
use crate::transport::Transport;
use crate::types::{CreateMenuGroupInput, CreateMenuItemInput, MenuItemResult, ResponseMessage};
use crate::validator::validate_schema;

/// `/menu-group` resource family.
pub struct MenuGroups<'a, T> {
    http: &'a MenuHttpClient<T>,
}

impl<'a, T: Transport> MenuGroups<'a, T> {
    pub fn new(http: &'a MenuHttpClient<T>) -> Self {
        Self { http }
    }

    /// Create a menu item under the group.
    pub fn create_menu_item(&self, group_id: u64, input: &CreateMenuItemInput) -> Result<ResponseMessage, ApiError> {
        validate_schema(&CREATE_MENU_ITEM, input)?;
        self.http.post(&format!("/menu-group/{group_id}/menu-items"), input)
    }

    pub fn update(&self, group_id: u64, input: &CreateMenuGroupInput) -> Result<ResponseMessage, ApiError> {
        validate_schema(&CREATE_MENU_GROUP, input)?;
        self.http.put(&format!("/menu-group/{group_id}"), input)
    }

    /// Cascades to the group's menu items and their ingredients.
    pub fn delete(&self, group_id: u64) -> Result<ResponseMessage, ApiError> {
        self.http.delete(&format!("/menu-group/{group_id}"))
    }

    pub fn get_menu_items(&self, group_id: u64) -> Result<Vec<MenuItemResult>, ApiError> {
        self.http.get(&format!("/menu-group/{group_id}/menu-items"))
    }
}
