use crate::client::MenuHttpClient;
use crate::error::ApiError;
use crate::schema::registry::CREATE_MENU_GROUP;
use crate::transport::Transport;
use crate::types::{CreateMenuGroupInput, MenuGroupResult, MenuResult, ResponseMessage};
use crate::validator::validate_schema;

/// `/menu` resource family.
pub struct Menus<'a, T> {
    http: &'a MenuHttpClient<T>,
}

impl<'a, T: Transport> Menus<'a, T> {
    pub fn new(http: &'a MenuHttpClient<T>) -> Self {
        Self { http }
    }

    /// Full menu including its groups and their items.
    pub fn get_menu(&self, id: u64) -> Result<Vec<MenuResult>, ApiError> {
        self.http.get(&format!("/menu/{id}"))
    }

    pub fn delete(&self, id: u64) -> Result<ResponseMessage, ApiError> {
        self.http.delete(&format!("/menu/{id}"))
    }

    /// Add a category (menu group) to a menu.
    pub fn create_menu_group(&self, menu_id: u64, input: &CreateMenuGroupInput) -> Result<ResponseMessage, ApiError> {
        validate_schema(&CREATE_MENU_GROUP, input)?;
        self.http.post(&format!("/menu/{menu_id}/menu-group"), input)
    }

    pub fn get_menu_groups(&self, menu_id: u64) -> Result<Vec<MenuGroupResult>, ApiError> {
        self.http.get(&format!("/menu/{menu_id}/menu-groups"))
    }
}
