//! Single entry point bundling every resource client.

use crate::client::MenuHttpClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::resources::{Allergens, Auth, Ingredients, MenuGroups, MenuItems, Menus, Restaurants};
use crate::transport::{Transport, UreqTransport};

/// Owns one configured client and hands out borrowed resource clients.
///
/// ```no_run
/// use whatsamenu_core::{ClientConfig, MenuApi};
///
/// let api = MenuApi::from_config(&ClientConfig::new("http://localhost:3000", "WM.key"))?;
/// let allergens = api.allergens().get_allergens()?;
/// # Ok::<(), whatsamenu_core::ApiError>(())
/// ```
#[derive(Debug, Clone)]
pub struct MenuApi<T> {
    http: MenuHttpClient<T>,
}

impl MenuApi<UreqTransport> {
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Ok(Self::new(MenuHttpClient::from_config(config)?))
    }

    /// Build from `WHATSAMENU_*` environment variables.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_config(&ClientConfig::from_env()?)
    }
}

impl<T: Transport> MenuApi<T> {
    pub fn new(http: MenuHttpClient<T>) -> Self {
        Self { http }
    }

    pub fn http(&self) -> &MenuHttpClient<T> {
        &self.http
    }

    pub fn auth(&self) -> Auth<'_, T> {
        Auth::new(&self.http)
    }

    pub fn restaurants(&self) -> Restaurants<'_, T> {
        Restaurants::new(&self.http)
    }

    pub fn menus(&self) -> Menus<'_, T> {
        Menus::new(&self.http)
    }

    pub fn menu_groups(&self) -> MenuGroups<'_, T> {
        MenuGroups::new(&self.http)
    }

    pub fn menu_items(&self) -> MenuItems<'_, T> {
        MenuItems::new(&self.http)
    }

    pub fn ingredients(&self) -> Ingredients<'_, T> {
        Ingredients::new(&self.http)
    }

    pub fn allergens(&self) -> Allergens<'_, T> {
        Allergens::new(&self.http)
    }
}
