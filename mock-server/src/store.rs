//! In-memory state behind the mock API.
//!
//! Records keep numeric ids internally; the `*View` shapes are what goes on
//! the wire (camelCase, ids as strings), mirroring the real service.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One-time PIN accepted by `/auth/reset-password` after `/auth/forgot-password`.
pub const MOCK_OTP: &str = "123456";

/// Owner recorded for keys the mock did not issue itself.
pub const DEFAULT_USER: &str = "mock-user";

const QR_PLACEHOLDER: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

const SEEDED_ALLERGENS: &[(&str, &str)] = &[
    ("Celery", "celery stalks, leaves, seeds and celeriac"),
    ("Cereals containing gluten", "wheat, rye, barley and oats"),
    ("Crustaceans", "crabs, lobster, prawns and scampi"),
    ("Eggs", "eggs and egg powders"),
    ("Fish", "fish, fish sauces and fish oils"),
    ("Lupin", "lupin seeds and flour"),
    ("Milk", "milk, butter, cheese, cream and yoghurt"),
    ("Molluscs", "mussels, oysters, squid and snails"),
    ("Mustard", "liquid mustard, mustard powder and seeds"),
    ("Tree nuts", "almonds, hazelnuts, walnuts, cashews and pecans"),
    ("Peanuts", "peanuts, groundnuts and peanut oil"),
    ("Sesame seeds", "sesame seeds, tahini and sesame oil"),
    ("Soya", "soya beans, tofu and soya flour"),
    ("Sulphur dioxide", "sulphites in dried fruit, wine and beer"),
];

fn now() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressView {
    pub address_id: String,
    pub line1: String,
    pub line2: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantView {
    pub restaurant_id: String,
    pub name: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    pub image_url: String,
    pub address: AddressView,
    pub updated: String,
    pub created: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientView {
    pub ingredient_id: String,
    pub menu_item_id: String,
    pub name: String,
    pub image_url: String,
    pub updated: String,
    pub created: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemView {
    pub menu_item_id: String,
    pub menu_group_id: String,
    pub menu_id: String,
    pub name: String,
    pub summary: String,
    pub description: String,
    pub image_url: String,
    pub price: String,
    pub ingredients: Vec<IngredientView>,
    pub updated: String,
    pub created: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuGroupView {
    pub menu_group_id: String,
    pub menu_id: String,
    pub name: String,
    pub summary: String,
    pub items: Vec<MenuItemView>,
    pub updated: String,
    pub created: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuView {
    pub menu_id: String,
    pub restaurant_id: String,
    pub name: String,
    pub summary: String,
    pub menu_groups: Vec<MenuGroupView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllergenView {
    pub allergen_id: String,
    pub name: String,
    pub summary: String,
    pub updated: String,
    pub created: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyView {
    pub name: String,
    pub key_alias: Uuid,
    pub user_id: String,
    pub status: KeyStatus,
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RestaurantInput {
    pub line1: String,
    #[serde(default)]
    pub line2: String,
    pub city: String,
    pub state: String,
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
    pub summary: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MenuGroupInput {
    pub name: String,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MenuItemInput {
    pub name: String,
    pub summary: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub allergens: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientInput {
    pub name: String,
    pub menu_item_id: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordReset {
    pub email: String,
    pub password: String,
    pub otp: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeyStatus {
    Enabled,
    Disabled,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeyAction {
    Enable,
    Disable,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeyUpdate {
    pub name: Option<String>,
    pub status: KeyAction,
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Restaurant {
    owner: String,
    alias: Option<String>,
    image_url: String,
    input: RestaurantInput,
    created: String,
    updated: String,
}

#[derive(Debug, Clone)]
struct Menu {
    restaurant_id: u64,
    name: String,
    summary: String,
}

#[derive(Debug, Clone)]
struct MenuGroup {
    menu_id: u64,
    name: String,
    summary: String,
    created: String,
    updated: String,
}

#[derive(Debug, Clone)]
struct MenuItem {
    menu_group_id: u64,
    name: String,
    summary: String,
    description: String,
    price: Option<f64>,
    image_url: String,
    allergens: Vec<u64>,
    created: String,
    updated: String,
}

#[derive(Debug, Clone)]
struct Ingredient {
    menu_item_id: u64,
    name: String,
    image_url: String,
    created: String,
    updated: String,
}

#[derive(Debug, Clone)]
struct User {
    password: String,
    otp: Option<String>,
}

#[derive(Debug, Clone)]
struct ApiKeyRecord {
    key: String,
    name: String,
    user_id: String,
    status: KeyStatus,
}

/// Failure of a store operation, mapped to an HTTP status by the handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    NotFound(&'static str),
    Conflict(String),
    Invalid(String),
    Unauthorized(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub struct Store {
    next_id: u64,
    restaurants: BTreeMap<u64, Restaurant>,
    menus: BTreeMap<u64, Menu>,
    menu_groups: BTreeMap<u64, MenuGroup>,
    menu_items: BTreeMap<u64, MenuItem>,
    ingredients: BTreeMap<u64, Ingredient>,
    allergens: BTreeMap<u64, (String, String)>,
    users: BTreeMap<String, User>,
    api_keys: BTreeMap<Uuid, ApiKeyRecord>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Empty store with the allergen catalogue seeded as ids `1..=14`.
    pub fn new() -> Self {
        let allergens = SEEDED_ALLERGENS
            .iter()
            .zip(1u64..)
            .map(|(&(name, summary), id)| (id, (name.to_string(), summary.to_string())))
            .collect();
        Self {
            next_id: 1,
            restaurants: BTreeMap::new(),
            menus: BTreeMap::new(),
            menu_groups: BTreeMap::new(),
            menu_items: BTreeMap::new(),
            ingredients: BTreeMap::new(),
            allergens,
            users: BTreeMap::new(),
            api_keys: BTreeMap::new(),
        }
    }

    fn allocate(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // -- api keys -----------------------------------------------------------

    /// Keys the mock issued can be revoked; any other `WM.` key is accepted.
    pub fn key_is_disabled(&self, key: &str) -> bool {
        self.api_keys
            .values()
            .any(|record| record.key == key && record.status == KeyStatus::Disabled)
    }

    fn user_of_key(&self, key: &str) -> String {
        self.api_keys
            .values()
            .find(|record| record.key == key)
            .map(|record| record.user_id.clone())
            .unwrap_or_else(|| DEFAULT_USER.to_string())
    }

    pub fn issue_key(&mut self, caller: &str, name: Option<String>) -> String {
        let key = format!("WM.{}", Uuid::new_v4().simple());
        let record = ApiKeyRecord {
            key: key.clone(),
            name: name.unwrap_or_default(),
            user_id: self.user_of_key(caller),
            status: KeyStatus::Enabled,
        };
        self.api_keys.insert(Uuid::new_v4(), record);
        key
    }

    pub fn list_keys(&self, caller: &str) -> Vec<ApiKeyView> {
        let user = self.user_of_key(caller);
        self.api_keys
            .iter()
            .filter(|(_, record)| record.user_id == user)
            .map(|(alias, record)| key_view(*alias, record))
            .collect()
    }

    pub fn get_key(&self, alias: Uuid) -> StoreResult<ApiKeyView> {
        self.api_keys
            .get(&alias)
            .map(|record| key_view(alias, record))
            .ok_or(StoreError::NotFound("API key not found"))
    }

    pub fn update_key(&mut self, alias: Uuid, update: KeyUpdate) -> StoreResult<ApiKeyView> {
        let record = self
            .api_keys
            .get_mut(&alias)
            .ok_or(StoreError::NotFound("API key not found"))?;
        if let Some(name) = update.name {
            record.name = name;
        }
        record.status = match update.status {
            KeyAction::Enable => KeyStatus::Enabled,
            KeyAction::Disable => KeyStatus::Disabled,
        };
        Ok(key_view(alias, record))
    }

    // -- users --------------------------------------------------------------

    pub fn sign_up(&mut self, credentials: Credentials) -> StoreResult<()> {
        if self.users.contains_key(&credentials.email) {
            return Err(StoreError::Conflict(format!("user already exists: {}", credentials.email)));
        }
        self.users.insert(
            credentials.email,
            User {
                password: credentials.password,
                otp: None,
            },
        );
        Ok(())
    }

    pub fn sign_in(&self, credentials: &Credentials) -> StoreResult<String> {
        match self.users.get(&credentials.email) {
            Some(user) if user.password == credentials.password => Ok(Uuid::new_v4().to_string()),
            _ => Err(StoreError::Unauthorized("invalid email or password".to_string())),
        }
    }

    /// Unknown emails are silently ignored.
    pub fn forgot_password(&mut self, email: &str) {
        if let Some(user) = self.users.get_mut(email) {
            user.otp = Some(MOCK_OTP.to_string());
        }
    }

    pub fn reset_password(&mut self, reset: PasswordReset) -> StoreResult<()> {
        let user = self
            .users
            .get_mut(&reset.email)
            .filter(|user| user.otp.as_deref() == Some(reset.otp.as_str()))
            .ok_or_else(|| StoreError::Invalid("invalid or expired one-time PIN".to_string()))?;
        user.password = reset.password;
        user.otp = None;
        Ok(())
    }

    // -- restaurants --------------------------------------------------------

    /// Creates the restaurant together with an empty default menu.
    pub fn create_restaurant(&mut self, owner: &str, input: RestaurantInput) -> u64 {
        let id = self.allocate();
        let stamp = now();
        self.restaurants.insert(
            id,
            Restaurant {
                owner: owner.to_string(),
                alias: None,
                image_url: String::new(),
                input,
                created: stamp.clone(),
                updated: stamp,
            },
        );
        let menu_id = self.allocate();
        self.menus.insert(
            menu_id,
            Menu {
                restaurant_id: id,
                name: "Main Menu".to_string(),
                summary: String::new(),
            },
        );
        id
    }

    pub fn update_restaurant(&mut self, id: u64, input: RestaurantInput) -> StoreResult<()> {
        let restaurant = self.restaurant_mut(id)?;
        restaurant.input = input;
        restaurant.updated = now();
        Ok(())
    }

    pub fn delete_restaurant(&mut self, id: u64) -> StoreResult<()> {
        self.restaurants.remove(&id).ok_or(StoreError::NotFound("restaurant not found"))?;
        let menus: Vec<u64> = self
            .menus
            .iter()
            .filter(|(_, menu)| menu.restaurant_id == id)
            .map(|(menu_id, _)| *menu_id)
            .collect();
        for menu_id in menus {
            self.remove_menu(menu_id);
        }
        Ok(())
    }

    pub fn list_restaurants(&self) -> Vec<RestaurantView> {
        self.restaurants.keys().filter_map(|id| self.restaurant_view(*id)).collect()
    }

    pub fn restaurants_of(&self, owner: &str) -> Vec<RestaurantView> {
        self.restaurants
            .iter()
            .filter(|(_, restaurant)| restaurant.owner == owner)
            .filter_map(|(id, _)| self.restaurant_view(*id))
            .collect()
    }

    pub fn get_restaurant(&self, id: u64) -> StoreResult<RestaurantView> {
        self.restaurant_view(id).ok_or(StoreError::NotFound("restaurant not found"))
    }

    pub fn restaurant_by_alias(&self, alias: &str) -> StoreResult<RestaurantView> {
        let alias = alias.to_lowercase();
        self.restaurants
            .iter()
            .find(|(_, restaurant)| restaurant.alias.as_deref() == Some(alias.as_str()))
            .and_then(|(id, _)| self.restaurant_view(*id))
            .ok_or(StoreError::NotFound("restaurant not found"))
    }

    /// Stores the lower-cased alias and returns it.
    pub fn set_alias(&mut self, id: u64, alias: &str) -> StoreResult<String> {
        let alias = alias.to_lowercase();
        let taken = self
            .restaurants
            .iter()
            .any(|(other, restaurant)| *other != id && restaurant.alias.as_deref() == Some(alias.as_str()));
        if taken {
            return Err(StoreError::Conflict(format!("alias already in use: {alias}")));
        }
        self.restaurant_mut(id)?.alias = Some(alias.clone());
        Ok(alias)
    }

    /// Case-insensitive substring match on the name.
    pub fn search(&self, query: &str, limit: usize) -> Vec<RestaurantView> {
        let query = query.to_lowercase();
        self.restaurants
            .iter()
            .filter(|(_, restaurant)| restaurant.input.name.to_lowercase().contains(&query))
            .filter_map(|(id, _)| self.restaurant_view(*id))
            .take(limit)
            .collect()
    }

    /// Restaurants within `radius` kilometres, nearest first.
    pub fn near(&self, latitude: f64, longitude: f64, radius: f64) -> Vec<RestaurantView> {
        let mut found: Vec<RestaurantView> = self
            .restaurants
            .keys()
            .filter_map(|id| self.restaurant_view(*id))
            .filter_map(|mut view| {
                let distance = haversine_km(latitude, longitude, view.address.latitude, view.address.longitude);
                view.distance = Some(distance);
                (distance <= radius).then_some(view)
            })
            .collect();
        found.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal));
        found
    }

    pub fn qr_code(&self, id: u64) -> StoreResult<String> {
        self.restaurant_ref(id)?;
        Ok(QR_PLACEHOLDER.to_string())
    }

    pub fn set_restaurant_image(&mut self, id: u64, extension: &str) -> StoreResult<String> {
        let path = image_path("restaurants", id, extension);
        let restaurant = self.restaurant_mut(id)?;
        restaurant.image_url = path.clone();
        restaurant.updated = now();
        Ok(path)
    }

    fn restaurant_ref(&self, id: u64) -> StoreResult<&Restaurant> {
        self.restaurants.get(&id).ok_or(StoreError::NotFound("restaurant not found"))
    }

    fn restaurant_mut(&mut self, id: u64) -> StoreResult<&mut Restaurant> {
        self.restaurants.get_mut(&id).ok_or(StoreError::NotFound("restaurant not found"))
    }

    fn restaurant_view(&self, id: u64) -> Option<RestaurantView> {
        let restaurant = self.restaurants.get(&id)?;
        let input = &restaurant.input;
        Some(RestaurantView {
            restaurant_id: id.to_string(),
            name: input.name.clone(),
            summary: input.summary.clone(),
            distance: None,
            image_url: restaurant.image_url.clone(),
            address: AddressView {
                address_id: id.to_string(),
                line1: input.line1.clone(),
                line2: input.line2.clone(),
                city: input.city.clone(),
                state: input.state.clone(),
                country: input.country.clone().unwrap_or_else(|| "South Africa".to_string()),
                latitude: input.latitude,
                longitude: input.longitude,
            },
            updated: restaurant.updated.clone(),
            created: restaurant.created.clone(),
        })
    }

    // -- menus --------------------------------------------------------------

    pub fn menus_of(&self, restaurant_id: u64) -> StoreResult<Vec<MenuView>> {
        self.restaurant_ref(restaurant_id)?;
        Ok(self
            .menus
            .iter()
            .filter(|(_, menu)| menu.restaurant_id == restaurant_id)
            .map(|(id, menu)| self.menu_view(*id, menu))
            .collect())
    }

    pub fn get_menu(&self, id: u64) -> StoreResult<MenuView> {
        self.menus
            .get(&id)
            .map(|menu| self.menu_view(id, menu))
            .ok_or(StoreError::NotFound("menu not found"))
    }

    pub fn delete_menu(&mut self, id: u64) -> StoreResult<()> {
        if !self.menus.contains_key(&id) {
            return Err(StoreError::NotFound("menu not found"));
        }
        self.remove_menu(id);
        Ok(())
    }

    fn remove_menu(&mut self, id: u64) {
        self.menus.remove(&id);
        let groups: Vec<u64> = self
            .menu_groups
            .iter()
            .filter(|(_, group)| group.menu_id == id)
            .map(|(group_id, _)| *group_id)
            .collect();
        for group_id in groups {
            self.remove_menu_group(group_id);
        }
    }

    fn menu_view(&self, id: u64, menu: &Menu) -> MenuView {
        MenuView {
            menu_id: id.to_string(),
            restaurant_id: menu.restaurant_id.to_string(),
            name: menu.name.clone(),
            summary: menu.summary.clone(),
            menu_groups: self.groups_view(id),
        }
    }

    // -- menu groups --------------------------------------------------------

    pub fn create_menu_group(&mut self, menu_id: u64, input: MenuGroupInput) -> StoreResult<u64> {
        if !self.menus.contains_key(&menu_id) {
            return Err(StoreError::NotFound("menu not found"));
        }
        let id = self.allocate();
        let stamp = now();
        self.menu_groups.insert(
            id,
            MenuGroup {
                menu_id,
                name: input.name,
                summary: input.summary.unwrap_or_default(),
                created: stamp.clone(),
                updated: stamp,
            },
        );
        Ok(id)
    }

    pub fn menu_groups_of(&self, menu_id: u64) -> StoreResult<Vec<MenuGroupView>> {
        if !self.menus.contains_key(&menu_id) {
            return Err(StoreError::NotFound("menu not found"));
        }
        Ok(self.groups_view(menu_id))
    }

    pub fn update_menu_group(&mut self, id: u64, input: MenuGroupInput) -> StoreResult<()> {
        let group = self
            .menu_groups
            .get_mut(&id)
            .ok_or(StoreError::NotFound("menu group not found"))?;
        group.name = input.name;
        group.summary = input.summary.unwrap_or_default();
        group.updated = now();
        Ok(())
    }

    pub fn delete_menu_group(&mut self, id: u64) -> StoreResult<()> {
        if !self.menu_groups.contains_key(&id) {
            return Err(StoreError::NotFound("menu group not found"));
        }
        self.remove_menu_group(id);
        Ok(())
    }

    fn remove_menu_group(&mut self, id: u64) {
        self.menu_groups.remove(&id);
        let items: Vec<u64> = self
            .menu_items
            .iter()
            .filter(|(_, item)| item.menu_group_id == id)
            .map(|(item_id, _)| *item_id)
            .collect();
        for item_id in items {
            self.remove_menu_item(item_id);
        }
    }

    fn groups_view(&self, menu_id: u64) -> Vec<MenuGroupView> {
        self.menu_groups
            .iter()
            .filter(|(_, group)| group.menu_id == menu_id)
            .map(|(id, group)| MenuGroupView {
                menu_group_id: id.to_string(),
                menu_id: group.menu_id.to_string(),
                name: group.name.clone(),
                summary: group.summary.clone(),
                items: self.items_view(*id),
                updated: group.updated.clone(),
                created: group.created.clone(),
            })
            .collect()
    }

    // -- menu items ---------------------------------------------------------

    pub fn create_menu_item(&mut self, group_id: u64, input: MenuItemInput) -> StoreResult<u64> {
        if !self.menu_groups.contains_key(&group_id) {
            return Err(StoreError::NotFound("menu group not found"));
        }
        let allergens = self.allergen_ids(input.allergens.as_deref())?;
        let id = self.allocate();
        let stamp = now();
        self.menu_items.insert(
            id,
            MenuItem {
                menu_group_id: group_id,
                name: input.name,
                summary: input.summary,
                description: input.description.unwrap_or_default(),
                price: input.price,
                image_url: String::new(),
                allergens,
                created: stamp.clone(),
                updated: stamp,
            },
        );
        Ok(id)
    }

    pub fn menu_items_of(&self, group_id: u64) -> StoreResult<Vec<MenuItemView>> {
        if !self.menu_groups.contains_key(&group_id) {
            return Err(StoreError::NotFound("menu group not found"));
        }
        Ok(self.items_view(group_id))
    }

    pub fn get_menu_item(&self, id: u64) -> StoreResult<MenuItemView> {
        self.menu_items
            .get(&id)
            .map(|item| self.item_view(id, item))
            .ok_or(StoreError::NotFound("menu item not found"))
    }

    pub fn update_menu_item(&mut self, id: u64, input: MenuItemInput) -> StoreResult<()> {
        let allergens = self.allergen_ids(input.allergens.as_deref())?;
        let item = self.menu_item_mut(id)?;
        item.name = input.name;
        item.summary = input.summary;
        item.description = input.description.unwrap_or_default();
        item.price = input.price;
        if !allergens.is_empty() {
            item.allergens = allergens;
        }
        item.updated = now();
        Ok(())
    }

    pub fn delete_menu_item(&mut self, id: u64) -> StoreResult<()> {
        if !self.menu_items.contains_key(&id) {
            return Err(StoreError::NotFound("menu item not found"));
        }
        self.remove_menu_item(id);
        Ok(())
    }

    fn remove_menu_item(&mut self, id: u64) {
        self.menu_items.remove(&id);
        self.ingredients.retain(|_, ingredient| ingredient.menu_item_id != id);
    }

    pub fn set_menu_item_image(&mut self, id: u64, extension: &str) -> StoreResult<String> {
        let path = image_path("menu-items", id, extension);
        let item = self.menu_item_mut(id)?;
        item.image_url = path.clone();
        item.updated = now();
        Ok(path)
    }

    pub fn add_item_allergen(&mut self, id: u64, allergen_id: &str) -> StoreResult<()> {
        let requested = [allergen_id.to_string()];
        let allergens = self.allergen_ids(Some(&requested[..]))?;
        let item = self.menu_item_mut(id)?;
        for allergen_id in allergens {
            if !item.allergens.contains(&allergen_id) {
                item.allergens.push(allergen_id);
            }
        }
        Ok(())
    }

    pub fn item_allergens(&self, id: u64) -> StoreResult<Vec<AllergenView>> {
        let item = self.menu_items.get(&id).ok_or(StoreError::NotFound("menu item not found"))?;
        Ok(item.allergens.iter().filter_map(|a| self.allergen_view(*a)).collect())
    }

    pub fn remove_item_allergen(&mut self, id: u64, allergen_id: u64) -> StoreResult<()> {
        let item = self.menu_item_mut(id)?;
        let before = item.allergens.len();
        item.allergens.retain(|a| *a != allergen_id);
        if item.allergens.len() == before {
            return Err(StoreError::NotFound("allergen not found"));
        }
        Ok(())
    }

    fn menu_item_mut(&mut self, id: u64) -> StoreResult<&mut MenuItem> {
        self.menu_items.get_mut(&id).ok_or(StoreError::NotFound("menu item not found"))
    }

    fn allergen_ids(&self, ids: Option<&[String]>) -> StoreResult<Vec<u64>> {
        ids.unwrap_or_default()
            .iter()
            .map(|raw| {
                raw.parse::<u64>()
                    .ok()
                    .filter(|id| self.allergens.contains_key(id))
                    .ok_or(StoreError::NotFound("allergen not found"))
            })
            .collect()
    }

    fn items_view(&self, group_id: u64) -> Vec<MenuItemView> {
        self.menu_items
            .iter()
            .filter(|(_, item)| item.menu_group_id == group_id)
            .map(|(id, item)| self.item_view(*id, item))
            .collect()
    }

    fn item_view(&self, id: u64, item: &MenuItem) -> MenuItemView {
        let menu_id = self
            .menu_groups
            .get(&item.menu_group_id)
            .map(|group| group.menu_id.to_string())
            .unwrap_or_default();
        MenuItemView {
            menu_item_id: id.to_string(),
            menu_group_id: item.menu_group_id.to_string(),
            menu_id,
            name: item.name.clone(),
            summary: item.summary.clone(),
            description: item.description.clone(),
            image_url: item.image_url.clone(),
            price: item.price.map(|p| p.to_string()).unwrap_or_default(),
            ingredients: self
                .ingredients
                .iter()
                .filter(|(_, ingredient)| ingredient.menu_item_id == id)
                .map(|(ingredient_id, ingredient)| ingredient_view(*ingredient_id, ingredient))
                .collect(),
            updated: item.updated.clone(),
            created: item.created.clone(),
        }
    }

    // -- ingredients --------------------------------------------------------

    pub fn create_ingredient(&mut self, input: IngredientInput) -> StoreResult<u64> {
        if !self.menu_items.contains_key(&input.menu_item_id) {
            return Err(StoreError::NotFound("menu item not found"));
        }
        let id = self.allocate();
        let stamp = now();
        self.ingredients.insert(
            id,
            Ingredient {
                menu_item_id: input.menu_item_id,
                name: input.name,
                image_url: String::new(),
                created: stamp.clone(),
                updated: stamp,
            },
        );
        Ok(id)
    }

    pub fn update_ingredient(&mut self, id: u64, input: IngredientInput) -> StoreResult<()> {
        if !self.menu_items.contains_key(&input.menu_item_id) {
            return Err(StoreError::NotFound("menu item not found"));
        }
        let ingredient = self.ingredient_mut(id)?;
        ingredient.name = input.name;
        ingredient.menu_item_id = input.menu_item_id;
        ingredient.updated = now();
        Ok(())
    }

    pub fn delete_ingredient(&mut self, id: u64) -> StoreResult<()> {
        self.ingredients
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound("ingredient not found"))
    }

    pub fn set_ingredient_image(&mut self, id: u64, extension: &str) -> StoreResult<String> {
        let path = image_path("ingredients", id, extension);
        let ingredient = self.ingredient_mut(id)?;
        ingredient.image_url = path.clone();
        ingredient.updated = now();
        Ok(path)
    }

    fn ingredient_mut(&mut self, id: u64) -> StoreResult<&mut Ingredient> {
        self.ingredients.get_mut(&id).ok_or(StoreError::NotFound("ingredient not found"))
    }

    // -- allergens ----------------------------------------------------------

    pub fn list_allergens(&self) -> Vec<AllergenView> {
        self.allergens.keys().filter_map(|id| self.allergen_view(*id)).collect()
    }

    pub fn get_allergen(&self, id: u64) -> StoreResult<AllergenView> {
        self.allergen_view(id).ok_or(StoreError::NotFound("allergen not found"))
    }

    fn allergen_view(&self, id: u64) -> Option<AllergenView> {
        self.allergens.get(&id).map(|(name, summary)| AllergenView {
            allergen_id: id.to_string(),
            name: name.clone(),
            summary: summary.clone(),
            updated: String::new(),
            created: String::new(),
        })
    }
}

fn key_view(alias: Uuid, record: &ApiKeyRecord) -> ApiKeyView {
    ApiKeyView {
        name: record.name.clone(),
        key_alias: alias,
        user_id: record.user_id.clone(),
        status: record.status,
    }
}

fn ingredient_view(id: u64, ingredient: &Ingredient) -> IngredientView {
    IngredientView {
        ingredient_id: id.to_string(),
        menu_item_id: ingredient.menu_item_id.to_string(),
        name: ingredient.name.clone(),
        image_url: ingredient.image_url.clone(),
        updated: ingredient.updated.clone(),
        created: ingredient.created.clone(),
    }
}

fn image_path(folder: &str, id: u64, extension: &str) -> String {
    format!("public/{folder}/{id}-{}.{extension}", Uuid::new_v4().simple())
}

fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();
    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn restaurant(name: &str, latitude: f64, longitude: f64) -> RestaurantInput {
        RestaurantInput {
            line1: "1 Long Street".to_string(),
            line2: String::new(),
            city: "Cape Town".to_string(),
            state: "WESTERN_CAPE".to_string(),
            country: None,
            latitude,
            longitude,
            name: name.to_string(),
            summary: "a place that serves food".to_string(),
        }
    }

    #[test]
    fn allergens_are_seeded() {
        let store = Store::new();
        let allergens = store.list_allergens();
        assert_eq!(allergens.len(), 14);
        assert_eq!(allergens[0].allergen_id, "1");
        assert_eq!(allergens[0].name, "Celery");
    }

    #[test]
    fn creating_a_restaurant_seeds_a_menu() {
        let mut store = Store::new();
        let id = store.create_restaurant("WM.a", restaurant("Mzansi", -33.9, 18.4));
        let menus = store.menus_of(id).unwrap();
        assert_eq!(menus.len(), 1);
        assert_eq!(menus[0].restaurant_id, id.to_string());
    }

    #[test]
    fn deleting_a_restaurant_cascades() {
        let mut store = Store::new();
        let id = store.create_restaurant("WM.a", restaurant("Mzansi", -33.9, 18.4));
        let menu_id: u64 = store.menus_of(id).unwrap()[0].menu_id.parse().unwrap();
        let group_id = store
            .create_menu_group(menu_id, MenuGroupInput { name: "Starters".to_string(), summary: None })
            .unwrap();
        let item_id = store
            .create_menu_item(
                group_id,
                MenuItemInput {
                    name: "Samoosa".to_string(),
                    summary: "fried pastry".to_string(),
                    description: None,
                    price: Some(25.0),
                    allergens: Some(vec!["2".to_string()]),
                },
            )
            .unwrap();
        store
            .create_ingredient(IngredientInput { name: "potato".to_string(), menu_item_id: item_id })
            .unwrap();

        store.delete_restaurant(id).unwrap();
        assert!(store.menus.is_empty());
        assert!(store.menu_groups.is_empty());
        assert!(store.menu_items.is_empty());
        assert!(store.ingredients.is_empty());
    }

    #[test]
    fn aliases_are_lowercased_and_unique() {
        let mut store = Store::new();
        let a = store.create_restaurant("WM.a", restaurant("A", 0.0, 0.0));
        let b = store.create_restaurant("WM.a", restaurant("B", 0.0, 0.0));
        assert_eq!(store.set_alias(a, "Mzansi-Eats").unwrap(), "mzansi-eats");
        assert_eq!(store.restaurant_by_alias("MZANSI-EATS").unwrap().name, "A");
        assert!(matches!(store.set_alias(b, "mzansi-eats"), Err(StoreError::Conflict(_))));
    }

    #[test]
    fn near_filters_by_radius_and_sorts() {
        let mut store = Store::new();
        store.create_restaurant("WM.a", restaurant("Far", -26.2, 28.0));
        store.create_restaurant("WM.a", restaurant("Close", -33.92, 18.42));
        store.create_restaurant("WM.a", restaurant("Closest", -33.9, 18.4));
        let found = store.near(-33.9, 18.4, 10.0);
        let names: Vec<&str> = found.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Closest", "Close"]);
        assert_eq!(found[0].distance, Some(0.0));
    }

    #[test]
    fn reset_password_requires_issued_otp() {
        let mut store = Store::new();
        let credentials = Credentials { email: "chef@example.com".to_string(), password: "Secret-123".to_string() };
        store.sign_up(credentials.clone()).unwrap();

        let reset = PasswordReset {
            email: credentials.email.clone(),
            password: "Newpass-456".to_string(),
            otp: MOCK_OTP.to_string(),
        };
        assert!(matches!(store.reset_password(reset.clone()), Err(StoreError::Invalid(_))));

        store.forgot_password(&credentials.email);
        store.reset_password(reset).unwrap();
        assert!(store.sign_in(&credentials).is_err());
    }

    #[test]
    fn disabled_keys_are_reported() {
        let mut store = Store::new();
        let key = store.issue_key("WM.root", Some("ci".to_string()));
        assert!(!store.key_is_disabled(&key));
        let alias = store.list_keys(&key)[0].key_alias;
        store
            .update_key(alias, KeyUpdate { name: None, status: KeyAction::Disable })
            .unwrap();
        assert!(store.key_is_disabled(&key));
    }
}
