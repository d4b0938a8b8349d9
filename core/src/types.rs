//! Domain DTOs for the whatsamenu API.
//!
//! # Design
//! Inputs serialize to exactly the JSON the schema registry describes, so
//! the validator sees what the server will see. Results mirror the server's
//! camelCase payloads; ids arrive as strings. The mock-server crate defines
//! its own copies of these shapes and the integration tests catch drift.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// South African province, sent and received by its key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Province {
    EasternCape,
    FreeState,
    Gauteng,
    KwazuluNatal,
    Limpopo,
    Mpumalanga,
    NorthWest,
    NorthernCape,
    WesternCape,
}

impl Province {
    /// Wire keys in declaration order.
    pub const KEYS: &'static [&'static str] = &[
        "EASTERN_CAPE",
        "FREE_STATE",
        "GAUTENG",
        "KWAZULU_NATAL",
        "LIMPOPO",
        "MPUMALANGA",
        "NORTH_WEST",
        "NORTHERN_CAPE",
        "WESTERN_CAPE",
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Province::EasternCape => "Eastern Cape",
            Province::FreeState => "Free State",
            Province::Gauteng => "Gauteng",
            Province::KwazuluNatal => "KwaZulu-Natal",
            Province::Limpopo => "Limpopo",
            Province::Mpumalanga => "Mpumalanga",
            Province::NorthWest => "North West",
            Province::NorthernCape => "Northern Cape",
            Province::WesternCape => "Western Cape",
        }
    }
}

/// Creation/modification timestamps carried by most results.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateMetadata {
    #[serde(default)]
    pub updated: String,
    #[serde(default)]
    pub created: String,
}

/// Generic `{ "message": ... }` envelope returned by write operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResponseMessage {
    pub message: String,
}

// ---------------------------------------------------------------------------
// Restaurants
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub address_id: String,
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    pub state: Province,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantResult {
    pub restaurant_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Only set by the near-me search: distance from the queried point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(default)]
    pub image_url: String,
    pub address: Address,
    #[serde(flatten)]
    pub dates: DateMetadata,
}

/// Request payload for creating or updating a restaurant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateRestaurantInput {
    pub line1: String,
    pub line2: String,
    pub city: String,
    pub state: Province,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
    pub summary: String,
}

/// Proximity search around a GPS point. `radius` is in kilometres.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NearMeInput {
    pub latitude: f64,
    pub longitude: f64,
    pub radius: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QrCode {
    /// `data:image/png;base64,...`
    pub image_uri: String,
}

/// Result of a multipart upload: the stored file path, not a full URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadResult {
    pub data: String,
}

// ---------------------------------------------------------------------------
// Menus, groups, items
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MenuResult {
    pub menu_id: String,
    pub restaurant_id: String,
    pub name: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub menu_groups: Vec<MenuGroupResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MenuGroupResult {
    pub menu_group_id: String,
    pub menu_id: String,
    pub name: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub items: Option<Vec<MenuItemResult>>,
    #[serde(flatten)]
    pub dates: DateMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemResult {
    pub menu_item_id: String,
    pub menu_group_id: String,
    pub menu_id: String,
    pub name: String,
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    /// Price as formatted by the server, e.g. `"90"`.
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub ingredients: Option<Vec<IngredientResult>>,
    #[serde(flatten)]
    pub dates: DateMetadata,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CreateMenuGroupInput {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// A menu item always lives under a menu group.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CreateMenuItemInput {
    pub name: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Allergen ids, e.g. `["3", "6"]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergens: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AddAllergenInput {
    pub allergen_id: String,
}

// ---------------------------------------------------------------------------
// Ingredients, allergens
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IngredientResult {
    pub ingredient_id: String,
    pub menu_item_id: String,
    pub name: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(flatten)]
    pub dates: DateMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateIngredientInput {
    pub name: String,
    pub menu_item_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AllergenResult {
    pub allergen_id: String,
    pub name: String,
    #[serde(default)]
    pub summary: String,
    #[serde(flatten)]
    pub dates: DateMetadata,
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateUserInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResetPasswordInput {
    pub email: String,
    pub password: String,
    /// One-time PIN sent by `forgot_password`.
    pub otp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignInToken {
    pub token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateApiKeyInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewApiKey {
    pub api_key: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApiKeyStatus {
    Enabled,
    Disabled,
}

/// Requested transition for an API key. `Disable` revokes it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApiKeyAction {
    Enable,
    Disable,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    #[serde(default)]
    pub name: String,
    pub key_alias: Uuid,
    pub user_id: String,
    pub status: ApiKeyStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateApiKeyInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub status: ApiKeyAction,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn province_keys_match_serialized_form() {
        for (province, key) in [
            (Province::EasternCape, "EASTERN_CAPE"),
            (Province::KwazuluNatal, "KWAZULU_NATAL"),
            (Province::WesternCape, "WESTERN_CAPE"),
        ] {
            assert_eq!(serde_json::to_value(province).unwrap(), key);
            assert!(Province::KEYS.contains(&key));
        }
    }

    #[test]
    fn create_menu_item_omits_absent_optionals() {
        let input = CreateMenuItemInput {
            name: "Pasta".to_string(),
            summary: "Fresh".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json, serde_json::json!({"name": "Pasta", "summary": "Fresh"}));
    }

    #[test]
    fn ingredient_input_uses_camel_case() {
        let input = CreateIngredientInput {
            name: "Cheese".to_string(),
            menu_item_id: 1234,
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["menuItemId"], 1234);
    }

    #[test]
    fn restaurant_result_reads_flattened_dates() {
        let raw = r#"{
            "restaurantId": "5",
            "name": "Dukkah",
            "imageUrl": "",
            "address": {
                "addressId": "9",
                "line1": "11 Florida Road",
                "city": "Durban",
                "state": "KWAZULU_NATAL",
                "country": "South Africa",
                "latitude": -29.8,
                "longitude": 31.0
            },
            "updated": "2023-04-02 16:06:20",
            "created": "2023-04-02 16:06:20"
        }"#;
        let restaurant: RestaurantResult = serde_json::from_str(raw).unwrap();
        assert_eq!(restaurant.address.state, Province::KwazuluNatal);
        assert_eq!(restaurant.dates.created, "2023-04-02 16:06:20");
        assert!(restaurant.distance.is_none());
    }

    #[test]
    fn api_key_status_uses_uppercase() {
        let raw = r#"{"name":"","keyAlias":"df6088dc-be04-4c9f-95d4-cf3ee0cbac63","userId":"18","status":"DISABLED"}"#;
        let key: ApiKey = serde_json::from_str(raw).unwrap();
        assert_eq!(key.status, ApiKeyStatus::Disabled);
        assert_eq!(serde_json::to_value(ApiKeyAction::Enable).unwrap(), "ENABLE");
    }
}
