//! One schema per input DTO.
//!
//! Field declaration order here is the order in which violations are
//! reported.

use std::sync::LazyLock;

use super::{FieldSchema, FieldType, Schema};
use crate::types::Province;

pub static CREATE_RESTAURANT: LazyLock<Schema> = LazyLock::new(|| {
    Schema::object()
        .strict()
        .field(FieldSchema::string("line1").required().min_length(1))
        .field(FieldSchema::string("line2").required())
        .field(FieldSchema::string("city").required().min_length(1))
        .field(FieldSchema::string("country"))
        .field(FieldSchema::string("state").required().one_of(Province::KEYS))
        .field(FieldSchema::number("latitude").required())
        .field(FieldSchema::number("longitude").required())
        .field(FieldSchema::string("name").required().min_length(1))
        .field(FieldSchema::string("summary").required().min_length(10))
});

pub static CREATE_MENU_GROUP: LazyLock<Schema> = LazyLock::new(|| {
    Schema::object()
        .field(FieldSchema::string("name").required().min_length(1))
        .field(FieldSchema::string("summary").nullable())
});

pub static CREATE_MENU_ITEM: LazyLock<Schema> = LazyLock::new(|| {
    Schema::object()
        .field(FieldSchema::string("name").required().min_length(1))
        .field(FieldSchema::string("summary").required().min_length(1))
        .field(FieldSchema::string("description").nullable())
        .field(FieldSchema::number("price").nullable())
        .field(FieldSchema::array_of("allergens", FieldType::String).nullable())
});

pub static CREATE_INGREDIENT: LazyLock<Schema> = LazyLock::new(|| {
    Schema::object()
        .strict()
        .field(FieldSchema::string("name").required().min_length(1))
        .field(FieldSchema::integer("menuItemId").required().minimum(1.0))
});

pub static CREATE_USER: LazyLock<Schema> = LazyLock::new(|| {
    Schema::object()
        .field(FieldSchema::string("email").required().min_length(6))
        .field(FieldSchema::string("password").required().min_length(8))
});

pub static RESET_PASSWORD: LazyLock<Schema> = LazyLock::new(|| {
    Schema::object()
        .field(FieldSchema::string("email").required().min_length(6))
        .field(FieldSchema::string("password").required().min_length(8))
        .field(FieldSchema::string("otp").required().min_length(6))
});

pub static UPDATE_API_KEY: LazyLock<Schema> = LazyLock::new(|| {
    Schema::object()
        .strict()
        .field(FieldSchema::string("name").nullable())
        .field(FieldSchema::string("status").required().one_of(&["ENABLE", "DISABLE"]))
});

pub static ADD_ALLERGEN: LazyLock<Schema> = LazyLock::new(|| {
    Schema::object()
        .strict()
        .field(FieldSchema::string("allergenId").required().min_length(1))
});

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::schema::compile;

    fn violations(schema: &Schema, input: serde_json::Value) -> Vec<crate::schema::Violation> {
        compile(schema).unwrap().evaluate(&input).into_vec()
    }

    fn restaurant() -> serde_json::Value {
        json!({
            "name": "Bird n Co",
            "summary": "Finest in the land",
            "line1": "11 Florida Road",
            "line2": "Morningside",
            "city": "Durban",
            "state": "KWAZULU_NATAL",
            "country": "South Africa",
            "latitude": 12.088,
            "longitude": 12.088
        })
    }

    #[test]
    fn restaurant_rejects_province_display_name() {
        let mut input = restaurant();
        input["state"] = json!("KwaZulu-Natal");
        let found = violations(&CREATE_RESTAURANT, input);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].instance_path, "/state");
        assert_eq!(found[0].schema_path, "#/properties/state/enum");
        assert_eq!(found[0].params["allowedValues"].as_array().map(Vec::len), Some(9));
    }

    #[test]
    fn restaurant_reports_city_before_name() {
        let mut input = restaurant();
        input["name"] = json!("");
        input["city"] = json!("");
        let found = violations(&CREATE_RESTAURANT, input);
        let paths: Vec<&str> = found.iter().map(|v| v.instance_path.as_str()).collect();
        assert_eq!(paths, vec!["/city", "/name"]);
    }

    #[test]
    fn restaurant_summary_needs_ten_characters() {
        let mut input = restaurant();
        input["summary"] = json!("Tasty");
        let found = violations(&CREATE_RESTAURANT, input);
        assert_eq!(found[0].message, "must NOT have fewer than 10 characters");
    }

    #[test]
    fn restaurant_rejects_unknown_fields() {
        let mut input = restaurant();
        input["phone"] = json!("031 000 0000");
        let found = violations(&CREATE_RESTAURANT, input);
        assert_eq!(found[0].keyword, "additionalProperties");
    }

    #[test]
    fn menu_item_accepts_extra_fields_and_null_optionals() {
        let input = json!({
            "name": "Butternut Soup",
            "summary": "Butter baked",
            "description": null,
            "price": null,
            "allergens": ["3", "6"],
            "spicy": true
        });
        assert!(violations(&CREATE_MENU_ITEM, input).is_empty());
    }

    #[test]
    fn ingredient_menu_item_id_must_be_positive_integer() {
        let found = violations(&CREATE_INGREDIENT, json!({"name": "Cheese", "menuItemId": 0}));
        assert_eq!(found[0].keyword, "minimum");
        assert_eq!(found[0].params, json!({"comparison": ">=", "limit": 1}));
        assert_eq!(found[0].message, "must be >= 1");

        let found = violations(&CREATE_INGREDIENT, json!({"name": "Cheese", "menuItemId": "12"}));
        assert_eq!(found[0].message, "must be integer");
    }

    #[test]
    fn reset_password_requires_all_fields() {
        let found = violations(&RESET_PASSWORD, json!({}));
        let missing: Vec<&str> = found
            .iter()
            .map(|v| v.params["missingProperty"].as_str().unwrap_or_default())
            .collect();
        assert_eq!(missing, vec!["email", "password", "otp"]);
    }

    #[test]
    fn api_key_status_is_case_sensitive() {
        let found = violations(&UPDATE_API_KEY, json!({"status": "disable"}));
        assert_eq!(found[0].keyword, "enum");
        assert!(violations(&UPDATE_API_KEY, json!({"status": "DISABLE", "name": null})).is_empty());
    }
}
