//! Verify the validators against JSON test vectors stored in `test-vectors/`.
//!
//! Violations are compared as parsed JSON, so each vector states the exact
//! records a caller would see, in report order.

use serde_json::Value;
use whatsamenu_core::schema::registry::{
    ADD_ALLERGEN, CREATE_INGREDIENT, CREATE_MENU_GROUP, CREATE_MENU_ITEM, CREATE_RESTAURANT, CREATE_USER,
    RESET_PASSWORD, UPDATE_API_KEY,
};
use whatsamenu_core::schema::Schema;
use whatsamenu_core::validator::{validate_password, validate_schema};
use whatsamenu_core::ApiError;

fn schema_named(name: &str) -> &'static Schema {
    match name {
        "create_restaurant" => &CREATE_RESTAURANT,
        "create_menu_group" => &CREATE_MENU_GROUP,
        "create_menu_item" => &CREATE_MENU_ITEM,
        "create_ingredient" => &CREATE_INGREDIENT,
        "create_user" => &CREATE_USER,
        "reset_password" => &RESET_PASSWORD,
        "update_api_key" => &UPDATE_API_KEY,
        "add_allergen" => &ADD_ALLERGEN,
        other => panic!("unknown schema: {other}"),
    }
}

#[test]
fn schema_test_vectors() {
    let raw = include_str!("../../test-vectors/schema.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let schema = schema_named(case["schema"].as_str().unwrap());

        let actual = match validate_schema(schema, &case["input"]) {
            Ok(()) => Value::Array(Vec::new()),
            Err(ApiError::SchemaViolation(violations)) => serde_json::to_value(&violations).unwrap(),
            Err(other) => panic!("{name}: unexpected error: {other:?}"),
        };
        assert_eq!(actual, case["expected"], "{name}: violations");
    }
}

#[test]
fn password_test_vectors() {
    let raw = include_str!("../../test-vectors/password.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let password = case["password"].as_str().unwrap();

        match (validate_password(password), case["error"].as_str()) {
            (Ok(()), None) => {}
            (Err(ApiError::Validation(message)), Some(expected)) => assert_eq!(message, expected, "{name}"),
            (result, expected) => panic!("{name}: got {result:?}, expected {expected:?}"),
        }
    }
}
