//! Client-side input checks run before any request is built.
//!
//! `validate_schema` is the generic path. The remaining functions are single
//! rules that stop at the first failure and report one message.

use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::schema::{compile, to_instance, Schema};
use crate::upload::UploadPayload;

/// Largest accepted upload, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 1024 * 1024;

pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/png", "image/jpeg", "image/jpg"];

const SPECIAL_CHARACTERS: &str = "-+_!@#$%^&*.,?";

/// Validate `input` against `schema`, reporting every violation at once.
pub fn validate_schema<T: Serialize + ?Sized>(schema: &Schema, input: &T) -> Result<(), ApiError> {
    let instance = to_instance(input)?;
    let violations = compile(schema)?.evaluate(&instance);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ApiError::SchemaViolation(violations))
    }
}

/// Password strength rules, checked in a fixed order.
///
/// Length is counted in UTF-16 code units, so a character outside the
/// Basic Multilingual Plane counts twice.
pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.encode_utf16().count() < 8 {
        return Err(ApiError::validation("must be at least 8 characters long"));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ApiError::validation("must contain at least 1 uppercase letter"));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(ApiError::validation("must contain at least 1 lowercase letter"));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ApiError::validation("must contain at least 1 number"));
    }
    if !password.chars().any(|c| SPECIAL_CHARACTERS.contains(c)) {
        return Err(ApiError::validation(format!(
            "must contain at least 1 special character: `{SPECIAL_CHARACTERS}`"
        )));
    }
    Ok(())
}

/// Media type is checked before size.
pub fn validate_upload_file(file: &UploadPayload) -> Result<(), ApiError> {
    if !ALLOWED_IMAGE_TYPES.contains(&file.media_type()) {
        return Err(ApiError::validation("invalid image mime-type"));
    }
    if file.size() > MAX_UPLOAD_BYTES {
        return Err(ApiError::validation("file too large. file must not exceed 1mb"));
    }
    Ok(())
}

/// Restaurant aliases are ASCII letters, digits and hyphens.
pub fn validate_alias(alias: &str) -> Result<(), ApiError> {
    let valid = !alias.is_empty() && alias.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(ApiError::validation(format!(
            "alias must not contain special characters: {alias}"
        )))
    }
}

/// Both axes are held to [-90, 90], longitude included.
const COORDINATE_LIMIT: f64 = 90.0;

/// Check the `latitude`/`longitude` fields of a proximity query.
///
/// Numbers and numeric strings are accepted. Every coordinate is parsed
/// before any range check runs.
pub fn validate_coordinates(input: &Value) -> Result<(), ApiError> {
    let latitude = parse_coordinate(input.get("latitude"));
    let longitude = parse_coordinate(input.get("longitude"));

    let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
        return Err(ApiError::validation("invalid GPS coordinates"));
    };

    let in_range = |c: f64| (-COORDINATE_LIMIT..=COORDINATE_LIMIT).contains(&c);
    if !in_range(latitude) || !in_range(longitude) {
        return Err(ApiError::validation("GPS coordinates out of range"));
    }
    Ok(())
}

fn parse_coordinate(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::schema::registry::CREATE_USER;

    fn message(result: Result<(), ApiError>) -> String {
        match result {
            Err(ApiError::Validation(message)) => message,
            other => panic!("expected a validation message, got {other:?}"),
        }
    }

    #[rstest]
    #[case::too_short("Pass", "must be at least 8 characters long")]
    #[case::no_uppercase("password", "must contain at least 1 uppercase letter")]
    #[case::no_lowercase("PASSWORD1", "must contain at least 1 lowercase letter")]
    #[case::no_number("Password", "must contain at least 1 number")]
    #[case::no_special("Passw0rd", "must contain at least 1 special character: `-+_!@#$%^&*.,?`")]
    fn password_rules_fail_in_order(#[case] password: &str, #[case] expected: &str) {
        assert_eq!(message(validate_password(password)), expected);
    }

    #[rstest]
    #[case("@Password01")]
    #[case("Sup3r-secret")]
    #[case("a.B1cdefg")]
    fn strong_passwords_pass(#[case] password: &str) {
        assert!(validate_password(password).is_ok());
    }

    #[test]
    fn password_length_counts_utf16_units() {
        assert_eq!(message(validate_password("Ä1a!ßçñ")), "must be at least 8 characters long");
        assert!(validate_password("😀😀Aa1!x").is_ok());
        assert_eq!(message(validate_password("😀Aa1!x")), "must be at least 8 characters long");
    }

    #[test]
    fn jpeg_under_limit_is_accepted() {
        let file = UploadPayload::new(vec![0; 2048], "image/jpeg");
        assert!(validate_upload_file(&file).is_ok());
    }

    #[test]
    fn exactly_one_megabyte_is_accepted() {
        let file = UploadPayload::new(vec![0; MAX_UPLOAD_BYTES], "image/png");
        assert!(validate_upload_file(&file).is_ok());
    }

    #[test]
    fn oversized_file_is_rejected() {
        let file = UploadPayload::new(vec![0; MAX_UPLOAD_BYTES + 10], "image/jpeg");
        assert_eq!(message(validate_upload_file(&file)), "file too large. file must not exceed 1mb");
    }

    #[test]
    fn mime_type_is_checked_before_size() {
        let file = UploadPayload::new(vec![0; MAX_UPLOAD_BYTES], "image/gif");
        assert_eq!(message(validate_upload_file(&file)), "invalid image mime-type");

        let file = UploadPayload::new(vec![0; MAX_UPLOAD_BYTES + 10], "image/gif");
        assert_eq!(message(validate_upload_file(&file)), "invalid image mime-type");
    }

    #[test]
    fn mime_type_match_is_exact() {
        let file = UploadPayload::new(vec![0; 10], "IMAGE/PNG");
        assert_eq!(message(validate_upload_file(&file)), "invalid image mime-type");
    }

    #[rstest]
    #[case("dukkah durban")]
    #[case("Florida's kitchen")]
    #[case("Boys & Boys")]
    #[case("")]
    fn aliases_with_special_characters_are_rejected(#[case] alias: &str) {
        assert_eq!(
            message(validate_alias(alias)),
            format!("alias must not contain special characters: {alias}")
        );
    }

    #[test]
    fn hyphenated_alias_is_accepted() {
        assert!(validate_alias("Dukkah-Durban").is_ok());
    }

    #[rstest]
    #[case::latitude_out_of_range(json!({"latitude": -100.182737, "longitude": 19.1928373}))]
    #[case::longitude_beyond_ninety(json!({"latitude": 10.0, "longitude": 120.5}))]
    fn coordinates_out_of_range(#[case] input: Value) {
        assert_eq!(message(validate_coordinates(&input)), "GPS coordinates out of range");
    }

    #[rstest]
    #[case::word(json!({"latitude": "hello", "longitude": 19.19}))]
    #[case::missing(json!({"longitude": 19.19}))]
    #[case::null(json!({"latitude": 10.0, "longitude": null}))]
    #[case::parse_before_range(json!({"latitude": -100.0, "longitude": "east"}))]
    fn unparseable_coordinates(#[case] input: Value) {
        assert_eq!(message(validate_coordinates(&input)), "invalid GPS coordinates");
    }

    #[test]
    fn numeric_strings_are_parsed() {
        assert!(validate_coordinates(&json!({"latitude": "-32.18", "longitude": "19.19"})).is_ok());
        assert!(validate_coordinates(&json!({"latitude": -90, "longitude": 90})).is_ok());
    }

    #[test]
    fn schema_validation_wraps_violations() {
        let err = validate_schema(&CREATE_USER, &json!({"email": "a@b.c", "password": "x"})).unwrap_err();
        let violations = err.violations().unwrap();
        assert_eq!(violations.len(), 2);
        assert_eq!(violations.as_slice()[0].instance_path, "/email");
        assert_eq!(violations.as_slice()[1].instance_path, "/password");
    }

    #[test]
    fn schema_validation_passes_valid_input() {
        let input = json!({"email": "chef@whatsamenu.co.za", "password": "@Password01"});
        assert!(validate_schema(&CREATE_USER, &input).is_ok());
    }
}
