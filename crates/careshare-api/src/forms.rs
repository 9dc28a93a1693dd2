//! Field validation for urlencoded form submissions.

use uuid::Uuid;

use crate::error::ApiError;

/// Trimmed value of a required field.
pub(crate) fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::validation(format!("{} is required", field)));
    }
    Ok(value)
}

/// Trimmed value of an optional field; blank counts as absent.
pub(crate) fn optional(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub(crate) fn email<'a>(field: &str, value: &'a str) -> Result<&'a str, ApiError> {
    let value = required(field, value)?;
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(value),
        _ => Err(ApiError::validation(format!("{} must be an email address", field))),
    }
}

pub(crate) fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

pub(crate) fn positive_quantity(field: &str, value: &str) -> Result<u32, ApiError> {
    match required(field, value)?.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ApiError::validation(format!("{} must be a positive whole number", field))),
    }
}

pub(crate) fn count(field: &str, value: &str) -> Result<u32, ApiError> {
    required(field, value)?
        .parse::<u32>()
        .map_err(|_| ApiError::validation(format!("{} must be a whole number", field)))
}

pub(crate) fn uuid(field: &str, value: &str) -> Result<Uuid, ApiError> {
    required(field, value)?
        .parse()
        .map_err(|_| ApiError::validation(format!("{} is not a valid id", field)))
}

/// Id taken from the URL. A value that is not a UUID names no row.
pub(crate) fn path_id(resource: &'static str, raw: &str) -> Result<Uuid, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::NotFound { resource })
}

pub(crate) fn optional_uuid(field: &str, value: Option<&str>) -> Result<Option<Uuid>, ApiError> {
    optional(value).map(|v| uuid(field, v)).transpose()
}

/// HTML checkbox: absent when unticked, "on" (or any value) when ticked.
pub(crate) fn checkbox(value: Option<&str>) -> bool {
    match optional(value) {
        None => false,
        Some(v) => !matches!(v.to_ascii_lowercase().as_str(), "false" | "off" | "0" | "no"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_trims_and_rejects_blank() {
        assert_eq!(required("title", "  Hello ").unwrap(), "Hello");
        let err = required("title", "   ").unwrap_err();
        assert_eq!(err.user_message(), "title is required");
    }

    #[test]
    fn quantities_must_be_positive_integers() {
        assert_eq!(positive_quantity("quantity", "50").unwrap(), 50);
        assert!(positive_quantity("quantity", "0").is_err());
        assert!(positive_quantity("quantity", "-3").is_err());
        assert!(positive_quantity("quantity", "2.5").is_err());
        assert_eq!(count("quantity", "0").unwrap(), 0);
    }

    #[test]
    fn checkbox_semantics() {
        assert!(checkbox(Some("on")));
        assert!(checkbox(Some("true")));
        assert!(!checkbox(Some("off")));
        assert!(!checkbox(Some("")));
        assert!(!checkbox(None));
    }

    #[test]
    fn emails_need_both_sides_of_the_at() {
        assert!(email("email", "a@b.org").is_ok());
        assert!(email("email", "@b.org").is_err());
        assert!(email("email", "plain").is_err());
        assert_eq!(normalize_email("  Sunrise@Example.ORG "), "sunrise@example.org");
    }

    #[test]
    fn malformed_path_ids_are_not_found() {
        let id = Uuid::new_v4();
        assert_eq!(path_id("Item", &id.to_string()).unwrap(), id);
        let err = path_id("Item", "42").unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
        assert_eq!(err.user_message(), "Item not found");
    }

    #[test]
    fn blank_optional_uuid_is_none() {
        assert_eq!(optional_uuid("category_id", Some("  ")).unwrap(), None);
        assert!(optional_uuid("category_id", Some("nope")).is_err());
    }
}
