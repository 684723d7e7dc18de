//! Validation for clients, operators, services, products and service records.

use uuid::Uuid;

use crate::error::CoreError;
use crate::types::Cents;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Shortest bookable catalog service.
pub const MIN_SERVICE_DURATION_MINUTES: i32 = 15;

/// Longest bookable catalog service.
pub const MAX_SERVICE_DURATION_MINUTES: i32 = 240;

/// Display colour applied to operators without a colour tag.
pub const DEFAULT_OPERATOR_COLOR: &str = "#6B7280";

/// Maximum length of a caller-supplied text id.
pub const MAX_SLUG_ID_LENGTH: usize = 64;

/// Prefix for generated operator ids.
pub const OPERATOR_ID_PREFIX: &str = "op";

/// Prefix for generated service ids.
pub const SERVICE_ID_PREFIX: &str = "srv";

// ---------------------------------------------------------------------------
// Generic helpers
// ---------------------------------------------------------------------------

/// Ensure a required text field is present after trimming.
pub fn require_text(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// Trim an optional text field, mapping blank input to `None`.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Require both halves of a person's name.
pub fn validate_person_name(first_name: &str, last_name: &str) -> Result<(), CoreError> {
    if first_name.trim().is_empty() || last_name.trim().is_empty() {
        return Err(CoreError::Validation(
            "First name and last name are required".into(),
        ));
    }
    Ok(())
}

/// Validate a caller-supplied text id such as `op-maria` or `srv-taglio`.
pub fn validate_slug_id(id: &str) -> Result<(), CoreError> {
    if id.is_empty() || id.len() > MAX_SLUG_ID_LENGTH {
        return Err(CoreError::Validation(format!(
            "Id must be between 1 and {MAX_SLUG_ID_LENGTH} characters"
        )));
    }
    if !id
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_')
    {
        return Err(CoreError::Validation(format!(
            "Invalid id '{id}'. Use lowercase letters, digits, '-' or '_'"
        )));
    }
    Ok(())
}

/// Use the supplied id when present, otherwise generate `<prefix>-<uuid>`.
pub fn resolve_text_id(prefix: &str, supplied: Option<&str>) -> Result<String, CoreError> {
    match supplied.map(str::trim).filter(|s| !s.is_empty()) {
        Some(id) => {
            validate_slug_id(id)?;
            Ok(id.to_string())
        }
        None => Ok(format!("{prefix}-{}", Uuid::new_v4().simple())),
    }
}

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

/// Validate an optional `#RRGGBB` colour tag.
pub fn validate_color_tag(color: Option<&str>) -> Result<(), CoreError> {
    let Some(color) = color else { return Ok(()) };
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].bytes().all(|b| b.is_ascii_hexdigit());
    if valid {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid colour '{color}'. Expected #RRGGBB"
        )))
    }
}

/// Colour to display for an operator.
pub fn display_color(color: Option<&str>) -> &str {
    color.unwrap_or(DEFAULT_OPERATOR_COLOR)
}

/// Message returned when an operator still has appointments.
pub fn operator_in_use_message(appointment_count: i64) -> String {
    format!("Cannot delete operator: {appointment_count} appointments are associated")
}

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

/// Validate a catalog service's duration.
pub fn validate_service_duration(minutes: i32) -> Result<(), CoreError> {
    if !(MIN_SERVICE_DURATION_MINUTES..=MAX_SERVICE_DURATION_MINUTES).contains(&minutes) {
        return Err(CoreError::Validation(format!(
            "Duration must be between {MIN_SERVICE_DURATION_MINUTES} and \
             {MAX_SERVICE_DURATION_MINUTES} minutes"
        )));
    }
    Ok(())
}

/// Validate a catalog service's price.
pub fn validate_service_price(price_cents: Cents) -> Result<(), CoreError> {
    if price_cents < 0 {
        return Err(CoreError::Validation("Price must not be negative".into()));
    }
    Ok(())
}

/// Validate the full service form.
pub fn validate_service(name: &str, price_cents: Cents, duration_minutes: i32) -> Result<(), CoreError> {
    require_text("Name", name)?;
    validate_service_price(price_cents)?;
    validate_service_duration(duration_minutes)
}

/// Message returned when a service is still linked to appointments.
pub fn service_in_use_message(link_count: i64) -> String {
    format!("Cannot delete service: it is used by {link_count} appointments")
}

// ---------------------------------------------------------------------------
// Products and service records
// ---------------------------------------------------------------------------

/// Products need a name and a strictly positive price.
pub fn validate_product(name: &str, price_cents: Cents) -> Result<(), CoreError> {
    if name.trim().is_empty() || price_cents <= 0 {
        return Err(CoreError::Validation("Name and price are required".into()));
    }
    Ok(())
}

/// A zero price is treated as missing.
pub fn validate_product_price(price_cents: Cents) -> Result<(), CoreError> {
    if price_cents <= 0 {
        return Err(CoreError::Validation(
            "Product price must be greater than zero".into(),
        ));
    }
    Ok(())
}

/// Quantity of a product used during a service record.
pub fn validate_quantity(quantity: i32) -> Result<(), CoreError> {
    if quantity <= 0 {
        return Err(CoreError::Validation(
            "Product quantity must be positive".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn person_name_requires_both_parts() {
        assert!(validate_person_name("Maria", "Rossi").is_ok());
        assert_matches!(validate_person_name("Maria", " "), Err(CoreError::Validation(_)));
        assert_matches!(validate_person_name("", "Rossi"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn optional_fields_are_trimmed() {
        assert_eq!(normalize_optional(Some("  333 1234 ".into())), Some("333 1234".into()));
        assert_eq!(normalize_optional(Some("   ".into())), None);
        assert_eq!(normalize_optional(None), None);
    }

    #[test]
    fn service_duration_bounds() {
        assert!(validate_service_duration(15).is_ok());
        assert!(validate_service_duration(240).is_ok());
        assert_matches!(validate_service_duration(14), Err(CoreError::Validation(_)));
        assert_matches!(validate_service_duration(241), Err(CoreError::Validation(_)));
    }

    #[test]
    fn service_form() {
        assert!(validate_service("Taglio", 2500, 30).is_ok());
        assert!(validate_service("Omaggio", 0, 15).is_ok());
        assert_matches!(validate_service("Taglio", -1, 30), Err(CoreError::Validation(_)));
        assert_matches!(validate_service("", 2500, 30), Err(CoreError::Validation(_)));
    }

    #[test]
    fn colour_tag_format() {
        assert!(validate_color_tag(None).is_ok());
        assert!(validate_color_tag(Some("#E91E63")).is_ok());
        assert_matches!(validate_color_tag(Some("E91E63")), Err(CoreError::Validation(_)));
        assert_matches!(validate_color_tag(Some("#GGGGGG")), Err(CoreError::Validation(_)));
        assert_eq!(display_color(None), DEFAULT_OPERATOR_COLOR);
        assert_eq!(display_color(Some("#9C27B0")), "#9C27B0");
    }

    #[test]
    fn text_ids_are_validated_or_generated() {
        assert_eq!(resolve_text_id(OPERATOR_ID_PREFIX, Some("op-maria")).unwrap(), "op-maria");
        assert_matches!(
            resolve_text_id(OPERATOR_ID_PREFIX, Some("Op Maria")),
            Err(CoreError::Validation(_))
        );
        let generated = resolve_text_id(SERVICE_ID_PREFIX, None).unwrap();
        assert!(generated.starts_with("srv-"));
        assert!(validate_slug_id(&generated).is_ok());
        assert!(resolve_text_id(SERVICE_ID_PREFIX, Some("  ")).unwrap().starts_with("srv-"));
    }

    #[test]
    fn product_requires_positive_price() {
        assert!(validate_product("Shampoo", 1200).is_ok());
        assert_matches!(validate_product("Shampoo", 0), Err(CoreError::Validation(_)));
        assert_matches!(validate_product(" ", 1200), Err(CoreError::Validation(_)));
        assert_matches!(validate_product_price(-5), Err(CoreError::Validation(_)));
    }

    #[test]
    fn in_use_messages_name_the_count() {
        assert!(operator_in_use_message(3).contains('3'));
        assert!(service_in_use_message(2).contains('2'));
    }

    #[test]
    fn quantity_must_be_positive() {
        assert!(validate_quantity(1).is_ok());
        assert_matches!(validate_quantity(0), Err(CoreError::Validation(_)));
    }
}
