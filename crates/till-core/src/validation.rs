//! # Validation Module
//!
//! Input validation for the administrator write paths.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Request boundary                                             │
//! │  └── Extracts scalars (code, label, priceCents, id)                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Trim, reject empty required fields                                │
//! │  └── Normalize image references and codes                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Store (file document or SQLite)                              │
//! │  └── Case-insensitive uniqueness of button codes                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Scanning is NOT validated here: an unknown or blank scan code is a
//! negative lookup, never an error.

use crate::error::ValidationError;
use crate::types::Button;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Folder (under the public web root) holding uploaded button images.
pub const PUBLIC_IMAGES_PREFIX: &str = "/public/images/";

/// Key under which a button code is unique.
///
/// ```rust
/// use till_core::validation::code_key;
///
/// assert_eq!(code_key("  Coke-330 "), "coke-330");
/// ```
pub fn code_key(code: &str) -> String {
    code.trim().to_lowercase()
}

/// Trims and validates a button before it is stored.
///
/// ## Rules
/// - `label` and `code` are trimmed; both must be non-empty
/// - `price_cents` must not be negative
/// - A blank image reference becomes `None`
///
/// ## Example
/// ```rust
/// use till_core::types::Button;
/// use till_core::validation::normalize_button;
///
/// let b = normalize_button(Button::new(" A ", " Coffee ", 250)).unwrap();
/// assert_eq!(b.code, "A");
/// assert!(normalize_button(Button::new("", "X", 100)).is_err());
/// ```
pub fn normalize_button(mut button: Button) -> ValidationResult<Button> {
    button.label = button.label.trim().to_string();
    button.code = button.code.trim().to_string();

    if button.label.is_empty() {
        return Err(ValidationError::required("label"));
    }
    if button.code.is_empty() {
        return Err(ValidationError::required("code"));
    }
    if button.price_cents < 0 {
        return Err(ValidationError::NegativeAmount {
            field: "priceCents".to_string(),
        });
    }

    button.image_ref = button
        .image_ref
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());

    Ok(button)
}

/// Resolves an image reference typed by an administrator.
///
/// Absolute URLs and paths already under `/public/` are kept; anything else
/// is treated as a file name in the local images folder.
///
/// ```rust
/// use till_core::validation::resolve_image_ref;
///
/// assert_eq!(resolve_image_ref("tea.png").as_deref(), Some("/public/images/tea.png"));
/// assert_eq!(resolve_image_ref("https://cdn/x.png").as_deref(), Some("https://cdn/x.png"));
/// assert_eq!(resolve_image_ref("  "), None);
/// ```
pub fn resolve_image_ref(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.starts_with("http://") || raw.starts_with("https://") || raw.starts_with("/public/") {
        Some(raw.to_string())
    } else {
        Some(format!("{}{}", PUBLIC_IMAGES_PREFIX, raw))
    }
}

/// Collapses duplicate codes: a later entry replaces the earlier one in place.
///
/// This is the result of applying the entries one by one as upserts, so a
/// full `save` and a sequence of `add`s agree.
pub fn dedupe_buttons(list: Vec<Button>) -> Vec<Button> {
    let mut out: Vec<Button> = Vec::with_capacity(list.len());
    for button in list {
        match out.iter_mut().find(|b| b.matches(&button.code)) {
            Some(existing) => *existing = button,
            None => out.push(button),
        }
    }
    out
}

/// Validates a plugin id: non-empty, a single safe path segment.
///
/// ```rust
/// use till_core::validation::validate_plugin_id;
///
/// assert_eq!(validate_plugin_id(" com.unitill.faq ").unwrap(), "com.unitill.faq");
/// assert!(validate_plugin_id("../etc").is_err());
/// ```
pub fn validate_plugin_id(id: &str) -> ValidationResult<String> {
    let id = id.trim();

    if id.is_empty() {
        return Err(ValidationError::required("id"));
    }

    if id == "." || id == ".." || id.contains(['/', '\\']) || id.contains('\0') {
        return Err(ValidationError::InvalidFormat {
            field: "id".to_string(),
            reason: "must be a single path segment".to_string(),
        });
    }

    Ok(id.to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_button() {
        let b = normalize_button(Button::new("  A1 ", "  Coffee  ", 250).with_image("  ")).unwrap();
        assert_eq!(b.code, "A1");
        assert_eq!(b.label, "Coffee");
        assert_eq!(b.image_ref, None);

        assert_eq!(
            normalize_button(Button::new("", "X", 1)),
            Err(ValidationError::required("code"))
        );
        assert_eq!(
            normalize_button(Button::new("A", "   ", 1)),
            Err(ValidationError::required("label"))
        );
        assert!(normalize_button(Button::new("A", "X", -1)).is_err());
        assert!(normalize_button(Button::new("A", "X", 0)).is_ok());
    }

    #[test]
    fn test_dedupe_buttons_replaces_in_place() {
        let out = dedupe_buttons(vec![
            Button::new("A", "Coffee", 250),
            Button::new("B", "Tea", 200),
            Button::new("a", "Latte", 300),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].label, "Latte");
        assert_eq!(out[0].code, "a");
        assert_eq!(out[1].code, "B");
    }

    #[test]
    fn test_validate_plugin_id() {
        assert!(validate_plugin_id("p1").is_ok());
        assert!(validate_plugin_id("").is_err());
        assert!(validate_plugin_id("   ").is_err());
        assert!(validate_plugin_id("..").is_err());
        assert!(validate_plugin_id("a/b").is_err());
        assert!(validate_plugin_id("a\\b").is_err());
    }

    #[test]
    fn test_resolve_image_ref() {
        assert_eq!(
            resolve_image_ref("/public/images/a.png").as_deref(),
            Some("/public/images/a.png")
        );
        assert_eq!(
            resolve_image_ref("http://x/a.png").as_deref(),
            Some("http://x/a.png")
        );
    }
}
