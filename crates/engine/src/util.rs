//! Internal helpers for text normalization and validation.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so the engine enforces consistent invariants.

use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, ResultEngine};

/// Case-insensitive comparison key: NFKC-normalized, lowercased.
pub(crate) fn normalize_key(value: &str) -> String {
    value.nfkc().collect::<String>().to_lowercase()
}

/// Trim a required display name and reject empty values.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_key_folds_case_and_width() {
        assert_eq!(normalize_key("AMAZON"), "amazon");
        // Fullwidth latin letters fold to ASCII under NFKC.
        assert_eq!(normalize_key("ＡＢＣ"), "abc");
    }

    #[test]
    fn required_name_is_trimmed() {
        assert_eq!(normalize_required_name("  Trip  ", "group").unwrap(), "Trip");
        assert!(matches!(
            normalize_required_name("   ", "group"),
            Err(EngineError::InvalidName(_))
        ));
    }

    #[test]
    fn optional_text_drops_blank() {
        assert_eq!(normalize_optional_text(Some("  ")), None);
        assert_eq!(normalize_optional_text(Some(" x ")), Some("x".to_string()));
        assert_eq!(normalize_optional_text(None), None);
    }
}
