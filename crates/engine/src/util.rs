//! Internal helpers for input validation and name normalization.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so every operation enforces the same invariants.

use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, ResultEngine};

/// Trim `value` and reject it when empty or longer than `max_len` characters.
pub(crate) fn normalize_required_name(
    value: &str,
    label: &str,
    max_len: usize,
) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    if trimmed.chars().count() > max_len {
        return Err(EngineError::InvalidName(format!(
            "{label} name must be at most {max_len} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional free text; blank input becomes `None`.
pub(crate) fn normalize_optional_text(
    value: Option<&str>,
    label: &str,
    max_len: usize,
) -> ResultEngine<Option<String>> {
    let Some(text) = value.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    if text.chars().count() > max_len {
        return Err(EngineError::InvalidName(format!(
            "{label} must be at most {max_len} characters"
        )));
    }
    Ok(Some(text.to_string()))
}

/// Key used for case-insensitive name lookups: NFC, then lowercase.
pub(crate) fn name_key(value: &str) -> String {
    value.trim().nfc().collect::<String>().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_names_are_trimmed_and_bounded() {
        assert_eq!(normalize_required_name("  Food ", "category", 30).unwrap(), "Food");
        assert!(normalize_required_name("   ", "category", 30).is_err());
        assert!(normalize_required_name(&"x".repeat(31), "category", 30).is_err());
        assert!(normalize_required_name(&"я".repeat(30), "category", 30).is_ok());
    }

    #[test]
    fn blank_optional_text_is_none() {
        assert_eq!(normalize_optional_text(Some("  "), "description", 200).unwrap(), None);
        assert_eq!(normalize_optional_text(None, "description", 200).unwrap(), None);
        assert_eq!(
            normalize_optional_text(Some(" lunch "), "description", 200).unwrap(),
            Some("lunch".to_string())
        );
        assert!(normalize_optional_text(Some(&"a".repeat(201)), "description", 200).is_err());
    }

    #[test]
    fn name_key_folds_case_and_composition() {
        // "й" as "и" + combining breve
        let decomposed = "\u{0418}\u{0306}ога";
        assert_eq!(name_key(decomposed), name_key("йога"));
        assert_eq!(name_key(" Vacation "), "vacation");
    }
}
