// src/common/validation.rs

use validator::{ValidationError, ValidationErrors};

/// Accepted phone shapes: `0` followed by exactly 9 digits, or `+84` followed
/// by exactly 9 digits.
pub fn is_valid_phone(phone: &str) -> bool {
    let phone = phone.trim();
    let rest = if let Some(rest) = phone.strip_prefix("+84") {
        rest
    } else if let Some(rest) = phone.strip_prefix('0') {
        rest
    } else {
        return false;
    };
    rest.len() == 9 && rest.chars().all(|c| c.is_ascii_digit())
}

/// Tax codes are optional. When present they must be exactly 10, 12 or 13
/// digits once spaces and dashes are stripped. Empty and the "N/A" sentinel
/// count as absent.
pub fn is_valid_tax_code(raw: &str) -> bool {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "N/A" {
        return true;
    }
    let digits: String = trimmed.chars().filter(|c| *c != ' ' && *c != '-').collect();
    matches!(digits.len(), 10 | 12 | 13) && digits.chars().all(|c| c.is_ascii_digit())
}

/// Normalization used by the duplicate pre-checks: exact match after trimming,
/// removing inner whitespace and lowercasing.
pub fn normalize_for_match(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Attach one field-attributable failure to an accumulating error set.
pub fn push_field_error(
    errors: &mut ValidationErrors,
    field: &'static str,
    code: &'static str,
    message: &str,
) {
    let mut error = ValidationError::new(code);
    error.message = Some(message.to_string().into());
    errors.add(field, error);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_accepts_local_and_international_forms() {
        assert!(is_valid_phone("0912345678"));
        assert!(is_valid_phone("+84912345678"));
    }

    #[test]
    fn phone_rejects_wrong_lengths_and_prefixes() {
        assert!(!is_valid_phone("091234567")); // 8 digits after the 0
        assert!(!is_valid_phone("12345678901"));
        assert!(!is_valid_phone("09123456789")); // 10 digits after the 0
        assert!(!is_valid_phone(""));
    }

    #[test]
    fn tax_code_lengths() {
        assert!(is_valid_tax_code("0312345678"));
        assert!(is_valid_tax_code("031234567890"));
        assert!(is_valid_tax_code("0312345678901"));
        assert!(!is_valid_tax_code("03123456789")); // 11 digits
    }

    #[test]
    fn tax_code_strips_separators_and_treats_sentinels_as_absent() {
        assert!(is_valid_tax_code("0312 345 678"));
        assert!(is_valid_tax_code("0312-345-678"));
        assert!(is_valid_tax_code(""));
        assert!(is_valid_tax_code("N/A"));
        assert!(!is_valid_tax_code("03123456ab"));
    }

    #[test]
    fn match_normalization_ignores_case_and_whitespace() {
        assert_eq!(normalize_for_match(" 091 234 5678"), "0912345678");
        assert_eq!(normalize_for_match("ABC 123"), "abc123");
    }
}
