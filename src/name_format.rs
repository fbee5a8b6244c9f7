//! Spelling of declared field names in documents.

use convert_case::{Boundary, Case, Casing};

/// How declared field names are spelled in the config document.
///
/// Names are split into words on `_`, `-` and case boundaries (an acronym run
/// such as `HTTP` in `HTTPServer` stays one word), then re-joined in the
/// target style. `Original` leaves names untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NameFormat {
    #[default]
    Original,
    /// `pool_size`
    SnakeCase,
    /// `poolSize`
    CamelCase,
    /// `pool-size`
    KebabCase,
}

/// Spell a declared field name in the given format.
pub fn convert_name(format: NameFormat, name: &str) -> String {
    let case = match format {
        NameFormat::Original => return name.to_string(),
        NameFormat::SnakeCase => Case::Snake,
        NameFormat::CamelCase => Case::Camel,
        NameFormat::KebabCase => Case::Kebab,
    };
    name.with_boundaries(WORD_BOUNDARIES).to_case(case)
}

// Digits stay attached to the word before them: `ipv4Address` is `ipv4`, `address`.
const WORD_BOUNDARIES: &[Boundary] = &[
    Boundary::Underscore,
    Boundary::Hyphen,
    Boundary::Space,
    Boundary::LowerUpper,
    Boundary::DigitUpper,
    Boundary::Acronym,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn original_is_untouched() {
        assert_eq!(convert_name(NameFormat::Original, "test_Int"), "test_Int");
    }

    #[test]
    fn snake_to_camel() {
        assert_eq!(convert_name(NameFormat::CamelCase, "test_int"), "testInt");
        assert_eq!(convert_name(NameFormat::CamelCase, "testInt"), "testInt");
        assert_eq!(convert_name(NameFormat::CamelCase, "foo"), "foo");
    }

    #[test]
    fn camel_to_snake_and_kebab() {
        assert_eq!(convert_name(NameFormat::SnakeCase, "poolSize"), "pool_size");
        assert_eq!(convert_name(NameFormat::KebabCase, "pool_size"), "pool-size");
    }

    #[test]
    fn acronyms_stay_together() {
        assert_eq!(convert_name(NameFormat::SnakeCase, "HTTPServer"), "http_server");
        assert_eq!(convert_name(NameFormat::CamelCase, "http_server"), "httpServer");
    }

    #[test]
    fn digits_end_a_word() {
        assert_eq!(convert_name(NameFormat::SnakeCase, "ipv4Address"), "ipv4_address");
    }

    #[test]
    fn stray_separators_are_dropped() {
        assert_eq!(convert_name(NameFormat::CamelCase, "_private__field"), "privateField");
    }
}
