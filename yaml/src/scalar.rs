//! Resolution of scalar text into typed values.
//!
//! Plain (unquoted) scalars are resolved in a fixed order: null, boolean, integer, float, and
//! finally string. Quoted and block scalars are always strings.

use ordered_float::OrderedFloat;

use crate::YamlData;

/// The way a scalar was written in the source.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScalarStyle {
    /// Unquoted.
    Plain,
    /// Between `'`.
    SingleQuoted,
    /// Between `"`.
    DoubleQuoted,
    /// A `|` block scalar.
    Literal,
    /// A `>` block scalar.
    Folded,
}

/// Turns scalar text into a typed [`YamlData`] value.
///
/// ```
/// # use akao_yaml::{ScalarResolver, ScalarStyle, YamlData};
/// let resolver = ScalarResolver::new(false);
/// assert_eq!(resolver.resolve("0x2A", ScalarStyle::Plain), YamlData::Integer(42));
/// assert_eq!(resolver.resolve("yes", ScalarStyle::Plain), YamlData::Boolean(true));
/// assert_eq!(resolver.resolve("42", ScalarStyle::DoubleQuoted), YamlData::String("42".into()));
/// // `yes` and `no` are only booleans outside of strict mode.
/// let strict = ScalarResolver::new(true);
/// assert_eq!(strict.resolve("yes", ScalarStyle::Plain), YamlData::String("yes".into()));
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ScalarResolver {
    strict: bool,
}

impl ScalarResolver {
    /// Create a resolver. In `strict` mode, `yes` and `no` are not booleans.
    #[must_use]
    pub fn new(strict: bool) -> Self {
        ScalarResolver { strict }
    }

    /// Resolve `text`, written with the given `style`, into a value.
    #[must_use]
    pub fn resolve(&self, text: &str, style: ScalarStyle) -> YamlData {
        if style == ScalarStyle::Plain {
            self.resolve_plain(text)
        } else {
            YamlData::String(text.to_string())
        }
    }

    /// Resolve the text of a plain scalar into a value.
    #[must_use]
    pub fn resolve_plain(&self, text: &str) -> YamlData {
        if is_null(text) {
            YamlData::Null
        } else if let Some(b) = self.parse_boolean(text) {
            YamlData::Boolean(b)
        } else if let Some(i) = parse_integer(text) {
            YamlData::Integer(i)
        } else if let Some(f) = parse_float(text) {
            YamlData::Float(OrderedFloat(f))
        } else {
            YamlData::String(text.to_string())
        }
    }

    /// Parse `text` as a boolean.
    #[must_use]
    pub fn parse_boolean(&self, text: &str) -> Option<bool> {
        match text {
            "true" | "True" | "TRUE" => Some(true),
            "false" | "False" | "FALSE" => Some(false),
            "yes" | "Yes" | "YES" if !self.strict => Some(true),
            "no" | "No" | "NO" if !self.strict => Some(false),
            _ => None,
        }
    }
}

/// Check whether `text` denotes null (`~`, `null`, `Null`, `NULL` or nothing).
#[must_use]
pub fn is_null(text: &str) -> bool {
    matches!(text, "" | "~" | "null" | "Null" | "NULL")
}

/// Parse `text` as an integer.
///
/// Accepts an optional sign followed by decimal digits, `0x` hexadecimal digits or `0o` octal
/// digits. Values that do not fit in an `i64` are not integers.
#[must_use]
pub fn parse_integer(text: &str) -> Option<i64> {
    let (negative, unsigned) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    let (radix, digits) = if let Some(hex) = unsigned.strip_prefix("0x") {
        (16, hex)
    } else if let Some(octal) = unsigned.strip_prefix("0o") {
        (8, octal)
    } else {
        (10, unsigned)
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    if negative {
        // Parse with the sign so that `i64::MIN` does not overflow.
        i64::from_str_radix(&format!("-{digits}"), radix).ok()
    } else {
        i64::from_str_radix(digits, radix).ok()
    }
}

/// Parse `text` as a floating point number.
///
/// Accepts `.inf`, `-.inf`, `.nan` (in lowercase, capitalized or uppercase form) and decimal
/// numbers with a fraction and/or an exponent. At least one digit is required, so `inf`, `nan`
/// and `.` are not floats. Bare digits (`12`, or an integer too large for an `i64`) are not
/// floats either.
#[must_use]
pub fn parse_float(text: &str) -> Option<f64> {
    match text {
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" => Some(f64::INFINITY),
        "-.inf" | "-.Inf" | "-.INF" => Some(f64::NEG_INFINITY),
        ".nan" | ".NaN" | ".NAN" => Some(f64::NAN),
        _ if is_decimal_float(text) => text.parse::<f64>().ok(),
        _ => None,
    }
}

/// `[-+]? ( \.[0-9]+ | [0-9]+ ( \.[0-9]* )? ) ( [eE][-+]?[0-9]+ )?`, with a `.` or an exponent.
fn is_decimal_float(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = usize::from(matches!(bytes.first(), Some(b'-' | b'+')));
    let count_digits = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let integral = count_digits(i);
    i += integral;
    let mut fraction = 0;
    let has_dot = bytes.get(i) == Some(&b'.');
    if has_dot {
        i += 1;
        fraction = count_digits(i);
        i += fraction;
    }
    if integral == 0 && fraction == 0 {
        return false;
    }
    let has_exponent = matches!(bytes.get(i), Some(b'e' | b'E'));
    if has_exponent {
        i += 1;
        if matches!(bytes.get(i), Some(b'-' | b'+')) {
            i += 1;
        }
        let exponent = count_digits(i);
        if exponent == 0 {
            return false;
        }
        i += exponent;
    }
    (has_dot || has_exponent) && i == bytes.len()
}

#[cfg(test)]
mod test {
    use super::{is_null, parse_float, parse_integer, ScalarResolver, ScalarStyle};
    use crate::YamlData;

    #[test]
    fn test_resolution_order() {
        let r = ScalarResolver::new(false);
        assert_eq!(r.resolve_plain("~"), YamlData::Null);
        assert_eq!(r.resolve_plain(""), YamlData::Null);
        assert_eq!(r.resolve_plain("NULL"), YamlData::Null);
        assert_eq!(r.resolve_plain("True"), YamlData::Boolean(true));
        assert_eq!(r.resolve_plain("NO"), YamlData::Boolean(false));
        assert_eq!(r.resolve_plain("on"), YamlData::String("on".into()));
        assert_eq!(r.resolve_plain("-12"), YamlData::Integer(-12));
        assert_eq!(r.resolve_plain("1.5"), YamlData::Float(1.5.into()));
        assert_eq!(r.resolve_plain("1.5.2"), YamlData::String("1.5.2".into()));
        assert_eq!(
            r.resolve("true", ScalarStyle::SingleQuoted),
            YamlData::String("true".into())
        );
        assert_eq!(
            r.resolve("12", ScalarStyle::Literal),
            YamlData::String("12".into())
        );
    }

    #[test]
    fn test_strict_booleans() {
        let r = ScalarResolver::new(true);
        assert_eq!(r.parse_boolean("Yes"), None);
        assert_eq!(r.parse_boolean("FALSE"), Some(false));
        assert!(is_null("Null"));
        assert!(!is_null("nil"));
    }

    #[test]
    fn test_integers() {
        assert_eq!(parse_integer("0"), Some(0));
        assert_eq!(parse_integer("+12"), Some(12));
        assert_eq!(parse_integer("0x1F"), Some(31));
        assert_eq!(parse_integer("-0x10"), Some(-16));
        assert_eq!(parse_integer("0o17"), Some(15));
        assert_eq!(parse_integer("-9223372036854775808"), Some(i64::MIN));
        assert_eq!(parse_integer("9223372036854775808"), None);
        assert_eq!(parse_integer("0x"), None);
        assert_eq!(parse_integer("0o8"), None);
        assert_eq!(parse_integer("1_000"), None);
        assert_eq!(parse_integer("-"), None);
        assert_eq!(parse_integer("0x-1"), None);
    }

    #[test]
    fn test_floats() {
        assert_eq!(parse_float("2.75"), Some(2.75));
        assert_eq!(parse_float("-.5"), Some(-0.5));
        assert_eq!(parse_float("1."), Some(1.0));
        assert_eq!(parse_float("1e3"), Some(1000.0));
        assert_eq!(parse_float("2.5E-1"), Some(0.25));
        assert_eq!(parse_float("-.inf"), Some(f64::NEG_INFINITY));
        assert!(parse_float(".NaN").is_some_and(f64::is_nan));
        assert_eq!(parse_float("inf"), None);
        assert_eq!(parse_float("nan"), None);
        assert_eq!(parse_float("."), None);
        assert_eq!(parse_float("1e"), None);
        assert_eq!(parse_float("e3"), None);
        assert_eq!(parse_float("1.0f"), None);
        assert_eq!(parse_float("12"), None);
        assert_eq!(parse_float("-9223372036854775809"), None);
    }
}
