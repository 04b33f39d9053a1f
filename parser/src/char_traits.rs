//! Holds functions to determine if a character belongs to a specific character set.

/// Check whether the character is nil (`\0`).
///
/// The [`Cursor`] returns `\0` when peeking past the end of its input.
///
/// [`Cursor`]: crate::Cursor
#[inline]
#[must_use]
pub fn is_z(c: char) -> bool {
    c == '\0'
}

/// Check whether the character is a line break (`\r` or `\n`).
#[inline]
#[must_use]
pub fn is_break(c: char) -> bool {
    c == '\n' || c == '\r'
}

/// Check whether the character is nil or a line break (`\0`, `\r`, `\n`).
#[inline]
#[must_use]
pub fn is_breakz(c: char) -> bool {
    is_break(c) || is_z(c)
}

/// Check whether the character is a whitespace (` ` or `\t`).
#[inline]
#[must_use]
pub fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Check whether the character is nil, a linebreak or a whitespace.
///
/// `\0`, ` `, `\t`, `\n`, `\r`
#[inline]
#[must_use]
pub fn is_blank_or_breakz(c: char) -> bool {
    is_blank(c) || is_breakz(c)
}

/// Check whether the character opens a quoted scalar (`'` or `"`).
#[inline]
#[must_use]
pub fn is_quote(c: char) -> bool {
    c == '\'' || c == '"'
}

/// Check whether the character is a hexadecimal character (case insensitive).
#[inline]
#[must_use]
pub fn is_hex(c: char) -> bool {
    c.is_ascii_hexdigit()
}

/// Convert the hexadecimal digit to an integer.
///
/// Returns `None` if `c` is not a hexadecimal digit.
#[inline]
#[must_use]
pub fn as_hex(c: char) -> Option<u32> {
    c.to_digit(16)
}

/// Check whether the character is a YAML flow character (one of `,[]{}`).
#[inline]
#[must_use]
pub fn is_flow(c: char) -> bool {
    matches!(c, ',' | '[' | ']' | '{' | '}')
}

/// Check whether the character is the BOM character.
#[inline]
#[must_use]
pub fn is_bom(c: char) -> bool {
    c == '\u{FEFF}'
}

/// Check whether the character is a valid YAML anchor name character.
#[inline]
#[must_use]
pub fn is_anchor_char(c: char) -> bool {
    !is_blank_or_breakz(c) && !is_flow(c) && !is_bom(c)
}

/// Check whether the character may not start a plain scalar.
///
/// `@` and `` ` `` are reserved by YAML for future use.
#[inline]
#[must_use]
pub fn is_reserved_indicator(c: char) -> bool {
    c == '@' || c == '`'
}
