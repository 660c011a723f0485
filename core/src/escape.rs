//! Shell quoting and secret masking.
//!
//! Every user-controlled token in a rendered command goes through
//! [`escape`]: the value is wrapped in single quotes and each embedded single
//! quote becomes `'\''`. Nothing else is escaped, so the output is a single
//! word for any POSIX-compatible shell.

/// Character used to mask secret values.
pub const MASK_CHAR: char = '*';

/// Wrap `value` in single quotes, closing and reopening the quote around
/// every embedded `'`.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        if ch == '\'' {
            out.push_str("'\\''");
        } else {
            out.push(ch);
        }
    }
    out.push('\'');
    out
}

/// Replace `value` with a run of [`MASK_CHAR`] of the same length in
/// characters. Multi-byte characters get one mask character each, so the
/// mask is shorter than the value's byte length for non-ASCII input.
pub fn mask(value: &str) -> String {
    std::iter::repeat(MASK_CHAR).take(value.chars().count()).collect()
}
