//! XML Entity Codec
//!
//! Fixed substitution table between the XML-significant characters and
//! their entity forms:
//!
//! | raw | entity   |
//! |-----|----------|
//! | `&` | `&amp;`  |
//! | `<` | `&lt;`   |
//! | `>` | `&gt;`   |
//! | `"` | `&quot;` |
//! | `'` | `&#39;`  |
//! | `-` | `&#45;`  |
//!
//! Uses Cow for zero-copy when nothing needs replacing.

use memchr::{memchr, memchr3};
use std::borrow::Cow;

/// Entity forms paired with their raw characters, in decode order
const ENTITIES: [(&str, &str); 6] = [
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&#45;", "-"),
];

/// Decode the known entity forms back to raw characters
///
/// Each table entry is replaced across the whole string before moving to
/// the next one, so `&amp;lt;` decodes all the way to `<`. Entities outside
/// the table (`&apos;`, `&#x41;`, ...) pass through unchanged.
pub fn decode(value: &str) -> Cow<'_, str> {
    if memchr(b'&', value.as_bytes()).is_none() {
        return Cow::Borrowed(value);
    }

    let mut decoded = value.to_owned();
    for (entity, raw) in ENTITIES {
        if decoded.contains(entity) {
            decoded = decoded.replace(entity, raw);
        }
    }
    Cow::Owned(decoded)
}

/// Encode XML-significant characters to their entity forms
///
/// An ampersand that already opens a decimal (`&#123;`) or named (`&name;`)
/// reference is copied through as-is, so encoding an encoded string does not
/// double-encode it. Hexadecimal references are not recognized and get their
/// ampersand escaped.
pub fn encode(value: &str) -> Cow<'_, str> {
    let bytes = value.as_bytes();
    if memchr3(b'&', b'<', b'>', bytes).is_none() && memchr3(b'"', b'\'', b'-', bytes).is_none() {
        return Cow::Borrowed(value);
    }

    let mut result = String::with_capacity(value.len() + 16);
    // All special characters are ASCII, so every split point below is a
    // char boundary.
    let mut run_start = 0;
    let mut pos = 0;
    while pos < bytes.len() {
        let Some(entity) = entity_for(bytes[pos]) else {
            pos += 1;
            continue;
        };

        if bytes[pos] == b'&' {
            if let Some(len) = reference_len(&value[pos..]) {
                pos += len;
                continue;
            }
        }

        result.push_str(&value[run_start..pos]);
        result.push_str(entity);
        pos += 1;
        run_start = pos;
    }
    result.push_str(&value[run_start..]);

    Cow::Owned(result)
}

#[inline]
fn entity_for(b: u8) -> Option<&'static str> {
    match b {
        b'&' => Some("&amp;"),
        b'<' => Some("&lt;"),
        b'>' => Some("&gt;"),
        b'"' => Some("&quot;"),
        b'\'' => Some("&#39;"),
        b'-' => Some("&#45;"),
        _ => None,
    }
}

/// Length in bytes of the entity reference at the start of `input`
/// (which begins with `&`), including the `&` and the `;`.
fn reference_len(input: &str) -> Option<usize> {
    let body = &input[1..];
    let semi = memchr(b';', body.as_bytes())?;
    let name = &body[..semi];

    let valid = match name.strip_prefix('#') {
        Some(digits) => !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()),
        None => !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_'),
    };

    valid.then_some(semi + 2)
}
