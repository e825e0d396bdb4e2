//! Markup entity decoding and escaping
//!
//! Handles the five predefined entities (&lt; &gt; &amp; &quot; &apos;)
//! and numeric character references (&#123; &#x7B;). Uses Cow for
//! zero-copy when no entities are present. The escape direction is used
//! by tree serialization.

use memchr::{memchr, memchr3};
use std::borrow::Cow;

/// Decode text content, handling entity references
///
/// Returns Borrowed if no entities are present (zero-copy),
/// returns Owned if entities were decoded.
#[inline]
pub fn decode_text(input: &str) -> Cow<'_, str> {
    if memchr(b'&', input.as_bytes()).is_none() {
        return Cow::Borrowed(input);
    }
    Cow::Owned(decode_entities(input))
}

/// Decode all entity references in the input
fn decode_entities(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut result = String::with_capacity(input.len());
    let mut pos = 0;

    while pos < bytes.len() {
        match memchr(b'&', &bytes[pos..]) {
            Some(amp) => {
                result.push_str(&input[pos..pos + amp]);
                pos += amp;

                match memchr(b';', &bytes[pos..]) {
                    Some(semi) => {
                        let entity = &input[pos + 1..pos + semi];
                        match decode_entity(entity) {
                            Some(decoded) => {
                                result.push(decoded);
                                pos += semi + 1;
                            }
                            None => {
                                // Unknown entity, keep as-is
                                result.push('&');
                                pos += 1;
                            }
                        }
                    }
                    None => {
                        // No semicolon found, keep the ampersand
                        result.push('&');
                        pos += 1;
                    }
                }
            }
            None => {
                result.push_str(&input[pos..]);
                break;
            }
        }
    }

    result
}

/// Decode a single entity (without & and ;)
fn decode_entity(entity: &str) -> Option<char> {
    if let Some(numeric) = entity.strip_prefix('#') {
        return decode_numeric_entity(numeric);
    }
    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => None,
    }
}

/// Decode a numeric character reference (decimal or hex, without the '#')
fn decode_numeric_entity(entity: &str) -> Option<char> {
    let code = if let Some(hex) = entity.strip_prefix('x').or_else(|| entity.strip_prefix('X')) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        entity.parse::<u32>().ok()?
    };
    char::from_u32(code)
}

/// Escape text content for serialization
///
/// Text content requires escaping of '&' and '<'; '>' is escaped as well
/// to avoid producing a literal "]]>" sequence.
pub fn escape_text(input: &str) -> Cow<'_, str> {
    if memchr3(b'&', b'<', b'>', input.as_bytes()).is_none() {
        return Cow::Borrowed(input);
    }
    let mut result = String::with_capacity(input.len() + 8);
    for c in input.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Escape an attribute value for serialization with double quotes
pub fn escape_attribute(input: &str) -> Cow<'_, str> {
    if memchr3(b'&', b'<', b'"', input.as_bytes()).is_none() {
        return Cow::Borrowed(input);
    }
    let mut result = String::with_capacity(input.len() + 8);
    for c in input.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}
