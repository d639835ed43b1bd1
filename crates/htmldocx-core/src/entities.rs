//! Lenient HTML entity decoding
//!
//! Named HTML5 entities and numeric character references are replaced by
//! the characters they stand for. Anything that does not form a complete,
//! known reference is copied through untouched, so arbitrary text can be
//! decoded without failing.

use std::borrow::Cow;

use quick_xml::escape::{resolve_html5_entity, unescape_with};

/// Longest reference we try to resolve, `&` and `;` included
const MAX_REFERENCE_LEN: usize = 40;

/// Decode entity references in `input`
///
/// Returns the input borrowed when it contains no `&`.
pub fn decode_entities(input: &str) -> Cow<'_, str> {
    if !input.contains('&') {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];

        match reference_end(tail) {
            Some(end) => {
                let reference = &tail[..=end];
                match unescape_with(reference, resolve_html5_entity) {
                    Ok(decoded) => out.push_str(&decoded),
                    Err(_) => out.push_str(reference),
                }
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    Cow::Owned(out)
}

/// Byte index of the `;` closing the reference that starts at `tail[0]`
fn reference_end(tail: &str) -> Option<usize> {
    let body = &tail[1..];
    let stop = body.find(|c: char| c == ';' || c == '&' || c == '<' || c.is_whitespace())?;
    if stop == 0 || stop + 2 > MAX_REFERENCE_LEN || !body[stop..].starts_with(';') {
        return None;
    }
    Some(stop + 1)
}
