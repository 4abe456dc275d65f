//! Conversions between a JSON Pointer's RFC 6901 string form and the
//! percent-encoded form used as a URI fragment.

use crate::{Pointer, PointerBuf};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use snafu::{ResultExt, Snafu};

/// Characters that must be percent-encoded when a JSON Pointer is embedded
/// as a URI fragment, on top of the RFC 6901 `~0`/`~1` token escaping that
/// `jsonptr`'s `Display` impl already applies.
const FRAGMENT_UNSAFE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'%')
    .add(b'[')
    .add(b']')
    .add(b'{')
    .add(b'}')
    .add(b'|')
    .add(b'\\')
    .add(b'^');

/// Encodes `pointer` as a URI fragment (e.g. `/properties/a b` becomes
/// `/properties/a%20b`).
#[must_use]
pub fn encode_pointer(pointer: &Pointer) -> String {
    utf8_percent_encode(&pointer.to_string(), FRAGMENT_UNSAFE).to_string()
}

/// Decodes a URI fragment back into a [`PointerBuf`].
///
/// # Errors
/// Returns [`DecodeError`] if the fragment is not valid UTF-8 once
/// percent-decoded, or is not a well-formed JSON Pointer.
pub fn decode_pointer(fragment: &str) -> Result<PointerBuf, DecodeError> {
    let decoded = percent_decode_str(fragment)
        .decode_utf8()
        .context(NotUtf8Snafu)?;
    decoded.parse::<PointerBuf>().context(MalformedSnafu)
}

/// An error decoding a percent-encoded JSON Pointer fragment.
#[derive(Debug, Snafu)]
pub enum DecodeError {
    /// The percent-decoded bytes were not valid UTF-8.
    #[snafu(display("fragment is not valid UTF-8: {source}"))]
    NotUtf8 { source: std::str::Utf8Error },
    /// The decoded string is not a well-formed JSON Pointer.
    #[snafu(display("fragment is not a valid JSON pointer: {source}"))]
    Malformed { source: jsonptr::ParseError },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_simple_pointer() {
        let ptr: PointerBuf = "/a/b".parse().unwrap();
        let encoded = encode_pointer(&ptr);
        assert_eq!(encoded, "/a/b");
        let decoded = decode_pointer(&encoded).unwrap();
        assert_eq!(decoded, ptr);
    }

    #[test]
    fn encodes_spaces_and_decodes_back() {
        let ptr: PointerBuf = "/a b/c~1d".parse().unwrap();
        let encoded = encode_pointer(&ptr);
        assert!(encoded.contains("%20"));
        let decoded = decode_pointer(&encoded).unwrap();
        assert_eq!(decoded, ptr);
    }
}
