//! Helpers for building up JSON Pointers token-by-token.
//!
//! `jsonptr` gives us parsing and display; the rest of the crate only ever
//! needs to append a single RFC 6901-escaped token to an existing pointer, so
//! that's the entire surface exposed here.

use crate::{Pointer, PointerBuf};

/// Appends `token` (an unescaped property name or array index) to `base`.
#[must_use]
pub fn append(base: &Pointer, token: &str) -> PointerBuf {
    let escaped = token.replace('~', "~0").replace('/', "~1");
    format!("{base}/{escaped}")
        .parse()
        .expect("appending one escaped token to a valid pointer is always valid")
}

/// Appends `token` to an owned pointer, consuming it.
#[must_use]
pub fn append_buf(base: &PointerBuf, token: &str) -> PointerBuf {
    append(base, token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_plain_token() {
        let base: PointerBuf = "/properties".parse().unwrap();
        assert_eq!(append(&base, "name").to_string(), "/properties/name");
    }

    #[test]
    fn escapes_tilde_and_slash() {
        let base: PointerBuf = "".parse().unwrap();
        assert_eq!(append(&base, "a/b~c").to_string(), "/a~1b~0c");
    }
}
