//! Header block shared by commits and tags
//!
//! ```text
//! <key> <value>\n        (repeated, keys may repeat)
//!  <continuation>\n      (a leading space continues the previous value)
//! \n
//! <message>
//! ```
//!
//! Field order is preserved exactly, including the interleaving of repeated keys,
//! so that serializing a parsed block reproduces its bytes.

use crate::errors::{Error, Result};
use bytes::{BufMut, Bytes, BytesMut};

/// Ordered header fields plus the message that follows them
///
/// Values and the message are kept as raw bytes: commits may declare a
/// non-UTF-8 `encoding`, and those bytes must survive a round trip untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    fields: Vec<(String, Bytes)>,
    message: Bytes,
}

impl Headers {
    pub fn new(message: impl Into<Bytes>) -> Self {
        Headers {
            fields: Vec::new(),
            message: message.into(),
        }
    }

    /// Append a field; repeated keys keep their relative order
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<Bytes>) {
        self.fields.push((key.into(), value.into()));
    }

    /// First value stored under `key`
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.get_all(key).next()
    }

    pub fn get_all<'h, 'k>(&'h self, key: &'k str) -> impl Iterator<Item = &'h [u8]> + use<'h, 'k> {
        self.fields
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| &v[..])
    }

    /// First value under `key`, decoded as UTF-8
    pub fn get_str(&self, key: &str) -> Result<Option<&str>> {
        self.get(key)
            .map(|value| {
                std::str::from_utf8(value)
                    .map_err(|_| Error::malformed(format!("header '{key}' is not utf-8")))
            })
            .transpose()
    }

    pub fn message(&self) -> &[u8] {
        &self.message
    }

    pub fn serialize(&self) -> Bytes {
        let mut content = BytesMut::new();

        for (key, value) in &self.fields {
            content.put_slice(key.as_bytes());
            content.put_u8(b' ');
            for &byte in value.iter() {
                content.put_u8(byte);
                if byte == b'\n' {
                    content.put_u8(b' ');
                }
            }
            content.put_u8(b'\n');
        }
        content.put_u8(b'\n');
        content.put_slice(&self.message);

        content.freeze()
    }

    pub fn deserialize(payload: Bytes) -> Result<Self> {
        let mut headers = Headers::default();
        let mut start = 0;

        loop {
            let rest = &payload[start..];
            if rest.is_empty() {
                return Err(Error::malformed("header block is not terminated by a blank line"));
            }

            if rest[0] == b'\n' {
                headers.message = payload.slice(start + 1..);
                return Ok(headers);
            }

            let space = rest.iter().position(|&b| b == b' ');
            let newline = rest.iter().position(|&b| b == b'\n');
            let (key_end, value_start) = match (space, newline) {
                (Some(space), Some(newline)) if space < newline => (space, space + 1),
                _ => {
                    let line = rest.split(|&b| b == b'\n').next().unwrap_or_default();
                    return Err(Error::malformed(format!(
                        "bad header line '{}'",
                        String::from_utf8_lossy(line)
                    )));
                }
            };

            let key = std::str::from_utf8(&rest[..key_end])
                .map_err(|_| Error::malformed("header key is not utf-8"))?;
            if key.is_empty() {
                return Err(Error::malformed("header line with empty key"));
            }

            // the value runs until a newline that is not followed by a continuation space
            let mut value_end = value_start;
            let mut folded = false;
            loop {
                match rest[value_end..].iter().position(|&b| b == b'\n') {
                    Some(offset) => {
                        value_end += offset;
                        if rest.get(value_end + 1) == Some(&b' ') {
                            folded = true;
                            value_end += 1;
                        } else {
                            break;
                        }
                    }
                    None => {
                        return Err(Error::malformed(format!(
                            "header '{key}' is not terminated by a newline"
                        )));
                    }
                }
            }

            let value = if folded {
                Bytes::from(unfold(&rest[value_start..value_end]))
            } else {
                payload.slice(start + value_start..start + value_end)
            };
            headers.push(key, value);
            start += value_end + 1;
        }
    }
}

/// Drop the space that marks each continuation line
fn unfold(raw: &[u8]) -> Vec<u8> {
    let mut value = Vec::with_capacity(raw.len());
    let mut after_newline = false;

    for &byte in raw {
        if !(after_newline && byte == b' ') {
            value.push(byte);
        }
        after_newline = byte == b'\n';
    }

    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    const COMMIT: &str = "tree 29ff16c9c14e2652b22f8b78bb08a5a07930c147\n\
parent 206941306e8a8af65b66eaaaea388a7ae24d49a0\n\
parent 7a3c5b8e2d1f4a6b9c0e8d7f6a5b4c3d2e1f0a9b\n\
author Thibault Polge <thibault@thb.lt> 1527025023 +0200\n\
committer Thibault Polge <thibault@thb.lt> 1527025044 +0200\n\
gpgsig -----BEGIN PGP SIGNATURE-----\n \n iQIzBAABCAAdFiEExwXquOM8bWb4Q2zVGxM2FxoLkGQFAlsEjZQACgkQGxM2FxoL\n -----END PGP SIGNATURE-----\n\
\n\
Create first draft\n";

    #[test]
    fn repeated_keys_keep_their_order() {
        let headers = Headers::deserialize(Bytes::from_static(COMMIT.as_bytes())).unwrap();

        assert_eq!(
            headers.get_all("parent").collect::<Vec<_>>(),
            vec![
                &b"206941306e8a8af65b66eaaaea388a7ae24d49a0"[..],
                &b"7a3c5b8e2d1f4a6b9c0e8d7f6a5b4c3d2e1f0a9b"[..]
            ]
        );
        assert_eq!(headers.message(), b"Create first draft\n");
    }

    #[test]
    fn continuation_lines_are_unfolded() {
        let headers = Headers::deserialize(Bytes::from_static(COMMIT.as_bytes())).unwrap();

        assert_eq!(
            headers.get_str("gpgsig").unwrap(),
            Some(
                "-----BEGIN PGP SIGNATURE-----\n\niQIzBAABCAAdFiEExwXquOM8bWb4Q2zVGxM2FxoLkGQFAlsEjZQACgkQGxM2FxoL\n-----END PGP SIGNATURE-----"
            )
        );
    }

    #[test]
    fn serialize_reproduces_parsed_bytes() {
        let headers = Headers::deserialize(Bytes::from_static(COMMIT.as_bytes())).unwrap();

        assert_eq!(&headers.serialize()[..], COMMIT.as_bytes());
    }

    #[test]
    fn line_without_value_is_malformed() {
        let result = Headers::deserialize(Bytes::from_static(b"tree\n\nmessage"));
        assert!(matches!(result, Err(Error::MalformedObject(_))));
    }

    #[test]
    fn missing_blank_line_is_malformed() {
        let result = Headers::deserialize(Bytes::from_static(b"tree abc\n"));
        assert!(matches!(result, Err(Error::MalformedObject(_))));
    }

    #[test]
    fn empty_message_is_allowed() {
        let headers = Headers::deserialize(Bytes::from_static(b"object abc\ntype blob\n\n")).unwrap();

        assert_eq!(headers.get_str("type").unwrap(), Some("blob"));
        assert!(headers.message().is_empty());
    }

    #[test]
    fn non_utf8_values_and_message_are_kept_verbatim() {
        let payload = Bytes::from_static(
            b"tree 4b825dc642cb6eb9a060e54bf8d69288fbee4904\n\
author Fran\xe7ois <f@example.com> 0 +0000\n\
encoding ISO-8859-1\n\
\n\
caf\xe9\n",
        );

        let headers = Headers::deserialize(payload.clone()).unwrap();

        assert_eq!(headers.get("author"), Some(&b"Fran\xe7ois <f@example.com> 0 +0000"[..]));
        assert!(matches!(headers.get_str("author"), Err(Error::MalformedObject(_))));
        assert_eq!(headers.message(), b"caf\xe9\n");
        assert_eq!(headers.serialize(), payload);
    }

    proptest! {
        #[test]
        fn parsed_fields_match_built_fields(
            fields in proptest::collection::vec(("[a-z]{1,8}", "[ -~]{0,20}(\n[ -~]{0,20})?"), 0..6),
            message in "[ -~\n]{0,40}",
        ) {
            let mut headers = Headers::new(message);
            for (key, value) in fields {
                headers.push(key, value);
            }

            let parsed = Headers::deserialize(headers.serialize()).unwrap();
            prop_assert_eq!(parsed, headers);
        }
    }
}
