//! `content-md5` checksums for entry writes.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use md5::{Digest, Md5};

use crate::error::{OpenCloudError, Result};

/// How a string is turned into bytes before hashing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextEncoding {
    #[default]
    Utf8,
    /// One byte per char; code points above U+00FF keep only their low byte.
    Latin1,
    Utf16Le,
    /// The string is hex and is decoded first.
    Hex,
    /// The string is standard base64 and is decoded first.
    Base64,
}

impl TextEncoding {
    fn name(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf8",
            TextEncoding::Latin1 => "latin1",
            TextEncoding::Utf16Le => "utf16le",
            TextEncoding::Hex => "hex",
            TextEncoding::Base64 => "base64",
        }
    }

    /// Encodes `text` into the bytes that get hashed.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        match self {
            TextEncoding::Utf8 => Ok(text.as_bytes().to_vec()),
            TextEncoding::Latin1 => Ok(text.chars().map(|c| c as u32 as u8).collect()),
            TextEncoding::Utf16Le => Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect()),
            TextEncoding::Hex => hex::decode(text).map_err(|e| OpenCloudError::Encoding {
                encoding: self.name(),
                reason: e.to_string(),
            }),
            TextEncoding::Base64 => STANDARD.decode(text).map_err(|e| OpenCloudError::Encoding {
                encoding: self.name(),
                reason: e.to_string(),
            }),
        }
    }
}

/// Base64-encoded MD5 digest of `data`, the format Open Cloud expects in `content-md5`.
pub fn content_md5(data: impl AsRef<[u8]>) -> String {
    STANDARD.encode(Md5::digest(data.as_ref()))
}

/// Like [`content_md5`], encoding `text` with `encoding` first.
pub fn content_md5_str(text: &str, encoding: TextEncoding) -> Result<String> {
    Ok(content_md5(encoding.encode(text)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        assert_eq!(content_md5("hello"), "XUFAKrxLKna5cZ2REBfFkg==");
        assert_eq!(content_md5(b"hello".to_vec()), "XUFAKrxLKna5cZ2REBfFkg==");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(content_md5(""), "1B2M2Y8AsgTpgAmY7PhCfw==");
    }

    #[test]
    fn test_deterministic() {
        let content = r#"{"coins":100,"inventory":["sword"]}"#;
        assert_eq!(content_md5(content), content_md5(content));
        assert_ne!(content_md5(content), content_md5("{}"));
    }

    #[test]
    fn test_text_encodings_agree_on_same_bytes() {
        let utf8 = content_md5_str("hello", TextEncoding::Utf8).unwrap();
        let latin1 = content_md5_str("hello", TextEncoding::Latin1).unwrap();
        let hex = content_md5_str("68656c6c6f", TextEncoding::Hex).unwrap();
        let b64 = content_md5_str("aGVsbG8=", TextEncoding::Base64).unwrap();
        assert_eq!(utf8, "XUFAKrxLKna5cZ2REBfFkg==");
        assert_eq!(latin1, utf8);
        assert_eq!(hex, utf8);
        assert_eq!(b64, utf8);
    }

    #[test]
    fn test_utf16le_bytes() {
        assert_eq!(TextEncoding::Utf16Le.encode("hi").unwrap(), vec![b'h', 0, b'i', 0]);
    }

    #[test]
    fn test_latin1_differs_from_utf8_above_ascii() {
        assert_eq!(TextEncoding::Latin1.encode("é").unwrap(), vec![0xE9]);
        assert_eq!(TextEncoding::Utf8.encode("é").unwrap(), vec![0xC3, 0xA9]);
    }

    #[test]
    fn test_invalid_hex() {
        let err = content_md5_str("zz", TextEncoding::Hex).unwrap_err();
        assert!(matches!(err, OpenCloudError::Encoding { encoding: "hex", .. }));
    }
}
