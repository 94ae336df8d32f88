use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{DdlError, Result};

/// Output text encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    /// Strict 7-bit ASCII
    Ascii,
    /// Strict ISO-8859-1, every code point up to U+00FF
    Latin1,
    /// Any other WHATWG encoding label, e.g. `Shift_JIS` or `windows-1252`
    Label(&'static encoding_rs::Encoding),
}

impl Encoding {
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::Ascii => "ASCII",
            Encoding::Latin1 => "ISO-8859-1",
            Encoding::Label(encoding) => encoding.name(),
        }
    }

    fn can_represent(self, c: char) -> bool {
        match self {
            Encoding::Utf8 => true,
            Encoding::Ascii => c.is_ascii(),
            Encoding::Latin1 => (c as u32) <= 0xFF,
            Encoding::Label(encoding) => {
                let mut buf = [0u8; 4];
                let (_, _, had_errors) = encoding.encode(c.encode_utf8(&mut buf));
                !had_errors
            }
        }
    }

    fn unrepresentable(self, text: &str) -> Option<DdlError> {
        text.chars()
            .find(|&c| !self.can_represent(c))
            .map(|character| DdlError::Encoding {
                encoding: self.name(),
                character,
            })
    }

    /// Check that every character of `text` fits the encoding
    pub fn encode(self, text: String) -> Result<String> {
        match self.unrepresentable(&text) {
            Some(err) => Err(err),
            None => Ok(text),
        }
    }

    /// Byte form of `text` in this encoding
    pub fn to_bytes(self, text: &str) -> Result<Vec<u8>> {
        if let Some(err) = self.unrepresentable(text) {
            return Err(err);
        }

        Ok(match self {
            Encoding::Utf8 => text.as_bytes().to_vec(),
            Encoding::Ascii | Encoding::Latin1 => text.chars().map(|c| c as u32 as u8).collect(),
            Encoding::Label(encoding) => encoding.encode(text).0.into_owned(),
        })
    }
}

impl FromStr for Encoding {
    type Err = DdlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UTF-8" | "UTF8" => Ok(Encoding::Utf8),
            "ASCII" | "US-ASCII" => Ok(Encoding::Ascii),
            "ISO-8859-1" | "LATIN1" | "LATIN-1" => Ok(Encoding::Latin1),
            _ => encoding_rs::Encoding::for_label(s.trim().as_bytes())
                .map(Encoding::Label)
                .ok_or_else(|| DdlError::UnknownEncoding(s.to_string())),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Encoding {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
