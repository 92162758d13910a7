use std::fmt::{self, Display, Write};

/// The printable form of a byte buffer. Valid UTF-8 is kept as text, everything else is rendered
/// as a `\xHH` escaped string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// The bytes were valid UTF-8
    Text(String),
    /// The bytes were not valid UTF-8, contains the hex escaped representation
    Binary(String),
}

impl Decoded {
    /// Decodes the given bytes
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        match std::str::from_utf8(bytes) {
            Ok(text) => Decoded::Text(text.to_owned()),
            Err(_) => Decoded::Binary(bytes_to_hex(bytes)),
        }
    }

    /// Returns true if the bytes were valid UTF-8
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self, Decoded::Text(_))
    }

    /// Borrow the rendered string
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Decoded::Text(s) | Decoded::Binary(s) => s,
        }
    }

    /// Returns the rendered string
    #[must_use]
    pub fn into_string(self) -> String {
        match self {
            Decoded::Text(s) | Decoded::Binary(s) => s,
        }
    }
}

impl Display for Decoded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Converts the bytes into a `\xHH\xHH...` string (lower case hex digits).
#[must_use]
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 4);
    for byte in bytes {
        let _ = write!(out, "\\x{byte:02x}");
    }
    out
}

/// Parses a string created by [`bytes_to_hex`] back into bytes. Returns `None` if the string is
/// not a sequence of `\xHH` groups.
#[must_use]
pub fn hex_to_bytes(hex: &str) -> Option<Vec<u8>> {
    let raw = hex.as_bytes();
    if raw.len() % 4 != 0 {
        return None;
    }
    raw.chunks(4)
        .map(|group| {
            if group[0] != b'\\'
                || group[1] != b'x'
                || !group[2..].iter().all(u8::is_ascii_hexdigit)
            {
                return None;
            }
            let digits = std::str::from_utf8(&group[2..]).ok()?;
            u8::from_str_radix(digits, 16).ok()
        })
        .collect()
}
