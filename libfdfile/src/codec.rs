//! Text codec applied uniformly to reads and writes of one handle.

use std::borrow::Cow;
use std::fmt;

use encoding_rs::{Encoding, REPLACEMENT, UTF_16BE, UTF_16LE};

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TextCodec {
    encoding: &'static Encoding,
}

impl TextCodec {
    /// Resolve a WHATWG label (`utf-8`, `latin1`, `utf-16le`, ...).
    pub fn for_label(label: &str) -> Option<Self> {
        match Encoding::for_label(label.trim().as_bytes()) {
            Some(enc) if enc != REPLACEMENT => Some(Self { encoding: enc }),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Strict decode, `None` on any malformed sequence.
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        self.encoding
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(Cow::into_owned)
    }

    /// Strict encode, `None` when a character has no mapping in this codec.
    pub fn encode(&self, text: &str) -> Option<Vec<u8>> {
        // encoding_rs only encodes to ASCII-compatible targets; UTF-16 is
        // written by hand so the bytes round-trip through `decode`.
        if self.encoding == UTF_16LE {
            return Some(text.encode_utf16().flat_map(u16::to_le_bytes).collect());
        }
        if self.encoding == UTF_16BE {
            return Some(text.encode_utf16().flat_map(u16::to_be_bytes).collect());
        }

        let (bytes, _, had_unmappable) = self.encoding.encode(text);
        if had_unmappable {
            None
        } else {
            Some(bytes.into_owned())
        }
    }
}

impl Default for TextCodec {
    fn default() -> Self {
        Self {
            encoding: encoding_rs::UTF_8,
        }
    }
}

impl fmt::Debug for TextCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TextCodec").field(&self.name()).finish()
    }
}
