//! Reversible, byte-safe cell encoding.
//!
//! Cells are stored as standard (padded) base64 of their UTF-8 source. The
//! encoding is lossless: [`decode_cell`] returns exactly the text that was
//! passed to [`encode_cell`].
//!
//! ```rust
//! use canonical::{decode_cell, encode_cell};
//!
//! let encoded = encode_cell("def f():\n    pass\n");
//! assert_eq!(decode_cell(&encoded).unwrap(), "def f():\n    pass\n");
//! ```

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Encode raw cell source.
pub fn encode_cell(source: &str) -> String {
    STANDARD.encode(source.as_bytes())
}

/// Decode an encoded cell back to its source text.
///
/// The error string describes whether the base64 or the UTF-8 layer failed;
/// callers attach the cell index.
pub fn decode_cell(encoded: &str) -> Result<String, String> {
    let bytes = STANDARD
        .decode(encoded.as_bytes())
        .map_err(|err| format!("invalid base64: {err}"))?;
    String::from_utf8(bytes).map_err(|err| format!("invalid utf-8: {err}"))
}
