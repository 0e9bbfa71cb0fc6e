use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{encoding_error, RelayResult};

/// Line width of MIME base64 output
const MIME_LINE_WIDTH: usize = 76;

/// Base64 with MIME line wrapping (76 columns, CRLF separated)
pub fn encode_mime(bytes: &[u8]) -> String {
    let encoded = STANDARD.encode(bytes);
    let mut wrapped = String::with_capacity(encoded.len() + encoded.len() / MIME_LINE_WIDTH * 2);
    for (i, chunk) in encoded.as_bytes().chunks(MIME_LINE_WIDTH).enumerate() {
        if i > 0 {
            wrapped.push_str("\r\n");
        }
        // base64 output is ASCII, so byte chunks are valid str slices
        wrapped.push_str(&String::from_utf8_lossy(chunk));
    }
    wrapped
}

/// Encode an envelope as a single unbroken base64 string
pub fn encode_attachment(envelope: &str) -> String {
    encode_mime(envelope.as_bytes())
        .chars()
        .filter(|c| *c != '\r' && *c != '\n')
        .collect()
}

/// Like [`encode_attachment`], for bytes that still have to prove they are UTF-8
pub fn encode_attachment_bytes(bytes: &[u8]) -> RelayResult<String> {
    let envelope = std::str::from_utf8(bytes)
        .map_err(|e| encoding_error(&format!("Envelope is not valid UTF-8: {}", e)))?;
    Ok(encode_attachment(envelope))
}
