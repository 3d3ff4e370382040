//! Generic `off,len` chunker shared by every `qXfer` stream (§4.8).

use crate::hex;

/// Slice `buf[off..]` down to at most `len` bytes and prefix the result with
/// `"m"` (more data follows) or `"l"` (this is the last chunk), hex-encoded.
///
/// `off >= buf.len()` means there is nothing left to send: `"l"` alone.
#[must_use]
pub fn chunk(buf: &[u8], off: usize, len: usize) -> String {
    if off >= buf.len() {
        return "l".to_string();
    }
    let end = (off + len).min(buf.len());
    let slice = &buf[off..end];
    let prefix = if end < buf.len() { "m" } else { "l" };
    format!("{prefix}{}", hex::encode(slice))
}
