//! The fixed-width HTTP/1.1 envelope wrapped around the block stream.

pub const CONTENT_LENGTH_WIDTH: usize = 16;

/// Build the literal HTTP header bytes for a body of `content_length` bytes.
///
/// `Content-length` is always exactly [`CONTENT_LENGTH_WIDTH`] ASCII
/// characters, left-justified and space-padded, so the header's total byte
/// length never changes when the body is replaced (e.g. by its LZ4-compressed
/// form) — only the digits inside that fixed field change.
pub fn build_header(content_length: u64) -> Vec<u8> {
    format!(
        "HTTP/1.1 200 OK\r\n\
         Connection: close\r\n\
         Content-type: application/octet-stream\r\n\
         Content-length: {:<width$}\r\n\
         \r\n",
        content_length,
        width = CONTENT_LENGTH_WIDTH
    )
    .into_bytes()
}

/// Locate the end of the HTTP header section (`\r\n\r\n`), returning the
/// offset of the first byte of the body.
pub fn find_end_of_headers(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n").map(|pos| pos + 4)
}
