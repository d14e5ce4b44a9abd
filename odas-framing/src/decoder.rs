//! Incremental UTF-8 decoding across chunk boundaries.

/// Stateful UTF-8 decoder for chunked byte streams.
///
/// TCP segmentation can split a multi-byte scalar between two reads, so a
/// chunk must not be decoded in isolation. The decoder holds back an
/// incomplete trailing sequence (at most 3 bytes) and prepends it to the
/// next chunk. Invalid sequences decode to U+FFFD rather than erroring.
#[derive(Debug, Default)]
pub struct Utf8ChunkDecoder {
    /// Trailing bytes of an incomplete scalar from the previous chunk.
    partial: Vec<u8>,
}

impl Utf8ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one chunk, carrying incomplete trailing bytes to the next call.
    ///
    /// For any valid UTF-8 stream, concatenating the results of successive
    /// `decode` calls equals decoding the concatenated bytes in one go,
    /// regardless of where the chunk boundaries fall.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        if chunk.is_empty() && self.partial.is_empty() {
            return String::new();
        }

        let mut buf = std::mem::take(&mut self.partial);
        buf.extend_from_slice(chunk);

        let keep = incomplete_suffix_len(&buf);
        let split = buf.len() - keep;
        self.partial = buf[split..].to_vec();

        String::from_utf8_lossy(&buf[..split]).into_owned()
    }

    /// Emit any held-back bytes (lossily) and reset.
    ///
    /// An incomplete scalar at end of stream can never become valid, so it
    /// decodes to replacement characters.
    pub fn flush(&mut self) -> String {
        let partial = std::mem::take(&mut self.partial);
        String::from_utf8_lossy(&partial).into_owned()
    }

    /// Number of bytes currently held back.
    pub fn pending_bytes(&self) -> usize {
        self.partial.len()
    }
}

/// Length of an incomplete UTF-8 sequence at the end of `buf`, in bytes.
///
/// Returns 0 when the buffer ends on a complete scalar (or on garbage that
/// can never complete, which lossy decoding will replace).
fn incomplete_suffix_len(buf: &[u8]) -> usize {
    let max_back = buf.len().min(3);
    for back in 1..=max_back {
        let b = buf[buf.len() - back];
        if b < 0x80 {
            // ASCII is always complete.
            return 0;
        }
        if b >= 0xC0 {
            // Leading byte: how many bytes does this scalar need?
            let need = if b >= 0xF0 {
                4
            } else if b >= 0xE0 {
                3
            } else {
                2
            };
            return if need > back { back } else { 0 };
        }
        // Continuation byte, keep scanning backwards.
    }
    0
}
