//! Pending-buffer reassembly of `}\n{`-delimited JSON messages.

use tracing::warn;

use crate::decoder::Utf8ChunkDecoder;

/// Boundary between two consecutive ODAS messages on the wire.
pub const SEPARATOR: &str = "}\n{";

/// Pending-buffer cap. A peer that never sends a separator would otherwise
/// grow the buffer without bound (the listeners accept anyone).
pub const DEFAULT_MAX_PENDING_BYTES: usize = 1024 * 1024;

/// Turns arbitrarily chunked bytes into whole message strings.
///
/// One instance per connection; the pending buffer is the unterminated
/// tail of the most recent data and must never be shared across
/// connections. At rest it holds either nothing or a prefix of the next
/// message.
#[derive(Debug)]
pub struct Reassembler {
    decoder: Utf8ChunkDecoder,
    pending: String,
    max_pending_bytes: usize,
}

impl Default for Reassembler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PENDING_BYTES)
    }
}

impl Reassembler {
    pub fn new(max_pending_bytes: usize) -> Self {
        Self {
            decoder: Utf8ChunkDecoder::new(),
            pending: String::new(),
            max_pending_bytes,
        }
    }

    /// Feed one chunk, returning every message completed by it, in order.
    ///
    /// Splitting on [`SEPARATOR`] consumes the closing `}` of the left
    /// message and the opening `{` of the right one, so every candidate
    /// except the surviving tail gets its boundary characters repaired
    /// before it is emitted. The tail stays pending until a later chunk
    /// terminates it. Emitted text is not validated as JSON; a malformed
    /// message on the wire stays malformed here.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        let decoded = self.decoder.decode(chunk);
        if decoded.is_empty() {
            return Vec::new();
        }
        self.pending.push_str(&decoded);

        let mut parts: Vec<&str> = self.pending.split(SEPARATOR).collect();
        if parts.len() < 2 {
            // No boundary yet; everything stays pending.
            self.enforce_cap();
            return Vec::new();
        }

        let tail = parts.pop().map(str::to_owned).unwrap_or_default();
        let messages: Vec<String> = parts.into_iter().map(repair).collect();

        self.pending = tail;
        self.enforce_cap();
        messages
    }

    /// Current unterminated tail.
    pub fn pending(&self) -> &str {
        &self.pending
    }

    fn enforce_cap(&mut self) {
        if self.pending.len() > self.max_pending_bytes {
            warn!(
                "pending buffer exceeded {} bytes ({}), discarding; \
                 framing resynchronizes at the next boundary",
                self.max_pending_bytes,
                self.pending.len()
            );
            self.pending.clear();
        }
    }
}

/// Restore the boundary characters the separator split consumed.
///
/// Prepend `{` when missing. Append `}` only when neither the second- nor
/// the third-to-last character already is one — a message ending in `}}`
/// or `}]` lost only the separator's brace, while one ending mid-object
/// needs it back. Out-of-range positions count as "not `}`".
fn repair(candidate: &str) -> String {
    let mut msg = if candidate.starts_with('{') {
        candidate.to_owned()
    } else {
        let mut s = String::with_capacity(candidate.len() + 2);
        s.push('{');
        s.push_str(candidate);
        s
    };

    let mut rev = msg.chars().rev();
    rev.next(); // last char
    let second_last = rev.next();
    let third_last = rev.next();
    if second_last != Some('}') && third_last != Some('}') {
        msg.push('}');
    }
    msg
}
