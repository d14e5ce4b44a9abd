//! Message framing for ODAS sound-source streams.
//!
//! ODAS emits JSON objects back to back over TCP with no length prefix;
//! consecutive objects are only separated by the three characters `}\n{`
//! at the boundary. This crate turns arbitrarily segmented byte chunks
//! back into whole message strings:
//!
//! - [`Utf8ChunkDecoder`] — stateful text decoding that tolerates a
//!   multi-byte scalar split across two chunks
//! - [`Reassembler`] — pending-buffer framing on the `}\n{` separator,
//!   with repair of the boundary characters the split consumes
//!
//! No networking, no async, no JSON validation — callers own all of that.

pub mod decoder;
pub mod reassembler;

pub use decoder::Utf8ChunkDecoder;
pub use reassembler::{Reassembler, DEFAULT_MAX_PENDING_BYTES, SEPARATOR};
