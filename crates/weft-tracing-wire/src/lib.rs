//! Binary trace stream layout.
//!
//! The tracer serializes its registry and thread buffers through the write
//! half of this crate; viewers and tests reconstruct events through the read
//! half. The stream is a flat sequence of 32-bit little-endian words, so the
//! write path never needs to buffer more than one record.

mod decode;
mod format;
mod reader;
mod writer;

pub use decode::{decode_thread_events, ArgType, ArgValue, DecodedEvent};
pub use format::*;
pub use reader::{read_trace, EventDefRecord, ThreadChunk, TraceFile};
pub use writer::{write_definitions, write_header, write_thread_chunk};
