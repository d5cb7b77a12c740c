pub mod reader;
pub mod writer;

use thiserror::Error;

/// Default ceiling for a single inflated chunk.
pub const MAX_INFLATED_LEN: usize = 64 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unexpected end of data")]
    Truncated(#[from] std::io::Error),
    #[error("bad container magic {0:#010x}")]
    BadMagic(u32),
    #[error("corrupt compressed stream: {0}")]
    CorruptCompression(String),
    #[error("variable-length integer longer than 5 bytes")]
    BadVarInt,
    #[error("unknown chunk '{0}'")]
    UnknownChunk(String),
    #[error("malformed chunk: {0}")]
    BadChunk(String),
}
