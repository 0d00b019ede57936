use thiserror::Error;

/// Errors produced by [`BitStream`](crate::BitStream) operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetbitError {
    /// A write targeted byte `index` of a fixed buffer of `capacity` bytes.
    /// Fixed-mode streams never reallocate, so the write is refused.
    #[error("capacity exceeded: write at byte {index} past fixed buffer of {capacity} bytes")]
    CapacityExceeded {
        /// Byte index the write needed to touch.
        index: usize,
        /// Size of the borrowed buffer in bytes.
        capacity: usize,
    },

    /// A read targeted byte `index` with only `len` readable bytes in the
    /// stream. Also raised when a packed sequence ends with its
    /// continuation flag still set.
    #[error("end of stream: read at byte {index} with only {len} bytes available")]
    EndOfStream {
        /// Byte index the read needed to touch.
        index: usize,
        /// Number of readable bytes in the stream.
        len: usize,
    },
}

/// Convenience alias for results returned by stream operations.
pub type Result<T> = std::result::Result<T, NetbitError>;
