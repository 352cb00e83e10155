//! Error taxonomy shared by the storage adapter and the record filesystem.
//!
//! Every fallible operation in frogfs surfaces one of these variants rather
//! than recovering internally; callers decide what to do about a corrupt
//! medium or an exhausted allocation.

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A caller passed a required output buffer/sink as absent.
    #[error("required buffer is null")]
    NullPointer,
    /// The storage adapter reported failure on seek/read/write.
    #[error("storage I/O error: {0}")]
    Io(#[from] IoError),
    /// Boot scan found a missing or mismatched magic/version.
    #[error("medium is not formatted")]
    NotFormatted,
    /// A record index is `>= N`, or a requested size exceeds `MAX_RECORD_SIZE`.
    #[error("invalid record index or size")]
    InvalidRecord,
    /// The free-space scanner could not satisfy an allocation request.
    #[error("no contiguous free space available")]
    NoSpace,
    /// A write was attempted on a record not open for write.
    #[error("record is not open for write")]
    NotWritable,
    /// A read was attempted on a record open for write.
    #[error("record is not open for read")]
    NotReadable,
    /// Close (or another state-sensitive operation) found no valid open state.
    #[error("operation is invalid in the record's current state")]
    InvalidOperation,
    /// Malformed metadata or a pointer fragment outside the medium was found
    /// during a scan. The filesystem may be corrupt.
    #[error("malformed metadata or out-of-range pointer: {0}")]
    OutOfRange(&'static str),
}

#[derive(thiserror::Error, Debug)]
pub enum IoError {
    #[error("seek past end of medium: offset {offset} >= size {size}")]
    SeekOutOfRange { offset: u64, size: u64 },
    #[error("device I/O failure: {0}")]
    Device(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
