//! The storage adapter interface consumed by the record filesystem core.
//!
//! An adapter is a byte-addressable, blocking medium: an EEPROM driver, an
//! FRAM controller, or (for testing) a plain file or in-memory buffer. The
//! core never assumes a live cursor survives across its own calls and always
//! addresses the medium by absolute offset, so implementations are free to
//! be as simple as a single `read`/`write` pair over a fixed-size backing
//! store.

pub use frogfs_err::{Error, IoError, Result};

/// A fixed-size, byte-addressable medium.
///
/// All offsets are in bytes, measured from the start of the medium. `size`
/// is fixed for the lifetime of the adapter; callers are expected to check
/// `offset + buffer.len() <= size()` themselves, but implementations must
/// still reject out-of-range accesses with [`IoError::SeekOutOfRange`]
/// rather than panicking.
pub trait Storage {
    /// Medium capacity in bytes.
    fn size(&self) -> usize;

    /// Reads `buffer.len()` bytes starting at `offset`.
    fn read(&self, offset: usize, buffer: &mut [u8]) -> Result<()>;

    /// Writes `buffer` starting at `offset`.
    fn write(&self, offset: usize, buffer: &[u8]) -> Result<()>;

    /// Flushes any buffered writes to the underlying medium.
    ///
    /// The default implementation is a no-op, appropriate for adapters that
    /// write through immediately.
    fn sync(&self) -> Result<()> {
        Ok(())
    }

    /// Releases any resources held by the adapter.
    ///
    /// The default implementation is a no-op.
    fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Checks that `offset..offset + len` falls within `size`, returning
/// [`IoError::SeekOutOfRange`] otherwise. Adapters can use this to implement
/// `read`/`write` bounds checking consistently.
pub fn check_bounds(size: usize, offset: usize, len: usize) -> Result<()> {
    let end = offset.checked_add(len).ok_or(Error::Io(IoError::SeekOutOfRange {
        offset: offset as u64,
        size: size as u64,
    }))?;
    if end > size {
        return Err(Error::Io(IoError::SeekOutOfRange {
            offset: offset as u64,
            size: size as u64,
        }));
    }
    Ok(())
}
