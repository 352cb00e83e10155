//! The free-space scanner: walks the data area one metadata word at a time,
//! distinguishing encoded headers from free space purely from the no-zero-
//! in-the-index-field invariant, and reports the first hole large enough to
//! allocate from.

use frogfs_ds::Storage;
use frogfs_err::{Error, Result};
use log::trace;

use crate::codec::{self, DataKind};
use crate::config::{MIN_HOLE, SUPERBLOCK_SIZE};

/// A free hole big enough to allocate an extent from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeSpace {
    /// Offset of the header that will be written at the start of the hole.
    pub space_start: usize,
    /// Offset immediately after the header, where extent data begins.
    pub data_start: usize,
    /// Usable data bytes: the hole length minus the header and the 3 bytes
    /// reserved for a trailing pointer fragment, should the extent need to
    /// chain further.
    pub data_size: usize,
}

/// Scans from just past the superblock for the first hole of at least
/// [`MIN_HOLE`] zero bytes. A hole's start is always exactly where a byte
/// with a zero index field is encountered, since every valid header has a
/// nonzero index field and the data area otherwise holds either headers or
/// fully-zeroed free runs.
pub fn find_free_space(storage: &impl Storage) -> Result<FreeSpace> {
    let size = storage.size();
    let mut cursor = SUPERBLOCK_SIZE;

    loop {
        if cursor + 3 > size {
            return Err(Error::NoSpace);
        }

        let mut window = [0u8; 3];
        storage.read(cursor, &mut window)?;
        cursor += 3;

        if !codec::is_header_start(window) {
            let space_start = cursor - 3;
            let zero_run = count_zero_run(storage, space_start, size)?;
            if zero_run >= MIN_HOLE {
                trace!("found {zero_run}-byte hole at offset {space_start}");
                return Ok(FreeSpace {
                    space_start,
                    data_start: space_start + 3,
                    data_size: zero_run - MIN_HOLE,
                });
            }
            // Hole too small; resume scanning from the first nonzero byte,
            // which must be the start of the next metadata word.
            cursor = space_start + zero_run;
            continue;
        }

        let word = codec::decode(window);
        match word.data_kind {
            DataKind::Size => cursor += word.payload as usize,
            DataKind::Pointer => {}
        }
    }
}

/// Counts consecutive zero bytes starting at `start`, stopping at the first
/// nonzero byte or the end of the medium.
fn count_zero_run(storage: &impl Storage, start: usize, size: usize) -> Result<usize> {
    let mut probe = start;
    while probe < size {
        let mut byte = [0u8; 1];
        storage.read(probe, &mut byte)?;
        if byte[0] != 0 {
            break;
        }
        probe += 1;
    }
    Ok(probe - start)
}
