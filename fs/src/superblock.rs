//! The 5-byte on-media superblock: a fixed-layout header, modeled the way
//! other fixed-layout on-media headers in this codebase are — as a
//! `zerocopy`-derived `#[repr(C)]` struct read directly into/out of a byte
//! buffer, rather than by hand-packing bytes the way the metadata word is.

use frogfs_err::{Error, Result};
use zerocopy::byteorder::little_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::config::SUPERBLOCK_SIZE;

const MAGIC: u32 = 0x534C5966;
const VERSION: u8 = 1;

#[repr(C)]
#[derive(Debug, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct Superblock {
    magic: U32,
    version: u8,
}

impl Superblock {
    pub fn new() -> Self {
        Self { magic: U32::new(MAGIC), version: VERSION }
    }

    pub fn is_valid(&self) -> bool {
        self.magic.get() == MAGIC && self.version == VERSION
    }
}

impl Default for Superblock {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads and validates the superblock from `storage`. Returns
/// [`Error::NotFormatted`] when the magic or version do not match.
pub fn read_and_validate(storage: &impl frogfs_ds::Storage) -> Result<()> {
    let mut superblock = Superblock::new_zeroed();
    storage.read(0, superblock.as_mut_bytes())?;
    if !superblock.is_valid() {
        return Err(Error::NotFormatted);
    }
    Ok(())
}

/// Writes a fresh superblock at offset 0.
pub fn write(storage: &impl frogfs_ds::Storage) -> Result<()> {
    storage.write(0, Superblock::new().as_bytes())
}
