//! The record engine: format, boot scan, open/close, sequential write with
//! fragment chaining, and the traversal shared by read and erase.

use frogfs_ds::Storage;
use frogfs_err::{Error, Result};
use log::{debug, trace};

use crate::codec::{self, DataKind, Kind};
use crate::config::{RecordFsConfig, MAX_RECORD_SIZE, SUPERBLOCK_SIZE};
use crate::directory::{Directory, EXTENT_EXHAUSTED};
use crate::scanner;
use crate::superblock;

/// A record filesystem bound to a particular storage medium.
///
/// A single instance owns the only in-memory directory for `storage`; two
/// instances over the same medium would race on both the directory and the
/// medium's free-space invariant.
pub struct RecordFs<S: Storage> {
    storage: S,
    directory: Directory,
    config: RecordFsConfig,
}

impl<S: Storage> RecordFs<S> {
    pub fn new(storage: S, config: RecordFsConfig) -> Self {
        let directory = Directory::new(config.record_count());
        Self { storage, directory, config }
    }

    pub fn record_count(&self) -> u8 {
        self.config.record_count()
    }

    /// Hands back the underlying storage, consuming this filesystem. Useful
    /// for simulating a reboot: drop the in-memory directory, keep the
    /// medium, and build a fresh `RecordFs` over it.
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// The first-extent offset of `r`, or `0` if it does not exist.
    pub fn offset_of(&self, r: u8) -> Result<usize> {
        Ok(self.directory.get(r)?.offset)
    }

    /// Zeroes the entire medium and writes a fresh superblock. All records
    /// are gone; subsequent `init` reports an empty directory.
    pub fn format(&mut self) -> Result<()> {
        debug!("formatting {} byte medium", self.storage.size());
        let zeros = vec![0u8; self.storage.size()];
        self.storage.write(0, &zeros)?;
        superblock::write(&self.storage)?;
        self.directory.clear();
        Ok(())
    }

    /// Rebuilds the directory from the on-media layout. Fails with
    /// [`Error::NotFormatted`] if the superblock is missing or stale, and
    /// with [`Error::OutOfRange`] if the data area contains malformed
    /// metadata.
    pub fn init(&mut self) -> Result<()> {
        self.directory.clear();
        superblock::read_and_validate(&self.storage)?;

        let size = self.storage.size();
        let count = self.config.record_count();
        let mut cursor = SUPERBLOCK_SIZE;

        while cursor < size {
            if cursor + 3 > size {
                // Fewer than 3 bytes remain; valid only if they are trailing
                // free space.
                let mut tail = vec![0u8; size - cursor];
                self.storage.read(cursor, &mut tail)?;
                if tail.iter().any(|&b| b != 0) {
                    return Err(Error::OutOfRange("truncated metadata word at end of storage"));
                }
                break;
            }

            let mut window = [0u8; 3];
            self.storage.read(cursor, &mut window)?;
            if !codec::is_header_start(window) {
                cursor += 1;
                continue;
            }
            let word = codec::decode(window);
            let index = word.index.ok_or(Error::OutOfRange("zero index field outside a free run"))?;

            match (word.kind, word.data_kind) {
                (Kind::Normal, DataKind::Size) => {
                    if index >= count {
                        return Err(Error::OutOfRange("record index exceeds configured count"));
                    }
                    let state = self.directory.get_mut(index)?;
                    if state.offset != 0 {
                        return Err(Error::OutOfRange("two primary headers for the same record"));
                    }
                    state.offset = cursor;
                    cursor += 3 + word.payload as usize;
                }
                (Kind::Fragment, DataKind::Pointer) => {
                    let target = word.payload as usize;
                    if !(target > SUPERBLOCK_SIZE && target < size) {
                        return Err(Error::OutOfRange("fragment pointer target out of bounds"));
                    }
                    cursor += 3;
                }
                (Kind::Fragment, DataKind::Size) => {
                    cursor += 3 + word.payload as usize;
                }
                (Kind::Normal, DataKind::Pointer) => {
                    return Err(Error::OutOfRange("primary header cannot carry a pointer payload"));
                }
            }

            if cursor > size {
                return Err(Error::OutOfRange("metadata run past end of storage"));
            }
        }

        Ok(())
    }

    pub fn list(&self, buf: &mut [u8]) -> usize {
        self.directory.list(buf)
    }

    pub fn next_available(&self) -> Result<u8> {
        self.directory.next_available()
    }

    /// Binds `r` for access: re-opening an existing record positions it for
    /// reading, while a nonexistent record gets a freshly allocated first
    /// extent and is positioned for writing.
    pub fn open(&mut self, r: u8) -> Result<()> {
        if r >= self.config.record_count() {
            return Err(Error::InvalidRecord);
        }

        if self.directory.get(r)?.offset > 0 {
            let state = self.directory.get_mut(r)?;
            state.write_offset = 0;
            state.work_reg_1 = 0;
            state.work_reg_2 = 0;
            return Ok(());
        }

        let free = scanner::find_free_space(&self.storage)?;
        let header = codec::encode(Kind::Normal, DataKind::Size, r, 0);
        self.storage.write(free.space_start, &header)?;
        trace!("opened record {r} for write at offset {}", free.space_start);

        let state = self.directory.get_mut(r)?;
        state.offset = free.space_start;
        state.write_offset = free.data_start;
        state.work_reg_1 = free.data_size;
        state.work_reg_2 = 0;
        Ok(())
    }

    /// Appends `data` to a record open for write. On a mid-write I/O or
    /// space failure, the current extent's header is still patched to
    /// reflect whatever prefix was durably written.
    pub fn write(&mut self, r: u8, data: &[u8]) -> Result<()> {
        if r >= self.config.record_count() {
            return Err(Error::InvalidRecord);
        }
        if data.len() > MAX_RECORD_SIZE {
            return Err(Error::InvalidRecord);
        }
        if self.directory.get(r)?.write_offset == 0 {
            return Err(Error::NotWritable);
        }

        let mut written = 0usize;
        loop {
            let state = *self.directory.get(r)?;

            if written == data.len() {
                self.patch_header(r, state.write_offset, state.work_reg_2)?;
                return Ok(());
            }

            if state.work_reg_2 < state.work_reg_1 {
                let room = state.work_reg_1 - state.work_reg_2;
                let take = room.min(data.len() - written);
                let offset = state.write_offset + state.work_reg_2;
                if let Err(err) = self.storage.write(offset, &data[written..written + take]) {
                    self.patch_header(r, state.write_offset, state.work_reg_2)?;
                    return Err(err);
                }
                written += take;
                self.directory.get_mut(r)?.work_reg_2 = state.work_reg_2 + take;
                continue;
            }

            match scanner::find_free_space(&self.storage) {
                Ok(free) => {
                    let pointer_offset = state.write_offset + state.work_reg_1;
                    let pointer = codec::encode(Kind::Fragment, DataKind::Pointer, r, free.space_start as u16);
                    self.storage.write(pointer_offset, &pointer)?;
                    let header = codec::encode(Kind::Fragment, DataKind::Size, r, 0);
                    self.storage.write(free.space_start, &header)?;
                    trace!("record {r} chained to new extent at offset {}", free.space_start);

                    let st = self.directory.get_mut(r)?;
                    st.write_offset = free.data_start;
                    st.work_reg_1 = free.data_size;
                    st.work_reg_2 = 0;
                }
                Err(err) => {
                    self.patch_header(r, state.write_offset, state.work_reg_2)?;
                    return Err(err);
                }
            }
        }
    }

    /// Rewrites the 3-byte header belonging to `write_offset`'s extent with
    /// `len` as its payload. The kind bits are re-derived from whether this
    /// is the record's first extent, rather than trusted from storage.
    fn patch_header(&self, r: u8, write_offset: usize, len: usize) -> Result<()> {
        let header_offset = write_offset - 3;
        let kind = if header_offset == self.directory.get(r)?.offset { Kind::Normal } else { Kind::Fragment };
        let word = codec::encode(kind, DataKind::Size, r, len as u16);
        self.storage.write(header_offset, &word)
    }

    /// Reads up to `buf.len()` bytes from `r`, returning the number actually
    /// transferred. Fewer than `buf.len()` bytes means the record's chain
    /// ended first.
    pub fn read(&mut self, r: u8, buf: &mut [u8]) -> Result<usize> {
        self.traverse(r, Some(buf))
    }

    /// Zeroes every extent of `r` and removes it from the directory.
    pub fn erase(&mut self, r: u8) -> Result<()> {
        self.traverse(r, None)?;
        self.directory.get_mut(r)?.offset = 0;
        Ok(())
    }

    /// Shared read/erase state machine: walks a record's extent chain,
    /// transferring or zeroing bytes as it goes. `buf == None` selects erase.
    fn traverse(&mut self, r: u8, buf: Option<&mut [u8]>) -> Result<usize> {
        if r >= self.config.record_count() {
            return Err(Error::InvalidRecord);
        }
        let initial = *self.directory.get(r)?;
        if initial.write_offset != 0 {
            return Err(Error::NotReadable);
        }
        if initial.offset == 0 {
            return Ok(0);
        }

        let erasing = buf.is_none();
        let want = buf.as_ref().map_or(0, |b| b.len());
        let mut buf = buf;

        let mut cursor = 0usize;
        let mut remaining = 0usize;
        let mut effective = 0usize;
        let mut started = false;

        loop {
            if !erasing && effective >= want {
                break;
            }

            if !started {
                started = true;
                let mut header = [0u8; 3];
                self.storage.read(initial.offset, &mut header)?;
                if erasing {
                    self.storage.write(initial.offset, &[0u8; 3])?;
                }
                let word = codec::decode(header);
                cursor = initial.offset + 3;
                remaining = word.payload as usize;
                if remaining == 0 {
                    remaining = EXTENT_EXHAUSTED;
                }
            } else if remaining != EXTENT_EXHAUSTED {
                let take = if erasing { remaining } else { (want - effective).min(remaining) };
                if take > 0 {
                    if erasing {
                        let zeros = vec![0u8; take];
                        self.storage.write(cursor, &zeros)?;
                    } else {
                        let out = buf.as_deref_mut().expect("buf present when not erasing");
                        self.storage.read(cursor, &mut out[effective..effective + take])?;
                        effective += take;
                    }
                    cursor += take;
                    remaining -= take;
                }
                if remaining == 0 {
                    remaining = EXTENT_EXHAUSTED;
                }
            } else {
                let header_pos = cursor;
                let mut header = [0u8; 3];
                self.storage.read(header_pos, &mut header)?;
                let word = codec::decode(header);
                if word.index != Some(r) {
                    // Chain terminated: the next bytes belong to something
                    // else (or nothing), not another fragment of this record.
                    break;
                }
                match (word.kind, word.data_kind) {
                    (Kind::Normal, _) => break,
                    (Kind::Fragment, DataKind::Size) => {
                        if erasing {
                            self.storage.write(header_pos, &[0u8; 3])?;
                        }
                        cursor = header_pos + 3;
                        remaining = word.payload as usize;
                        if remaining == 0 {
                            remaining = EXTENT_EXHAUSTED;
                        }
                    }
                    (Kind::Fragment, DataKind::Pointer) => {
                        if erasing {
                            self.storage.write(header_pos, &[0u8; 3])?;
                        }
                        cursor = word.payload as usize;
                        remaining = EXTENT_EXHAUSTED;
                    }
                }
            }
        }

        Ok(effective)
    }

    /// Resets the per-record open state. Idempotent on a record that was
    /// opened but never read from or written to.
    pub fn close(&mut self, r: u8) -> Result<()> {
        let state = self.directory.get_mut(r)?;
        state.write_offset = 0;
        state.work_reg_1 = 0;
        state.work_reg_2 = 0;
        Ok(())
    }
}
