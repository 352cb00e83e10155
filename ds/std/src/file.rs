// Copyright 2026 The frogfs Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fs::{File, OpenOptions};
use std::path::Path;

use frogfs_ds::{check_bounds, Error, IoError, Result, Storage};
use log::debug;

/// A medium simulated by a regular file, for running the filesystem core
/// against ordinary host storage instead of real EEPROM/FRAM.
pub struct FileStorage {
    file: File,
    size: usize,
}

impl FileStorage {
    /// Creates (or truncates) `path` to hold a medium of exactly `size`
    /// bytes, zero-filled.
    pub fn create(path: impl AsRef<Path>, size: usize) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|e| Error::Io(IoError::Device(e)))?;
        file.set_len(size as u64)
            .map_err(|e| Error::Io(IoError::Device(e)))?;
        debug!("created file-backed medium of {size} bytes");
        Ok(Self { file, size })
    }

    /// Opens an existing file as a medium; the medium size is the file's
    /// current length.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| Error::Io(IoError::Device(e)))?;
        let size = file
            .metadata()
            .map_err(|e| Error::Io(IoError::Device(e)))?
            .len() as usize;
        Ok(Self { file, size })
    }
}

impl Storage for FileStorage {
    fn size(&self) -> usize {
        self.size
    }

    #[cfg(unix)]
    fn read(&self, offset: usize, buffer: &mut [u8]) -> Result<()> {
        use std::os::unix::fs::FileExt;
        check_bounds(self.size, offset, buffer.len())?;
        self.file
            .read_exact_at(buffer, offset as u64)
            .map_err(|e| Error::Io(IoError::Device(e)))
    }

    #[cfg(unix)]
    fn write(&self, offset: usize, buffer: &[u8]) -> Result<()> {
        use std::os::unix::fs::FileExt;
        check_bounds(self.size, offset, buffer.len())?;
        self.file
            .write_all_at(buffer, offset as u64)
            .map_err(|e| Error::Io(IoError::Device(e)))
    }

    #[cfg(not(unix))]
    fn read(&self, offset: usize, buffer: &mut [u8]) -> Result<()> {
        use std::io::{Read, Seek, SeekFrom};
        check_bounds(self.size, offset, buffer.len())?;
        let mut file = self.file.try_clone().map_err(|e| Error::Io(IoError::Device(e)))?;
        file.seek(SeekFrom::Start(offset as u64))
            .map_err(|e| Error::Io(IoError::Device(e)))?;
        file.read_exact(buffer).map_err(|e| Error::Io(IoError::Device(e)))
    }

    #[cfg(not(unix))]
    fn write(&self, offset: usize, buffer: &[u8]) -> Result<()> {
        use std::io::{Seek, SeekFrom, Write};
        check_bounds(self.size, offset, buffer.len())?;
        let mut file = self.file.try_clone().map_err(|e| Error::Io(IoError::Device(e)))?;
        file.seek(SeekFrom::Start(offset as u64))
            .map_err(|e| Error::Io(IoError::Device(e)))?;
        file.write_all(buffer).map_err(|e| Error::Io(IoError::Device(e)))
    }

    fn sync(&self) -> Result<()> {
        self.file.sync_all().map_err(|e| Error::Io(IoError::Device(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trips_bytes_at_offset() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("medium.bin");
        let storage = FileStorage::create(&path, 64).unwrap();
        storage.write(10, b"hello").unwrap();
        let mut buf = [0u8; 5];
        storage.read(10, &mut buf).unwrap();
        assert_eq!(&buf, b"hello");
    }

    #[test]
    fn rejects_out_of_range_access() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("medium.bin");
        let storage = FileStorage::create(&path, 16).unwrap();
        let mut buf = [0u8; 8];
        assert!(storage.read(12, &mut buf).is_err());
    }
}
