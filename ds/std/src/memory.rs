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

use std::cell::RefCell;

use frogfs_ds::{check_bounds, Result, Storage};

/// A medium backed by a plain in-memory buffer. Fast and deterministic,
/// intended for unit and scenario tests where no real device is available.
pub struct MemoryStorage {
    bytes: RefCell<Vec<u8>>,
}

impl MemoryStorage {
    /// Creates a zero-filled medium of `size` bytes.
    pub fn new(size: usize) -> Self {
        Self {
            bytes: RefCell::new(vec![0u8; size]),
        }
    }

    /// Returns a snapshot of the medium's current contents.
    pub fn snapshot(&self) -> Vec<u8> {
        self.bytes.borrow().clone()
    }
}

impl Storage for MemoryStorage {
    fn size(&self) -> usize {
        self.bytes.borrow().len()
    }

    fn read(&self, offset: usize, buffer: &mut [u8]) -> Result<()> {
        let bytes = self.bytes.borrow();
        check_bounds(bytes.len(), offset, buffer.len())?;
        buffer.copy_from_slice(&bytes[offset..offset + buffer.len()]);
        Ok(())
    }

    fn write(&self, offset: usize, buffer: &[u8]) -> Result<()> {
        let mut bytes = self.bytes.borrow_mut();
        check_bounds(bytes.len(), offset, buffer.len())?;
        bytes[offset..offset + buffer.len()].copy_from_slice(buffer);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_zero_filled() {
        let storage = MemoryStorage::new(32);
        assert_eq!(storage.snapshot(), vec![0u8; 32]);
    }

    #[test]
    fn round_trips_bytes_at_offset() {
        let storage = MemoryStorage::new(32);
        storage.write(4, &[1, 2, 3]).unwrap();
        let mut buf = [0u8; 3];
        storage.read(4, &mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3]);
    }

    #[test]
    fn rejects_out_of_range_access() {
        let storage = MemoryStorage::new(8);
        assert!(storage.write(6, &[1, 2, 3]).is_err());
    }
}
