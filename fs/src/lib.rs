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

//! A record-oriented filesystem for small byte-addressable non-volatile
//! media. Records are identified by a small integer index and stored as
//! chains of non-contiguous extents, so that space freed by deletion can be
//! reused without compaction.
//!
//! [`RecordFs`] is the entry point; it is generic over any [`Storage`]
//! implementation, such as the ones in `frogfs_ds_std`.

pub mod codec;
pub mod config;
mod directory;
mod engine;
mod scanner;
mod superblock;

pub use engine::RecordFs;
pub use frogfs_ds::Storage;
pub use frogfs_err::{Error, IoError, Result};
