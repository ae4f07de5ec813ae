//! Deterministic archive packaging
//!
//! This module implements the bundle container format: a store-only ZIP 2.0
//! archive written from first principles so identical inputs always produce
//! identical bytes. The reader side exists for bundle verification and
//! accepts exactly what the writer emits.

pub mod crc;
pub mod pack;
pub mod read;

pub use crc::crc32;
pub use pack::{dos_date_time, pack_archive, ArchiveEntry};
pub use read::{entry_data, unpack_archive, ArchiveFile};
