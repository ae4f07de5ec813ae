//! Store-only archive reader
//!
//! Parses archives produced by [`pack_archive`] (or any ZIP 2.0 store-only
//! archive) for bundle verification. The reader walks the central directory
//! rather than the local records, which is what the format requires: the
//! central directory is the authoritative index, and an end-of-central-
//! directory record may be followed by a trailing comment of up to 65535
//! bytes.
//!
//! [`pack_archive`]: crate::core::archive::pack::pack_archive

use crate::domain::errors::ArchiveError;
use crate::domain::Result;

const LOCAL_HEADER_SIG: u32 = 0x0403_4b50;
const CENTRAL_HEADER_SIG: u32 = 0x0201_4b50;

/// Longest possible distance of the end record from the end of the file:
/// 22 fixed bytes plus a 65535-byte comment
const END_RECORD_SEARCH_WINDOW: usize = 65558;

/// An entry extracted from an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveFile {
    pub name: String,
    pub data: Vec<u8>,
}

/// Unpack a store-only archive into its entries
///
/// Entries come back in central-directory order. Only compression method 0
/// (store) is accepted.
///
/// # Errors
///
/// Returns `ArchiveError` variants for a missing end record, compressed
/// entries, local header mismatches, and records extending past the end of
/// the buffer.
pub fn unpack_archive(bytes: &[u8]) -> Result<Vec<ArchiveFile>> {
    let eocd = find_end_of_directory(bytes).ok_or(ArchiveError::MissingEndOfDirectory)?;

    let dir_size = read_u32(bytes, eocd + 12)? as usize;
    let dir_offset = read_u32(bytes, eocd + 16)? as usize;
    let dir_end = dir_offset
        .checked_add(dir_size)
        .ok_or_else(|| ArchiveError::Truncated("central directory size overflows".to_string()))?;

    let mut files = Vec::new();
    let mut offset = dir_offset;

    while offset < dir_end {
        if read_u32(bytes, offset)? != CENTRAL_HEADER_SIG {
            break;
        }

        let compression = read_u16(bytes, offset + 10)?;
        let size = read_u32(bytes, offset + 20)? as usize;
        let name_len = read_u16(bytes, offset + 28)? as usize;
        let extra_len = read_u16(bytes, offset + 30)? as usize;
        let comment_len = read_u16(bytes, offset + 32)? as usize;
        let local_offset = read_u32(bytes, offset + 42)? as usize;

        let name_start = offset + 46;
        let name = String::from_utf8_lossy(slice_at(bytes, name_start, name_len)?).into_owned();

        if compression != 0 {
            return Err(ArchiveError::UnsupportedCompression {
                name,
                method: compression,
            }
            .into());
        }

        if read_u32(bytes, local_offset)? != LOCAL_HEADER_SIG {
            return Err(ArchiveError::InvalidLocalHeader(name).into());
        }

        // The local record may carry its own name/extra lengths; the data
        // starts after both.
        let local_name_len = read_u16(bytes, local_offset + 26)? as usize;
        let local_extra_len = read_u16(bytes, local_offset + 28)? as usize;
        let data_start = local_offset + 30 + local_name_len + local_extra_len;
        let data = slice_at(bytes, data_start, size)?.to_vec();

        files.push(ArchiveFile { name, data });

        offset = name_start + name_len + extra_len + comment_len;
    }

    Ok(files)
}

/// Borrow the data of a named entry
///
/// # Errors
///
/// Returns `ArchiveError::MissingEntry` when no entry has that name.
pub fn entry_data<'a>(files: &'a [ArchiveFile], name: &str) -> Result<&'a [u8]> {
    files
        .iter()
        .find(|f| f.name == name)
        .map(|f| f.data.as_slice())
        .ok_or_else(|| ArchiveError::MissingEntry(name.to_string()).into())
}

/// Scan backwards for the end-of-central-directory signature
fn find_end_of_directory(bytes: &[u8]) -> Option<usize> {
    let last = bytes.len().checked_sub(22)?;
    let min = bytes.len().saturating_sub(END_RECORD_SEARCH_WINDOW);
    (min..=last)
        .rev()
        .find(|&i| bytes[i..i + 4] == [0x50, 0x4b, 0x05, 0x06])
}

fn slice_at(bytes: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    offset
        .checked_add(len)
        .and_then(|end| bytes.get(offset..end))
        .ok_or_else(|| ArchiveError::Truncated(format!("record at offset {offset}")).into())
}

fn read_u16(bytes: &[u8], offset: usize) -> Result<u16> {
    let slice = slice_at(bytes, offset, 2)?;
    Ok(u16::from_le_bytes([slice[0], slice[1]]))
}

fn read_u32(bytes: &[u8], offset: usize) -> Result<u32> {
    let slice = slice_at(bytes, offset, 4)?;
    Ok(u32::from_le_bytes([slice[0], slice[1], slice[2], slice[3]]))
}
