//! Store-only archive writer
//!
//! Builds a ZIP 2.0 archive with no compression, no extra fields, and a
//! caller-supplied timestamp, so the output is a pure function of the entry
//! names, entry bytes, and that timestamp. General-purpose ZIP writers embed
//! wall-clock times and library-version headers; this one exists to keep
//! bundles byte-reproducible.
//!
//! Layout per entry: a 30-byte local file header followed by the name and
//! raw data. After all entries: one 46-byte central directory record per
//! entry, then the 22-byte end-of-central-directory record.

use chrono::{DateTime, Datelike, Timelike, Utc};

use crate::core::archive::crc::crc32;

const LOCAL_HEADER_SIG: u32 = 0x0403_4b50;
const CENTRAL_HEADER_SIG: u32 = 0x0201_4b50;
const END_OF_DIRECTORY_SIG: u32 = 0x0605_4b50;

/// ZIP version 2.0, the minimum that understands these records
const ZIP_VERSION: u16 = 20;

/// A named entry to be packed
#[derive(Debug, Clone, Copy)]
pub struct ArchiveEntry<'a> {
    pub name: &'a str,
    pub data: &'a [u8],
}

/// Pack entries into a store-only ZIP archive
///
/// Entries appear in the archive in the order given. All entries share the
/// same modification timestamp, truncated to DOS 2-second resolution in UTC.
pub fn pack_archive(entries: &[ArchiveEntry<'_>], timestamp: DateTime<Utc>) -> Vec<u8> {
    let (dos_date, dos_time) = dos_date_time(timestamp);

    let local_len: usize = entries
        .iter()
        .map(|e| 30 + e.name.len() + e.data.len())
        .sum();
    let central_len: usize = entries.iter().map(|e| 46 + e.name.len()).sum();
    let mut buf = Vec::with_capacity(local_len + central_len + 22);

    let mut offsets = Vec::with_capacity(entries.len());
    for entry in entries {
        offsets.push(buf.len() as u32);

        let crc = crc32(entry.data);
        let size = entry.data.len() as u32;

        put_u32(&mut buf, LOCAL_HEADER_SIG);
        put_u16(&mut buf, ZIP_VERSION); // version needed
        put_u16(&mut buf, 0); // flags
        put_u16(&mut buf, 0); // compression (store)
        put_u16(&mut buf, dos_time);
        put_u16(&mut buf, dos_date);
        put_u32(&mut buf, crc);
        put_u32(&mut buf, size); // compressed size
        put_u32(&mut buf, size); // uncompressed size
        put_u16(&mut buf, entry.name.len() as u16);
        put_u16(&mut buf, 0); // extra length
        buf.extend_from_slice(entry.name.as_bytes());
        buf.extend_from_slice(entry.data);
    }

    let central_offset = buf.len() as u32;
    for (entry, offset) in entries.iter().zip(&offsets) {
        let crc = crc32(entry.data);
        let size = entry.data.len() as u32;

        put_u32(&mut buf, CENTRAL_HEADER_SIG);
        put_u16(&mut buf, ZIP_VERSION); // version made by
        put_u16(&mut buf, ZIP_VERSION); // version needed
        put_u16(&mut buf, 0); // flags
        put_u16(&mut buf, 0); // compression
        put_u16(&mut buf, dos_time);
        put_u16(&mut buf, dos_date);
        put_u32(&mut buf, crc);
        put_u32(&mut buf, size);
        put_u32(&mut buf, size);
        put_u16(&mut buf, entry.name.len() as u16);
        put_u16(&mut buf, 0); // extra length
        put_u16(&mut buf, 0); // comment length
        put_u16(&mut buf, 0); // disk start
        put_u16(&mut buf, 0); // internal attrs
        put_u32(&mut buf, 0); // external attrs
        put_u32(&mut buf, *offset);
        buf.extend_from_slice(entry.name.as_bytes());
    }

    let central_size = buf.len() as u32 - central_offset;
    put_u32(&mut buf, END_OF_DIRECTORY_SIG);
    put_u16(&mut buf, 0); // disk number
    put_u16(&mut buf, 0); // directory start disk
    put_u16(&mut buf, entries.len() as u16);
    put_u16(&mut buf, entries.len() as u16);
    put_u32(&mut buf, central_size);
    put_u32(&mut buf, central_offset);
    put_u16(&mut buf, 0); // comment length

    buf
}

/// Convert an instant to DOS date and time fields, UTC
///
/// DOS dates cannot represent years before 1980; the year saturates there.
/// Seconds are stored at 2-second resolution.
pub fn dos_date_time(ts: DateTime<Utc>) -> (u16, u16) {
    let year = ts.year().max(1980) as u16;
    let month = ts.month() as u16;
    let day = ts.day() as u16;
    let hours = ts.hour() as u16;
    let minutes = ts.minute() as u16;
    let seconds = (ts.second() / 2) as u16;

    let dos_time = (hours << 11) | (minutes << 5) | seconds;
    let dos_date = ((year - 1980) << 9) | (month << 5) | day;
    (dos_date, dos_time)
}

fn put_u16(buf: &mut Vec<u8>, value: u16) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}
