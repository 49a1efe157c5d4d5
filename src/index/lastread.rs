//! The `.sql` last-read pointer: a single little-endian u32 holding the
//! message number the user read last.

use std::fs::File;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use tracing::warn;

use crate::index::store::IndexStore;

/// Resolve the stored pointer to a 1-based position in the live index
/// sequence. Returns 0 when nothing has been read.
///
/// This is a best-effort read: a missing file, a short file, or any I/O
/// failure all count as "nothing recorded". A nonzero pointer that no
/// longer matches any indexed message number (stale after a purge)
/// resolves to the full count — the area is treated as fully read.
pub fn last_read_position(path: &Path, index: &mut IndexStore) -> u32 {
    let count = index.count();
    if count == 0 {
        return 0;
    }
    let stored = match File::open(path).and_then(|mut f| f.read_u32::<LittleEndian>()) {
        Ok(v) => v,
        Err(_) => return 0,
    };
    for (i, entry) in index.entries().iter().enumerate() {
        if entry.message_num == stored {
            return i as u32 + 1;
        }
    }
    if stored != 0 {
        return count;
    }
    0
}

/// Persist the message number at the given 1-based position, replacing
/// the file's contents entirely.
///
/// Position 0 is stored as position 1 — "nothing read" is never written
/// as an explicit pointer. Failures are logged, not returned: the call
/// surface shared across message-base kinds has no error channel and a
/// lost read pointer is cosmetic.
pub fn store_last_read(path: &Path, index: &mut IndexStore, position: u32) {
    let position = if position == 0 { 1 } else { position };
    let Some(entry) = index.entry(position) else {
        warn!(path = %path.display(), position, "No index entry for last-read position");
        return;
    };
    let mut buf = Vec::with_capacity(4);
    if let Err(e) = buf.write_u32::<LittleEndian>(entry.message_num) {
        warn!(path = %path.display(), error = %e, "Could not encode last-read pointer");
        return;
    }
    if let Err(e) = std::fs::write(path, &buf) {
        warn!(path = %path.display(), error = %e, "Could not write last-read pointer");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::format::IndexEntry;
    use std::path::PathBuf;

    fn seeded_index(dir: &Path, nums: &[u32]) -> (IndexStore, PathBuf) {
        let sqi = dir.join("area.sqi");
        let mut store = IndexStore::new(sqi);
        for (i, &num) in nums.iter().enumerate() {
            store
                .append(IndexEntry {
                    offset: 256 + i as u32 * 300,
                    message_num: num,
                    crc: 0,
                })
                .unwrap();
        }
        (store, dir.join("area.sql"))
    }

    #[test]
    fn test_missing_pointer_file_is_zero() {
        let dir = tempfile::tempdir().unwrap();
        let (mut index, sql) = seeded_index(dir.path(), &[1, 2]);
        assert_eq!(last_read_position(&sql, &mut index), 0);
    }

    #[test]
    fn test_empty_area_is_zero() {
        let dir = tempfile::tempdir().unwrap();
        let (mut index, sql) = seeded_index(dir.path(), &[]);
        std::fs::write(&sql, 5u32.to_le_bytes()).unwrap();
        assert_eq!(last_read_position(&sql, &mut index), 0);
    }

    #[test]
    fn test_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let (mut index, sql) = seeded_index(dir.path(), &[10, 20, 30]);
        store_last_read(&sql, &mut index, 2);
        assert_eq!(last_read_position(&sql, &mut index), 2);
        // The file stores the message number, not the position.
        assert_eq!(std::fs::read(&sql).unwrap(), 20u32.to_le_bytes());
    }

    #[test]
    fn test_position_zero_stored_as_first() {
        let dir = tempfile::tempdir().unwrap();
        let (mut index, sql) = seeded_index(dir.path(), &[10, 20]);
        store_last_read(&sql, &mut index, 0);
        assert_eq!(std::fs::read(&sql).unwrap(), 10u32.to_le_bytes());
    }

    #[test]
    fn test_stale_pointer_means_fully_read() {
        let dir = tempfile::tempdir().unwrap();
        let (mut index, sql) = seeded_index(dir.path(), &[10, 20, 30]);
        // Message 5 was purged long ago.
        std::fs::write(&sql, 5u32.to_le_bytes()).unwrap();
        assert_eq!(last_read_position(&sql, &mut index), 3);
    }

    #[test]
    fn test_explicit_zero_pointer_is_unread() {
        let dir = tempfile::tempdir().unwrap();
        let (mut index, sql) = seeded_index(dir.path(), &[10, 20]);
        std::fs::write(&sql, 0u32.to_le_bytes()).unwrap();
        assert_eq!(last_read_position(&sql, &mut index), 0);
    }

    #[test]
    fn test_short_file_is_zero() {
        let dir = tempfile::tempdir().unwrap();
        let (mut index, sql) = seeded_index(dir.path(), &[10]);
        std::fs::write(&sql, [0x01, 0x02]).unwrap();
        assert_eq!(last_read_position(&sql, &mut index), 0);
    }
}
