//! Cached access to the `.sqi` index file.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, ErrorKind, Seek, SeekFrom};
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::{Result, SquishError};
use crate::index::format::IndexEntry;

/// The live index sequence for one area, loaded lazily on first access
/// and cached for the life of the handle.
///
/// External modification of the index file is not observed after the
/// first load; a handle assumes it is the only writer for its area
/// (accepted staleness window, same as the reference implementation).
pub struct IndexStore {
    path: PathBuf,
    entries: Vec<IndexEntry>,
    loaded: bool,
}

impl IndexStore {
    /// Create a store for the given `.sqi` path. Nothing is read until
    /// the first access.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            entries: Vec::new(),
            loaded: false,
        }
    }

    /// Load the index if it has not been loaded yet.
    ///
    /// Deleted records (`offset == 0`) are dropped and the survivors are
    /// sorted ascending by message number — on-disk order is not
    /// guaranteed sorted. A missing or unreadable file yields an empty
    /// sequence, not an error: the area may simply not exist yet.
    fn load(&mut self) {
        if self.loaded {
            return;
        }
        self.loaded = true;

        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "No index file, empty area");
                return;
            }
        };

        let mut reader = BufReader::new(file);
        loop {
            match IndexEntry::read_from(&mut reader) {
                Ok(entry) => {
                    if entry.offset != 0 {
                        self.entries.push(entry);
                    }
                }
                Err(e) => {
                    if e.kind() != ErrorKind::UnexpectedEof {
                        warn!(path = %self.path.display(), error = %e, "Index read aborted");
                    }
                    break;
                }
            }
        }

        self.entries.sort_by_key(|e| e.message_num);
        debug!(path = %self.path.display(), count = self.entries.len(), "Index loaded");
    }

    /// Number of live entries.
    pub fn count(&mut self) -> u32 {
        self.load();
        self.entries.len() as u32
    }

    /// The live sequence, sorted by message number.
    pub fn entries(&mut self) -> &[IndexEntry] {
        self.load();
        &self.entries
    }

    /// Entry at a 1-based position, or `None` when out of range.
    pub fn entry(&mut self, position: u32) -> Option<IndexEntry> {
        self.load();
        if position == 0 {
            return None;
        }
        self.entries.get(position as usize - 1).copied()
    }

    /// Entry with the highest message number, if any.
    pub fn last(&mut self) -> Option<IndexEntry> {
        self.load();
        self.entries.last().copied()
    }

    /// Append one record to the index file and to the cache.
    ///
    /// When the area was previously empty the record is written at the
    /// start of the file (matching the data-file bootstrap case); existing
    /// entries are never renumbered.
    pub fn append(&mut self, entry: IndexEntry) -> Result<()> {
        self.load();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&self.path)
            .map_err(|e| SquishError::io(&self.path, e))?;
        let pos = if self.entries.is_empty() {
            SeekFrom::Start(0)
        } else {
            SeekFrom::End(0)
        };
        file.seek(pos).map_err(|e| SquishError::io(&self.path, e))?;
        entry
            .write_to(&mut file)
            .map_err(|e| SquishError::io(&self.path, e))?;
        self.entries.push(entry);
        Ok(())
    }
}
