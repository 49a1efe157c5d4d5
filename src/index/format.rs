//! Binary index record format.
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ RECORD (12 bytes, repeating)         │
//! │  offset: u32 LE                      │
//! │  message_num: u32 LE                 │
//! │  crc: u32 LE                         │
//! └──────────────────────────────────────┘
//! ```
//!
//! A record with `offset == 0` is a deleted/placeholder slot and is not
//! part of the live sequence.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

/// Size of one index record in bytes.
pub const RECORD_SIZE: usize = 12;

/// One index record: where a message's frame lives and how to verify it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    /// Byte offset of the frame in the `.sqd` data file (0 = deleted).
    pub offset: u32,
    /// Persistent, monotonically assigned message number. Not the same
    /// as the record's position in the file.
    pub message_num: u32,
    /// Case-folded hash of the recipient field; the high bit mirrors the
    /// frame's read attribute.
    pub crc: u32,
}

impl IndexEntry {
    /// Decode one record from a reader.
    pub fn read_from(r: &mut impl Read) -> std::io::Result<Self> {
        Ok(Self {
            offset: r.read_u32::<LittleEndian>()?,
            message_num: r.read_u32::<LittleEndian>()?,
            crc: r.read_u32::<LittleEndian>()?,
        })
    }

    /// Encode one record to a writer.
    pub fn write_to(&self, w: &mut impl Write) -> std::io::Result<()> {
        w.write_u32::<LittleEndian>(self.offset)?;
        w.write_u32::<LittleEndian>(self.message_num)?;
        w.write_u32::<LittleEndian>(self.crc)?;
        Ok(())
    }
}
