//! Binary data-file layouts.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ BASE HEADER (256 bytes, at offset 0)         │
//! │  len: u16 · reserved: u16                    │
//! │  num_msg · high_msg · skip_msg               │
//! │  high_water · uid: u32 each                  │
//! │  base: [u8; 80]                              │
//! │  begin/last/free/last_free/end frame: u32    │
//! │  max_msg: u32 · keep_days: u16               │
//! │  sq_hdr_size: u16 · reserved: [u8; 124]      │
//! ├──────────────────────────────────────────────┤
//! │ FRAME (repeating): 266-byte header + body    │
//! │  magic: u32 = 0xAFAE4453                     │
//! │  next/prev frame offset · frame/msg/kludge   │
//! │  lengths: u32 each · type/reserved: u16      │
//! │  attr: u32 · from/to: [u8; 36] each          │
//! │  subject: [u8; 72] · 2×4 addr words: u16     │
//! │  written/arrived: packed u32 · utc: u16      │
//! │  reply_to: u32 · replies: [u32; 9]           │
//! │  umsg_id: u32 · date_text: [u8; 20]          │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! All integers are little-endian. The declared message length counts 28
//! bytes of frame overhead on top of the body but is read against the
//! 266-byte header block, so the body size is always
//! `msg_length + 28 - 266`. The 28/266 asymmetry is part of the external
//! format contract; other Squish tools bake in the same constants.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

/// Magic identifier of a valid frame header.
pub const FRAME_MAGIC: u32 = 0xAFAE_4453;

/// Size of the base header at the start of the data file.
pub const BASE_HEADER_SIZE: usize = 256;

/// Size of one frame header as read from disk.
pub const FRAME_HEADER_SIZE: usize = 266;

/// Frame overhead counted into the declared frame/message lengths.
pub const FRAME_OVERHEAD: u32 = 28;

/// Per-area summary record at the start of the data file.
///
/// Mutated on every save; `end_frame` is where the next frame goes.
#[derive(Debug, Clone)]
pub struct BaseHeader {
    pub len: u16,
    pub reserved1: u16,
    pub num_msg: u32,
    pub high_msg: u32,
    pub skip_msg: u32,
    pub high_water: u32,
    pub uid: u32,
    pub base: [u8; 80],
    pub begin_frame: u32,
    pub last_frame: u32,
    pub free_frame: u32,
    pub last_free_frame: u32,
    pub end_frame: u32,
    pub max_msg: u32,
    pub keep_days: u16,
    pub sq_hdr_size: u16,
    pub reserved2: [u8; 124],
}

impl Default for BaseHeader {
    fn default() -> Self {
        Self {
            len: 0,
            reserved1: 0,
            num_msg: 0,
            high_msg: 0,
            skip_msg: 0,
            high_water: 0,
            uid: 0,
            base: [0; 80],
            begin_frame: 0,
            last_frame: 0,
            free_frame: 0,
            last_free_frame: 0,
            end_frame: 0,
            max_msg: 0,
            keep_days: 0,
            sq_hdr_size: 0,
            reserved2: [0; 124],
        }
    }
}

impl BaseHeader {
    /// Initial header for a brand-new data file: the first frame lands
    /// right after the 256-byte header block.
    pub fn bootstrap() -> Self {
        Self {
            len: BASE_HEADER_SIZE as u16,
            uid: 1,
            begin_frame: BASE_HEADER_SIZE as u32,
            end_frame: BASE_HEADER_SIZE as u32,
            sq_hdr_size: FRAME_OVERHEAD as u16,
            ..Self::default()
        }
    }

    pub fn read_from(r: &mut impl Read) -> std::io::Result<Self> {
        let mut h = Self {
            len: r.read_u16::<LittleEndian>()?,
            reserved1: r.read_u16::<LittleEndian>()?,
            num_msg: r.read_u32::<LittleEndian>()?,
            high_msg: r.read_u32::<LittleEndian>()?,
            skip_msg: r.read_u32::<LittleEndian>()?,
            high_water: r.read_u32::<LittleEndian>()?,
            uid: r.read_u32::<LittleEndian>()?,
            ..Self::default()
        };
        r.read_exact(&mut h.base)?;
        h.begin_frame = r.read_u32::<LittleEndian>()?;
        h.last_frame = r.read_u32::<LittleEndian>()?;
        h.free_frame = r.read_u32::<LittleEndian>()?;
        h.last_free_frame = r.read_u32::<LittleEndian>()?;
        h.end_frame = r.read_u32::<LittleEndian>()?;
        h.max_msg = r.read_u32::<LittleEndian>()?;
        h.keep_days = r.read_u16::<LittleEndian>()?;
        h.sq_hdr_size = r.read_u16::<LittleEndian>()?;
        r.read_exact(&mut h.reserved2)?;
        Ok(h)
    }

    pub fn write_to(&self, w: &mut impl Write) -> std::io::Result<()> {
        w.write_u16::<LittleEndian>(self.len)?;
        w.write_u16::<LittleEndian>(self.reserved1)?;
        w.write_u32::<LittleEndian>(self.num_msg)?;
        w.write_u32::<LittleEndian>(self.high_msg)?;
        w.write_u32::<LittleEndian>(self.skip_msg)?;
        w.write_u32::<LittleEndian>(self.high_water)?;
        w.write_u32::<LittleEndian>(self.uid)?;
        w.write_all(&self.base)?;
        w.write_u32::<LittleEndian>(self.begin_frame)?;
        w.write_u32::<LittleEndian>(self.last_frame)?;
        w.write_u32::<LittleEndian>(self.free_frame)?;
        w.write_u32::<LittleEndian>(self.last_free_frame)?;
        w.write_u32::<LittleEndian>(self.end_frame)?;
        w.write_u32::<LittleEndian>(self.max_msg)?;
        w.write_u16::<LittleEndian>(self.keep_days)?;
        w.write_u16::<LittleEndian>(self.sq_hdr_size)?;
        w.write_all(&self.reserved2)?;
        Ok(())
    }
}

/// Fixed-layout header of one message frame.
#[derive(Debug, Clone)]
pub struct FrameHeader {
    pub magic: u32,
    pub next_frame: u32,
    pub prev_frame: u32,
    pub frame_length: u32,
    pub msg_length: u32,
    pub kludge_len: u32,
    pub frame_type: u16,
    pub reserved: u16,
    pub attr: u32,
    pub from: [u8; 36],
    pub to: [u8; 36],
    pub subject: [u8; 72],
    pub from_zone: u16,
    pub from_net: u16,
    pub from_node: u16,
    pub from_point: u16,
    pub to_zone: u16,
    pub to_net: u16,
    pub to_node: u16,
    pub to_point: u16,
    pub date_written: u32,
    pub date_arrived: u32,
    pub utc: u16,
    pub reply_to: u32,
    pub replies: [u32; 9],
    pub umsg_id: u32,
    pub date_text: [u8; 20],
}

impl Default for FrameHeader {
    fn default() -> Self {
        Self {
            magic: FRAME_MAGIC,
            next_frame: 0,
            prev_frame: 0,
            frame_length: 0,
            msg_length: 0,
            kludge_len: 0,
            frame_type: 0,
            reserved: 0,
            attr: 0,
            from: [0; 36],
            to: [0; 36],
            subject: [0; 72],
            from_zone: 0,
            from_net: 0,
            from_node: 0,
            from_point: 0,
            to_zone: 0,
            to_net: 0,
            to_node: 0,
            to_point: 0,
            date_written: 0,
            date_arrived: 0,
            utc: 0,
            reply_to: 0,
            replies: [0; 9],
            umsg_id: 0,
            date_text: [0; 20],
        }
    }
}

impl FrameHeader {
    pub fn read_from(r: &mut impl Read) -> std::io::Result<Self> {
        let mut h = Self {
            magic: r.read_u32::<LittleEndian>()?,
            next_frame: r.read_u32::<LittleEndian>()?,
            prev_frame: r.read_u32::<LittleEndian>()?,
            frame_length: r.read_u32::<LittleEndian>()?,
            msg_length: r.read_u32::<LittleEndian>()?,
            kludge_len: r.read_u32::<LittleEndian>()?,
            frame_type: r.read_u16::<LittleEndian>()?,
            reserved: r.read_u16::<LittleEndian>()?,
            attr: r.read_u32::<LittleEndian>()?,
            ..Self::default()
        };
        r.read_exact(&mut h.from)?;
        r.read_exact(&mut h.to)?;
        r.read_exact(&mut h.subject)?;
        h.from_zone = r.read_u16::<LittleEndian>()?;
        h.from_net = r.read_u16::<LittleEndian>()?;
        h.from_node = r.read_u16::<LittleEndian>()?;
        h.from_point = r.read_u16::<LittleEndian>()?;
        h.to_zone = r.read_u16::<LittleEndian>()?;
        h.to_net = r.read_u16::<LittleEndian>()?;
        h.to_node = r.read_u16::<LittleEndian>()?;
        h.to_point = r.read_u16::<LittleEndian>()?;
        h.date_written = r.read_u32::<LittleEndian>()?;
        h.date_arrived = r.read_u32::<LittleEndian>()?;
        h.utc = r.read_u16::<LittleEndian>()?;
        h.reply_to = r.read_u32::<LittleEndian>()?;
        for slot in h.replies.iter_mut() {
            *slot = r.read_u32::<LittleEndian>()?;
        }
        h.umsg_id = r.read_u32::<LittleEndian>()?;
        r.read_exact(&mut h.date_text)?;
        Ok(h)
    }

    pub fn write_to(&self, w: &mut impl Write) -> std::io::Result<()> {
        w.write_u32::<LittleEndian>(self.magic)?;
        w.write_u32::<LittleEndian>(self.next_frame)?;
        w.write_u32::<LittleEndian>(self.prev_frame)?;
        w.write_u32::<LittleEndian>(self.frame_length)?;
        w.write_u32::<LittleEndian>(self.msg_length)?;
        w.write_u32::<LittleEndian>(self.kludge_len)?;
        w.write_u16::<LittleEndian>(self.frame_type)?;
        w.write_u16::<LittleEndian>(self.reserved)?;
        w.write_u32::<LittleEndian>(self.attr)?;
        w.write_all(&self.from)?;
        w.write_all(&self.to)?;
        w.write_all(&self.subject)?;
        w.write_u16::<LittleEndian>(self.from_zone)?;
        w.write_u16::<LittleEndian>(self.from_net)?;
        w.write_u16::<LittleEndian>(self.from_node)?;
        w.write_u16::<LittleEndian>(self.from_point)?;
        w.write_u16::<LittleEndian>(self.to_zone)?;
        w.write_u16::<LittleEndian>(self.to_net)?;
        w.write_u16::<LittleEndian>(self.to_node)?;
        w.write_u16::<LittleEndian>(self.to_point)?;
        w.write_u32::<LittleEndian>(self.date_written)?;
        w.write_u32::<LittleEndian>(self.date_arrived)?;
        w.write_u16::<LittleEndian>(self.utc)?;
        w.write_u32::<LittleEndian>(self.reply_to)?;
        for slot in &self.replies {
            w.write_u32::<LittleEndian>(*slot)?;
        }
        w.write_u32::<LittleEndian>(self.umsg_id)?;
        w.write_all(&self.date_text)?;
        Ok(())
    }

    /// Body size declared by this header, or `None` when the declared
    /// message length is shorter than the header it was read with (a
    /// corrupt or misaligned frame).
    pub fn body_len(&self) -> Option<u32> {
        self.msg_length
            .checked_add(FRAME_OVERHEAD)
            .and_then(|v| v.checked_sub(FRAME_HEADER_SIZE as u32))
    }
}

/// Copy text bytes into a fixed-width field, truncating or NUL-padding
/// to the declared width.
pub fn pad_field<const N: usize>(text: &[u8]) -> [u8; N] {
    let mut field = [0u8; N];
    let n = text.len().min(N);
    field[..n].copy_from_slice(&text[..n]);
    field
}

/// Strip NUL padding from a fixed-width field.
pub fn trim_field(field: &[u8]) -> &[u8] {
    let start = field.iter().position(|&b| b != 0).unwrap_or(field.len());
    let end = field.iter().rposition(|&b| b != 0).map_or(start, |i| i + 1);
    &field[start..end]
}
