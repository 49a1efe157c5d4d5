//! The Squish area engine: composes the index store, last-read tracker,
//! and frame store into the public area operations.

use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::area::{AreaKind, BaseFormat, MessageBase};
use crate::codec;
use crate::error::{Result, SquishError};
use crate::index::format::IndexEntry;
use crate::index::{lastread, IndexStore};
use crate::model::attrs::{self, decode_attrs};
use crate::model::message::{decode_text, encode_text, Message, MessageSummary};
use crate::model::NetAddr;
use crate::store::format::{pad_field, trim_field, FrameHeader, FRAME_HEADER_SIZE, FRAME_OVERHEAD};
use crate::store::{reader, writer};

/// Kludge-line delimiter inside a stored frame body.
const KLUDGE_DELIM: u8 = 0x01;
/// Line terminator of the raw message stream.
const LINE_TERM: u8 = 0x0d;
/// Textual date field format, e.g. `15 Jun 97  23:59:58`.
const DATE_TEXT_FORMAT: &str = "%d %b %y  %H:%M:%S";

/// One Squish message area backed by the `<path>.sqd`/`.sqi`/`.sql`
/// file triad.
///
/// File handles are opened per call, so every operation sees the current
/// file length. The index and the summary listing are cached for the
/// life of the handle and are not refreshed if another process mutates
/// the files underneath (single-writer-per-area assumption).
pub struct SquishArea {
    name: String,
    path: PathBuf,
    kind: AreaKind,
    charset: Option<String>,
    index: IndexStore,
    summaries: Vec<MessageSummary>,
}

/// `<base>.<ext>` — the triad appends extensions to the full area path
/// rather than replacing anything.
fn triad_path(base: &Path, ext: &str) -> PathBuf {
    let mut s = OsString::from(base.as_os_str());
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

impl SquishArea {
    /// Open a handle on an area. No file is touched until the first
    /// operation; the area may not exist on disk yet.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, kind: AreaKind) -> Self {
        let path = path.into();
        let index = IndexStore::new(triad_path(&path, "sqi"));
        Self {
            name: name.into(),
            path,
            kind,
            charset: None,
            index,
            summaries: Vec::new(),
        }
    }

    fn data_path(&self) -> PathBuf {
        triad_path(&self.path, "sqd")
    }

    fn lastread_path(&self) -> PathBuf {
        triad_path(&self.path, "sql")
    }

    /// Rebuild the raw message stream from a stored frame body: split
    /// the kludge block (sans its leading marker) on the delimiter,
    /// NUL-trim each kludge, rejoin them as CR-terminated lines, then
    /// attach the text past the kludge block. Anything from the first
    /// surviving NUL onward is stale tail data and is dropped.
    fn rebuild_body(body: &[u8], kludge_len: usize) -> Vec<u8> {
        if body.is_empty() {
            return Vec::new();
        }
        let kludge_len = kludge_len.clamp(1, body.len());
        let mut out = vec![KLUDGE_DELIM];
        for (i, kludge) in body[1..kludge_len].split(|&b| b == KLUDGE_DELIM).enumerate() {
            if i > 0 {
                out.push(LINE_TERM);
                out.push(KLUDGE_DELIM);
            }
            out.extend_from_slice(trim_field(kludge));
        }
        out.push(LINE_TERM);
        out.extend_from_slice(&body[kludge_len..]);
        if let Some(nul) = out.iter().position(|&b| b == 0) {
            out.truncate(nul);
        }
        out
    }
}

impl MessageBase for SquishArea {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> AreaKind {
        self.kind
    }

    fn format(&self) -> BaseFormat {
        BaseFormat::Squish
    }

    fn count(&mut self) -> u32 {
        self.index.count()
    }

    fn read_message(&mut self, position: u32) -> Result<Message> {
        let count = self.index.count();
        if count == 0 {
            return Err(SquishError::EmptyArea);
        }
        let position = if position == 0 { 1 } else { position };
        let entry = self
            .index
            .entry(position)
            .ok_or(SquishError::OutOfRange { position, count })?;

        let sqd = self.data_path();
        let mut file = File::open(&sqd).map_err(|e| SquishError::io(&sqd, e))?;
        let (header, body) = reader::read_frame(&mut file, &sqd, entry.offset)?;

        let mut to_hash = codec::hash32(&header.to);
        if header.attr & attrs::ATTR_READ != 0 {
            to_hash |= codec::HASH_READ_BIT;
        }

        let charset = self.charset.as_deref();
        let mut msg = Message {
            corrupted: entry.crc != to_hash,
            from: decode_text(trim_field(&header.from), charset),
            to: decode_text(trim_field(&header.to), charset),
            subject: decode_text(trim_field(&header.subject), charset),
            from_addr: NetAddr::from_parts(
                header.from_zone,
                header.from_net,
                header.from_node,
                header.from_point,
            ),
            date_written: codec::unpack_datetime(header.date_written),
            date_arrived: codec::unpack_datetime(header.date_arrived),
            attrs: decode_attrs(header.attr),
            ..Message::default()
        };
        if msg.corrupted {
            debug!(
                area = %self.name,
                position,
                stored = entry.crc,
                computed = to_hash,
                "Checksum mismatch, message flagged corrupted"
            );
        }
        if self.kind != AreaKind::Local && self.kind != AreaKind::Echo {
            msg.to_addr =
                NetAddr::from_parts(header.to_zone, header.to_net, header.to_node, header.to_point);
        }

        let raw = Self::rebuild_body(&body, header.kludge_len as usize);
        msg.body = decode_text(&raw, charset);
        msg.parse_raw()?;
        Ok(msg)
    }

    fn save_message(&mut self, msg: &mut Message) -> Result<()> {
        msg.encode()?;

        let charset = self.charset.as_deref();
        let mut kludges: Vec<u8> = Vec::new();
        for (key, value) in &msg.kludges {
            kludges.push(KLUDGE_DELIM);
            kludges.extend_from_slice(&encode_text(key, charset));
            kludges.push(b' ');
            kludges.extend_from_slice(&encode_text(value, charset));
        }
        kludges.push(0);

        let last = self.index.last();
        let to_bytes = encode_text(&msg.to, charset);
        let mut header = FrameHeader {
            prev_frame: last.map_or(0, |e| e.offset),
            attr: attrs::ATTR_LOCAL | attrs::ATTR_SEEN,
            from: pad_field(&encode_text(&msg.from, charset)),
            to: pad_field(&to_bytes),
            subject: pad_field(&encode_text(&msg.subject, charset)),
            date_written: codec::pack_datetime(msg.date_written),
            date_arrived: codec::pack_datetime(msg.date_arrived),
            date_text: pad_field(msg.date_written.format(DATE_TEXT_FORMAT).to_string().as_bytes()),
            from_zone: msg.from_addr.zone(),
            from_net: msg.from_addr.net(),
            from_node: msg.from_addr.node(),
            from_point: msg.from_addr.point(),
            umsg_id: last.map_or(1, |e| e.message_num + 1),
            kludge_len: kludges.len() as u32,
            ..FrameHeader::default()
        };
        if self.kind == AreaKind::Netmail {
            header.to_zone = msg.to_addr.zone();
            header.to_net = msg.to_addr.net();
            header.to_node = msg.to_addr.node();
            header.to_point = msg.to_addr.point();
        }

        let mut body = kludges;
        body.extend_from_slice(&encode_text(&msg.body, charset));
        body.push(0);
        header.msg_length = body.len() as u32 + FRAME_HEADER_SIZE as u32 - FRAME_OVERHEAD;
        header.frame_length = header.msg_length;

        let bootstrap = self.index.count() == 0;
        let offset = writer::append_frame(&self.data_path(), &mut header, &body, bootstrap)?;
        self.index.append(IndexEntry {
            offset,
            message_num: header.umsg_id,
            crc: codec::hash32(&to_bytes),
        })?;
        debug!(area = %self.name, message_num = header.umsg_id, offset, "Message saved");
        Ok(())
    }

    fn last_read(&mut self) -> u32 {
        lastread::last_read_position(&self.lastread_path(), &mut self.index)
    }

    fn set_last_read(&mut self, position: u32) {
        lastread::store_last_read(&self.lastread_path(), &mut self.index, position);
    }

    fn summaries(&mut self) -> &[MessageSummary] {
        if !self.summaries.is_empty() || self.index.count() == 0 {
            return &self.summaries;
        }
        let count = self.index.count();
        for position in 1..=count {
            match self.read_message(position) {
                Ok(msg) => self.summaries.push(MessageSummary {
                    msg_num: position,
                    from: msg.from,
                    to: msg.to,
                    subject: msg.subject,
                    date_written: msg.date_written,
                }),
                Err(e) => {
                    warn!(area = %self.name, position, error = %e, "Skipping unreadable message");
                }
            }
        }
        &self.summaries
    }

    fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    fn set_charset(&mut self, charset: Option<String>) {
        self.charset = charset;
    }
}
