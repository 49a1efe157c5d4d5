//! The boundary message type exchanged with the engine.
//!
//! The engine hands over (and accepts) the raw Squish body stream: kludge
//! lines prefixed with 0x01, CR line terminators, then the human-readable
//! text. [`Message::parse_raw`] and [`Message::encode`] convert between
//! that stream and the structured fields. Kludge *interpretation* (MSGID
//! chains, origin lines, charset negotiation) is deliberately out of
//! scope here — keys and values pass through untouched.

use chrono::NaiveDateTime;
use encoding_rs::Encoding;

use crate::codec;
use crate::model::address::NetAddr;

/// Control byte that opens a kludge line.
pub const KLUDGE_MARK: char = '\x01';

/// A single message, as read from or written to an area.
#[derive(Debug, Clone)]
pub struct Message {
    /// Sender name, NUL-trimmed.
    pub from: String,
    /// Recipient name, NUL-trimmed. Also the input of the index checksum.
    pub to: String,
    /// Subject line, NUL-trimmed.
    pub subject: String,
    /// Originating network address.
    pub from_addr: NetAddr,
    /// Destination address. All-zero except in netmail areas.
    pub to_addr: NetAddr,
    /// When the sender wrote the message (2-second resolution on disk).
    pub date_written: NaiveDateTime,
    /// When the message arrived on this system.
    pub date_arrived: NaiveDateTime,
    /// Human-readable body text.
    pub body: String,
    /// Ordered kludge (key, value) pairs. Order is preserved on write.
    pub kludges: Vec<(String, String)>,
    /// Display tags decoded from the attribute bitmask.
    pub attrs: Vec<&'static str>,
    /// Set when the index checksum did not match the frame. The message
    /// is still fully decoded.
    pub corrupted: bool,
}

impl Default for Message {
    fn default() -> Self {
        Self {
            from: String::new(),
            to: String::new(),
            subject: String::new(),
            from_addr: NetAddr::default(),
            to_addr: NetAddr::default(),
            date_written: codec::squish_epoch(),
            date_arrived: codec::squish_epoch(),
            body: String::new(),
            kludges: Vec::new(),
            attrs: Vec::new(),
            corrupted: false,
        }
    }
}

impl Message {
    /// Split the raw body stream into kludge pairs and clean body text.
    ///
    /// `body` is expected to hold CR-terminated lines; lines opening with
    /// the kludge mark become `(key, value)` pairs (split at the first
    /// space, value may be empty), everything else is body text rejoined
    /// with `\n`.
    pub fn parse_raw(&mut self) -> crate::error::Result<()> {
        let raw = std::mem::take(&mut self.body);
        let mut body_lines: Vec<&str> = Vec::new();
        for line in raw.split('\r') {
            match line.strip_prefix(KLUDGE_MARK) {
                Some("") => {}
                Some(kludge) => {
                    let (key, value) = kludge.split_once(' ').unwrap_or((kludge, ""));
                    self.kludges.push((key.to_string(), value.to_string()));
                }
                None => body_lines.push(line),
            }
        }
        self.body = body_lines.join("\n");
        Ok(())
    }

    /// Prepare the message for storage: normalize body line terminators
    /// to the CR the on-disk format uses.
    pub fn encode(&mut self) -> crate::error::Result<()> {
        self.body = self.body.replace("\r\n", "\r").replace('\n', "\r");
        Ok(())
    }
}

/// Lightweight listing entry for one message.
///
/// `msg_num` is the 1-based position in the live index sequence, which is
/// the addressing scheme of every read operation (not the persistent
/// message number).
#[derive(Debug, Clone, serde::Serialize)]
pub struct MessageSummary {
    pub msg_num: u32,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub date_written: NaiveDateTime,
}

/// Decode legacy-charset bytes to text.
///
/// `charset` is a WHATWG encoding label (`"ibm866"`, `"cp437"` via its
/// alias, ...); unknown labels and `None` fall back to lossy UTF-8.
/// Decoding never fails — undecodable bytes become replacement
/// characters, so a damaged frame still yields displayable text.
pub fn decode_text(bytes: &[u8], charset: Option<&str>) -> String {
    match charset.and_then(|label| Encoding::for_label(label.as_bytes())) {
        Some(enc) => enc.decode(bytes).0.into_owned(),
        None => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Encode text for storage in the area's charset.
///
/// Unmappable characters are substituted by encoding_rs (numeric
/// references), never dropped. `None` writes UTF-8 bytes unchanged.
pub fn encode_text(text: &str, charset: Option<&str>) -> Vec<u8> {
    match charset.and_then(|label| Encoding::for_label(label.as_bytes())) {
        Some(enc) => enc.encode(text).0.into_owned(),
        None => text.as_bytes().to_vec(),
    }
}
