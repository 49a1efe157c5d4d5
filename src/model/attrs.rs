//! Squish message attribute bits and their display tags.

/// Message is private to the named recipient.
pub const ATTR_PRIVATE: u32 = 0x0001;
/// Crash priority for outbound routing.
pub const ATTR_CRASH: u32 = 0x0002;
/// Message has been read by the recipient.
pub const ATTR_READ: u32 = 0x0004;
/// Message has been sent.
pub const ATTR_SENT: u32 = 0x0008;
/// Message has a file attached.
pub const ATTR_FILE: u32 = 0x0010;
/// In-transit message.
pub const ATTR_TRANSIT: u32 = 0x0020;
/// Orphaned (destination unknown).
pub const ATTR_ORPHAN: u32 = 0x0040;
/// Delete after sending.
pub const ATTR_KILL_SENT: u32 = 0x0080;
/// Entered locally.
pub const ATTR_LOCAL: u32 = 0x0100;
/// Held for pickup.
pub const ATTR_HOLD: u32 = 0x0200;
/// File request.
pub const ATTR_FREQ: u32 = 0x0800;
/// Return receipt requested.
pub const ATTR_RREQ: u32 = 0x1000;
/// This message is a return receipt.
pub const ATTR_RECEIPT: u32 = 0x2000;
/// Audit request.
pub const ATTR_AREQ: u32 = 0x4000;
/// Update request.
pub const ATTR_UREQ: u32 = 0x8000;
/// Scanned out by the echomail tosser.
pub const ATTR_SCANNED: u32 = 0x0001_0000;
/// Seen by the user (reader-local flag).
pub const ATTR_SEEN: u32 = 0x0008_0000;

/// Display tags by bit position. Reserved and purely internal bits carry
/// an empty slot and never produce a tag.
const ATTR_TAGS: [&str; 32] = [
    "Pvt", "", "Rcv", "Snt", //
    "", "Trs", "", "K/s", //
    "Loc", "", "", "", //
    "Rrq", "", "Arq", "", //
    "Scn", "", "", "", //
    "", "", "", "", //
    "", "", "", "", //
    "", "", "", "",
];

/// Decode an attribute bitmask into display tags, low bit first.
pub fn decode_attrs(mut mask: u32) -> Vec<&'static str> {
    let mut tags = Vec::new();
    let mut i = 0;
    while mask > 0 {
        if mask & 1 > 0 && !ATTR_TAGS[i].is_empty() {
            tags.push(ATTR_TAGS[i]);
        }
        i += 1;
        mask >>= 1;
    }
    tags
}
