//! Message areas and the shared call surface across base formats.

pub mod squish;

pub use squish::SquishArea;

use crate::error::Result;
use crate::model::message::{Message, MessageSummary};

/// What kind of traffic an area carries. Destination addressing is only
/// meaningful for netmail (point-to-point) areas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaKind {
    #[default]
    Local,
    Echo,
    Netmail,
    Bad,
    Dupe,
}

/// On-disk storage format of an area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseFormat {
    Squish,
}

/// The operations every message-base format exposes.
///
/// Positions are 1-based indexes into the area's live message sequence;
/// 0 means "nothing" for last-read results and is treated as 1 when
/// passed to a read. Methods take `&mut self` because areas cache their
/// index lazily; this also makes two in-process writers on one handle
/// unrepresentable.
pub trait MessageBase {
    fn name(&self) -> &str;
    fn kind(&self) -> AreaKind;
    fn format(&self) -> BaseFormat;

    /// Number of live messages in the area.
    fn count(&mut self) -> u32;

    /// Read the message at a 1-based position.
    fn read_message(&mut self, position: u32) -> Result<Message>;

    /// Append a new message to the area.
    fn save_message(&mut self, msg: &mut Message) -> Result<()>;

    /// 1-based position of the last-read message, 0 when nothing read.
    fn last_read(&mut self) -> u32;

    /// Record the last-read position.
    fn set_last_read(&mut self, position: u32);

    /// Listing of all messages. Computed once per handle; entries that
    /// fail to read are skipped.
    fn summaries(&mut self) -> &[MessageSummary];

    fn charset(&self) -> Option<&str>;
    fn set_charset(&mut self, charset: Option<String>);
}
