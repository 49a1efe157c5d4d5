//! Core message, address, and attribute types.

pub mod address;
pub mod attrs;
pub mod message;

pub use address::NetAddr;
pub use message::{Message, MessageSummary};
