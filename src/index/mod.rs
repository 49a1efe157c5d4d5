//! The `.sqi` index file: record layout, cached store, last-read pointer.

pub mod format;
pub mod lastread;
pub mod store;

pub use format::IndexEntry;
pub use store::IndexStore;
