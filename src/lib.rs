//! `squishmb` — a storage engine for Squish message bases.
//!
//! This crate provides the core library for reading and writing the Squish
//! on-disk file triad (`.sqd` data, `.sqi` index, `.sql` last-read pointer)
//! used by FTN mail software, bit-compatible with other tools that share
//! the same bases.

pub mod area;
pub mod codec;
pub mod config;
pub mod error;
pub mod index;
pub mod model;
pub mod store;
