//! CutLab Core - Foundation types for the timeline engine
//!
//! This crate provides the fundamental types shared by the other crates:
//! - Time representation in seconds (TimeRange, overlap tolerance)
//! - Timecode formatting for listings
//! - The common error type

pub mod error;
pub mod time;

pub use error::{CutlabError, Result};
pub use time::{format_precise, format_timecode, TimeRange, OVERLAP_EPSILON};
