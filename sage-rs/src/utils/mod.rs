//! Shared utilities for the sage-rs CLI

pub mod format;
pub mod table;

pub use format::*;
pub use table::*;
