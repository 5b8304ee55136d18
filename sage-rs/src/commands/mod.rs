//! Command implementations

pub mod fx;
