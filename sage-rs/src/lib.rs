//! SAGE-RS library
//!
//! Command implementations behind the sage-rs binary.

pub mod cli;
pub mod commands;
pub mod utils;
