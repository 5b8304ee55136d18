//! Integration tests for sage_fx
//!
//! Unit tests live next to the code in src/. These cover:
//! - Integration: persistence, pool bookkeeping and legacy conversion
//!   across module boundaries
//! - Scenarios: complete effects driven through the manager

// Shared templates and helpers
mod common;

mod integration;

mod scenarios;
