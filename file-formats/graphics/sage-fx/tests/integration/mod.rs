//! Cross-module integration tests

mod legacy;
mod persistence;
mod pool;
