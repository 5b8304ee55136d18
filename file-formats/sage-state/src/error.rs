use std::io;

use thiserror::Error;

/// Errors raised while reading or writing a save-state stream
#[derive(Error, Debug)]
pub enum StateError {
    /// I/O error on the underlying stream
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Version byte outside the supported range
    #[error("Invalid version for {name}: found {found}, maximum supported is {maximum}")]
    InvalidVersion { name: String, found: u8, maximum: u8 },

    /// Boolean stored as something other than 0 or 1
    #[error("Invalid boolean for {name}: {value}")]
    InvalidBoolean { name: String, value: u8 },

    /// Enum value with no matching variant
    #[error("Invalid value {value} for {name}")]
    InvalidEnumValue { name: String, value: u32 },

    /// String that cannot be stored as byte-prefixed ASCII
    #[error("Invalid string for {name}: {reason}")]
    InvalidString { name: String, reason: String },

    /// Padding that should have been zero
    #[error("Expected byte (index {index}) at position 0x{position:08X} to be 0 but it was {value}")]
    NonZeroPadding { index: usize, position: u64, value: u8 },

    /// Field holding a value other than the one the format requires
    #[error("Unexpected value for {name}: expected {expected}, found {found}")]
    UnexpectedValue {
        name: String,
        expected: String,
        found: String,
    },
}

/// Result type using StateError
pub type Result<T> = std::result::Result<T, StateError>;
