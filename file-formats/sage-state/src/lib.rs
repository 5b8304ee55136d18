//! Save-state persistence for SAGE engine game data
//!
//! Save games are written as a flat little-endian stream of named fields.
//! Layouts are described once by implementing [`Persist`] and replayed against
//! a [`StateReader`] or a [`StateWriter`], which keeps both directions in the
//! same field order by construction.

pub mod error;
pub mod io_ext;
pub mod persister;
pub mod types;

pub use error::{Result, StateError};
pub use persister::{PersistMode, StatePersister, StateReader, StateWriter};
pub use types::{Persist, PersistEnum};

pub mod prelude {
    pub use crate::persister::{PersistMode, StatePersister, StateReader, StateWriter};
    pub use crate::types::{Persist, PersistEnum};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
