//! Symmetric save-state persistence
//!
//! A single `persist` routine describes a record's layout once and is run
//! against either a [`StateReader`] or a [`StateWriter`]. Every field is named
//! so that trace logging and errors can point at the offending entry.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use glam::{Affine3A, Vec3};
use log::trace;
use std::io::{Read, Write};

use crate::error::{Result, StateError};
use crate::io_ext::{ReadExt, WriteExt};
use crate::types::{Persist, PersistEnum};

/// Direction of a persistence pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistMode {
    Read,
    Write,
}

/// Ordered, named field access over a save-state stream
pub trait StatePersister {
    /// Whether this pass reads or writes
    fn mode(&self) -> PersistMode;

    /// Bytes consumed or produced so far
    fn position(&self) -> u64;

    /// Persist a version byte. Readers reject 0 and anything above `maximum`;
    /// writers always emit `maximum`.
    fn persist_version(&mut self, name: &str, maximum: u8) -> Result<u8>;

    fn persist_u8(&mut self, name: &str, value: &mut u8) -> Result<()>;

    /// Booleans occupy one byte holding 0 or 1
    fn persist_bool(&mut self, name: &str, value: &mut bool) -> Result<()>;

    fn persist_u32(&mut self, name: &str, value: &mut u32) -> Result<()>;

    fn persist_i32(&mut self, name: &str, value: &mut i32) -> Result<()>;

    fn persist_f32(&mut self, name: &str, value: &mut f32) -> Result<()>;

    fn persist_vec3(&mut self, name: &str, value: &mut Vec3) -> Result<()>;

    /// ASCII text with a one-byte length prefix
    fn persist_ascii_string(&mut self, name: &str, value: &mut String) -> Result<()>;

    /// Zero-filled gap of `count` bytes. Readers fail on any nonzero byte.
    fn skip_unknown_bytes(&mut self, name: &str, count: usize) -> Result<()>;

    fn is_reading(&self) -> bool {
        self.mode() == PersistMode::Read
    }

    /// Enums are stored as their `u32` discriminant
    fn persist_enum<E: PersistEnum>(&mut self, name: &str, value: &mut E) -> Result<()> {
        let mut raw = value.to_u32();
        self.persist_u32(name, &mut raw)?;
        if self.is_reading() {
            *value = E::from_u32(raw).ok_or_else(|| StateError::InvalidEnumValue {
                name: name.to_string(),
                value: raw,
            })?;
        }
        Ok(())
    }

    /// A 4x3 transform preceded by its own version byte, stored transposed:
    /// three rows of `(x axis, y axis, z axis, translation)` components.
    fn persist_matrix4x3(&mut self, name: &str, value: &mut Affine3A) -> Result<()> {
        self.persist_version(name, 1)?;

        let mut rows = [[0.0f32; 4]; 3];
        for (component, row) in rows.iter_mut().enumerate() {
            *row = [
                value.matrix3.x_axis[component],
                value.matrix3.y_axis[component],
                value.matrix3.z_axis[component],
                value.translation[component],
            ];
        }

        for row in rows.iter_mut() {
            for cell in row.iter_mut() {
                self.persist_f32(name, cell)?;
            }
        }

        if self.is_reading() {
            *value = Affine3A::from_cols_array(&[
                rows[0][0], rows[1][0], rows[2][0], //
                rows[0][1], rows[1][1], rows[2][1], //
                rows[0][2], rows[1][2], rows[2][2], //
                rows[0][3], rows[1][3], rows[2][3],
            ]);
        }
        Ok(())
    }

    /// A float that must hold exactly `expected`
    fn persist_f32_sentinel(&mut self, name: &str, expected: f32) -> Result<()> {
        let mut value = expected;
        self.persist_f32(name, &mut value)?;
        if value != expected {
            return Err(StateError::UnexpectedValue {
                name: name.to_string(),
                expected: expected.to_string(),
                found: value.to_string(),
            });
        }
        Ok(())
    }

    /// Delegate to a record's own layout
    fn persist_object<T: Persist>(&mut self, name: &str, value: &mut T) -> Result<()>
    where
        Self: Sized,
    {
        trace!("{name} @ {}", self.position());
        value.persist(self)
    }
}

/// Reads a save-state stream
#[derive(Debug)]
pub struct StateReader<R: Read> {
    inner: R,
    position: u64,
}

impl<R: Read> StateReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, position: 0 }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn advance(&mut self, bytes: u64) {
        self.position += bytes;
    }
}

impl<R: Read> StatePersister for StateReader<R> {
    fn mode(&self) -> PersistMode {
        PersistMode::Read
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn persist_version(&mut self, name: &str, maximum: u8) -> Result<u8> {
        let found = self.inner.read_u8()?;
        self.advance(1);
        if found == 0 || found > maximum {
            return Err(StateError::InvalidVersion {
                name: name.to_string(),
                found,
                maximum,
            });
        }
        trace!("{name} version {found}");
        Ok(found)
    }

    fn persist_u8(&mut self, name: &str, value: &mut u8) -> Result<()> {
        *value = self.inner.read_u8()?;
        self.advance(1);
        trace!("{name} = {value}");
        Ok(())
    }

    fn persist_bool(&mut self, name: &str, value: &mut bool) -> Result<()> {
        let raw = self.inner.read_u8()?;
        self.advance(1);
        *value = match raw {
            0 => false,
            1 => true,
            _ => {
                return Err(StateError::InvalidBoolean {
                    name: name.to_string(),
                    value: raw,
                });
            }
        };
        trace!("{name} = {value}");
        Ok(())
    }

    fn persist_u32(&mut self, name: &str, value: &mut u32) -> Result<()> {
        *value = self.inner.read_u32::<LittleEndian>()?;
        self.advance(4);
        trace!("{name} = {value}");
        Ok(())
    }

    fn persist_i32(&mut self, name: &str, value: &mut i32) -> Result<()> {
        *value = self.inner.read_i32::<LittleEndian>()?;
        self.advance(4);
        trace!("{name} = {value}");
        Ok(())
    }

    fn persist_f32(&mut self, name: &str, value: &mut f32) -> Result<()> {
        *value = self.inner.read_f32::<LittleEndian>()?;
        self.advance(4);
        trace!("{name} = {value}");
        Ok(())
    }

    fn persist_vec3(&mut self, name: &str, value: &mut Vec3) -> Result<()> {
        *value = self.inner.read_vec3_le()?;
        self.advance(12);
        trace!("{name} = {value}");
        Ok(())
    }

    fn persist_ascii_string(&mut self, name: &str, value: &mut String) -> Result<()> {
        let bytes = self.inner.read_byte_prefixed_bytes()?;
        self.advance(1 + bytes.len() as u64);
        if !bytes.is_ascii() {
            return Err(StateError::InvalidString {
                name: name.to_string(),
                reason: "contains non-ASCII bytes".to_string(),
            });
        }
        // ASCII is valid UTF-8
        *value = bytes.iter().map(|&b| b as char).collect();
        trace!("{name} = {value:?}");
        Ok(())
    }

    fn skip_unknown_bytes(&mut self, name: &str, count: usize) -> Result<()> {
        for index in 0..count {
            let value = self.inner.read_u8()?;
            self.advance(1);
            if value != 0 {
                return Err(StateError::NonZeroPadding {
                    index,
                    position: self.position - 1,
                    value,
                });
            }
        }
        trace!("{name}: skipped {count} bytes");
        Ok(())
    }
}

/// Writes a save-state stream
#[derive(Debug)]
pub struct StateWriter<W: Write> {
    inner: W,
    position: u64,
}

impl<W: Write> StateWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, position: 0 }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    fn advance(&mut self, bytes: u64) {
        self.position += bytes;
    }
}

impl<W: Write> StatePersister for StateWriter<W> {
    fn mode(&self) -> PersistMode {
        PersistMode::Write
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn persist_version(&mut self, _name: &str, maximum: u8) -> Result<u8> {
        self.inner.write_u8(maximum)?;
        self.advance(1);
        Ok(maximum)
    }

    fn persist_u8(&mut self, _name: &str, value: &mut u8) -> Result<()> {
        self.inner.write_u8(*value)?;
        self.advance(1);
        Ok(())
    }

    fn persist_bool(&mut self, _name: &str, value: &mut bool) -> Result<()> {
        self.inner.write_u8(u8::from(*value))?;
        self.advance(1);
        Ok(())
    }

    fn persist_u32(&mut self, _name: &str, value: &mut u32) -> Result<()> {
        self.inner.write_u32::<LittleEndian>(*value)?;
        self.advance(4);
        Ok(())
    }

    fn persist_i32(&mut self, _name: &str, value: &mut i32) -> Result<()> {
        self.inner.write_i32::<LittleEndian>(*value)?;
        self.advance(4);
        Ok(())
    }

    fn persist_f32(&mut self, _name: &str, value: &mut f32) -> Result<()> {
        self.inner.write_f32::<LittleEndian>(*value)?;
        self.advance(4);
        Ok(())
    }

    fn persist_vec3(&mut self, _name: &str, value: &mut Vec3) -> Result<()> {
        self.inner.write_vec3_le(*value)?;
        self.advance(12);
        Ok(())
    }

    fn persist_ascii_string(&mut self, name: &str, value: &mut String) -> Result<()> {
        if !value.is_ascii() {
            return Err(StateError::InvalidString {
                name: name.to_string(),
                reason: "contains non-ASCII characters".to_string(),
            });
        }
        if value.len() > usize::from(u8::MAX) {
            return Err(StateError::InvalidString {
                name: name.to_string(),
                reason: format!("length {} exceeds 255 bytes", value.len()),
            });
        }
        self.inner.write_byte_prefixed_bytes(value.as_bytes())?;
        self.advance(1 + value.len() as u64);
        Ok(())
    }

    fn skip_unknown_bytes(&mut self, _name: &str, count: usize) -> Result<()> {
        for _ in 0..count {
            self.inner.write_u8(0)?;
        }
        self.advance(count as u64);
        Ok(())
    }
}
