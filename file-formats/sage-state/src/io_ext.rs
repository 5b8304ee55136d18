//! Little-endian helpers for the composite values found in save-state streams

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use glam::Vec3;
use std::io::{Read, Result, Write};

/// Extension trait for reading composite values from a reader
pub trait ReadExt: Read {
    fn read_vec3_le(&mut self) -> Result<Vec3> {
        let x = self.read_f32::<LittleEndian>()?;
        let y = self.read_f32::<LittleEndian>()?;
        let z = self.read_f32::<LittleEndian>()?;
        Ok(Vec3::new(x, y, z))
    }

    /// Read a string prefixed by a single length byte
    fn read_byte_prefixed_bytes(&mut self) -> Result<Vec<u8>> {
        let len = self.read_u8()? as usize;
        let mut buf = vec![0u8; len];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }
}

/// Extension trait for writing composite values to a writer
pub trait WriteExt: Write {
    fn write_vec3_le(&mut self, v: Vec3) -> Result<()> {
        self.write_f32::<LittleEndian>(v.x)?;
        self.write_f32::<LittleEndian>(v.y)?;
        self.write_f32::<LittleEndian>(v.z)
    }

    /// Write a string prefixed by a single length byte; the caller checks the length
    fn write_byte_prefixed_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_u8(bytes.len() as u8)?;
        self.write_all(bytes)
    }
}

impl<R: Read + ?Sized> ReadExt for R {}
impl<W: Write + ?Sized> WriteExt for W {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_vec3_layout() {
        let mut data = Vec::new();
        data.write_vec3_le(Vec3::new(1.0, -2.0, 0.5)).unwrap();
        assert_eq!(data.len(), 12);
        assert_eq!(&data[0..4], &1.0f32.to_le_bytes());

        let v = Cursor::new(&data).read_vec3_le().unwrap();
        assert_eq!(v, Vec3::new(1.0, -2.0, 0.5));
    }

    #[test]
    fn test_byte_prefixed_bytes() {
        let mut data = Vec::new();
        data.write_byte_prefixed_bytes(b"Smoke").unwrap();
        assert_eq!(data[0], 5);
        assert_eq!(&data[1..], b"Smoke");

        let read = Cursor::new(&data).read_byte_prefixed_bytes().unwrap();
        assert_eq!(read, b"Smoke");
    }

    #[test]
    fn test_truncated_string() {
        let data = [4u8, b'a', b'b'];
        assert!(Cursor::new(&data).read_byte_prefixed_bytes().is_err());
    }
}
