//! Little-endian wire helpers.
//!
//! The header wire format is little-endian throughout. These helpers wrap
//! `std::io` so codec code reads as a sequence of field operations rather
//! than buffer arithmetic.

use std::io::{Read, Write};

use crate::error::{WireError, WireResult};

/// Read exactly `N` bytes from the reader.
pub fn read_array<const N: usize>(r: &mut impl Read, context: &'static str) -> WireResult<[u8; N]> {
    let mut buf = [0u8; N];
    r.read_exact(&mut buf).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            WireError::Eof { context }
        } else {
            WireError::Io(e)
        }
    })?;
    Ok(buf)
}

/// Read a little-endian u16.
pub fn read_u16_le(r: &mut impl Read) -> WireResult<u16> {
    Ok(u16::from_le_bytes(read_array(r, "u16")?))
}

/// Read a little-endian u32.
pub fn read_u32_le(r: &mut impl Read) -> WireResult<u32> {
    Ok(u32::from_le_bytes(read_array(r, "u32")?))
}

/// Read a little-endian u64.
pub fn read_u64_le(r: &mut impl Read) -> WireResult<u64> {
    Ok(u64::from_le_bytes(read_array(r, "u64")?))
}

/// Read a single byte.
pub fn read_u8(r: &mut impl Read) -> WireResult<u8> {
    let buf: [u8; 1] = read_array(r, "u8")?;
    Ok(buf[0])
}

/// Write a little-endian u16.
pub fn write_u16_le(w: &mut impl Write, value: u16) -> WireResult<()> {
    w.write_all(&value.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian u32.
pub fn write_u32_le(w: &mut impl Write, value: u32) -> WireResult<()> {
    w.write_all(&value.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian u64.
pub fn write_u64_le(w: &mut impl Write, value: u64) -> WireResult<()> {
    w.write_all(&value.to_le_bytes())?;
    Ok(())
}

/// Write a single byte.
pub fn write_u8(w: &mut impl Write, value: u8) -> WireResult<()> {
    w.write_all(&[value])?;
    Ok(())
}
