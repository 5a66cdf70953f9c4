//! Byte-level primitives the packet codecs are written against.
//!
//! MySQL encodes every fixed-width integer little-endian. Any buffered
//! stream (a socket wrapped in `BufReader`, a `Cursor`, a byte slice) is a
//! [`ProtoRead`], and any `Write` is a [`ProtoWrite`].

use bytes::{Buf, BufMut};
use std::io::{self, BufRead, Read, Write};

pub trait ProtoRead {
    fn read_u8(&mut self) -> io::Result<u8>;

    fn read_u16_le(&mut self) -> io::Result<u16>;

    fn read_u24_le(&mut self) -> io::Result<u32>;

    fn read_u32_le(&mut self) -> io::Result<u32>;

    /// Reads exactly `len` bytes.
    fn read_bytes(&mut self, len: usize) -> io::Result<Vec<u8>>;

    /// Reads up to and including a 0x00 terminator, consuming at most
    /// `limit` bytes. The terminator is not part of the returned bytes, so
    /// the wire size is `len() + 1`.
    ///
    /// Returns `None` when `limit` bytes were consumed without finding the
    /// terminator.
    fn read_nul_bytes_max(&mut self, limit: usize) -> io::Result<Option<Vec<u8>>>;

    /// Reads and drops exactly `len` bytes.
    fn skip(&mut self, len: usize) -> io::Result<()>;
}

impl<R: BufRead> ProtoRead for R {
    fn read_u8(&mut self) -> io::Result<u8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn read_u16_le(&mut self) -> io::Result<u16> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok((&buf[..]).get_u16_le())
    }

    fn read_u24_le(&mut self) -> io::Result<u32> {
        let mut buf = [0u8; 3];
        self.read_exact(&mut buf)?;
        Ok((&buf[..]).get_uint_le(3) as u32)
    }

    fn read_u32_le(&mut self) -> io::Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok((&buf[..]).get_u32_le())
    }

    fn read_bytes(&mut self, len: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn read_nul_bytes_max(&mut self, limit: usize) -> io::Result<Option<Vec<u8>>> {
        let mut buf = Vec::new();
        self.by_ref().take(limit as u64).read_until(0, &mut buf)?;
        if buf.last() == Some(&0) {
            buf.pop();
            return Ok(Some(buf));
        }
        if buf.len() == limit {
            return Ok(None);
        }
        Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "string is missing its NUL terminator",
        ))
    }

    fn skip(&mut self, len: usize) -> io::Result<()> {
        let skipped = io::copy(&mut self.by_ref().take(len as u64), &mut io::sink())?;
        if skipped != len as u64 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("skip: wanted {} bytes, stream ended after {}", len, skipped),
            ));
        }
        Ok(())
    }
}

pub trait ProtoWrite {
    fn write_u8(&mut self, value: u8) -> io::Result<()>;

    /// Writes the low 24 bits of `value`.
    fn write_u24_le(&mut self, value: u32) -> io::Result<()>;

    fn write_u32_le(&mut self, value: u32) -> io::Result<()>;

    fn write_bytes(&mut self, data: &[u8]) -> io::Result<()>;

    /// Writes `data` followed by a 0x00 terminator.
    fn write_nul_bytes(&mut self, data: &[u8]) -> io::Result<()>;

    fn write_zeros(&mut self, len: usize) -> io::Result<()>;

    fn flush_packet(&mut self) -> io::Result<()>;
}

impl<W: Write> ProtoWrite for W {
    fn write_u8(&mut self, value: u8) -> io::Result<()> {
        self.write_all(&[value])
    }

    fn write_u24_le(&mut self, value: u32) -> io::Result<()> {
        let mut buf = [0u8; 3];
        (&mut buf[..]).put_uint_le(u64::from(value), 3);
        self.write_all(&buf)
    }

    fn write_u32_le(&mut self, value: u32) -> io::Result<()> {
        let mut buf = [0u8; 4];
        (&mut buf[..]).put_u32_le(value);
        self.write_all(&buf)
    }

    fn write_bytes(&mut self, data: &[u8]) -> io::Result<()> {
        self.write_all(data)
    }

    fn write_nul_bytes(&mut self, data: &[u8]) -> io::Result<()> {
        self.write_all(data)?;
        self.write_all(&[0])
    }

    fn write_zeros(&mut self, len: usize) -> io::Result<()> {
        io::copy(&mut io::repeat(0).take(len as u64), self)?;
        Ok(())
    }

    fn flush_packet(&mut self) -> io::Result<()> {
        self.flush()
    }
}
