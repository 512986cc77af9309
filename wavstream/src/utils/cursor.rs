//! Counted, strictly sequential byte access.
//!
//! [`ByteSource`] reads little-endian fields and raw runs from any [`Read`] and keeps the
//! number of bytes consumed so far, which is what the trailing-data check reconciles
//! against the declared file size. [`ByteSink`] is its append-only counterpart.

use std::io::{self, Read, Write};

use bitstream_io::{ByteRead, ByteReader, LittleEndian};

use crate::byteorder::WriteBytesLe;
use crate::utils::errors::WavError;

const COPY_BUF_SIZE: usize = 64 * 1024;

pub struct ByteSource<R: Read> {
    reader: ByteReader<R, LittleEndian>,
    consumed: u64,
}

impl<R: Read> ByteSource<R> {
    pub fn new(read: R) -> Self {
        Self {
            reader: ByteReader::endian(read, LittleEndian),
            consumed: 0,
        }
    }

    /// Bytes consumed from the source so far, including bytes of a mismatched tag.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    #[inline(always)]
    pub fn read_u8(&mut self, field: &'static str) -> Result<u8, WavError> {
        let value = self
            .reader
            .read::<u8>()
            .map_err(|e| WavError::from_read(e, field))?;
        self.consumed += 1;
        Ok(value)
    }

    #[inline(always)]
    pub fn read_u16(&mut self, field: &'static str) -> Result<u16, WavError> {
        let value = self
            .reader
            .read::<u16>()
            .map_err(|e| WavError::from_read(e, field))?;
        self.consumed += 2;
        Ok(value)
    }

    #[inline(always)]
    pub fn read_i16(&mut self, field: &'static str) -> Result<i16, WavError> {
        let value = self
            .reader
            .read::<i16>()
            .map_err(|e| WavError::from_read(e, field))?;
        self.consumed += 2;
        Ok(value)
    }

    #[inline(always)]
    pub fn read_u32(&mut self, field: &'static str) -> Result<u32, WavError> {
        let value = self
            .reader
            .read::<u32>()
            .map_err(|e| WavError::from_read(e, field))?;
        self.consumed += 4;
        Ok(value)
    }

    /// Reads four bytes and compares them against `expected`.
    ///
    /// The bytes count as consumed whether or not they match.
    pub fn read_tag(&mut self, expected: &[u8; 4]) -> Result<(), WavError> {
        let mut found = [0u8; 4];
        self.reader
            .read_bytes(&mut found)
            .map_err(|e| WavError::from_read(e, tag_name(expected)))?;
        self.consumed += 4;

        if &found != expected {
            return Err(WavError::TagMismatch {
                expected: *expected,
                found,
            });
        }

        Ok(())
    }

    /// Fills `buf` completely from the source.
    pub fn read_exact(&mut self, buf: &mut [u8], what: &'static str) -> Result<(), WavError> {
        self.reader
            .read_bytes(buf)
            .map_err(|e| WavError::from_read(e, what))?;
        self.consumed += buf.len() as u64;
        Ok(())
    }

    /// Discards `len` bytes.
    pub fn skip(&mut self, len: u64, what: &'static str) -> Result<(), WavError> {
        self.pump(len, what, |_| Ok(()))
    }

    /// Moves `len` bytes from the source to `sink` unchanged.
    pub fn copy<W: Write>(
        &mut self,
        len: u64,
        sink: &mut ByteSink<W>,
        what: &'static str,
    ) -> Result<(), WavError> {
        self.pump(len, what, |chunk| sink.write_bytes(chunk))
    }

    /// Feeds up to `limit` bytes to `callback` in chunks, returning how many were available
    /// before the end of input.
    pub fn drain_up_to<F>(&mut self, limit: u64, mut callback: F) -> Result<u64, WavError>
    where
        F: FnMut(&[u8]) -> Result<(), WavError>,
    {
        let mut buffer = vec![0u8; COPY_BUF_SIZE.min(limit as usize)];
        let mut drained = 0;

        while drained < limit {
            let want = COPY_BUF_SIZE.min((limit - drained) as usize);
            let got = match self.reader.reader().read(&mut buffer[..want]) {
                Ok(0) => break,
                Ok(got) => got,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            self.consumed += got as u64;
            callback(&buffer[..got])?;
            drained += got as u64;
        }

        Ok(drained)
    }

    /// Succeeds only when no byte is left in the source. A byte found here is consumed and
    /// reported as data past the `declared` end.
    pub fn expect_end(&mut self, declared: u64) -> Result<(), WavError> {
        match self.next_byte()? {
            None => Ok(()),
            Some(_) => Err(WavError::DataPastEnd { declared }),
        }
    }

    fn next_byte(&mut self) -> Result<Option<u8>, WavError> {
        match self.reader.read::<u8>() {
            Ok(byte) => {
                self.consumed += 1;
                Ok(Some(byte))
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn pump<F>(&mut self, len: u64, what: &'static str, mut callback: F) -> Result<(), WavError>
    where
        F: FnMut(&[u8]) -> Result<(), WavError>,
    {
        let mut buffer = vec![0u8; COPY_BUF_SIZE.min(len as usize)];
        let mut remaining = len;

        while remaining > 0 {
            let chunk_len = COPY_BUF_SIZE.min(remaining as usize);
            let chunk = &mut buffer[..chunk_len];
            self.read_exact(chunk, what)?;
            callback(chunk)?;
            remaining -= chunk_len as u64;
        }

        Ok(())
    }
}

fn tag_name(tag: &[u8; 4]) -> &'static str {
    match tag {
        b"RIFF" => "\"RIFF\" tag",
        b"WAVE" => "\"WAVE\" tag",
        b"fmt " => "\"fmt \" tag",
        b"data" => "\"data\" tag",
        _ => "chunk tag",
    }
}

/// Append-only little-endian writer that counts what it emits.
pub struct ByteSink<W: Write> {
    writer: W,
    written: u64,
    scratch: Vec<u8>,
}

impl<W: Write> ByteSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            written: 0,
            scratch: Vec::with_capacity(64),
        }
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    /// Encodes any little-endian serializable value, including derived header structs.
    pub fn put<T: WriteBytesLe + ?Sized>(&mut self, value: &T) -> Result<(), WavError> {
        self.scratch.clear();
        value.write_le(&mut self.scratch);
        self.writer.write_all(&self.scratch)?;
        self.written += self.scratch.len() as u64;
        Ok(())
    }

    #[inline(always)]
    pub fn write_u8(&mut self, value: u8) -> Result<(), WavError> {
        self.put(&value)
    }

    #[inline(always)]
    pub fn write_u16(&mut self, value: u16) -> Result<(), WavError> {
        self.put(&value)
    }

    #[inline(always)]
    pub fn write_i16(&mut self, value: i16) -> Result<(), WavError> {
        self.put(&value)
    }

    #[inline(always)]
    pub fn write_u32(&mut self, value: u32) -> Result<(), WavError> {
        self.put(&value)
    }

    pub fn write_tag(&mut self, tag: &[u8; 4]) -> Result<(), WavError> {
        self.write_bytes(tag)
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), WavError> {
        self.writer.write_all(bytes)?;
        self.written += bytes.len() as u64;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), WavError> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
