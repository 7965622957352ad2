//! A seekable, byte-addressable view over the input file.

use std::io::{Read, Seek, SeekFrom};

use crate::error::PdfResult;

/// A random-access byte source. Implemented for anything `Read + Seek`
/// (a `File`, a `Cursor<Vec<u8>>`, a memory map).
pub struct ByteSource<R> {
    inner: R,
    len: u64,
}

impl<R: Read + Seek> ByteSource<R> {
    pub fn new(mut inner: R) -> PdfResult<Self> {
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(0))?;
        Ok(ByteSource { inner, len })
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reads exactly `buf.len()` bytes starting at `offset`, or as many
    /// as are available if the source is shorter (callers that need a
    /// strict length check do so themselves; a short read is common at
    /// the very end of a truncated file during xref recovery).
    pub fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> PdfResult<usize> {
        if offset >= self.len {
            return Ok(0);
        }
        self.inner.seek(SeekFrom::Start(offset))?;
        let mut n = 0;
        while n < buf.len() {
            match self.inner.read(&mut buf[n..])? {
                0 => break,
                k => n += k,
            }
        }
        Ok(n)
    }

    /// Reads the `n` bytes at `offset`, failing if fewer are available.
    pub fn read_exact_at(&mut self, offset: u64, n: usize) -> PdfResult<Vec<u8>> {
        let mut buf = vec![0u8; n];
        let got = self.read_at(offset, &mut buf)?;
        buf.truncate(got);
        if got != n {
            anyhow::bail!(crate::error::ParseError::UnexpectedEof);
        }
        Ok(buf)
    }

    /// Reads the whole source into memory. Used by xref recovery, which
    /// needs to scan the entire file for `N G obj` markers.
    pub fn read_all(&mut self) -> PdfResult<Vec<u8>> {
        self.read_exact_at(0, self.len as usize)
    }
}

impl ByteSource<std::io::Cursor<Vec<u8>>> {
    /// Convenience constructor for the common in-memory case.
    pub fn from_bytes(bytes: Vec<u8>) -> PdfResult<Self> {
        ByteSource::new(std::io::Cursor::new(bytes))
    }
}
