//! A reader adapter that hashes everything read through it.

use std::io::Read;

use sha2::{Digest, Sha256};

/// Wraps a reader and feeds every byte read into a sha256 hasher, so the hash of a source is
/// known once it is fully read.
pub(crate) struct HashReader<R> {
    /// The underlying reader
    inner: R,
    /// The underlying hasher
    hasher: Sha256,
}

impl<R: Read> Read for HashReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let read = self.inner.read(buf)?;
        self.hasher.update(&buf[..read]);
        Ok(read)
    }
}

impl<R: Read> HashReader<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
        }
    }

    /// Finalise the hasher, only the bytes read so far are part of the hash
    pub(crate) fn hash(self) -> Vec<u8> {
        self.hasher.finalize().to_vec()
    }
}
