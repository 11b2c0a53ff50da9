//! Streaming content comparison and hashing.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::error::{Result, StageError};

/// Read granularity for hashing and comparison.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Width of a content digest in bytes (128 bits).
pub const DIGEST_LEN: usize = 16;

/// Truncated BLAKE3 digest of a file's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentDigest([u8; DIGEST_LEN]);

impl ContentDigest {
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Option<Self> {
        let mut bytes = [0u8; DIGEST_LEN];
        hex::decode_to_slice(s, &mut bytes).ok()?;
        Some(ContentDigest(bytes))
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Digest of in-memory bytes.
pub fn hash_bytes(bytes: &[u8]) -> ContentDigest {
    let mut hasher = blake3::Hasher::new();
    hasher.update(bytes);
    finish(&hasher)
}

/// Digest of a file, read in [`CHUNK_SIZE`] pieces.
pub fn hash_file(path: &Path) -> Result<ContentDigest> {
    let mut file = File::open(path).map_err(|e| StageError::io("open", path, e))?;
    let mut hasher = blake3::Hasher::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = file
            .read(&mut buf)
            .map_err(|e| StageError::io("read", path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(finish(&hasher))
}

fn finish(hasher: &blake3::Hasher) -> ContentDigest {
    let mut out = [0u8; DIGEST_LEN];
    hasher.finalize_xof().fill(&mut out);
    ContentDigest(out)
}

/// Byte-for-byte comparison of two files.
pub fn files_identical(a: &Path, b: &Path) -> Result<bool> {
    let mut fa = File::open(a).map_err(|e| StageError::io("open", a, e))?;
    let mut fb = File::open(b).map_err(|e| StageError::io("open", b, e))?;

    let len_a = fa.metadata().map_err(|e| StageError::io("stat", a, e))?.len();
    let len_b = fb.metadata().map_err(|e| StageError::io("stat", b, e))?.len();
    if len_a != len_b {
        return Ok(false);
    }

    let mut buf_a = vec![0u8; CHUNK_SIZE];
    let mut buf_b = vec![0u8; CHUNK_SIZE];
    loop {
        let n_a = read_full(&mut fa, &mut buf_a).map_err(|e| StageError::io("read", a, e))?;
        let n_b = read_full(&mut fb, &mut buf_b).map_err(|e| StageError::io("read", b, e))?;
        if n_a != n_b || buf_a[..n_a] != buf_b[..n_b] {
            return Ok(false);
        }
        if n_a == 0 {
            return Ok(true);
        }
    }
}

/// Fill `buf` as far as the reader allows. Returns fewer bytes only at EOF.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
