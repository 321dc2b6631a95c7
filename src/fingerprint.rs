//! Fixed-width identifier fingerprints.
//!
//! A fingerprint is the MD5 digest of the identifier's UTF-8 bytes. It is used
//! only to give keys a fixed width and a stable order; it is never decoded back
//! into an identifier.

use std::fmt;

use md5::{Digest, Md5};

/// Width in bytes of every fingerprint.
pub const FINGERPRINT_LEN: usize = 16;

/// 16-byte digest of an identifier.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Fingerprint(pub [u8; FINGERPRINT_LEN]);

impl Fingerprint {
    /// Wraps raw digest bytes.
    pub const fn from_bytes(bytes: [u8; FINGERPRINT_LEN]) -> Self {
        Fingerprint(bytes)
    }

    /// Borrows the digest bytes.
    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_LEN] {
        &self.0
    }

    /// Returns the final digest byte, the one the legacy scan bound increments.
    pub fn last_byte(&self) -> u8 {
        self.0[FINGERPRINT_LEN - 1]
    }
}

impl AsRef<[u8]> for Fingerprint {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({self})")
    }
}

/// Computes the fingerprint of `id`. Total over all strings, including `""`.
pub fn fingerprint(id: &str) -> Fingerprint {
    Fingerprint(Md5::digest(id.as_bytes()).into())
}
