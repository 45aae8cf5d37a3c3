//! Content fingerprints for cache invalidation.
//!
//! Each input file is hashed individually; the run fingerprint is a second
//! SHA-256 over the concatenated per-file digests in enumeration order.
//! The fingerprint is a change-detection token only, never used to address
//! content.

use sha2::{Digest, Sha256};

/// Raw SHA-256 digest of one input file.
pub fn file_digest(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(bytes).into()
}

/// Combines per-file digests into the run fingerprint: the digests are
/// concatenated in input order and hashed again, hex-encoded lowercase.
///
/// Any byte change in any file, and any reordering of the file list, yields
/// a different fingerprint.
pub fn combined_fingerprint(digests: &[[u8; 32]]) -> String {
    let mut hasher = Sha256::new();
    for digest in digests {
        hasher.update(digest);
    }
    format!("{:x}", hasher.finalize())
}
