//! SHA-256 hashing utilities.

use sha2::{Digest, Sha256};

/// Compute SHA-256 of the input data.
#[inline]
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute double SHA-256: `SHA-256(SHA-256(data))`.
///
/// Block identities are the double hash of the serialized header.
#[inline]
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_value() {
        // SHA-256 of the empty string.
        let hash = sha256(b"");
        assert_eq!(
            hex::encode(hash),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_sha256d_is_double_application() {
        let data = b"header bytes";
        assert_eq!(sha256d(data), sha256(&sha256(data)));
    }
}
