//! Hash related utils.

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use hmac::Hmac;
use hmac::Mac;
use sha2::Sha256;

use crate::Error;

/// Base64 encode.
pub fn base64_encode(content: &[u8]) -> String {
    BASE64_STANDARD.encode(content)
}

/// Base64 decode.
pub fn base64_decode(content: &str) -> crate::Result<Vec<u8>> {
    BASE64_STANDARD
        .decode(content)
        .map_err(|e| Error::unexpected("base64 decode failed").with_source(e))
}

/// HMAC with SHA256 hash.
pub fn hmac_sha256(key: &[u8], content: &[u8]) -> Vec<u8> {
    // new_from_slice accepts keys of any length, so this never fails.
    let mut h = Hmac::<Sha256>::new_from_slice(key).unwrap();
    h.update(content);

    h.finalize().into_bytes().to_vec()
}

/// Base64 encoded HMAC with SHA256 hash.
///
/// Use this function instead of `base64_encode(hmac_sha256(key, content))`
/// can reduce extra copy.
pub fn base64_hmac_sha256(key: &[u8], content: &[u8]) -> String {
    // new_from_slice accepts keys of any length, so this never fails.
    let mut h = Hmac::<Sha256>::new_from_slice(key).unwrap();
    h.update(content);

    base64_encode(&h.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_round_trip() {
        assert_eq!(base64_encode(b"blobport-test-key"), "YmxvYnBvcnQtdGVzdC1rZXk=");
        assert_eq!(
            base64_decode("YmxvYnBvcnQtdGVzdC1rZXk=").unwrap(),
            b"blobport-test-key"
        );
    }

    #[test]
    fn test_base64_decode_rejects_garbage() {
        assert!(base64_decode("not base64!").is_err());
    }

    #[test]
    fn test_hmac_sha256_matches_base64_variant() {
        let mac = hmac_sha256(b"key", b"content");
        assert_eq!(base64_encode(&mac), base64_hmac_sha256(b"key", b"content"));
    }
}
