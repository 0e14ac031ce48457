//! HMAC-SHA256 webhook signatures.
//!
//! Providers sign the literal request body bytes. Verification must run on
//! those bytes before any JSON parsing; a re-serialized body will not match.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Compute the lowercase hex HMAC-SHA256 of `body` keyed by `secret`.
pub fn sign_hex(body: &[u8], secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Check a provider-supplied signature against the raw body.
///
/// The comparison is byte-for-byte and case-sensitive against the lowercase
/// hex digest. Returns `false` on any mismatch, an empty signature or an
/// empty secret; the caller decides how to report it.
pub fn verify_signature(raw_body: &[u8], provided: &str, secret: &str) -> bool {
    if provided.is_empty() || secret.is_empty() {
        return false;
    }
    let expected = sign_hex(raw_body, secret);
    if expected.len() != provided.len() {
        return false;
    }
    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn known_vector() {
        // RFC 4231 test case 2.
        let sig = sign_hex(b"what do ya want for nothing?", "Jefe");
        assert_eq!(
            sig,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn sign_and_verify() {
        let body = br#"{"session_id":"s1","status":"Approved","vendor_data":"u1"}"#;
        let sig = sign_hex(body, "secret");
        assert!(verify_signature(body, &sig, "secret"));
    }

    #[test]
    fn uppercase_signature_is_rejected() {
        let body = b"payload";
        let sig = sign_hex(body, "secret").to_uppercase();
        assert!(!verify_signature(body, &sig, "secret"));
    }

    #[test]
    fn wrong_secret_fails() {
        let sig = sign_hex(b"payload", "secret");
        assert!(!verify_signature(b"payload", &sig, "other"));
    }

    #[test]
    fn missing_inputs_fail() {
        let sig = sign_hex(b"payload", "secret");
        assert!(!verify_signature(b"payload", "", "secret"));
        assert!(!verify_signature(b"payload", &sig, ""));
    }

    #[test]
    fn reserialized_body_does_not_verify() {
        let wire = br#"{"a": 1,  "b": 2}"#;
        let sig = sign_hex(wire, "secret");
        assert!(!verify_signature(br#"{"a":1,"b":2}"#, &sig, "secret"));
    }

    proptest! {
        #[test]
        fn verify_accepts_own_signature(
            body in proptest::collection::vec(any::<u8>(), 0..512),
            secret in "[ -~]{1,64}",
        ) {
            let sig = sign_hex(&body, &secret);
            prop_assert!(verify_signature(&body, &sig, &secret));
        }

        #[test]
        fn verify_rejects_other_body(
            body in proptest::collection::vec(any::<u8>(), 0..512),
            other in proptest::collection::vec(any::<u8>(), 0..512),
            secret in "[ -~]{1,64}",
        ) {
            prop_assume!(body != other);
            let sig = sign_hex(&body, &secret);
            prop_assert!(!verify_signature(&other, &sig, &secret));
        }
    }
}
