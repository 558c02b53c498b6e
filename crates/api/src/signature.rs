//! Webhook signature verification.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the base64-encoded HMAC-SHA256 of the raw body.
pub const SIGNATURE_HEADER: &str = "X-Shopify-Hmac-Sha256";

/// Computes the base64 signature the platform sends for `body`.
pub fn sign(secret: &str, body: &[u8]) -> String {
    // HMAC accepts keys of any length.
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(body);
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Returns true if `signature` is the valid signature of `body`.
///
/// The comparison runs in constant time.
pub fn verify(secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(expected) = STANDARD.decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &[u8] = br#"{"id":1,"line_items":[]}"#;

    #[test]
    fn test_sign_then_verify() {
        let signature = sign("hush", BODY);
        assert!(verify("hush", BODY, &signature));
    }

    #[test]
    fn test_known_vector() {
        // RFC 4231 test case 2.
        let signature = sign("Jefe", b"what do ya want for nothing?");
        assert_eq!(signature, "W9zBRr9gdU5qBCQmCJV1x1oAPwidJzmDnexYuWTsOEM=");
    }

    #[test]
    fn test_rejects_wrong_secret_or_body() {
        let signature = sign("hush", BODY);
        assert!(!verify("other", BODY, &signature));
        assert!(!verify("hush", b"{\"id\":2}", &signature));
    }

    #[test]
    fn test_rejects_garbage_signature() {
        assert!(!verify("hush", BODY, "not base64!"));
        assert!(!verify("hush", BODY, ""));
    }
}
