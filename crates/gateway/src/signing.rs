//! HMAC-SHA256 request signing.
//!
//! The gateway signs a comma-joined `key=value` canonical string and
//! transports the MAC as base64. The field order in the canonical
//! string is part of the contract: the receiver reconstructs the exact
//! same string from the declared `signed_field_names` list, so any
//! reordering breaks verification.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::GatewayError;

type HmacSha256 = Hmac<Sha256>;

/// The fields covered by outbound signatures, in canonical order.
pub const SIGNED_FIELD_NAMES: &str = "total_amount,transaction_uuid,product_code";

/// Builds the canonical string for the fixed outbound field set.
pub fn canonical_string(total_amount: &str, transaction_uuid: &str, product_code: &str) -> String {
    format!(
        "total_amount={total_amount},transaction_uuid={transaction_uuid},product_code={product_code}"
    )
}

fn mac(secret: &str, message: &str) -> Result<HmacSha256, GatewayError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| GatewayError::Signing(e.to_string()))?;
    mac.update(message.as_bytes());
    Ok(mac)
}

/// Signs a canonical string, returning the base64-encoded MAC.
pub fn sign(secret: &str, message: &str) -> Result<String, GatewayError> {
    let digest = mac(secret, message)?.finalize().into_bytes();
    Ok(BASE64.encode(digest))
}

/// Verifies a base64-encoded signature against a canonical string.
///
/// Unparseable base64 counts as a mismatch, not an error. The MAC
/// comparison is constant-time.
pub fn verify(secret: &str, message: &str, signature_b64: &str) -> Result<bool, GatewayError> {
    let Ok(supplied) = BASE64.decode(signature_b64) else {
        return Ok(false);
    };
    Ok(mac(secret, message)?.verify_slice(&supplied).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_canonical_string_field_order_is_fixed() {
        let canonical = canonical_string("200.00", "uuid-1", "MERCHANT");
        assert_eq!(
            canonical,
            "total_amount=200.00,transaction_uuid=uuid-1,product_code=MERCHANT"
        );
    }

    #[test]
    fn test_sign_verify_roundtrip() {
        let message = canonical_string("200.00", "uuid-1", "MERCHANT");
        let signature = sign(SECRET, &message).unwrap();
        assert!(verify(SECRET, &message, &signature).unwrap());
    }

    #[test]
    fn test_signature_is_deterministic() {
        let message = canonical_string("100.00", "uuid-2", "MERCHANT");
        assert_eq!(
            sign(SECRET, &message).unwrap(),
            sign(SECRET, &message).unwrap()
        );
    }

    #[test]
    fn test_wrong_secret_fails_verification() {
        let message = canonical_string("200.00", "uuid-1", "MERCHANT");
        let signature = sign(SECRET, &message).unwrap();
        assert!(!verify("other-secret", &message, &signature).unwrap());
    }

    #[test]
    fn test_tampered_message_fails_verification() {
        let signature = sign(SECRET, &canonical_string("200.00", "uuid-1", "M")).unwrap();
        assert!(!verify(SECRET, &canonical_string("999.00", "uuid-1", "M"), &signature).unwrap());
    }

    #[test]
    fn test_garbage_signature_is_a_mismatch_not_an_error() {
        let message = canonical_string("200.00", "uuid-1", "M");
        assert!(!verify(SECRET, &message, "!!not-base64!!").unwrap());
    }
}
