//! Inbound success-callback decoding and authentication.

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::Value;

use crate::error::CallbackError;
use crate::signing::verify;

/// The authenticated content of a success callback.
///
/// `signature_verified` records whether the data arrived inside a
/// signed envelope and passed HMAC verification. The flat
/// query-parameter form carries no signature, so it can never be
/// verified; the reconciliation workflow treats unverified callbacks
/// as insufficient grounds to confirm a payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackData {
    /// The payment correlation token, echoed back as `transaction_uuid`.
    pub transaction_uuid: String,
    /// The amount the gateway claims was paid, as a wire string.
    pub total_amount: String,
    /// The gateway's own reference for the transaction.
    pub reference_id: String,
    /// The gateway-reported status (`"COMPLETE"` on success), present
    /// only in the envelope form.
    pub status: Option<String>,
    /// True iff the envelope signature was checked and matched.
    pub signature_verified: bool,
}

impl CallbackData {
    /// True if this callback both passed signature verification and
    /// reports a completed transaction.
    pub fn is_signed_complete(&self) -> bool {
        self.signature_verified && self.status.as_deref() == Some("COMPLETE")
    }
}

/// Decodes a success callback from its raw parameters.
///
/// Accepts either the flat form (`transaction_uuid`, `total_amount`,
/// `transaction_id` as individual parameters) or a base64-encoded JSON
/// envelope under `data`. The envelope's signature is recomputed from
/// its own `signed_field_names` declaration and compared before any
/// field is trusted; a mismatch aborts decoding entirely.
pub fn decode_callback(
    secret: &str,
    params: &HashMap<String, String>,
) -> Result<CallbackData, CallbackError> {
    if params.contains_key("transaction_uuid") {
        return decode_flat(params);
    }
    match params.get("data") {
        Some(data) => decode_envelope(secret, data),
        None => Err(CallbackError::MissingParameters),
    }
}

fn decode_flat(params: &HashMap<String, String>) -> Result<CallbackData, CallbackError> {
    let field = |name: &str| {
        params
            .get(name)
            .filter(|v| !v.is_empty())
            .cloned()
            .ok_or(CallbackError::MissingParameters)
    };
    Ok(CallbackData {
        transaction_uuid: field("transaction_uuid")?,
        total_amount: field("total_amount")?,
        reference_id: field("transaction_id")?,
        status: None,
        signature_verified: false,
    })
}

fn decode_envelope(secret: &str, data: &str) -> Result<CallbackData, CallbackError> {
    let bytes = BASE64
        .decode(data.trim())
        .map_err(|e| CallbackError::InvalidData(format!("invalid base64: {e}")))?;
    let envelope: Value = serde_json::from_slice(&bytes)
        .map_err(|e| CallbackError::InvalidData(format!("invalid JSON: {e}")))?;
    let envelope = envelope
        .as_object()
        .ok_or_else(|| CallbackError::InvalidData("envelope is not an object".to_string()))?;

    // Rebuild the canonical string from the envelope's own field-name
    // declaration, in declared order, excluding the signature itself.
    let signed_field_names = field_str(envelope, "signed_field_names");
    let canonical = signed_field_names
        .split(',')
        .filter(|name| *name != "signature")
        .map(|name| format!("{name}={}", field_str(envelope, name)))
        .collect::<Vec<_>>()
        .join(",");

    let supplied_signature = field_str(envelope, "signature");
    if !verify(secret, &canonical, &supplied_signature)? {
        return Err(CallbackError::SignatureMismatch);
    }

    let required = |name: &str| {
        let value = field_str(envelope, name);
        if value.is_empty() {
            Err(CallbackError::MissingParameters)
        } else {
            Ok(value)
        }
    };
    Ok(CallbackData {
        transaction_uuid: required("transaction_uuid")?,
        total_amount: required("total_amount")?,
        reference_id: required("transaction_code")?,
        status: Some(field_str(envelope, "status")).filter(|s| !s.is_empty()),
        signature_verified: true,
    })
}

/// Stringifies an envelope field the way the gateway signs it: strings
/// verbatim, numbers in their JSON form, absent fields as empty.
fn field_str(envelope: &serde_json::Map<String, Value>, name: &str) -> String {
    match envelope.get(name) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::sign;

    const SECRET: &str = "test-secret";

    fn envelope_params(fields: serde_json::Value) -> HashMap<String, String> {
        let encoded = BASE64.encode(serde_json::to_vec(&fields).unwrap());
        HashMap::from([("data".to_string(), encoded)])
    }

    fn signed_envelope(uuid: &str, amount: &str, status: &str) -> HashMap<String, String> {
        let canonical =
            format!("total_amount={amount},transaction_uuid={uuid},product_code=MERCHANT");
        let signature = sign(SECRET, &canonical).unwrap();
        envelope_params(serde_json::json!({
            "transaction_code": "REF-0001",
            "status": status,
            "total_amount": amount,
            "transaction_uuid": uuid,
            "product_code": "MERCHANT",
            "signed_field_names": "total_amount,transaction_uuid,product_code",
            "signature": signature,
        }))
    }

    #[test]
    fn test_flat_form_decodes_without_verification() {
        let params = HashMap::from([
            ("transaction_uuid".to_string(), "uuid-1".to_string()),
            ("total_amount".to_string(), "200.00".to_string()),
            ("transaction_id".to_string(), "REF-7".to_string()),
        ]);

        let data = decode_callback(SECRET, &params).unwrap();
        assert_eq!(data.transaction_uuid, "uuid-1");
        assert_eq!(data.reference_id, "REF-7");
        assert!(!data.signature_verified);
        assert!(!data.is_signed_complete());
    }

    #[test]
    fn test_flat_form_requires_all_three_fields() {
        let params = HashMap::from([
            ("transaction_uuid".to_string(), "uuid-1".to_string()),
            ("total_amount".to_string(), "200.00".to_string()),
        ]);
        assert!(matches!(
            decode_callback(SECRET, &params),
            Err(CallbackError::MissingParameters)
        ));
    }

    #[test]
    fn test_missing_both_forms() {
        assert!(matches!(
            decode_callback(SECRET, &HashMap::new()),
            Err(CallbackError::MissingParameters)
        ));
    }

    #[test]
    fn test_envelope_decodes_and_verifies() {
        let params = signed_envelope("uuid-1", "200.0", "COMPLETE");
        let data = decode_callback(SECRET, &params).unwrap();

        assert_eq!(data.transaction_uuid, "uuid-1");
        assert_eq!(data.total_amount, "200.0");
        assert_eq!(data.reference_id, "REF-0001");
        assert_eq!(data.status.as_deref(), Some("COMPLETE"));
        assert!(data.signature_verified);
        assert!(data.is_signed_complete());
    }

    #[test]
    fn test_envelope_with_wrong_signature_is_rejected() {
        let mut fields = serde_json::json!({
            "transaction_code": "REF-0001",
            "status": "COMPLETE",
            "total_amount": "200.0",
            "transaction_uuid": "uuid-1",
            "product_code": "MERCHANT",
            "signed_field_names": "total_amount,transaction_uuid,product_code",
            "signature": "",
        });
        fields["signature"] = serde_json::json!(
            sign(SECRET, "total_amount=999.0,transaction_uuid=uuid-1,product_code=MERCHANT")
                .unwrap()
        );

        assert!(matches!(
            decode_callback(SECRET, &envelope_params(fields)),
            Err(CallbackError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_envelope_honors_its_own_field_order() {
        // Declared order differs from the outbound fixed order; the
        // canonical string must follow the declaration.
        let canonical = "transaction_uuid=uuid-9,total_amount=50.0";
        let signature = sign(SECRET, canonical).unwrap();
        let params = envelope_params(serde_json::json!({
            "transaction_code": "REF-2",
            "status": "COMPLETE",
            "total_amount": "50.0",
            "transaction_uuid": "uuid-9",
            "signed_field_names": "transaction_uuid,total_amount",
            "signature": signature,
        }));

        let data = decode_callback(SECRET, &params).unwrap();
        assert!(data.signature_verified);
    }

    #[test]
    fn test_envelope_garbage_base64() {
        let params = HashMap::from([("data".to_string(), "!!!".to_string())]);
        assert!(matches!(
            decode_callback(SECRET, &params),
            Err(CallbackError::InvalidData(_))
        ));
    }

    #[test]
    fn test_envelope_non_json() {
        let params = HashMap::from([("data".to_string(), BASE64.encode(b"not json"))]);
        assert!(matches!(
            decode_callback(SECRET, &params),
            Err(CallbackError::InvalidData(_))
        ));
    }

    #[test]
    fn test_non_complete_status_still_decodes() {
        let params = signed_envelope("uuid-1", "200.0", "PENDING");
        let data = decode_callback(SECRET, &params).unwrap();
        assert!(data.signature_verified);
        assert!(!data.is_signed_complete());
    }
}
