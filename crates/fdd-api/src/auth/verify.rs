//! Signature verification for inbound payloads.
//!
//! Two flavours:
//!
//! - [`SignatureVerifier::verify_inbound_signature`]: generic responses and
//!   notifications carrying a `sign` field. Every non-common field takes part
//!   in the recomputed scheme-A digest.
//! - [`SignatureVerifier::verify_callback_signature`]: contract-signing
//!   callbacks carrying `msg_digest`. Only `transaction_id` is signed; any
//!   other field is ignored.
//!
//! The digest is recomputed with the timestamp the payload declares, passed
//! explicitly. Outcomes are plain booleans: mismatches and malformed payloads
//! both yield `false`.

use std::borrow::Cow;

use fdd_core::{Credentials, Timestamp};
use serde_json::{Map, Value};
use subtle::ConstantTimeEq;
use tracing::debug;

use super::canonical::{SortMode, canonicalize};
use super::digest::DigestGenerator;

/// Keys stripped (case-insensitively) before canonicalizing an inbound
/// payload.
pub const EXCLUDED_INBOUND_KEYS: [&str; 5] = ["appid", "timestamp", "v", "sign", "msg_digest"];

/// Recomputes and compares digests for payloads received from the platform.
#[derive(Debug, Clone, Copy)]
pub struct SignatureVerifier<'a> {
    digest: DigestGenerator<'a>,
}

impl<'a> SignatureVerifier<'a> {
    pub fn new(credentials: &'a Credentials) -> Self {
        Self {
            digest: DigestGenerator::new(credentials),
        }
    }

    /// Verify a payload signed with scheme A over all of its business fields.
    ///
    /// A missing `timestamp` or `sign` is treated as an empty string, which
    /// will not match any real digest.
    pub fn verify_inbound_signature(&self, payload: &Map<String, Value>) -> bool {
        let timestamp = scalar_field(payload, "timestamp").unwrap_or_default();
        let Some(expected) = scalar_field(payload, "sign") else {
            debug!("inbound payload has no usable 'sign' field");
            return false;
        };

        let mut business = Vec::with_capacity(payload.len());
        for (key, value) in payload {
            if is_excluded(key) {
                continue;
            }
            let Some(text) = scalar_text(value) else {
                debug!(field = %key, "inbound payload has a non-scalar field");
                return false;
            };
            business.push((key.as_str(), text));
        }

        let canonical = canonicalize(business, SortMode::Regular);
        let actual = self
            .digest
            .standard(&Timestamp::from_raw(timestamp.into_owned()), &canonical);
        digests_match(&expected, &actual)
    }

    /// Verify a contract callback: `msg_digest` over `transaction_id` only.
    ///
    /// `timestamp`, `msg_digest` and `transaction_id` must all be present
    /// scalars; otherwise the result is `false`.
    pub fn verify_callback_signature(&self, payload: &Map<String, Value>) -> bool {
        let (Some(timestamp), Some(expected), Some(transaction_id)) = (
            scalar_field(payload, "timestamp"),
            scalar_field(payload, "msg_digest"),
            scalar_field(payload, "transaction_id"),
        ) else {
            debug!("callback payload is missing timestamp, msg_digest or transaction_id");
            return false;
        };

        let canonical = canonicalize([("transaction_id", transaction_id)], SortMode::Regular);
        let actual = self
            .digest
            .standard(&Timestamp::from_raw(timestamp.into_owned()), &canonical);
        digests_match(&expected, &actual)
    }
}

fn is_excluded(key: &str) -> bool {
    EXCLUDED_INBOUND_KEYS
        .iter()
        .any(|excluded| excluded.eq_ignore_ascii_case(key))
}

/// A field's scalar text, or `None` if absent or not a scalar.
fn scalar_field<'p>(payload: &'p Map<String, Value>, key: &str) -> Option<Cow<'p, str>> {
    payload.get(key).and_then(scalar_text)
}

/// Text form of a JSON scalar: strings verbatim, numbers as written,
/// `true` as `"1"`, `false` and `null` as `""`. Arrays and objects have none.
fn scalar_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s)),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(true) => Some(Cow::Borrowed("1")),
        Value::Bool(false) | Value::Null => Some(Cow::Borrowed("")),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn digests_match(expected: &str, actual: &str) -> bool {
    let ok: bool = expected.as_bytes().ct_eq(actual.as_bytes()).into();
    if !ok {
        debug!("signature mismatch");
    }
    ok
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const TS: &str = "20190627133700";

    fn creds() -> Credentials {
        Credentials::new("400123", "S3cr3tK3y")
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn signed_inbound(creds: &Credentials, mut business: Map<String, Value>) -> Map<String, Value> {
        let pairs: Vec<(String, String)> = business
            .iter()
            .map(|(k, v)| (k.clone(), scalar_text(v).unwrap().into_owned()))
            .collect();
        let canonical = canonicalize(pairs, SortMode::Regular);
        let sign = DigestGenerator::new(creds).standard(&Timestamp::from_raw(TS), &canonical);
        business.insert("timestamp".into(), json!(TS));
        business.insert("sign".into(), json!(sign));
        business
    }

    #[test]
    fn inbound_round_trip() {
        let creds = creds();
        let payload = signed_inbound(&creds, object(json!({"account_type": 1, "open_id": "u1"})));
        assert_eq!(
            payload["sign"],
            json!("Mjc4RjA4MjRBNjI5RTdBQjc2NThGRDlCNEIxNENFNkVFRDk0RUY4NA==")
        );
        assert!(SignatureVerifier::new(&creds).verify_inbound_signature(&payload));
    }

    #[test]
    fn inbound_excludes_common_keys_case_insensitively() {
        let creds = creds();
        let mut payload = signed_inbound(&creds, object(json!({"account_type": "1", "open_id": "u1"})));
        payload.insert("AppId".into(), json!("400123"));
        payload.insert("V".into(), json!("2.0"));
        payload.insert("MSG_DIGEST".into(), json!("ignored"));
        assert!(SignatureVerifier::new(&creds).verify_inbound_signature(&payload));
    }

    #[test]
    fn inbound_detects_tampering() {
        let creds = creds();
        let mut payload = signed_inbound(&creds, object(json!({"account_type": 1, "open_id": "u1"})));
        payload.insert("open_id".into(), json!("u2"));
        assert!(!SignatureVerifier::new(&creds).verify_inbound_signature(&payload));
    }

    #[test]
    fn inbound_uses_declared_timestamp() {
        let creds = creds();
        let mut payload = signed_inbound(&creds, object(json!({"open_id": "u1"})));
        payload.insert("timestamp".into(), json!("20190627133701"));
        assert!(!SignatureVerifier::new(&creds).verify_inbound_signature(&payload));
    }

    #[test]
    fn inbound_without_sign_or_with_nested_value_is_false() {
        let creds = creds();
        let verifier = SignatureVerifier::new(&creds);

        let mut payload = signed_inbound(&creds, object(json!({"open_id": "u1"})));
        payload.remove("sign");
        assert!(!verifier.verify_inbound_signature(&payload));

        let mut payload = signed_inbound(&creds, object(json!({"open_id": "u1"})));
        payload.insert("nested".into(), json!({"a": 1}));
        assert!(!verifier.verify_inbound_signature(&payload));

        assert!(!verifier.verify_inbound_signature(&Map::new()));
    }

    fn callback(extra: Value) -> Map<String, Value> {
        let mut payload = object(json!({
            "transaction_id": "T1",
            "timestamp": TS,
            "msg_digest": "NERFMEREMDQ0QjlCMzUyQUFBNzlFMDUwQTY4MTkxOEY4QjY1OEQ0MQ==",
        }));
        payload.extend(object(extra));
        payload
    }

    #[test]
    fn callback_round_trip() {
        let creds = creds();
        assert!(SignatureVerifier::new(&creds).verify_callback_signature(&callback(json!({}))));
    }

    #[test]
    fn callback_ignores_extra_fields() {
        let creds = creds();
        let verifier = SignatureVerifier::new(&creds);
        let with_extras = callback(json!({
            "result_code": "3000",
            "result_desc": "signed",
            "download_url": "https://example.com/d",
            "sign": "whatever",
        }));
        assert!(verifier.verify_callback_signature(&with_extras));
    }

    #[test]
    fn callback_missing_or_malformed_fields_are_false() {
        let creds = creds();
        let verifier = SignatureVerifier::new(&creds);
        for key in ["transaction_id", "timestamp", "msg_digest"] {
            let mut payload = callback(json!({}));
            payload.remove(key);
            assert!(!verifier.verify_callback_signature(&payload), "{key}");
        }

        let mut payload = callback(json!({}));
        payload.insert("transaction_id".into(), json!(["T1"]));
        assert!(!verifier.verify_callback_signature(&payload));

        let mut payload = callback(json!({}));
        payload.insert("transaction_id".into(), json!("T2"));
        assert!(!verifier.verify_callback_signature(&payload));
    }

    #[test]
    fn transaction_bound_digest_does_not_verify_as_inbound() {
        let creds = creds();
        let timestamp = Timestamp::from_raw(TS);
        let scheme_b = DigestGenerator::new(&creds).transaction_bound(&timestamp, "T1", "C1");

        let payload = object(json!({
            "transaction_id": "T1",
            "customer_id": "C1",
            "timestamp": TS,
            "sign": scheme_b,
        }));
        assert!(!SignatureVerifier::new(&creds).verify_inbound_signature(&payload));
    }
}
