//! JSON envelope form: content and signature travel in one body.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shp_canonical::Content;
use shp_core::SignatureEnvelope;
use shp_keys::{KeyId, SignatureAlgorithm};

use crate::errors::CodecError;

/// The signed-response body shape: content plus envelope fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonEnvelope {
    /// The signed content.
    pub content: Value,
    /// Base64 signature bytes.
    pub signature: String,
    /// Algorithm wire name.
    pub algorithm: String,
    /// Signing key identifier.
    pub key_id: String,
    /// Signing time, seconds since the Unix epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    /// Names of headers bound into the signature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_header_names: Option<Vec<String>>,
}

/// Renders content and its envelope as one JSON body.
pub fn to_json(envelope: &SignatureEnvelope, content: Value) -> JsonEnvelope {
    JsonEnvelope {
        content,
        signature: STANDARD.encode(&envelope.signature),
        algorithm: envelope.algorithm.as_str().to_string(),
        key_id: envelope.key_id.to_string(),
        timestamp: envelope.timestamp,
        signed_header_names: envelope.signed_header_names.clone(),
    }
}

/// Parses a JSON body into the envelope and its content.
pub fn from_json(body: &str) -> Result<(SignatureEnvelope, Content), CodecError> {
    let parsed: JsonEnvelope = serde_json::from_str(body)?;

    let signature = STANDARD
        .decode(parsed.signature.trim())
        .map_err(|e| CodecError::InvalidBase64 {
            field: "signature",
            reason: e.to_string(),
        })?;
    let algorithm = SignatureAlgorithm::parse(&parsed.algorithm)
        .ok_or_else(|| CodecError::UnknownAlgorithm(parsed.algorithm.clone()))?;
    let key_id = KeyId::parse(parsed.key_id)?;

    let envelope = SignatureEnvelope {
        signature,
        algorithm,
        key_id,
        timestamp: parsed.timestamp,
        signed_header_names: parsed.signed_header_names,
    };
    Ok((envelope, Content::Json(parsed.content)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_envelope() -> SignatureEnvelope {
        SignatureEnvelope {
            signature: vec![9, 8, 7],
            algorithm: SignatureAlgorithm::RsaPkcs1Sha256,
            key_id: KeyId::parse("k1").unwrap(),
            timestamp: Some(42),
            signed_header_names: None,
        }
    }

    #[test]
    fn json_round_trip() {
        let body = serde_json::to_string(&to_json(
            &sample_envelope(),
            json!({"message": "This content is signed!"}),
        ))
        .unwrap();
        let (envelope, content) = from_json(&body).unwrap();
        assert_eq!(envelope, sample_envelope());
        assert_eq!(
            content,
            Content::Json(json!({"message": "This content is signed!"}))
        );
    }

    #[test]
    fn wire_field_names_are_camel_case() {
        let value =
            serde_json::to_value(to_json(&sample_envelope(), json!({"a": 1}))).unwrap();
        assert!(value.get("keyId").is_some());
        assert!(value.get("key_id").is_none());
        assert_eq!(value["algorithm"], "rsa-pkcs1-sha256");
    }

    #[test]
    fn unknown_algorithm_is_rejected() {
        let body = r#"{"content":{},"signature":"AQID","algorithm":"dsa","keyId":"k1"}"#;
        assert!(matches!(
            from_json(body).unwrap_err(),
            CodecError::UnknownAlgorithm(_)
        ));
    }

    #[test]
    fn missing_field_is_a_json_error() {
        let body = r#"{"content":{},"signature":"AQID"}"#;
        assert!(matches!(
            from_json(body).unwrap_err(),
            CodecError::InvalidJson(_)
        ));
    }
}
