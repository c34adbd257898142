use crate::record::model::TimesheetDraft;
use crate::signature::SignatureImage;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

/// Integrity checksum over a sealed sheet's canonical field set plus its
/// signature bytes. Deterministic: the same fields and signature always
/// produce the same id. Not a cryptographic signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerificationId(String);

impl VerificationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading hex digits for compact on-screen display.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for VerificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SealError {
    #[error("cannot seal a record without a signature")]
    EmptySignature,
    #[error("seal payload serialization failed: {0}")]
    Payload(String),
}

/// Canonical JSON for {draft fields + signature}. `serde_json::Map` is
/// backed by `BTreeMap`, so object keys serialize lexicographically sorted
/// regardless of insertion or struct declaration order; field order can
/// never change the id.
pub fn canonical_payload(
    fields: &TimesheetDraft,
    signature: &SignatureImage,
) -> Result<String, SealError> {
    if signature.is_empty() {
        return Err(SealError::EmptySignature);
    }

    let value = serde_json::to_value(fields).map_err(|e| SealError::Payload(e.to_string()))?;
    let Value::Object(mut map) = value else {
        return Err(SealError::Payload(
            "draft did not serialize to an object".into(),
        ));
    };
    map.insert(
        "signature".to_string(),
        Value::String(signature.as_str().to_string()),
    );

    serde_json::to_string(&Value::Object(map)).map_err(|e| SealError::Payload(e.to_string()))
}

/// SHA-256 over the canonical payload, hex encoded.
pub fn compute_verification_id(
    fields: &TimesheetDraft,
    signature: &SignatureImage,
) -> Result<VerificationId, SealError> {
    let canonical = canonical_payload(fields, signature)?;
    let hash = Sha256::digest(canonical.as_bytes());
    Ok(VerificationId(hex::encode(hash)))
}
