//! Single-line export format: `gridpaint:v<version>:<base64 JSON>`.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use sim_core::{SaveDocument, StateError, SUPPORTED_SAVE_VERSIONS};
use thiserror::Error;

/// Leading field of every export string.
pub const EXPORT_DOMAIN: &str = "gridpaint";

const FIELD_DELIMITER: char = ':';

/// Reasons an export string cannot be imported.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Input was empty or whitespace.
    #[error("export string is empty")]
    EmptyPayload,
    /// Fewer than three fields.
    #[error("export string is missing the {0}")]
    MissingField(&'static str),
    /// First field is not [`EXPORT_DOMAIN`].
    #[error("export prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// Version field malformed or not loadable.
    #[error("export version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// Version tag and embedded document disagree.
    #[error("export tagged v{tag} but contains v{document}")]
    VersionMismatch {
        /// Version in the header.
        tag: u32,
        /// Version inside the payload.
        document: u32,
    },
    /// Payload is not base64.
    #[error("could not decode export payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    /// Payload is not a save document.
    #[error("could not parse export payload: {0}")]
    InvalidPayload(#[from] StateError),
}

/// Encodes a document for clipboard transfer.
pub fn encode(doc: &SaveDocument) -> Result<String, TransferError> {
    let json = doc.to_json()?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!("{EXPORT_DOMAIN}:v{}:{encoded}", doc.version))
}

/// Decodes an export string back into a document.
pub fn decode(value: &str) -> Result<SaveDocument, TransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TransferError::EmptyPayload);
    }

    let mut parts = trimmed.splitn(3, FIELD_DELIMITER);
    let domain = parts.next().ok_or(TransferError::MissingField("prefix"))?;
    let version = parts.next().ok_or(TransferError::MissingField("version"))?;
    let payload = parts.next().ok_or(TransferError::MissingField("payload"))?;

    if domain != EXPORT_DOMAIN {
        return Err(TransferError::InvalidPrefix(domain.to_owned()));
    }
    let tag = version
        .strip_prefix('v')
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|v| SUPPORTED_SAVE_VERSIONS.contains(v))
        .ok_or_else(|| TransferError::UnsupportedVersion(version.to_owned()))?;

    let bytes = STANDARD_NO_PAD.decode(payload.trim_end_matches('=').as_bytes())?;
    let text = String::from_utf8_lossy(&bytes);
    let doc = SaveDocument::from_json(&text)?;
    if doc.version != tag {
        return Err(TransferError::VersionMismatch {
            tag,
            document: doc.version,
        });
    }
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::GameState;

    #[test]
    fn header_carries_version() {
        let doc = GameState::new().to_document();
        let text = encode(&doc).unwrap();
        assert!(text.starts_with("gridpaint:v4:"));
        assert!(!text.contains('\n'));
    }

    #[test]
    fn rejects_malformed_headers() {
        assert!(matches!(decode("   "), Err(TransferError::EmptyPayload)));
        assert!(matches!(
            decode("gridpaint"),
            Err(TransferError::MissingField("version"))
        ));
        assert!(matches!(
            decode("gridpaint:v4"),
            Err(TransferError::MissingField("payload"))
        ));
        assert!(matches!(
            decode("maze:v1:abc"),
            Err(TransferError::InvalidPrefix(p)) if p == "maze"
        ));
        assert!(matches!(
            decode("gridpaint:v9:abc"),
            Err(TransferError::UnsupportedVersion(v)) if v == "v9"
        ));
        assert!(matches!(
            decode("gridpaint:4:abc"),
            Err(TransferError::UnsupportedVersion(_))
        ));
        assert!(matches!(
            decode("gridpaint:v4:***"),
            Err(TransferError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn payload_must_be_a_save() {
        let payload = STANDARD_NO_PAD.encode(br#"{"money": 3}"#);
        assert!(matches!(
            decode(&format!("gridpaint:v4:{payload}")),
            Err(TransferError::InvalidPayload(_))
        ));
    }

    #[test]
    fn tag_must_match_document() {
        let mut doc = GameState::new().to_document();
        doc.version = 3;
        let json = doc.to_json().unwrap();
        let text = format!("gridpaint:v4:{}", STANDARD_NO_PAD.encode(json));
        assert!(matches!(
            decode(&text),
            Err(TransferError::VersionMismatch {
                tag: 4,
                document: 3
            })
        ));
    }
}
