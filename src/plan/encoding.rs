//! Plan file decoding.
//!
//! `terraform show -json > plan.json` writes whatever the shell's output
//! encoding is, which on Windows is often UTF-16 with a BOM or a legacy code
//! page. Files are sniffed before they reach the JSON parser.

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use std::path::Path;
use tracing::debug;

use crate::error::{PlanError, Result, TfImportError};

/// Reads a file and decodes it to UTF-8 text.
///
/// # Errors
///
/// Returns an error if the file cannot be read or contains malformed
/// sequences for the detected encoding.
pub fn read_to_string(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| {
        TfImportError::Plan(PlanError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    })?;

    decode(&bytes)
}

/// Detects the encoding of `bytes` and decodes them.
///
/// A BOM wins; otherwise valid UTF-8 is taken as-is, and anything else is
/// guessed by `chardetng`.
///
/// # Errors
///
/// Returns an error if the bytes contain malformed sequences for the
/// detected encoding.
pub fn decode(bytes: &[u8]) -> Result<String> {
    let encoding = detect(bytes);
    debug!("Decoding plan as {}", encoding.name());

    let (text, had_errors) = encoding.decode_with_bom_removal(bytes);
    if had_errors {
        return Err(TfImportError::Plan(PlanError::Decode {
            encoding: encoding.name().to_string(),
            message: String::from("input contains malformed sequences"),
        }));
    }

    Ok(text.into_owned())
}

/// Returns the most likely encoding of `bytes`.
#[must_use]
pub fn detect(bytes: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }

    if std::str::from_utf8(bytes).is_ok() {
        return UTF_8;
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{UTF_16LE, WINDOWS_1252};

    const PLAN: &str = r#"{"resource_changes": [{"address": "azurerm_resource_group.r", "type": "azurerm_resource_group", "change": {"actions": ["create"], "after": {"name": "réseau-prod"}}}]}"#;

    #[test]
    fn test_plain_utf8() {
        assert_eq!(detect(PLAN.as_bytes()), UTF_8);
        assert_eq!(decode(PLAN.as_bytes()).unwrap(), PLAN);
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(PLAN.as_bytes());
        assert_eq!(decode(&bytes).unwrap(), PLAN);
    }

    #[test]
    fn test_utf16le_with_bom() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in PLAN.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }

        assert_eq!(detect(&bytes), UTF_16LE);
        assert_eq!(decode(&bytes).unwrap(), PLAN);
    }

    #[test]
    fn test_legacy_code_page() {
        let (bytes, _, _) = WINDOWS_1252.encode(PLAN);
        assert!(std::str::from_utf8(&bytes).is_err());

        let text = decode(&bytes).unwrap();
        assert!(text.contains("réseau-prod"));
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_to_string(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, TfImportError::Plan(PlanError::Read { .. })));
    }
}
