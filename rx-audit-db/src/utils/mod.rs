use heapless::String as HeaplessString;
use rx_audit_api::{AuditError, AuditResult};
use serde::Serialize;
use std::hash::Hasher;
use twox_hash::XxHash64;

/// Hashes serializable data into an i64 using CBOR serialization and XxHash64.
///
/// Stable across runs and systems: CBOR gives a deterministic binary
/// representation and XxHash64 runs with the fixed seed 0. Used for the
/// optimistic concurrency token of an audit and for trail hash chains.
pub fn hash_as_i64<T: Serialize>(data: &T) -> Result<i64, String> {
    let mut hasher = XxHash64::with_seed(0);
    let mut cbor = Vec::new();
    ciborium::ser::into_writer(data, &mut cbor)
        .map_err(|e| format!("Failed to serialize data for hashing: {e}"))?;
    hasher.write(&cbor);
    Ok(hasher.finish() as i64)
}

/// Copies caller text into a bounded string, rejecting overlong input.
pub fn bounded_string<const N: usize>(field: &str, value: &str) -> AuditResult<HeaplessString<N>> {
    HeaplessString::try_from(value)
        .map_err(|_| AuditError::ValidationError(format!("{field} exceeds {N} characters")))
}

/// Like [`bounded_string`] for optional fields; blank input becomes `None`.
pub fn optional_bounded_string<const N: usize>(
    field: &str,
    value: Option<&str>,
) -> AuditResult<Option<HeaplessString<N>>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => bounded_string(field, text).map(Some),
    }
}

/// Copies as many whole characters as fit, for free text generated internally.
pub fn truncated_string<const N: usize>(value: &str) -> HeaplessString<N> {
    let mut out = HeaplessString::new();
    for c in value.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_stable_and_content_sensitive() {
        let a = hash_as_i64(&("audit", 1u8)).unwrap();
        let b = hash_as_i64(&("audit", 1u8)).unwrap();
        let c = hash_as_i64(&("audit", 2u8)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_bounded_string_limits() {
        assert!(bounded_string::<4>("dni", "1234").is_ok());
        assert!(matches!(
            bounded_string::<4>("dni", "12345"),
            Err(AuditError::ValidationError(_))
        ));
        assert_eq!(optional_bounded_string::<8>("note", Some("   ")).unwrap(), None);
    }

    #[test]
    fn test_truncated_string_keeps_char_boundaries() {
        let s: HeaplessString<5> = truncated_string("dosis única");
        assert_eq!(s.as_str(), "dosis");
        let s: HeaplessString<4> = truncated_string("añoX");
        assert_eq!(s.as_str(), "año");
    }
}
