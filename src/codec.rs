//! Payload Codec
//!
//! Serialize/deserialize boundary between caller values and stored bytes.
//! JSON is used because it is self-describing: decoding a payload as an
//! incompatible type fails deterministically instead of reinterpreting
//! raw bytes.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

/// Encode a caller value into its stored byte form
pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Bytes> {
    let buf = serde_json::to_vec(value)?;
    Ok(Bytes::from(buf))
}

/// Decode a stored payload into the requested type
pub(crate) fn decode<T: DeserializeOwned>(payload: &Bytes) -> Result<T> {
    Ok(serde_json::from_slice(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Session {
        user: String,
        hits: u32,
    }

    #[test]
    fn test_struct_roundtrip() {
        let session = Session {
            user: "alice".into(),
            hits: 3,
        };
        let payload = encode(&session).unwrap();
        let back: Session = decode(&payload).unwrap();
        assert_eq!(back, session);
    }

    #[test]
    fn test_incompatible_decode_fails() {
        let payload = encode(&"15").unwrap();
        let err = decode::<i64>(&payload).unwrap_err();
        assert!(matches!(err, StoreError::TypeMismatch(_)));

        let payload = encode(&15_i64).unwrap();
        let err = decode::<String>(&payload).unwrap_err();
        assert!(matches!(err, StoreError::TypeMismatch(_)));
    }
}
