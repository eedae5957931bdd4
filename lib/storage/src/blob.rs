//! Embedding blob codec.
//!
//! Vectors are persisted as little-endian f32 bytes so a row's embedding is
//! a single fixed-length BLOB column.

use termx_core::{Error, Result};

/// Encode a vector as little-endian f32 bytes.
#[must_use]
pub fn encode_embedding(vector: &[f32]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(vector.len() * 4);
    for value in vector {
        blob.extend_from_slice(&value.to_le_bytes());
    }
    blob
}

/// Decode a little-endian f32 blob back into a vector.
pub fn decode_embedding(blob: &[u8]) -> Result<Vec<f32>> {
    if blob.len() % 4 != 0 {
        return Err(Error::Serialization(format!(
            "embedding blob length {} is not a multiple of 4",
            blob.len()
        )));
    }
    Ok(blob
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let vector = vec![0.0f32, 1.5, -2.25, f32::MIN_POSITIVE];
        let decoded = decode_embedding(&encode_embedding(&vector)).unwrap();
        assert_eq!(decoded, vector);
    }

    #[test]
    fn test_empty() {
        assert!(decode_embedding(&encode_embedding(&[])).unwrap().is_empty());
    }

    #[test]
    fn test_truncated_blob_rejected() {
        let mut blob = encode_embedding(&[1.0, 2.0]);
        blob.pop();
        assert!(decode_embedding(&blob).is_err());
    }
}
