//! Standard base64 helpers for the wire format

use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Encode bytes as padded standard base64
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard base64, returning `None` on malformed input
pub fn decode(value: &str) -> Option<Vec<u8>> {
    STANDARD.decode(value.trim()).ok()
}

/// Decode standard base64 into a fixed-size array; `None` on bad input or length
pub fn decode_array<const N: usize>(value: &str) -> Option<[u8; N]> {
    decode(value)?.as_slice().try_into().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_array_length_checked() {
        let encoded = encode(&[9u8; 12]);
        assert_eq!(decode_array::<12>(&encoded), Some([9u8; 12]));
        assert_eq!(decode_array::<16>(&encoded), None);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode("not base64!!").is_none());
    }
}
