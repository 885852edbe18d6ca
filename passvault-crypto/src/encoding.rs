//! Base64 codec used at every persisted or transmitted boundary.
//!
//! Standard alphabet. Encoding pads; decoding accepts padded and unpadded
//! input alike, since other clients are not consistent about it.

use crate::error::{CryptoError, CryptoResult};
use base64::alphabet;
use base64::engine::{DecodePaddingMode, Engine, GeneralPurpose, GeneralPurposeConfig};

const ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_encode_padding(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

pub fn to_base64(bytes: impl AsRef<[u8]>) -> String {
    ENGINE.encode(bytes)
}

pub fn from_base64(text: &str) -> CryptoResult<Vec<u8>> {
    ENGINE
        .decode(text.trim())
        .map_err(|e| CryptoError::Encoding(e.to_string()))
}
