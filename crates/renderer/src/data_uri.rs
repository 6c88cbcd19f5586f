//! Inline image URIs for map overlays.

use base64::{engine::general_purpose, Engine as _};

const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Wrap encoded PNG bytes as a `data:image/png;base64,...` URI.
pub fn png_data_uri(png: &[u8]) -> String {
    let mut uri = String::with_capacity(PNG_DATA_URI_PREFIX.len() + png.len().div_ceil(3) * 4);
    uri.push_str(PNG_DATA_URI_PREFIX);
    general_purpose::STANDARD.encode_string(png, &mut uri);
    uri
}

/// Decode the payload of a PNG data URI. Returns `None` for any other URI.
pub fn decode_png_data_uri(uri: &str) -> Option<Vec<u8>> {
    let payload = uri.strip_prefix(PNG_DATA_URI_PREFIX)?;
    general_purpose::STANDARD.decode(payload).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_and_payload() {
        let uri = png_data_uri(&[137, 80, 78, 71]);
        assert_eq!(uri, "data:image/png;base64,iVBORw==");
        assert_eq!(decode_png_data_uri(&uri), Some(vec![137, 80, 78, 71]));
    }

    #[test]
    fn test_rejects_other_uris() {
        assert_eq!(decode_png_data_uri("data:image/jpeg;base64,AAAA"), None);
    }
}
