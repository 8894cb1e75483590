use anyhow::{Context, Result};
use encoding_rs::{DecoderResult, Encoding, UTF_8};
use std::path::Path;
use tracing::{debug, info, warn};

/// Read a log file as text.
pub async fn read_log_file(file_path: impl AsRef<Path>) -> Result<String> {
    let file_path = file_path.as_ref();
    info!("Reading log file: {}", file_path.display());

    let data = tokio::fs::read(file_path)
        .await
        .with_context(|| format!("Failed to read log file {}", file_path.display()))?;
    debug!("Read {} bytes from file {}", data.len(), file_path.display());

    Ok(decode_log_bytes(&data))
}

/// Decode raw log bytes: a UTF-8 or UTF-16 BOM selects the encoding,
/// otherwise UTF-8. Undecodable byte sequences are dropped; everything else,
/// including literal U+FFFD characters, is kept.
pub fn decode_log_bytes(data: &[u8]) -> String {
    let (encoding, bom_len) = Encoding::for_bom(data).unwrap_or((UTF_8, 0));
    let mut decoder = encoding.new_decoder_without_bom_handling();
    let mut src = &data[bom_len..];
    let mut text = String::with_capacity(
        decoder
            .max_utf8_buffer_length_without_replacement(src.len())
            .unwrap_or(src.len()),
    );
    let mut dropped = 0usize;

    loop {
        let (result, read) = decoder.decode_to_string_without_replacement(src, &mut text, true);
        src = &src[read..];
        match result {
            DecoderResult::InputEmpty => break,
            DecoderResult::Malformed(len, _) => dropped += usize::from(len),
            DecoderResult::OutputFull => {
                let needed = decoder
                    .max_utf8_buffer_length_without_replacement(src.len())
                    .unwrap_or(src.len());
                text.reserve(needed.max(4));
            }
        }
    }

    if dropped > 0 {
        warn!(
            "Log input contained {} bytes invalid for {}, dropping them",
            dropped,
            encoding.name()
        );
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain_utf8() {
        assert_eq!(decode_log_bytes("ERROR naïve\n".as_bytes()), "ERROR naïve\n");
    }

    #[test]
    fn test_decode_strips_utf8_bom() {
        let mut data = vec![0xEF, 0xBB, 0xBF];
        data.extend_from_slice(b"INFO start");
        assert_eq!(decode_log_bytes(&data), "INFO start");
    }

    #[test]
    fn test_decode_utf16le_with_bom() {
        let mut data = vec![0xFF, 0xFE];
        for unit in "ERROR x".encode_utf16() {
            data.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(decode_log_bytes(&data), "ERROR x");
    }

    #[test]
    fn test_decode_drops_invalid_bytes() {
        assert_eq!(decode_log_bytes(b"bad \xFF\xFE byte"), "bad  byte");
    }

    #[test]
    fn test_decode_keeps_literal_replacement_char() {
        let mut data = "a\u{FFFD}b ".as_bytes().to_vec();
        data.push(0xFF);
        assert_eq!(decode_log_bytes(&data), "a\u{FFFD}b ");
    }

    #[test]
    fn test_decode_drops_truncated_utf16_unit() {
        let mut data = vec![0xFF, 0xFE];
        for unit in "ok".encode_utf16() {
            data.extend_from_slice(&unit.to_le_bytes());
        }
        data.push(0x41);
        assert_eq!(decode_log_bytes(&data), "ok");
    }

    #[tokio::test]
    async fn test_read_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "line one\nException: boom\n").unwrap();

        let text = read_log_file(&path).await.unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("Exception: boom"));
    }

    #[tokio::test]
    async fn test_read_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_log_file(dir.path().join("missing.log")).await.is_err());
    }
}
