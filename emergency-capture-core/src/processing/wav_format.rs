//! WAV container framing.
//!
//! The recording path is a two-phase write: a provisional 44-byte header
//! goes out before the first sample (total size is unknown until the
//! session ends), then `patch_header` rewrites the two size fields once
//! the final PCM byte count is known.

use std::fs::OpenOptions;
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

use crate::models::error::CaptureError;

/// Size of the standard WAV RIFF header in bytes.
pub const WAV_HEADER_SIZE: usize = 44;

/// Byte offset of the RIFF chunk size field.
const RIFF_SIZE_OFFSET: u64 = 4;

/// Byte offset of the data chunk size field.
const DATA_SIZE_OFFSET: u64 = 40;

/// Generate a provisional 44-byte WAV RIFF header.
///
/// Format: PCM (format code 1), little-endian. Size fields hold the
/// zero-data placeholders (RIFF size 36, data size 0) until patched.
///
/// Layout:
/// ```text
/// [0-3]    "RIFF"
/// [4-7]    36 + data_size (placeholder: 36)
/// [8-11]   "WAVE"
/// [12-15]  "fmt "
/// [16-19]  16 (PCM format chunk size)
/// [20-21]  1 (PCM format code)
/// [22-23]  channels
/// [24-27]  sample_rate
/// [28-31]  byte_rate = sample_rate * channels * bits_per_sample / 8
/// [32-33]  block_align = channels * bits_per_sample / 8
/// [34-35]  bits_per_sample
/// [36-39]  "data"
/// [40-43]  data_size (placeholder: 0)
/// ```
pub fn provisional_header(sample_rate: u32, channels: u16, bits_per_sample: u16) -> [u8; WAV_HEADER_SIZE] {
    let byte_rate = sample_rate * channels as u32 * bits_per_sample as u32 / 8;
    let block_align = channels * bits_per_sample / 8;

    let mut header = [0u8; WAV_HEADER_SIZE];

    // RIFF chunk descriptor
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&36u32.to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");

    // fmt sub-chunk
    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes()); // PCM format size
    header[20..22].copy_from_slice(&1u16.to_le_bytes()); // PCM format code
    header[22..24].copy_from_slice(&channels.to_le_bytes());
    header[24..28].copy_from_slice(&sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    header[32..34].copy_from_slice(&block_align.to_le_bytes());
    header[34..36].copy_from_slice(&bits_per_sample.to_le_bytes());

    // data sub-chunk
    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&0u32.to_le_bytes());

    header
}

/// Patch the size fields of an on-disk WAV file in place.
///
/// Re-opens the file, overwrites bytes 4..8 with `data_size + 36` and
/// bytes 40..44 with `data_size`, leaving every other byte untouched.
/// Idempotent for equal sizes. Strict WAV parsers reject a file whose
/// declared sizes disagree with the PCM bytes actually present.
pub fn patch_header(path: &Path, data_size: u64) -> Result<(), CaptureError> {
    let mut file = OpenOptions::new().write(true).open(path)?;
    patch_header_stream(&mut file, data_size)
}

/// Patch the size fields through an already-open seekable stream.
///
/// The RIFF format carries 32-bit sizes; a `data_size` that does not fit
/// (with the 36-byte header remainder) is an error, never a wrapped
/// value.
pub fn patch_header_stream<S: Write + Seek>(stream: &mut S, data_size: u64) -> Result<(), CaptureError> {
    if data_size > (u32::MAX - 36) as u64 {
        return Err(CaptureError::Io(format!(
            "PCM data size {} exceeds the 32-bit WAV size limit",
            data_size
        )));
    }
    let data_size = data_size as u32;
    let riff_size = data_size + 36;

    stream.seek(SeekFrom::Start(RIFF_SIZE_OFFSET))?;
    stream.write_all(&riff_size.to_le_bytes())?;

    stream.seek(SeekFrom::Start(DATA_SIZE_OFFSET))?;
    stream.write_all(&data_size.to_le_bytes())?;

    stream.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn header_size_is_44_bytes() {
        let header = provisional_header(16000, 1, 16);
        assert_eq!(header.len(), 44);
    }

    #[test]
    fn header_riff_magic() {
        let header = provisional_header(16000, 1, 16);
        assert_eq!(&header[0..4], b"RIFF");
        assert_eq!(&header[8..12], b"WAVE");
        assert_eq!(&header[12..16], b"fmt ");
        assert_eq!(&header[36..40], b"data");
    }

    #[test]
    fn header_pcm_format() {
        let header = provisional_header(16000, 1, 16);
        // Format code = 1 (PCM)
        assert_eq!(u16::from_le_bytes([header[20], header[21]]), 1);
        // fmt chunk size = 16
        assert_eq!(u32::from_le_bytes([header[16], header[17], header[18], header[19]]), 16);
    }

    #[test]
    fn header_16khz_mono_16bit() {
        let header = provisional_header(16000, 1, 16);

        let channels = u16::from_le_bytes([header[22], header[23]]);
        assert_eq!(channels, 1);

        let sample_rate = u32::from_le_bytes([header[24], header[25], header[26], header[27]]);
        assert_eq!(sample_rate, 16000);

        let byte_rate = u32::from_le_bytes([header[28], header[29], header[30], header[31]]);
        assert_eq!(byte_rate, 32000); // 16000 * 1 * 16/8

        let block_align = u16::from_le_bytes([header[32], header[33]]);
        assert_eq!(block_align, 2); // 1 * 16/8

        let bits = u16::from_le_bytes([header[34], header[35]]);
        assert_eq!(bits, 16);
    }

    #[test]
    fn provisional_sizes_are_placeholders() {
        let header = provisional_header(16000, 1, 16);

        let riff_size = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        assert_eq!(riff_size, 36);

        let data_size = u32::from_le_bytes([header[40], header[41], header[42], header[43]]);
        assert_eq!(data_size, 0);
    }

    #[test]
    fn patch_updates_only_size_fields() {
        let header = provisional_header(16000, 1, 16);
        let mut file = header.to_vec();
        file.extend_from_slice(&[0x42u8; 320]);

        let mut cursor = Cursor::new(&mut file);
        patch_header_stream(&mut cursor, 320).unwrap();

        let riff_size = u32::from_le_bytes([file[4], file[5], file[6], file[7]]);
        assert_eq!(riff_size, 320 + 36);

        let data_size = u32::from_le_bytes([file[40], file[41], file[42], file[43]]);
        assert_eq!(data_size, 320);

        // Everything outside the two size fields is untouched.
        let pristine = provisional_header(16000, 1, 16);
        for i in 0..WAV_HEADER_SIZE {
            if (4..8).contains(&i) || (40..44).contains(&i) {
                continue;
            }
            assert_eq!(file[i], pristine[i], "byte {} changed", i);
        }
        assert!(file[WAV_HEADER_SIZE..].iter().all(|&b| b == 0x42));
    }

    #[test]
    fn patch_by_path_reopens_file() {
        let path = std::env::temp_dir().join("emergency_wav_format_test_patch_by_path.wav");
        let mut contents = provisional_header(16000, 1, 16).to_vec();
        contents.extend_from_slice(&[0x55u8; 128]);
        std::fs::write(&path, &contents).unwrap();

        patch_header(&path, 128).unwrap();

        let file_data = std::fs::read(&path).unwrap();
        assert_eq!(file_data.len(), contents.len());

        let riff_size = u32::from_le_bytes([file_data[4], file_data[5], file_data[6], file_data[7]]);
        assert_eq!(riff_size, 128 + 36);

        let data_size =
            u32::from_le_bytes([file_data[40], file_data[41], file_data[42], file_data[43]]);
        assert_eq!(data_size, 128);

        assert!(file_data[WAV_HEADER_SIZE..].iter().all(|&b| b == 0x55));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn oversized_data_size_is_rejected() {
        let header = provisional_header(16000, 1, 16);
        let mut file = header.to_vec();

        let mut cursor = Cursor::new(&mut file);
        let err = patch_header_stream(&mut cursor, u64::from(u32::MAX)).unwrap_err();
        assert!(matches!(err, CaptureError::Io(_)));

        // The header is untouched when the size does not fit.
        assert_eq!(file, provisional_header(16000, 1, 16).to_vec());
    }

    #[test]
    fn patch_is_idempotent() {
        let header = provisional_header(16000, 1, 16);
        let mut file = header.to_vec();
        file.extend_from_slice(&[0u8; 64]);

        let mut cursor = Cursor::new(&mut file);
        patch_header_stream(&mut cursor, 64).unwrap();
        let first = file.clone();

        let mut cursor = Cursor::new(&mut file);
        patch_header_stream(&mut cursor, 64).unwrap();
        assert_eq!(file, first);
    }
}
