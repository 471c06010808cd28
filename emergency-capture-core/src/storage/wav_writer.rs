use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::models::config::CaptureConfig;
use crate::models::error::CaptureError;
use crate::processing::wav_format;

/// Streaming WAV file writer.
///
/// Two-phase output: `open` writes a provisional 44-byte header, `write`
/// appends raw PCM, and `finalize` patches the header size fields once the
/// total byte count is known.
///
/// ```text
/// [44-byte WAV header — sizes provisional until finalize]
/// [raw 16-bit PCM data...]
/// ```
pub struct WavFileWriter {
    file_path: PathBuf,
    file: Option<File>,
    data_bytes_written: u64,
    is_open: bool,
}

impl WavFileWriter {
    pub fn new(file_path: PathBuf) -> Self {
        Self {
            file_path,
            file: None,
            data_bytes_written: 0,
            is_open: false,
        }
    }

    /// Create the file and write the provisional WAV header.
    pub fn open(&mut self, config: &CaptureConfig) -> Result<(), CaptureError> {
        if self.is_open {
            return Ok(());
        }

        // Ensure output directory exists
        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| CaptureError::Io(format!("failed to create directory: {}", e)))?;
            }
        }

        let mut file = File::create(&self.file_path)
            .map_err(|e| CaptureError::Io(format!("failed to create file: {}", e)))?;

        let header = wav_format::provisional_header(
            config.sample_rate,
            config.channels,
            config.bits_per_sample,
        );
        file.write_all(&header)
            .map_err(|e| CaptureError::Io(format!("header write failed: {}", e)))?;

        self.file = Some(file);
        self.is_open = true;
        Ok(())
    }

    /// Append raw PCM data.
    pub fn write(&mut self, data: &[u8]) -> Result<(), CaptureError> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| CaptureError::Io("file is not open for writing".into()))?;
        file.write_all(data)
            .map_err(|e| CaptureError::Io(format!("write failed: {}", e)))?;
        self.data_bytes_written += data.len() as u64;
        Ok(())
    }

    /// Finalize the file: close it, patch the WAV header size fields in
    /// place, and compute a SHA-256 checksum of the finished file.
    ///
    /// Returns `(pcm data bytes, checksum hex)`. A capture too large for
    /// the 32-bit WAV size fields is an error; the header is never
    /// patched with a wrapped size.
    pub fn finalize(&mut self) -> Result<(u64, String), CaptureError> {
        let mut file = self
            .file
            .take()
            .ok_or_else(|| CaptureError::Io("file is not open".into()))?;
        self.is_open = false;

        file.flush()
            .map_err(|e| CaptureError::Io(format!("flush failed: {}", e)))?;
        drop(file);

        wav_format::patch_header(&self.file_path, self.data_bytes_written)?;

        let checksum = sha256_file(&self.file_path)?;
        Ok((self.data_bytes_written, checksum))
    }

    /// PCM bytes appended so far (excluding the header).
    pub fn data_bytes_written(&self) -> u64 {
        self.data_bytes_written
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

/// Compute SHA-256 hex digest of a file.
fn sha256_file(path: &Path) -> Result<String, CaptureError> {
    let data = fs::read(path)
        .map_err(|e| CaptureError::Io(format!("failed to read file for checksum: {}", e)))?;
    let digest = Sha256::digest(&data);
    Ok(hex_encode(&digest))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::wav_format::WAV_HEADER_SIZE;

    fn temp_file_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("emergency_capture_test_{}", name))
    }

    #[test]
    fn header_then_data_then_patch() {
        let path = temp_file_path("roundtrip.wav");
        let config = CaptureConfig::default();

        let mut writer = WavFileWriter::new(path.clone());
        writer.open(&config).unwrap();

        // 160 samples of PCM (320 bytes)
        let pcm = vec![0x11u8; 320];
        writer.write(&pcm).unwrap();

        let (data_bytes, checksum) = writer.finalize().unwrap();
        assert_eq!(data_bytes, 320);
        assert!(!checksum.is_empty());

        let file_data = fs::read(&path).unwrap();
        assert_eq!(file_data.len(), WAV_HEADER_SIZE + 320);

        assert_eq!(&file_data[0..4], b"RIFF");
        assert_eq!(&file_data[8..12], b"WAVE");

        let riff_size = u32::from_le_bytes([file_data[4], file_data[5], file_data[6], file_data[7]]);
        assert_eq!(riff_size, 320 + 36);

        let data_size =
            u32::from_le_bytes([file_data[40], file_data[41], file_data[42], file_data[43]]);
        assert_eq!(data_size, 320);

        // PCM region survives the patch untouched.
        assert!(file_data[WAV_HEADER_SIZE..].iter().all(|&b| b == 0x11));

        fs::remove_file(&path).ok();
    }

    #[test]
    fn empty_recording_patches_zero() {
        let path = temp_file_path("empty.wav");
        let mut writer = WavFileWriter::new(path.clone());
        writer.open(&CaptureConfig::default()).unwrap();
        let (data_bytes, _) = writer.finalize().unwrap();
        assert_eq!(data_bytes, 0);

        let file_data = fs::read(&path).unwrap();
        assert_eq!(file_data.len(), WAV_HEADER_SIZE);
        let riff_size = u32::from_le_bytes([file_data[4], file_data[5], file_data[6], file_data[7]]);
        assert_eq!(riff_size, 36);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn write_before_open_fails() {
        let mut writer = WavFileWriter::new(temp_file_path("unopened.wav"));
        assert!(writer.write(&[0u8; 4]).is_err());
    }

    #[test]
    fn finalize_twice_fails() {
        let path = temp_file_path("double_finalize.wav");
        let mut writer = WavFileWriter::new(path.clone());
        writer.open(&CaptureConfig::default()).unwrap();
        writer.finalize().unwrap();
        assert!(writer.finalize().is_err());

        fs::remove_file(&path).ok();
    }
}
