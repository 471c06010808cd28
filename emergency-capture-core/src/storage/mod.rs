pub mod sidecar;
pub mod wav_writer;
