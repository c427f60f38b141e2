//! Streaming reader and writer for RIFF/WAVE files.
//!
//! Supports integer PCM (8, 16 and 32 bit) and IEEE float (32 and 64 bit)
//! samples with any channel count. Frames are read and written in buffers,
//! and every buffer can be converted between channel layouts and encodings.
//!
//! ```rust,no_run
//! use wavstream::{Format, StreamReader, StreamWriter};
//!
//! fn main() -> wavstream::Result<()> {
//!     let info = wavstream::metadata("./input.wav")?;
//!     println!("{}", info);
//!
//!     // re-encode as mono 16 bit, whatever the input holds
//!     let output = Format::new(1, 16, info.sample_rate)?;
//!     let mut writer = StreamWriter::create("./output.wav", output)?;
//!
//!     let mut reader = StreamReader::open("./input.wav")?;
//!     loop {
//!         match reader.read(4096) {
//!             Ok(buffer) => writer.write(&buffer)?,
//!             Err(wavstream::Error::EndOfStream) => break,
//!             Err(e) => return Err(e),
//!         }
//!     }
//!
//!     writer.close()
//! }
//! ```

#![warn(missing_docs)]

mod buffer;
mod chunk;
mod data;
mod error;
mod fmt;
mod format;
mod info;
mod reader;
mod writer;

pub use buffer::SampleBuffer;
pub use chunk::{ChunkReader, ChunkTag, DataHeader};
pub use data::Samples;
pub use error::{Error, Result};
pub use fmt::Fmt;
pub use format::{
    Channels, Encoding, EncodingSpec, Format, SampleCategory, FORMAT_IEEE_FLOAT, FORMAT_PCM,
    MAX_CHANNELS, MAX_SAMPLE_RATE,
};
pub use info::{metadata, Info};
pub use reader::StreamReader;
pub use writer::{Mode, StreamWriter};
