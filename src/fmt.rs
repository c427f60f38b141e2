use crate::chunk::{eof_as, ChunkTag};
use crate::error::{Error, Result};
use crate::format::{Encoding, Format, SampleCategory};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

/// Size of the `fmt ` payload every encoding carries.
const MIN_FMT_SIZE: u32 = 16;

/// Raw fields of the `fmt ` chunk of a WAV file, as found on disk.
///
/// Nothing in here is validated; use [`Fmt::to_format`] to turn it into a
/// [`Format`] the codec can work with. For more information see [`here`]
///
/// [`here`]: http://soundfile.sapp.org/doc/WaveFormat/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fmt {
    /// `1` for integer PCM, `3` for IEEE float, anything else is unsupported
    pub audio_format: u16,
    /// number of audio channels in the sample data, channels are interleaved
    pub num_channels: u16,
    /// sample rate, typical values are `44_100`, `48_000` or `96_000`
    pub sample_rate: u32,
    /// declared bytes per second
    pub byte_rate: u32,
    /// declared bytes per frame across all channels
    pub block_align: u16,
    /// bit depth for each sample, typical values are `8`, `16` or `32`
    pub bits_per_sample: u16,
    /// Extension block following the extension size field, `None` for a bare 16 byte chunk
    pub extension: Option<Vec<u8>>,
}

impl Fmt {
    /// Parses a `fmt ` payload of `size` bytes, consuming exactly that many.
    pub(crate) fn read_from<R: Read>(reader: &mut R, size: u32) -> Result<Self> {
        if size < MIN_FMT_SIZE {
            return Err(Error::invalid(format!(
                "format chunk of {} bytes is too short",
                size
            )));
        }

        let truncated = |e: io::Error| eof_as(e, "truncated format chunk");

        let audio_format = reader.read_u16::<LittleEndian>().map_err(truncated)?;
        let num_channels = reader.read_u16::<LittleEndian>().map_err(truncated)?;
        let sample_rate = reader.read_u32::<LittleEndian>().map_err(truncated)?;
        let byte_rate = reader.read_u32::<LittleEndian>().map_err(truncated)?;
        let block_align = reader.read_u16::<LittleEndian>().map_err(truncated)?;
        let bits_per_sample = reader.read_u16::<LittleEndian>().map_err(truncated)?;

        let extension = match size - MIN_FMT_SIZE {
            0 => None,
            1 => return Err(Error::invalid("format chunk extension size is truncated")),
            rest => {
                let declared = reader.read_u16::<LittleEndian>().map_err(truncated)?;
                let remaining = rest - 2;

                if u32::from(declared) != remaining {
                    return Err(Error::invalid(format!(
                        "format extension declares {} bytes but {} remain",
                        declared, remaining
                    )));
                }

                let mut bytes = vec![0u8; remaining as usize];
                reader.read_exact(&mut bytes).map_err(truncated)?;
                Some(bytes)
            }
        };

        Ok(Fmt {
            audio_format,
            num_channels,
            sample_rate,
            byte_rate,
            block_align,
            bits_per_sample,
            extension,
        })
    }

    /// Checks the declared encoding against what the codec can decode.
    pub fn to_format(&self) -> Result<Format> {
        let category = SampleCategory::from_format_code(self.audio_format).ok_or_else(|| {
            Error::unsupported(format!("audio format code {}", self.audio_format))
        })?;

        if Encoding::new(category, self.bits_per_sample).is_none() {
            return Err(Error::unsupported(format!(
                "{} bits per sample for {}",
                self.bits_per_sample, category
            )));
        }

        if self.num_channels == 0 {
            return Err(Error::unsupported("zero channels"));
        }

        if self.sample_rate == 0 {
            return Err(Error::unsupported("zero sample rate"));
        }

        let format = Format::new(
            self.num_channels,
            (category, self.bits_per_sample),
            self.sample_rate,
        )
        .map_err(|e| Error::unsupported(e.to_string()))?;

        if self.block_align != format.block_align() {
            return Err(Error::unsupported(format!(
                "block align {} does not match {}",
                self.block_align, format
            )));
        }

        Ok(format)
    }

    /// Header fields describing `format`. Float encodings carry an empty extension.
    pub(crate) fn from_format(format: &Format) -> Self {
        let extension = match format.category() {
            SampleCategory::Integer => None,
            SampleCategory::Float => Some(vec![]),
        };

        Fmt {
            audio_format: format.category().format_code(),
            num_channels: format.channels(),
            sample_rate: format.sample_rate(),
            byte_rate: format.byte_rate(),
            block_align: format.block_align(),
            bits_per_sample: format.bits_per_sample(),
            extension,
        }
    }

    /// Payload size as written to the chunk header.
    pub(crate) fn chunk_size(&self) -> u32 {
        match &self.extension {
            None => MIN_FMT_SIZE,
            Some(bytes) => MIN_FMT_SIZE + 2 + bytes.len() as u32,
        }
    }

    /// Writes the whole chunk, tag and size included.
    pub(crate) fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&ChunkTag::Fmt.to_bytes())?;
        writer.write_u32::<LittleEndian>(self.chunk_size())?;
        writer.write_u16::<LittleEndian>(self.audio_format)?;
        writer.write_u16::<LittleEndian>(self.num_channels)?;
        writer.write_u32::<LittleEndian>(self.sample_rate)?;
        writer.write_u32::<LittleEndian>(self.byte_rate)?;
        writer.write_u16::<LittleEndian>(self.block_align)?;
        writer.write_u16::<LittleEndian>(self.bits_per_sample)?;

        if let Some(bytes) = &self.extension {
            writer.write_u16::<LittleEndian>(bytes.len() as u16)?;
            writer.write_all(bytes)?;
        }

        Ok(())
    }
}
