use crate::error::{Error, Result};
use std::fmt;

/// Highest channel count a `fmt ` chunk can declare
pub const MAX_CHANNELS: u32 = u16::MAX as u32;
/// Highest sample rate a `fmt ` chunk can declare
pub const MAX_SAMPLE_RATE: u32 = u32::MAX;

/// Format code for integer PCM samples
pub const FORMAT_PCM: u16 = 1;
/// Format code for IEEE floating point samples
pub const FORMAT_IEEE_FLOAT: u16 = 3;

/// How sample values are represented on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleCategory {
    /// Fixed point PCM, 8 bit unsigned or 16/32 bit signed
    Integer,
    /// IEEE floating point in the range `[-1.0, 1.0]`
    Float,
}

impl SampleCategory {
    /// The `fmt ` chunk audio format code for this category.
    pub fn format_code(self) -> u16 {
        match self {
            SampleCategory::Integer => FORMAT_PCM,
            SampleCategory::Float => FORMAT_IEEE_FLOAT,
        }
    }

    /// Maps a `fmt ` chunk audio format code back to a category.
    pub fn from_format_code(code: u16) -> Option<Self> {
        match code {
            FORMAT_PCM => Some(SampleCategory::Integer),
            FORMAT_IEEE_FLOAT => Some(SampleCategory::Float),
            _ => None,
        }
    }
}

impl fmt::Display for SampleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleCategory::Integer => write!(f, "pcm"),
            SampleCategory::Float => write!(f, "float"),
        }
    }
}

/// Every supported (category, bits per sample) pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// 8 bit unsigned PCM, silence at 128
    Pcm8,
    /// 16 bit signed PCM
    Pcm16,
    /// 32 bit signed PCM
    Pcm32,
    /// 32 bit IEEE float
    Float32,
    /// 64 bit IEEE float
    Float64,
}

impl Encoding {
    /// Looks up the encoding for a category and bit depth, `None` when the pair isn't supported.
    pub fn new(category: SampleCategory, bits_per_sample: u16) -> Option<Self> {
        match (category, bits_per_sample) {
            (SampleCategory::Integer, 8) => Some(Encoding::Pcm8),
            (SampleCategory::Integer, 16) => Some(Encoding::Pcm16),
            (SampleCategory::Integer, 32) => Some(Encoding::Pcm32),
            (SampleCategory::Float, 32) => Some(Encoding::Float32),
            (SampleCategory::Float, 64) => Some(Encoding::Float64),
            _ => None,
        }
    }

    /// Integer or float.
    pub fn category(self) -> SampleCategory {
        match self {
            Encoding::Pcm8 | Encoding::Pcm16 | Encoding::Pcm32 => SampleCategory::Integer,
            Encoding::Float32 | Encoding::Float64 => SampleCategory::Float,
        }
    }

    /// Bits used by a single sample of one channel.
    pub fn bits_per_sample(self) -> u16 {
        match self {
            Encoding::Pcm8 => 8,
            Encoding::Pcm16 => 16,
            Encoding::Pcm32 | Encoding::Float32 => 32,
            Encoding::Float64 => 64,
        }
    }

    /// Bytes used by a single sample of one channel.
    pub fn bytes_per_sample(self) -> usize {
        (self.bits_per_sample() / 8) as usize
    }
}

/// Encoding as given by a caller: either a bare bit depth (implying PCM)
/// or an explicit category and bit depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingSpec {
    /// Bits per sample of integer PCM
    Bits(u16),
    /// Category together with bits per sample
    Tagged(SampleCategory, u16),
}

impl From<u16> for EncodingSpec {
    fn from(bits: u16) -> Self {
        EncodingSpec::Bits(bits)
    }
}

impl From<(SampleCategory, u16)> for EncodingSpec {
    fn from((category, bits): (SampleCategory, u16)) -> Self {
        EncodingSpec::Tagged(category, bits)
    }
}

impl From<Encoding> for EncodingSpec {
    fn from(encoding: Encoding) -> Self {
        EncodingSpec::Tagged(encoding.category(), encoding.bits_per_sample())
    }
}

/// Channel count as given by a caller, with the usual aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
    /// One channel
    Mono,
    /// Two channels, left then right
    Stereo,
    /// Any other number of channels
    Count(u16),
}

impl Channels {
    /// Number of channels the alias stands for.
    pub fn count(self) -> u16 {
        match self {
            Channels::Mono => 1,
            Channels::Stereo => 2,
            Channels::Count(n) => n,
        }
    }
}

impl From<u16> for Channels {
    fn from(n: u16) -> Self {
        Channels::Count(n)
    }
}

/// Validated description of how samples are encoded.
///
/// A `Format` can only be obtained through [`Format::new`] (or by parsing a
/// header), so every instance holds a supported encoding, at least one channel
/// and a non zero sample rate.
///
/// ```
/// use wavstream::{Channels, Format, SampleCategory};
///
/// let cd = Format::new(Channels::Stereo, 16, 44_100).unwrap();
/// assert_eq!(cd.block_align(), 4);
/// assert_eq!(cd.byte_rate(), 176_400);
///
/// let float = Format::new(1, (SampleCategory::Float, 32), 48_000).unwrap();
/// assert!(float.is_mono());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Format {
    channels: u16,
    encoding: Encoding,
    sample_rate: u32,
}

impl Format {
    /// Validates and builds a format, failing with [`Error::InvalidFormat`].
    pub fn new(
        channels: impl Into<Channels>,
        encoding: impl Into<EncodingSpec>,
        sample_rate: u32,
    ) -> Result<Self> {
        let channels = channels.into().count();

        if channels == 0 || u32::from(channels) > MAX_CHANNELS {
            return Err(Error::invalid(format!(
                "channel count {} outside 1..={}",
                channels, MAX_CHANNELS
            )));
        }

        // the upper bound is the width of the field itself
        if sample_rate == 0 {
            return Err(Error::invalid(format!(
                "sample rate {} outside 1..={}",
                sample_rate, MAX_SAMPLE_RATE
            )));
        }

        let (category, bits) = match encoding.into() {
            EncodingSpec::Bits(bits) => (SampleCategory::Integer, bits),
            EncodingSpec::Tagged(category, bits) => (category, bits),
        };

        let encoding = Encoding::new(category, bits).ok_or_else(|| {
            Error::invalid(format!("{} bits per sample not supported for {}", bits, category))
        })?;

        // block align and byte rate have to fit their header fields
        let block_align = u32::from(channels) * encoding.bytes_per_sample() as u32;
        if block_align > u32::from(u16::MAX) {
            return Err(Error::invalid(format!(
                "block align {} does not fit the format chunk",
                block_align
            )));
        }
        if u64::from(block_align) * u64::from(sample_rate) > u64::from(u32::MAX) {
            return Err(Error::invalid("byte rate does not fit the format chunk"));
        }

        Ok(Format {
            channels,
            encoding,
            sample_rate,
        })
    }

    /// Number of interleaved channels.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Sample encoding.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Integer or float.
    pub fn category(&self) -> SampleCategory {
        self.encoding.category()
    }

    /// Bits per sample of one channel.
    pub fn bits_per_sample(&self) -> u16 {
        self.encoding.bits_per_sample()
    }

    /// Frames per second.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Bytes used by one frame across all channels.
    pub fn block_align(&self) -> u16 {
        self.channels * (self.encoding.bytes_per_sample() as u16)
    }

    /// Bytes used by one second of audio.
    pub fn byte_rate(&self) -> u32 {
        u32::from(self.block_align()) * self.sample_rate
    }

    /// Exactly one channel.
    pub fn is_mono(&self) -> bool {
        self.channels == 1
    }

    /// Exactly two channels.
    pub fn is_stereo(&self) -> bool {
        self.channels == 2
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ch, {} {} bit, {} Hz",
            self.channels,
            self.category(),
            self.bits_per_sample(),
            self.sample_rate
        )
    }
}
