use crate::chunk::{ChunkReader, DataHeader};
use crate::error::Result;
use crate::format::SampleCategory;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::Duration;

/// Header derived description of a wave stream.
///
/// Built from the raw `fmt ` fields, so it is available even for encodings
/// the reader can't decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Info {
    /// Audio format code from the `fmt ` chunk
    pub audio_format: u16,
    /// Number of interleaved channels
    pub channels: u16,
    /// Frames per second
    pub sample_rate: u32,
    /// Bits per sample of one channel
    pub bits_per_sample: u16,
    /// Bytes per frame across all channels
    pub block_align: u16,
    /// Bytes per second
    pub byte_rate: u32,
    /// Whole frames in the data chunk
    pub frames: u64,
}

impl Info {
    /// Walks the header of `reader` up to the data chunk.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let header = ChunkReader::new(reader).walk_raw()?;
        Ok(Info::from(&header))
    }

    /// `None` when the format code is neither PCM nor IEEE float.
    pub fn sample_category(&self) -> Option<SampleCategory> {
        SampleCategory::from_format_code(self.audio_format)
    }

    /// Playing time of all frames, zero when the sample rate is zero.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }

        let rate = u64::from(self.sample_rate);
        let nanos = (self.frames % rate) * 1_000_000_000 / rate;
        Duration::new(self.frames / rate, nanos as u32)
    }

    /// Duration as `HH:MM:SS.mmm`.
    pub fn duration_string(&self) -> String {
        let duration = self.duration();
        let secs = duration.as_secs();

        format!(
            "{:02}:{:02}:{:02}.{:03}",
            secs / 3600,
            secs / 60 % 60,
            secs % 60,
            duration.subsec_millis()
        )
    }
}

impl From<&DataHeader> for Info {
    fn from(header: &DataHeader) -> Self {
        Info {
            audio_format: header.fmt.audio_format,
            channels: header.fmt.num_channels,
            sample_rate: header.fmt.sample_rate,
            bits_per_sample: header.fmt.bits_per_sample,
            block_align: header.fmt.block_align,
            byte_rate: header.fmt.byte_rate,
            frames: header.frames(),
        }
    }
}

impl fmt::Display for Info {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let category = match self.sample_category() {
            Some(category) => category.to_string(),
            None => format!("format {}", self.audio_format),
        };

        write!(
            f,
            "{} ch, {} {} bit, {} Hz, {} frames ({})",
            self.channels,
            category,
            self.bits_per_sample,
            self.sample_rate,
            self.frames,
            self.duration_string()
        )
    }
}

/// Reads only the header of the file at `path`. The file is closed before returning.
///
/// ```no_run
/// let info = wavstream::metadata("speech.wav").unwrap();
/// println!("{}", info);
/// ```
pub fn metadata<P: AsRef<Path>>(path: P) -> Result<Info> {
    let file = File::open(path)?;
    Info::from_reader(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(frames: u64, sample_rate: u32) -> Info {
        Info {
            audio_format: 1,
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            block_align: 2,
            byte_rate: sample_rate * 2,
            frames,
        }
    }

    #[test]
    fn duration_from_frames() {
        assert_eq!(info(44_100, 44_100).duration(), Duration::from_secs(1));
        assert_eq!(info(66_150, 44_100).duration(), Duration::from_millis(1_500));
        assert_eq!(info(10, 0).duration(), Duration::ZERO);
    }

    #[test]
    fn human_readable_duration() {
        assert_eq!(info(8_000 * 3_723 + 4_000, 8_000).duration_string(), "01:02:03.500");
        assert_eq!(info(0, 8_000).duration_string(), "00:00:00.000");
    }

    #[test]
    fn display_unknown_category() {
        let mut info = info(8_000, 8_000);
        info.audio_format = 2;

        assert_eq!(info.sample_category(), None);
        assert_eq!(
            info.to_string(),
            "1 ch, format 2 16 bit, 8000 Hz, 8000 frames (00:00:01.000)"
        );
    }
}
