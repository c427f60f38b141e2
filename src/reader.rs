use crate::buffer::SampleBuffer;
use crate::chunk::ChunkReader;
use crate::data::Samples;
use crate::error::{Error, Result};
use crate::format::Format;
use log::debug;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Paced reader of sample frames.
///
/// Decodes frames in the file's native format and hands them out converted to
/// the output format, which defaults to the native one.
///
/// ```no_run
/// use wavstream::{Format, StreamReader};
///
/// let output = Format::new(1, 16, 44_100).unwrap();
/// let reader = StreamReader::open_as("speech.wav", output).unwrap();
///
/// reader
///     .for_each_buffer(4096, |buffer| println!("{} frames", buffer.frame_count()))
///     .unwrap();
/// ```
#[derive(Debug)]
pub struct StreamReader<R> {
    reader: R,
    format: Format,
    output: Format,
    frames: u64,
    remaining: u64,
}

impl StreamReader<BufReader<File>> {
    /// Opens `path` and reads frames in their native format.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        StreamReader::from_reader(BufReader::new(file))
    }

    /// Opens `path` and converts every buffer read to `output`.
    pub fn open_as<P: AsRef<Path>>(path: P, output: Format) -> Result<Self> {
        Ok(StreamReader::open(path)?.with_output_format(output))
    }
}

impl<R: Read> StreamReader<R> {
    /// Walks the header of `reader`, leaving it at the first sample byte.
    pub fn from_reader(reader: R) -> Result<Self> {
        let mut chunks = ChunkReader::new(reader);
        let (format, frames) = chunks.walk_to_data()?;

        debug!("reading {} frames of {}", frames, format);

        Ok(StreamReader {
            reader: chunks.into_inner(),
            format,
            output: format,
            frames,
            remaining: frames,
        })
    }

    /// Converts every buffer read from now on to `output`.
    pub fn with_output_format(mut self, output: Format) -> Self {
        self.output = output;
        self
    }

    /// Native format of the stream.
    pub fn format(&self) -> &Format {
        &self.format
    }

    /// Format buffers are converted to before they are returned.
    pub fn output_format(&self) -> &Format {
        &self.output
    }

    /// Total frames declared by the data chunk.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Frames not read yet.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Reads up to `frames` frames. Fails with [`Error::EndOfStream`] once
    /// every frame has been read.
    pub fn read(&mut self, frames: usize) -> Result<SampleBuffer> {
        if self.remaining == 0 {
            return Err(Error::EndOfStream);
        }

        let frames = (frames as u64).min(self.remaining);
        let buffer = self.read_native(frames)?;

        Ok(buffer.convert(self.output))
    }

    /// Reads every remaining frame into one buffer, empty when nothing is left.
    pub fn read_all(&mut self) -> Result<SampleBuffer> {
        let buffer = self.read_native(self.remaining)?;
        Ok(buffer.convert(self.output))
    }

    /// Calls `f` with consecutive buffers of up to `buffer_size` frames until
    /// the stream is exhausted, then drops the underlying reader.
    pub fn for_each_buffer<F>(mut self, buffer_size: usize, mut f: F) -> Result<()>
    where
        F: FnMut(SampleBuffer),
    {
        let buffer_size = buffer_size.max(1);

        loop {
            match self.read(buffer_size) {
                Ok(buffer) => f(buffer),
                Err(Error::EndOfStream) => return Ok(()),
                Err(e) => return Err(e),
            }
        }
    }

    /// Gives back the underlying reader, positioned after the last frame read.
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn read_native(&mut self, frames: u64) -> Result<SampleBuffer> {
        let len = frames * u64::from(self.format.block_align());

        // allocate for the bytes present, not the declared size
        let mut bytes = Vec::new();
        (&mut self.reader).take(len).read_to_end(&mut bytes)?;

        if (bytes.len() as u64) < len {
            return Err(Error::invalid("truncated data chunk"));
        }
        self.remaining -= frames;

        let samples = Samples::from_bytes(self.format.encoding(), &bytes);
        Ok(SampleBuffer::from_parts(self.format, samples))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Encoding;
    use pretty_assertions::assert_eq;

    const STEREO_16: [u8; 56] = [
        0x52, 0x49, 0x46, 0x46, // RIFF
        0x30, 0x00, 0x00, 0x00, // chunk size
        0x57, 0x41, 0x56, 0x45, // WAVE
        0x66, 0x6d, 0x74, 0x20, // fmt_
        0x10, 0x00, 0x00, 0x00, // chunk size
        0x01, 0x00, // audio format
        0x02, 0x00, // num channels
        0x22, 0x56, 0x00, 0x00, // sample rate
        0x88, 0x58, 0x01, 0x00, // byte rate
        0x04, 0x00, // block align
        0x10, 0x00, // bits per sample
        0x64, 0x61, 0x74, 0x61, // data
        0x0c, 0x00, 0x00, 0x00, // chunk size
        0x00, 0x00, 0x01, 0x00, // sample 1 L+R
        0x02, 0x00, 0x03, 0x00, // sample 2 L+R
        0x04, 0x00, 0x05, 0x00, // sample 3 L+R
    ];

    #[test]
    fn reads_interleaved_frames() {
        let mut reader = StreamReader::from_reader(&STEREO_16[..]).unwrap();

        assert_eq!(reader.frames(), 3);
        assert_eq!(reader.format().encoding(), Encoding::Pcm16);

        let buffer = reader.read(10).unwrap();
        assert_eq!(buffer.samples(), &Samples::I16(vec![0, 1, 2, 3, 4, 5]));
        assert_eq!(buffer.frame_count(), 3);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn exhausts_in_chunks() {
        let mut reader = StreamReader::from_reader(&STEREO_16[..]).unwrap();

        assert_eq!(reader.read(2).unwrap().frame_count(), 2);
        assert_eq!(reader.read(2).unwrap().frame_count(), 1);
        assert!(matches!(reader.read(2), Err(Error::EndOfStream)));
        assert!(matches!(reader.read(2), Err(Error::EndOfStream)));
    }

    #[test]
    fn converts_to_output_format() {
        let mono_8 = Format::new(1, 8, 22_050).unwrap();
        let mut reader = StreamReader::from_reader(&STEREO_16[..])
            .unwrap()
            .with_output_format(mono_8);

        let buffer = reader.read(3).unwrap();
        assert_eq!(buffer.format(), &mono_8);
        assert_eq!(buffer.samples(), &Samples::U8(vec![128, 128, 128]));
    }

    #[test]
    fn for_each_buffer_visits_every_frame() {
        let reader = StreamReader::from_reader(&STEREO_16[..]).unwrap();
        let mut sizes = vec![];

        reader
            .for_each_buffer(2, |buffer| sizes.push(buffer.frame_count()))
            .unwrap();

        assert_eq!(sizes, vec![2, 1]);
    }

    #[test]
    fn truncated_data_is_invalid() {
        let mut reader = StreamReader::from_reader(&STEREO_16[..50]).unwrap();

        let err = reader.read(3).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(msg) if msg == "truncated data chunk"));
    }

    #[test]
    fn oversized_data_chunk_is_invalid() {
        let mut bytes = STEREO_16;
        bytes[40..44].copy_from_slice(&[0xff, 0xff, 0xff, 0xff]); // data chunk size

        let mut reader = StreamReader::from_reader(&bytes[..]).unwrap();
        assert_eq!(reader.frames(), 0x3fff_ffff);

        let err = reader.read_all().unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(msg) if msg == "truncated data chunk"));
        assert_eq!(reader.remaining(), 0x3fff_ffff);
    }

    #[test]
    fn read_all_on_empty_stream() {
        let mut bytes = STEREO_16;
        bytes[40] = 0x00; // data chunk size

        let mut reader = StreamReader::from_reader(&bytes[..44]).unwrap();
        assert!(reader.read_all().unwrap().is_empty());
        assert!(matches!(reader.read(1), Err(Error::EndOfStream)));
    }
}
