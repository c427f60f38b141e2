use crate::buffer::SampleBuffer;
use crate::chunk::{ChunkReader, ChunkTag};
use crate::error::{Error, Result};
use crate::fmt::Fmt;
use crate::format::{Format, SampleCategory};
use byteorder::{LittleEndian, WriteBytesExt};
use log::{debug, warn};
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// How [`StreamWriter::open`] treats the target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Create the file, truncating anything already there
    Create,
    /// Extend an existing file in its own format
    Append,
}

/// Writes sample buffers into a wave file.
///
/// The header is written up front with provisional sizes and only made
/// consistent by [`StreamWriter::close`]. A writer that is dropped while
/// still open finalizes its header on a best effort basis.
///
/// ```no_run
/// use wavstream::{Format, SampleBuffer, Samples, StreamWriter};
///
/// let format = Format::new(1, 16, 8_000).unwrap();
/// let mut writer = StreamWriter::create("tone.wav", format).unwrap();
///
/// let buffer = SampleBuffer::new(format, Samples::I16(vec![0, 1_000, 0, -1_000])).unwrap();
/// writer.write(&buffer).unwrap();
/// writer.close().unwrap();
/// ```
#[derive(Debug)]
pub struct StreamWriter {
    file: Option<BufWriter<File>>,
    path: PathBuf,
    format: Format,
    mode: Mode,
    data_offset: u64,
    fact_offset: Option<u64>,
    frames_existing: u64,
    frames_written: u64,
}

impl StreamWriter {
    /// Opens `path` for writing.
    ///
    /// In [`Mode::Append`] the existing file's format wins over `format`.
    pub fn open<P: AsRef<Path>>(path: P, format: Format, mode: Mode) -> Result<Self> {
        match mode {
            Mode::Create => StreamWriter::create(path, format),
            Mode::Append => StreamWriter::open_append(path.as_ref(), Some(format)),
        }
    }

    /// Creates (or truncates) `path` and writes a provisional header.
    pub fn create<P: AsRef<Path>>(path: P, format: Format) -> Result<Self> {
        let path = path.as_ref();
        let mut file = BufWriter::new(File::create(path)?);
        let data_offset = write_header(&mut file, &format, 0)?;

        let fact_offset = match format.category() {
            SampleCategory::Integer => None,
            SampleCategory::Float => Some(data_offset - 12),
        };

        debug!("created {} as {}", path.display(), format);

        Ok(StreamWriter {
            file: Some(file),
            path: path.to_path_buf(),
            format,
            mode: Mode::Create,
            data_offset,
            fact_offset,
            frames_existing: 0,
            frames_written: 0,
        })
    }

    /// Opens an existing file to write more frames after the ones it holds.
    pub fn append<P: AsRef<Path>>(path: P) -> Result<Self> {
        StreamWriter::open_append(path.as_ref(), None)
    }

    fn open_append(path: &Path, requested: Option<Format>) -> Result<Self> {
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;

        let header = ChunkReader::new(BufReader::new(file)).walk_raw()?;
        let format = header.fmt.to_format()?;

        if let Some(requested) = requested {
            if requested != format {
                warn!(
                    "appending to {} as {}, ignoring requested {}",
                    path.display(),
                    format,
                    requested
                );
            }
        }

        let frames_existing = header.frames();
        let end_of_frames = header.data_offset + frames_existing * u64::from(format.block_align());

        let mut file = OpenOptions::new().read(true).write(true).open(path)?;
        if file.metadata()?.len() < end_of_frames {
            return Err(Error::invalid("truncated data chunk"));
        }
        file.seek(SeekFrom::Start(end_of_frames))?;

        debug!(
            "appending to {} after {} frames of {}",
            path.display(),
            frames_existing,
            format
        );

        Ok(StreamWriter {
            file: Some(BufWriter::new(file)),
            path: path.to_path_buf(),
            format,
            mode: Mode::Append,
            data_offset: header.data_offset,
            fact_offset: header.fact_offset,
            frames_existing,
            frames_written: 0,
        })
    }

    /// Format the frames are stored in on disk.
    pub fn format(&self) -> &Format {
        &self.format
    }

    /// Whether the file was created or appended to.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Path of the target file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Frames that were already in the file when it was opened.
    pub fn frames_existing(&self) -> u64 {
        self.frames_existing
    }

    /// Frames written through this writer.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Frames the header will report once closed.
    pub fn total_frames(&self) -> u64 {
        self.frames_existing + self.frames_written
    }

    /// `true` once [`StreamWriter::close`] has run.
    pub fn is_closed(&self) -> bool {
        self.file.is_none()
    }

    /// Converts `buffer` to the writer's format and appends its frames.
    pub fn write(&mut self, buffer: &SampleBuffer) -> Result<()> {
        let file = self.file.as_mut().ok_or(Error::Closed)?;

        let frames = buffer.frame_count() as u64;
        let data_bytes =
            (self.frames_existing + self.frames_written + frames) * u64::from(self.format.block_align());

        if self.data_offset - 8 + data_bytes > u64::from(u32::MAX) {
            return Err(Error::invalid("data chunk would exceed the RIFF size limit"));
        }

        let bytes = if buffer.format() == &self.format {
            buffer.samples().to_bytes()
        } else {
            buffer.convert(self.format).samples().to_bytes()
        };

        file.write_all(&bytes)?;
        self.frames_written += frames;

        Ok(())
    }

    /// Pads the data chunk, writes the final sizes into the header and
    /// releases the file. Fails with [`Error::Closed`] when called twice.
    pub fn close(&mut self) -> Result<()> {
        let file = self.file.take().ok_or(Error::Closed)?;
        self.finalize(file)
    }

    fn finalize(&self, mut file: BufWriter<File>) -> Result<()> {
        let total = self.total_frames();
        let data_bytes = total * u64::from(self.format.block_align());
        let padding = data_bytes & 1;

        if padding == 1 {
            file.write_all(&[0])?;
        }

        match self.mode {
            Mode::Create => {
                file.seek(SeekFrom::Start(0))?;
                write_header(&mut file, &self.format, total)?;
            }
            Mode::Append => {
                file.seek(SeekFrom::Start(4))?;
                file.write_u32::<LittleEndian>((self.data_offset - 8 + data_bytes) as u32)?;

                file.seek(SeekFrom::Start(self.data_offset - 4))?;
                file.write_u32::<LittleEndian>(data_bytes as u32)?;

                if let Some(offset) = self.fact_offset {
                    file.seek(SeekFrom::Start(offset))?;
                    file.write_u32::<LittleEndian>(total as u32)?;
                }
            }
        }

        file.flush()?;
        // drop whatever followed the data chunk in an appended file
        file.get_ref()
            .set_len(self.data_offset + data_bytes + padding)?;

        debug!(
            "closed {} with {} frames ({} existing, {} written)",
            self.path.display(),
            total,
            self.frames_existing,
            self.frames_written
        );

        Ok(())
    }
}

impl Drop for StreamWriter {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            warn!(
                "{} dropped without close, finalizing header",
                self.path.display()
            );

            if let Err(e) = self.finalize(file) {
                warn!("failed to finalize {}: {}", self.path.display(), e);
            }
        }
    }
}

/// Writes the canonical header for `frames` frames of `format` and returns
/// its length, which is where the sample data starts.
fn write_header<W: Write>(writer: &mut W, format: &Format, frames: u64) -> io::Result<u64> {
    let fmt = Fmt::from_format(format);
    let data_size = (frames * u64::from(format.block_align())) as u32;

    let fact_size = match format.category() {
        SampleCategory::Integer => 0,
        SampleCategory::Float => 12,
    };

    // "WAVE" + fmt chunk + fact chunk + data chunk header
    let pre_data = 4 + 8 + fmt.chunk_size() + fact_size + 8;

    writer.write_all(&ChunkTag::Riff.to_bytes())?;
    writer.write_u32::<LittleEndian>(pre_data + data_size)?;
    writer.write_all(&ChunkTag::Wave.to_bytes())?;

    fmt.write_to(writer)?;

    if fact_size > 0 {
        writer.write_all(&ChunkTag::Fact.to_bytes())?;
        writer.write_u32::<LittleEndian>(4)?;
        writer.write_u32::<LittleEndian>(frames as u32)?;
    }

    writer.write_all(&ChunkTag::Data.to_bytes())?;
    writer.write_u32::<LittleEndian>(data_size)?;

    Ok(u64::from(pre_data) + 8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Samples;
    use crate::format::Encoding;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn pcm_header_layout() {
        let format = Format::new(2, 16, 48_000).unwrap();
        let mut bytes = vec![];

        let len = write_header(&mut bytes, &format, 2).unwrap();

        assert_eq!(len, 44);
        assert_eq!(
            bytes,
            [
                0x52, 0x49, 0x46, 0x46, // RIFF
                0x2c, 0x00, 0x00, 0x00, // chunk size
                0x57, 0x41, 0x56, 0x45, // WAVE
                0x66, 0x6d, 0x74, 0x20, // fmt_
                0x10, 0x00, 0x00, 0x00, // chunk size
                0x01, 0x00, // audio format
                0x02, 0x00, // num channels
                0x80, 0xbb, 0x00, 0x00, // sample rate
                0x00, 0xee, 0x02, 0x00, // byte rate
                0x04, 0x00, // block align
                0x10, 0x00, // bits per sample
                0x64, 0x61, 0x74, 0x61, // data
                0x08, 0x00, 0x00, 0x00, // chunk size
            ]
        );
    }

    #[test]
    fn float_header_layout() {
        let format = Format::new(1, Encoding::Float32, 48_000).unwrap();
        let mut bytes = vec![];

        let len = write_header(&mut bytes, &format, 3).unwrap();

        assert_eq!(len, 58);
        assert_eq!(
            bytes,
            [
                0x52, 0x49, 0x46, 0x46, // RIFF
                0x3e, 0x00, 0x00, 0x00, // chunk size
                0x57, 0x41, 0x56, 0x45, // WAVE
                0x66, 0x6d, 0x74, 0x20, // fmt_
                0x12, 0x00, 0x00, 0x00, // chunk size
                0x03, 0x00, // audio format
                0x01, 0x00, // num channels
                0x80, 0xbb, 0x00, 0x00, // sample rate
                0x00, 0xee, 0x02, 0x00, // byte rate
                0x04, 0x00, // block align
                0x20, 0x00, // bits per sample
                0x00, 0x00, // extension size
                0x66, 0x61, 0x63, 0x74, // fact
                0x04, 0x00, 0x00, 0x00, // chunk size
                0x03, 0x00, 0x00, 0x00, // frame count
                0x64, 0x61, 0x74, 0x61, // data
                0x0c, 0x00, 0x00, 0x00, // chunk size
            ]
        );
    }

    #[test]
    fn writes_complete_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let format = Format::new(2, 16, 48_000).unwrap();

        let mut writer = StreamWriter::create(&path, format).unwrap();
        let buffer = SampleBuffer::new(format, Samples::I16(vec![1, 2, 3, -1])).unwrap();
        writer.write(&buffer).unwrap();
        writer.close().unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 52);
        assert_eq!(&bytes[4..8], &[0x2c, 0x00, 0x00, 0x00]);
        assert_eq!(&bytes[40..44], &[0x08, 0x00, 0x00, 0x00]);
        assert_eq!(&bytes[44..], &[0x01, 0x00, 0x02, 0x00, 0x03, 0x00, 0xff, 0xff]);
    }

    #[test]
    fn converts_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("converted.wav");
        let target = Format::new(2, 8, 8_000).unwrap();
        let source = Format::new(1, 16, 8_000).unwrap();

        let mut writer = StreamWriter::create(&path, target).unwrap();
        writer
            .write(&SampleBuffer::new(source, Samples::I16(vec![0, 16_384])).unwrap())
            .unwrap();
        writer.close().unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[44..], &[128, 128, 192, 192]);
    }

    #[test]
    fn close_twice_fails() {
        let dir = tempfile::tempdir().unwrap();
        let format = Format::new(1, 16, 8_000).unwrap();

        let mut writer = StreamWriter::create(dir.path().join("twice.wav"), format).unwrap();
        writer.close().unwrap();

        assert!(writer.is_closed());
        assert!(matches!(writer.close(), Err(Error::Closed)));

        let buffer = SampleBuffer::new(format, Samples::I16(vec![1])).unwrap();
        assert!(matches!(writer.write(&buffer), Err(Error::Closed)));
    }

    #[test]
    fn append_requires_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.wav");

        assert!(matches!(StreamWriter::append(&path), Err(Error::NotFound(p)) if p == path));
    }

    #[test]
    fn drop_finalizes_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dropped.wav");
        let format = Format::new(1, 16, 8_000).unwrap();

        {
            let mut writer = StreamWriter::create(&path, format).unwrap();
            writer
                .write(&SampleBuffer::new(format, Samples::I16(vec![1, 2, 3])).unwrap())
                .unwrap();
        }

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[40..44], &[0x06, 0x00, 0x00, 0x00]);
        assert_eq!(bytes.len(), 50);
    }
}
