use crate::error::{Error, Result};
use crate::fmt::Fmt;
use crate::format::Format;
use byteorder::{LittleEndian, ReadBytesExt};
use log::debug;
use std::io::{self, Read};

/// RIFF chunks are tagged with 4 byte identifiers.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ChunkTag {
    /// Root level container chunk
    Riff,
    /// Form type, located right after the RIFF tag and chunk size
    Wave,
    /// Describes the encoding: sample rate, bit depth, number of channels
    Fmt,
    /// Frame count, required for non PCM encodings
    Fact,
    /// The (interleaved) samples
    Data,
    /// Unknown or unhandled chunk tag
    Unknown([u8; 4]),
}

impl ChunkTag {
    /// Maps a 4 byte identifier to its tag.
    pub fn from_bytes(bytes: &[u8; 4]) -> Self {
        match bytes {
            b"RIFF" => ChunkTag::Riff,
            b"WAVE" => ChunkTag::Wave,
            b"fmt " => ChunkTag::Fmt,
            b"fact" => ChunkTag::Fact,
            b"data" => ChunkTag::Data,
            _ => ChunkTag::Unknown(*bytes),
        }
    }

    /// The 4 byte identifier as written to disk.
    pub fn to_bytes(self) -> [u8; 4] {
        match self {
            ChunkTag::Riff => *b"RIFF",
            ChunkTag::Wave => *b"WAVE",
            ChunkTag::Fmt => *b"fmt ",
            ChunkTag::Fact => *b"fact",
            ChunkTag::Data => *b"data",
            ChunkTag::Unknown(bytes) => bytes,
        }
    }
}

/// Everything the header walk learned before the first sample byte.
#[derive(Debug, Clone, PartialEq)]
pub struct DataHeader {
    /// Raw, unvalidated fields of the `fmt ` chunk
    pub fmt: Fmt,
    /// Declared size of the `data` chunk payload in bytes
    pub data_size: u32,
    /// Absolute offset of the first sample byte
    pub data_offset: u64,
    /// Absolute offset of the frame count inside the `fact` chunk, if one preceded `data`
    pub fact_offset: Option<u64>,
}

impl DataHeader {
    /// Whole frames in the data chunk, a trailing partial frame is ignored.
    pub fn frames(&self) -> u64 {
        match self.fmt.block_align {
            0 => 0,
            block_align => u64::from(self.data_size / u32::from(block_align)),
        }
    }
}

#[derive(Debug)]
enum State {
    AwaitRiffHeader,
    ScanningChunks,
    FormatFound(Fmt),
    DataFound,
}

/// Forward only walk over the chunks of a wave stream.
///
/// Validates the container header, parses the `fmt ` chunk, skips anything it
/// doesn't know and stops with the underlying reader positioned at the first
/// byte of the `data` payload. It never seeks, so it works on pipes too.
#[derive(Debug)]
pub struct ChunkReader<R> {
    reader: R,
    position: u64,
    state: State,
}

impl<R: Read> ChunkReader<R> {
    /// Starts a walk at the first byte of `reader`.
    pub fn new(reader: R) -> Self {
        ChunkReader {
            reader,
            position: 0,
            state: State::AwaitRiffHeader,
        }
    }

    /// Walks to the data chunk and validates the encoding for decoding.
    ///
    /// Returns the native format together with the number of frames the data
    /// chunk declares.
    pub fn walk_to_data(&mut self) -> Result<(Format, u64)> {
        let header = self.walk_raw()?;
        let format = header.fmt.to_format()?;

        if u64::from(header.data_size) % u64::from(format.block_align()) != 0 {
            log::warn!(
                "data chunk of {} bytes ends in a partial frame, ignoring it",
                header.data_size
            );
        }

        Ok((format, header.frames()))
    }

    /// Walks to the data chunk without judging whether the encoding is supported.
    pub fn walk_raw(&mut self) -> Result<DataHeader> {
        if !matches!(self.state, State::AwaitRiffHeader) {
            return Err(Error::invalid("chunk walk already performed"));
        }

        self.read_container_header()?;
        self.state = State::ScanningChunks;

        let mut fact_offset = None;

        loop {
            let (tag, size) = self
                .read_chunk_header()
                .map_err(|e| eof_as(e, "missing data chunk"))?;

            debug!("chunk {:?} of {} bytes at offset {}", tag, size, self.position - 8);

            match tag {
                ChunkTag::Fmt => {
                    if matches!(self.state, State::FormatFound(_)) {
                        return Err(Error::invalid("duplicate format chunk"));
                    }

                    let fmt = Fmt::read_from(&mut self.reader, size)?;
                    self.position += u64::from(size);
                    self.skip_padding(size)?;

                    debug!("format chunk: {:?}", fmt);
                    self.state = State::FormatFound(fmt);
                }
                ChunkTag::Data => {
                    let state = std::mem::replace(&mut self.state, State::DataFound);

                    let fmt = match state {
                        State::FormatFound(fmt) => fmt,
                        _ => return Err(Error::invalid("missing or misplaced format chunk")),
                    };

                    debug!("data chunk at offset {}", self.position);

                    return Ok(DataHeader {
                        fmt,
                        data_size: size,
                        data_offset: self.position,
                        fact_offset,
                    });
                }
                ChunkTag::Fact if size >= 4 => {
                    fact_offset = Some(self.position);
                    self.skip(size)?;
                }
                _ => self.skip(size)?,
            }
        }
    }

    /// Offset of the next unread byte.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Gives back the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn read_container_header(&mut self) -> Result<()> {
        let mut header = [0u8; 12];
        self.reader
            .read_exact(&mut header)
            .map_err(|e| eof_as(e, "truncated container header"))?;
        self.position += 12;

        if &header[0..4] != b"RIFF" {
            return Err(Error::invalid("bad container id"));
        }

        if &header[8..12] != b"WAVE" {
            return Err(Error::invalid("bad form type"));
        }

        debug!(
            "RIFF/WAVE container, declared size {}",
            u32::from_le_bytes([header[4], header[5], header[6], header[7]])
        );

        Ok(())
    }

    fn read_chunk_header(&mut self) -> io::Result<(ChunkTag, u32)> {
        let mut id = [0u8; 4];
        self.reader.read_exact(&mut id)?;
        let size = self.reader.read_u32::<LittleEndian>()?;
        self.position += 8;

        Ok((ChunkTag::from_bytes(&id), size))
    }

    // Chunks should always have an even number of bytes,
    // if it is odd there is an empty padding byte at the end
    fn skip(&mut self, size: u32) -> Result<()> {
        let len = u64::from(size) + u64::from(size & 1);
        let skipped = io::copy(&mut (&mut self.reader).take(len), &mut io::sink())?;
        self.position += skipped;

        if skipped < len {
            return Err(Error::invalid("missing data chunk"));
        }

        Ok(())
    }

    fn skip_padding(&mut self, size: u32) -> Result<()> {
        if size & 1 == 1 {
            self.reader
                .read_u8()
                .map_err(|e| eof_as(e, "missing data chunk"))?;
            self.position += 1;
        }

        Ok(())
    }
}

/// Running out of bytes in the header means the container is malformed.
pub(crate) fn eof_as(err: io::Error, msg: &str) -> Error {
    match err.kind() {
        io::ErrorKind::UnexpectedEof => Error::invalid(msg),
        _ => Error::Io(err),
    }
}
