use crate::data::Samples;
use crate::error::{Error, Result};
use crate::format::Format;
use log::warn;
use std::iter;

/// Block of interleaved sample frames tagged with the format they are expressed in.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    format: Format,
    samples: Samples,
}

impl SampleBuffer {
    /// Creates a buffer from interleaved samples.
    ///
    /// The samples must be stored in the format's encoding and make up whole
    /// frames. Individual values are not range checked.
    ///
    /// ```
    /// use wavstream::{Format, SampleBuffer, Samples};
    ///
    /// let format = Format::new(2, 16, 44_100).unwrap();
    /// let buffer = SampleBuffer::new(format, Samples::I16(vec![1, -1, 2, -2])).unwrap();
    ///
    /// assert_eq!(buffer.frame_count(), 2);
    /// ```
    pub fn new(format: Format, samples: Samples) -> Result<Self> {
        if samples.encoding() != format.encoding() {
            return Err(Error::InvalidBuffer(format!(
                "{:?} samples for a {:?} format",
                samples.encoding(),
                format.encoding()
            )));
        }

        if samples.len() % usize::from(format.channels()) != 0 {
            return Err(Error::InvalidBuffer(format!(
                "{} samples don't make up whole {} channel frames",
                samples.len(),
                format.channels()
            )));
        }

        Ok(SampleBuffer { format, samples })
    }

    /// Used where the shape is guaranteed by construction.
    pub(crate) fn from_parts(format: Format, samples: Samples) -> Self {
        debug_assert_eq!(samples.encoding(), format.encoding());
        SampleBuffer { format, samples }
    }

    /// Format the samples are expressed in.
    pub fn format(&self) -> &Format {
        &self.format
    }

    /// Interleaved samples.
    pub fn samples(&self) -> &Samples {
        &self.samples
    }

    /// Consumes the buffer, keeping only the samples.
    pub fn into_samples(self) -> Samples {
        self.samples
    }

    /// Number of whole frames.
    pub fn frame_count(&self) -> usize {
        self.samples.len() / usize::from(self.format.channels())
    }

    /// `true` when the buffer holds no frames.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// One frame with every channel mapped onto `[-1.0, 1.0]`.
    pub fn frame(&self, index: usize) -> Option<Vec<f64>> {
        if index >= self.frame_count() {
            return None;
        }

        let channels = usize::from(self.format.channels());
        let start = index * channels;
        Some((start..start + channels).map(|i| self.samples.normalized(i)).collect())
    }

    /// Re-expresses the frames in `target`, leaving `self` untouched.
    ///
    /// Channels are remapped first: a mono source is copied into every target
    /// channel, a mono target receives the mean of all source channels, and any
    /// other change keeps the leading channels and fills new ones with silence.
    /// Values are then normalized by the source encoding and quantized into the
    /// target encoding. The sample rate is only a tag, nothing is resampled.
    ///
    /// ```
    /// use wavstream::{Format, SampleBuffer, Samples};
    ///
    /// let mono = Format::new(1, 8, 8_000).unwrap();
    /// let stereo = Format::new(2, 16, 8_000).unwrap();
    ///
    /// let buffer = SampleBuffer::new(mono, Samples::U8(vec![128, 192])).unwrap();
    /// let converted = buffer.convert(stereo);
    ///
    /// assert_eq!(converted.samples(), &Samples::I16(vec![0, 0, 16_384, 16_384]));
    /// ```
    pub fn convert(&self, target: Format) -> SampleBuffer {
        if self.format.sample_rate() != target.sample_rate() {
            warn!(
                "re-tagging {} Hz samples as {} Hz without resampling",
                self.format.sample_rate(),
                target.sample_rate()
            );
        }

        if self.format.channels() == target.channels()
            && self.format.encoding() == target.encoding()
        {
            return SampleBuffer::from_parts(target, self.samples.clone());
        }

        let normalized = self.samples.to_normalized();
        let remapped = remap_channels(
            &normalized,
            usize::from(self.format.channels()),
            usize::from(target.channels()),
        );

        SampleBuffer::from_parts(target, Samples::from_normalized(target.encoding(), &remapped))
    }
}

fn remap_channels(values: &[f64], from: usize, to: usize) -> Vec<f64> {
    if from == to {
        return values.to_vec();
    }

    let mut out = Vec::with_capacity(values.len() / from * to);

    for frame in values.chunks_exact(from) {
        if from == 1 {
            out.extend(iter::repeat(frame[0]).take(to));
        } else if to == 1 {
            out.push(frame.iter().sum::<f64>() / from as f64);
        } else {
            out.extend((0..to).map(|c| frame.get(c).copied().unwrap_or(0.0)));
        }
    }

    out
}
