use crate::format::Encoding;
use byteorder::{ByteOrder, LittleEndian};

/// Interleaved samples, one vector type per supported encoding
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    /// 8 bit unsigned PCM
    U8(Vec<u8>),
    /// 16 bit signed PCM
    I16(Vec<i16>),
    /// 32 bit signed PCM
    I32(Vec<i32>),
    /// 32 bit float
    F32(Vec<f32>),
    /// 64 bit float
    F64(Vec<f64>),
}

const I16_SCALE: f64 = 32_768.0;
const I32_SCALE: f64 = 2_147_483_648.0;

impl Samples {
    /// Encoding the samples are stored in.
    pub fn encoding(&self) -> Encoding {
        match self {
            Samples::U8(_) => Encoding::Pcm8,
            Samples::I16(_) => Encoding::Pcm16,
            Samples::I32(_) => Encoding::Pcm32,
            Samples::F32(_) => Encoding::Float32,
            Samples::F64(_) => Encoding::Float64,
        }
    }

    /// Get the length of the internal sample Vec.
    pub fn len(&self) -> usize {
        match self {
            Samples::U8(s) => s.len(),
            Samples::I16(s) => s.len(),
            Samples::I32(s) => s.len(),
            Samples::F32(s) => s.len(),
            Samples::F64(s) => s.len(),
        }
    }

    /// `true` when there are no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decodes little endian sample bytes. Trailing bytes that don't make up a
    /// whole sample are ignored.
    pub(crate) fn from_bytes(encoding: Encoding, bytes: &[u8]) -> Self {
        let len = bytes.len() / encoding.bytes_per_sample();
        let bytes = &bytes[..len * encoding.bytes_per_sample()];

        match encoding {
            Encoding::Pcm8 => Samples::U8(bytes.to_vec()),
            Encoding::Pcm16 => {
                let mut s = vec![0; len];
                LittleEndian::read_i16_into(bytes, &mut s);
                Samples::I16(s)
            }
            Encoding::Pcm32 => {
                let mut s = vec![0; len];
                LittleEndian::read_i32_into(bytes, &mut s);
                Samples::I32(s)
            }
            Encoding::Float32 => {
                let mut s = vec![0.0; len];
                LittleEndian::read_f32_into(bytes, &mut s);
                Samples::F32(s)
            }
            Encoding::Float64 => {
                let mut s = vec![0.0; len];
                LittleEndian::read_f64_into(bytes, &mut s);
                Samples::F64(s)
            }
        }
    }

    /// Encodes the samples as little endian bytes.
    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; self.len() * self.encoding().bytes_per_sample()];

        match self {
            Samples::U8(s) => bytes.copy_from_slice(s),
            Samples::I16(s) => LittleEndian::write_i16_into(s, &mut bytes),
            Samples::I32(s) => LittleEndian::write_i32_into(s, &mut bytes),
            Samples::F32(s) => LittleEndian::write_f32_into(s, &mut bytes),
            Samples::F64(s) => LittleEndian::write_f64_into(s, &mut bytes),
        }

        bytes
    }

    /// Sample `index` mapped onto `[-1.0, 1.0]`.
    pub(crate) fn normalized(&self, index: usize) -> f64 {
        match self {
            Samples::U8(s) => (f64::from(s[index]) - 128.0) / 128.0,
            Samples::I16(s) => f64::from(s[index]) / I16_SCALE,
            Samples::I32(s) => f64::from(s[index]) / I32_SCALE,
            Samples::F32(s) => f64::from(s[index]),
            Samples::F64(s) => s[index],
        }
    }

    /// Every sample mapped onto `[-1.0, 1.0]`.
    pub(crate) fn to_normalized(&self) -> Vec<f64> {
        (0..self.len()).map(|i| self.normalized(i)).collect()
    }

    /// Quantizes normalized values into `encoding`, clamping to its range.
    pub(crate) fn from_normalized(encoding: Encoding, values: &[f64]) -> Self {
        match encoding {
            Encoding::Pcm8 => Samples::U8(
                values
                    .iter()
                    .map(|v| ((v * 128.0).round() + 128.0).clamp(0.0, 255.0) as u8)
                    .collect(),
            ),
            Encoding::Pcm16 => Samples::I16(
                values
                    .iter()
                    .map(|v| (v * I16_SCALE).round().clamp(-I16_SCALE, I16_SCALE - 1.0) as i16)
                    .collect(),
            ),
            Encoding::Pcm32 => Samples::I32(
                values
                    .iter()
                    .map(|v| (v * I32_SCALE).round().clamp(-I32_SCALE, I32_SCALE - 1.0) as i32)
                    .collect(),
            ),
            Encoding::Float32 => {
                Samples::F32(values.iter().map(|v| v.clamp(-1.0, 1.0) as f32).collect())
            }
            Encoding::Float64 => Samples::F64(values.iter().map(|v| v.clamp(-1.0, 1.0)).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_8_bit() {
        let data = Samples::from_bytes(Encoding::Pcm8, &[0xff, 0xc0, 0xaa, 0x40]);
        assert_eq!(data, Samples::U8(vec![255, 192, 170, 64]));
    }

    #[test]
    fn from_16_bit() {
        let bytes = [
            0xff, 0x7f, 0x00, 0x80, // sample 1, 2
            0xff, 0xff, 0x01, 0x00, // sample 3, 4
        ];

        let data = Samples::from_bytes(Encoding::Pcm16, &bytes);
        assert_eq!(data, Samples::I16(vec![32767, -32768, -1, 1]));
    }

    #[test]
    fn from_32_bit() {
        let bytes = [
            0xff, 0xff, 0xff, 0x7f, // sample 1
            0x00, 0x00, 0x00, 0x80, // sample 2
            0x01, 0x00, 0x00, 0x00, // sample 3
        ];

        let data = Samples::from_bytes(Encoding::Pcm32, &bytes);
        assert_eq!(data, Samples::I32(vec![i32::MAX, i32::MIN, 1]));
    }

    #[test]
    fn from_float() {
        let bytes = [
            0x00, 0x00, 0x80, 0x3f, // 1.0
            0x00, 0x00, 0x00, 0xbf, // -0.5
        ];

        let data = Samples::from_bytes(Encoding::Float32, &bytes);
        assert_eq!(data, Samples::F32(vec![1.0, -0.5]));
    }

    #[test]
    fn to_16_bit() {
        let data = Samples::I16(vec![1, 2, 3, -1]);
        assert_eq!(data.to_bytes(), &[1, 0, 2, 0, 3, 0, 0xff, 0xff]);
    }

    #[test]
    fn to_64_bit_float() {
        let data = Samples::F64(vec![0.25]);
        assert_eq!(data.to_bytes(), 0.25f64.to_le_bytes());
    }

    #[test]
    fn partial_samples_are_dropped() {
        let data = Samples::from_bytes(Encoding::Pcm16, &[0x01, 0x00, 0x02]);
        assert_eq!(data, Samples::I16(vec![1]));
    }

    #[test]
    fn normalizes_full_scale() {
        let data = Samples::U8(vec![0, 128, 255]);
        assert_eq!(data.to_normalized(), vec![-1.0, 0.0, 127.0 / 128.0]);

        let data = Samples::I16(vec![i16::MIN, 0, 16_384]);
        assert_eq!(data.to_normalized(), vec![-1.0, 0.0, 0.5]);
    }

    #[test]
    fn quantize_clamps_to_range() {
        let values = [-1.5, -1.0, 0.0, 1.0, 1.5];

        assert_eq!(
            Samples::from_normalized(Encoding::Pcm8, &values),
            Samples::U8(vec![0, 0, 128, 255, 255])
        );
        assert_eq!(
            Samples::from_normalized(Encoding::Pcm16, &values),
            Samples::I16(vec![-32768, -32768, 0, 32767, 32767])
        );
        assert_eq!(
            Samples::from_normalized(Encoding::Pcm32, &values),
            Samples::I32(vec![i32::MIN, i32::MIN, 0, i32::MAX, i32::MAX])
        );
        assert_eq!(
            Samples::from_normalized(Encoding::Float32, &values),
            Samples::F32(vec![-1.0, -1.0, 0.0, 1.0, 1.0])
        );
    }
}
