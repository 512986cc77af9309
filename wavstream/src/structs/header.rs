use soundwave_macros::ToBytes;

use crate::utils::errors::WavError;

pub const RIFF_TAG: [u8; 4] = *b"RIFF";
pub const WAVE_TAG: [u8; 4] = *b"WAVE";
pub const FMT_TAG: [u8; 4] = *b"fmt ";
pub const DATA_TAG: [u8; 4] = *b"data";

/// Size of the only accepted `fmt ` chunk body.
pub const PCM_FMT_CHUNK_SIZE: u32 = 16;
/// `WAVE_FORMAT_PCM`.
pub const PCM_FORMAT_CODE: u16 = 1;

/// Bytes covered by the `RIFF` tag and the file size field.
pub const RIFF_PREAMBLE_LEN: u32 = 8;
/// Bytes of header after the preamble, through the `data` tag and size.
pub const HEADER_TAIL_LEN: u32 = 36;
/// Full canonical header length.
pub const HEADER_LEN: u32 = RIFF_PREAMBLE_LEN + HEADER_TAIL_LEN;

/// Canonical 44-byte RIFF/WAVE header with a 16-byte PCM `fmt ` chunk.
///
/// Field order matches the on-disk layout, so the derived encoder writes the header as is.
#[derive(Debug, Clone, PartialEq, Eq, ToBytes)]
pub struct HeaderModel {
    pub riff_tag: [u8; 4],
    /// Total stream length minus 8.
    pub file_size: u32,
    pub wave_tag: [u8; 4],
    pub fmt_tag: [u8; 4],
    pub fmt_chunk_size: u32,
    pub format_code: u16,
    pub channel_count: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    /// Bytes per frame.
    pub block_align: u16,
    pub bits_per_sample: u16,
    pub data_tag: [u8; 4],
    /// Length of the sample region in bytes.
    pub data_size: u32,
}

impl HeaderModel {
    /// Builds a consistent PCM header for `data_size` bytes of samples and no trailing data.
    pub fn pcm(
        channel_count: u16,
        sample_rate: u32,
        bits_per_sample: u16,
        data_size: u32,
    ) -> Result<Self, WavError> {
        check_channel_count(channel_count)?;
        check_bits_per_sample(bits_per_sample)?;

        let block_align = (bits_per_sample / 8) * channel_count;
        let byte_rate = sample_rate.checked_mul(block_align as u32).ok_or_else(|| {
            WavError::InvalidArgument(format!(
                "byte rate overflows for sample rate {sample_rate} and block alignment {block_align}"
            ))
        })?;
        let file_size = data_size.checked_add(HEADER_TAIL_LEN).ok_or_else(|| {
            WavError::InvalidArgument(format!("size of data chunk {data_size} is too large"))
        })?;

        Ok(Self {
            riff_tag: RIFF_TAG,
            file_size,
            wave_tag: WAVE_TAG,
            fmt_tag: FMT_TAG,
            fmt_chunk_size: PCM_FMT_CHUNK_SIZE,
            format_code: PCM_FORMAT_CODE,
            channel_count,
            sample_rate,
            byte_rate,
            block_align,
            bits_per_sample,
            data_tag: DATA_TAG,
            data_size,
        })
    }

    pub fn bytes_per_sample(&self) -> u16 {
        self.bits_per_sample / 8
    }

    pub fn is_stereo(&self) -> bool {
        self.channel_count == 2
    }

    /// `(bits_per_sample / 8) * channel_count`, widened so a bogus header cannot overflow.
    pub fn expected_block_align(&self) -> u32 {
        (self.bits_per_sample as u32 / 8) * self.channel_count as u32
    }

    pub fn expected_byte_rate(&self) -> u64 {
        self.sample_rate as u64 * self.block_align as u64
    }

    /// Checks the block alignment and byte rate against the primitives they derive from.
    pub fn check_derived_fields(&self) -> Result<(), WavError> {
        let expected = self.expected_block_align();
        if self.block_align as u32 != expected {
            return Err(WavError::BlockAlign {
                read: self.block_align,
                expected,
            });
        }

        let expected = self.expected_byte_rate();
        if self.byte_rate as u64 != expected {
            return Err(WavError::ByteRate {
                read: self.byte_rate,
                expected,
            });
        }

        Ok(())
    }

    /// Whole frames in the sample region.
    pub fn frame_count(&self) -> u64 {
        match self.block_align {
            0 => 0,
            align => (self.data_size / align as u32) as u64,
        }
    }

    pub fn is_frame_aligned(&self) -> bool {
        self.block_align != 0 && self.data_size % self.block_align as u32 == 0
    }

    /// Declared length of the whole stream.
    pub fn total_len(&self) -> u64 {
        self.file_size as u64 + RIFF_PREAMBLE_LEN as u64
    }

    /// Bytes expected after the sample region, zero when the declared sizes disagree.
    pub fn trailing_len(&self) -> u64 {
        self.total_len()
            .saturating_sub(HEADER_LEN as u64 + self.data_size as u64)
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count() as f64 / self.sample_rate as f64
    }
}

pub fn check_fmt_chunk_size(value: u32) -> Result<(), WavError> {
    if value != PCM_FMT_CHUNK_SIZE {
        return Err(WavError::FmtChunkSize(value));
    }
    Ok(())
}

pub fn check_format_code(value: u16) -> Result<(), WavError> {
    if value != PCM_FORMAT_CODE {
        return Err(WavError::FormatCode(value));
    }
    Ok(())
}

pub fn check_channel_count(value: u16) -> Result<(), WavError> {
    if !matches!(value, 1 | 2) {
        return Err(WavError::ChannelCount(value));
    }
    Ok(())
}

pub fn check_bits_per_sample(value: u16) -> Result<(), WavError> {
    if !matches!(value, 8 | 16) {
        return Err(WavError::BitsPerSample(value));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byteorder::WriteBytesLe;
    use crate::utils::errors::ErrorKind;

    #[test]
    fn pcm_header_layout() {
        let header = HeaderModel::pcm(2, 44100, 16, 8).unwrap();
        assert_eq!(header.block_align, 4);
        assert_eq!(header.byte_rate, 176_400);
        assert_eq!(header.file_size, 44);
        assert_eq!(header.trailing_len(), 0);
        header.check_derived_fields().unwrap();

        let mut bytes = Vec::new();
        header.write_le(&mut bytes);
        assert_eq!(bytes.len(), HEADER_LEN as usize);
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..16], b"WAVEfmt ");
        assert_eq!(&bytes[22..24], &[2, 0]);
        assert_eq!(&bytes[24..28], &44100u32.to_le_bytes());
        assert_eq!(&bytes[36..40], b"data");
        assert_eq!(&bytes[40..44], &[8, 0, 0, 0]);
    }

    #[test]
    fn derived_field_mismatch() {
        let mut header = HeaderModel::pcm(1, 8000, 16, 0).unwrap();
        header.block_align = 1;
        let err = header.check_derived_fields().unwrap_err();
        assert!(matches!(err, WavError::BlockAlign { read: 1, expected: 2 }));
        assert_eq!(err.kind(), ErrorKind::InconsistentHeader);

        let mut header = HeaderModel::pcm(1, 8000, 16, 0).unwrap();
        header.byte_rate = 8000;
        assert!(matches!(
            header.check_derived_fields(),
            Err(WavError::ByteRate {
                read: 8000,
                expected: 16000
            })
        ));
    }

    #[test]
    fn trailing_length_from_declared_sizes() {
        let mut header = HeaderModel::pcm(1, 8000, 8, 2).unwrap();
        assert_eq!(header.total_len(), 46);
        assert_eq!(header.trailing_len(), 0);

        header.file_size += 12;
        assert_eq!(header.trailing_len(), 12);

        header.file_size = 10;
        assert_eq!(header.trailing_len(), 0);
    }

    #[test]
    fn frames_and_duration() {
        let header = HeaderModel::pcm(2, 8000, 16, 32_002).unwrap();
        assert_eq!(header.frame_count(), 8000);
        assert!(!header.is_frame_aligned());
        assert_eq!(header.duration_secs(), 1.0);
    }

    #[test]
    fn field_checks() {
        assert!(check_fmt_chunk_size(16).is_ok());
        assert_eq!(
            check_fmt_chunk_size(18).unwrap_err().kind(),
            ErrorKind::UnsupportedFormat
        );
        assert!(check_format_code(3).is_err());
        assert!(check_channel_count(0).is_err());
        assert!(check_channel_count(3).is_err());
        assert!(check_bits_per_sample(24).is_err());
        assert!(HeaderModel::pcm(1, u32::MAX, 16, 0).is_err());
    }
}
