//! Header decoding and encoding.
//!
//! Decoding walks the canonical header field by field. Every state consumes exactly the
//! bytes of its field and either advances or aborts the whole decode; there is no
//! backtracking and no partial header is ever returned.

use std::io::{Read, Write};

use log::{debug, trace};

use crate::structs::header::{
    DATA_TAG, FMT_TAG, HeaderModel, RIFF_TAG, WAVE_TAG, check_bits_per_sample,
    check_channel_count, check_fmt_chunk_size, check_format_code,
};
use crate::utils::cursor::{ByteSink, ByteSource};
use crate::utils::errors::WavError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeState {
    RiffTag,
    FileSize,
    WaveTag,
    FmtTag,
    FmtChunkSize,
    FormatCode,
    ChannelCount,
    SampleRate,
    ByteRate,
    BlockAlign,
    BitsPerSample,
    CheckDerived,
    DataTag,
    DataSize,
    Done,
}

impl DecodeState {
    pub fn next(self) -> Self {
        use DecodeState::*;

        match self {
            RiffTag => FileSize,
            FileSize => WaveTag,
            WaveTag => FmtTag,
            FmtTag => FmtChunkSize,
            FmtChunkSize => FormatCode,
            FormatCode => ChannelCount,
            ChannelCount => SampleRate,
            SampleRate => ByteRate,
            ByteRate => BlockAlign,
            BlockAlign => BitsPerSample,
            BitsPerSample => CheckDerived,
            CheckDerived => DataTag,
            DataTag => DataSize,
            DataSize | Done => Done,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HeaderDecoder {
    state: DecodeState,
    header: HeaderModel,
}

impl Default for HeaderDecoder {
    fn default() -> Self {
        Self {
            state: DecodeState::RiffTag,
            header: HeaderModel {
                riff_tag: [0; 4],
                file_size: 0,
                wave_tag: [0; 4],
                fmt_tag: [0; 4],
                fmt_chunk_size: 0,
                format_code: 0,
                channel_count: 0,
                sample_rate: 0,
                byte_rate: 0,
                block_align: 0,
                bits_per_sample: 0,
                data_tag: [0; 4],
                data_size: 0,
            },
        }
    }
}

impl HeaderDecoder {
    pub fn state(&self) -> DecodeState {
        self.state
    }

    /// Fields decoded so far; the rest are still zero.
    pub fn header(&self) -> &HeaderModel {
        &self.header
    }

    /// Runs the current state and moves to the next one.
    pub fn step<R: Read>(&mut self, source: &mut ByteSource<R>) -> Result<DecodeState, WavError> {
        let h = &mut self.header;

        match self.state {
            DecodeState::RiffTag => {
                source.read_tag(&RIFF_TAG)?;
                h.riff_tag = RIFF_TAG;
            }
            DecodeState::FileSize => {
                h.file_size = source.read_u32("size of file")?;
                debug!("size of file: {}", h.file_size);
            }
            DecodeState::WaveTag => {
                source.read_tag(&WAVE_TAG)?;
                h.wave_tag = WAVE_TAG;
            }
            DecodeState::FmtTag => {
                source.read_tag(&FMT_TAG)?;
                h.fmt_tag = FMT_TAG;
            }
            DecodeState::FmtChunkSize => {
                h.fmt_chunk_size = source.read_u32("size of format chunk")?;
                debug!("size of format chunk: {}", h.fmt_chunk_size);
                check_fmt_chunk_size(h.fmt_chunk_size)?;
            }
            DecodeState::FormatCode => {
                h.format_code = source.read_u16("WAVE type format")?;
                debug!("WAVE type format: {}", h.format_code);
                check_format_code(h.format_code)?;
            }
            DecodeState::ChannelCount => {
                h.channel_count = source.read_u16("mono/stereo")?;
                debug!("mono/stereo: {}", h.channel_count);
                check_channel_count(h.channel_count)?;
            }
            DecodeState::SampleRate => {
                h.sample_rate = source.read_u32("sample rate")?;
                debug!("sample rate: {}", h.sample_rate);
            }
            DecodeState::ByteRate => {
                h.byte_rate = source.read_u32("bytes/sec")?;
                debug!("bytes/sec: {}", h.byte_rate);
            }
            DecodeState::BlockAlign => {
                h.block_align = source.read_u16("block alignment")?;
                debug!("block alignment: {}", h.block_align);
            }
            DecodeState::BitsPerSample => {
                h.bits_per_sample = source.read_u16("bits/sample")?;
                debug!("bits/sample: {}", h.bits_per_sample);
                check_bits_per_sample(h.bits_per_sample)?;
            }
            DecodeState::CheckDerived => h.check_derived_fields()?,
            DecodeState::DataTag => {
                source.read_tag(&DATA_TAG)?;
                h.data_tag = DATA_TAG;
            }
            DecodeState::DataSize => {
                h.data_size = source.read_u32("size of data chunk")?;
                debug!("size of data chunk: {}", h.data_size);
            }
            DecodeState::Done => {}
        }

        trace!("{:?} done at byte {}", self.state, source.consumed());
        self.state = self.state.next();
        Ok(self.state)
    }

    pub fn decode<R: Read>(mut self, source: &mut ByteSource<R>) -> Result<HeaderModel, WavError> {
        while self.state != DecodeState::Done {
            self.step(source)?;
        }
        Ok(self.header)
    }
}

/// Decodes and validates the header at the start of `source`.
pub fn decode_header<R: Read>(source: &mut ByteSource<R>) -> Result<HeaderModel, WavError> {
    HeaderDecoder::default().decode(source)
}

/// Writes `header` as is. The caller is responsible for its consistency.
pub fn encode_header<W: Write>(header: &HeaderModel, sink: &mut ByteSink<W>) -> Result<(), WavError> {
    sink.put(header)
}
