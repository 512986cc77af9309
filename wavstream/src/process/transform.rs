//! Sample-region transforms and the driver shared by all of them.

use std::fmt;
use std::io::{Read, Write};

use log::{Level, debug, info};

use crate::log_or_err;
use crate::process::codec::{decode_header, encode_header};
use crate::process::trailing::{TrailingMode, reconcile_trailing};
use crate::structs::header::{HEADER_TAIL_LEN, HeaderModel};
use crate::utils::cursor::{ByteSink, ByteSource};
use crate::utils::errors::WavError;

const SAMPLE_DATA: &str = "sample data";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// What happens to the sample region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    /// Validate only; nothing is written.
    Info,
    /// Rescale the declared sample rate, samples untouched.
    Rate { factor: f64 },
    /// Keep one side of a stereo stream.
    Channel { side: Side },
    /// Scale every sample, saturating at the format's range.
    Volume { factor: f64 },
}

impl Transform {
    pub fn rate(factor: f64) -> Result<Self, WavError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(WavError::InvalidArgument(format!(
                "rate multiplier must be positive, got {factor}"
            )));
        }
        Ok(Transform::Rate { factor })
    }

    pub fn volume(factor: f64) -> Result<Self, WavError> {
        if !factor.is_finite() || factor < 0.0 {
            return Err(WavError::InvalidArgument(format!(
                "volume multiplier cannot be negative, got {factor}"
            )));
        }
        Ok(Transform::Volume { factor })
    }

    pub fn channel(side: Side) -> Self {
        Transform::Channel { side }
    }

    pub fn writes_output(&self) -> bool {
        !matches!(self, Transform::Info)
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Info => write!(f, "info"),
            Transform::Rate { factor } => write!(f, "rate x{factor}"),
            Transform::Channel { side } => write!(f, "channel {side}"),
            Transform::Volume { factor } => write!(f, "volume x{factor}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessReport {
    /// Header as read from the source.
    pub input: HeaderModel,
    /// Header as written, `None` when nothing is written.
    pub output: Option<HeaderModel>,
    /// Whole frames read from the sample region.
    pub frames: u64,
    /// Samples that saturated during volume scaling.
    pub clamped_samples: u64,
    pub trailing_bytes: u64,
    pub bytes_written: u64,
}

/// Drives one transform over a decoded stream.
#[derive(Debug, Clone)]
pub struct Processor {
    fail_level: Level,
}

impl Default for Processor {
    fn default() -> Self {
        Self {
            fail_level: Level::Error,
        }
    }
}

impl Processor {
    /// Conditions at or above `level` abort the run instead of being logged.
    pub fn set_fail_level(&mut self, level: Level) {
        self.fail_level = level;
    }

    pub fn fail_level(&self) -> Level {
        self.fail_level
    }

    /// Decodes the header from `read`, then transforms the rest of the stream into `write`.
    pub fn run<R: Read, W: Write>(
        &self,
        transform: &Transform,
        read: R,
        write: W,
    ) -> Result<ProcessReport, WavError> {
        let mut source = ByteSource::new(read);
        let mut sink = ByteSink::new(write);

        let header = decode_header(&mut source)?;
        self.process(transform, &header, &mut source, &mut sink)
    }

    /// Processes everything after an already decoded header.
    pub fn process<R: Read, W: Write>(
        &self,
        transform: &Transform,
        header: &HeaderModel,
        source: &mut ByteSource<R>,
        sink: &mut ByteSink<W>,
    ) -> Result<ProcessReport, WavError> {
        if !header.is_frame_aligned() {
            log_or_err!(
                self.fail_level,
                Level::Warn,
                WavError::UnalignedData {
                    data_size: header.data_size,
                    block_align: header.block_align,
                }
            );
        }

        let output = self.rewrite_header(transform, header)?;
        if let Some(ref out) = output {
            encode_header(out, sink)?;
        }

        let mut report = ProcessReport {
            input: header.clone(),
            output,
            frames: header.frame_count(),
            clamped_samples: 0,
            trailing_bytes: 0,
            bytes_written: 0,
        };

        match *transform {
            Transform::Info => source.skip(header.data_size as u64, SAMPLE_DATA)?,
            Transform::Rate { .. } => source.copy(header.data_size as u64, sink, SAMPLE_DATA)?,
            Transform::Channel { side } => extract_channel(header, side, source, sink)?,
            Transform::Volume { factor } => {
                report.clamped_samples = scale_volume(header, factor, source, sink)?;
            }
        }

        let mode = if transform.writes_output() {
            TrailingMode::Copy
        } else {
            TrailingMode::Skip
        };
        report.trailing_bytes = reconcile_trailing(header, source, sink, mode)?;

        sink.flush()?;
        report.bytes_written = sink.written();

        if report.clamped_samples > 0 {
            info!("{} samples clamped", report.clamped_samples);
        }
        debug!(
            "{transform}: {} frames, {} trailing bytes, {} bytes written",
            report.frames, report.trailing_bytes, report.bytes_written
        );

        Ok(report)
    }

    /// Header to emit for `transform`, derived from the validated source header.
    pub fn rewrite_header(
        &self,
        transform: &Transform,
        header: &HeaderModel,
    ) -> Result<Option<HeaderModel>, WavError> {
        match *transform {
            Transform::Info => Ok(None),
            Transform::Volume { .. } => Ok(Some(header.clone())),
            Transform::Rate { factor } => self.rescale_rate(header, factor).map(Some),
            Transform::Channel { side } => self.downmix_header(header, side).map(Some),
        }
    }

    fn rescale_rate(&self, header: &HeaderModel, factor: f64) -> Result<HeaderModel, WavError> {
        let scaled = (header.sample_rate as f64 * factor).trunc();
        if scaled > u32::MAX as f64 {
            return Err(WavError::InvalidArgument(format!(
                "rate multiplier {factor} overflows sample rate {}",
                header.sample_rate
            )));
        }

        let sample_rate = scaled as u32;
        if sample_rate == 0 {
            log_or_err!(
                self.fail_level,
                Level::Warn,
                WavError::InvalidArgument(format!(
                    "rate multiplier {factor} scales sample rate {} down to 0",
                    header.sample_rate
                ))
            );
        }

        let byte_rate = sample_rate
            .checked_mul(header.block_align as u32)
            .ok_or_else(|| {
                WavError::InvalidArgument(format!(
                    "rate multiplier {factor} overflows bytes/sec ({sample_rate} x {})",
                    header.block_align
                ))
            })?;

        debug!(
            "sample rate {} -> {sample_rate}, bytes/sec {} -> {byte_rate}",
            header.sample_rate, header.byte_rate
        );

        Ok(HeaderModel {
            sample_rate,
            byte_rate,
            ..header.clone()
        })
    }

    fn downmix_header(&self, header: &HeaderModel, side: Side) -> Result<HeaderModel, WavError> {
        if !header.is_stereo() {
            log_or_err!(
                self.fail_level,
                Level::Warn,
                WavError::NotStereo(header.channel_count)
            );
            info!("mono input passes through unchanged ({side} channel requested)");
            return Ok(header.clone());
        }

        let data_size = header.data_size / 2;
        let file_size = HEADER_TAIL_LEN as u64 + data_size as u64 + header.trailing_len();
        let file_size = u32::try_from(file_size).map_err(|_| {
            WavError::InvalidArgument(format!("mono file size {file_size} does not fit 32 bits"))
        })?;

        Ok(HeaderModel {
            file_size,
            channel_count: 1,
            byte_rate: header.byte_rate / 2,
            block_align: header.block_align / 2,
            data_size,
            ..header.clone()
        })
    }
}

/// Emits the `side` half of every stereo frame; mono input is copied through.
fn extract_channel<R: Read, W: Write>(
    header: &HeaderModel,
    side: Side,
    source: &mut ByteSource<R>,
    sink: &mut ByteSink<W>,
) -> Result<(), WavError> {
    if !header.is_stereo() {
        return source.copy(header.data_size as u64, sink, SAMPLE_DATA);
    }

    let width = header.bytes_per_sample() as usize;
    let frame_len = header.block_align as usize;
    let keep = match side {
        Side::Left => 0..width,
        Side::Right => width..2 * width,
    };

    let mut frame = [0u8; 4];
    for _ in 0..header.frame_count() {
        source.read_exact(&mut frame[..frame_len], SAMPLE_DATA)?;
        sink.write_bytes(&frame[keep.clone()])?;
    }

    // A partial frame keeps its first half so the output matches the halved data size.
    let partial = header.data_size as usize % frame_len;
    if partial > 0 {
        source.read_exact(&mut frame[..partial], SAMPLE_DATA)?;
        sink.write_bytes(&frame[..partial / 2])?;
    }

    Ok(())
}

/// Scales `value` by `factor`, truncating toward zero, then saturates to `[min, max]`.
/// The flag is set when saturation kicked in.
pub fn scale_sample(value: i32, factor: f64, min: i32, max: i32) -> (i32, bool) {
    let scaled = (value as f64 * factor).trunc();
    if scaled > max as f64 {
        (max, true)
    } else if scaled < min as f64 {
        (min, true)
    } else {
        (scaled as i32, false)
    }
}

fn scale_volume<R: Read, W: Write>(
    header: &HeaderModel,
    factor: f64,
    source: &mut ByteSource<R>,
    sink: &mut ByteSink<W>,
) -> Result<u64, WavError> {
    let mut clamped = 0;

    match header.bits_per_sample {
        8 => {
            for _ in 0..header.data_size {
                let centered = source.read_u8(SAMPLE_DATA)? as i32 - 128;
                let (value, hit) = scale_sample(centered, factor, -128, 127);
                clamped += hit as u64;
                sink.write_u8((value + 128) as u8)?;
            }
        }
        _ => {
            for _ in 0..header.data_size / 2 {
                let sample = source.read_i16(SAMPLE_DATA)? as i32;
                let (value, hit) = scale_sample(sample, factor, i16::MIN as i32, i16::MAX as i32);
                clamped += hit as u64;
                sink.write_i16(value as i16)?;
            }
            // odd trailing byte of the region is not a whole sample
            if header.data_size % 2 == 1 {
                source.copy(1, sink, SAMPLE_DATA)?;
            }
        }
    }

    Ok(clamped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::codec::tests::raw_header;
    use crate::utils::errors::ErrorKind;

    fn wav(header: &[u8], samples: &[u8], trailing: &[u8]) -> Vec<u8> {
        [header, samples, trailing].concat()
    }

    fn run(transform: Transform, input: &[u8]) -> Result<(ProcessReport, Vec<u8>), WavError> {
        let mut out = Vec::new();
        let report = Processor::default().run(&transform, input, &mut out)?;
        Ok((report, out))
    }

    fn stereo_16(frames: &[(i16, i16)], trailing: &[u8]) -> Vec<u8> {
        let samples: Vec<u8> = frames
            .iter()
            .flat_map(|&(l, r)| [l.to_le_bytes(), r.to_le_bytes()].concat())
            .collect();
        let data_size = samples.len() as u32;
        let header = raw_header(
            36 + data_size + trailing.len() as u32,
            16,
            1,
            2,
            44100,
            176_400,
            4,
            16,
            data_size,
        );
        wav(&header, &samples, trailing)
    }

    fn mono_8(samples: &[u8], trailing: &[u8]) -> Vec<u8> {
        let data_size = samples.len() as u32;
        let header = raw_header(
            36 + data_size + trailing.len() as u32,
            16,
            1,
            1,
            8000,
            8000,
            1,
            8,
            data_size,
        );
        wav(&header, samples, trailing)
    }

    #[test]
    fn volume_half_on_minimal_mono_file() {
        let input = mono_8(&[0x80, 0x81], b"");
        assert_eq!(&input[4..8], &[38, 0, 0, 0]);

        let (report, out) = run(Transform::volume(0.5).unwrap(), &input).unwrap();
        assert_eq!(&out[..44], &input[..44]);
        assert_eq!(&out[44..], &[0x80, 0x80]);
        assert_eq!(report.clamped_samples, 0);
    }

    #[test]
    fn unit_factors_are_identity() {
        let input = stereo_16(&[(1, -1), (i16::MAX, i16::MIN), (1234, -4321)], b"LIST\x00\x00\x00\x00");

        let (_, out) = run(Transform::rate(1.0).unwrap(), &input).unwrap();
        assert_eq!(out, input);

        let (_, out) = run(Transform::volume(1.0).unwrap(), &input).unwrap();
        assert_eq!(out, input);

        let input = mono_8(&[0, 1, 127, 128, 255], b"x");
        let (_, out) = run(Transform::volume(1.0).unwrap(), &input).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn rate_rewrites_sample_and_byte_rate() {
        let input = stereo_16(&[(1, 2)], b"");

        let (report, out) = run(Transform::rate(1.5).unwrap(), &input).unwrap();
        let header = report.output.unwrap();
        assert_eq!(header.sample_rate, 66150);
        assert_eq!(header.byte_rate, 66150 * 4);
        assert_eq!(&out[24..28], &66150u32.to_le_bytes());
        assert_eq!(&out[28..32], &(66150u32 * 4).to_le_bytes());
        assert_eq!(&out[44..], &input[44..]);

        let (report, _) = run(Transform::rate(0.3333).unwrap(), &input).unwrap();
        assert_eq!(report.output.unwrap().sample_rate, 14698);
    }

    #[test]
    fn rate_overflow_and_zero() {
        let input = stereo_16(&[(1, 2)], b"");
        let err = run(Transform::rate(1e6).unwrap(), &input).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let (report, _) = run(Transform::rate(1e-9).unwrap(), &input).unwrap();
        assert_eq!(report.output.unwrap().sample_rate, 0);

        let mut strict = Processor::default();
        strict.set_fail_level(Level::Warn);
        assert!(strict.run(&Transform::rate(1e-9).unwrap(), &input[..], Vec::new()).is_err());
    }

    #[test]
    fn rate_byte_rate_overflow_writes_nothing() {
        let header = raw_header(40, 16, 1, 2, 1_000_000_000, 4_000_000_000, 4, 16, 4);
        let input = wav(&header, &[1, 0, 2, 0], b"");

        let mut out = Vec::new();
        let err = Processor::default()
            .run(&Transform::rate(1.5).unwrap(), &input[..], &mut out)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("bytes/sec"));
        assert!(out.is_empty());
    }

    #[test]
    fn invalid_factors() {
        assert!(Transform::rate(0.0).is_err());
        assert!(Transform::rate(-2.0).is_err());
        assert!(Transform::rate(f64::NAN).is_err());
        assert!(Transform::volume(-0.1).is_err());
        assert!(Transform::volume(f64::INFINITY).is_err());
        assert!(Transform::volume(0.0).is_ok());
        assert_eq!(
            Transform::rate(0.0).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
    }

    #[test]
    fn channel_extracts_each_side() {
        let trailing = b"junk";
        let input = stereo_16(&[(1, -1), (2, -2), (3, -3)], trailing);

        let (report, out) = run(Transform::channel(Side::Left), &input).unwrap();
        let header = report.output.unwrap();
        assert_eq!(header.channel_count, 1);
        assert_eq!(header.block_align, 2);
        assert_eq!(header.byte_rate, 88200);
        assert_eq!(header.data_size, 6);
        assert_eq!(header.file_size, 36 + 6 + 4);
        assert_eq!(out.len() as u64, header.total_len());
        assert_eq!(&out[44..50], &[1, 0, 2, 0, 3, 0]);
        assert_eq!(&out[50..], trailing);

        let (_, out) = run(Transform::channel(Side::Right), &input).unwrap();
        assert_eq!(
            &out[44..50],
            &[0xFF, 0xFF, 0xFE, 0xFF, 0xFD, 0xFF]
        );
    }

    #[test]
    fn channel_on_8_bit_stereo() {
        let samples = [10u8, 20, 30, 40];
        let header = raw_header(40, 16, 1, 2, 8000, 16000, 2, 8, 4);
        let input = wav(&header, &samples, b"");

        let (report, out) = run(Transform::channel(Side::Right), &input).unwrap();
        assert_eq!(report.output.unwrap().data_size, 2);
        assert_eq!(&out[44..], &[20, 40]);
        assert_eq!(&out[4..8], &38u32.to_le_bytes());
    }

    #[test]
    fn channel_passes_mono_through() {
        let input = mono_8(&[1, 2, 3], b"tail");

        for side in [Side::Left, Side::Right] {
            let (_, out) = run(Transform::channel(side), &input).unwrap();
            assert_eq!(out, input);
        }

        let mut strict = Processor::default();
        strict.set_fail_level(Level::Warn);
        let err = strict
            .run(&Transform::channel(Side::Left), &input[..], Vec::new())
            .unwrap_err();
        assert!(matches!(err, WavError::NotStereo(1)));
    }

    #[test]
    fn channel_partial_frame_keeps_output_consistent() {
        let samples = [1u8, 0, 2, 0, 3, 0];
        let header = raw_header(42, 16, 1, 2, 8000, 32000, 4, 16, 6);
        let input = wav(&header, &samples, b"");

        let (report, out) = run(Transform::channel(Side::Left), &input).unwrap();
        let header = report.output.unwrap();
        assert_eq!(header.data_size, 3);
        assert_eq!(out.len() as u64, header.total_len());
        assert_eq!(&out[44..], &[1, 0, 3]);

        let mut strict = Processor::default();
        strict.set_fail_level(Level::Warn);
        let err = strict
            .run(&Transform::channel(Side::Left), &input[..], Vec::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InconsistentHeader);
    }

    #[test]
    fn volume_saturates_and_truncates() {
        let input = mono_8(&[0, 64, 128, 200, 255], b"");
        let (report, out) = run(Transform::volume(2.5).unwrap(), &input).unwrap();
        // centered -128, -64, 0, 72, 127
        assert_eq!(&out[44..], &[0, 0, 128, 255, 255]);
        assert_eq!(report.clamped_samples, 4);

        let input = stereo_16(&[(1000, -1000), (20000, -20000), (3, -3)], b"");
        let (report, out) = run(Transform::volume(1.7).unwrap(), &input).unwrap();
        let decoded: Vec<i16> = out[44..]
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect();
        assert_eq!(decoded, [1700, -1700, 32767, -32768, 5, -5]);
        assert_eq!(report.clamped_samples, 2);
    }

    #[test]
    fn volume_output_stays_in_range() {
        for factor in [0.0, 0.5, 3.0, 1000.0] {
            let (value, _) = scale_sample(-128, factor, -128, 127);
            assert!((-128..=127).contains(&value));
            let (value, _) = scale_sample(i16::MIN as i32, factor, -32768, 32767);
            assert!((-32768..=32767).contains(&value));
        }
        assert_eq!(scale_sample(-3, 0.5, -128, 127), (-1, false));
        assert_eq!(scale_sample(3, 0.5, -128, 127), (1, false));
    }

    #[test]
    fn volume_copies_odd_trailing_byte() {
        let header = raw_header(39, 16, 1, 1, 8000, 16000, 2, 16, 3);
        let input = wav(&header, &[0x10, 0x00, 0x7F], b"");

        let (_, out) = run(Transform::volume(2.0).unwrap(), &input).unwrap();
        assert_eq!(&out[44..], &[0x20, 0x00, 0x7F]);
    }

    #[test]
    fn info_writes_nothing() {
        let input = stereo_16(&[(1, 2), (3, 4)], b"xy");
        let (report, out) = run(Transform::Info, &input).unwrap();
        assert!(out.is_empty());
        assert_eq!(report.output, None);
        assert_eq!(report.frames, 2);
        assert_eq!(report.trailing_bytes, 2);
    }

    #[test]
    fn info_detects_size_problems() {
        let mut input = mono_8(&[1, 2], b"");
        input.push(0);
        let err = run(Transform::Info, &input).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SizeMismatch);

        let input = mono_8(&[1, 2, 3, 4], b"");
        let err = run(Transform::Info, &input[..46]).unwrap_err();
        assert!(matches!(err, WavError::Truncated(SAMPLE_DATA)));

        let input = mono_8(&[1, 2], b"abcd");
        let err = run(Transform::Info, &input[..48]).unwrap_err();
        assert!(matches!(err, WavError::EndedEarly { expected: 4, missing: 2 }));
    }

    #[test]
    fn output_written_before_a_failure_is_kept() {
        let input = mono_8(&[1, 2, 3, 4], b"");
        let mut out = Vec::new();
        let err = Processor::default()
            .run(&Transform::rate(2.0).unwrap(), &input[..45], &mut out)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Truncated);
        assert_eq!(out.len(), 44);
    }
}
