//! Phase-modulated test tone generation.
//!
//! Sample `i` at `t = i / sample_rate` is
//! `clamp(trunc(amp * sin(2π·fc·t − mi * sin(2π·fm·t))), −32768, 32767)`, written as 16-bit
//! mono PCM. The modulator shifts the carrier's phase, not its frequency.

use std::f64::consts::PI;
use std::io::Write;

use log::debug;

use crate::process::codec::encode_header;
use crate::structs::header::HeaderModel;
use crate::utils::cursor::ByteSink;
use crate::utils::errors::WavError;

pub const MAX_AMPLITUDE: f64 = i16::MAX as f64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneParams {
    /// Length in whole seconds.
    pub duration: u32,
    pub sample_rate: u32,
    /// Modulator frequency in Hz.
    pub fm: f64,
    /// Carrier frequency in Hz.
    pub fc: f64,
    /// Modulation index.
    pub mi: f64,
    /// Peak amplitude, `0..=32767`.
    pub amp: f64,
}

impl Default for ToneParams {
    fn default() -> Self {
        Self {
            duration: 2,
            sample_rate: 44100,
            fm: 100.0,
            fc: 1000.0,
            mi: 100.0,
            amp: MAX_AMPLITUDE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToneSynthesizer {
    params: ToneParams,
    header: HeaderModel,
}

impl ToneSynthesizer {
    pub fn new(params: ToneParams) -> Result<Self, WavError> {
        if params.sample_rate == 0 {
            return Err(WavError::InvalidArgument(
                "sample rate must be positive".to_string(),
            ));
        }
        if !(0.0..=MAX_AMPLITUDE).contains(&params.amp) {
            return Err(WavError::InvalidArgument(format!(
                "amplitude must be between 0.0 and {MAX_AMPLITUDE:.1}, got {}",
                params.amp
            )));
        }
        for (name, value) in [("fm", params.fm), ("fc", params.fc), ("mi", params.mi)] {
            if !value.is_finite() {
                return Err(WavError::InvalidArgument(format!(
                    "{name} must be a finite number, got {value}"
                )));
            }
        }

        let data_size = (params.duration as u64 * params.sample_rate as u64)
            .checked_mul(2)
            .and_then(|size| u32::try_from(size).ok())
            .filter(|size| size.checked_add(36).is_some())
            .ok_or_else(|| {
                WavError::InvalidArgument(format!(
                    "{} s at {} Hz does not fit a WAV file",
                    params.duration, params.sample_rate
                ))
            })?;

        let header = HeaderModel::pcm(1, params.sample_rate, 16, data_size)?;

        Ok(Self { params, header })
    }

    pub fn header(&self) -> &HeaderModel {
        &self.header
    }

    pub fn sample_count(&self) -> u64 {
        self.params.duration as u64 * self.params.sample_rate as u64
    }

    pub fn sample(&self, index: u64) -> i16 {
        let p = &self.params;
        let t = index as f64 / p.sample_rate as f64;
        let phase_mod = p.mi * (2.0 * PI * p.fm * t).sin();
        let carrier = 2.0 * PI * p.fc * t;
        let value = (p.amp * (carrier - phase_mod).sin()).trunc();

        value.clamp(i16::MIN as f64, i16::MAX as f64) as i16
    }

    pub fn samples(&self) -> impl Iterator<Item = i16> + '_ {
        (0..self.sample_count()).map(|i| self.sample(i))
    }

    /// Writes the header and every sample. Returns the number of bytes written.
    pub fn write_to<W: Write>(&self, sink: &mut ByteSink<W>) -> Result<u64, WavError> {
        debug!("generating {:?}", self.params);

        encode_header(&self.header, sink)?;
        for sample in self.samples() {
            sink.write_i16(sample)?;
        }
        sink.flush()?;

        Ok(sink.written())
    }
}
