use std::io::{self, Write};

use anyhow::Result;
use indicatif::MultiProgress;
use serde::Serialize;
use wavstream::process::codec::{DecodeState, HeaderDecoder};
use wavstream::process::transform::{Processor, Transform};
use wavstream::structs::header::HeaderModel;
use wavstream::utils::cursor::{ByteSink, ByteSource};
use wavstream::utils::errors::ErrorKind;

use super::command::{Cli, InfoArgs, InfoFormat};
use super::progress::{finish_progress_bar, open_input};
use crate::timestamp::duration_str;

#[derive(Debug, Serialize)]
pub struct InfoReport {
    pub file_size: u32,
    pub fmt_chunk_size: u32,
    pub format_code: u16,
    pub channel_count: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    pub data_size: u32,
    pub frames: u64,
    pub seconds: f64,
    pub duration: String,
    pub trailing_bytes: u64,
}

impl InfoReport {
    fn new(header: &HeaderModel, trailing_bytes: u64) -> Self {
        let frames = header.frame_count();
        Self {
            file_size: header.file_size,
            fmt_chunk_size: header.fmt_chunk_size,
            format_code: header.format_code,
            channel_count: header.channel_count,
            sample_rate: header.sample_rate,
            byte_rate: header.byte_rate,
            block_align: header.block_align,
            bits_per_sample: header.bits_per_sample,
            data_size: header.data_size,
            frames,
            seconds: header.duration_secs(),
            duration: duration_str(frames, header.sample_rate),
            trailing_bytes,
        }
    }
}

pub fn cmd_info(args: &InfoArgs, cli: &Cli, multi: Option<&MultiProgress>) -> Result<()> {
    log::info!("Analyzing WAV stream: {}", args.input.input.display());

    let (reader, pb) = open_input(&args.input.input, multi)?;
    let mut source = ByteSource::new(reader);

    let mut processor = Processor::default();
    processor.set_fail_level(cli.fail_level());

    let result = analyze(&mut source, &processor, args.format);
    finish_progress_bar(pb, result.is_ok());
    result
}

fn analyze<R: io::Read>(
    source: &mut ByteSource<R>,
    processor: &Processor,
    format: InfoFormat,
) -> Result<()> {
    let mut stdout = io::stdout().lock();

    let decoded = decode_listing(source, &mut stdout, format == InfoFormat::Text);
    stdout.flush()?;
    let header = decoded?;

    let mut sink = ByteSink::new(io::sink());
    let report = processor.process(&Transform::Info, &header, source, &mut sink)?;
    let info = InfoReport::new(&header, report.trailing_bytes);

    match format {
        InfoFormat::Text => write_derived_fields(&mut stdout, &info)?,
        InfoFormat::Yaml => serde_yaml_ng::to_writer(&mut stdout, &info)?,
    }
    stdout.flush()?;

    Ok(())
}

/// Decodes the header, listing each field on `out` as soon as it has been read when `list`
/// is set. A field that fails its check is still listed.
fn decode_listing<R: io::Read, W: Write>(
    source: &mut ByteSource<R>,
    out: &mut W,
    list: bool,
) -> Result<HeaderModel> {
    let mut decoder = HeaderDecoder::default();

    while decoder.state() != DecodeState::Done {
        let field = decoder.state();
        let result = decoder.step(source);

        let was_read = match &result {
            Ok(_) => true,
            Err(e) => !matches!(e.kind(), ErrorKind::Truncated | ErrorKind::Io),
        };
        if list && was_read {
            if let Some(line) = field_line(field, decoder.header()) {
                writeln!(out, "{line}")?;
            }
        }

        result?;
    }

    Ok(decoder.header().clone())
}

fn field_line(field: DecodeState, header: &HeaderModel) -> Option<String> {
    let line = match field {
        DecodeState::FileSize => format!("size of file: {}", header.file_size),
        DecodeState::FmtChunkSize => format!("size of format chunk: {}", header.fmt_chunk_size),
        DecodeState::FormatCode => format!("WAVE type format: {}", header.format_code),
        DecodeState::ChannelCount => format!("mono/stereo: {}", header.channel_count),
        DecodeState::SampleRate => format!("sample rate: {}", header.sample_rate),
        DecodeState::ByteRate => format!("bytes/sec: {}", header.byte_rate),
        DecodeState::BlockAlign => format!("block alignment: {}", header.block_align),
        DecodeState::BitsPerSample => format!("bits/sample: {}", header.bits_per_sample),
        DecodeState::DataSize => format!("size of data chunk: {}", header.data_size),
        _ => return None,
    };
    Some(line)
}

fn write_derived_fields<W: Write>(out: &mut W, info: &InfoReport) -> io::Result<()> {
    writeln!(out, "duration: {} ({} frames)", info.duration, info.frames)?;
    writeln!(out, "trailing data: {} bytes", info.trailing_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use wavstream::process::codec::encode_header;
    use wavstream::utils::errors::WavError;

    fn header() -> HeaderModel {
        let mut header = HeaderModel::pcm(2, 44100, 16, 176_400).unwrap();
        header.file_size += 10;
        header
    }

    fn header_bytes(header: &HeaderModel) -> Vec<u8> {
        let mut sink = ByteSink::new(Vec::new());
        encode_header(header, &mut sink).unwrap();
        sink.into_inner()
    }

    fn listing(bytes: &[u8]) -> (Result<HeaderModel>, Vec<String>) {
        let mut source = ByteSource::new(Cursor::new(bytes));
        let mut out = Vec::new();
        let result = decode_listing(&mut source, &mut out, true);
        let lines = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();
        (result, lines)
    }

    #[test]
    fn text_uses_field_labels() {
        let (result, lines) = listing(&header_bytes(&header()));
        assert_eq!(result.unwrap(), header());
        assert_eq!(
            lines,
            [
                "size of file: 176446",
                "size of format chunk: 16",
                "WAVE type format: 1",
                "mono/stereo: 2",
                "sample rate: 44100",
                "bytes/sec: 176400",
                "block alignment: 4",
                "bits/sample: 16",
                "size of data chunk: 176400",
            ]
        );
    }

    #[test]
    fn fields_are_listed_up_to_the_failing_one() {
        let mut bytes = header_bytes(&header());
        bytes[34..36].copy_from_slice(&24u16.to_le_bytes());

        let (result, lines) = listing(&bytes);
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WavError>(),
            Some(WavError::BitsPerSample(24))
        ));
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[7], "bits/sample: 24");
    }

    #[test]
    fn truncated_field_is_not_listed() {
        let bytes = header_bytes(&header());

        let (result, lines) = listing(&bytes[..26]);
        let err = result.unwrap_err();
        assert_eq!(
            err.downcast_ref::<WavError>().map(WavError::kind),
            Some(ErrorKind::Truncated)
        );
        assert_eq!(lines.last().map(String::as_str), Some("mono/stereo: 2"));
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn yaml_listing_stays_quiet() {
        let mut source = ByteSource::new(Cursor::new(header_bytes(&header())));
        let mut out = Vec::new();
        decode_listing(&mut source, &mut out, false).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn derived_lines_and_yaml() {
        let info = InfoReport::new(&header(), 10);
        assert_eq!(info.frames, 44100);
        assert_eq!(info.seconds, 1.0);

        let mut out = Vec::new();
        write_derived_fields(&mut out, &info).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "duration: 00:00:01.000 (44100 frames)\ntrailing data: 10 bytes\n"
        );

        let yaml = serde_yaml_ng::to_string(&info).unwrap();
        assert!(yaml.contains("channel_count: 2"));
        assert!(yaml.contains("seconds: 1.0"));
        assert!(yaml.contains("trailing_bytes: 10"));
    }
}
