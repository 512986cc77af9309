use anyhow::Result;
use indicatif::MultiProgress;
use wavstream::process::transform::{ProcessReport, Processor, Transform};

use super::command::{ChannelArgs, Cli, InputArgs, OutputArgs, RateArgs, VolumeArgs};
use super::progress::{finish_progress_bar, open_input};
use crate::output::OutputWriter;

pub fn cmd_rate(args: &RateArgs, cli: &Cli, multi: Option<&MultiProgress>) -> Result<()> {
    let transform = Transform::rate(args.factor)?;
    run_transform(&transform, &args.input, &args.output, cli, multi)
}

pub fn cmd_channel(args: &ChannelArgs, cli: &Cli, multi: Option<&MultiProgress>) -> Result<()> {
    let transform = Transform::channel(args.side.into());
    run_transform(&transform, &args.input, &args.output, cli, multi)
}

pub fn cmd_volume(args: &VolumeArgs, cli: &Cli, multi: Option<&MultiProgress>) -> Result<()> {
    let transform = Transform::volume(args.factor)?;
    run_transform(&transform, &args.input, &args.output, cli, multi)
}

fn run_transform(
    transform: &Transform,
    input: &InputArgs,
    output: &OutputArgs,
    cli: &Cli,
    multi: Option<&MultiProgress>,
) -> Result<()> {
    log::info!(
        "Applying {transform}: {} -> {}",
        input.input.display(),
        output.output.display()
    );

    let (reader, pb) = open_input(&input.input, multi)?;
    let writer = OutputWriter::new(&output.output)?;

    let mut processor = Processor::default();
    processor.set_fail_level(cli.fail_level());

    let result = processor.run(transform, reader, writer);
    finish_progress_bar(pb, result.is_ok());

    log_report(&result?);
    Ok(())
}

fn log_report(report: &ProcessReport) {
    if let Some(ref out) = report.output {
        log::info!(
            "Wrote {} bytes: {} ch, {} Hz, {} bit, {} data bytes",
            report.bytes_written,
            out.channel_count,
            out.sample_rate,
            out.bits_per_sample,
            out.data_size
        );
    }
    if report.trailing_bytes > 0 {
        log::debug!("Carried {} trailing bytes", report.trailing_bytes);
    }
}
