use anyhow::{Result, bail};
use wavstream::process::tone::{ToneParams, ToneSynthesizer};
use wavstream::utils::cursor::ByteSink;

use super::command::GenerateArgs;
use crate::output::OutputWriter;

pub fn cmd_generate(args: &GenerateArgs) -> Result<()> {
    let params = tone_params(args)?;
    let synth = ToneSynthesizer::new(params)?;

    log::info!(
        "Generating {} s at {} Hz (fc {} Hz, fm {} Hz, mi {}, amp {}) -> {}",
        params.duration,
        params.sample_rate,
        params.fc,
        params.fm,
        params.mi,
        params.amp,
        args.output.output.display()
    );

    let mut sink = ByteSink::new(OutputWriter::new(&args.output.output)?);
    let written = synth.write_to(&mut sink)?;

    log::info!("Wrote {written} bytes ({} samples)", synth.sample_count());
    Ok(())
}

fn tone_params(args: &GenerateArgs) -> Result<ToneParams> {
    if args.duration <= 0 {
        bail!("duration must be positive, got {}", args.duration);
    }
    if args.sample_rate <= 0 {
        bail!("sample rate must be positive, got {}", args.sample_rate);
    }

    let Ok(duration) = u32::try_from(args.duration) else {
        bail!("duration {} is too large", args.duration);
    };
    let Ok(sample_rate) = u32::try_from(args.sample_rate) else {
        bail!("sample rate {} is too large", args.sample_rate);
    };

    Ok(ToneParams {
        duration,
        sample_rate,
        fm: args.fm,
        fc: args.fc,
        mi: args.mi,
        amp: args.amp,
    })
}
