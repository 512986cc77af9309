use std::io::Read;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::input::InputReader;

/// Opens `input_path`, attaching a byte progress bar when `multi` is set.
pub fn open_input(
    input_path: &Path,
    multi: Option<&MultiProgress>,
) -> Result<(Box<dyn Read>, Option<ProgressBar>)> {
    let reader = InputReader::new(input_path)?;

    let Some(multi) = multi else {
        return Ok((Box::new(reader), None));
    };

    if reader.is_pipe() {
        log::debug!("Input is a pipe, progress shows bytes read only");
    }

    let pb = create_progress_bar(multi, reader.len_hint())?;
    Ok((Box::new(pb.wrap_read(reader)), Some(pb)))
}

pub fn create_progress_bar(multi: &MultiProgress, total_bytes: Option<u64>) -> Result<ProgressBar> {
    let pb = if let Some(total) = total_bytes {
        let pb = multi.add(ProgressBar::new(total));
        pb.set_style(ProgressStyle::with_template(
            "{bar:40.cyan/blue} {bytes}/{total_bytes} ({percent}%)\n{msg} | elapsed: {elapsed_precise} | ETA: {eta_precise}",
        )?);
        pb
    } else {
        let pb = multi.add(ProgressBar::new_spinner());
        pb.set_style(ProgressStyle::with_template(
            "{spinner:.green} {bytes} ({bytes_per_sec})\n{msg} | elapsed: {elapsed_precise}",
        )?);
        pb
    };

    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("streaming");
    Ok(pb)
}

pub fn finish_progress_bar(pb: Option<ProgressBar>, ok: bool) {
    if let Some(pb) = pb {
        if ok {
            pb.finish_with_message("done");
        } else {
            pb.abandon_with_message("failed");
        }
    }
}
