//! Size reconciliation after the sample region.
//!
//! Whatever follows the samples (`LIST`, `fact` and friends) is opaque here. It must fill the
//! declared file size exactly: running dry first means the stream was cut short, and any
//! byte beyond it is garbage.

use std::io::{Read, Write};

use log::debug;

use crate::structs::header::HeaderModel;
use crate::utils::cursor::{ByteSink, ByteSource};
use crate::utils::errors::WavError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailingMode {
    /// Re-emit the trailing bytes verbatim.
    Copy,
    /// Consume them for validation only.
    Skip,
}

/// Consumes the rest of the stream against the sizes declared in `header`, which must be the
/// header as read from the source. Returns the number of trailing bytes handled.
pub fn reconcile_trailing<R: Read, W: Write>(
    header: &HeaderModel,
    source: &mut ByteSource<R>,
    sink: &mut ByteSink<W>,
    mode: TrailingMode,
) -> Result<u64, WavError> {
    let declared = header.total_len();
    let consumed = source.consumed();

    if consumed > declared {
        return Err(WavError::DataPastEnd { declared });
    }

    let expected = declared - consumed;
    let found = match mode {
        TrailingMode::Copy => source.drain_up_to(expected, |chunk| sink.write_bytes(chunk))?,
        TrailingMode::Skip => source.drain_up_to(expected, |_| Ok(()))?,
    };

    if found < expected {
        return Err(WavError::EndedEarly {
            expected,
            missing: expected - found,
        });
    }

    source.expect_end(declared)?;

    if found > 0 {
        debug!("{found} bytes of trailing data after the sample region");
    }

    Ok(found)
}
