//! Single-pass streaming engine for canonical PCM WAV streams.
//!
//! Every byte of the input is read at most once, in order, with no seeking. Derived header
//! fields are recomputed from primitives already consumed, so a stream can be validated and
//! rewritten without holding the payload in memory.
//!
//! ## Stream layout
//!
//! | Offset | Field | Width |
//! |---|---|---|
//! | 0 | `"RIFF"` | 4 |
//! | 4 | file size (total − 8) | 4 |
//! | 8 | `"WAVE"` | 4 |
//! | 12 | `"fmt "` | 4 |
//! | 16 | fmt chunk size (16) | 4 |
//! | 20 | format code (1 = PCM) | 2 |
//! | 22 | channel count (1 or 2) | 2 |
//! | 24 | sample rate | 4 |
//! | 28 | byte rate | 4 |
//! | 32 | block align | 2 |
//! | 34 | bits per sample (8 or 16) | 2 |
//! | 36 | `"data"` | 4 |
//! | 40 | data size | 4 |
//! | 44 | samples, then opaque trailing data up to the declared size | |
//!
//! ## Quick Start
//!
//! ```rust
//! use wavstream::process::transform::{Processor, Transform};
//!
//! # let input: Vec<u8> = {
//! #     let mut sink = wavstream::utils::cursor::ByteSink::new(Vec::new());
//! #     let header = wavstream::structs::header::HeaderModel::pcm(1, 8000, 8, 2)?;
//! #     wavstream::process::codec::encode_header(&header, &mut sink)?;
//! #     sink.write_bytes(&[0x80, 0x81])?;
//! #     sink.into_inner()
//! # };
//! let mut output = Vec::new();
//! let report = Processor::default().run(&Transform::volume(0.5)?, &input[..], &mut output)?;
//!
//! assert_eq!(report.input.data_size, 2);
//! assert_eq!(&output[44..], &[0x80, 0x80]);
//! # Ok::<(), wavstream::utils::errors::WavError>(())
//! ```

pub mod byteorder;

/// Header decoding, sample transforms, trailing data and tone synthesis.
///
/// 1. **Header** ([`process::codec`]): decode and validate, or encode.
/// 2. **Samples** ([`process::transform`]): info, rate, channel and volume.
/// 3. **Trailing data** ([`process::trailing`]): reconcile against the declared size.
/// 4. **Synthesis** ([`process::tone`]): header plus generated samples, no input.
pub mod process;

/// Data structures representing the container.
pub mod structs;

/// Counted byte access and error types.
pub mod utils;
