use std::fmt;
use std::io;

/// Returns `$err` when `$level` is at or above the configured fail level, logs it otherwise.
#[macro_export]
macro_rules! log_or_err {
    ($fail_level:expr, $level:expr, $err:expr $(,)?) => {{
        if $level <= $fail_level {
            return Err($err);
        } else {
            match $level {
                ::log::Level::Error => ::log::error!("{}", $err),
                ::log::Level::Warn => ::log::warn!("{}", $err),
                ::log::Level::Info => ::log::info!("{}", $err),
                ::log::Level::Debug => ::log::debug!("{}", $err),
                ::log::Level::Trace => ::log::trace!("{}", $err),
            }
        }
    }};
}

/// Broad classification of a [`WavError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    TagMismatch,
    UnsupportedFormat,
    InconsistentHeader,
    Truncated,
    SizeMismatch,
    InvalidArgument,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::TagMismatch => "tag mismatch",
            ErrorKind::UnsupportedFormat => "unsupported format",
            ErrorKind::InconsistentHeader => "inconsistent header",
            ErrorKind::Truncated => "truncated",
            ErrorKind::SizeMismatch => "size mismatch",
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::Io => "i/o",
        };
        f.write_str(name)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum WavError {
    #[error("\"{}\" not found (read {found:02X?})", String::from_utf8_lossy(.expected))]
    TagMismatch { expected: [u8; 4], found: [u8; 4] },

    #[error("size of format chunk should be 16, read {0}")]
    FmtChunkSize(u32),

    #[error("WAVE type format should be 1 (PCM), read {0}")]
    FormatCode(u16),

    #[error("mono/stereo should be 1 or 2, read {0}")]
    ChannelCount(u16),

    #[error("bits/sample should be 8 or 16, read {0}")]
    BitsPerSample(u16),

    #[error("'channel' can only be applied to stereo input, read mono/stereo = {0}")]
    NotStereo(u16),

    #[error(
        "block alignment should be bits per sample / 8 x mono/stereo. Read {read}, expected {expected}"
    )]
    BlockAlign { read: u16, expected: u32 },

    #[error("bytes/second should be sample rate x block alignment. Read {read}, expected {expected}")]
    ByteRate { read: u32, expected: u64 },

    #[error("size of data chunk {data_size} is not a whole number of {block_align}-byte frames")]
    UnalignedData { data_size: u32, block_align: u16 },

    #[error("insufficient data (expected {0})")]
    Truncated(&'static str),

    #[error("bad file size: data ended early ({missing} of {expected} trailing bytes missing)")]
    EndedEarly { expected: u64, missing: u64 },

    #[error("bad file size: data past the expected end of file ({declared} bytes declared)")]
    DataPastEnd { declared: u64 },

    #[error("{0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl WavError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WavError::TagMismatch { .. } => ErrorKind::TagMismatch,
            WavError::FmtChunkSize(_)
            | WavError::FormatCode(_)
            | WavError::ChannelCount(_)
            | WavError::BitsPerSample(_)
            | WavError::NotStereo(_) => ErrorKind::UnsupportedFormat,
            WavError::BlockAlign { .. }
            | WavError::ByteRate { .. }
            | WavError::UnalignedData { .. } => ErrorKind::InconsistentHeader,
            WavError::Truncated(_) | WavError::EndedEarly { .. } => ErrorKind::Truncated,
            WavError::DataPastEnd { .. } => ErrorKind::SizeMismatch,
            WavError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            WavError::Io(_) => ErrorKind::Io,
        }
    }

    /// Maps a read failure to `Truncated` when the source simply ran dry.
    pub(crate) fn from_read(err: io::Error, expected: &'static str) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            WavError::Truncated(expected)
        } else {
            WavError::Io(err)
        }
    }
}
