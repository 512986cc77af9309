use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};

/// Unified input reader that handles both file and pipe input with buffered reading
pub struct InputReader {
    reader: Box<dyn Read>,
    len_hint: Option<u64>,
}

impl InputReader {
    /// Create a new InputReader from a path
    /// Use "-" for stdin pipe input
    pub fn new<P: AsRef<Path>>(input_path: P) -> Result<Self> {
        let path = input_path.as_ref();

        if is_stdio(path) {
            return Ok(Self {
                reader: Box::new(io::stdin().lock()),
                len_hint: None,
            });
        }

        let file =
            File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
        let len_hint = file.metadata().ok().map(|meta| meta.len());

        Ok(Self {
            reader: Box::new(BufReader::new(file)),
            len_hint,
        })
    }

    /// Check if this is pipe input
    pub fn is_pipe(&self) -> bool {
        self.len_hint.is_none()
    }

    /// Size of the underlying file, unknown for pipes.
    pub fn len_hint(&self) -> Option<u64> {
        self.len_hint
    }
}

impl Read for InputReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

pub(crate) fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn file_input_reports_length() {
        let path = std::env::temp_dir().join(format!("soundwave-input-{}.bin", std::process::id()));
        File::create(&path).unwrap().write_all(b"RIFF1234").unwrap();

        let mut reader = InputReader::new(&path).unwrap();
        assert!(!reader.is_pipe());
        assert_eq!(reader.len_hint(), Some(8));

        let mut data = Vec::new();
        reader.read_to_end(&mut data).unwrap();
        assert_eq!(data, b"RIFF1234");

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = InputReader::new("/nonexistent/soundwave.wav").err().unwrap();
        assert!(err.to_string().contains("/nonexistent/soundwave.wav"));
    }

    #[test]
    fn dash_is_stdin() {
        assert!(is_stdio(Path::new("-")));
        assert!(!is_stdio(Path::new("./-")));
    }
}
