use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::input::is_stdio;

/// Buffered output sink; "-" writes to stdout
pub struct OutputWriter {
    writer: BufWriter<Box<dyn Write>>,
}

impl OutputWriter {
    pub fn new<P: AsRef<Path>>(output_path: P) -> Result<Self> {
        let path = output_path.as_ref();

        let inner: Box<dyn Write> = if is_stdio(path) {
            Box::new(io::stdout().lock())
        } else {
            let file =
                File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
            Box::new(file)
        };

        Ok(Self {
            writer: BufWriter::with_capacity(64 * 1024, inner),
        })
    }
}

impl Write for OutputWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
