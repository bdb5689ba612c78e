use std::io::Write;

use log::debug;

use crate::data_structs::line::LineRecord;

/// Writes line records back to text.
///
/// Lines are separated by `\n`. Whether the last one is followed by a newline
/// is decided in [`Gff3Writer::finish`], so that a document read without a
/// trailing newline is written back the same way.
pub struct Gff3Writer<W: Write> {
    sink:        W,
    written:     usize,
    regenerated: usize,
}

impl<W: Write> Gff3Writer<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            written: 0,
            regenerated: 0,
        }
    }

    pub fn write_line(
        &mut self,
        line: &LineRecord,
    ) -> anyhow::Result<()> {
        if self.written > 0 {
            self.sink.write_all(b"\n")?;
        }
        if line.is_modified() {
            self.regenerated += 1;
        }
        self.sink
            .write_all(line.render().as_bytes())?;
        self.written += 1;
        Ok(())
    }

    pub fn write_all<'a, I>(
        &mut self,
        lines: I,
    ) -> anyhow::Result<()>
    where
        I: IntoIterator<Item = &'a LineRecord>, {
        for line in lines {
            self.write_line(line)?;
        }
        Ok(())
    }

    /// Number of lines written so far.
    pub fn written(&self) -> usize { self.written }

    /// Flushes the sink and returns it.
    pub fn finish(
        mut self,
        trailing_newline: bool,
    ) -> anyhow::Result<W> {
        if trailing_newline && self.written > 0 {
            self.sink.write_all(b"\n")?;
        }
        self.sink.flush()?;
        debug!(
            "Wrote {} lines ({} regenerated)",
            self.written, self.regenerated
        );
        Ok(self.sink)
    }
}
