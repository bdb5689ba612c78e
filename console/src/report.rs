use std::io::Write;

use gffkit::prelude::*;
use itertools::Itertools;

/// Writes the Markdown validation report of `document`.
///
/// Kinds are listed alphabetically; every line carrying errors is printed
/// with its 1-based number and original text.
pub(crate) fn write_report<W: Write>(
    document: &Gff3,
    summary: &ValidationSummary,
    title: Option<&str>,
    mut sink: W,
) -> anyhow::Result<W> {
    match title {
        Some(title) => writeln!(sink, "# GFF3 Validation Report: {}", title)?,
        None => writeln!(sink, "# GFF3 Validation Report")?,
    }
    writeln!(sink)?;

    writeln!(sink, "# Validation Summary")?;
    if summary.by_kind.is_empty() {
        writeln!(sink, "* Found 0 errors")?;
    }
    for (kind, (errors, lines)) in summary
        .by_kind
        .iter()
        .sorted_by_key(|(kind, _)| kind.to_string())
    {
        writeln!(sink, "* Found {} {} errors in {} lines", errors, kind, lines)?;
    }
    writeln!(sink)?;

    writeln!(sink, "# Detected Errors")?;
    for line in document.lines().filter(|l| l.has_errors()) {
        let number = line
            .line_index()
            .map(|i| (i + 1).to_string())
            .unwrap_or_else(|| "-".to_string());
        writeln!(sink, "* Line {}: {}", number, line.raw().trim())?;
        for error in line.errors() {
            writeln!(sink, "\t- {}", error)?;
        }
    }
    sink.flush()?;
    Ok(sink)
}
