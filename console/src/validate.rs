use std::fs::File;
use std::io::{
    stdout,
    BufWriter,
};
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use console::style;
use gffkit::prelude::*;
use log::info;

use crate::report::write_report;
use crate::utils::{
    load_document,
    UtilsArgs,
};

#[derive(Args, Debug, Clone)]
pub(crate) struct ValidateArgs {
    #[arg(short = 'g', long = "gff", required = true, help = "Path to the GFF3 file")]
    gff:           PathBuf,
    #[arg(
        short = 'f',
        long = "fasta",
        help = "FASTA with the reference sequences. Replaces sequences embedded in the GFF3"
    )]
    fasta:         Option<PathBuf>,
    #[arg(
        short = 'n',
        long = "allowed-n",
        help = "Number of N residues tolerated in a checked feature [default: 0]"
    )]
    allowed_n:     Option<usize>,
    #[arg(
        short = 't',
        long = "types",
        num_args = 1..,
        help = "Feature types checked for N residues [default: CDS]"
    )]
    types:         Option<Vec<String>>,
    #[arg(short = 'r', long = "report", help = "Write the report here instead of stdout")]
    report:        Option<PathBuf>,
    #[arg(long = "config", help = "JSON file with validation parameters")]
    config:        Option<PathBuf>,
    #[arg(long = "correct-phase", default_value_t = false, help = "Rewrite mismatched phases")]
    correct_phase: bool,
}

impl ValidateArgs {
    /// Command line values override the config file, which overrides the
    /// defaults.
    fn config(&self) -> anyhow::Result<ValidationConfig> {
        let mut config = match &self.config {
            Some(path) => ValidationConfig::from_path(path)?,
            None => ValidationConfig::default(),
        };
        if let Some(allowed_n) = self.allowed_n {
            config = config.with_allowed_n(allowed_n);
        }
        if let Some(types) = &self.types {
            config = config.with_n_feature_types(types.clone());
        }
        if self.correct_phase {
            config = config.with_correct_phase(true);
        }
        Ok(config)
    }

    pub fn run(
        &self,
        _utils: &UtilsArgs,
    ) -> anyhow::Result<()> {
        let config = self.config()?;
        let mut document = load_document(&self.gff, self.fasta.as_ref())?;
        let summary = document.validate(&config);

        let title = self.gff.to_string_lossy().to_string();
        match &self.report {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("Failed to create report {}", path.display()))?;
                write_report(&document, &summary, Some(title.as_str()), BufWriter::new(file))?;
                info!("Report written to {}", path.display());
            },
            None => {
                write_report(&document, &summary, Some(title.as_str()), stdout().lock())?;
            },
        }

        if summary.is_clean() {
            eprintln!("{}", style("No problems found").green());
        }
        else {
            eprintln!(
                "Found {} errors and {} warnings",
                style(summary.errors).red(),
                style(summary.warnings).yellow()
            );
        }
        if summary.phase_corrected > 0 {
            eprintln!(
                "Corrected {} phases (not written back)",
                style(summary.phase_corrected).yellow()
            );
        }
        Ok(())
    }
}
