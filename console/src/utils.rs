use std::path::{
    Path,
    PathBuf,
};

use clap::{
    ArgAction,
    Args,
};
use console::style;
use gffkit::exports::log::LevelFilter;
use gffkit::exports::pretty_env_logger;
use gffkit::prelude::*;

#[derive(Args, Debug, Clone)]
pub(crate) struct UtilsArgs {
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        help = "Increase log verbosity (-v info, -vv debug, -vvv trace)"
    )]
    pub verbose: u8,
}

impl UtilsArgs {
    /// Initializes logging. `RUST_LOG` overrides the level picked by `-v`.
    pub fn setup(&self) -> anyhow::Result<()> {
        let mut builder = pretty_env_logger::formatted_builder();
        builder.filter_level(self.level());
        if let Ok(filters) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filters);
        }
        builder.try_init()?;
        Ok(())
    }

    fn level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Fails with a styled message unless `path` is an existing file.
pub(crate) fn check_input(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        anyhow::bail!("Path {} does not exist.", style(path.display()).red());
    }
    if !path.is_file() {
        anyhow::bail!("Path {} is not a file.", style(path.display()).red());
    }
    Ok(())
}

/// Parses the annotation at `gff`, loading `fasta` as external sequences.
pub(crate) fn load_document(
    gff: &Path,
    fasta: Option<&PathBuf>,
) -> anyhow::Result<Gff3> {
    check_input(gff)?;
    let mut document = Gff3::from_path(gff)?;
    if let Some(fasta) = fasta {
        check_input(fasta)?;
        let loaded = document.load_fasta_external(fasta)?;
        eprintln!(
            "Loaded {} sequences from {}",
            style(loaded).green(),
            style(fasta.display()).green()
        );
    }
    Ok(document)
}
