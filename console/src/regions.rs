use std::path::PathBuf;

use clap::Args;
use console::style;

use crate::utils::{
    load_document,
    UtilsArgs,
};

#[derive(Args, Debug, Clone)]
pub(crate) struct AddRegionsArgs {
    #[arg(short = 'g', long = "gff", required = true, help = "Path to the GFF3 file")]
    gff:    PathBuf,
    #[arg(
        short = 'f',
        long = "fasta",
        help = "FASTA with the reference sequences. Embedded sequences are used otherwise"
    )]
    fasta:  Option<PathBuf>,
    #[arg(short = 'o', long = "output", required = true, help = "Path of the output GFF3")]
    output: PathBuf,
}

impl AddRegionsArgs {
    pub fn run(
        &self,
        _utils: &UtilsArgs,
    ) -> anyhow::Result<()> {
        let mut document = load_document(&self.gff, self.fasta.as_ref())?;
        let inserted = document.insert_missing_sequence_regions();
        document.write_path(&self.output)?;
        eprintln!(
            "Inserted {} ##sequence-region directives. Written to {}",
            style(inserted).green(),
            style(self.output.display()).green()
        );
        Ok(())
    }
}
