use std::path::PathBuf;

use clap::Args;
use console::style;
use gffkit::prelude::*;
use log::{
    debug,
    warn,
};

use crate::utils::{
    load_document,
    UtilsArgs,
};

const PSEUDOGENE: &str = "pseudogene";
const GENE: &str = "gene";

fn pseudogenic_type(feature_type: &str) -> Option<&'static str> {
    match feature_type {
        "exon" => Some("pseudogenic_exon"),
        "transcript" => Some("pseudogenic_transcript"),
        _ => None,
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FixStats {
    pub retyped: usize,
    pub merged:  usize,
}

/// Retypes the `exon` and `transcript` descendants of every pseudogene.
/// A pseudogene overlapped by a gene hands its children over to the first
/// such gene and is removed.
pub(crate) fn fix_pseudogenes(document: &mut Gff3) -> anyhow::Result<FixStats> {
    let mut stats = FixStats::default();
    let pseudogenes: Vec<FeatureId> = document.features_of_type(PSEUDOGENE).collect();
    let genes: Vec<FeatureId> = document
        .features_of_type(GENE)
        .filter(|g| {
            document
                .feature(*g)
                .is_some_and(|f| !f.is_anonymous())
        })
        .collect();

    for pseudogene in pseudogenes {
        for descendant in document.descendants(pseudogene) {
            let retyped = document
                .feature(descendant)
                .and_then(|f| pseudogenic_type(f.feature_type()));
            if let Some(feature_type) = retyped {
                document.set_feature_type(descendant, feature_type)?;
                stats.retyped += 1;
            }
        }

        let Some(gene) = genes
            .iter()
            .copied()
            .find(|g| document.overlap(pseudogene, *g))
        else {
            continue;
        };
        for child in document.children(pseudogene).to_vec() {
            if child == gene {
                warn!("Gene overlapping a pseudogene is also its child, skipping");
                continue;
            }
            document.adopt(child, gene)?;
        }
        let removed = document.remove(pseudogene)?;
        debug!("Merged pseudogene ({} lines) into a gene", removed.len());
        stats.merged += 1;
    }
    Ok(stats)
}

#[derive(Args, Debug, Clone)]
pub(crate) struct FixPseudogeneArgs {
    #[arg(short = 'g', long = "gff", required = true, help = "Path to the GFF3 file")]
    gff:    PathBuf,
    #[arg(short = 'o', long = "output", required = true, help = "Path of the fixed GFF3")]
    output: PathBuf,
}

impl FixPseudogeneArgs {
    pub fn run(
        &self,
        _utils: &UtilsArgs,
    ) -> anyhow::Result<()> {
        let mut document = load_document(&self.gff, None)?;
        let stats = fix_pseudogenes(&mut document)?;
        document.write_path(&self.output)?;
        eprintln!(
            "Retyped {} features, merged {} pseudogenes. Written to {}",
            style(stats.retyped).green(),
            style(stats.merged).green(),
            style(self.output.display()).green()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANNOTATION: &str = "##gff-version 3
ctg1\t.\tgene\t1\t1000\t.\t+\t.\tID=gene1
ctg1\t.\tpseudogene\t200\t400\t.\t+\t.\tID=pg1
ctg1\t.\ttranscript\t200\t400\t.\t+\t.\tID=t1;Parent=pg1
ctg1\t.\texon\t200\t300\t.\t+\t.\tID=e1;Parent=t1
ctg1\t.\tpseudogene\t2000\t2400\t.\t-\t.\tID=pg2
ctg1\t.\texon\t2000\t2400\t.\t-\t.\tID=e2;Parent=pg2
";

    #[test]
    fn test_overlapped_pseudogene_is_merged() {
        let mut document = Gff3::parse(ANNOTATION);
        let stats = fix_pseudogenes(&mut document).unwrap();
        assert_eq!(stats, FixStats {
            retyped: 3,
            merged:  1,
        });

        assert!(document.feature_by_id("pg1").is_none());
        let gene = document.feature_by_id("gene1").unwrap();
        let transcript = document.feature_by_id("t1").unwrap();
        assert_eq!(document.parents(transcript), &[gene]);

        let text = document.serialize();
        assert!(text.contains("ctg1\t.\tpseudogenic_transcript\t200\t400\t.\t+\t.\tID=t1;Parent=gene1\n"));
        assert!(text.contains("ctg1\t.\tpseudogenic_exon\t200\t300\t.\t+\t.\tID=e1;Parent=t1\n"));
        assert!(text.contains("ID=pg2\n"));
        assert!(text.contains("ctg1\t.\tpseudogenic_exon\t2000\t2400\t.\t-\t.\tID=e2;Parent=pg2\n"));

        let mut reparsed = Gff3::parse(&text);
        let summary = reparsed.validate(&ValidationConfig::default());
        assert_eq!(summary.errors, 0);
    }

    #[test]
    fn test_document_without_pseudogenes_is_untouched() {
        let text = "##gff-version 3\nctg1\t.\tgene\t1\t10\t.\t+\t.\tID=g\n";
        let mut document = Gff3::parse(text);
        assert_eq!(fix_pseudogenes(&mut document).unwrap(), FixStats::default());
        assert_eq!(document.serialize(), text);
    }
}
