//! # gffkit
//!
//! `gffkit` parses, validates, edits and rewrites GFF3 genome annotation
//! files. Parsing is permissive: it never stops on malformed input, and every
//! defect is attached to the line it concerns with a typed [`ErrorCode`].
//! Untouched lines are written back byte-for-byte, so a document that is only
//! validated round-trips exactly.
//!
//! If you want a command line tool instead, check out the `gffkit-ci` crate
//! in this workspace.
//!
//! ## Key Features
//!
//! * **Error-collecting parser**: syntax errors per column (coordinates,
//!   score, strand, phase, attribute encoding) and per directive
//!   (`##gff-version`, `##sequence-region`, `##FASTA`).
//! * **Feature graph**: lines sharing an `ID` are grouped into one
//!   [`Feature`], `Parent` references are resolved after the whole file was
//!   read, and unresolved parents or cycles are reported instead of aborting.
//! * **Validation**: reference checks (N content, sequence length,
//!   sequence-region agreement), parent/child containment and coding phase.
//! * **Editing**: re-parent ([`Gff3::adopt`]) and [`Gff3::remove`] features,
//!   rewrite types and phases, insert missing sequence-region directives.
//!
//! ## Structure
//!
//! * [`data_structs`]: lines, attributes, coordinates, the reference index and
//!   the [`Gff3`] document with its feature graph.
//! * [`io`]: the line parser, the writer and FASTA loading.
//! * [`tools`]: the validation passes and their [`ValidationConfig`].
//!
//! ## Usage
//!
//! ```no_run
//! use gffkit::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut gff = Gff3::from_path("annotations.gff3")?;
//!     gff.load_fasta_external("genome.fa")?;
//!
//!     let summary = gff.validate(&ValidationConfig::default().with_allowed_n(10));
//!     for (line, error) in gff.errors() {
//!         println!("{:?}: {}", line.line_index(), error);
//!     }
//!     println!("{} errors, {} warnings", summary.errors, summary.warnings);
//!
//!     if let (Some(mrna), Some(gene)) = (gff.feature_by_id("mRNA1"), gff.feature_by_id("gene2")) {
//!         gff.adopt(mrna, gene)?;
//!     }
//!     gff.write_path("fixed.gff3")?;
//!     Ok(())
//! }
//! ```

pub mod data_structs;
pub mod exports;
pub mod io;
pub mod prelude;
pub mod tools;
pub mod utils;

#[allow(unused_imports)]
use prelude::*;
