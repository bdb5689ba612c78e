//! Reading and writing annotation text and reference sequences.
//!
//! - [`gff`]: the stateful [`LineParser`](gff::LineParser) and the
//!   [`Gff3Writer`](gff::Gff3Writer) serializer.
//! - [`fasta`]: external FASTA loading.

pub mod fasta;
pub mod gff;
