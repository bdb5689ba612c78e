//! Core data structures of the crate.
//!
//! - [`coords`]: the 1-based inclusive [`Span`] and span merging.
//! - [`attributes`]: the ordered column 9 map [`GffAttributes`] and the
//!   percent-encoding rules of the format.
//! - [`line`]: [`LineRecord`], the unit everything else hangs off, together
//!   with the typed diagnostics ([`LineError`], [`ErrorCode`]) attached to it.
//! - [`reference`]: the [`ReferenceIndex`] of sequence-region declarations,
//!   embedded and external residues.
//! - [`annotation`]: the [`Gff3`] document, its feature graph and the mutation
//!   API.
//! - Common enumerations, [`Strand`] and [`LineKind`].

pub mod annotation;
pub mod attributes;
pub mod coords;
mod enums;
pub mod line;
pub mod reference;

pub use annotation::{
    Feature,
    FeatureGraph,
    FeatureId,
    Gff3,
    LineId,
};
pub use attributes::GffAttributes;
pub use coords::Span;
pub use enums::{
    LineKind,
    Strand,
};
pub use line::{
    Directive,
    ErrorCode,
    ErrorKind,
    FeatureLine,
    LineContent,
    LineError,
    LineRecord,
    SequenceRegion,
    Severity,
};
pub use reference::{
    ReferenceIndex,
    Subsequence,
};
