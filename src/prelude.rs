pub use crate::data_structs::annotation::{
    Feature,
    FeatureGraph,
    FeatureId,
    Gff3,
    LineId,
};
pub use crate::data_structs::attributes::GffAttributes;
pub use crate::data_structs::coords::Span;
pub use crate::data_structs::line::{
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
pub use crate::data_structs::reference::{
    ReferenceIndex,
    Subsequence,
};
pub use crate::data_structs::{
    LineKind,
    Strand,
};
pub use crate::io::gff::{
    Gff3Writer,
    LineParser,
};
pub use crate::tools::validate::{
    ValidationConfig,
    ValidationSummary,
};
