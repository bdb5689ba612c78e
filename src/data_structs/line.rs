use std::fmt::{
    self,
    Display,
};

use itertools::Itertools;
use serde::Serialize;

use super::attributes::{
    encode_column,
    encode_seqid,
    GffAttributes,
};
use super::coords::Span;
use super::enums::{
    LineKind,
    Strand,
};

const COLUMN_COUNT: usize = 9;

/// Feature types whose lines carry a meaningful phase.
pub const CODING_TYPES: [&str; 2] = ["CDS", "SO:0000316"];

pub fn is_coding_type(feature_type: &str) -> bool {
    CODING_TYPES.contains(&feature_type)
}

/// Broad category of a line error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Syntax,
    Structural,
    Reference,
    Boundary,
    Phase,
}

impl Display for ErrorKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            ErrorKind::Syntax => "syntax",
            ErrorKind::Structural => "structural",
            ErrorKind::Reference => "reference",
            ErrorKind::Boundary => "boundary",
            ErrorKind::Phase => "phase",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// Every defect the parser, graph builder and validation passes can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorCode {
    // syntax
    ColumnCount { found: usize },
    InvalidSeqid,
    InvalidSource,
    InvalidType,
    InvalidStart,
    InvalidEnd,
    StartAfterEnd,
    InvalidScore,
    InvalidStrand,
    InvalidPhase,
    PhaseOnNonCoding,
    MissingPhase,
    MalformedAttribute,
    EmptyAttributeKey,
    DuplicateAttribute,
    InvalidEncoding,
    MultipleIds,
    InvalidAttributeValue,
    MissingVersion,
    VersionNotFirst,
    UnsupportedVersion,
    MalformedSequenceRegion,
    DuplicateSequenceRegion,
    ImplicitFasta,
    MalformedFastaHeader,
    InvalidResidues,
    // structural
    TypeConflict,
    OverlappingSegments,
    UnresolvedParent,
    ParentCycle,
    // reference
    SequenceUnavailable,
    ExcessN { count: usize },
    ExceedsSequenceLength,
    SequenceRegionMismatch,
    MissingSequenceRegion,
    // boundary
    OutOfParentBounds,
    // phase
    PhaseMismatch { expected: u8, declared: u8 },
    IndeterminatePhase,
}

impl ErrorCode {
    pub fn kind(&self) -> ErrorKind {
        use ErrorCode::*;
        match self {
            TypeConflict | OverlappingSegments | UnresolvedParent | ParentCycle => {
                ErrorKind::Structural
            },
            SequenceUnavailable
            | ExcessN { .. }
            | ExceedsSequenceLength
            | SequenceRegionMismatch
            | MissingSequenceRegion => ErrorKind::Reference,
            OutOfParentBounds => ErrorKind::Boundary,
            PhaseMismatch { .. } | IndeterminatePhase => ErrorKind::Phase,
            _ => ErrorKind::Syntax,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            ErrorCode::MissingVersion
            | ErrorCode::ImplicitFasta
            | ErrorCode::MissingSequenceRegion => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// A defect attached to a single line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LineError {
    pub code:    ErrorCode,
    pub message: String,
}

impl LineError {
    pub fn new<S: Into<String>>(
        code: ErrorCode,
        message: S,
    ) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind { self.code.kind() }

    pub fn severity(&self) -> Severity { self.code.severity() }
}

impl Display for LineError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}: {}", self.kind(), self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRegion {
    pub seqid: String,
    pub span:  Span,
}

/// A recognised `##` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `##gff-version`
    Version(String),
    /// `##sequence-region`; `None` when the declaration was malformed.
    SequenceRegion(Option<SequenceRegion>),
    /// `##FASTA`
    Fasta,
    /// `###`
    ForwardReferencesResolved,
    Other { name: String, value: String },
}

impl Directive {
    /// Text form of the directive, or `None` if it cannot be regenerated.
    pub fn render(&self) -> Option<String> {
        match self {
            Directive::Version(version) => Some(format!("##gff-version {}", version)),
            Directive::SequenceRegion(Some(region)) => {
                Some(format!(
                    "##sequence-region {} {} {}",
                    encode_seqid(&region.seqid),
                    region.span.start(),
                    region.span.end()
                ))
            },
            Directive::SequenceRegion(None) => None,
            Directive::Fasta => Some("##FASTA".to_string()),
            Directive::ForwardReferencesResolved => Some("###".to_string()),
            Directive::Other { name, value } if value.is_empty() => {
                Some(format!("##{}", name))
            },
            Directive::Other { name, value } => Some(format!("##{} {}", name, value)),
        }
    }
}

/// The nine columns of a feature line after parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureLine {
    pub seqid:        String,
    pub source:       String,
    pub feature_type: String,
    /// `None` when start or end did not parse, or start > end.
    pub span:         Option<Span>,
    pub score:        Option<f64>,
    pub strand:       Strand,
    pub phase:        Option<u8>,
    pub attributes:   GffAttributes,
}

impl FeatureLine {
    pub fn is_coding(&self) -> bool { is_coding_type(&self.feature_type) }

    pub fn start(&self) -> Option<u64> { self.span.map(|s| s.start()) }

    pub fn end(&self) -> Option<u64> { self.span.map(|s| s.end()) }

    pub fn length(&self) -> Option<u64> { self.span.map(|s| s.length()) }

    pub fn id(&self) -> Option<&str> { self.attributes.id() }

    /// Inclusive overlap on the same reference sequence.
    pub fn overlaps(
        &self,
        other: &FeatureLine,
    ) -> bool {
        match (self.span, other.span) {
            (Some(a), Some(b)) => self.seqid == other.seqid && a.intersects(&b),
            _ => false,
        }
    }
}

impl FeatureLine {
    /// Writes the nine columns. A `Some` entry of `kept` is emitted verbatim
    /// in place of the regenerated column.
    fn write_columns<W: fmt::Write>(
        &self,
        out: &mut W,
        kept: &[Option<&str>; COLUMN_COUNT],
    ) -> fmt::Result {
        let (start, end) = match self.span {
            Some(span) => (span.start().to_string(), span.end().to_string()),
            None => (".".to_string(), ".".to_string()),
        };
        let score = self
            .score
            .map(|s| s.to_string())
            .unwrap_or_else(|| ".".to_string());
        let phase = self
            .phase
            .map(|p| p.to_string())
            .unwrap_or_else(|| ".".to_string());
        let generated = [
            encode_seqid(&self.seqid),
            encode_column(&self.source),
            encode_column(&self.feature_type),
            start,
            end,
            score,
            self.strand.to_string(),
            phase,
            self.attributes.to_string(),
        ];
        let line = generated
            .into_iter()
            .zip(kept.iter().copied())
            .map(|(column, raw)| raw.map_or(column, str::to_string))
            .join("\t");
        out.write_str(&line)
    }
}

impl Display for FeatureLine {
    /// Regenerates the tab-separated line. Coordinates that did not parse are
    /// written as `.`.
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        self.write_columns(f, &[None; COLUMN_COUNT])
    }
}

/// Structured payload of a line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineContent {
    Blank,
    Comment,
    Directive(Directive),
    /// `None` when the line did not split into nine columns.
    Feature(Option<FeatureLine>),
    /// Sequence name taken from the header.
    FastaHeader(String),
    /// Residues of the line, surrounding whitespace removed.
    FastaSequence(String),
}

impl LineContent {
    pub fn kind(&self) -> LineKind {
        match self {
            LineContent::Blank => LineKind::Blank,
            LineContent::Comment => LineKind::Comment,
            LineContent::Directive(_) => LineKind::Directive,
            LineContent::Feature(_) => LineKind::Feature,
            LineContent::FastaHeader(_) => LineKind::FastaHeader,
            LineContent::FastaSequence(_) => LineKind::FastaSequence,
        }
    }
}

/// One input line: its raw text, what it parsed into, and its defects.
#[derive(Debug, Clone, PartialEq)]
pub struct LineRecord {
    line_index: Option<usize>,
    raw:        String,
    content:    LineContent,
    errors:     Vec<LineError>,
    modified:   bool,
}

impl LineRecord {
    pub fn new(
        line_index: usize,
        raw: String,
        content: LineContent,
    ) -> Self {
        Self {
            line_index: Some(line_index),
            raw,
            content,
            errors: Vec::new(),
            modified: false,
        }
    }

    /// A line created after parsing; it has no raw text to fall back on.
    pub fn synthetic(content: LineContent) -> Self {
        Self {
            line_index: None,
            raw: String::new(),
            content,
            errors: Vec::new(),
            modified: true,
        }
    }

    /// Zero-based position in the parsed input; `None` for lines inserted
    /// afterwards.
    pub fn line_index(&self) -> Option<usize> { self.line_index }

    pub fn raw(&self) -> &str { &self.raw }

    pub fn content(&self) -> &LineContent { &self.content }

    pub fn kind(&self) -> LineKind { self.content.kind() }

    pub fn feature(&self) -> Option<&FeatureLine> {
        match &self.content {
            LineContent::Feature(Some(feature)) => Some(feature),
            _ => None,
        }
    }

    /// Mutable access to the feature columns. Marks the line as modified, so
    /// the serializer regenerates it.
    pub fn feature_mut(&mut self) -> Option<&mut FeatureLine> {
        match &mut self.content {
            LineContent::Feature(Some(feature)) => {
                self.modified = true;
                Some(feature)
            },
            _ => None,
        }
    }

    pub fn directive(&self) -> Option<&Directive> {
        match &self.content {
            LineContent::Directive(directive) => Some(directive),
            _ => None,
        }
    }

    pub fn is_modified(&self) -> bool { self.modified }

    pub fn errors(&self) -> &[LineError] { &self.errors }

    pub fn has_errors(&self) -> bool { !self.errors.is_empty() }

    /// Appends an error. An identical error already on the line is not
    /// repeated, so checks can be re-run safely.
    pub fn push_error<S: Into<String>>(
        &mut self,
        code: ErrorCode,
        message: S,
    ) {
        let error = LineError::new(code, message);
        if !self.errors.contains(&error) {
            self.errors.push(error);
        }
    }

    pub fn retain_errors<F>(
        &mut self,
        f: F,
    ) where
        F: FnMut(&LineError) -> bool, {
        self.errors.retain(f)
    }

    /// Inclusive interval overlap; `false` unless both lines are feature lines
    /// with valid coordinates on the same reference sequence.
    pub fn overlaps(
        &self,
        other: &LineRecord,
    ) -> bool {
        match (self.feature(), other.feature()) {
            (Some(a), Some(b)) => a.overlaps(b),
            _ => false,
        }
    }

    fn has_error(
        &self,
        code: ErrorCode,
    ) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }

    /// Raw tokens of the columns whose value did not parse, so that
    /// regenerating the line does not replace them with defaults.
    fn unparsed_columns<'a>(
        &self,
        feature: &FeatureLine,
        raw_columns: &[&'a str],
    ) -> [Option<&'a str>; COLUMN_COUNT] {
        let mut kept = [None; COLUMN_COUNT];
        if raw_columns.len() != COLUMN_COUNT {
            return kept;
        }
        if feature.span.is_none() {
            kept[3] = Some(raw_columns[3]);
            kept[4] = Some(raw_columns[4]);
        }
        if feature.score.is_none() && self.has_error(ErrorCode::InvalidScore) {
            kept[5] = Some(raw_columns[5]);
        }
        if self.has_error(ErrorCode::InvalidStrand) {
            kept[6] = Some(raw_columns[6]);
        }
        if feature.phase.is_none() && self.has_error(ErrorCode::InvalidPhase) {
            kept[7] = Some(raw_columns[7]);
        }
        kept
    }

    /// Text to emit for this line: the raw input when untouched, regenerated
    /// otherwise. A regenerated line keeps the `\r` of a CRLF input line.
    pub fn render(&self) -> String {
        if !self.modified {
            return self.raw.clone();
        }
        let (body, line_end) = match self.raw.strip_suffix('\r') {
            Some(body) => (body, "\r"),
            None => (self.raw.as_str(), ""),
        };
        let regenerated = match &self.content {
            LineContent::Feature(Some(feature)) => {
                let raw_columns: Vec<&str> = body.split('\t').collect();
                let kept = self.unparsed_columns(feature, &raw_columns);
                let mut text = String::new();
                feature
                    .write_columns(&mut text, &kept)
                    .ok()
                    .map(|_| text)
            },
            LineContent::Directive(directive) => directive.render(),
            LineContent::Blank => Some(String::new()),
            _ => None,
        };
        match regenerated {
            Some(text) => format!("{}{}", text, line_end),
            None => self.raw.clone(),
        }
    }
}
