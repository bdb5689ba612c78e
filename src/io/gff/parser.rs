use std::str::FromStr;

use hashbrown::HashSet;

use crate::data_structs::attributes::{
    is_seqid_char,
    percent_decode,
    GffAttributes,
    ID,
    IS_CIRCULAR,
    TARGET,
};
use crate::data_structs::coords::Span;
use crate::data_structs::Strand;
use crate::data_structs::line::{
    is_coding_type,
    Directive,
    ErrorCode,
    FeatureLine,
    LineContent,
    LineRecord,
    SequenceRegion,
};

const COLUMN_COUNT: usize = 9;

type Diagnostics = Vec<(ErrorCode, String)>;

/// Classifies lines one at a time.
///
/// The parser carries the state that makes a line's meaning depend on what
/// came before it: whether `##FASTA` has switched the stream into sequence
/// mode, whether any non-blank line has been seen (the version directive
/// must come first), and which sequence regions were declared.
/// It never fails; every defect ends up on the returned [`LineRecord`].
#[derive(Debug, Default)]
pub struct LineParser {
    sequence_mode:   bool,
    content_seen:    bool,
    declared_region: HashSet<String>,
}

impl LineParser {
    pub fn new() -> Self { Self::default() }

    pub fn in_sequence_mode(&self) -> bool { self.sequence_mode }

    /// Parses `raw` (without its trailing `\n`) as the line at `line_index`.
    pub fn parse_line(
        &mut self,
        line_index: usize,
        raw: &str,
    ) -> LineRecord {
        let text = raw.strip_suffix('\r').unwrap_or(raw);
        let mut diagnostics = Diagnostics::new();

        let content = if text.trim().is_empty() {
            LineContent::Blank
        }
        else if self.sequence_mode {
            parse_sequence_line(text, &mut diagnostics)
        }
        else if text.starts_with('>') {
            diagnostics.push((
                ErrorCode::ImplicitFasta,
                "Sequence header found without a preceding ##FASTA directive"
                    .to_string(),
            ));
            self.sequence_mode = true;
            parse_sequence_line(text, &mut diagnostics)
        }
        else if text.starts_with("##") {
            let directive = self.parse_directive(text, &mut diagnostics);
            LineContent::Directive(directive)
        }
        else if text.starts_with('#') {
            self.note_content(false, &mut diagnostics);
            LineContent::Comment
        }
        else {
            self.note_content(false, &mut diagnostics);
            LineContent::Feature(parse_feature(text, &mut diagnostics))
        };

        let mut record = LineRecord::new(line_index, raw.to_string(), content);
        for (code, message) in diagnostics {
            record.push_error(code, message);
        }
        record
    }

    /// Records that a non-blank line was seen, warning if it is the first one
    /// and not the version directive.
    fn note_content(
        &mut self,
        is_version: bool,
        diagnostics: &mut Diagnostics,
    ) {
        if !self.content_seen && !is_version {
            diagnostics.push((
                ErrorCode::MissingVersion,
                "The first line should be a ##gff-version directive".to_string(),
            ));
        }
        self.content_seen = true;
    }

    fn parse_directive(
        &mut self,
        text: &str,
        diagnostics: &mut Diagnostics,
    ) -> Directive {
        if text.trim_end() == "###" {
            self.note_content(false, diagnostics);
            return Directive::ForwardReferencesResolved;
        }

        let body = &text[2..];
        let (name, value) = match body.split_once(char::is_whitespace) {
            Some((name, value)) => (name, value.trim()),
            None => (body.trim_end(), ""),
        };

        match name {
            "gff-version" => {
                if self.content_seen {
                    diagnostics.push((
                        ErrorCode::VersionNotFirst,
                        "##gff-version must be the first line of the file"
                            .to_string(),
                    ));
                }
                self.note_content(true, diagnostics);
                if !is_supported_version(value) {
                    diagnostics.push((
                        ErrorCode::UnsupportedVersion,
                        format!("Unsupported GFF version {:?}, expected 3", value),
                    ));
                }
                Directive::Version(value.to_string())
            },
            "sequence-region" => {
                self.note_content(false, diagnostics);
                let region = parse_sequence_region(value, diagnostics);
                if let Some(region) = &region {
                    if !self
                        .declared_region
                        .insert(region.seqid.clone())
                    {
                        diagnostics.push((
                            ErrorCode::DuplicateSequenceRegion,
                            format!(
                                "##sequence-region for {} is declared more than once",
                                region.seqid
                            ),
                        ));
                    }
                }
                Directive::SequenceRegion(region)
            },
            "FASTA" => {
                self.note_content(false, diagnostics);
                self.sequence_mode = true;
                Directive::Fasta
            },
            _ => {
                self.note_content(false, diagnostics);
                Directive::Other {
                    name:  name.to_string(),
                    value: value.to_string(),
                }
            },
        }
    }
}

fn is_supported_version(value: &str) -> bool {
    match value.split_once('.') {
        None => value == "3",
        Some((major, minor)) => {
            major == "3"
                && minor
                    .split('.')
                    .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
        },
    }
}

fn parse_sequence_region(
    value: &str,
    diagnostics: &mut Diagnostics,
) -> Option<SequenceRegion> {
    let fields: Vec<&str> = value.split_whitespace().collect();
    let malformed = |reason: &str| {
        (
            ErrorCode::MalformedSequenceRegion,
            format!("Malformed ##sequence-region {:?}: {}", value, reason),
        )
    };

    if fields.len() != 3 {
        diagnostics.push(malformed("expected seqid, start and end"));
        return None;
    }
    let (start, end) = match (fields[1].parse::<u64>(), fields[2].parse::<u64>()) {
        (Ok(start), Ok(end)) => (start, end),
        _ => {
            diagnostics.push(malformed("start and end must be integers"));
            return None;
        },
    };
    let span = match Span::new(start, end) {
        Some(span) => span,
        None => {
            diagnostics.push(malformed("start must be positive and not after end"));
            return None;
        },
    };
    let seqid = match percent_decode(fields[0]) {
        Some(seqid) => seqid,
        None => {
            diagnostics.push(malformed("seqid has an invalid percent escape"));
            return None;
        },
    };
    Some(SequenceRegion { seqid, span })
}

fn parse_sequence_line(
    text: &str,
    diagnostics: &mut Diagnostics,
) -> LineContent {
    if let Some(header) = text.strip_prefix('>') {
        let name = header
            .split_whitespace()
            .next()
            .unwrap_or("");
        if name.is_empty() {
            diagnostics.push((
                ErrorCode::MalformedFastaHeader,
                "Sequence header has no name".to_string(),
            ));
        }
        return LineContent::FastaHeader(name.to_string());
    }

    let residues = text.trim();
    if let Some(bad) = residues
        .chars()
        .find(|c| !is_residue(*c))
    {
        diagnostics.push((
            ErrorCode::InvalidResidues,
            format!("Invalid character {:?} in sequence", bad),
        ));
    }
    LineContent::FastaSequence(residues.to_string())
}

fn is_residue(c: char) -> bool { c.is_ascii_alphabetic() || c == '-' || c == '*' }

/// Parses the nine columns of a feature line. Returns `None` if the line does
/// not have exactly nine tab-separated columns.
pub fn parse_feature(
    text: &str,
    diagnostics: &mut Vec<(ErrorCode, String)>,
) -> Option<FeatureLine> {
    let columns: Vec<&str> = text.split('\t').collect();
    if columns.len() != COLUMN_COUNT {
        diagnostics.push((
            ErrorCode::ColumnCount {
                found: columns.len(),
            },
            format!(
                "Feature line must have {} tab-separated columns, found {}",
                COLUMN_COUNT,
                columns.len()
            ),
        ));
        return None;
    }

    let seqid = parse_seqid(columns[0], diagnostics);
    let source = parse_text_column(columns[1], "Source", ErrorCode::InvalidSource, diagnostics);
    let feature_type = parse_text_column(columns[2], "Type", ErrorCode::InvalidType, diagnostics);

    let start = parse_coordinate(columns[3], "Start", ErrorCode::InvalidStart, diagnostics);
    let end = parse_coordinate(columns[4], "End", ErrorCode::InvalidEnd, diagnostics);
    let span = match (start, end) {
        (Some(start), Some(end)) if start > end => {
            diagnostics.push((
                ErrorCode::StartAfterEnd,
                format!("Start {} is greater than end {}", start, end),
            ));
            None
        },
        (Some(start), Some(end)) => Span::new(start, end),
        _ => None,
    };

    let score = match columns[5] {
        "." => None,
        raw => {
            match raw.parse::<f64>() {
                Ok(score) if score.is_finite() => Some(score),
                _ => {
                    diagnostics.push((
                        ErrorCode::InvalidScore,
                        format!("Score must be a number or '.', got {:?}", raw),
                    ));
                    None
                },
            }
        },
    };

    let strand = Strand::from_str(columns[6]).unwrap_or_else(|e| {
        diagnostics.push((ErrorCode::InvalidStrand, e.to_string()));
        Strand::default()
    });

    let phase = match columns[7] {
        "." => None,
        "0" => Some(0),
        "1" => Some(1),
        "2" => Some(2),
        raw => {
            diagnostics.push((
                ErrorCode::InvalidPhase,
                format!("Phase must be one of 0, 1, 2 or '.', got {:?}", raw),
            ));
            None
        },
    };
    let coding = is_coding_type(&feature_type);
    if coding && columns[7] == "." {
        diagnostics.push((
            ErrorCode::MissingPhase,
            format!("{} features require a phase", feature_type),
        ));
    }
    if !coding && phase.is_some() {
        diagnostics.push((
            ErrorCode::PhaseOnNonCoding,
            format!("Phase is only meaningful for CDS features, not {}", feature_type),
        ));
    }

    let attributes = parse_attributes(columns[8], diagnostics);

    Some(FeatureLine {
        seqid,
        source,
        feature_type,
        span,
        score,
        strand,
        phase,
        attributes,
    })
}

fn parse_seqid(
    raw: &str,
    diagnostics: &mut Diagnostics,
) -> String {
    if raw.is_empty() {
        diagnostics.push((ErrorCode::InvalidSeqid, "Seqid is empty".to_string()));
        return String::new();
    }
    if raw.starts_with('>') || raw.chars().any(|c| c != '%' && !is_seqid_char(c)) {
        diagnostics.push((
            ErrorCode::InvalidSeqid,
            format!("Seqid {:?} contains characters that must be escaped", raw),
        ));
    }
    decode_or_report(raw, "Seqid", diagnostics)
}

fn parse_text_column(
    raw: &str,
    column: &str,
    code: ErrorCode,
    diagnostics: &mut Diagnostics,
) -> String {
    if raw.is_empty() {
        diagnostics.push((code, format!("{} is empty", column)));
        return String::new();
    }
    if raw.chars().any(|c| c.is_control()) {
        diagnostics.push((
            code,
            format!("{} {:?} contains unescaped control characters", column, raw),
        ));
    }
    decode_or_report(raw, column, diagnostics)
}

fn decode_or_report(
    raw: &str,
    what: &str,
    diagnostics: &mut Diagnostics,
) -> String {
    match percent_decode(raw) {
        Some(decoded) => decoded,
        None => {
            diagnostics.push((
                ErrorCode::InvalidEncoding,
                format!("{} {:?} has a malformed percent escape", what, raw),
            ));
            raw.to_string()
        },
    }
}

fn parse_coordinate(
    raw: &str,
    column: &str,
    code: ErrorCode,
    diagnostics: &mut Diagnostics,
) -> Option<u64> {
    match raw.parse::<u64>() {
        Ok(value) if value > 0 => Some(value),
        _ => {
            diagnostics.push((
                code,
                format!("{} must be a positive integer, got {:?}", column, raw),
            ));
            None
        },
    }
}

/// Parses column 9. Defects are reported; well-formed pairs are kept even
/// when other pairs on the line are broken.
pub fn parse_attributes(
    column: &str,
    diagnostics: &mut Vec<(ErrorCode, String)>,
) -> GffAttributes {
    let mut attributes = GffAttributes::new();
    if column == "." {
        return attributes;
    }

    for pair in column.split(';') {
        if pair.trim().is_empty() {
            continue;
        }
        let (raw_key, raw_values) = match pair.split_once('=') {
            Some(split) => split,
            None => {
                diagnostics.push((
                    ErrorCode::MalformedAttribute,
                    format!("Attribute {:?} is not a key=value pair", pair),
                ));
                continue;
            },
        };
        if raw_key.is_empty() {
            diagnostics.push((
                ErrorCode::EmptyAttributeKey,
                format!("Attribute {:?} has an empty key", pair),
            ));
            continue;
        }

        let key = decode_or_report(raw_key, "Attribute key", diagnostics);
        let values = raw_values
            .split(',')
            .map(|v| decode_or_report(v, "Attribute value", diagnostics))
            .collect();
        if !attributes.try_insert(key.clone(), values) {
            diagnostics.push((
                ErrorCode::DuplicateAttribute,
                format!("Attribute {} is given more than once", key),
            ));
        }
    }

    check_reserved_values(&attributes, diagnostics);
    attributes
}

fn check_reserved_values(
    attributes: &GffAttributes,
    diagnostics: &mut Diagnostics,
) {
    if let Some(ids) = attributes.get(ID) {
        if ids.len() > 1 {
            diagnostics.push((
                ErrorCode::MultipleIds,
                format!("ID must have a single value, got {}", ids.join(",")),
            ));
        }
    }
    if attributes.contains_key(IS_CIRCULAR) && attributes.is_circular().is_none() {
        diagnostics.push((
            ErrorCode::InvalidAttributeValue,
            "Is_circular must be true or false".to_string(),
        ));
    }
    if let Some(targets) = attributes.get(TARGET) {
        for target in targets {
            if !is_valid_target(target) {
                diagnostics.push((
                    ErrorCode::InvalidAttributeValue,
                    format!("Target {:?} must be \"target_id start end [strand]\"", target),
                ));
            }
        }
    }
}

fn is_valid_target(target: &str) -> bool {
    let fields: Vec<&str> = target.split(' ').collect();
    if fields.len() != 3 && fields.len() != 4 {
        return false;
    }
    let coordinates = match (fields[1].parse::<u64>(), fields[2].parse::<u64>()) {
        (Ok(start), Ok(end)) => Span::new(start, end).is_some(),
        _ => false,
    };
    let strand = fields
        .get(3)
        .map_or(true, |s| *s == "+" || *s == "-");
    !fields[0].is_empty() && coordinates && strand
}
