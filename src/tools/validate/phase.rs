use itertools::Itertools;
use log::{
    debug,
    info,
};

use crate::data_structs::annotation::LineId;
use crate::data_structs::coords::Span;
use crate::data_structs::Strand;
use crate::data_structs::line::ErrorCode;
use crate::data_structs::Gff3;

#[derive(Debug, Clone, PartialEq, Eq)]
enum PhaseIssue {
    Mismatch {
        line:     LineId,
        expected: u8,
        declared: u8,
    },
    Indeterminate {
        line:   LineId,
        name:   String,
        strand: Strand,
    },
}

struct Segment {
    line:   LineId,
    seqid:  String,
    span:   Span,
    strand: Strand,
    phase:  Option<u8>,
}

/// Phase of a segment that starts `preceding` bases into the coding sequence,
/// given the phase of the first segment.
fn expected_phase(
    preceding: u64,
    first_phase: u8,
) -> u8 {
    let offset = (preceding + 3 - u64::from(first_phase) % 3) % 3;
    ((3 - offset) % 3) as u8
}

fn scan(document: &Gff3) -> Vec<PhaseIssue> {
    let mut issues = Vec::new();
    for (_, feature) in document.features() {
        let segments = feature
            .lines()
            .iter()
            .filter_map(|&line| {
                let f = document.line(line)?.feature()?;
                if !f.is_coding() {
                    return None;
                }
                Some(Segment {
                    line,
                    seqid: f.seqid.clone(),
                    span: f.span?,
                    strand: f.strand,
                    phase: f.phase,
                })
            })
            .collect_vec();
        if segments.is_empty() {
            continue;
        }
        let name = feature
            .id()
            .unwrap_or(feature.feature_type())
            .to_string();

        let groups = segments
            .into_iter()
            .into_group_map_by(|s| s.seqid.clone())
            .into_values()
            .sorted_by_key(|group| group[0].line);
        for mut group in groups {
            let strand = group[0].strand;
            if !strand.is_oriented() || group.iter().any(|s| s.strand != strand) {
                issues.push(PhaseIssue::Indeterminate {
                    line: group[0].line,
                    name: name.clone(),
                    strand,
                });
                continue;
            }
            match strand {
                Strand::Reverse => group.sort_by(|a, b| b.span.end().cmp(&a.span.end())),
                _ => group.sort_by_key(|s| s.span.start()),
            }

            let first_phase = group[0].phase.unwrap_or(0);
            let mut preceding = 0u64;
            for segment in &group {
                if preceding > 0 {
                    let expected = expected_phase(preceding, first_phase);
                    if let Some(declared) = segment.phase {
                        if declared != expected {
                            issues.push(PhaseIssue::Mismatch {
                                line: segment.line,
                                expected,
                                declared,
                            });
                        }
                    }
                }
                preceding += segment.span.length();
            }
        }
    }
    issues
}

/// Checks the declared phase of every multi-segment coding feature against
/// the phase implied by the lengths of the segments before it, in
/// transcription order.
pub fn check_phase(document: &mut Gff3) {
    let issues = scan(document);
    info!("Phase check found {} problems", issues.len());
    for issue in issues {
        match issue {
            PhaseIssue::Mismatch {
                line,
                expected,
                declared,
            } => {
                if let Some(line) = document.line_mut(line) {
                    line.push_error(
                        ErrorCode::PhaseMismatch { expected, declared },
                        format!("Expected phase {} but found {}", expected, declared),
                    );
                }
            },
            PhaseIssue::Indeterminate { line, name, strand } => {
                if let Some(line) = document.line_mut(line) {
                    line.push_error(
                        ErrorCode::IndeterminatePhase,
                        format!(
                            "Cannot verify the phase of {} on strand {}",
                            name, strand
                        ),
                    );
                }
            },
        }
    }
}

/// Rewrites every mismatched phase to its expected value and drops the
/// mismatch errors already attached. Returns the number of lines changed.
pub fn correct_phase(document: &mut Gff3) -> usize {
    let mut corrected = 0;
    for issue in scan(document) {
        let PhaseIssue::Mismatch { line, expected, .. } = issue
        else {
            continue;
        };
        let Some(record) = document.line_mut(line)
        else {
            continue;
        };
        record.retain_errors(|e| !matches!(e.code, ErrorCode::PhaseMismatch { .. }));
        if let Some(feature) = record.feature_mut() {
            feature.phase = Some(expected);
            corrected += 1;
        }
    }
    debug!("Corrected {} phases", corrected);
    corrected
}
