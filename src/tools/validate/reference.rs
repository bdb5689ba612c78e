use hashbrown::HashSet;
use log::info;

use crate::data_structs::annotation::LineId;
use crate::data_structs::line::{
    Directive,
    ErrorCode,
    LineContent,
};
use crate::data_structs::Gff3;

/// Checks feature lines and sequence-region declarations against the known
/// reference sequences.
///
/// - Lines whose type is in `types` must have residues available and at most
///   `allowed_n` `N`s over their span.
/// - No line may end past the known length of its reference.
/// - A declared region must agree with the length of the residues.
/// - A reference with a known length used without a declaration gets a
///   warning on its first feature line.
pub fn check_reference(
    document: &mut Gff3,
    allowed_n: usize,
    types: &[String],
) {
    let mut found: Vec<(LineId, ErrorCode, String)> = Vec::new();
    let mut warned: HashSet<String> = HashSet::new();
    let references = document.references();

    for &line_id in document.line_ids() {
        let Some(line) = document.line(line_id)
        else {
            continue;
        };
        match line.content() {
            LineContent::Directive(Directive::SequenceRegion(Some(region))) => {
                if let Some(length) = references.sequence_length(&region.seqid) {
                    if length != region.span.end() {
                        found.push((
                            line_id,
                            ErrorCode::SequenceRegionMismatch,
                            format!(
                                "##sequence-region {} ends at {} but the sequence is {} bp",
                                region.seqid,
                                region.span.end(),
                                length
                            ),
                        ));
                    }
                }
            },
            LineContent::Feature(Some(feature)) => {
                let Some(span) = feature.span
                else {
                    continue;
                };
                if types.contains(&feature.feature_type) {
                    match references.subsequence(&feature.seqid, span) {
                        None => {
                            found.push((
                                line_id,
                                ErrorCode::SequenceUnavailable,
                                format!("No sequence available for {}", feature.seqid),
                            ))
                        },
                        Some(sub) => {
                            let count = sub.count_n();
                            if count > allowed_n {
                                found.push((
                                    line_id,
                                    ErrorCode::ExcessN { count },
                                    format!(
                                        "{} {}:{} contains {} Ns, more than the allowed {}",
                                        feature.feature_type, feature.seqid, span, count, allowed_n
                                    ),
                                ));
                            }
                        },
                    }
                }

                let length = references.length(&feature.seqid);
                if let Some(length) = length {
                    if span.end() > length {
                        found.push((
                            line_id,
                            ErrorCode::ExceedsSequenceLength,
                            format!(
                                "End {} is past the end of {} ({} bp)",
                                span.end(),
                                feature.seqid,
                                length
                            ),
                        ));
                    }
                    if references.region(&feature.seqid).is_none()
                        && warned.insert(feature.seqid.clone())
                    {
                        found.push((
                            line_id,
                            ErrorCode::MissingSequenceRegion,
                            format!("{} has no ##sequence-region directive", feature.seqid),
                        ));
                    }
                }
            },
            _ => {},
        }
    }

    info!("Reference check found {} problems", found.len());
    for (line_id, code, message) in found {
        if let Some(line) = document.line_mut(line_id) {
            line.push_error(code, message);
        }
    }
}
