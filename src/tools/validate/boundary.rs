use hashbrown::HashMap;
use itertools::Itertools;
use log::{
    debug,
    info,
};

use crate::data_structs::annotation::{
    unresolved_parent_message,
    FeatureId,
    LineId,
};
use crate::data_structs::coords::{
    merge_spans,
    Span,
};
use crate::data_structs::line::ErrorCode;
use crate::data_structs::Gff3;

/// Contiguous unions of a feature's member spans, per seqid.
fn parent_extent(
    document: &Gff3,
    parent: FeatureId,
) -> HashMap<String, Vec<Span>> {
    document
        .feature_lines(parent)
        .filter_map(|line| line.feature())
        .filter_map(|f| f.span.map(|span| (f.seqid.clone(), span)))
        .into_group_map()
        .into_iter()
        .map(|(seqid, spans)| (seqid, merge_spans(spans)))
        .collect()
}

/// Checks that every line of a child feature lies inside one of its parents.
///
/// A line passes when it is contained in a single contiguous union of the
/// member spans of any one parent on the same seqid. `Parent` values that do
/// not resolve are reported as well, since there is nothing to check them
/// against.
pub fn check_parent_boundary(document: &mut Gff3) {
    let mut found: Vec<(LineId, ErrorCode, String)> = Vec::new();
    let mut extents: HashMap<FeatureId, HashMap<String, Vec<Span>>> = HashMap::new();

    for (feature_id, feature) in document.features() {
        for &line_id in feature.lines() {
            let Some(line) = document
                .line(line_id)
                .and_then(|l| l.feature())
            else {
                continue;
            };
            for parent in line.attributes.parents() {
                if document.feature_by_id(parent).is_none() {
                    found.push((
                        line_id,
                        ErrorCode::UnresolvedParent,
                        unresolved_parent_message(parent),
                    ));
                }
            }

            let parents = document.parents(feature_id);
            let Some(span) = line.span
            else {
                continue;
            };
            if parents.is_empty() {
                continue;
            }
            let contained = parents.iter().any(|parent| {
                extents
                    .entry(*parent)
                    .or_insert_with(|| parent_extent(document, *parent))
                    .get(&line.seqid)
                    .is_some_and(|unions| unions.iter().any(|u| span.is_in(u)))
            });
            if !contained {
                let names = parents
                    .iter()
                    .filter_map(|p| document.feature(*p).and_then(|f| f.id()))
                    .join(",");
                debug!("{} {} is outside {}", line.feature_type, span, names);
                found.push((
                    line_id,
                    ErrorCode::OutOfParentBounds,
                    format!(
                        "{} {}:{} is not within the bounds of parent {}",
                        line.feature_type, line.seqid, span, names
                    ),
                ));
            }
        }
    }

    info!("Parent boundary check found {} problems", found.len());
    for (line_id, code, message) in found {
        if let Some(line) = document.line_mut(line_id) {
            line.push_error(code, message);
        }
    }
}
