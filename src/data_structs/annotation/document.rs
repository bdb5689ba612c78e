use std::fs::File;
use std::io::{
    BufReader,
    Read,
    Write,
};
use std::path::Path;

use anyhow::{
    bail,
    Context,
};
use hashbrown::HashSet;
use itertools::Itertools;
use log::{
    debug,
    info,
};
use slotmap::SlotMap;

use super::graph::{
    Feature,
    FeatureGraph,
    FeatureId,
    LineArena,
    LineId,
};
use crate::data_structs::attributes::PARENT;
use crate::data_structs::coords::Span;
use crate::data_structs::line::{
    Directive,
    ErrorCode,
    ErrorKind,
    LineContent,
    LineError,
    LineRecord,
    SequenceRegion,
};
use crate::data_structs::reference::ReferenceIndex;
use crate::io::fasta::read_sequences_from_path;
use crate::io::gff::{
    Gff3Writer,
    LineParser,
};

/// A parsed GFF3 document.
///
/// Owns every line of the input (in an arena addressed by [`LineId`]), the
/// [`FeatureGraph`] built from the feature lines, and the [`ReferenceIndex`]
/// used by the reference checks. Lines keep their raw text until they are
/// modified, so an untouched document serializes back byte-for-byte.
#[derive(Debug, Clone)]
pub struct Gff3 {
    lines:            LineArena,
    order:            Vec<LineId>,
    graph:            FeatureGraph,
    references:       ReferenceIndex,
    trailing_newline: bool,
}

impl Gff3 {
    /// Parses a whole document. Never fails: every defect is attached to the
    /// line it concerns.
    pub fn parse(text: &str) -> Self {
        let trailing_newline = text.ends_with('\n');
        let body = text.strip_suffix('\n').unwrap_or(text);

        let mut parser = LineParser::new();
        let mut lines: LineArena = SlotMap::with_key();
        let mut order = Vec::new();
        if !text.is_empty() {
            for (index, raw) in body.split('\n').enumerate() {
                order.push(lines.insert(parser.parse_line(index, raw)));
            }
        }

        let references = index_references(&mut lines, &order);
        let graph = FeatureGraph::build(&lines, &order);
        graph.check(&mut lines);

        let document = Self {
            lines,
            order,
            graph,
            references,
            trailing_newline,
        };
        info!(
            "Parsed {} lines: {} features, {} reference sequences, {} errors",
            document.order.len(),
            document.graph.len(),
            document.references.len(),
            document.error_count()
        );
        document
    }

    pub fn from_reader<R: Read>(mut reader: R) -> anyhow::Result<Self> {
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .context("Failed to read GFF3 input")?;
        Ok(Self::parse(&text))
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open GFF3 file {}", path.display()))?;
        info!("Reading {}", path.display());
        Self::from_reader(BufReader::new(file))
    }

    /// Current text of the document.
    pub fn serialize(&self) -> String {
        let mut text = self
            .lines()
            .map(|line| line.render())
            .join("\n");
        if self.trailing_newline && !self.order.is_empty() {
            text.push('\n');
        }
        text
    }

    pub fn write<W: Write>(
        &self,
        sink: W,
    ) -> anyhow::Result<W> {
        let mut writer = Gff3Writer::new(sink);
        writer.write_all(self.lines())?;
        writer.finish(self.trailing_newline)
    }

    pub fn write_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> anyhow::Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        self.write(std::io::BufWriter::new(file))?;
        info!("Wrote {}", path.display());
        Ok(())
    }

    /// Lines in document order.
    pub fn lines(&self) -> impl Iterator<Item = &LineRecord> {
        self.order
            .iter()
            .map(|id| &self.lines[*id])
    }

    pub fn line_ids(&self) -> &[LineId] { &self.order }

    pub fn line(
        &self,
        id: LineId,
    ) -> Option<&LineRecord> {
        self.lines.get(id)
    }

    pub fn len(&self) -> usize { self.order.len() }

    pub fn is_empty(&self) -> bool { self.order.is_empty() }

    pub fn graph(&self) -> &FeatureGraph { &self.graph }

    pub fn references(&self) -> &ReferenceIndex { &self.references }

    pub fn references_mut(&mut self) -> &mut ReferenceIndex { &mut self.references }

    pub fn feature(
        &self,
        feature: FeatureId,
    ) -> Option<&Feature> {
        self.graph.get(feature)
    }

    pub fn feature_by_id(
        &self,
        id: &str,
    ) -> Option<FeatureId> {
        self.graph.by_id(id)
    }

    pub fn features(&self) -> impl Iterator<Item = (FeatureId, &Feature)> {
        self.graph.iter()
    }

    pub fn features_of_type<'a>(
        &'a self,
        feature_type: &'a str,
    ) -> impl Iterator<Item = FeatureId> + 'a {
        self.graph
            .iter()
            .filter(move |(_, f)| f.feature_type() == feature_type)
            .map(|(id, _)| id)
    }

    /// Member lines of `feature` in file order.
    pub fn feature_lines(
        &self,
        feature: FeatureId,
    ) -> impl Iterator<Item = &LineRecord> {
        self.graph
            .get(feature)
            .map(|f| f.lines())
            .unwrap_or(&[])
            .iter()
            .filter_map(|id| self.lines.get(*id))
    }

    pub fn parents(
        &self,
        feature: FeatureId,
    ) -> &[FeatureId] {
        self.graph.parents(feature)
    }

    pub fn children(
        &self,
        feature: FeatureId,
    ) -> &[FeatureId] {
        self.graph.children(feature)
    }

    pub fn descendants(
        &self,
        feature: FeatureId,
    ) -> Vec<FeatureId> {
        self.graph.descendants(feature)
    }

    /// Whether any line of `a` overlaps any line of `b` on the same reference
    /// sequence. Symmetric; `false` for unknown handles.
    pub fn overlap(
        &self,
        a: FeatureId,
        b: FeatureId,
    ) -> bool {
        self.feature_lines(a)
            .any(|la| self.feature_lines(b).any(|lb| la.overlaps(lb)))
    }

    /// Every `(line, error)` pair in document order.
    pub fn errors(&self) -> impl Iterator<Item = (&LineRecord, &LineError)> {
        self.lines()
            .flat_map(|line| line.errors().iter().map(move |e| (line, e)))
    }

    pub fn error_count(&self) -> usize {
        self.lines()
            .map(|l| l.errors().len())
            .sum()
    }

    /// Makes `new_parent` the only parent of `feature`.
    ///
    /// The `Parent` attribute of every member line is replaced (or appended
    /// when absent) and the lines are marked modified. Fails without touching
    /// the document if either handle is unknown or `new_parent` has no `ID`.
    pub fn adopt(
        &mut self,
        feature: FeatureId,
        new_parent: FeatureId,
    ) -> anyhow::Result<()> {
        let Some(child) = self.graph.get(feature)
        else {
            bail!("Feature to adopt does not exist")
        };
        let Some(parent) = self.graph.get(new_parent)
        else {
            bail!("New parent feature does not exist")
        };
        let Some(parent_id) = parent.id().map(str::to_string)
        else {
            bail!("New parent has no ID and cannot be referenced")
        };
        if feature == new_parent {
            bail!("Feature {} cannot adopt itself", parent_id);
        }

        let member_lines = child.lines().to_vec();
        for line_id in member_lines {
            if let Some(line) = self
                .lines
                .get_mut(line_id)
                .and_then(|l| l.feature_mut())
            {
                line.attributes
                    .set(PARENT, vec![parent_id.clone()]);
            }
        }
        self.graph.reparent(feature, new_parent);
        debug!(
            "Adopted {} under {}",
            self.graph
                .get(feature)
                .and_then(|f| f.id())
                .unwrap_or("<anonymous>"),
            parent_id
        );
        Ok(())
    }

    /// Deletes `feature`'s lines and edges and returns the removed lines.
    ///
    /// Children are left as they are; their `Parent` reference becomes
    /// unresolved and is reported by the next structural or boundary check.
    pub fn remove(
        &mut self,
        feature: FeatureId,
    ) -> anyhow::Result<Vec<LineRecord>> {
        let Some(removed) = self.graph.detach(feature)
        else {
            bail!("Feature to remove does not exist")
        };
        let members: HashSet<LineId> = removed.lines().iter().copied().collect();
        self.order.retain(|id| !members.contains(id));
        let lines = removed
            .lines()
            .iter()
            .filter_map(|id| self.lines.remove(*id))
            .collect_vec();
        debug!(
            "Removed {} ({} lines)",
            removed.id().unwrap_or("<anonymous>"),
            lines.len()
        );
        Ok(lines)
    }

    /// Changes the type column of every member line of `feature`.
    pub fn set_feature_type(
        &mut self,
        feature: FeatureId,
        feature_type: &str,
    ) -> anyhow::Result<()> {
        let Some(target) = self.graph.get(feature)
        else {
            bail!("Feature does not exist")
        };
        for line_id in target.lines().to_vec() {
            if let Some(line) = self
                .lines
                .get_mut(line_id)
                .and_then(|l| l.feature_mut())
            {
                line.feature_type = feature_type.to_string();
            }
        }
        self.graph
            .set_feature_type(feature, feature_type);
        Ok(())
    }

    /// Drops every error that a check may re-derive: structural, reference,
    /// boundary and phase errors. Syntax errors stay.
    pub fn clear_validation_errors(&mut self) {
        for line in self.lines.values_mut() {
            line.retain_errors(|e| e.kind() == ErrorKind::Syntax);
        }
    }

    /// Re-derives structural errors from the current graph.
    pub fn check_structure(&mut self) {
        for line in self.lines.values_mut() {
            line.retain_errors(|e| e.kind() != ErrorKind::Structural);
        }
        self.graph.check(&mut self.lines);
    }

    /// Loads an external FASTA file. Its sequences take precedence over the
    /// embedded ones.
    pub fn load_fasta_external<P: AsRef<Path>>(
        &mut self,
        path: P,
    ) -> anyhow::Result<usize> {
        let sequences = read_sequences_from_path(path)?;
        Ok(self.set_external_sequences(sequences))
    }

    pub fn set_external_sequences<I, S>(
        &mut self,
        sequences: I,
    ) -> usize
    where
        I: IntoIterator<Item = (S, Vec<u8>)>,
        S: AsRef<str>, {
        let mut count = 0;
        for (name, residues) in sequences {
            self.references
                .set_external(name.as_ref(), residues);
            count += 1;
        }
        count
    }

    /// Adds `##sequence-region name 1 length` for every reference used by a
    /// feature that has a known length but no declaration. The directives go
    /// right after the version line. Returns the number inserted.
    pub fn insert_missing_sequence_regions(&mut self) -> usize {
        let missing = self
            .lines()
            .filter_map(|l| l.feature())
            .map(|f| f.seqid.clone())
            .unique()
            .filter(|seqid| self.references.region(seqid).is_none())
            .filter_map(|seqid| {
                let span = Span::new(
                    1,
                    self.references.sequence_length(&seqid)?,
                )?;
                Some(SequenceRegion { seqid, span })
            })
            .collect_vec();

        let position = self
            .order
            .iter()
            .position(|id| matches!(self.lines[*id].directive(), Some(Directive::Version(_))))
            .map_or(0, |p| p + 1);

        let inserted = missing.len();
        for (offset, region) in missing.into_iter().enumerate() {
            self.references
                .set_region(&region.seqid, region.span);
            let line = LineRecord::synthetic(LineContent::Directive(Directive::SequenceRegion(
                Some(region),
            )));
            let id = self.lines.insert(line);
            self.order.insert(position + offset, id);
        }
        if inserted > 0 {
            info!("Inserted {} ##sequence-region directives", inserted);
        }
        inserted
    }

    pub(crate) fn line_mut(
        &mut self,
        id: LineId,
    ) -> Option<&mut LineRecord> {
        self.lines.get_mut(id)
    }
}

/// Collects `##sequence-region` declarations and embedded FASTA records.
/// The first declaration of a name wins; residue lines outside any record are
/// flagged.
fn index_references(
    lines: &mut LineArena,
    order: &[LineId],
) -> ReferenceIndex {
    let mut index = ReferenceIndex::new();
    let mut current: Option<(String, Vec<u8>)> = None;
    let mut orphans = Vec::new();

    for &id in order {
        match lines[id].content() {
            LineContent::Directive(Directive::SequenceRegion(Some(region))) => {
                if index.region(&region.seqid).is_none() {
                    index.set_region(&region.seqid, region.span);
                }
            },
            LineContent::FastaHeader(name) => {
                if let Some((name, residues)) = current.take() {
                    index.set_embedded(&name, residues);
                }
                current = Some((name.clone(), Vec::new()));
            },
            LineContent::FastaSequence(residues) => {
                match current.as_mut() {
                    Some((_, sequence)) => sequence.extend_from_slice(residues.as_bytes()),
                    None => orphans.push(id),
                }
            },
            _ => {},
        }
    }
    for id in orphans {
        lines[id].push_error(
            ErrorCode::InvalidResidues,
            "Sequence line appears before any FASTA header",
        );
    }
    if let Some((name, residues)) = current {
        index.set_embedded(&name, residues);
    }
    index
}
