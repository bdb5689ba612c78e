use std::collections::VecDeque;

use hashbrown::{
    HashMap,
    HashSet,
};
use log::debug;
use multimap::MultiMap;
use slotmap::{
    new_key_type,
    SecondaryMap,
    SlotMap,
};

use crate::data_structs::line::{
    ErrorCode,
    LineRecord,
};

new_key_type! {
    /// Stable handle of a line in a [`Gff3`](super::Gff3) document.
    pub struct LineId;
    /// Stable handle of a feature in a [`FeatureGraph`].
    pub struct FeatureId;
}

pub(crate) type LineArena = SlotMap<LineId, LineRecord>;

pub(crate) fn unresolved_parent_message(parent: &str) -> String {
    format!("Parent {} is not defined by any ID", parent)
}

/// Feature lines grouped by a shared `ID`, or a single line without one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    id:           Option<String>,
    feature_type: String,
    lines:        Vec<LineId>,
}

impl Feature {
    pub fn id(&self) -> Option<&str> { self.id.as_deref() }

    /// Type declared by the first member line.
    pub fn feature_type(&self) -> &str { &self.feature_type }

    /// Member lines in file order.
    pub fn lines(&self) -> &[LineId] { &self.lines }

    pub fn is_anonymous(&self) -> bool { self.id.is_none() }
}

/// Parent/child relations between the features of a document.
///
/// Edges are kept in both directions so that parents and children are
/// looked up in constant time. Cycles are allowed in the data; traversals
/// guard against them.
#[derive(Debug, Default, Clone)]
pub struct FeatureGraph {
    features:     SlotMap<FeatureId, Feature>,
    order:        Vec<FeatureId>,
    by_id:        HashMap<String, FeatureId>,
    by_line:      SecondaryMap<LineId, FeatureId>,
    parent_map:   MultiMap<FeatureId, FeatureId>,
    children_map: MultiMap<FeatureId, FeatureId>,
}

impl FeatureGraph {
    /// Groups the feature lines of `order` and resolves their `Parent`
    /// references. Unknown parents produce no edge; [`FeatureGraph::check`]
    /// reports them.
    pub(crate) fn build(
        lines: &LineArena,
        order: &[LineId],
    ) -> Self {
        let mut graph = Self::default();
        for &line_id in order {
            let Some(feature) = lines.get(line_id).and_then(|l| l.feature())
            else {
                continue;
            };
            let existing = feature
                .id()
                .and_then(|id| graph.by_id.get(id).copied());
            let feature_id = match existing {
                Some(feature_id) => {
                    graph.features[feature_id].lines.push(line_id);
                    feature_id
                },
                None => {
                    let feature_id = graph.features.insert(Feature {
                        id:           feature.id().map(str::to_string),
                        feature_type: feature.feature_type.clone(),
                        lines:        vec![line_id],
                    });
                    if let Some(id) = feature.id() {
                        graph.by_id.insert(id.to_string(), feature_id);
                    }
                    graph.order.push(feature_id);
                    feature_id
                },
            };
            graph.by_line.insert(line_id, feature_id);
        }

        for &line_id in order {
            let (Some(child), Some(feature)) = (
                graph.by_line.get(line_id).copied(),
                lines.get(line_id).and_then(|l| l.feature()),
            )
            else {
                continue;
            };
            for parent in feature.attributes.parents() {
                if let Some(&parent_id) = graph.by_id.get(parent) {
                    graph.link(child, parent_id);
                }
            }
        }

        debug!(
            "Built feature graph: {} features, {} with an ID",
            graph.features.len(),
            graph.by_id.len()
        );
        graph
    }

    /// Attaches structural errors to `lines`: type conflicts and overlapping
    /// segments inside a feature, unresolved parents, and parent cycles.
    pub(crate) fn check(
        &self,
        lines: &mut LineArena,
    ) {
        for feature in self.iter().map(|(_, f)| f) {
            self.check_members(feature, lines);
        }

        for (_, feature) in self.iter() {
            for &line_id in &feature.lines {
                let Some(line) = lines.get_mut(line_id)
                else {
                    continue;
                };
                let unresolved: Vec<String> = line
                    .feature()
                    .map(|f| {
                        f.attributes
                            .parents()
                            .iter()
                            .filter(|p| !self.by_id.contains_key(p.as_str()))
                            .cloned()
                            .collect()
                    })
                    .unwrap_or_default();
                for parent in unresolved {
                    line.push_error(ErrorCode::UnresolvedParent, unresolved_parent_message(&parent));
                }
            }
        }

        for (closing, parent) in self.find_cycles() {
            let Some(&first_line) = self.features[closing].lines.first()
            else {
                continue;
            };
            let parent_name = self.features[parent]
                .id()
                .unwrap_or("?")
                .to_string();
            if let Some(line) = lines.get_mut(first_line) {
                line.push_error(
                    ErrorCode::ParentCycle,
                    format!("Parent {} closes a cycle in the feature hierarchy", parent_name),
                );
            }
        }
    }

    fn check_members(
        &self,
        feature: &Feature,
        lines: &mut LineArena,
    ) {
        for (i, &line_id) in feature.lines.iter().enumerate().skip(1) {
            let Some(current) = lines.get(line_id).and_then(|l| l.feature())
            else {
                continue;
            };
            let type_conflict = current.feature_type != feature.feature_type;
            let overlapping = feature.lines[..i].iter().any(|earlier| {
                lines
                    .get(*earlier)
                    .and_then(|l| l.feature())
                    .is_some_and(|e| e.overlaps(current))
            });
            let current_type = current.feature_type.clone();

            let Some(line) = lines.get_mut(line_id)
            else {
                continue;
            };
            let id = feature.id().unwrap_or_default();
            if type_conflict {
                line.push_error(
                    ErrorCode::TypeConflict,
                    format!(
                        "Lines of {} must share one type, found {} after {}",
                        id, current_type, feature.feature_type
                    ),
                );
            }
            if overlapping {
                line.push_error(
                    ErrorCode::OverlappingSegments,
                    format!("Segment overlaps another segment of {}", id),
                );
            }
        }
    }

    /// Parent edges `(child, parent)` that close a cycle, found by a depth
    /// first search over the parent relation.
    fn find_cycles(&self) -> Vec<(FeatureId, FeatureId)> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Active,
            Done,
        }

        let mut marks: SecondaryMap<FeatureId, Mark> = SecondaryMap::new();
        let mut closing = Vec::new();
        for &root in &self.order {
            if marks.contains_key(root) {
                continue;
            }
            let mut stack: Vec<(FeatureId, usize)> = vec![(root, 0)];
            marks.insert(root, Mark::Active);
            while let Some((node, next)) = stack.last_mut() {
                let node = *node;
                let parents = self.parents(node);
                if *next < parents.len() {
                    let parent = parents[*next];
                    *next += 1;
                    match marks.get(parent) {
                        Some(Mark::Active) => closing.push((node, parent)),
                        Some(Mark::Done) => {},
                        None => {
                            marks.insert(parent, Mark::Active);
                            stack.push((parent, 0));
                        },
                    }
                }
                else {
                    marks.insert(node, Mark::Done);
                    stack.pop();
                }
            }
        }
        closing
    }

    fn link(
        &mut self,
        child: FeatureId,
        parent: FeatureId,
    ) {
        let linked = self
            .parent_map
            .get_vec(&child)
            .is_some_and(|v| v.contains(&parent));
        if !linked {
            self.parent_map.insert(child, parent);
            self.children_map.insert(parent, child);
        }
    }

    fn unlink(
        &mut self,
        child: FeatureId,
        parent: FeatureId,
    ) {
        if let Some(parents) = self.parent_map.get_vec_mut(&child) {
            parents.retain(|p| *p != parent);
        }
        if let Some(children) = self.children_map.get_vec_mut(&parent) {
            children.retain(|c| *c != child);
        }
    }

    /// Replaces every parent edge of `child` with a single edge to `parent`.
    pub(crate) fn reparent(
        &mut self,
        child: FeatureId,
        parent: FeatureId,
    ) {
        for old in self.parents(child).to_vec() {
            self.unlink(child, old);
        }
        self.link(child, parent);
    }

    /// Removes `feature` and all its edges. Returns its former member lines.
    pub(crate) fn detach(
        &mut self,
        feature: FeatureId,
    ) -> Option<Feature> {
        let removed = self.features.remove(feature)?;
        for parent in self.parents(feature).to_vec() {
            self.unlink(feature, parent);
        }
        for child in self.children(feature).to_vec() {
            self.unlink(child, feature);
        }
        self.parent_map.remove(&feature);
        self.children_map.remove(&feature);
        self.order.retain(|f| *f != feature);
        if let Some(id) = &removed.id {
            self.by_id.remove(id);
        }
        for line in &removed.lines {
            self.by_line.remove(*line);
        }
        Some(removed)
    }

    pub(crate) fn set_feature_type(
        &mut self,
        feature: FeatureId,
        feature_type: &str,
    ) {
        if let Some(f) = self.features.get_mut(feature) {
            f.feature_type = feature_type.to_string();
        }
    }

    pub fn get(
        &self,
        feature: FeatureId,
    ) -> Option<&Feature> {
        self.features.get(feature)
    }

    pub fn contains(
        &self,
        feature: FeatureId,
    ) -> bool {
        self.features.contains_key(feature)
    }

    pub fn by_id(
        &self,
        id: &str,
    ) -> Option<FeatureId> {
        self.by_id.get(id).copied()
    }

    /// Feature a line belongs to.
    pub fn by_line(
        &self,
        line: LineId,
    ) -> Option<FeatureId> {
        self.by_line.get(line).copied()
    }

    pub fn parents(
        &self,
        feature: FeatureId,
    ) -> &[FeatureId] {
        self.parent_map
            .get_vec(&feature)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn children(
        &self,
        feature: FeatureId,
    ) -> &[FeatureId] {
        self.children_map
            .get_vec(&feature)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Every feature reachable through child edges, in breadth-first discovery
    /// order. `feature` itself is excluded, even when a cycle leads back to it.
    pub fn descendants(
        &self,
        feature: FeatureId,
    ) -> Vec<FeatureId> {
        let mut visited: HashSet<FeatureId> = HashSet::from_iter([feature]);
        let mut queue: VecDeque<FeatureId> = VecDeque::from([feature]);
        let mut found = Vec::new();
        while let Some(current) = queue.pop_front() {
            for &child in self.children(current) {
                if visited.insert(child) {
                    found.push(child);
                    queue.push_back(child);
                }
            }
        }
        found
    }

    /// Features in the order their first line appears.
    pub fn iter(&self) -> impl Iterator<Item = (FeatureId, &Feature)> {
        self.order
            .iter()
            .map(|&id| (id, &self.features[id]))
    }

    pub fn len(&self) -> usize { self.features.len() }

    pub fn is_empty(&self) -> bool { self.features.is_empty() }
}
