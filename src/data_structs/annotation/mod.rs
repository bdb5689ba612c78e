mod document;
mod graph;

pub use document::Gff3;
pub(crate) use graph::unresolved_parent_message;
pub use graph::{
    Feature,
    FeatureGraph,
    FeatureId,
    LineId,
};

#[cfg(test)]
mod tests;
