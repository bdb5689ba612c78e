use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;
use serde::{
    Deserialize,
    Serialize,
};

use crate::with_field_fn;

/// Parameters of [`Gff3::validate`](crate::data_structs::Gff3::validate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Highest number of `N` residues tolerated in a checked feature.
    pub allowed_n:       usize,
    /// Feature types whose sequence is checked for `N` residues.
    pub n_feature_types: Vec<String>,
    /// Rewrite mismatched phases instead of only reporting them.
    pub correct_phase:   bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            allowed_n:       0,
            n_feature_types: vec!["CDS".to_string()],
            correct_phase:   false,
        }
    }
}

impl ValidationConfig {
    with_field_fn!(allowed_n, usize);

    with_field_fn!(n_feature_types, Vec<String>);

    with_field_fn!(correct_phase, bool);

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("Invalid validation config")
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Invalid validation config {}", path.display()))
    }
}
