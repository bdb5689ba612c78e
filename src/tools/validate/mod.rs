//! Validation passes over a parsed [`Gff3`] document.
//!
//! Each pass attaches errors to the lines it finds at fault and never fails.
//! Pushing an error that is already on a line is a no-op, so passes can be
//! re-run after the document was mutated. Call
//! [`Gff3::clear_validation_errors`] first to drop findings that a mutation
//! resolved.

mod boundary;
mod config;
mod phase;
mod reference;

use std::collections::BTreeMap;

use hashbrown::HashSet;
use log::info;
use serde::Serialize;

pub use boundary::check_parent_boundary;
pub use config::ValidationConfig;
pub use phase::{
    check_phase,
    correct_phase,
};
pub use reference::check_reference;

use crate::data_structs::line::{
    ErrorKind,
    Severity,
};
use crate::data_structs::Gff3;

/// Error counts of a document, per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    /// `kind -> (errors, distinct lines)`
    pub by_kind:         BTreeMap<ErrorKind, (usize, usize)>,
    pub warnings:        usize,
    pub errors:          usize,
    pub phase_corrected: usize,
}

impl ValidationSummary {
    pub fn from_document(document: &Gff3) -> Self {
        let mut summary = Self::default();
        let mut lines_seen: BTreeMap<ErrorKind, HashSet<usize>> = BTreeMap::new();
        for (position, line) in document.lines().enumerate() {
            for error in line.errors() {
                let entry = summary
                    .by_kind
                    .entry(error.kind())
                    .or_default();
                entry.0 += 1;
                if lines_seen
                    .entry(error.kind())
                    .or_default()
                    .insert(position)
                {
                    entry.1 += 1;
                }
                match error.severity() {
                    Severity::Warning => summary.warnings += 1,
                    Severity::Error => summary.errors += 1,
                }
            }
        }
        summary
    }

    pub fn total(&self) -> usize { self.warnings + self.errors }

    pub fn is_clean(&self) -> bool { self.total() == 0 }
}

impl Gff3 {
    /// See [`check_reference`].
    pub fn check_reference(
        &mut self,
        allowed_n: usize,
        types: &[String],
    ) {
        check_reference(self, allowed_n, types)
    }

    /// See [`check_parent_boundary`].
    pub fn check_parent_boundary(&mut self) { check_parent_boundary(self) }

    /// See [`check_phase`].
    pub fn check_phase(&mut self) { check_phase(self) }

    /// See [`correct_phase`].
    pub fn correct_phase(&mut self) -> usize { correct_phase(self) }

    /// Refreshes structural errors, then runs the reference, parent-boundary
    /// and phase checks in that order. With `correct_phase` set, mismatched
    /// phases are rewritten before the phase check.
    pub fn validate(
        &mut self,
        config: &ValidationConfig,
    ) -> ValidationSummary {
        info!("Validating with {:?}", config);
        self.check_structure();
        self.check_reference(config.allowed_n, &config.n_feature_types);
        self.check_parent_boundary();
        let phase_corrected = if config.correct_phase {
            self.correct_phase()
        }
        else {
            0
        };
        self.check_phase();

        let summary = ValidationSummary {
            phase_corrected,
            ..ValidationSummary::from_document(self)
        };
        info!(
            "Validation finished: {} errors, {} warnings",
            summary.errors, summary.warnings
        );
        summary
    }
}
