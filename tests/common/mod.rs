#![allow(dead_code)]
use std::path::PathBuf;

use gffkit::prelude::*;

pub const VERSION: &str = "##gff-version 3\n";

pub fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join("annotations.gff3")
}

pub fn fixture_text() -> String {
    std::fs::read_to_string(fixture_path()).expect("fixture is readable")
}

/// Joins tab-separated feature lines into a document with a version header.
pub fn document(lines: &[&str]) -> String {
    let mut text = VERSION.to_string();
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    text
}

/// Zero-based line index and message of every error matching `predicate`.
pub fn errors_where<F>(
    gff: &Gff3,
    predicate: F,
) -> Vec<(Option<usize>, LineError)>
where
    F: Fn(&ErrorCode) -> bool, {
    gff.errors()
        .filter(|(_, e)| predicate(&e.code))
        .map(|(line, e)| (line.line_index(), e.clone()))
        .collect()
}

pub fn errors_of_kind(
    gff: &Gff3,
    kind: ErrorKind,
) -> Vec<(Option<usize>, LineError)> {
    errors_where(gff, |code| code.kind() == kind)
}
