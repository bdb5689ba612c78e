use rstest::{
    fixture,
    rstest,
};

use super::*;
use crate::data_structs::line::{
    ErrorCode,
    LineRecord,
};

const HIERARCHY: &str = "##gff-version 3
##sequence-region ctg1 1 1000
ctg1\tsrc\tgene\t100\t900\t.\t+\t.\tID=gene1;Name=first
ctg1\tsrc\tmRNA\t100\t900\t.\t+\t.\tID=mRNA1;Parent=gene1
ctg1\tsrc\texon\t100\t300\t.\t+\t.\tID=exon1;Parent=mRNA1
ctg1\tsrc\texon\t500\t900\t.\t+\t.\tID=exon2;Parent=mRNA1
ctg1\tsrc\tCDS\t150\t300\t.\t+\t0\tID=cds1;Parent=mRNA1
ctg1\tsrc\tCDS\t500\t800\t.\t+\t0\tID=cds1;Parent=mRNA1
ctg1\tsrc\tgene\t950\t1000\t.\t-\t.\tID=gene2
";

#[fixture]
fn hierarchy() -> Gff3 { Gff3::parse(HIERARCHY) }

fn codes(line: &LineRecord) -> Vec<ErrorCode> {
    line.errors()
        .iter()
        .map(|e| e.code)
        .collect()
}

#[rstest]
fn test_groups_lines_by_id(hierarchy: Gff3) {
    assert_eq!(hierarchy.graph().len(), 6);
    let cds = hierarchy.feature_by_id("cds1").unwrap();
    let feature = hierarchy.feature(cds).unwrap();
    assert_eq!(feature.lines().len(), 2);
    assert_eq!(feature.feature_type(), "CDS");
    assert_eq!(hierarchy.error_count(), 0);
}

#[rstest]
fn test_parents_and_children(hierarchy: Gff3) {
    let gene = hierarchy.feature_by_id("gene1").unwrap();
    let mrna = hierarchy.feature_by_id("mRNA1").unwrap();
    assert_eq!(hierarchy.parents(mrna), &[gene]);
    assert_eq!(hierarchy.children(gene), &[mrna]);
    assert_eq!(hierarchy.children(mrna).len(), 3);
    assert!(hierarchy
        .children(hierarchy.feature_by_id("exon1").unwrap())
        .is_empty());
}

#[rstest]
fn test_descendants_breadth_first(hierarchy: Gff3) {
    let gene = hierarchy.feature_by_id("gene1").unwrap();
    let names: Vec<&str> = hierarchy
        .descendants(gene)
        .into_iter()
        .map(|f| hierarchy.feature(f).unwrap().id().unwrap())
        .collect();
    assert_eq!(names, vec!["mRNA1", "exon1", "exon2", "cds1"]);

    let leaf = hierarchy.feature_by_id("exon2").unwrap();
    assert!(hierarchy.descendants(leaf).is_empty());
}

#[rstest]
fn test_overlap_is_symmetric(hierarchy: Gff3) {
    let exon1 = hierarchy.feature_by_id("exon1").unwrap();
    let cds = hierarchy.feature_by_id("cds1").unwrap();
    let exon2 = hierarchy.feature_by_id("exon2").unwrap();
    let gene2 = hierarchy.feature_by_id("gene2").unwrap();

    for (a, b, expected) in [(exon1, cds, true), (exon1, exon2, false), (exon2, gene2, false)] {
        assert_eq!(hierarchy.overlap(a, b), expected);
        assert_eq!(hierarchy.overlap(b, a), expected);
    }
}

#[test]
fn test_unresolved_parent_has_no_edge() {
    let gff = Gff3::parse(
        "##gff-version 3\nctg1\tsrc\tgene\t1\t100\t.\t+\t.\tID=gene1;Parent=gene0\n",
    );
    let gene = gff.feature_by_id("gene1").unwrap();
    assert!(gff.parents(gene).is_empty());
    let line = gff.feature_lines(gene).next().unwrap();
    assert_eq!(codes(line), vec![ErrorCode::UnresolvedParent]);
}

#[test]
fn test_forward_references_resolve() {
    let gff = Gff3::parse(
        "##gff-version 3
ctg1\tsrc\tmRNA\t1\t100\t.\t+\t.\tID=mRNA1;Parent=gene1
ctg1\tsrc\tgene\t1\t100\t.\t+\t.\tID=gene1
",
    );
    let mrna = gff.feature_by_id("mRNA1").unwrap();
    assert_eq!(gff.parents(mrna), &[gff.feature_by_id("gene1").unwrap()]);
    assert_eq!(gff.error_count(), 0);
}

#[test]
fn test_type_conflict_and_overlapping_segments() {
    let gff = Gff3::parse(
        "##gff-version 3
ctg1\tsrc\tCDS\t1\t100\t.\t+\t0\tID=cds1
ctg1\tsrc\texon\t200\t300\t.\t+\t.\tID=cds1
ctg1\tsrc\tCDS\t50\t150\t.\t+\t0\tID=cds1
",
    );
    let lines: Vec<&LineRecord> = gff.lines().collect();
    assert!(codes(lines[1]).is_empty());
    assert_eq!(codes(lines[2]), vec![ErrorCode::TypeConflict]);
    assert_eq!(codes(lines[3]), vec![ErrorCode::OverlappingSegments]);
}

#[test]
fn test_cycle_is_reported_and_traversal_terminates() {
    let gff = Gff3::parse(
        "##gff-version 3
ctg1\tsrc\tgene\t1\t100\t.\t+\t.\tID=a;Parent=c
ctg1\tsrc\tgene\t1\t100\t.\t+\t.\tID=b;Parent=a
ctg1\tsrc\tgene\t1\t100\t.\t+\t.\tID=c;Parent=b
",
    );
    let a = gff.feature_by_id("a").unwrap();
    let descendants = gff.descendants(a);
    assert_eq!(descendants.len(), 2);
    assert!(!descendants.contains(&a));

    let cycles = gff
        .errors()
        .filter(|(_, e)| e.code == ErrorCode::ParentCycle)
        .count();
    assert_eq!(cycles, 1);
}

#[rstest]
fn test_adopt_rewrites_parent(mut hierarchy: Gff3) {
    let mrna = hierarchy.feature_by_id("mRNA1").unwrap();
    let gene1 = hierarchy.feature_by_id("gene1").unwrap();
    let gene2 = hierarchy.feature_by_id("gene2").unwrap();

    hierarchy.adopt(mrna, gene2).unwrap();

    assert_eq!(hierarchy.parents(mrna), &[gene2]);
    assert!(hierarchy.children(gene1).is_empty());
    assert_eq!(hierarchy.children(gene2), &[mrna]);
    let line = hierarchy.feature_lines(mrna).next().unwrap();
    assert!(line.is_modified());
    assert_eq!(line.feature().unwrap().attributes.parents(), &["gene2".to_string()]);
    assert!(hierarchy
        .serialize()
        .contains("ctg1\tsrc\tmRNA\t100\t900\t.\t+\t.\tID=mRNA1;Parent=gene2\n"));
}

#[rstest]
fn test_adopt_appends_missing_parent(mut hierarchy: Gff3) {
    let gene2 = hierarchy.feature_by_id("gene2").unwrap();
    let gene1 = hierarchy.feature_by_id("gene1").unwrap();
    hierarchy.adopt(gene2, gene1).unwrap();
    assert!(hierarchy
        .serialize()
        .contains("\tID=gene2;Parent=gene1\n"));
}

#[rstest]
fn test_adopt_rejects_unknown_feature(mut hierarchy: Gff3) {
    let mrna = hierarchy.feature_by_id("mRNA1").unwrap();
    let gene2 = hierarchy.feature_by_id("gene2").unwrap();
    hierarchy.remove(gene2).unwrap();
    let before = hierarchy.serialize();

    assert!(hierarchy.adopt(mrna, gene2).is_err());
    assert_eq!(hierarchy.serialize(), before);
}

#[rstest]
fn test_remove_detaches_edges(mut hierarchy: Gff3) {
    let mrna = hierarchy.feature_by_id("mRNA1").unwrap();
    let gene = hierarchy.feature_by_id("gene1").unwrap();
    let exon1 = hierarchy.feature_by_id("exon1").unwrap();

    let removed = hierarchy.remove(mrna).unwrap();
    assert_eq!(removed.len(), 1);
    assert!(hierarchy.feature_by_id("mRNA1").is_none());
    assert!(hierarchy.children(gene).is_empty());
    assert!(hierarchy.parents(exon1).is_empty());
    assert_eq!(hierarchy.len(), 8);
    assert!(hierarchy.remove(mrna).is_err());

    hierarchy.check_structure();
    let unresolved = hierarchy
        .errors()
        .filter(|(_, e)| e.code == ErrorCode::UnresolvedParent)
        .count();
    assert_eq!(unresolved, 4);
}

#[rstest]
fn test_set_feature_type(mut hierarchy: Gff3) {
    let cds = hierarchy.feature_by_id("cds1").unwrap();
    hierarchy
        .set_feature_type(cds, "five_prime_UTR")
        .unwrap();
    assert_eq!(hierarchy.feature(cds).unwrap().feature_type(), "five_prime_UTR");
    assert_eq!(hierarchy.features_of_type("five_prime_UTR").count(), 1);
    assert_eq!(hierarchy.features_of_type("CDS").count(), 0);
}

#[test]
fn test_embedded_fasta_is_indexed() {
    let gff = Gff3::parse(
        "##gff-version 3
##sequence-region ctg1 1 8
ctg1\tsrc\tgene\t1\t8\t.\t+\t.\tID=gene1
##FASTA
>ctg1
ACGT
NNNN
>ctg2
GG
",
    );
    assert_eq!(gff.references().sequence("ctg1"), Some(&b"ACGTNNNN"[..]));
    assert_eq!(gff.references().length("ctg2"), Some(2));
    assert_eq!(gff.error_count(), 0);
}

#[test]
fn test_insert_missing_sequence_regions() {
    let mut gff = Gff3::parse(
        "##gff-version 3
ctg1\tsrc\tgene\t1\t4\t.\t+\t.\tID=gene1
ctg2\tsrc\tgene\t1\t2\t.\t+\t.\tID=gene2
",
    );
    gff.set_external_sequences([("ctg1", b"ACGT".to_vec()), ("ctg3", b"A".to_vec())]);

    assert_eq!(gff.insert_missing_sequence_regions(), 1);
    assert_eq!(gff.insert_missing_sequence_regions(), 0);
    assert!(gff
        .serialize()
        .starts_with("##gff-version 3\n##sequence-region ctg1 1 4\nctg1\t"));
    assert_eq!(gff.line(gff.line_ids()[1]).unwrap().line_index(), None);
}
