mod common;

use common::{
    document,
    errors_where,
};
use gffkit::prelude::*;
use rstest::{
    fixture,
    rstest,
};

#[fixture]
fn fixture_gff() -> Gff3 { Gff3::from_path(common::fixture_path()).unwrap() }

#[rstest]
fn test_adopt_moves_every_member_line(mut fixture_gff: Gff3) {
    let cds = fixture_gff.feature_by_id("cds1").unwrap();
    let gene1 = fixture_gff.feature_by_id("gene1").unwrap();
    let mrna = fixture_gff.feature_by_id("mRNA1").unwrap();

    fixture_gff.adopt(cds, gene1).unwrap();

    for line in fixture_gff.feature_lines(cds) {
        let parents = line.feature().unwrap().attributes.parents();
        assert_eq!(parents, &["gene1".to_string()]);
    }
    assert_eq!(fixture_gff.parents(cds), &[gene1]);
    assert!(!fixture_gff.children(mrna).contains(&cds));
    assert!(fixture_gff.children(gene1).contains(&cds));
}

#[rstest]
fn test_adopt_requires_referenceable_parent() {
    let mut gff = Gff3::parse(&document(&[
        "ctg1\t.\tgene\t1\t100\t.\t+\t.\tID=gene1",
        "ctg1\t.\tregion\t1\t100\t.\t+\t.\tName=anonymous",
    ]));
    let gene = gff.feature_by_id("gene1").unwrap();
    let anonymous = gff
        .features()
        .find(|(_, f)| f.is_anonymous())
        .map(|(id, _)| id)
        .unwrap();
    let before = gff.serialize();

    assert!(gff.adopt(gene, anonymous).is_err());
    assert!(gff.adopt(gene, gene).is_err());
    assert_eq!(gff.serialize(), before);
}

#[rstest]
fn test_remove_surfaces_unresolved_children(mut fixture_gff: Gff3) {
    let mrna = fixture_gff.feature_by_id("mRNA1").unwrap();
    let cds = fixture_gff.feature_by_id("cds1").unwrap();
    let gene1 = fixture_gff.feature_by_id("gene1").unwrap();
    fixture_gff.adopt(cds, gene1).unwrap();

    let removed = fixture_gff.remove(mrna).unwrap();
    assert_eq!(removed[0].raw(), "ctg1\t.\tmRNA\t1\t40\t.\t+\t.\tID=mRNA1;Parent=gene1");
    assert!(!fixture_gff.serialize().contains("ID=mRNA1"));

    fixture_gff.validate(&ValidationConfig::default());
    let unresolved = errors_where(&fixture_gff, |c| *c == ErrorCode::UnresolvedParent);
    let lines: Vec<Option<usize>> = unresolved.iter().map(|(l, _)| *l).collect();
    assert_eq!(lines, vec![Some(5), Some(6)]);
    assert!(unresolved[0].1.message.contains("mRNA1"));
}

#[rstest]
fn test_descendants_after_mutation(mut fixture_gff: Gff3) {
    let gene1 = fixture_gff.feature_by_id("gene1").unwrap();
    let pseudo = fixture_gff.feature_by_id("pseudo1").unwrap();
    assert_eq!(fixture_gff.descendants(gene1).len(), 4);

    fixture_gff.adopt(pseudo, gene1).unwrap();
    assert_eq!(fixture_gff.descendants(gene1).len(), 6);
    assert_eq!(fixture_gff.descendants(pseudo).len(), 1);
}

#[test]
fn test_descendants_terminate_on_self_cycle() {
    let gff = Gff3::parse(&document(&[
        "ctg1\t.\tgene\t1\t100\t.\t+\t.\tID=a;Parent=a",
        "ctg1\t.\tmRNA\t1\t100\t.\t+\t.\tID=b;Parent=a,b",
    ]));
    let a = gff.feature_by_id("a").unwrap();
    let b = gff.feature_by_id("b").unwrap();
    assert_eq!(gff.descendants(a), vec![b]);
    assert!(gff.descendants(b).is_empty());
    let cycles = errors_where(&gff, |c| *c == ErrorCode::ParentCycle);
    assert_eq!(cycles.len(), 2);
}

#[rstest]
fn test_clear_then_revalidate_drops_stale_errors(mut fixture_gff: Gff3) {
    let pexon = fixture_gff.feature_by_id("pexon1").unwrap();
    let gene2 = fixture_gff.feature_by_id("gene2").unwrap();
    let pseudo = fixture_gff.feature_by_id("pseudo1").unwrap();

    fixture_gff.adopt(pexon, gene2).unwrap();
    fixture_gff.validate(&ValidationConfig::default());
    assert_eq!(
        errors_where(&fixture_gff, |c| *c == ErrorCode::OutOfParentBounds).len(),
        1
    );

    fixture_gff.adopt(pexon, pseudo).unwrap();
    fixture_gff.clear_validation_errors();
    let summary = fixture_gff.validate(&ValidationConfig::default());
    assert_eq!(summary.errors, 0);
    assert!(errors_where(&fixture_gff, |c| *c == ErrorCode::OutOfParentBounds).is_empty());
}

#[rstest]
fn test_overlap_across_seqids(fixture_gff: Gff3) {
    let gene1 = fixture_gff.feature_by_id("gene1").unwrap();
    let gene2 = fixture_gff.feature_by_id("gene2").unwrap();
    let exon1 = fixture_gff.feature_by_id("exon1").unwrap();
    assert!(!fixture_gff.overlap(gene1, gene2));
    assert!(fixture_gff.overlap(gene1, exon1));
    assert_eq!(
        fixture_gff.overlap(exon1, gene1),
        fixture_gff.overlap(gene1, exon1)
    );
}
