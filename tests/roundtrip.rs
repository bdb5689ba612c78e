mod common;

use std::io::Write;

use gffkit::prelude::*;
use rstest::rstest;

#[test]
fn test_fixture_round_trips() {
    let text = common::fixture_text();
    let gff = Gff3::from_path(common::fixture_path()).unwrap();
    assert_eq!(gff.serialize(), text);
    assert_eq!(gff.len(), 18);
}

#[rstest]
#[case::no_trailing_newline("##gff-version 3\nctg1\t.\tgene\t1\t10\t.\t+\t.\tID=g")]
#[case::crlf("##gff-version 3\r\nctg1\t.\tgene\t1\t10\t.\t+\t.\tID=g\r\n")]
#[case::blank_lines("\n\n##gff-version 3\n\n# note\n\n")]
#[case::empty("")]
#[case::broken_columns("##gff-version 3\nctg1 . gene 1 10\nctg1\t.\tgene\tx\t10\t.\t+\t.\tID=a;;b\n")]
#[case::encoded("##gff-version 3\nctg%201\t.\tgene\t1\t10\t.\t+\t.\tNote=a%2Cb,c;Dbxref=X:1\n")]
#[case::sequence_only("##gff-version 3\n##FASTA\n>s\nACGT\r\nNN\n")]
fn test_untouched_document_is_byte_identical(#[case] text: &str) {
    let gff = Gff3::parse(text);
    assert_eq!(gff.serialize(), text);

    let written = gff.write(Vec::new()).unwrap();
    assert_eq!(String::from_utf8(written).unwrap(), text);
}

#[test]
fn test_write_path_matches_input() {
    let gff = Gff3::from_path(common::fixture_path()).unwrap();
    let out = tempfile::NamedTempFile::new().unwrap();
    gff.write_path(out.path()).unwrap();
    assert_eq!(
        std::fs::read_to_string(out.path()).unwrap(),
        common::fixture_text()
    );
}

#[test]
fn test_from_reader() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(common::fixture_text().as_bytes())
        .unwrap();
    let gff = Gff3::from_reader(std::fs::File::open(file.path()).unwrap()).unwrap();
    assert_eq!(gff.graph().len(), 8);
}

#[test]
fn test_mutation_regenerates_only_touched_lines() {
    let text = common::fixture_text();
    let mut gff = Gff3::parse(&text);
    let gene1 = gff.feature_by_id("gene1").unwrap();
    let gene2 = gff.feature_by_id("gene2").unwrap();
    gff.adopt(gene2, gene1).unwrap();

    let out = gff.serialize();
    let changed: Vec<(&str, &str)> = text
        .lines()
        .zip(out.lines())
        .filter(|(a, b)| a != b)
        .collect();
    assert_eq!(changed.len(), 1);
    assert_eq!(
        changed[0].1,
        "ctg2\t.\tgene\t1\t20\t0.5\t+\t.\tID=gene2;Note=no region;Parent=gene1"
    );
}

#[test]
fn test_regenerated_line_is_re_encoded() {
    let text = common::document(&["ctg%201\tmy%09src\tgene\t1\t10\t.\t+\t.\tID=g;Name=a%3Bb,c%2Cd"]);
    let mut gff = Gff3::parse(&text);
    assert!(gff.errors().next().is_none());

    let gene = gff.feature_by_id("g").unwrap();
    gff.set_feature_type(gene, "pseudogene").unwrap();

    let line = gff.feature_lines(gene).next().unwrap();
    let feature = line.feature().unwrap();
    assert_eq!(feature.seqid, "ctg 1");
    assert_eq!(feature.source, "my\tsrc");
    assert_eq!(
        gff.serialize(),
        "##gff-version 3\nctg%201\tmy%09src\tpseudogene\t1\t10\t.\t+\t.\tID=g;Name=a%3Bb,c%2Cd\n"
    );

    let reparsed = Gff3::parse(&gff.serialize());
    assert_eq!(reparsed.error_count(), 0);
    assert_eq!(reparsed.lines().nth(1).unwrap().feature(), Some(feature));
}

#[test]
fn test_adopt_rewrites_line_with_unparsed_coordinates() {
    let text = common::document(&[
        "ctg1\t.\tgene\t1\t100\t.\t+\t.\tID=g1",
        "ctg1\t.\tgene\t1\t100\t.\t+\t.\tID=g2",
        "ctg1\t.\texon\tx\t10\tbad\t+\t.\tID=e;Parent=g1",
    ]);
    let mut gff = Gff3::parse(&text);
    let exon = gff.feature_by_id("e").unwrap();
    let g2 = gff.feature_by_id("g2").unwrap();
    gff.adopt(exon, g2).unwrap();

    let out = gff.serialize();
    assert!(out.ends_with("ctg1\t.\texon\tx\t10\tbad\t+\t.\tID=e;Parent=g2\n"));

    let reparsed = Gff3::parse(&out);
    let exon = reparsed.feature_by_id("e").unwrap();
    assert_eq!(reparsed.parents(exon), &[reparsed.feature_by_id("g2").unwrap()]);
}

#[test]
fn test_retype_keeps_invalid_columns() {
    let text = common::document(&["ctg1\t.\tgene\t5\t2\t.\tx\t.\tID=p"]);
    let mut gff = Gff3::parse(&text);
    let feature = gff.feature_by_id("p").unwrap();
    gff.set_feature_type(feature, "pseudogene").unwrap();
    assert_eq!(
        gff.serialize(),
        common::document(&["ctg1\t.\tpseudogene\t5\t2\t.\tx\t.\tID=p"])
    );
}

#[test]
fn test_regenerated_line_keeps_crlf() {
    let text = "##gff-version 3\r\nctg1\t.\tgene\t1\t10\t.\t+\t.\tID=a\r\nctg1\t.\tgene\t1\t10\t.\t+\t.\tID=b\r\n";
    let mut gff = Gff3::parse(text);
    let a = gff.feature_by_id("a").unwrap();
    let b = gff.feature_by_id("b").unwrap();
    gff.adopt(b, a).unwrap();
    assert_eq!(
        gff.serialize(),
        "##gff-version 3\r\nctg1\t.\tgene\t1\t10\t.\t+\t.\tID=a\r\nctg1\t.\tgene\t1\t10\t.\t+\t.\tID=b;Parent=a\r\n"
    );
}
