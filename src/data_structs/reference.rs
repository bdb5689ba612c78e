use hashbrown::HashMap;
use log::{
    debug,
    warn,
};

use super::coords::Span;

#[derive(Debug, Default, Clone)]
struct ReferenceEntry {
    region:   Option<Span>,
    embedded: Option<Vec<u8>>,
    external: Option<Vec<u8>>,
}

/// Residues returned by [`ReferenceIndex::subsequence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subsequence<'a> {
    pub residues: &'a [u8],
    /// The request reached past the end of the sequence and was cut short.
    pub clamped:  bool,
}

impl Subsequence<'_> {
    /// Case-insensitive count of `N` residues.
    pub fn count_n(&self) -> usize {
        self.residues
            .iter()
            .filter(|b| b.eq_ignore_ascii_case(&b'N'))
            .count()
    }
}

/// Reference sequences known to a document, keyed by seqid.
///
/// Three layers are kept per name: the `##sequence-region` declaration, the
/// residues embedded after `##FASTA`, and residues supplied from an external
/// source. External residues take precedence over embedded ones; the declared
/// region only contributes a length.
#[derive(Debug, Default, Clone)]
pub struct ReferenceIndex {
    entries: HashMap<String, ReferenceEntry>,
}

impl ReferenceIndex {
    pub fn new() -> Self { Self::default() }

    pub fn set_region(
        &mut self,
        name: &str,
        span: Span,
    ) {
        self.entries
            .entry(name.to_string())
            .or_default()
            .region = Some(span);
    }

    pub fn set_embedded(
        &mut self,
        name: &str,
        residues: Vec<u8>,
    ) {
        self.entries
            .entry(name.to_string())
            .or_default()
            .embedded = Some(residues);
    }

    pub fn set_external(
        &mut self,
        name: &str,
        residues: Vec<u8>,
    ) {
        let entry = self
            .entries
            .entry(name.to_string())
            .or_default();
        if entry.embedded.is_some() {
            warn!("External sequence {} replaces the embedded one", name);
        }
        entry.external = Some(residues);
    }

    /// Drops every externally supplied sequence.
    pub fn clear_external(&mut self) {
        for entry in self.entries.values_mut() {
            entry.external = None;
        }
    }

    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.entries.contains_key(name)
    }

    /// Residues for `name`: external first, then embedded.
    pub fn sequence(
        &self,
        name: &str,
    ) -> Option<&[u8]> {
        let entry = self.entries.get(name)?;
        entry
            .external
            .as_deref()
            .or(entry.embedded.as_deref())
    }

    pub fn has_sequence(
        &self,
        name: &str,
    ) -> bool {
        self.sequence(name).is_some()
    }

    pub fn region(
        &self,
        name: &str,
    ) -> Option<Span> {
        self.entries
            .get(name)
            .and_then(|e| e.region)
    }

    /// End coordinate declared by `##sequence-region`.
    pub fn region_length(
        &self,
        name: &str,
    ) -> Option<u64> {
        self.region(name).map(|span| span.end())
    }

    /// Length of the residues, if any are known.
    pub fn sequence_length(
        &self,
        name: &str,
    ) -> Option<u64> {
        self.sequence(name)
            .map(|seq| seq.len() as u64)
    }

    /// Best known length: from residues, falling back to the declared region.
    pub fn length(
        &self,
        name: &str,
    ) -> Option<u64> {
        self.sequence_length(name)
            .or_else(|| self.region_length(name))
    }

    /// Slice of `name` over the 1-based inclusive `span`.
    ///
    /// Returns `None` without residues for `name`. A span reaching past the end
    /// is cut to the available residues and reported as clamped.
    pub fn subsequence(
        &self,
        name: &str,
        span: Span,
    ) -> Option<Subsequence<'_>> {
        let sequence = self.sequence(name)?;
        let length = sequence.len() as u64;
        let clamped = span.end() > length;
        let start = (span.start() - 1).min(length) as usize;
        let end = span.end().min(length) as usize;
        if clamped {
            debug!(
                "Fetch {}:{} clamped to sequence length {}",
                name, span, length
            );
        }
        Some(Subsequence {
            residues: &sequence[start..end],
            clamped,
        })
    }

    /// Names with any layer populated, in arbitrary order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

#[cfg(test)]
mod tests {
    use rstest::{
        fixture,
        rstest,
    };

    use super::*;

    #[fixture]
    fn index() -> ReferenceIndex {
        let mut index = ReferenceIndex::new();
        index.set_region("ctg1", Span::new(1, 20).unwrap());
        index.set_embedded("ctg1", b"ACGTNNNACGTacgtnACGT".to_vec());
        index.set_region("ctg2", Span::new(1, 1000).unwrap());
        index
    }

    #[rstest]
    fn test_external_takes_precedence(mut index: ReferenceIndex) {
        index.set_external("ctg1", b"AAAA".to_vec());
        assert_eq!(index.sequence("ctg1"), Some(&b"AAAA"[..]));
        assert_eq!(index.length("ctg1"), Some(4));
        assert_eq!(index.region_length("ctg1"), Some(20));

        index.clear_external();
        assert_eq!(index.length("ctg1"), Some(20));
    }

    #[rstest]
    fn test_length_falls_back_to_region(index: ReferenceIndex) {
        assert_eq!(index.length("ctg2"), Some(1000));
        assert!(index.subsequence("ctg2", Span::new(1, 10).unwrap()).is_none());
        assert_eq!(index.length("missing"), None);
    }

    #[rstest]
    fn test_subsequence_counts_n(index: ReferenceIndex) {
        let sub = index
            .subsequence("ctg1", Span::new(5, 7).unwrap())
            .unwrap();
        assert_eq!(sub.residues, b"NNN");
        assert_eq!(sub.count_n(), 3);
        assert!(!sub.clamped);

        let lower = index
            .subsequence("ctg1", Span::new(12, 16).unwrap())
            .unwrap();
        assert_eq!(lower.count_n(), 1);
    }

    #[rstest]
    #[case(15, 30, 6)]
    #[case(25, 30, 0)]
    fn test_subsequence_clamps(
        index: ReferenceIndex,
        #[case] start: u64,
        #[case] end: u64,
        #[case] expected_len: usize,
    ) {
        let sub = index
            .subsequence("ctg1", Span::new(start, end).unwrap())
            .unwrap();
        assert!(sub.clamped);
        assert_eq!(sub.residues.len(), expected_len);
    }
}
