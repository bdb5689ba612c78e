use std::fmt::Display;
use std::str::FromStr;

use serde::{
    Deserialize,
    Serialize,
};

/// Strand of a feature line (column 7).
#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug, PartialOrd, Ord, Default)]
pub enum Strand {
    /// `+`
    Forward,
    /// `-`
    Reverse,
    /// `?`, stranded but unknown.
    Unknown,
    /// `.`, strand is not relevant.
    #[default]
    NotApplicable,
}

impl Strand {
    pub fn symbol(&self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
            Strand::Unknown => '?',
            Strand::NotApplicable => '.',
        }
    }

    /// Whether the strand fixes a reading direction.
    pub fn is_oriented(&self) -> bool {
        matches!(self, Strand::Forward | Strand::Reverse)
    }
}

impl FromStr for Strand {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            "?" => Ok(Strand::Unknown),
            "." => Ok(Strand::NotApplicable),
            other => anyhow::bail!("strand must be one of +, -, ?, ., got {:?}", other),
        }
    }
}

impl Display for Strand {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl From<Strand> for Option<bool> {
    fn from(value: Strand) -> Option<bool> {
        match value {
            Strand::Forward => Some(true),
            Strand::Reverse => Some(false),
            Strand::Unknown | Strand::NotApplicable => None,
        }
    }
}

impl Serialize for Strand {
    fn serialize<S>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer, {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Strand {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>, {
        let s = String::deserialize(deserializer)?;
        Strand::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Classification tag of a parsed line.
#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineKind {
    Comment,
    Directive,
    Feature,
    Blank,
    FastaHeader,
    FastaSequence,
}

impl Display for LineKind {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        let name = match self {
            LineKind::Comment => "comment",
            LineKind::Directive => "directive",
            LineKind::Feature => "feature",
            LineKind::Blank => "blank",
            LineKind::FastaHeader => "fasta-header",
            LineKind::FastaSequence => "fasta-sequence",
        };
        write!(f, "{}", name)
    }
}
