mod parser;
mod writer;

pub use parser::{
    parse_attributes,
    parse_feature,
    LineParser,
};
pub use writer::Gff3Writer;
