pub mod parser;

pub use parser::{parse_rows, InputFormat, PedigreeLoader};
