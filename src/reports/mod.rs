pub mod formatters;
pub mod generator;
pub mod layout;

pub use formatters::{JsonFormatter, MarkdownFormatter, ReportFormatter, TextFormatter};
pub use generator::{GenerationLayout, IntervalRow, OutputFormat, PedigreeReport, ReportGenerator, ReportStatus};
pub use layout::{layout_rank, order_by_generation, GenerationRow};
