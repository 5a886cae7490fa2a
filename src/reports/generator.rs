use crate::graph::{PedigreeGraph, Vertex, VertexKind};
use crate::pedigree::PedigreeFamily;
use crate::reports::formatters::{JsonFormatter, MarkdownFormatter, ReportFormatter, TextFormatter};
use crate::reports::layout::{layout_rank, order_by_generation};
use crate::sandwich::SolveOutcome;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Markdown,
    Text,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(format: &str) -> Result<Self> {
        match format.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "text" | "txt" => Ok(OutputFormat::Text),
            _ => Err(anyhow::anyhow!("Unsupported format: {}", format)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Text => write!(f, "text"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Realized,
    NoRealization,
    BudgetExhausted,
    TimedOut,
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportStatus::Realized => write!(f, "realized"),
            ReportStatus::NoRealization => write!(f, "no realization"),
            ReportStatus::BudgetExhausted => write!(f, "budget exhausted"),
            ReportStatus::TimedOut => write!(f, "timed out"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationLayout {
    pub rank: i32,
    pub vertices: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalRow {
    pub vertex: String,
    pub kind: VertexKind,
    pub rank: Option<i32>,
    pub left: f64,
    pub right: f64,
}

/// Layout result of one pedigree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PedigreeReport {
    pub pedigree_id: String,
    pub individuals: usize,
    pub mating_units: usize,
    pub sibship_units: usize,
    pub min_generation_rank: Option<i32>,
    pub max_generation_rank: Option<i32>,
    pub mandatory_edges: usize,
    pub forbidden_edges: usize,
    pub status: ReportStatus,
    pub explored_cuts: usize,
    pub solve_time_ms: u64,
    pub generations: Vec<GenerationLayout>,
    pub intervals: Vec<IntervalRow>,
    pub generated_at: DateTime<Utc>,
}

impl PedigreeReport {
    pub fn new(family: &PedigreeFamily, graph: &PedigreeGraph, outcome: &SolveOutcome<Vertex>, elapsed: Duration) -> Self {
        let status = match outcome {
            SolveOutcome::Realized { .. } => ReportStatus::Realized,
            SolveOutcome::NoRealization { .. } => ReportStatus::NoRealization,
            SolveOutcome::BudgetExhausted { .. } => ReportStatus::BudgetExhausted,
            SolveOutcome::TimedOut { .. } => ReportStatus::TimedOut,
        };

        let mut report = Self::summary(family, graph, status, elapsed);
        report.explored_cuts = outcome.explored_cuts();

        if let Some(intervals) = outcome.intervals() {
            report.generations = order_by_generation(family, intervals)
                .into_iter()
                .map(|row| GenerationLayout {
                    rank: row.rank,
                    vertices: row.vertices.iter().map(|vertex| vertex.label(family)).collect(),
                })
                .collect();

            report.intervals = intervals
                .iter()
                .map(|placed| IntervalRow {
                    vertex: placed.vertex.label(family),
                    kind: placed.vertex.kind(),
                    rank: layout_rank(placed.vertex, family),
                    left: placed.interval.left,
                    right: placed.interval.right,
                })
                .collect();
        }

        report
    }

    fn summary(family: &PedigreeFamily, graph: &PedigreeGraph, status: ReportStatus, elapsed: Duration) -> Self {
        Self {
            pedigree_id: family.pedigree_id().to_string(),
            individuals: family.individual_count(),
            mating_units: family.mating_unit_count(),
            sibship_units: family.sibship_unit_count(),
            min_generation_rank: family.min_generation_rank(),
            max_generation_rank: family.max_generation_rank(),
            mandatory_edges: graph.mandatory_edges().len(),
            forbidden_edges: graph.forbidden_edges().len(),
            status,
            explored_cuts: 0,
            solve_time_ms: elapsed.as_millis() as u64,
            generations: Vec::new(),
            intervals: Vec::new(),
            generated_at: Utc::now(),
        }
    }

    pub fn is_realized(&self) -> bool {
        self.status == ReportStatus::Realized
    }
}

/// Report generator for creating various output formats
pub struct ReportGenerator {
    include_intervals: bool,
}

impl ReportGenerator {
    pub fn new(include_intervals: bool) -> Self {
        Self { include_intervals }
    }

    /// Generate reports in the specified format
    pub fn generate(&self, reports: &[PedigreeReport], format: OutputFormat) -> Result<String> {
        let formatter: Box<dyn ReportFormatter> = match format {
            OutputFormat::Json => Box::new(JsonFormatter),
            OutputFormat::Markdown => Box::new(MarkdownFormatter),
            OutputFormat::Text => Box::new(TextFormatter),
        };

        if self.include_intervals {
            return formatter.format(reports);
        }

        let trimmed: Vec<PedigreeReport> = reports
            .iter()
            .cloned()
            .map(|mut report| {
                report.intervals.clear();
                report
            })
            .collect();
        formatter.format(&trimmed)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new(true)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("pdf".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_report_from_realization() {
        let report = test_support::nuclear_family_report();

        assert!(report.is_realized());
        assert_eq!(report.individuals, 6);
        assert_eq!(report.mandatory_edges, 7);
        assert_eq!(report.forbidden_edges, 7);
        assert_eq!(report.intervals.len(), 8);
        assert_eq!(report.generations.len(), 2);
        assert_eq!(report.generations[1].vertices.len(), 5);
        assert!(report.generations[0].vertices.contains(&"MU(father, mother)".to_string()));
        assert_eq!(report.solve_time_ms, 3);
    }

    #[test]
    fn test_generate_without_intervals() {
        let report = test_support::nuclear_family_report();
        let generator = ReportGenerator::new(false);
        let json = generator.generate(&[report], OutputFormat::Json).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["intervals"].as_array().unwrap().len(), 0);
        assert_eq!(value[0]["status"], "realized");
    }
}
