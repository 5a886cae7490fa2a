use crate::reports::generator::PedigreeReport;
use anyhow::Result;
use std::fmt::Write;

/// Trait for report formatters
pub trait ReportFormatter {
    fn format(&self, reports: &[PedigreeReport]) -> Result<String>;
}

/// Markdown formatter
pub struct MarkdownFormatter;

impl ReportFormatter for MarkdownFormatter {
    fn format(&self, reports: &[PedigreeReport]) -> Result<String> {
        let mut out = String::from("# Pedigree Layout Report\n");

        for report in reports {
            writeln!(out, "\n## Pedigree {}\n", report.pedigree_id)?;
            writeln!(out, "- **Status**: {}", report.status)?;
            writeln!(
                out,
                "- **Units**: {} individuals, {} mating units, {} sibship units",
                report.individuals, report.mating_units, report.sibship_units
            )?;
            if let (Some(min), Some(max)) = (report.min_generation_rank, report.max_generation_rank) {
                writeln!(out, "- **Generations**: {} to {}", min, max)?;
            }
            writeln!(
                out,
                "- **Edges**: {} mandatory, {} forbidden",
                report.mandatory_edges, report.forbidden_edges
            )?;
            writeln!(
                out,
                "- **Search**: {} cuts explored in {} ms",
                report.explored_cuts, report.solve_time_ms
            )?;

            if !report.generations.is_empty() {
                writeln!(out, "\n### Generations\n")?;
                for generation in &report.generations {
                    writeln!(out, "{}. {}", generation.rank, generation.vertices.join(", "))?;
                }
            }

            if !report.intervals.is_empty() {
                writeln!(out, "\n### Intervals\n")?;
                writeln!(out, "| Vertex | Kind | Rank | Left | Right |")?;
                writeln!(out, "|---|---|---|---|---|")?;
                for row in &report.intervals {
                    writeln!(
                        out,
                        "| {} | {} | {} | {} | {} |",
                        row.vertex,
                        row.kind,
                        row.rank.map(|rank| rank.to_string()).unwrap_or_else(|| "-".to_string()),
                        row.left,
                        row.right
                    )?;
                }
            }
        }

        Ok(out)
    }
}

/// JSON formatter
pub struct JsonFormatter;

impl ReportFormatter for JsonFormatter {
    fn format(&self, reports: &[PedigreeReport]) -> Result<String> {
        Ok(serde_json::to_string_pretty(reports)?)
    }
}

/// Plain text formatter
pub struct TextFormatter;

impl ReportFormatter for TextFormatter {
    fn format(&self, reports: &[PedigreeReport]) -> Result<String> {
        let mut out = String::from("Pedigree Layout Report\n======================\n");

        for report in reports {
            writeln!(out, "\nPedigree: {}", report.pedigree_id)?;
            writeln!(out, "Status: {}", report.status)?;
            writeln!(
                out,
                "Individuals: {}  Mating units: {}  Sibship units: {}",
                report.individuals, report.mating_units, report.sibship_units
            )?;
            writeln!(
                out,
                "Mandatory edges: {}  Forbidden edges: {}",
                report.mandatory_edges, report.forbidden_edges
            )?;
            writeln!(out, "Explored cuts: {} ({} ms)", report.explored_cuts, report.solve_time_ms)?;

            for generation in &report.generations {
                writeln!(out, "  Generation {}: {}", generation.rank, generation.vertices.join(" | "))?;
            }

            for row in &report.intervals {
                writeln!(out, "    {:<24} [{}, {}]", row.vertex, row.left, row.right)?;
            }
        }

        Ok(out)
    }
}
