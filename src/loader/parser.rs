use crate::types::PedigreeRow;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Field separator used by a pedigree input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// `.ped` and `.txt`: columns separated by tabs or spaces
    Whitespace,
    /// `.csv`: columns separated by commas
    Comma,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|extension| extension.to_str())
            .map(|extension| extension.to_lowercase())
            .with_context(|| format!("Input file {:?} has no extension", path))?;

        match extension.as_str() {
            "ped" | "txt" => Ok(InputFormat::Whitespace),
            "csv" => Ok(InputFormat::Comma),
            other => bail!("Unsupported pedigree file extension: .{}", other),
        }
    }

    fn split<'a>(&self, line: &'a str) -> Vec<&'a str> {
        match self {
            InputFormat::Whitespace => line.split_whitespace().collect(),
            InputFormat::Comma => line.split(',').map(str::trim).collect(),
        }
    }
}

/// Reads pedigree rows from a PED, TXT or CSV file
#[derive(Debug, Clone)]
pub struct PedigreeLoader {
    path: PathBuf,
    format: InputFormat,
}

impl PedigreeLoader {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let format = InputFormat::from_path(&path)?;
        Ok(Self { path, format })
    }

    pub fn format(&self) -> InputFormat {
        self.format
    }

    pub fn load_rows(&self) -> Result<Vec<PedigreeRow>> {
        debug!("Loading pedigree rows from {:?}", self.path);

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read pedigree file {:?}", self.path))?;

        let rows = parse_rows(&content, self.format)
            .with_context(|| format!("Failed to parse pedigree file {:?}", self.path))?;

        info!("Loaded {} rows from {:?}", rows.len(), self.path);
        Ok(rows)
    }
}

/// Parse pedigree rows from text.
///
/// The first non-blank line may be a header naming the columns (optionally prefixed with `#`),
/// in which case columns can appear in any order. Without a header the PED order is assumed.
pub fn parse_rows(content: &str, format: InputFormat) -> Result<Vec<PedigreeRow>> {
    let mut lines = content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .peekable();

    let mut order: Vec<usize> = (0..PedigreeRow::COLUMNS.len()).collect();

    if let Some(&(_, first)) = lines.peek() {
        let fields = format.split(first.trim_start_matches('#'));
        if is_header(&fields) {
            order = column_order(&fields)?;
            debug!("Pedigree header found, column order {:?}", order);
            lines.next();
        }
    }

    let mut rows = Vec::new();
    for (number, line) in lines {
        let fields = format.split(line);
        if fields.len() != order.len() {
            bail!(
                "Line {} has {} columns, expected {}",
                number + 1,
                fields.len(),
                order.len()
            );
        }

        let ordered: Vec<&str> = order.iter().map(|&index| fields[index]).collect();
        let row = PedigreeRow::from_fields(&ordered)
            .with_context(|| format!("Invalid pedigree row on line {}", number + 1))?;
        rows.push(row);
    }

    Ok(rows)
}

fn is_header(fields: &[&str]) -> bool {
    fields
        .first()
        .map(|field| PedigreeRow::COLUMNS.contains(&field.trim()))
        .unwrap_or(false)
}

/// For each canonical column, the position it has in the header
fn column_order(header: &[&str]) -> Result<Vec<usize>> {
    for name in header {
        if !PedigreeRow::COLUMNS.contains(&name.trim()) {
            bail!("Unknown pedigree column: {}", name);
        }
    }

    PedigreeRow::COLUMNS
        .iter()
        .map(|column| {
            header
                .iter()
                .position(|name| name.trim() == *column)
                .with_context(|| format!("Missing pedigree column: {}", column))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Role, Sex};
    use tempfile::TempDir;

    const PED_CONTENT: &str = "\
#pedigree_identifier\tindividual_identifier\tindividual_father\tindividual_mother\tindividual_sex\tindividual_status\tindividual_role
fam1\tfather\t0\t0\t1\t1\tfather
fam1\tmother\t0\t0\t2\t1\tmother

fam1\tson1\tfather\tmother\t1\t2\tprb
";

    #[test]
    fn test_format_from_extension() {
        assert_eq!(InputFormat::from_path(Path::new("a.ped")).unwrap(), InputFormat::Whitespace);
        assert_eq!(InputFormat::from_path(Path::new("a.TXT")).unwrap(), InputFormat::Whitespace);
        assert_eq!(InputFormat::from_path(Path::new("a.csv")).unwrap(), InputFormat::Comma);
        assert!(InputFormat::from_path(Path::new("a.xlsx")).is_err());
        assert!(InputFormat::from_path(Path::new("pedigree")).is_err());
    }

    #[test]
    fn test_parse_with_header() {
        let rows = parse_rows(PED_CONTENT, InputFormat::Whitespace).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].individual_id, "son1");
        assert_eq!(rows[2].father_id, "father");
        assert_eq!(rows[2].role, Role::Proband);
    }

    #[test]
    fn test_parse_without_header() {
        let content = "fam1 a 0 0 1 1 prb\nfam1 b 0 0 2 0 null\n";
        let rows = parse_rows(content, InputFormat::Whitespace).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].sex, Sex::Female);
    }

    #[test]
    fn test_parse_csv_with_reordered_header() {
        let content = "\
individual_identifier,pedigree_identifier,individual_father,individual_mother,individual_sex,individual_status,individual_role
a, fam1, 0, 0, 1, 1, prb
";
        let rows = parse_rows(content, InputFormat::Comma).unwrap();

        assert_eq!(rows[0].pedigree_id, "fam1");
        assert_eq!(rows[0].individual_id, "a");
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_rows("fam1 a 0 0 1\n", InputFormat::Whitespace).is_err());
        assert!(parse_rows("fam1 a 0 0 7 1 prb\n", InputFormat::Whitespace).is_err());

        let unknown_column = "pedigree_identifier,nickname\n";
        assert!(parse_rows(unknown_column, InputFormat::Comma).is_err());
    }

    #[test]
    fn test_load_rows_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("family.ped");
        fs::write(&path, PED_CONTENT).unwrap();

        let loader = PedigreeLoader::new(&path).unwrap();
        let rows = loader.load_rows().unwrap();

        assert_eq!(loader.format(), InputFormat::Whitespace);
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let loader = PedigreeLoader::new(temp_dir.path().join("missing.csv")).unwrap();
        assert!(loader.load_rows().is_err());
    }
}
