use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{ImpactError, Result};
use crate::models::RawRecord;

pub const REQUIRED_COLUMNS: [&str; 6] = ["Industry", "Year", "Metric", "Attribute", "Scenario", "Value"];

pub struct LoadedInput {
    pub files: Vec<PathBuf>,
    pub records: Vec<RawRecord>,
    /// SHA-256 over every input file's name and bytes, in load order.
    pub fingerprint: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn file_label(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_string()
}

/// Years sometimes arrive as "2035.0" when the exporting tool widened the
/// column to floats.
pub fn parse_year(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(y) = raw.parse::<i64>() {
        return Some(y);
    }
    let f: f64 = raw.parse().ok()?;
    (f.is_finite() && f.fract() == 0.0).then_some(f as i64)
}

/// An empty cell is a missing value and is skipped when summing.
pub fn parse_value(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(f64::NAN);
    }
    raw.replace(',', "").parse().ok()
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// All `*.csv` files directly inside `dir`, sorted by path.
pub fn discover(dir: &Path) -> Result<Vec<PathBuf>> {
    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    let pattern = format!("{escaped}/*.csv");
    let mut files = Vec::new();
    let paths = glob::glob(&pattern)
        .map_err(|e| ImpactError::Settings(format!("invalid data directory pattern: {e}")))?;
    for entry in paths {
        let path = entry.map_err(|e| e.into_error())?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    if files.is_empty() {
        return Err(ImpactError::NoInputFiles(dir.display().to_string()));
    }
    Ok(files)
}

pub fn fingerprint(files: &[PathBuf]) -> Result<String> {
    let mut hasher = Sha256::new();
    for path in files {
        hasher.update(file_label(path).as_bytes());
        hasher.update(std::fs::read(path)?);
    }
    Ok(hex::encode(hasher.finalize()))
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Read one CSV file. Columns are located by header name; every other column,
/// including the exported row index, is ignored.
pub fn read_file(path: &Path) -> Result<Vec<RawRecord>> {
    let file = std::fs::File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(std::io::BufReader::new(file));
    let label = file_label(path);

    let headers = rdr.headers()?.clone();
    let mut idx = [0usize; 6];
    for (slot, column) in idx.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h.trim() == column)
            .ok_or_else(|| ImpactError::MissingColumn {
                file: label.clone(),
                column: column.to_string(),
            })?;
    }
    let [i_industry, i_year, i_metric, i_attribute, i_scenario, i_value] = idx;

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let field = |i: usize| record.get(i).unwrap_or("").trim();

        let year = parse_year(field(i_year)).ok_or_else(|| ImpactError::Parse {
            file: label.clone(),
            line,
            message: format!("invalid Year '{}'", field(i_year)),
        })?;
        let value = parse_value(field(i_value)).ok_or_else(|| ImpactError::Parse {
            file: label.clone(),
            line,
            message: format!("invalid Value '{}'", field(i_value)),
        })?;

        rows.push(RawRecord {
            industry: field(i_industry).to_string(),
            year,
            metric: field(i_metric).to_string(),
            attribute: field(i_attribute).to_string(),
            scenario: field(i_scenario).to_string(),
            value,
            source: Some((label.clone(), line)),
        });
    }
    debug!(file = %label, rows = rows.len(), "read input file");
    Ok(rows)
}

/// Discover and concatenate every CSV in `dir`. One bad file aborts the load.
pub fn load_dir(dir: &Path) -> Result<LoadedInput> {
    let files = discover(dir)?;
    let mut records = Vec::new();
    for path in &files {
        records.extend(read_file(path)?);
    }
    let fingerprint = fingerprint(&files)?;
    info!(
        files = files.len(),
        rows = records.len(),
        dir = %dir.display(),
        "loaded input"
    );
    Ok(LoadedInput {
        files,
        records,
        fingerprint,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = ",Industry,Year,Metric,Attribute,Scenario,Value\n";

    fn write_csv(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, format!("{HEADER}{body}")).unwrap();
        path
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year("2035"), Some(2035));
        assert_eq!(parse_year(" 2109 "), Some(2109));
        assert_eq!(parse_year("2035.0"), Some(2035));
        assert_eq!(parse_year("2035.5"), None);
        assert_eq!(parse_year("soon"), None);
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("100"), Some(100.0));
        assert_eq!(parse_value("1,234.5"), Some(1234.5));
        assert!(parse_value("").unwrap().is_nan());
        assert_eq!(parse_value("abc"), None);
    }

    #[test]
    fn test_read_file_drops_index_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "a.csv",
            "0,Mining,2035,10Employment,Direct,Base Case,100\n",
        );
        let rows = read_file(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].industry, "Mining");
        assert_eq!(rows[0].year, 2035);
        assert_eq!(rows[0].metric, "10Employment");
        assert_eq!(rows[0].value, 100.0);
        assert_eq!(rows[0].source, Some(("a.csv".to_string(), 2)));
    }

    #[test]
    fn test_read_file_columns_located_by_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("b.csv");
        std::fs::write(
            &path,
            "Value,Scenario,Attribute,Metric,Year,Industry,Unnamed: 0\n42.5,Higher Receipt,Total,12Output,2040,Trade,7\n",
        )
        .unwrap();
        let rows = read_file(&path).unwrap();
        assert_eq!(rows[0].scenario, "Higher Receipt");
        assert_eq!(rows[0].industry, "Trade");
        assert_eq!(rows[0].value, 42.5);
    }

    #[test]
    fn test_read_file_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.csv");
        std::fs::write(&path, "Industry,Year,Metric,Attribute,Value\nMining,2035,10Employment,Direct,1\n")
            .unwrap();
        let err = read_file(&path).unwrap_err();
        assert!(matches!(
            err,
            ImpactError::MissingColumn { ref column, .. } if column == "Scenario"
        ));
    }

    #[test]
    fn test_read_file_bad_year_reports_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "d.csv",
            "0,Mining,2035,10Employment,Direct,Base Case,1\n1,Mining,later,10Employment,Direct,Base Case,1\n",
        );
        match read_file(&path).unwrap_err() {
            ImpactError::Parse { file, line, .. } => {
                assert_eq!(file, "d.csv");
                assert_eq!(line, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_dir_concatenates_sorted_files() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "b.csv", "0,Trade,2040,10Employment,Direct,Base Case,2\n");
        write_csv(dir.path(), "a.csv", "0,Mining,2035,10Employment,Direct,Base Case,1\n");
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let input = load_dir(dir.path()).unwrap();
        assert_eq!(input.files.len(), 2);
        assert_eq!(input.records.len(), 2);
        assert_eq!(input.records[0].industry, "Mining");
        assert_eq!(input.fingerprint.len(), 64);
    }

    #[test]
    fn test_load_dir_empty_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_dir(dir.path()),
            Err(ImpactError::NoInputFiles(_))
        ));
    }

    #[test]
    fn test_fingerprint_changes_with_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "a.csv", "0,Mining,2035,10Employment,Direct,Base Case,1\n");
        let before = fingerprint(&[path.clone()]).unwrap();
        assert_eq!(before, fingerprint(&[path.clone()]).unwrap());
        write_csv(dir.path(), "a.csv", "0,Mining,2035,10Employment,Direct,Base Case,2\n");
        assert_ne!(before, fingerprint(&[path]).unwrap());
    }
}
