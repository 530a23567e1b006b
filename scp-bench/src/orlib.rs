//! OR-Library set-covering file parser.
//!
//! Format (Beasley's OR-Library `scp*.txt` files), whitespace separated and
//! free to wrap across lines:
//!
//! - number of rows `m`, number of columns `n`
//! - the `n` column costs
//! - for each row: the number of columns covering it, then those column
//!   indices (1-based)

use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use scp_core::ScpInstance;

/// Parsed OR-Library problem (before conversion to an instance).
#[derive(Debug, Clone)]
pub struct OrlibProblem {
    /// Problem name (file stem)
    pub name: String,
    /// Number of rows
    pub num_rows: usize,
    /// Number of columns
    pub num_cols: usize,
    /// Column costs (length num_cols)
    pub costs: Vec<u32>,
    /// 0-based covering columns of each row
    pub rows: Vec<Vec<usize>>,
}

impl OrlibProblem {
    /// Number of (row, column) entries as listed in the file.
    pub fn num_entries(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Build the sparse instance.
    pub fn to_instance(&self) -> Result<ScpInstance> {
        ScpInstance::new(self.num_rows, self.num_cols, self.costs.clone(), &self.rows)
            .with_context(|| format!("Invalid SCP instance {}", self.name))
    }
}

/// Whitespace tokens tagged with their 1-based line number.
struct Tokens<'a> {
    inner: Box<dyn Iterator<Item = (usize, &'a str)> + 'a>,
}

impl<'a> Tokens<'a> {
    fn new(content: &'a str) -> Self {
        let inner = content
            .lines()
            .enumerate()
            .flat_map(|(i, line)| line.split_whitespace().map(move |tok| (i + 1, tok)));
        Self { inner: Box::new(inner) }
    }

    fn next_value<T: FromStr>(&mut self, what: &str) -> Result<(usize, T)> {
        let (line, tok) = self
            .inner
            .next()
            .ok_or_else(|| anyhow!("Unexpected end of file while reading {}", what))?;
        let value = tok
            .parse::<T>()
            .map_err(|_| anyhow!("Invalid {} '{}' at line {}", what, tok, line))?;
        Ok((line, value))
    }
}

/// Parse OR-Library SCP content.
pub fn parse_orlib_str(name: &str, content: &str) -> Result<OrlibProblem> {
    let mut tokens = Tokens::new(content);

    let (_, num_rows) = tokens.next_value::<usize>("row count")?;
    let (_, num_cols) = tokens.next_value::<usize>("column count")?;
    if num_rows == 0 || num_cols == 0 {
        bail!("Instance dimensions must be positive, got {} x {}", num_rows, num_cols);
    }

    let mut costs = Vec::with_capacity(num_cols);
    for _ in 0..num_cols {
        let (_, cost) = tokens.next_value::<u32>("column cost")?;
        costs.push(cost);
    }

    let mut rows = Vec::with_capacity(num_rows);
    for row in 0..num_rows {
        let (_, count) = tokens.next_value::<usize>("row size")?;
        let mut covering = Vec::with_capacity(count);
        for _ in 0..count {
            let (line, col) = tokens.next_value::<usize>("column index")?;
            if col == 0 || col > num_cols {
                bail!(
                    "Row {} references column {} at line {} (columns are 1..={})",
                    row + 1,
                    col,
                    line,
                    num_cols
                );
            }
            covering.push(col - 1);
        }
        rows.push(covering);
    }

    Ok(OrlibProblem {
        name: name.to_string(),
        num_rows,
        num_cols,
        costs,
        rows,
    })
}

/// Parse an OR-Library SCP file.
pub fn parse_orlib<P: AsRef<Path>>(path: P) -> Result<OrlibProblem> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to open SCP file: {}", path.display()))?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown");
    parse_orlib_str(name, &content).with_context(|| format!("Failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SMALL: &str = " 3 4
 2 3 4
 5
 2
 1 2
 2 2 3
 3 3
 4 1
";

    fn write_temp_scp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes()).expect("Failed to write temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_parse_wrapped_lines() {
        let prob = parse_orlib_str("small", SMALL).unwrap();
        assert_eq!(prob.num_rows, 3);
        assert_eq!(prob.num_cols, 4);
        assert_eq!(prob.costs, vec![2, 3, 4, 5]);
        assert_eq!(prob.rows, vec![vec![0, 1], vec![1, 2], vec![2, 3, 0]]);
        assert_eq!(prob.num_entries(), 7);

        let inst = prob.to_instance().unwrap();
        assert_eq!(inst.num_nonzeros(), 7);
        assert_eq!(inst.rows_of_col(0), &[0, 2]);
    }

    #[test]
    fn test_parse_file() {
        let file = write_temp_scp(SMALL);
        let prob = parse_orlib(file.path()).expect("Should parse SCP file");
        assert_eq!(prob.num_rows, 3);
        assert!(!prob.name.is_empty());
    }

    #[test]
    fn test_rejects_bad_column_index() {
        let err = parse_orlib_str("bad", "1 2\n1 1\n1 3\n").unwrap_err();
        assert!(err.to_string().contains("column 3"), "{}", err);

        let err = parse_orlib_str("bad", "1 2\n1 1\n1 0\n").unwrap_err();
        assert!(err.to_string().contains("column 0"), "{}", err);
    }

    #[test]
    fn test_rejects_truncated_and_garbage() {
        let err = parse_orlib_str("short", "2 2\n1 1\n1 1\n").unwrap_err();
        assert!(err.to_string().contains("end of file"), "{}", err);

        let err = parse_orlib_str("junk", "2 x\n").unwrap_err();
        assert!(err.to_string().contains("column count"), "{}", err);
    }

    #[test]
    fn test_missing_file() {
        let err = parse_orlib("/nonexistent/scp41.txt").unwrap_err();
        assert!(err.to_string().contains("Failed to open"));
    }
}
