// ============================================================
// Layer 4 — Feature Table
// ============================================================
// A small named-column numeric matrix: just enough of a data
// frame to read feature / ground-truth CSV files, put tables
// side by side or on top of each other, and zero out columns.
//
// Values are stored row-major as f32, the precision the model
// trains in.

use std::path::Path;

use csv::ReaderBuilder;

use crate::data::DatasetError;

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    columns: Vec<String>,
    values:  Vec<f32>,
    rows:    usize,
}

impl FeatureTable {
    /// Build a table from rows. Every row must match the column count.
    pub fn from_rows(columns: Vec<String>, rows: &[Vec<f32>]) -> Self {
        let width = columns.len();
        let mut values = Vec::with_capacity(rows.len() * width);
        for row in rows {
            assert_eq!(row.len(), width, "row width must match column count");
            values.extend_from_slice(row);
        }
        Self { columns, values, rows: rows.len() }
    }

    /// Read a CSV file with a header row. Every column must be
    /// numeric except those listed in `skip`, which are dropped.
    pub fn read_csv(path: &Path, skip: &[&str]) -> Result<Self, DatasetError> {
        let csv_err = |source| DatasetError::Csv { path: path.to_path_buf(), source };

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(csv_err)?;

        let headers = reader.headers().map_err(csv_err)?.clone();
        if headers.is_empty() {
            return Err(DatasetError::EmptyTable { path: path.to_path_buf() });
        }

        let keep: Vec<usize> = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !skip.contains(h))
            .map(|(i, _)| i)
            .collect();
        let columns: Vec<String> = keep.iter().map(|&i| headers[i].to_string()).collect();

        let mut values = Vec::new();
        let mut rows = 0;
        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(csv_err)?;
            for &i in &keep {
                let raw = record.get(i).unwrap_or("");
                let v: f64 = raw.parse().map_err(|_| DatasetError::Parse {
                    path:   path.to_path_buf(),
                    row:    row + 1,
                    column: headers[i].to_string(),
                    value:  raw.to_string(),
                })?;
                values.push(v as f32);
            }
            rows += 1;
        }

        tracing::debug!("Read {} ({} rows × {} columns)", path.display(), rows, columns.len());
        Ok(Self { columns, values, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f32> {
        self.values
    }

    pub fn row(&self, index: usize) -> &[f32] {
        let w = self.width();
        &self.values[index * w..(index + 1) * w]
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column(&self, name: &str) -> Option<Vec<f32>> {
        let idx = self.column_index(name)?;
        Some((0..self.rows).map(|r| self.row(r)[idx]).collect())
    }

    pub fn rename_columns(&mut self, f: impl Fn(&str) -> String) {
        for c in &mut self.columns {
            *c = f(c);
        }
    }

    /// Set every value in the matching columns to zero.
    /// Returns the names of the columns that were zeroed.
    pub fn zero_columns(&mut self, matches: impl Fn(&str) -> bool) -> Vec<String> {
        let hit: Vec<usize> = (0..self.width()).filter(|&i| matches(&self.columns[i])).collect();
        if hit.is_empty() {
            return Vec::new();
        }
        let w = self.width();
        for row in self.values.chunks_mut(w) {
            for &i in &hit {
                row[i] = 0.0;
            }
        }
        hit.into_iter().map(|i| self.columns[i].clone()).collect()
    }

    /// Place tables side by side. All tables must have the same
    /// number of rows (checked by the caller).
    pub fn hconcat(tables: &[FeatureTable]) -> Self {
        let rows = tables.first().map(|t| t.rows).unwrap_or(0);
        debug_assert!(tables.iter().all(|t| t.rows == rows));

        let columns: Vec<String> = tables.iter().flat_map(|t| t.columns.iter().cloned()).collect();
        let mut values = Vec::with_capacity(rows * columns.len());
        for r in 0..rows {
            for t in tables {
                values.extend_from_slice(t.row(r));
            }
        }
        Self { columns, values, rows }
    }

    /// Stack tables on top of each other. All tables must share
    /// the same column layout (checked by the caller).
    pub fn vconcat(tables: &[FeatureTable]) -> Self {
        let columns = tables.first().map(|t| t.columns.clone()).unwrap_or_default();
        debug_assert!(tables.iter().all(|t| t.columns == columns));

        let values: Vec<f32> = tables.iter().flat_map(|t| t.values.iter().copied()).collect();
        let rows = tables.iter().map(|t| t.rows).sum();
        Self { columns, values, rows }
    }
}
