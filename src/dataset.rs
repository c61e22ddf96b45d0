use crate::{ClusterError, Matrix, Result};
use csv::{ReaderBuilder, Trim};
use std::io::Read;
use std::path::Path;

/// Load a headerless CSV of numeric points, one point per row.
pub fn load_points<P: AsRef<Path>>(path: P) -> Result<Matrix> {
    let file = std::fs::File::open(path)?;
    read_points(file)
}

/// Parse points from any reader. Every row must have the same number of fields.
pub fn read_points<R: Read>(reader: R) -> Result<Matrix> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .trim(Trim::All)
        .from_reader(reader);

    let mut values = Vec::new();
    let mut width = None;
    let mut n_rows = 0;

    for record in rdr.records() {
        let record = record?;
        if let Some(expected) = width {
            if expected != record.len() {
                return Err(ClusterError::invalid(format!(
                    "row {} has {} fields, expected {}",
                    n_rows,
                    record.len(),
                    expected
                )));
            }
        } else {
            width = Some(record.len());
        }
        for field in record.iter() {
            values.push(field.parse::<f64>()?);
        }
        n_rows += 1;
    }

    let dim = match width {
        Some(dim) if dim > 0 => dim,
        _ => return Err(ClusterError::invalid("input contains no points")),
    };

    Matrix::from_shape_vec((n_rows, dim), values)
        .map_err(|e| ClusterError::invalid(format!("cannot shape input: {}", e)))
}
