//! Labeled tabular export of a surface grid.
//!
//! # CSV layout
//! ```text
//! T,400.00,410.00,...
//! 0.0411,0.2612,0.2571,...
//! ```
//! The header cell `T` is followed by strikes with two decimals; each row
//! starts with the expiry in years (four decimals) followed by IVs (four
//! decimals). Missing cells are written as empty fields. Values are rounded on
//! export, so a grid read back is only equal to the original up to rounding.

use std::fs::File;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{self, IvSurfError};
use crate::surface::{GridSurface, SurfaceGrid};

const EXPIRY_HEADER: &str = "T";

/// Write a grid as labeled CSV.
///
/// # Errors
/// Returns [`IvSurfError::Csv`] or [`IvSurfError::Io`] on write failure.
pub fn write_csv<W: io::Write>(grid: &SurfaceGrid, writer: W) -> error::Result<()> {
    let mut csv = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(grid.strikes().len() + 1);
    header.push(EXPIRY_HEADER.to_string());
    header.extend(grid.strikes().iter().map(|k| format!("{k:.2}")));
    csv.write_record(&header)?;

    for (i, t) in grid.expiries().iter().enumerate() {
        let mut record = Vec::with_capacity(header.len());
        record.push(format!("{t:.4}"));
        record.extend(
            grid.row(i)
                .into_iter()
                .map(|cell| cell.map(|v| format!("{v:.4}")).unwrap_or_default()),
        );
        csv.write_record(&record)?;
    }
    csv.flush()?;
    Ok(())
}

/// Write a grid to a CSV file, creating or truncating it.
///
/// # Errors
/// Returns [`IvSurfError::Io`] if the file cannot be created.
pub fn save_csv(grid: &SurfaceGrid, path: impl AsRef<Path>) -> error::Result<()> {
    let file = File::create(path)?;
    write_csv(grid, io::BufWriter::new(file))
}

fn parse_cell(field: &str, what: &str) -> error::Result<f64> {
    field.trim().parse::<f64>().map_err(|e| IvSurfError::Export {
        message: format!("cannot parse {what} {field:?}: {e}"),
    })
}

/// Read a grid written by [`write_csv`].
///
/// # Errors
/// Returns [`IvSurfError::Export`] for a malformed header or cell,
/// [`IvSurfError::InvalidInput`] if the axes are not strictly increasing.
pub fn read_csv<R: io::Read>(reader: R) -> error::Result<SurfaceGrid> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let headers = csv.headers()?.clone();
    let mut fields = headers.iter();
    if fields.next().map(str::trim) != Some(EXPIRY_HEADER) {
        return Err(IvSurfError::Export {
            message: format!("first header cell must be {EXPIRY_HEADER:?}"),
        });
    }
    let strikes = fields
        .map(|f| parse_cell(f, "strike"))
        .collect::<error::Result<Vec<f64>>>()?;

    let mut expiries = Vec::new();
    let mut rows = Vec::new();
    for record in csv.records() {
        let record = record?;
        let mut cells = record.iter();
        let t = cells.next().ok_or_else(|| IvSurfError::Export {
            message: "empty row".into(),
        })?;
        expiries.push(parse_cell(t, "expiry")?);
        let row = cells
            .map(|c| {
                if c.trim().is_empty() {
                    Ok(None)
                } else {
                    parse_cell(c, "implied volatility").map(Some)
                }
            })
            .collect::<error::Result<Vec<Option<f64>>>>()?;
        rows.push(row);
    }

    SurfaceGrid::from_rows(expiries, strikes, &rows)
}

/// Read a grid from a CSV file.
///
/// # Errors
/// See [`read_csv`]; additionally [`IvSurfError::Io`] if the file cannot be opened.
pub fn load_csv(path: impl AsRef<Path>) -> error::Result<SurfaceGrid> {
    read_csv(io::BufReader::new(File::open(path)?))
}

/// Plain-data copy of a finished surface for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSnapshot {
    /// Sorted expiries in years (rows).
    pub expiries: Vec<f64>,
    /// Sorted strikes (columns).
    pub strikes: Vec<f64>,
    /// Row-major implied volatilities.
    pub iv_matrix: Vec<Vec<f64>>,
}

impl From<&GridSurface> for SurfaceSnapshot {
    fn from(surface: &GridSurface) -> Self {
        Self {
            expiries: surface.expiries().to_vec(),
            strikes: surface.strikes().to_vec(),
            iv_matrix: surface.values().to_vec(),
        }
    }
}

impl SurfaceSnapshot {
    /// Rebuild the queryable surface.
    ///
    /// # Errors
    /// Returns [`IvSurfError::InvalidInput`] for inconsistent dimensions or
    /// unsorted axes.
    pub fn to_surface(&self) -> error::Result<GridSurface> {
        let rows: Vec<Vec<Option<f64>>> = self
            .iv_matrix
            .iter()
            .map(|r| r.iter().copied().map(Some).collect())
            .collect();
        let grid = SurfaceGrid::from_rows(self.expiries.clone(), self.strikes.clone(), &rows)?;
        GridSurface::new(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::VolSurface;
    use approx::assert_abs_diff_eq;

    fn grid() -> SurfaceGrid {
        SurfaceGrid::from_rows(
            vec![15.0 / 365.0, 30.0 / 365.0],
            vec![400.0, 412.5],
            &[
                vec![Some(0.261_23), Some(0.25)],
                vec![Some(0.24), Some(0.235_56)],
            ],
        )
        .unwrap()
    }

    fn to_string(grid: &SurfaceGrid) -> String {
        let mut buf = Vec::new();
        write_csv(grid, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn csv_layout_uses_fixed_rounding() {
        let text = to_string(&grid());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "T,400.00,412.50");
        assert_eq!(lines[1], "0.0411,0.2612,0.2500");
        assert_eq!(lines[2], "0.0822,0.2400,0.2356");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn missing_cells_are_empty_fields() {
        let g = SurfaceGrid::from_rows(vec![0.1], vec![1.0, 2.0], &[vec![Some(0.2), None]])
            .unwrap();
        let text = to_string(&g);
        assert_eq!(text.lines().nth(1), Some("0.1000,0.2000,"));
    }

    #[test]
    fn read_back_matches_up_to_rounding() {
        let original = grid();
        let text = to_string(&original);
        let back = read_csv(text.as_bytes()).unwrap();
        assert_eq!(back.shape(), original.shape());
        assert_eq!(back.strikes(), original.strikes());
        assert_abs_diff_eq!(back.expiries()[0], 0.0411, epsilon = 1e-12);
        assert_abs_diff_eq!(back.get(0, 0).unwrap(), 0.2612, epsilon = 1e-12);
    }

    #[test]
    fn read_rejects_bad_header() {
        let result = read_csv("K,1,2\n0.1,0.2,0.3\n".as_bytes());
        assert!(matches!(result, Err(IvSurfError::Export { .. })));
    }

    #[test]
    fn read_rejects_garbage_cell() {
        let result = read_csv("T,1,2\n0.1,abc,0.3\n".as_bytes());
        assert!(matches!(result, Err(IvSurfError::Export { .. })));
    }

    #[test]
    fn read_rejects_ragged_row() {
        let result = read_csv("T,1,2\n0.1,0.2\n".as_bytes());
        assert!(matches!(result, Err(IvSurfError::Csv(_))));
    }

    #[test]
    fn snapshot_json_round_trip_rebuilds_surface() {
        let surface = GridSurface::new(grid()).unwrap();
        let snap = SurfaceSnapshot::from(&surface);
        let json = serde_json::to_string(&snap).unwrap();
        let back: SurfaceSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
        let rebuilt = back.to_surface().unwrap();
        let (t, k) = (20.0 / 365.0, 405.0);
        assert_eq!(
            rebuilt.black_vol(t, k).unwrap(),
            surface.black_vol(t, k).unwrap()
        );
    }
}
