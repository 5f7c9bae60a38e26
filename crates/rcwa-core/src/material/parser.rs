use num_complex::Complex64;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

pub const WAVELENGTH_COLUMN: &str = "Wavelength (um)";
pub const N_COLUMN: &str = "n";
pub const K_COLUMN: &str = "k";

// A title row may precede the column header.
const HEADER_SEARCH_LINES: usize = 2;
const DELIMITERS: [char; 3] = [',', '\t', ';'];

/// One tabulated row: wavelength in micrometres and the complex index `n + ik`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NkSample {
    pub wavelength_um: f64,
    pub n: f64,
    pub k: f64,
}

impl NkSample {
    pub const fn new(wavelength_um: f64, n: f64, k: f64) -> Self {
        Self { wavelength_um, n, k }
    }

    pub fn refractive_index(&self) -> Complex64 {
        Complex64::new(self.n, self.k)
    }
}

/// Where a bad value sits: a physical line of a parsed file, or the 1-based
/// position of a sample handed to [`validate_samples`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourcePosition {
    Line(usize),
    Row(usize),
}

impl Display for SourcePosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Line(line) => write!(f, "line {line}"),
            Self::Row(row) => write!(f, "data row {row}"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DataFormatError {
    #[error("failed to read nk table '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("nk table is empty; expected a header with columns 'Wavelength (um)', 'n', 'k'")]
    MissingHeader,
    #[error("required column '{column}' is missing from the header")]
    MissingColumn { column: &'static str },
    #[error("line {line}: expected at least {expected} cells, found {found}")]
    RowTooShort {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: column '{column}' has non-numeric value '{value}'")]
    MalformedCell {
        line: usize,
        column: &'static str,
        value: String,
    },
    #[error("{at}: column '{column}' must be finite, got {value}")]
    NonFiniteValue {
        at: SourcePosition,
        column: &'static str,
        value: f64,
    },
    #[error("nk table requires at least 2 data rows, got {actual}")]
    InsufficientRows { actual: usize },
    #[error("wavelengths must be strictly increasing, {at} has {current} after {previous}")]
    NonIncreasingWavelength {
        at: SourcePosition,
        previous: f64,
        current: f64,
    },
}

#[derive(Debug, Clone, Copy)]
struct ColumnLayout {
    delimiter: char,
    wavelength: usize,
    n: usize,
    k: usize,
}

impl ColumnLayout {
    fn min_cells(&self) -> usize {
        self.wavelength.max(self.n).max(self.k) + 1
    }
}

pub(super) fn read_nk_source(path: &Path) -> Result<String, DataFormatError> {
    fs::read_to_string(path).map_err(|source| DataFormatError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses a delimited `Wavelength (um), n, k` table.
///
/// Row order and finiteness are not checked here; see [`validate_samples`].
pub fn parse_nk_table(source: &str) -> Result<Vec<NkSample>, DataFormatError> {
    parse_nk_rows(source).map(|rows| rows.into_iter().map(|(_, sample)| sample).collect())
}

/// Parses and validates a table, reporting problems by physical line.
pub(super) fn load_nk_table(source: &str) -> Result<Vec<NkSample>, DataFormatError> {
    let rows = parse_nk_rows(source)?;
    let samples: Vec<NkSample> = rows.iter().map(|(_, sample)| *sample).collect();
    check_samples(&samples, |index| SourcePosition::Line(rows[index].0))?;
    Ok(samples)
}

fn parse_nk_rows(source: &str) -> Result<Vec<(usize, NkSample)>, DataFormatError> {
    let mut lines = source
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim_start_matches('\u{feff}').trim()))
        .filter(|(_, line)| !line.is_empty());

    let layout = locate_header(&mut lines)?;
    let mut samples = Vec::new();

    for (line_number, line) in lines {
        if line.starts_with('#') {
            continue;
        }

        let cells = split_cells(line, layout.delimiter);
        if cells.len() < layout.min_cells() {
            return Err(DataFormatError::RowTooShort {
                line: line_number,
                expected: layout.min_cells(),
                found: cells.len(),
            });
        }

        samples.push((
            line_number,
            NkSample {
                wavelength_um: parse_cell(&cells, layout.wavelength, WAVELENGTH_COLUMN, line_number)?,
                n: parse_cell(&cells, layout.n, N_COLUMN, line_number)?,
                k: parse_cell(&cells, layout.k, K_COLUMN, line_number)?,
            },
        ));
    }

    Ok(samples)
}

/// Checks the preconditions the lookup relies on: at least two rows, finite
/// values and a strictly increasing wavelength grid.
pub fn validate_samples(samples: &[NkSample]) -> Result<(), DataFormatError> {
    check_samples(samples, |index| SourcePosition::Row(index + 1))
}

fn check_samples(
    samples: &[NkSample],
    position: impl Fn(usize) -> SourcePosition,
) -> Result<(), DataFormatError> {
    if samples.len() < 2 {
        return Err(DataFormatError::InsufficientRows {
            actual: samples.len(),
        });
    }

    for (index, sample) in samples.iter().enumerate() {
        let at = position(index);
        for (column, value) in [
            (WAVELENGTH_COLUMN, sample.wavelength_um),
            (N_COLUMN, sample.n),
            (K_COLUMN, sample.k),
        ] {
            if !value.is_finite() {
                return Err(DataFormatError::NonFiniteValue { at, column, value });
            }
        }

        if index > 0 {
            let previous = samples[index - 1].wavelength_um;
            if sample.wavelength_um <= previous {
                return Err(DataFormatError::NonIncreasingWavelength {
                    at,
                    previous,
                    current: sample.wavelength_um,
                });
            }
        }
    }

    Ok(())
}

fn locate_header<'a>(
    lines: &mut impl Iterator<Item = (usize, &'a str)>,
) -> Result<ColumnLayout, DataFormatError> {
    let mut saw_line = false;

    for (_, line) in lines.by_ref().take(HEADER_SEARCH_LINES) {
        saw_line = true;
        let delimiter = detect_delimiter(line);
        let cells = split_cells(line, delimiter);
        let Some(wavelength) = column_index(&cells, WAVELENGTH_COLUMN) else {
            continue;
        };

        let n = column_index(&cells, N_COLUMN)
            .ok_or(DataFormatError::MissingColumn { column: N_COLUMN })?;
        let k = column_index(&cells, K_COLUMN)
            .ok_or(DataFormatError::MissingColumn { column: K_COLUMN })?;

        return Ok(ColumnLayout {
            delimiter,
            wavelength,
            n,
            k,
        });
    }

    if saw_line {
        Err(DataFormatError::MissingColumn {
            column: WAVELENGTH_COLUMN,
        })
    } else {
        Err(DataFormatError::MissingHeader)
    }
}

fn detect_delimiter(line: &str) -> char {
    DELIMITERS
        .into_iter()
        .find(|delimiter| line.contains(*delimiter))
        .unwrap_or(DELIMITERS[0])
}

fn split_cells(line: &str, delimiter: char) -> Vec<&str> {
    line.split(delimiter)
        .map(|cell| cell.trim().trim_matches('"').trim())
        .collect()
}

fn column_index(cells: &[&str], column: &str) -> Option<usize> {
    cells.iter().position(|cell| *cell == column)
}

fn parse_cell(
    cells: &[&str],
    index: usize,
    column: &'static str,
    line: usize,
) -> Result<f64, DataFormatError> {
    let raw = cells[index];
    raw.parse::<f64>()
        .map_err(|_| DataFormatError::MalformedCell {
            line,
            column,
            value: raw.to_string(),
        })
}
