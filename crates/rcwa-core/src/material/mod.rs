//! Wavelength-dependent optical constants loaded from tabulated `(λ, n, k)`
//! data.

mod model;
mod parser;

pub use model::{InteriorPolicy, Material};
pub use parser::{
    DataFormatError, K_COLUMN, N_COLUMN, NkSample, SourcePosition, WAVELENGTH_COLUMN,
    parse_nk_table, validate_samples,
};
