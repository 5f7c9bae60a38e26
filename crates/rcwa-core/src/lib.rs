//! Tabulated material dispersion for RCWA simulations.
//!
//! [`material::Material`] loads `(λ, n, k)` tables and answers refractive
//! index, permittivity and permeability queries at arbitrary wavelengths.
//! Solver, layer and geometry code consume it through those three queries.

pub mod diagnostics;
pub mod domain;
pub mod library;
pub mod material;
pub mod report;

pub use diagnostics::{DiagnosticSink, MaterialDiagnostic, RecordingSink, TracingSink};
pub use domain::{OpticalQuantity, RcwaError, RcwaResult};
pub use library::{MaterialLibrary, NkDataConfig};
pub use material::{DataFormatError, InteriorPolicy, Material, NkSample};
