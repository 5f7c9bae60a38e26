use super::parser::{DataFormatError, NkSample, load_nk_table, read_nk_source, validate_samples};
use crate::diagnostics::{
    DiagnosticSink, MaterialDiagnostic, OutOfRangeWarning, RangeSide, TracingSink,
};
use crate::domain::OpticalQuantity;
use num_complex::Complex64;
use std::fmt::{Debug, Formatter};
use std::path::Path;
use std::sync::Arc;

/// How a query strictly between two grid points is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InteriorPolicy {
    /// Value of the nearest tabulated wavelength below the query.
    #[default]
    StepBelow,
    /// Linear interpolation between the two bracketing grid points.
    Linear,
}

/// Where a query wavelength falls relative to the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GridPosition {
    Exact(usize),
    Between { lower: usize },
    Below,
    Above,
    NonFinite,
}

/// Locates `wavelength` on an ascending grid with at least two points.
pub(crate) fn locate(grid: &[f64], wavelength: f64) -> GridPosition {
    let last = grid.len() - 1;
    if wavelength.is_nan() {
        return GridPosition::NonFinite;
    }
    if wavelength > grid[last] {
        return GridPosition::Above;
    }
    if wavelength < grid[0] {
        return GridPosition::Below;
    }

    // Left insertion point: grid[index - 1] < wavelength <= grid[index].
    let index = grid.partition_point(|probe| *probe < wavelength);
    if grid[index] == wavelength {
        GridPosition::Exact(index)
    } else {
        GridPosition::Between { lower: index - 1 }
    }
}

/// Evaluates one tabulated series at `wavelength`.
///
/// Outside the grid the two edge points are extended linearly. Inside, exact
/// grid hits return the stored value untouched and everything else follows
/// `policy`. `grid` and `series` are a validated table: equal lengths, at
/// least two points.
pub(crate) fn evaluate_series(
    grid: &[f64],
    series: &[Complex64],
    wavelength: f64,
    policy: InteriorPolicy,
) -> (Complex64, GridPosition) {
    let last = grid.len() - 1;
    let position = locate(grid, wavelength);
    let value = match position {
        GridPosition::NonFinite => Complex64::new(f64::NAN, f64::NAN),
        GridPosition::Above => {
            let slope = (series[last] - series[last - 1]) / (grid[last] - grid[last - 1]);
            series[last] + slope * (wavelength - grid[last])
        }
        GridPosition::Below => {
            let slope = (series[1] - series[0]) / (grid[1] - grid[0]);
            series[0] - slope * (grid[0] - wavelength)
        }
        GridPosition::Exact(index) => series[index],
        GridPosition::Between { lower } => match policy {
            InteriorPolicy::StepBelow => series[lower],
            InteriorPolicy::Linear => {
                let upper = lower + 1;
                let fraction = (wavelength - grid[lower]) / (grid[upper] - grid[lower]);
                series[lower] + (series[upper] - series[lower]) * fraction
            }
        },
    };
    (value, position)
}

/// Tabulated dispersion of one material: complex refractive index, relative
/// permittivity and relative permeability on a shared wavelength grid (µm).
///
/// The table is validated and frozen at construction. Queries take `&self`
/// and never fail; extrapolation is reported through the injected
/// [`DiagnosticSink`].
#[derive(Clone)]
pub struct Material {
    name: String,
    wavelengths: Vec<f64>,
    refractive_index: Vec<Complex64>,
    permittivity: Vec<Complex64>,
    permeability: Vec<Complex64>,
    interior_policy: InteriorPolicy,
    sink: Arc<dyn DiagnosticSink>,
}

impl Material {
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, DataFormatError> {
        let path = path.as_ref();
        let source = read_nk_source(path)?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_csv_str(name, &source)
    }

    pub fn from_csv_str(name: impl Into<String>, source: &str) -> Result<Self, DataFormatError> {
        let samples = load_nk_table(source)?;
        Ok(Self::from_validated(name.into(), &samples))
    }

    pub fn from_samples(
        name: impl Into<String>,
        samples: &[NkSample],
    ) -> Result<Self, DataFormatError> {
        validate_samples(samples)?;
        Ok(Self::from_validated(name.into(), samples))
    }

    fn from_validated(name: String, samples: &[NkSample]) -> Self {
        let wavelengths = samples.iter().map(|sample| sample.wavelength_um).collect();
        let refractive_index: Vec<Complex64> = samples
            .iter()
            .map(NkSample::refractive_index)
            .collect();
        let permittivity = refractive_index.iter().map(|nk| nk * nk).collect();
        let permeability = vec![Complex64::new(1.0, 0.0); samples.len()];

        Self {
            name,
            wavelengths,
            refractive_index,
            permittivity,
            permeability,
            interior_policy: InteriorPolicy::default(),
            sink: Arc::new(TracingSink),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_interior_policy(mut self, policy: InteriorPolicy) -> Self {
        self.interior_policy = policy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.wavelengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavelengths.is_empty()
    }

    pub fn interior_policy(&self) -> InteriorPolicy {
        self.interior_policy
    }

    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    pub fn wavelength_range(&self) -> (f64, f64) {
        (self.wavelengths[0], self.wavelengths[self.len() - 1])
    }

    pub fn series(&self, quantity: OpticalQuantity) -> &[Complex64] {
        match quantity {
            OpticalQuantity::Index => &self.refractive_index,
            OpticalQuantity::Permittivity => &self.permittivity,
            OpticalQuantity::Permeability => &self.permeability,
        }
    }

    pub fn is_extrapolated(&self, wavelength: f64) -> bool {
        matches!(
            locate(&self.wavelengths, wavelength),
            GridPosition::Above | GridPosition::Below
        )
    }

    /// Complex refractive index `n + ik`.
    pub fn index(&self, wavelength: f64) -> Complex64 {
        self.evaluate(OpticalQuantity::Index, wavelength)
    }

    /// Relative permittivity, tabulated as `(n + ik)^2`.
    pub fn permittivity(&self, wavelength: f64) -> Complex64 {
        self.evaluate(OpticalQuantity::Permittivity, wavelength)
    }

    /// Relative permeability, `1` at every tabulated wavelength.
    pub fn permeability(&self, wavelength: f64) -> Complex64 {
        self.evaluate(OpticalQuantity::Permeability, wavelength)
    }

    pub fn evaluate(&self, quantity: OpticalQuantity, wavelength: f64) -> Complex64 {
        let (value, position) = evaluate_series(
            &self.wavelengths,
            self.series(quantity),
            wavelength,
            self.interior_policy,
        );
        self.report_position(quantity, wavelength, position);
        value
    }

    pub fn sample(&self, quantity: OpticalQuantity, wavelengths: &[f64]) -> Vec<Complex64> {
        wavelengths
            .iter()
            .map(|wavelength| self.evaluate(quantity, *wavelength))
            .collect()
    }

    fn report_position(&self, quantity: OpticalQuantity, wavelength: f64, position: GridPosition) {
        let (min, max) = self.wavelength_range();
        let diagnostic = match position {
            GridPosition::Above => MaterialDiagnostic::OutOfRange(OutOfRangeWarning {
                material: self.name.clone(),
                quantity,
                wavelength,
                nearest_wavelength: max,
                side: RangeSide::Above,
            }),
            GridPosition::Below => MaterialDiagnostic::OutOfRange(OutOfRangeWarning {
                material: self.name.clone(),
                quantity,
                wavelength,
                nearest_wavelength: min,
                side: RangeSide::Below,
            }),
            GridPosition::NonFinite => MaterialDiagnostic::NonFiniteQuery {
                material: self.name.clone(),
                quantity,
            },
            GridPosition::Exact(_) | GridPosition::Between { .. } => return,
        };
        self.sink.report(&diagnostic);
    }
}

impl Debug for Material {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Material")
            .field("name", &self.name)
            .field("rows", &self.len())
            .field("wavelength_range", &self.wavelength_range())
            .field("interior_policy", &self.interior_policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::{GridPosition, InteriorPolicy, Material, evaluate_series, locate};
    use crate::diagnostics::{MaterialDiagnostic, RangeSide, RecordingSink};
    use crate::domain::OpticalQuantity;
    use crate::material::{DataFormatError, NkSample, SourcePosition};
    use num_complex::Complex64;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    const THREE_POINT_TABLE: &str = "Wavelength (um),n,k\n0.4,1.5,0.0\n0.5,1.6,0.01\n0.6,1.7,0.02\n";

    fn three_point(sink: &Arc<RecordingSink>) -> Material {
        Material::from_csv_str("film", THREE_POINT_TABLE)
            .expect("table should load")
            .with_sink(sink.clone())
    }

    fn assert_complex_close(label: &str, expected: Complex64, actual: Complex64, tol: f64) {
        let abs_diff = (actual - expected).norm();
        assert!(
            abs_diff <= tol,
            "{label} expected=({:.15e},{:.15e}) actual=({:.15e},{:.15e}) abs_diff={:.3e}",
            expected.re,
            expected.im,
            actual.re,
            actual.im,
            abs_diff
        );
    }

    #[test]
    fn tabulated_wavelengths_return_stored_values_exactly() {
        let sink = Arc::new(RecordingSink::new());
        let material = three_point(&sink);

        let expected = [
            Complex64::new(1.5, 0.0),
            Complex64::new(1.6, 0.01),
            Complex64::new(1.7, 0.02),
        ];
        for (wavelength, nk) in material.wavelengths().to_vec().into_iter().zip(expected) {
            assert_eq!(material.index(wavelength), nk);
            assert_eq!(material.permittivity(wavelength), nk * nk);
            assert_eq!(material.permeability(wavelength), Complex64::new(1.0, 0.0));
        }
        assert!(sink.is_empty(), "grid hits must not raise diagnostics");
    }

    #[test]
    fn permittivity_is_square_of_index() {
        let sink = Arc::new(RecordingSink::new());
        let material = three_point(&sink);
        assert_complex_close(
            "permittivity(0.5)",
            Complex64::new(2.5599, 0.032),
            material.permittivity(0.5),
            1.0e-12,
        );
    }

    #[test]
    fn interior_queries_step_to_left_neighbor() {
        let sink = Arc::new(RecordingSink::new());
        let material = three_point(&sink);

        assert_eq!(material.index(0.45), Complex64::new(1.5, 0.0));
        assert_eq!(material.index(0.5999), Complex64::new(1.6, 0.01));
        assert_eq!(
            material.permittivity(0.55),
            Complex64::new(1.6, 0.01) * Complex64::new(1.6, 0.01)
        );
        assert!(sink.is_empty());
    }

    #[test]
    fn linear_policy_interpolates_between_bracketing_points() {
        let material = Material::from_csv_str("film", THREE_POINT_TABLE)
            .expect("table should load")
            .with_interior_policy(InteriorPolicy::Linear);

        assert_eq!(material.interior_policy(), InteriorPolicy::Linear);
        assert_complex_close(
            "index(0.45)",
            Complex64::new(1.55, 0.005),
            material.index(0.45),
            1.0e-12,
        );
        assert_eq!(material.index(0.5), Complex64::new(1.6, 0.01));
    }

    #[test]
    fn above_range_extrapolates_from_top_two_points_and_warns() {
        let sink = Arc::new(RecordingSink::new());
        let material = three_point(&sink);

        assert_complex_close(
            "index(0.7)",
            Complex64::new(1.8, 0.03),
            material.index(0.7),
            1.0e-12,
        );
        assert_complex_close(
            "index(1.6)",
            Complex64::new(2.7, 0.12),
            material.index(1.6),
            1.0e-9,
        );

        let diagnostics = sink.take();
        assert_eq!(diagnostics.len(), 2);
        match &diagnostics[0] {
            MaterialDiagnostic::OutOfRange(warning) => {
                assert_eq!(warning.material, "film");
                assert_eq!(warning.quantity, OpticalQuantity::Index);
                assert_eq!(warning.wavelength, 0.7);
                assert_eq!(warning.nearest_wavelength, 0.6);
                assert_eq!(warning.side, RangeSide::Above);
            }
            other => panic!("expected OutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn below_range_extrapolates_from_bottom_two_points_and_warns() {
        let sink = Arc::new(RecordingSink::new());
        let material = three_point(&sink);

        assert_complex_close(
            "index(0.3)",
            Complex64::new(1.4, -0.01),
            material.index(0.3),
            1.0e-12,
        );
        assert_eq!(material.permeability(0.1), Complex64::new(1.0, 0.0));

        let diagnostics = sink.take();
        assert_eq!(diagnostics.len(), 2);
        for diagnostic in diagnostics {
            match diagnostic {
                MaterialDiagnostic::OutOfRange(warning) => {
                    assert_eq!(warning.side, RangeSide::Below);
                    assert_eq!(warning.nearest_wavelength, 0.4);
                }
                other => panic!("expected OutOfRange, got {other:?}"),
            }
        }
    }

    #[test]
    fn permittivity_extrapolates_its_own_series() {
        let sink = Arc::new(RecordingSink::new());
        let material = three_point(&sink);

        let top = Complex64::new(1.7, 0.02) * Complex64::new(1.7, 0.02);
        let below_top = Complex64::new(1.6, 0.01) * Complex64::new(1.6, 0.01);
        let expected = top + (top - below_top) / 0.1 * 0.1;
        assert_complex_close("permittivity(0.7)", expected, material.permittivity(0.7), 1.0e-9);

        match &sink.take()[0] {
            MaterialDiagnostic::OutOfRange(warning) => {
                assert_eq!(warning.quantity, OpticalQuantity::Permittivity)
            }
            other => panic!("expected OutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn non_finite_query_returns_nan_and_reports() {
        let sink = Arc::new(RecordingSink::new());
        let material = three_point(&sink);

        let value = material.index(f64::NAN);
        assert!(value.re.is_nan() && value.im.is_nan());
        assert!(matches!(
            sink.take().as_slice(),
            [MaterialDiagnostic::NonFiniteQuery {
                quantity: OpticalQuantity::Index,
                ..
            }]
        ));
    }

    #[test]
    fn locate_follows_left_insertion_semantics() {
        let grid = [1.0, 2.0, 4.0];
        assert_eq!(locate(&grid, 1.0), GridPosition::Exact(0));
        assert_eq!(locate(&grid, 4.0), GridPosition::Exact(2));
        assert_eq!(locate(&grid, 3.0), GridPosition::Between { lower: 1 });
        assert_eq!(locate(&grid, 0.5), GridPosition::Below);
        assert_eq!(locate(&grid, 4.5), GridPosition::Above);
        assert_eq!(locate(&grid, f64::INFINITY), GridPosition::Above);
        assert_eq!(locate(&grid, f64::NAN), GridPosition::NonFinite);
    }

    #[test]
    fn evaluate_series_extrapolation_diverges_linearly() {
        let grid = [1.0, 2.0];
        let series = [Complex64::new(0.0, 1.0), Complex64::new(2.0, 3.0)];
        let (far, position) = evaluate_series(&grid, &series, 102.0, InteriorPolicy::StepBelow);
        assert_eq!(position, GridPosition::Above);
        assert_complex_close("far above", Complex64::new(202.0, 203.0), far, 1.0e-9);
    }

    #[test]
    fn sample_evaluates_every_wavelength_in_order() {
        let sink = Arc::new(RecordingSink::new());
        let material = three_point(&sink);

        let values = material.sample(OpticalQuantity::Index, &[0.4, 0.45, 0.6]);
        assert_eq!(
            values,
            vec![
                Complex64::new(1.5, 0.0),
                Complex64::new(1.5, 0.0),
                Complex64::new(1.7, 0.02)
            ]
        );
        assert!(material.is_extrapolated(0.61));
        assert!(!material.is_extrapolated(0.6));
        assert!(sink.is_empty());
    }

    #[test]
    fn loads_from_disk_and_names_material_after_file_stem() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("SiO2.csv");
        fs::write(&path, format!("Fused silica\n{THREE_POINT_TABLE}")).expect("write table");

        let material = Material::from_csv_path(&path).expect("material should load");
        assert_eq!(material.name(), "SiO2");
        assert_eq!(material.len(), 3);
        assert_eq!(material.wavelength_range(), (0.4, 0.6));
        assert_eq!(material.series(OpticalQuantity::Permeability).len(), 3);
    }

    #[test]
    fn load_failures_surface_data_format_errors() {
        let temp = TempDir::new().expect("tempdir should be created");

        let error = Material::from_csv_path(temp.path().join("absent.csv"))
            .expect_err("missing file should fail");
        assert!(matches!(error, DataFormatError::Read { .. }));

        let error = Material::from_csv_str("no-k", "Wavelength (um),n\n0.4,1.5\n0.5,1.6\n")
            .expect_err("missing k column should fail");
        assert!(matches!(error, DataFormatError::MissingColumn { column: "k" }));

        let error = Material::from_csv_str("text", "Wavelength (um),n,k\n0.4,1.5,x\n0.5,1.6,0\n")
            .expect_err("non-numeric k should fail");
        assert!(matches!(error, DataFormatError::MalformedCell { column: "k", .. }));

        let error = Material::from_csv_str("short", "Wavelength (um),n,k\n0.4,1.5,0.0\n")
            .expect_err("single row should fail");
        assert!(matches!(error, DataFormatError::InsufficientRows { actual: 1 }));

        let error = Material::from_samples(
            "unsorted",
            &[NkSample::new(0.5, 1.5, 0.0), NkSample::new(0.4, 1.6, 0.0)],
        )
        .expect_err("descending grid should fail");
        assert!(matches!(
            error,
            DataFormatError::NonIncreasingWavelength {
                at: SourcePosition::Row(2),
                ..
            }
        ));
    }

    #[test]
    fn tables_without_two_points_never_construct() {
        let error = Material::from_samples("empty", &[]).expect_err("no samples should fail");
        assert!(matches!(error, DataFormatError::InsufficientRows { actual: 0 }));

        let error = Material::from_csv_str("header-only", "Wavelength (um),n,k\n")
            .expect_err("header-only table should fail");
        assert!(matches!(error, DataFormatError::InsufficientRows { actual: 0 }));

        let material = Material::from_samples(
            "pair",
            &[NkSample::new(1.0, 2.0, 0.0), NkSample::new(2.0, 3.0, 0.0)],
        )
        .expect("two points are enough")
        .with_sink(Arc::new(RecordingSink::new()));
        for quantity in OpticalQuantity::ALL {
            assert_eq!(material.series(quantity).len(), material.wavelengths().len());
        }
        assert_eq!(material.index(0.0), Complex64::new(1.0, 0.0));
        assert_eq!(material.index(1.5), Complex64::new(2.0, 0.0));
        assert_eq!(material.index(3.0), Complex64::new(4.0, 0.0));
    }

    #[test]
    fn concurrent_queries_share_one_table() {
        let sink = Arc::new(RecordingSink::new());
        let material = three_point(&sink);

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..100 {
                        assert_eq!(material.index(0.5), Complex64::new(1.6, 0.01));
                        let _ = material.index(0.7);
                    }
                });
            }
        });
        assert_eq!(sink.len(), 400);
    }
}
