use crate::domain::OpticalQuantity;
use crate::material::Material;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRecord {
    pub material: String,
    pub quantity: OpticalQuantity,
    pub wavelength_um: f64,
    pub re: f64,
    pub im: f64,
    pub extrapolated: bool,
}

impl QueryRecord {
    pub fn evaluate(material: &Material, quantity: OpticalQuantity, wavelength_um: f64) -> Self {
        let value = material.evaluate(quantity, wavelength_um);
        Self {
            material: material.name().to_string(),
            quantity,
            wavelength_um,
            re: value.re,
            im: value.im,
            extrapolated: material.is_extrapolated(wavelength_um),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialSummary {
    pub name: String,
    pub rows: usize,
    pub min_wavelength_um: f64,
    pub max_wavelength_um: f64,
}

impl MaterialSummary {
    pub fn of(material: &Material) -> Self {
        let (min_wavelength_um, max_wavelength_um) = material.wavelength_range();
        Self {
            name: material.name().to_string(),
            rows: material.len(),
            min_wavelength_um,
            max_wavelength_um,
        }
    }
}

pub fn format_fixed_f64(value: f64, width: usize, precision: usize) -> String {
    format!(
        "{value:>width$.precision$}",
        width = width,
        precision = precision
    )
}

/// Fixed-width table, one record per line. Extrapolated rows are flagged `*`.
pub fn render_query_table(records: &[QueryRecord]) -> String {
    let mut lines = vec![format!(
        "{:<16} {:<13} {:>12} {:>16} {:>16}",
        "material", "quantity", "lambda_um", "re", "im"
    )];
    for record in records {
        lines.push(format!(
            "{:<16} {:<13} {} {} {}{}",
            record.material,
            record.quantity.as_str(),
            format_fixed_f64(record.wavelength_um, 12, 6),
            format_fixed_f64(record.re, 16, 10),
            format_fixed_f64(record.im, 16, 10),
            if record.extrapolated { " *" } else { "" }
        ));
    }
    let mut rendered = lines.join("\n");
    rendered.push('\n');
    rendered
}

pub fn render_summary(summary: &MaterialSummary) -> String {
    format!(
        "material: {}\nrows: {}\nwavelength range (um): {} .. {}\n",
        summary.name, summary.rows, summary.min_wavelength_um, summary.max_wavelength_um
    )
}

pub fn render_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}
