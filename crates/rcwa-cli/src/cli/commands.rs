use super::CliError;
use super::helpers::*;
use anyhow::Context;
use rcwa_core::domain::OpticalQuantity;
use rcwa_core::library::{MaterialLibrary, NkDataConfig};
use rcwa_core::material::InteriorPolicy;
use rcwa_core::report::{
    MaterialSummary, QueryRecord, render_json, render_query_table, render_summary,
};
use serde::Serialize;
use std::path::PathBuf;

#[derive(clap::Args)]
pub(super) struct MaterialArgs {
    /// Material name in the nk data directory, or a path to an nk table
    pub(super) material: String,

    /// nk data directory (default: $RCWA_NK_DATA_DIR, then ./nkData)
    #[arg(long)]
    pub(super) nk_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum QuantitySelection {
    One(OpticalQuantity),
    All,
}

impl QuantitySelection {
    pub(super) fn quantities(self) -> Vec<OpticalQuantity> {
        match self {
            Self::One(quantity) => vec![quantity],
            Self::All => OpticalQuantity::ALL.to_vec(),
        }
    }
}

/// Accepts `all` or any name `OpticalQuantity::parse` knows, aliases included.
fn parse_quantity_selection(value: &str) -> Result<QuantitySelection, String> {
    if value.trim().eq_ignore_ascii_case("all") {
        return Ok(QuantitySelection::All);
    }
    OpticalQuantity::parse(value)
        .map(QuantitySelection::One)
        .ok_or_else(|| {
            format!(
                "unknown quantity '{value}', expected index (n, nk), permittivity (er, eps), \
                 permeability (ur, mu) or all"
            )
        })
}

#[derive(clap::Args)]
pub(super) struct EvaluationFlags {
    /// Optical constant to evaluate: index, permittivity, permeability or all
    #[arg(long, value_parser = parse_quantity_selection, default_value = "index")]
    pub(super) quantity: QuantitySelection,

    /// Interpolate linearly between grid points instead of stepping to the lower neighbor
    #[arg(long)]
    pub(super) linear: bool,

    /// Emit JSON instead of a text table
    #[arg(long)]
    pub(super) json: bool,
}

impl EvaluationFlags {
    fn interior_policy(&self) -> InteriorPolicy {
        if self.linear {
            InteriorPolicy::Linear
        } else {
            InteriorPolicy::StepBelow
        }
    }
}

#[derive(clap::Args)]
pub(super) struct QueryArgs {
    #[command(flatten)]
    material: MaterialArgs,

    /// Wavelength in micrometres (repeatable)
    #[arg(
        short = 'w',
        long = "wavelength",
        required = true,
        num_args = 1..,
        allow_negative_numbers = true
    )]
    wavelengths: Vec<f64>,

    #[command(flatten)]
    eval: EvaluationFlags,
}

#[derive(clap::Args)]
pub(super) struct SweepArgs {
    #[command(flatten)]
    material: MaterialArgs,

    /// First wavelength in micrometres
    #[arg(long, allow_negative_numbers = true)]
    start: f64,

    /// Last wavelength in micrometres
    #[arg(long, allow_negative_numbers = true)]
    stop: f64,

    /// Number of evenly spaced points, endpoints included
    #[arg(long, default_value_t = 11)]
    points: usize,

    #[command(flatten)]
    eval: EvaluationFlags,
}

#[derive(clap::Args)]
pub(super) struct InfoArgs {
    #[command(flatten)]
    material: MaterialArgs,

    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
pub(super) struct ListArgs {
    /// nk data directory (default: $RCWA_NK_DATA_DIR, then ./nkData)
    #[arg(long)]
    nk_dir: Option<PathBuf>,

    /// Emit JSON instead of one name per line
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct LibraryListing {
    root: PathBuf,
    materials: Vec<String>,
}

pub(super) fn run_query_command(args: QueryArgs) -> Result<i32, CliError> {
    let material = load_material(&args.material)?.with_interior_policy(args.eval.interior_policy());
    let records = evaluate_records(&material, &args.wavelengths, args.eval.quantity);
    print_records(&records, args.eval.json)?;
    Ok(0)
}

pub(super) fn run_sweep_command(args: SweepArgs) -> Result<i32, CliError> {
    let wavelengths = uniform_grid(args.start, args.stop, args.points)?;
    let material = load_material(&args.material)?.with_interior_policy(args.eval.interior_policy());
    let records = evaluate_records(&material, &wavelengths, args.eval.quantity);
    print_records(&records, args.eval.json)?;
    Ok(0)
}

pub(super) fn run_info_command(args: InfoArgs) -> Result<i32, CliError> {
    let material = load_material(&args.material)?;
    let summary = MaterialSummary::of(&material);
    if args.json {
        println!(
            "{}",
            render_json(&summary).context("failed to render material summary as JSON")?
        );
    } else {
        print!("{}", render_summary(&summary));
    }
    Ok(0)
}

pub(super) fn run_list_command(args: ListArgs) -> Result<i32, CliError> {
    let library = MaterialLibrary::new(NkDataConfig::resolve(args.nk_dir));
    let materials = library.list().map_err(|error| CliError::Compute(error.into()))?;
    tracing::debug!(root = %library.root().display(), count = materials.len(), "scanned nk data directory");

    if args.json {
        let listing = LibraryListing {
            root: library.root().to_path_buf(),
            materials,
        };
        println!(
            "{}",
            render_json(&listing).context("failed to render material listing as JSON")?
        );
    } else {
        for name in materials {
            println!("{name}");
        }
    }
    Ok(0)
}

fn evaluate_records(
    material: &rcwa_core::Material,
    wavelengths: &[f64],
    quantity: QuantitySelection,
) -> Vec<QueryRecord> {
    let quantities = quantity.quantities();
    wavelengths
        .iter()
        .flat_map(|wavelength| {
            quantities
                .iter()
                .map(move |quantity| QueryRecord::evaluate(material, *quantity, *wavelength))
        })
        .collect()
}

fn print_records(records: &[QueryRecord], json: bool) -> Result<(), CliError> {
    if json {
        println!(
            "{}",
            render_json(records).context("failed to render query records as JSON")?
        );
    } else {
        print!("{}", render_query_table(records));
    }

    let extrapolated = records.iter().filter(|record| record.extrapolated).count();
    if extrapolated > 0 {
        tracing::info!(extrapolated, total = records.len(), "some values were extrapolated");
    }
    Ok(())
}
