use super::CliError;
use super::commands::MaterialArgs;
use rcwa_core::domain::RcwaError;
use rcwa_core::library::{MaterialLibrary, NkDataConfig};
use rcwa_core::material::Material;
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "warn";

/// Diagnostics go to stderr so stdout stays machine-readable.
pub(super) fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .try_init();
}

pub(super) fn load_material(args: &MaterialArgs) -> Result<Material, CliError> {
    let library = MaterialLibrary::new(NkDataConfig::resolve(args.nk_dir.clone()));
    let material = library
        .resolve_material(&args.material)
        .map_err(|error| CliError::Compute(error.into()))?;
    tracing::debug!(
        material = material.name(),
        rows = material.len(),
        "loaded nk table"
    );
    Ok(material)
}

pub(super) fn uniform_grid(start: f64, stop: f64, points: usize) -> Result<Vec<f64>, CliError> {
    if !start.is_finite() || !stop.is_finite() {
        return Err(CliError::Compute(RcwaError::input_validation(
            "INPUT.CLI_SWEEP",
            format!("sweep bounds must be finite, got start={start} stop={stop}"),
        )));
    }
    if points == 0 {
        return Err(CliError::Compute(RcwaError::input_validation(
            "INPUT.CLI_SWEEP",
            "sweep requires at least one point",
        )));
    }
    if points == 1 {
        return Ok(vec![start]);
    }

    let step = (stop - start) / (points - 1) as f64;
    Ok((0..points)
        .map(|index| {
            if index == points - 1 {
                stop
            } else {
                start + step * index as f64
            }
        })
        .collect())
}
