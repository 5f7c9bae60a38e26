//! Non-fatal diagnostics raised while querying a material table.
//!
//! Queries never fail. When a wavelength falls outside the tabulated range the
//! value is extrapolated and a [`MaterialDiagnostic`] is handed to the
//! material's [`DiagnosticSink`]. The default sink forwards to `tracing`.

use crate::domain::OpticalQuantity;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeSide {
    Below,
    Above,
}

impl RangeSide {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Below => "below",
            Self::Above => "above",
        }
    }
}

/// A query landed outside `[min, max]` of the wavelength grid.
#[derive(Debug, Clone, PartialEq)]
pub struct OutOfRangeWarning {
    pub material: String,
    pub quantity: OpticalQuantity,
    pub wavelength: f64,
    pub nearest_wavelength: f64,
    pub side: RangeSide,
}

impl Display for OutOfRangeWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CAUTION - extrapolating {} of '{}' linearly for wavelength {} ({} tabulated range); closest wavelength is {}",
            self.quantity,
            self.material,
            self.wavelength,
            self.side.as_str(),
            self.nearest_wavelength
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MaterialDiagnostic {
    OutOfRange(OutOfRangeWarning),
    NonFiniteQuery {
        material: String,
        quantity: OpticalQuantity,
    },
}

impl Display for MaterialDiagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange(warning) => warning.fmt(f),
            Self::NonFiniteQuery { material, quantity } => write!(
                f,
                "CAUTION - non-finite wavelength requested for {quantity} of '{material}'; returning NaN"
            ),
        }
    }
}

pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: &MaterialDiagnostic);
}

/// Forwards diagnostics to the `tracing` dispatcher at WARN level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: &MaterialDiagnostic) {
        match diagnostic {
            MaterialDiagnostic::OutOfRange(warning) => tracing::warn!(
                material = %warning.material,
                quantity = %warning.quantity,
                wavelength_um = warning.wavelength,
                nearest_um = warning.nearest_wavelength,
                side = warning.side.as_str(),
                "{}",
                warning
            ),
            MaterialDiagnostic::NonFiniteQuery { material, quantity } => tracing::warn!(
                material = %material,
                quantity = %quantity,
                "{}",
                diagnostic
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&self, _diagnostic: &MaterialDiagnostic) {}
}

/// Keeps every diagnostic in memory in arrival order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: Mutex<Vec<MaterialDiagnostic>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<MaterialDiagnostic> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn take(&self) -> Vec<MaterialDiagnostic> {
        std::mem::take(&mut *self.records.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for RecordingSink {
    fn report(&self, diagnostic: &MaterialDiagnostic) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::{
        DiagnosticSink, MaterialDiagnostic, OutOfRangeWarning, RangeSide, RecordingSink,
    };
    use crate::domain::OpticalQuantity;

    fn warning(wavelength: f64) -> MaterialDiagnostic {
        MaterialDiagnostic::OutOfRange(OutOfRangeWarning {
            material: "Si".to_string(),
            quantity: OpticalQuantity::Index,
            wavelength,
            nearest_wavelength: 0.6,
            side: RangeSide::Above,
        })
    }

    #[test]
    fn recording_sink_keeps_arrival_order_and_drains() {
        let sink = RecordingSink::new();
        assert!(sink.is_empty());

        sink.report(&warning(0.7));
        sink.report(&warning(0.8));
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.snapshot(), vec![warning(0.7), warning(0.8)]);

        let drained = sink.take();
        assert_eq!(drained.len(), 2);
        assert!(sink.is_empty());
    }

    #[test]
    fn out_of_range_message_names_query_and_closest_wavelength() {
        let message = warning(0.7).to_string();
        assert!(message.starts_with("CAUTION"), "{message}");
        assert!(message.contains("wavelength 0.7"), "{message}");
        assert!(message.contains("closest wavelength is 0.6"), "{message}");
        assert!(message.contains("above"), "{message}");
    }
}
