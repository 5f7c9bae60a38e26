pub mod errors;

pub use errors::{RcwaError, RcwaErrorCategory, RcwaResult};

use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Optical constant series held by a material table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OpticalQuantity {
    Index,
    Permittivity,
    Permeability,
}

impl OpticalQuantity {
    pub const ALL: [OpticalQuantity; 3] = [Self::Index, Self::Permittivity, Self::Permeability];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Permittivity => "permittivity",
            Self::Permeability => "permeability",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim();
        Self::ALL
            .into_iter()
            .find(|quantity| quantity.as_str().eq_ignore_ascii_case(normalized))
            .or_else(|| match normalized.to_ascii_lowercase().as_str() {
                "n" | "nk" => Some(Self::Index),
                "er" | "eps" => Some(Self::Permittivity),
                "ur" | "mu" => Some(Self::Permeability),
                _ => None,
            })
    }
}

impl Display for OpticalQuantity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}
