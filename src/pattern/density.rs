//! IPC-7351B density levels and the solder fillet goals used for the pattern
//! J-values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Density level per IPC-7351B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DensityLevel {
    /// Most (M) - maximum land protrusion.
    Most,
    /// Nominal (N) - recommended for most boards.
    #[default]
    Nominal,
    /// Least (L) - minimum land protrusion for dense boards.
    Least,
}

impl DensityLevel {
    /// Parses "M", "Most", "N", "Nominal", "L", "Least" (case-insensitive).
    #[must_use]
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "M" | "MOST" => Some(Self::Most),
            "N" | "NOMINAL" => Some(Self::Nominal),
            "L" | "LEAST" => Some(Self::Least),
            _ => None,
        }
    }

    /// Suffix character for IPC names.
    #[must_use]
    pub const fn suffix(&self) -> char {
        match self {
            Self::Most => 'M',
            Self::Nominal => 'N',
            Self::Least => 'L',
        }
    }
}

impl fmt::Display for DensityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

/// Solder fillet goals (J-values) in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolderFilletGoals {
    /// Toe fillet (JT).
    pub toe: f64,
    /// Heel fillet (JH).
    pub heel: f64,
    /// Side fillet (JS).
    pub side: f64,
}

impl SolderFilletGoals {
    /// Creates new solder fillet goals.
    #[must_use]
    pub const fn new(toe: f64, heel: f64, side: f64) -> Self {
        Self { toe, heel, side }
    }

    /// Gull-wing leads (QFP, LQFP), IPC-7351B Table 3-4.
    #[must_use]
    pub const fn for_gull_wing(density: DensityLevel) -> Self {
        match density {
            DensityLevel::Most => Self::new(0.55, 0.45, 0.05),
            DensityLevel::Nominal => Self::new(0.35, 0.35, 0.03),
            DensityLevel::Least => Self::new(0.15, 0.25, 0.01),
        }
    }

    /// No-lead packages (QFN, DFN, SON), IPC-7351B Table 3-7.
    #[must_use]
    pub const fn for_no_lead(density: DensityLevel) -> Self {
        match density {
            DensityLevel::Most => Self::new(0.40, -0.04, 0.05),
            DensityLevel::Nominal => Self::new(0.30, -0.04, 0.00),
            DensityLevel::Least => Self::new(0.20, -0.04, -0.05),
        }
    }
}
