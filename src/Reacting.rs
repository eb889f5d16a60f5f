//! # Reacting
//!
//! ## Aim
//! Species transport and chemical source terms for single-phase reacting flow. The
//! compressible system owns the conserved partial densities `ρYₖ`; this module supplies
//! everything species-specific around them.
//!
//! ## Main Data Structures and Logic
//! - `mechanism`: `Mechanism`, a list of Arrhenius reactions parsed from equation strings
//!   such as `"CH4 + 2 O2 => CO2 + 2 H2O"`. Progress rate of reaction r:
//!   `ωᵣ = A Tⁿ exp(−Ea/RT) Πₖ (ρYₖ/Wₖ)^ν'ₖ` [mol/m³/s]; species source
//!   `Wₖ Σᵣ (ν''ₖ − ν'ₖ) ωᵣ` [kg/m³/s]; heat release `Σᵣ Qᵣ ωᵣ` [W/m³].
//! - `combustion`: the `CombustionModel` collaborator (`sourceTerm(primitive) →
//!   {speciesRates, energyRate}`) with `NoCombustion` and `ArrheniusCombustion`.
//! - `turbulence`: the `TurbulenceModel` collaborator adjusting a base diffusivity.
//! - `species`: `ReactingExtension`, the mass-fraction fields, species face fluxes
//!   (upwind convection plus Fickian diffusion at unity Lewis number) and the
//!   drift correction of mass fractions (optional inert species absorbs the defect,
//!   then clamp to zero and renormalise to ΣY = 1).
//!
//! ## Usage
//! ```rust
//! use PhaseFV::Reacting::mechanism::Mechanism;
//! let species = vec!["A".to_string(), "B".to_string()];
//! let mech = Mechanism::new(species, vec![0.029, 0.029]);
//! let (reactants, products) = mech.parse_equation("A => B").unwrap();
//! assert_eq!(reactants, vec![(0, 1.0)]);
//! assert_eq!(products, vec![(1, 1.0)]);
//! ```
use thiserror::Error;

pub mod combustion;
pub mod mechanism;
pub mod species;
pub mod turbulence;

/// Universal gas constant [J/mol/K]
pub const R_GAS: f64 = 8.314462618;

#[derive(Debug, Error, PartialEq)]
pub enum ReactionError {
    #[error("Cannot parse reaction equation '{equation}': {reason}")]
    Parse { equation: String, reason: String },
    #[error("Unknown species '{species}' in '{context}'")]
    UnknownSpecies { species: String, context: String },
    #[error("Size mismatch for '{entry}': got {got}, expected {expected}")]
    SizeMismatch {
        entry: &'static str,
        got: usize,
        expected: usize,
    },
    #[error("Invalid value {value} for '{entry}'")]
    InvalidValue { entry: String, value: f64 },
}
