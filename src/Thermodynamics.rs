//! # Thermodynamics
//!
//! ## Aim
//! Equations of state, transport models and the mixing rules that blend per-phase
//! properties into mixture values.
//!
//! ## Main Data Structures and Logic
//! - `eos_api`: `EquationOfState` trait (Mie–Grüneisen form `p = Γ ρ e − Π`) with the
//!   `IdealGas` and `StiffenedGas` models behind the `EosEnum` factory.
//! - `transport_api`: `TransportModel` trait with `ConstTransport` and
//!   `SutherlandTransport` behind `TransportEnum`.
//! - `phase_thermo`: `PhaseThermo`, one EOS plus one transport model for a named phase.
//! - `mixture`: cell-level folds over a runtime-sized phase list; the only place a
//!   mixing rule is written down.
//!
//! ## Usage
//! ```rust
//! use PhaseFV::Thermodynamics::eos_api::{EquationOfState, EosEnum, IdealGas};
//! let air = EosEnum::IdealGas(IdealGas::new(1.4, 718.0));
//! let e = air.e_from_t(1.2, 300.0);
//! let p = air.pressure(1.2, e);
//! assert!((p - 0.4 * 1.2 * 718.0 * 300.0).abs() < 1e-8);
//! ```
use thiserror::Error;

pub mod eos_api;
pub mod mixture;
pub mod phase_thermo;
pub mod transport_api;

/// Errors raised by thermodynamic evaluations. Cell indices refer to the global cell
/// enumeration of the mesh the fields live on.
#[derive(Debug, Error, PartialEq)]
pub enum ThermoError {
    #[error("Non-positive density {value} in field '{field}' at cell {cell}")]
    NonPositiveDensity {
        field: String,
        cell: usize,
        value: f64,
    },
    #[error("Non-positive temperature {value} in field '{field}' at cell {cell}")]
    NonPositiveTemperature {
        field: String,
        cell: usize,
        value: f64,
    },
    #[error("Non-physical squared speed of sound {value} at cell {cell}")]
    InvalidSpeedOfSound { cell: usize, value: f64 },
    #[error("Invalid coefficient '{name}' = {value} for model '{model}'")]
    InvalidCoefficient {
        model: &'static str,
        name: &'static str,
        value: f64,
    },
}
