//! # Compressible Multiphase System
//!
//! ## Aim
//! Finite-volume compressible flow of one, two or N immiscible phases in mechanical and
//! pressure equilibrium, optionally carrying reacting species. The system owns the
//! conserved state, decodes primitives from it, builds face fluxes with a selectable
//! approximate Riemann solver and advances itself one Runge–Kutta stage at a time on
//! behalf of an external integrator.
//!
//! ## Main Data Structures and Logic
//! - `CompressibleSystem`: phases, mixture primitives (ρ, U, p, e, T), face fluxes
//!   (phi, ρphi, ρUphi, ρEphi plus per-phase αphi and αρphi) and the conserved state
//!   (αᵢρᵢ, transported αᵢ, ρU, ρE, ρYₖ). One struct serves every phase count; what differs
//!   between single-phase, two-phase and multiphase systems lives in the `closure`.
//! - `PhaseClosure`: number of transported volume fractions, their normalisation and
//!   `calc_alpha_and_rho`.
//! - `StageStorage`: Old (stage-entry state) and Delta (stage rate) slots requested by
//!   `set_ode_fields`, dropped by `clear_ode_fields`.
//! - Stage protocol, driven from outside:
//!   ```text
//!   set_delta_t(dt)
//!   set_ode_fields(n, store_old, store_delta)      Uninitialized/Cleared -> FieldsSet
//!   for i in 0..n { update(); solve(i, a[i], b[i]) }   -> StageRunning{i}
//!   clear_ode_fields()                             -> Cleared (or back, if no stage ran)
//!   ```
//!   `solve` blends
//!   U⁽ⁱ⁺¹⁾ = Σ_{j<i} aⱼ Oldⱼ + aᵢ U⁽ⁱ⁾ + Δt (Σ_{j<i} bⱼ Δⱼ + bᵢ ΔU⁽ⁱ⁾),
//!   corrects drift (clamps small negative masses, clips and renormalises volume
//!   fractions), commits and decodes. A failing stage leaves the system unchanged.
//! - Fatal and recoverable failures are told apart by `SystemError::is_recoverable`.
//!
//! ## Usage
//! ```rust
//! use PhaseFV::CompressibleSystem::{CellState, CompressibleSystem};
//! use PhaseFV::Mesh::fv_mesh::{FvMesh, PatchKind};
//! use PhaseFV::TimeIntegration::{RkScheme, integrate_step};
//! use PhaseFV::config::SystemConfig;
//! use nalgebra::Vector3;
//!
//! let cfg = SystemConfig::from_json_str(r#"{
//!     "phases": [{
//!         "name": "air",
//!         "equationOfState": {"type": "idealGas", "coeffs": {"gamma": 1.4, "cv": 718.0}},
//!         "transport": {"type": "const", "coeffs": {"mu": 1.8e-5, "Pr": 0.7}}
//!     }]
//! }"#).unwrap();
//! let mesh = FvMesh::uniform_1d(10, 1.0, PatchKind::Wall, PatchKind::Wall).unwrap();
//! let mut system = CompressibleSystem::new(mesh, &cfg).unwrap();
//! system.set_uniform(&CellState::single(1.2, Vector3::zeros(), 1e5)).unwrap();
//! let dt = system.stable_delta_t(0.5);
//! integrate_step(&mut system, &RkScheme::rk2_ssp(), dt).unwrap();
//! // a fluid at rest between walls stays at rest
//! assert!((system.p().max() - 1e5).abs() < 1e-6);
//! ```
pub mod closure;
pub mod conserved;
pub mod errors;
pub mod phase;
pub mod properties;
pub mod stage_storage;
pub mod system;

pub use closure::{CLOSURES, Multiphase, PhaseClosure, PhaseClosureEnum, SinglePhase, TwoPhase, create_closure};
pub use conserved::ConservedState;
pub use errors::{Lifecycle, SystemError};
pub use phase::Phase;
pub use stage_storage::{StageStorage, StorageDescriptor};
pub use system::{CellState, CompressibleSystem, ThermalState};

#[cfg(test)]
mod system_tests;
