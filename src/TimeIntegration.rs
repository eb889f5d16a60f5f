//! # Explicit Multi-Stage Time Integration
//!
//! ## Aim
//! Coefficient tables of explicit Runge–Kutta schemes in the Shu–Osher form consumed by
//! `CompressibleSystem::solve`, and a driver that advances a system through complete
//! outer time steps.
//!
//! ## Main Data Structures and Logic
//! - `RkScheme`: per stage i the blending coefficients a[i][0..=i] (old states and the
//!   current state) and b[i][0..=i] (stored rates and the current rate). Which stages have
//!   to keep their entry state or their rate is read off the table
//!   (`storage_descriptors`), so a system allocates only what the scheme uses.
//! - `integrate_step`: one outer step `set_ode_fields → (update, solve) per stage →
//!   clear_ode_fields`. On a stage failure the conserved state of the step start is
//!   restored and the error returned, so the caller can retry with a smaller Δt.
//! - `run_until`: CFL-limited loop over `integrate_step`, halving Δt on recoverable
//!   failures.
//!
//! ## Usage
//! ```rust
//! use PhaseFV::TimeIntegration::RkScheme;
//! use PhaseFV::CompressibleSystem::StorageDescriptor;
//! let rk3 = RkScheme::by_name("rk3_ssp").unwrap();
//! assert_eq!(rk3.n_stages(), 3);
//! // the stage-0 entry state is reused by stages 1 and 2, nothing else is kept
//! assert_eq!(
//!     rk3.storage_descriptors(),
//!     vec![StorageDescriptor::OldOnly, StorageDescriptor::None, StorageDescriptor::None]
//! );
//! ```
pub mod driver;
pub mod rk_schemes;

pub use driver::{RunControls, RunSummary, integrate_step, run_until};
pub use rk_schemes::{RK_SCHEMES, RkScheme};
