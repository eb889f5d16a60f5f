//! # Function Objects
//!
//! ## Aim
//! Run-time post-processing hooked into the time loop. `FieldMax` keeps the cell-wise
//! running maximum of named fields (peak pressure maps, maximum temperature) over the
//! whole run.
//!
//! ## Main Data Structures and Logic
//! - `FieldMax`: for every listed field a `<field>Max` companion, created from the first
//!   field seen and afterwards updated with max(current, stored) in every cell and ghost
//!   face. `restart()` drops the companions so the next `execute` starts over; when
//!   `restart_on_restart` is set the caller restarts it together with a restarted run.
//! - Fields are read through `FieldLookup`, so any system that can name its fields works.
//!
//! ## Usage
//! ```rust, ignore
//! let mut peaks = FieldMax::new(vec!["p".to_string(), "T".to_string()], false);
//! run_until(&mut system, &scheme, &controls, |sys, _t| {
//!     peaks.execute(sys).unwrap();
//! })?;
//! peaks.summary_table().printstd();
//! ```
use thiserror::Error;

pub mod field_max;
pub use field_max::{FieldMax, FieldMaxConfig};

#[derive(Debug, Error, PartialEq)]
pub enum FunctionObjectError {
    #[error("Function object '{object}' cannot find field '{field}'")]
    UnknownField { object: &'static str, field: String },
    #[error("Field '{field}' changed size from {expected} to {got} cells")]
    SizeChanged {
        field: String,
        expected: usize,
        got: usize,
    },
}
