//! # Error Estimators
//!
//! ## Aim
//! Refinement indicators for an external adaptive-mesh driver. An estimator looks up one
//! named cell field, measures how sharply it jumps across faces and exposes the result
//! as a non-negative cell field named `error`.
//!
//! ## Main Data Structures and Logic
//! - `ErrorEstimator` trait: `update(fields)` recomputes the indicator from anything that
//!   implements `FieldLookup` (the compressible system does), `error()` returns it.
//! - `Delta`: normalised face jump |x_N − x_O| / max(min(|x_O|, |x_N|), SMALL), reduced
//!   to cells by taking the largest value over each cell's faces. Boundary faces compare
//!   the owner with the patch ghost value.
//! - `create_error_estimator`: factory over `ERROR_ESTIMATORS`, configured by a
//!   `{"type": "delta", "coeffs": {"field": "rho"}}` block.
//!
//! ## Usage
//! ```rust
//! use PhaseFV::ErrorEstimators::{ErrorEstimator, create_error_estimator};
//! use PhaseFV::Mesh::fields::{FieldLookup, VolScalarField};
//! use PhaseFV::Mesh::fv_mesh::{FvMesh, PatchKind};
//! use PhaseFV::config::ModelConfig;
//! use serde_json::json;
//!
//! struct One(VolScalarField);
//! impl FieldLookup for One {
//!     fn lookup_scalar(&self, name: &str) -> Option<VolScalarField> {
//!         (name == self.0.name()).then(|| self.0.clone())
//!     }
//!     fn scalar_field_names(&self) -> Vec<String> {
//!         vec![self.0.name().to_string()]
//!     }
//! }
//! let mesh = FvMesh::uniform_1d(3, 1.0, PatchKind::ZeroGradient, PatchKind::ZeroGradient).unwrap();
//! let rho = VolScalarField::from_values("rho", &mesh, vec![1.0, 1.0, 2.0]).unwrap();
//! let mut est = create_error_estimator(&mesh, &ModelConfig::new("delta", json!({"field": "rho"}))).unwrap();
//! est.update(&mesh, &One(rho)).unwrap();
//! assert_eq!(est.error().internal().as_slice(), &[0.0, 1.0, 1.0]);
//! ```
use crate::Mesh::fields::{FieldLookup, VolScalarField};
use crate::Mesh::fv_mesh::FvMesh;
use crate::config::{ConfigError, ModelConfig};
use enum_dispatch::enum_dispatch;
use thiserror::Error;

pub mod delta;
pub use delta::Delta;

#[derive(Debug, Error, PartialEq)]
pub enum EstimatorError {
    #[error("Error estimator '{estimator}' cannot find field '{field}', known fields: {known}")]
    UnknownField {
        estimator: &'static str,
        field: String,
        known: String,
    },
}

#[enum_dispatch]
pub trait ErrorEstimator {
    fn name(&self) -> &'static str;
    /// Name of the field the indicator is built from
    fn field_name(&self) -> &str;
    fn update(&mut self, mesh: &FvMesh, fields: &dyn FieldLookup) -> Result<(), EstimatorError>;
    fn error(&self) -> &VolScalarField;
}

/////////////////////////////////////////////////////////////////////////////////////////
// FACTORY METHODS  ////////////////////////////////////////////////////////////////////
#[derive(Debug, Clone, PartialEq)]
#[enum_dispatch(ErrorEstimator)]
pub enum ErrorEstimatorEnum {
    Delta(Delta),
}

pub const ERROR_ESTIMATORS: [&str; 1] = ["delta"];

pub fn create_error_estimator(mesh: &FvMesh, cfg: &ModelConfig) -> Result<ErrorEstimatorEnum, ConfigError> {
    match cfg.model.as_str() {
        "delta" => {
            let field = cfg
                .coeffs
                .get("field")
                .and_then(|v| v.as_str())
                .ok_or_else(|| ConfigError::invalid("errorEstimator", "'delta' needs a 'field' entry"))?;
            Ok(ErrorEstimatorEnum::Delta(Delta::new(mesh, field)))
        }
        other => Err(ConfigError::unknown_model("errorEstimator", other, &ERROR_ESTIMATORS)),
    }
}
