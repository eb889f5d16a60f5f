use crate::FluxSchemes::FluxError;
use crate::Mesh::fv_mesh::MeshError;
use crate::Reacting::ReactionError;
use crate::Thermodynamics::ThermoError;
use crate::config::ConfigError;
use thiserror::Error;

/// Where a system is in the stage protocol of one outer time step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    FieldsSet { n_steps: usize },
    StageRunning { stage: usize, n_steps: usize },
    Cleared,
}

#[derive(Debug, Error)]
pub enum SystemError {
    #[error("{operation} is not allowed in state {state:?}")]
    Lifecycle {
        operation: &'static str,
        state: Lifecycle,
    },
    #[error("Stage {stepi} out of range for {n_steps} declared stages")]
    StageOutOfRange { stepi: usize, n_steps: usize },
    #[error("Stage {stepi} needs {expected} blending coefficients, got {got_a} (a) and {got_b} (b)")]
    CoefficientLength {
        stepi: usize,
        expected: usize,
        got_a: usize,
        got_b: usize,
    },
    #[error("Stage {stepi} uses the {kind} of stage {slot}, which was not stored")]
    MissingStorage {
        stepi: usize,
        slot: usize,
        kind: &'static str,
    },
    #[error("setODEFields declared {n_steps} stages but got {got_old} old and {got_delta} delta flags")]
    StorageFlagLength {
        n_steps: usize,
        got_old: usize,
        got_delta: usize,
    },
    #[error("Time step is not set or not positive")]
    DeltaTNotSet,
    #[error("Invalid initial state at cell {cell}: {reason}")]
    InvalidInitialState { cell: usize, reason: String },
    #[error("Negative mass {value} in '{field}' at cell {cell} during stage {stage}")]
    NegativeMass {
        field: String,
        cell: usize,
        stage: usize,
        value: f64,
    },
    #[error("Non-finite value in '{field}' at cell {cell} during stage {stage}")]
    NonFinite {
        field: String,
        cell: usize,
        stage: usize,
    },
    #[error("Volume fraction {value} of '{field}' outside [0, 1] at cell {cell} during stage {stage}")]
    AlphaOutOfBounds {
        field: String,
        cell: usize,
        stage: usize,
        value: f64,
    },
    #[error("Non-physical {quantity} {value} in '{field}' at cell {cell} during stage {stage}")]
    NonPhysicalStage {
        quantity: &'static str,
        field: String,
        cell: usize,
        stage: usize,
        value: f64,
    },
    #[error("Flux failure at {face}: {source}")]
    Flux {
        face: String,
        #[source]
        source: FluxError,
    },
    #[error(transparent)]
    Thermo(#[from] ThermoError),
    #[error(transparent)]
    Mesh(#[from] MeshError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Reaction(#[from] ReactionError),
}

impl SystemError {
    /// Stage failures the driver may retry with a smaller time step
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SystemError::NegativeMass { .. }
                | SystemError::NonFinite { .. }
                | SystemError::AlphaOutOfBounds { .. }
                | SystemError::NonPhysicalStage { .. }
                | SystemError::Flux { .. }
        )
    }

    /// A decode failure of a blended state belongs to the stage that produced it
    pub fn in_stage(self, stage: usize) -> Self {
        match self {
            SystemError::Thermo(ThermoError::NonPositiveDensity { field, cell, value }) => {
                SystemError::NonPhysicalStage {
                    quantity: "density",
                    field,
                    cell,
                    stage,
                    value,
                }
            }
            SystemError::Thermo(ThermoError::NonPositiveTemperature { field, cell, value }) => {
                SystemError::NonPhysicalStage {
                    quantity: "temperature",
                    field,
                    cell,
                    stage,
                    value,
                }
            }
            other => other,
        }
    }
}
