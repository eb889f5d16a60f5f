//! Typed configuration read once when a system is constructed.
//!
//! A minimal two-phase document:
//! ```json
//! {
//!   "phases": [
//!     { "name": "water",
//!       "equationOfState": { "type": "stiffenedGas", "coeffs": { "gamma": 4.4, "p_inf": 6e8, "cv": 1816.0 } },
//!       "transport": { "type": "const", "coeffs": { "mu": 1e-3, "Pr": 7.0 } } },
//!     { "name": "air",
//!       "equationOfState": { "type": "idealGas", "coeffs": { "gamma": 1.4, "cv": 718.0 } },
//!       "transport": { "type": "const", "coeffs": { "mu": 1.8e-5, "Pr": 0.7 } } }
//!   ],
//!   "fluxScheme": "HLLC"
//! }
//! ```
use crate::Reacting::ReactionError;
use crate::Thermodynamics::ThermoError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown {kind} '{name}'. Valid options are: {known}")]
    UnknownModel {
        kind: &'static str,
        name: String,
        known: String,
    },
    #[error("Invalid entry '{entry}': {reason}")]
    Invalid { entry: String, reason: String },
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse configuration: {0}")]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Thermo(#[from] ThermoError),
    #[error(transparent)]
    Reaction(#[from] ReactionError),
}

impl ConfigError {
    pub fn unknown_model(kind: &'static str, name: &str, known: &[&str]) -> Self {
        ConfigError::UnknownModel {
            kind,
            name: name.to_string(),
            known: known.join(", "),
        }
    }

    pub fn invalid(entry: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            entry: entry.to_string(),
            reason: reason.into(),
        }
    }
}

/// `{ "type": ..., "coeffs": {...} }` selector used for every run-time selectable model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(rename = "type")]
    pub model: String,
    #[serde(default)]
    pub coeffs: Value,
}

impl ModelConfig {
    pub fn new(model: &str, coeffs: Value) -> Self {
        Self {
            model: model.to_string(),
            coeffs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseConfig {
    pub name: String,
    #[serde(rename = "equationOfState")]
    pub equation_of_state: ModelConfig,
    pub transport: ModelConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SolutionControls {
    /// below this volume fraction a phase density is not resolved from its mass
    pub residual_alpha: f64,
    /// admissible overshoot of α outside [0, 1] before a stage fails
    pub alpha_tolerance: f64,
    /// admissible negative phase (or species) mass [kg/m³] before a stage fails
    pub mass_tolerance: f64,
}

impl Default for SolutionControls {
    fn default() -> Self {
        Self {
            residual_alpha: 1e-10,
            alpha_tolerance: 1e-6,
            mass_tolerance: 1e-8,
        }
    }
}

impl SolutionControls {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (entry, value) in [
            ("residualAlpha", self.residual_alpha),
            ("alphaTolerance", self.alpha_tolerance),
            ("massTolerance", self.mass_tolerance),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(ConfigError::invalid(
                    entry,
                    format!("must be a finite non-negative number, got {}", value),
                ));
            }
        }
        if self.residual_alpha >= 1.0 {
            return Err(ConfigError::invalid("residualAlpha", "must be smaller than 1"));
        }
        Ok(())
    }
}

/// One reaction of a multi-step Arrhenius mechanism
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionEntry {
    /// e.g. "CH4 + 2 O2 => CO2 + 2 H2O"
    pub equation: String,
    /// pre-exponential factor, SI units consistent with the reaction order
    #[serde(rename = "A")]
    pub a: f64,
    /// temperature exponent
    #[serde(default)]
    pub n: f64,
    /// activation energy [J/mol]
    #[serde(rename = "Ea", default)]
    pub ea: f64,
    /// heat release [J/mol] per unit reaction progress
    #[serde(rename = "Q", default)]
    pub q: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionConfig {
    pub species: Vec<String>,
    /// [kg/mol], same order as `species`
    pub molar_masses: Vec<f64>,
    /// initial mass fractions, same order as `species`
    pub initial_mass_fractions: Vec<f64>,
    #[serde(default)]
    pub reactions: Vec<ReactionEntry>,
    #[serde(default)]
    pub inert_species: Option<String>,
    /// "none" or "arrhenius"; "arrhenius" when reactions are listed
    #[serde(default)]
    pub combustion_model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemConfig {
    pub phases: Vec<PhaseConfig>,
    #[serde(default = "default_flux_scheme")]
    pub flux_scheme: String,
    /// "singlePhase", "twoPhase" or "multiphase"; chosen from the phase count when absent
    #[serde(default)]
    pub closure: Option<String>,
    #[serde(default)]
    pub solution_controls: SolutionControls,
    #[serde(default)]
    pub reactions: Option<ReactionConfig>,
    #[serde(default)]
    pub turbulence: Option<ModelConfig>,
}

fn default_flux_scheme() -> String {
    "HLLC".to_string()
}

impl SystemConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: SystemConfig = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let cfg: SystemConfig = serde_json::from_value(value)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.phases.is_empty() {
            return Err(ConfigError::invalid("phases", "at least one phase is required"));
        }
        for (i, a) in self.phases.iter().enumerate() {
            if self.phases[..i].iter().any(|b| b.name == a.name) {
                return Err(ConfigError::invalid(
                    "phases",
                    format!("duplicate phase name '{}'", a.name),
                ));
            }
        }
        self.solution_controls.validate()?;
        if self.reactions.is_some() && self.phases.len() != 1 {
            return Err(ConfigError::invalid(
                "reactions",
                "reacting systems are single-phase",
            ));
        }
        Ok(())
    }
}
