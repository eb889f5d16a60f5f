use crate::config::{ConfigError, ModelConfig};
use serde::Deserialize;
use std::fmt::Debug;

/// Turbulence collaborator: maps a laminar diffusivity [kg/m/s] to the effective one
pub trait TurbulenceModel: Debug {
    fn name(&self) -> &str;
    fn effective_diffusivity(&self, base: f64) -> f64;
}

#[derive(Debug, Clone, Default)]
pub struct Laminar;

impl TurbulenceModel for Laminar {
    fn name(&self) -> &str {
        "laminar"
    }
    fn effective_diffusivity(&self, base: f64) -> f64 {
        base
    }
}

/// Adds a uniform turbulent diffusivity αt
#[derive(Debug, Clone, Deserialize)]
pub struct ConstantEddy {
    pub alphat: f64,
}

impl TurbulenceModel for ConstantEddy {
    fn name(&self) -> &str {
        "constantEddy"
    }
    fn effective_diffusivity(&self, base: f64) -> f64 {
        base + self.alphat
    }
}

pub const TURBULENCE_MODELS: [&str; 2] = ["laminar", "constantEddy"];

pub fn create_turbulence_model(cfg: Option<&ModelConfig>) -> Result<Box<dyn TurbulenceModel>, ConfigError> {
    let Some(cfg) = cfg else {
        return Ok(Box::new(Laminar));
    };
    match cfg.model.as_str() {
        "laminar" => Ok(Box::new(Laminar)),
        "constantEddy" => {
            let model: ConstantEddy = serde_json::from_value(cfg.coeffs.clone())?;
            if !(model.alphat >= 0.0) {
                return Err(ConfigError::invalid("alphat", "must be non-negative"));
            }
            Ok(Box::new(model))
        }
        other => Err(ConfigError::unknown_model("turbulence", other, &TURBULENCE_MODELS)),
    }
}
