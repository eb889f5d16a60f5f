use super::ThermoError;
use crate::config::ConfigError;
use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// Common trait for equations of state written in Mie–Grüneisen form
//      p = Γ(ρ) ρ e − Π(ρ)
// All phases are calorically perfect: e(ρ, T) = Cv T + e0(ρ).
#[enum_dispatch]
pub trait EquationOfState {
    fn name(&self) -> &'static str;
    fn validate(&self) -> Result<(), ThermoError>;
    /// Grüneisen coefficient Γ
    fn gamma_minus_one(&self, rho: f64) -> f64;
    /// stiffness term Π [Pa]
    fn pi_term(&self, rho: f64) -> f64;
    fn cv(&self, rho: f64, e: f64, t: f64) -> f64;
    fn cp(&self, rho: f64, e: f64, t: f64) -> f64;
    fn e_from_t(&self, rho: f64, t: f64) -> f64;
    fn t_from_e(&self, rho: f64, e: f64) -> f64;
    fn speed_of_sound_sqr(&self, rho: f64, e: f64, p: f64) -> f64;

    fn pressure(&self, rho: f64, e: f64) -> f64 {
        self.gamma_minus_one(rho) * rho * e - self.pi_term(rho)
    }
    /// inverse of `pressure` for a given density
    fn e_from_pressure(&self, rho: f64, p: f64) -> f64 {
        (p + self.pi_term(rho)) / (self.gamma_minus_one(rho) * rho)
    }
}

/// Calorically perfect ideal gas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdealGas {
    pub gamma: f64,
    /// [J/kg/K]
    pub cv: f64,
}

impl IdealGas {
    pub fn new(gamma: f64, cv: f64) -> Self {
        Self { gamma, cv }
    }
}

impl EquationOfState for IdealGas {
    fn name(&self) -> &'static str {
        "idealGas"
    }
    fn validate(&self) -> Result<(), ThermoError> {
        validate_gamma(self.name(), self.gamma)?;
        validate_positive(self.name(), "cv", self.cv)
    }
    fn gamma_minus_one(&self, _rho: f64) -> f64 {
        self.gamma - 1.0
    }
    fn pi_term(&self, _rho: f64) -> f64 {
        0.0
    }
    fn cv(&self, _rho: f64, _e: f64, _t: f64) -> f64 {
        self.cv
    }
    fn cp(&self, _rho: f64, _e: f64, _t: f64) -> f64 {
        self.gamma * self.cv
    }
    fn e_from_t(&self, _rho: f64, t: f64) -> f64 {
        self.cv * t
    }
    fn t_from_e(&self, _rho: f64, e: f64) -> f64 {
        e / self.cv
    }
    fn speed_of_sound_sqr(&self, rho: f64, _e: f64, p: f64) -> f64 {
        self.gamma * p / rho
    }
}

/// Stiffened gas, the usual closure for liquids in shock problems:
///     p = (γ − 1) ρ e − γ p∞,   e = Cv T + p∞/ρ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StiffenedGas {
    pub gamma: f64,
    /// [Pa]
    pub p_inf: f64,
    /// [J/kg/K]
    pub cv: f64,
}

impl StiffenedGas {
    pub fn new(gamma: f64, p_inf: f64, cv: f64) -> Self {
        Self { gamma, p_inf, cv }
    }
}

impl EquationOfState for StiffenedGas {
    fn name(&self) -> &'static str {
        "stiffenedGas"
    }
    fn validate(&self) -> Result<(), ThermoError> {
        validate_gamma(self.name(), self.gamma)?;
        validate_positive(self.name(), "cv", self.cv)?;
        if self.p_inf < 0.0 {
            return Err(ThermoError::InvalidCoefficient {
                model: self.name(),
                name: "p_inf",
                value: self.p_inf,
            });
        }
        Ok(())
    }
    fn gamma_minus_one(&self, _rho: f64) -> f64 {
        self.gamma - 1.0
    }
    fn pi_term(&self, _rho: f64) -> f64 {
        self.gamma * self.p_inf
    }
    fn cv(&self, _rho: f64, _e: f64, _t: f64) -> f64 {
        self.cv
    }
    fn cp(&self, _rho: f64, _e: f64, _t: f64) -> f64 {
        self.gamma * self.cv
    }
    fn e_from_t(&self, rho: f64, t: f64) -> f64 {
        self.cv * t + self.p_inf / rho
    }
    fn t_from_e(&self, rho: f64, e: f64) -> f64 {
        (e - self.p_inf / rho) / self.cv
    }
    fn speed_of_sound_sqr(&self, rho: f64, _e: f64, p: f64) -> f64 {
        self.gamma * (p + self.p_inf) / rho
    }
}

fn validate_gamma(model: &'static str, gamma: f64) -> Result<(), ThermoError> {
    if gamma > 1.0 && gamma.is_finite() {
        Ok(())
    } else {
        Err(ThermoError::InvalidCoefficient {
            model,
            name: "gamma",
            value: gamma,
        })
    }
}

fn validate_positive(model: &'static str, name: &'static str, value: f64) -> Result<(), ThermoError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ThermoError::InvalidCoefficient { model, name, value })
    }
}

/////////////////////////////////////////////////////////////////////////////////////////
// FACTORY METHODS  ////////////////////////////////////////////////////////////////////
#[derive(Debug, Clone, PartialEq)]
#[enum_dispatch(EquationOfState)]
pub enum EosEnum {
    IdealGas(IdealGas),
    StiffenedGas(StiffenedGas),
}

pub const EOS_MODELS: [&str; 2] = ["idealGas", "stiffenedGas"];

/// Builds and validates an equation of state from its type name and coefficient block
pub fn create_eos_by_name(name: &str, coeffs: &Value) -> Result<EosEnum, ConfigError> {
    let eos = match name {
        "idealGas" => EosEnum::IdealGas(serde_json::from_value(coeffs.clone())?),
        "stiffenedGas" => EosEnum::StiffenedGas(serde_json::from_value(coeffs.clone())?),
        _ => {
            return Err(ConfigError::unknown_model(
                "equationOfState",
                name,
                &EOS_MODELS,
            ));
        }
    };
    eos.validate()?;
    Ok(eos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    #[test]
    fn ideal_gas_closure() {
        let air = IdealGas::new(1.4, 718.0);
        let rho = 1.2;
        let e = air.e_from_t(rho, 300.0);
        let p = air.pressure(rho, e);
        assert_relative_eq!(p, 0.4 * rho * 718.0 * 300.0, epsilon = 1e-9);
        assert_relative_eq!(air.e_from_pressure(rho, p), e, epsilon = 1e-9);
        assert_relative_eq!(air.t_from_e(rho, e), 300.0, epsilon = 1e-12);
        assert_relative_eq!(air.speed_of_sound_sqr(rho, e, p), 1.4 * p / rho);
    }

    #[test]
    fn stiffened_gas_closure() {
        let water = StiffenedGas::new(4.4, 6e8, 1816.0);
        let rho = 1000.0;
        let e = water.e_from_t(rho, 300.0);
        let p = water.pressure(rho, e);
        // p = (γ − 1) ρ Cv T − p∞
        assert_relative_eq!(p, 3.4 * rho * 1816.0 * 300.0 - 6e8, max_relative = 1e-12);
        assert_relative_eq!(water.t_from_e(rho, e), 300.0, max_relative = 1e-12);
        assert_relative_eq!(water.e_from_pressure(rho, p), e, max_relative = 1e-12);
        assert!(water.speed_of_sound_sqr(rho, e, p) > 0.0);
    }

    #[test]
    fn factory_by_name() {
        let eos = create_eos_by_name("stiffenedGas", &json!({"gamma": 4.4, "p_inf": 6e8, "cv": 1816.0}))
            .unwrap();
        assert_eq!(eos.name(), "stiffenedGas");
        let err = create_eos_by_name("JWL", &json!({})).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("JWL"));
        assert!(msg.contains("idealGas"));
        assert!(msg.contains("stiffenedGas"));
        let err = create_eos_by_name("idealGas", &json!({"gamma": 0.9, "cv": 718.0})).unwrap_err();
        assert!(matches!(err, ConfigError::Thermo(ThermoError::InvalidCoefficient { name: "gamma", .. })));
    }
}
