use super::ThermoError;
use crate::config::ConfigError;
use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// Common trait for transport calculations. Heat conduction follows from the viscosity
// through the Prandtl number for every model.
#[enum_dispatch]
pub trait TransportModel {
    fn name(&self) -> &'static str;
    fn validate(&self) -> Result<(), ThermoError>;
    /// Dynamic viscosity [kg/m/s]
    fn mu(&self, rho: f64, e: f64, t: f64) -> f64;
    fn prandtl(&self) -> f64;

    /// Thermal conductivity [W/m/K]
    fn kappa(&self, cp: f64, rho: f64, e: f64, t: f64) -> f64 {
        cp * self.mu(rho, e, t) / self.prandtl()
    }
    /// Thermal diffusivity of enthalpy [kg/m/s]
    fn alphah(&self, rho: f64, e: f64, t: f64) -> f64 {
        self.mu(rho, e, t) / self.prandtl()
    }
}

/// Constant viscosity and Prandtl number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstTransport {
    pub mu: f64,
    #[serde(rename = "Pr")]
    pub pr: f64,
}

impl ConstTransport {
    pub fn new(mu: f64, pr: f64) -> Self {
        Self { mu, pr }
    }
}

impl TransportModel for ConstTransport {
    fn name(&self) -> &'static str {
        "const"
    }
    fn validate(&self) -> Result<(), ThermoError> {
        if self.mu < 0.0 {
            return Err(ThermoError::InvalidCoefficient {
                model: self.name(),
                name: "mu",
                value: self.mu,
            });
        }
        validate_prandtl(self.name(), self.pr)
    }
    fn mu(&self, _rho: f64, _e: f64, _t: f64) -> f64 {
        self.mu
    }
    fn prandtl(&self) -> f64 {
        self.pr
    }
}

/// Sutherland's law  mu = As sqrt(T) / (1 + Ts/T)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SutherlandTransport {
    #[serde(rename = "As")]
    pub a_s: f64,
    #[serde(rename = "Ts")]
    pub t_s: f64,
    #[serde(rename = "Pr")]
    pub pr: f64,
}

impl SutherlandTransport {
    pub fn new(a_s: f64, t_s: f64, pr: f64) -> Self {
        Self { a_s, t_s, pr }
    }
}

impl TransportModel for SutherlandTransport {
    fn name(&self) -> &'static str {
        "sutherland"
    }
    fn validate(&self) -> Result<(), ThermoError> {
        if !(self.a_s > 0.0) {
            return Err(ThermoError::InvalidCoefficient {
                model: self.name(),
                name: "As",
                value: self.a_s,
            });
        }
        if self.t_s < 0.0 {
            return Err(ThermoError::InvalidCoefficient {
                model: self.name(),
                name: "Ts",
                value: self.t_s,
            });
        }
        validate_prandtl(self.name(), self.pr)
    }
    fn mu(&self, _rho: f64, _e: f64, t: f64) -> f64 {
        self.a_s * t.sqrt() / (1.0 + self.t_s / t)
    }
    fn prandtl(&self) -> f64 {
        self.pr
    }
}

fn validate_prandtl(model: &'static str, pr: f64) -> Result<(), ThermoError> {
    if pr > 0.0 && pr.is_finite() {
        Ok(())
    } else {
        Err(ThermoError::InvalidCoefficient {
            model,
            name: "Pr",
            value: pr,
        })
    }
}

/////////////////////////////////////////////////////////////////////////////////////////
// FACTORY METHODS  ////////////////////////////////////////////////////////////////////
#[derive(Debug, Clone, PartialEq)]
#[enum_dispatch(TransportModel)]
pub enum TransportEnum {
    Const(ConstTransport),
    Sutherland(SutherlandTransport),
}

pub const TRANSPORT_MODELS: [&str; 2] = ["const", "sutherland"];

pub fn create_transport_by_name(name: &str, coeffs: &Value) -> Result<TransportEnum, ConfigError> {
    let transport = match name {
        "const" => TransportEnum::Const(serde_json::from_value(coeffs.clone())?),
        "sutherland" => TransportEnum::Sutherland(serde_json::from_value(coeffs.clone())?),
        _ => {
            return Err(ConfigError::unknown_model(
                "transport",
                name,
                &TRANSPORT_MODELS,
            ));
        }
    };
    transport.validate()?;
    Ok(transport)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    #[test]
    fn const_transport_relations() {
        let tr = ConstTransport::new(1.8e-5, 0.7);
        assert_relative_eq!(tr.mu(1.2, 2e5, 300.0), 1.8e-5);
        assert_relative_eq!(tr.kappa(1005.0, 1.2, 2e5, 300.0), 1005.0 * 1.8e-5 / 0.7);
        assert_relative_eq!(tr.alphah(1.2, 2e5, 300.0), 1.8e-5 / 0.7);
    }

    #[test]
    fn sutherland_air() {
        // air: As = 1.458e-6, Ts = 110.4 gives ~1.85e-5 Pa s at 300 K
        let tr = SutherlandTransport::new(1.458e-6, 110.4, 0.7);
        assert_relative_eq!(tr.mu(1.2, 0.0, 300.0), 1.846e-5, epsilon = 1e-7);
    }

    #[test]
    fn factory_by_name() {
        let tr = create_transport_by_name("const", &json!({"mu": 1e-3, "Pr": 7.0})).unwrap();
        assert_eq!(tr.name(), "const");
        let tr = create_transport_by_name("sutherland", &json!({"As": 1.458e-6, "Ts": 110.4, "Pr": 0.7}))
            .unwrap();
        assert_eq!(tr.name(), "sutherland");
        assert!(create_transport_by_name("const", &json!({"mu": 1e-3, "Pr": 0.0})).is_err());
        let err = create_transport_by_name("polynomial", &json!({})).unwrap_err();
        assert!(err.to_string().contains("sutherland"));
    }
}
