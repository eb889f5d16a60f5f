use super::eos_api::{EosEnum, EquationOfState, create_eos_by_name};
use super::transport_api::{TransportEnum, TransportModel, create_transport_by_name};
use crate::config::{ConfigError, PhaseConfig};

/// Thermodynamic description of one phase: an equation of state plus a transport model
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseThermo {
    pub name: String,
    pub eos: EosEnum,
    pub transport: TransportEnum,
}

impl PhaseThermo {
    pub fn new(name: &str, eos: EosEnum, transport: TransportEnum) -> Self {
        Self {
            name: name.to_string(),
            eos,
            transport,
        }
    }

    pub fn from_config(cfg: &PhaseConfig) -> Result<Self, ConfigError> {
        let eos = create_eos_by_name(&cfg.equation_of_state.model, &cfg.equation_of_state.coeffs)?;
        let transport = create_transport_by_name(&cfg.transport.model, &cfg.transport.coeffs)?;
        Ok(Self::new(&cfg.name, eos, transport))
    }

    pub fn gamma_minus_one(&self, rho: f64) -> f64 {
        self.eos.gamma_minus_one(rho)
    }

    pub fn pi_term(&self, rho: f64) -> f64 {
        self.eos.pi_term(rho)
    }

    pub fn pressure(&self, rho: f64, e: f64) -> f64 {
        self.eos.pressure(rho, e)
    }

    pub fn e_from_pressure(&self, rho: f64, p: f64) -> f64 {
        self.eos.e_from_pressure(rho, p)
    }

    pub fn e_from_t(&self, rho: f64, t: f64) -> f64 {
        self.eos.e_from_t(rho, t)
    }

    pub fn t_from_e(&self, rho: f64, e: f64) -> f64 {
        self.eos.t_from_e(rho, e)
    }

    pub fn cv(&self, rho: f64, e: f64, t: f64) -> f64 {
        self.eos.cv(rho, e, t)
    }

    pub fn cp(&self, rho: f64, e: f64, t: f64) -> f64 {
        self.eos.cp(rho, e, t)
    }

    pub fn speed_of_sound_sqr(&self, rho: f64, e: f64, p: f64) -> f64 {
        self.eos.speed_of_sound_sqr(rho, e, p)
    }

    pub fn mu(&self, rho: f64, e: f64, t: f64) -> f64 {
        self.transport.mu(rho, e, t)
    }

    pub fn kappa(&self, rho: f64, e: f64, t: f64) -> f64 {
        let cp = self.cp(rho, e, t);
        self.transport.kappa(cp, rho, e, t)
    }

    pub fn alphah(&self, rho: f64, e: f64, t: f64) -> f64 {
        self.transport.alphah(rho, e, t)
    }
}
