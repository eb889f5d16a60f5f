//! Mixing rules over a runtime-sized list of phases.
//!
//! | property | rule |
//! |----------|------|
//! | ρ        | Σ αᵢρᵢ |
//! | p        | (ρe − Σ αᵢΠᵢ/Γᵢ) / Σ αᵢ/Γᵢ  (pressure equilibrium) |
//! | Cv, Cp   | mass-fraction weighted |
//! | μ, κ, αh | volume-fraction weighted |
//! | αhe      | κ / Cv |
//! | c²       | Σ Yᵢ ξᵢ cᵢ² / Σ αᵢ ξᵢ,  ξᵢ = 1/Γᵢ |
//! | T        | Σ Yᵢ Cvᵢ Tᵢ / Σ Yᵢ Cvᵢ |
//!
//! Each rule is written once, here. Bulk and patch accessors gather the phase states
//! of a cell (or a boundary face) into a slice of `PhaseCellState` and call the same
//! function. Phases are summed in list order.
use super::phase_thermo::PhaseThermo;

/// Primitive state of one phase at one location
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhaseCellState {
    pub alpha: f64,
    pub rho: f64,
    pub e: f64,
    pub t: f64,
}

impl PhaseCellState {
    pub fn new(alpha: f64, rho: f64, e: f64, t: f64) -> Self {
        Self { alpha, rho, e, t }
    }

    #[inline]
    pub fn alpha_rho(&self) -> f64 {
        self.alpha * self.rho
    }

    #[inline]
    fn has_mass(&self) -> bool {
        self.alpha_rho() > 0.0 && self.rho > 0.0
    }
}

pub struct MixtureCell<'a> {
    phases: &'a [PhaseThermo],
    states: &'a [PhaseCellState],
}

impl<'a> MixtureCell<'a> {
    pub fn new(phases: &'a [PhaseThermo], states: &'a [PhaseCellState]) -> Self {
        debug_assert_eq!(phases.len(), states.len());
        Self { phases, states }
    }

    fn iter(&self) -> impl Iterator<Item = (&'a PhaseThermo, &'a PhaseCellState)> {
        self.phases.iter().zip(self.states.iter())
    }

    pub fn rho(&self) -> f64 {
        self.states.iter().map(|s| s.alpha_rho()).sum()
    }

    /// Pressure from the mixture internal energy density ρe
    pub fn pressure(&self, rho_e: f64) -> f64 {
        let mut pi_sum = 0.0;
        let mut xi_sum = 0.0;
        for (phase, s) in self.iter() {
            let rho = s.rho.max(f64::MIN_POSITIVE);
            let gamma_m1 = phase.gamma_minus_one(rho);
            pi_sum += s.alpha * phase.pi_term(rho) / gamma_m1;
            xi_sum += s.alpha / gamma_m1;
        }
        (rho_e - pi_sum) / xi_sum
    }

    pub fn cv(&self) -> f64 {
        let rho = self.rho();
        self.iter()
            .filter(|(_, s)| s.has_mass())
            .map(|(phase, s)| s.alpha_rho() * phase.cv(s.rho, s.e, s.t))
            .sum::<f64>()
            / rho
    }

    pub fn cp(&self) -> f64 {
        let rho = self.rho();
        self.iter()
            .filter(|(_, s)| s.has_mass())
            .map(|(phase, s)| s.alpha_rho() * phase.cp(s.rho, s.e, s.t))
            .sum::<f64>()
            / rho
    }

    pub fn mu(&self) -> f64 {
        self.iter()
            .map(|(phase, s)| s.alpha * phase.mu(s.rho, s.e, s.t))
            .sum()
    }

    pub fn kappa(&self) -> f64 {
        self.iter()
            .map(|(phase, s)| s.alpha * phase.kappa(s.rho, s.e, s.t))
            .sum()
    }

    /// Enthalpy diffusivity
    pub fn alphah(&self) -> f64 {
        self.iter()
            .map(|(phase, s)| s.alpha * phase.alphah(s.rho, s.e, s.t))
            .sum()
    }

    /// Internal energy diffusivity
    pub fn alphahe(&self) -> f64 {
        self.kappa() / self.cv()
    }

    /// Frozen mixture speed of sound squared at pressure p
    pub fn speed_of_sound_sqr(&self, p: f64) -> f64 {
        let rho = self.rho();
        let mut num = 0.0;
        let mut xi_sum = 0.0;
        for (phase, s) in self.iter() {
            let xi = 1.0 / phase.gamma_minus_one(s.rho.max(f64::MIN_POSITIVE));
            xi_sum += s.alpha * xi;
            if s.has_mass() {
                num += s.alpha_rho() / rho * xi * phase.speed_of_sound_sqr(s.rho, s.e, p);
            }
        }
        num / xi_sum
    }

    /// Heat-capacity weighted mixture temperature
    pub fn temperature(&self) -> f64 {
        let mut num = 0.0;
        let mut den = 0.0;
        for (phase, s) in self.iter().filter(|(_, s)| s.has_mass()) {
            let w = s.alpha_rho() * phase.cv(s.rho, s.e, s.t);
            num += w * s.t;
            den += w;
        }
        num / den
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Thermodynamics::eos_api::{EosEnum, EquationOfState, IdealGas, StiffenedGas};
    use crate::Thermodynamics::transport_api::{ConstTransport, TransportEnum};
    use approx::assert_relative_eq;

    fn air() -> PhaseThermo {
        PhaseThermo::new(
            "air",
            EosEnum::IdealGas(IdealGas::new(1.4, 718.0)),
            TransportEnum::Const(ConstTransport::new(1.8e-5, 0.7)),
        )
    }

    fn water() -> PhaseThermo {
        PhaseThermo::new(
            "water",
            EosEnum::StiffenedGas(StiffenedGas::new(4.4, 6e8, 1816.0)),
            TransportEnum::Const(ConstTransport::new(1e-3, 7.0)),
        )
    }

    fn state_at(phase: &PhaseThermo, alpha: f64, rho: f64, p: f64) -> PhaseCellState {
        let e = phase.e_from_pressure(rho, p);
        PhaseCellState::new(alpha, rho, e, phase.t_from_e(rho, e))
    }

    #[test]
    fn single_phase_reduces_to_phase_values() {
        let phases = vec![air()];
        let s = state_at(&phases[0], 1.0, 1.2, 1e5);
        let states = vec![s];
        let mix = MixtureCell::new(&phases, &states);
        assert_relative_eq!(mix.rho(), 1.2);
        assert_relative_eq!(mix.pressure(1.2 * s.e), 1e5, max_relative = 1e-12);
        assert_relative_eq!(mix.cv(), 718.0);
        assert_relative_eq!(mix.cp(), 1.4 * 718.0);
        assert_relative_eq!(mix.temperature(), s.t);
        assert_relative_eq!(mix.speed_of_sound_sqr(1e5), 1.4 * 1e5 / 1.2, max_relative = 1e-12);
        assert_relative_eq!(mix.alphahe(), mix.kappa() / 718.0);
    }

    #[test]
    fn pressure_equilibrium_rule_recovers_common_pressure() {
        let phases = vec![water(), air()];
        let p = 2e5;
        let states = vec![
            state_at(&phases[0], 0.3, 1000.0, p),
            state_at(&phases[1], 0.7, 1.2, p),
        ];
        let mix = MixtureCell::new(&phases, &states);
        let rho_e: f64 = states.iter().map(|s| s.alpha_rho() * s.e).sum();
        assert_relative_eq!(mix.pressure(rho_e), p, max_relative = 1e-9);
        let c2 = mix.speed_of_sound_sqr(p);
        assert!(c2 > 0.0 && c2.is_finite());
        // volume-fraction weighted viscosity
        assert_relative_eq!(mix.mu(), 0.3 * 1e-3 + 0.7 * 1.8e-5, max_relative = 1e-12);
    }

    #[test]
    fn massless_phase_does_not_pollute_mixture() {
        let phases = vec![air(), water()];
        let states = vec![
            state_at(&phases[0], 1.0, 1.2, 1e5),
            PhaseCellState::new(0.0, 0.0, 0.0, 0.0),
        ];
        let mix = MixtureCell::new(&phases, &states);
        assert_relative_eq!(mix.cv(), 718.0);
        assert_relative_eq!(mix.temperature(), states[0].t);
        assert!(mix.speed_of_sound_sqr(1e5).is_finite());
        let single = air().eos.speed_of_sound_sqr(1.2, states[0].e, 1e5);
        assert_relative_eq!(mix.speed_of_sound_sqr(1e5), single, max_relative = 1e-12);
    }
}
