//! Per-variant specialisation of the compressible system: which volume fractions are
//! transported, how they are normalised and how phase densities follow from the
//! conserved phase masses (`calc_alpha_and_rho`).
use super::conserved::ConservedState;
use super::errors::SystemError;
use super::phase::Phase;
use crate::config::ConfigError;
use enum_dispatch::enum_dispatch;
use nalgebra::DVector;

#[enum_dispatch]
pub trait PhaseClosure {
    fn name(&self) -> &'static str;
    /// Number of volume fractions carried in the conserved state
    fn n_transported_alphas(&self, n_phases: usize) -> usize;
    /// Brings the transported fractions back to Σα = 1 after clipping
    fn normalise_volume_fractions(&self, alphas: &mut [DVector<f64>], stage: usize) -> Result<(), SystemError>;
    fn calc_alpha_and_rho(&self, conserved: &ConservedState, phases: &mut [Phase], residual_alpha: f64);
}

/// ρᵢ = αᵢρᵢ / max(αᵢ, residual)
fn densities_from_masses(conserved: &ConservedState, phases: &mut [Phase], residual_alpha: f64) {
    for (phase, alpha_rho) in phases.iter_mut().zip(&conserved.alpha_rhos) {
        for celli in 0..alpha_rho.len() {
            let alpha = phase.alpha.get(celli).max(residual_alpha);
            phase.rho.set(celli, alpha_rho[celli] / alpha);
        }
    }
}

/// One phase, α ≡ 1. Leaves a decoded state untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SinglePhase;

impl PhaseClosure for SinglePhase {
    fn name(&self) -> &'static str {
        "singlePhase"
    }
    fn n_transported_alphas(&self, _n_phases: usize) -> usize {
        0
    }
    fn normalise_volume_fractions(&self, _alphas: &mut [DVector<f64>], _stage: usize) -> Result<(), SystemError> {
        Ok(())
    }
    fn calc_alpha_and_rho(&self, conserved: &ConservedState, phases: &mut [Phase], _residual_alpha: f64) {
        let phase = &mut phases[0];
        phase.alpha.internal_mut().fill(1.0);
        phase.rho.internal_mut().copy_from(&conserved.alpha_rhos[0]);
    }
}

/// Two phases, only α₁ is transported and α₂ = 1 − α₁
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TwoPhase;

impl PhaseClosure for TwoPhase {
    fn name(&self) -> &'static str {
        "twoPhase"
    }
    fn n_transported_alphas(&self, _n_phases: usize) -> usize {
        1
    }
    fn normalise_volume_fractions(&self, _alphas: &mut [DVector<f64>], _stage: usize) -> Result<(), SystemError> {
        Ok(())
    }
    fn calc_alpha_and_rho(&self, conserved: &ConservedState, phases: &mut [Phase], residual_alpha: f64) {
        let alpha1 = &conserved.alphas[0];
        for celli in 0..alpha1.len() {
            phases[0].alpha.set(celli, alpha1[celli]);
            phases[1].alpha.set(celli, 1.0 - alpha1[celli]);
        }
        densities_from_masses(conserved, phases, residual_alpha);
    }
}

/// Any number of phases, every volume fraction transported
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Multiphase;

impl PhaseClosure for Multiphase {
    fn name(&self) -> &'static str {
        "multiphase"
    }
    fn n_transported_alphas(&self, n_phases: usize) -> usize {
        n_phases
    }
    fn normalise_volume_fractions(&self, alphas: &mut [DVector<f64>], stage: usize) -> Result<(), SystemError> {
        let n_cells = alphas.first().map_or(0, |a| a.len());
        for celli in 0..n_cells {
            let sum: f64 = alphas.iter().map(|a| a[celli]).sum();
            if !(sum > 0.0) {
                return Err(SystemError::AlphaOutOfBounds {
                    field: "sum(alpha)".to_string(),
                    cell: celli,
                    stage,
                    value: sum,
                });
            }
            for a in alphas.iter_mut() {
                a[celli] /= sum;
            }
        }
        Ok(())
    }
    fn calc_alpha_and_rho(&self, conserved: &ConservedState, phases: &mut [Phase], residual_alpha: f64) {
        for (phase, alpha) in phases.iter_mut().zip(&conserved.alphas) {
            phase.alpha.internal_mut().copy_from(alpha);
        }
        densities_from_masses(conserved, phases, residual_alpha);
    }
}

/////////////////////////////////////////////////////////////////////////////////////////
// FACTORY METHODS  ////////////////////////////////////////////////////////////////////
#[derive(Debug, Clone, PartialEq)]
#[enum_dispatch(PhaseClosure)]
pub enum PhaseClosureEnum {
    SinglePhase(SinglePhase),
    TwoPhase(TwoPhase),
    Multiphase(Multiphase),
}

pub const CLOSURES: [&str; 3] = ["singlePhase", "twoPhase", "multiphase"];

/// Picks the closure by name, or by phase count when no name is given
pub fn create_closure(name: Option<&str>, n_phases: usize) -> Result<PhaseClosureEnum, ConfigError> {
    let name = name.unwrap_or(match n_phases {
        1 => "singlePhase",
        2 => "twoPhase",
        _ => "multiphase",
    });
    let (closure, admissible) = match name {
        "singlePhase" => (PhaseClosureEnum::SinglePhase(SinglePhase), n_phases == 1),
        "twoPhase" => (PhaseClosureEnum::TwoPhase(TwoPhase), n_phases == 2),
        "multiphase" => (PhaseClosureEnum::Multiphase(Multiphase), n_phases >= 2),
        _ => return Err(ConfigError::unknown_model("closure", name, &CLOSURES)),
    };
    if !admissible {
        return Err(ConfigError::invalid(
            "closure",
            format!("'{}' cannot be used with {} phase(s)", name, n_phases),
        ));
    }
    Ok(closure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn closure_selection() {
        assert_eq!(create_closure(None, 1).unwrap().name(), "singlePhase");
        assert_eq!(create_closure(None, 2).unwrap().name(), "twoPhase");
        assert_eq!(create_closure(None, 3).unwrap().name(), "multiphase");
        assert_eq!(create_closure(Some("multiphase"), 2).unwrap().name(), "multiphase");
        assert!(matches!(create_closure(Some("twoPhase"), 3), Err(ConfigError::Invalid { .. })));
        assert!(matches!(create_closure(Some("fourPhase"), 4), Err(ConfigError::UnknownModel { .. })));
    }

    #[test]
    fn renormalisation_restores_unit_sum() {
        let mut alphas = vec![
            DVector::from_vec(vec![0.5, 0.2]),
            DVector::from_vec(vec![0.6, 0.2]),
        ];
        Multiphase.normalise_volume_fractions(&mut alphas, 0).unwrap();
        for celli in 0..2 {
            assert_relative_eq!(alphas[0][celli] + alphas[1][celli], 1.0, epsilon = 1e-15);
        }
        let mut zeros = vec![DVector::from_vec(vec![0.0]), DVector::from_vec(vec![0.0])];
        assert!(Multiphase.normalise_volume_fractions(&mut zeros, 2).is_err());
    }
}
