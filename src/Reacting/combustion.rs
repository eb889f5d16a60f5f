use super::mechanism::Mechanism;
use crate::config::ConfigError;
use std::fmt::Debug;

/// Decoded state of one cell as seen by a combustion model
#[derive(Debug, Clone, Copy)]
pub struct CellComposition<'a> {
    pub rho: f64,
    pub t: f64,
    pub y: &'a [f64],
}

/// Reaction-rate collaborator. Implementations write the species mass sources
/// [kg/m³/s] into `species_rates` and return the energy source [W/m³].
pub trait CombustionModel: Debug {
    fn name(&self) -> &str;
    fn source_term(&self, cell: &CellComposition, species_rates: &mut [f64]) -> f64;
}

#[derive(Debug, Clone, Default)]
pub struct NoCombustion;

impl CombustionModel for NoCombustion {
    fn name(&self) -> &str {
        "none"
    }
    fn source_term(&self, _cell: &CellComposition, species_rates: &mut [f64]) -> f64 {
        species_rates.iter_mut().for_each(|r| *r = 0.0);
        0.0
    }
}

/// Laminar finite-rate chemistry straight from the mechanism
#[derive(Debug, Clone)]
pub struct ArrheniusCombustion {
    mechanism: Mechanism,
}

impl ArrheniusCombustion {
    pub fn new(mechanism: Mechanism) -> Self {
        Self { mechanism }
    }
    pub fn mechanism(&self) -> &Mechanism {
        &self.mechanism
    }
}

impl CombustionModel for ArrheniusCombustion {
    fn name(&self) -> &str {
        "arrhenius"
    }
    fn source_term(&self, cell: &CellComposition, species_rates: &mut [f64]) -> f64 {
        self.mechanism
            .source_terms(cell.rho, cell.t, cell.y, species_rates)
    }
}

pub const COMBUSTION_MODELS: [&str; 2] = ["none", "arrhenius"];

pub fn create_combustion_model(
    name: &str,
    mechanism: Mechanism,
) -> Result<Box<dyn CombustionModel>, ConfigError> {
    match name {
        "none" => Ok(Box::new(NoCombustion)),
        "arrhenius" => Ok(Box::new(ArrheniusCombustion::new(mechanism))),
        _ => Err(ConfigError::unknown_model(
            "combustionModel",
            name,
            &COMBUSTION_MODELS,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_combustion_zeroes_rates() {
        let mut rates = [1.0, 2.0];
        let cell = CellComposition {
            rho: 1.0,
            t: 300.0,
            y: &[0.5, 0.5],
        };
        assert_eq!(NoCombustion.source_term(&cell, &mut rates), 0.0);
        assert_eq!(rates, [0.0, 0.0]);
    }

    #[test]
    fn factory_lists_models() {
        let mech = Mechanism::new(vec!["A".to_string()], vec![0.029]);
        assert_eq!(create_combustion_model("arrhenius", mech.clone()).unwrap().name(), "arrhenius");
        let err = create_combustion_model("EDC", mech).unwrap_err();
        assert!(err.to_string().contains("none, arrhenius"));
    }
}
