use super::{R_GAS, ReactionError};
use crate::config::ReactionEntry;
use log::warn;
use prettytable::{Table, row};
use regex::Regex;

/// One irreversible Arrhenius reaction
#[derive(Debug, Clone, PartialEq)]
pub struct Reaction {
    pub equation: String,
    /// (species index, stoichiometric coefficient ν')
    pub reactants: Vec<(usize, f64)>,
    /// (species index, stoichiometric coefficient ν'')
    pub products: Vec<(usize, f64)>,
    pub a: f64,
    pub n: f64,
    pub ea: f64,
    pub q: f64,
}

impl Reaction {
    /// A Tⁿ exp(−Ea/RT)
    pub fn rate_constant(&self, t: f64) -> f64 {
        self.a * t.powf(self.n) * (-self.ea / (R_GAS * t)).exp()
    }

    /// Progress rate [mol/m³/s] for molar concentrations c [mol/m³]
    pub fn progress_rate(&self, t: f64, c: &[f64]) -> f64 {
        let mut w = self.rate_constant(t);
        for &(k, nu) in &self.reactants {
            w *= c[k].max(0.0).powf(nu);
        }
        w
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mechanism {
    species: Vec<String>,
    /// [kg/mol]
    molar_masses: Vec<f64>,
    reactions: Vec<Reaction>,
}

impl Mechanism {
    pub fn new(species: Vec<String>, molar_masses: Vec<f64>) -> Self {
        Self {
            species,
            molar_masses,
            reactions: Vec::new(),
        }
    }

    pub fn from_entries(
        species: Vec<String>,
        molar_masses: Vec<f64>,
        entries: &[ReactionEntry],
    ) -> Result<Self, ReactionError> {
        if molar_masses.len() != species.len() {
            return Err(ReactionError::SizeMismatch {
                entry: "molarMasses",
                got: molar_masses.len(),
                expected: species.len(),
            });
        }
        for (name, w) in species.iter().zip(molar_masses.iter()) {
            if !(*w > 0.0) {
                return Err(ReactionError::InvalidValue {
                    entry: format!("molar mass of {}", name),
                    value: *w,
                });
            }
        }
        let mut mech = Self::new(species, molar_masses);
        for entry in entries {
            mech.add_reaction(entry)?;
        }
        Ok(mech)
    }

    pub fn add_reaction(&mut self, entry: &ReactionEntry) -> Result<(), ReactionError> {
        let (reactants, products) = self.parse_equation(&entry.equation)?;
        let reaction = Reaction {
            equation: entry.equation.clone(),
            reactants,
            products,
            a: entry.a,
            n: entry.n,
            ea: entry.ea,
            q: entry.q,
        };
        let imbalance = self.mass_imbalance(&reaction);
        if imbalance.abs() > 1e-6 {
            warn!(
                "reaction '{}' does not conserve mass: Σ W(ν'' − ν') = {:e} kg/mol",
                reaction.equation, imbalance
            );
        }
        self.reactions.push(reaction);
        Ok(())
    }

    pub fn species(&self) -> &[String] {
        &self.species
    }

    pub fn molar_masses(&self) -> &[f64] {
        &self.molar_masses
    }

    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    pub fn species_index(&self, name: &str) -> Option<usize> {
        self.species.iter().position(|s| s == name)
    }

    /// Splits "2 A + B => C" into reactant and product coefficient lists
    pub fn parse_equation(&self, equation: &str) -> Result<(Vec<(usize, f64)>, Vec<(usize, f64)>), ReactionError> {
        let parse_err = |reason: &str| ReactionError::Parse {
            equation: equation.to_string(),
            reason: reason.to_string(),
        };
        let arrow = Regex::new(r"\s*(?:=>|->|=)\s*").map_err(|e| parse_err(&e.to_string()))?;
        let sides: Vec<&str> = arrow.split(equation.trim()).collect();
        if sides.len() != 2 {
            return Err(parse_err("expected exactly one arrow"));
        }
        let left = self.parse_side(sides[0], equation)?;
        let right = self.parse_side(sides[1], equation)?;
        if left.is_empty() || right.is_empty() {
            return Err(parse_err("both sides must name at least one species"));
        }
        Ok((left, right))
    }

    fn parse_side(&self, side: &str, equation: &str) -> Result<Vec<(usize, f64)>, ReactionError> {
        let plus = Regex::new(r"\s+\+\s+").map_err(|e| ReactionError::Parse {
            equation: equation.to_string(),
            reason: e.to_string(),
        })?;
        let term = Regex::new(r"^(\d+(?:\.\d*)?)?\s*\*?\s*([A-Za-z][A-Za-z0-9_()]*)$").map_err(|e| {
            ReactionError::Parse {
                equation: equation.to_string(),
                reason: e.to_string(),
            }
        })?;
        let mut out: Vec<(usize, f64)> = Vec::new();
        for raw in plus.split(side.trim()).map(str::trim).filter(|s| !s.is_empty()) {
            let cap = term.captures(raw).ok_or_else(|| ReactionError::Parse {
                equation: equation.to_string(),
                reason: format!("cannot read term '{}'", raw),
            })?;
            let nu = match cap.get(1) {
                Some(m) => m.as_str().parse::<f64>().map_err(|e| ReactionError::Parse {
                    equation: equation.to_string(),
                    reason: e.to_string(),
                })?,
                None => 1.0,
            };
            let name = cap.get(2).map(|m| m.as_str()).unwrap_or_default();
            let k = self.species_index(name).ok_or_else(|| ReactionError::UnknownSpecies {
                species: name.to_string(),
                context: equation.to_string(),
            })?;
            // repeated species on one side are merged
            match out.iter_mut().find(|(i, _)| *i == k) {
                Some((_, existing)) => *existing += nu,
                None => out.push((k, nu)),
            }
        }
        Ok(out)
    }

    fn mass_imbalance(&self, reaction: &Reaction) -> f64 {
        let produced: f64 = reaction
            .products
            .iter()
            .map(|&(k, nu)| nu * self.molar_masses[k])
            .sum();
        let consumed: f64 = reaction
            .reactants
            .iter()
            .map(|&(k, nu)| nu * self.molar_masses[k])
            .sum();
        produced - consumed
    }

    /// Species mass sources [kg/m³/s] written into `species_rates`; returns the heat
    /// release rate [W/m³]
    pub fn source_terms(&self, rho: f64, t: f64, y: &[f64], species_rates: &mut [f64]) -> f64 {
        let c: Vec<f64> = y
            .iter()
            .zip(self.molar_masses.iter())
            .map(|(yk, w)| rho * yk / w)
            .collect();
        species_rates.iter_mut().for_each(|r| *r = 0.0);
        let mut heat = 0.0;
        for reaction in &self.reactions {
            let w = reaction.progress_rate(t, &c);
            for &(k, nu) in &reaction.reactants {
                species_rates[k] -= nu * w * self.molar_masses[k];
            }
            for &(k, nu) in &reaction.products {
                species_rates[k] += nu * w * self.molar_masses[k];
            }
            heat += reaction.q * w;
        }
        heat
    }

    pub fn pretty_print(&self) -> Table {
        let mut table = Table::new();
        table.add_row(row!["equation", "A", "n", "Ea [J/mol]", "Q [J/mol]"]);
        for r in &self.reactions {
            table.add_row(row![r.equation, r.a, r.n, r.ea, r.q]);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn methane() -> Mechanism {
        let species: Vec<String> = ["CH4", "O2", "CO2", "H2O", "N2"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        Mechanism::new(species, vec![0.016, 0.032, 0.044, 0.018, 0.028])
    }

    #[test]
    fn parses_stoichiometry() {
        let mech = methane();
        let (r, p) = mech.parse_equation("CH4 + 2 O2 => CO2 + 2 H2O").unwrap();
        assert_eq!(r, vec![(0, 1.0), (1, 2.0)]);
        assert_eq!(p, vec![(2, 1.0), (3, 2.0)]);
        let (r, _) = mech.parse_equation("0.5*O2 + CH4 -> CO2").unwrap();
        assert_eq!(r, vec![(1, 0.5), (0, 1.0)]);
    }

    #[test]
    fn rejects_bad_equations() {
        let mech = methane();
        assert!(matches!(
            mech.parse_equation("CH4 + O3 => CO2"),
            Err(ReactionError::UnknownSpecies { .. })
        ));
        assert!(matches!(
            mech.parse_equation("CH4 + O2"),
            Err(ReactionError::Parse { .. })
        ));
    }

    #[test]
    fn sources_conserve_mass_and_release_heat() {
        let mut mech = methane();
        mech.add_reaction(&ReactionEntry {
            equation: "CH4 + 2 O2 => CO2 + 2 H2O".to_string(),
            a: 1e8,
            n: 0.0,
            ea: 1.0e5,
            q: 8.0e5,
        })
        .unwrap();
        let y = [0.05, 0.2, 0.0, 0.0, 0.75];
        let mut rates = [0.0; 5];
        let heat = mech.source_terms(1.0, 1500.0, &y, &mut rates);
        let sum: f64 = rates.iter().sum();
        assert_relative_eq!(sum, 0.0, epsilon = 1e-9 * rates[0].abs());
        assert!(rates[0] < 0.0 && rates[2] > 0.0);
        assert_eq!(rates[4], 0.0);
        let c_ch4 = 0.05 / 0.016;
        let c_o2 = 0.2 / 0.032;
        let w = 1e8 * (-1.0e5 / (R_GAS * 1500.0)).exp() * c_ch4 * c_o2 * c_o2;
        assert_relative_eq!(heat, 8.0e5 * w, max_relative = 1e-12);
        assert_relative_eq!(rates[0], -0.016 * w, max_relative = 1e-12);
    }
}
