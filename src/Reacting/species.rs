use super::ReactionError;
use super::combustion::{CellComposition, CombustionModel, create_combustion_model};
use super::mechanism::Mechanism;
use super::turbulence::{TurbulenceModel, create_turbulence_model};
use crate::Mesh::fields::{SurfaceScalarField, VolScalarField};
use crate::Mesh::fv_mesh::FvMesh;
use crate::config::{ConfigError, ModelConfig, ReactionConfig};
use log::warn;
use nalgebra::DVector;

/// Species sources evaluated at the decoded state of a stage
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionSources {
    /// [kg/m³/s] per species
    pub species: Vec<DVector<f64>>,
    /// [W/m³]
    pub energy: DVector<f64>,
}

/// Mass fractions, species fluxes and the chemistry/turbulence collaborators of a
/// single-phase reacting system
#[derive(Debug)]
pub struct ReactingExtension {
    species: Vec<String>,
    inert: Option<usize>,
    y: Vec<VolScalarField>,
    rho_y_phis: Vec<SurfaceScalarField>,
    combustion: Box<dyn CombustionModel>,
    turbulence: Box<dyn TurbulenceModel>,
}

impl ReactingExtension {
    pub fn new(
        mesh: &FvMesh,
        species: Vec<String>,
        initial_y: &[f64],
        inert: Option<usize>,
        combustion: Box<dyn CombustionModel>,
        turbulence: Box<dyn TurbulenceModel>,
    ) -> Result<Self, ReactionError> {
        if initial_y.len() != species.len() {
            return Err(ReactionError::SizeMismatch {
                entry: "initialMassFractions",
                got: initial_y.len(),
                expected: species.len(),
            });
        }
        for (name, yk) in species.iter().zip(initial_y) {
            if !(*yk >= 0.0 && *yk <= 1.0) {
                return Err(ReactionError::InvalidValue {
                    entry: format!("Y.{}", name),
                    value: *yk,
                });
            }
        }
        let sum: f64 = initial_y.iter().sum();
        if (sum - 1.0).abs() > 1e-8 {
            return Err(ReactionError::InvalidValue {
                entry: "sum of initialMassFractions".to_string(),
                value: sum,
            });
        }
        let y = species
            .iter()
            .zip(initial_y)
            .map(|(name, yk)| VolScalarField::uniform(&format!("Y.{}", name), mesh, *yk))
            .collect();
        let rho_y_phis = species
            .iter()
            .map(|name| SurfaceScalarField::zeros(&format!("rhoYPhi.{}", name), mesh))
            .collect();
        Ok(Self {
            species,
            inert,
            y,
            rho_y_phis,
            combustion,
            turbulence,
        })
    }

    pub fn from_config(
        mesh: &FvMesh,
        cfg: &ReactionConfig,
        turbulence: Option<&ModelConfig>,
    ) -> Result<Self, ConfigError> {
        let mechanism = Mechanism::from_entries(cfg.species.clone(), cfg.molar_masses.clone(), &cfg.reactions)?;
        let inert = match &cfg.inert_species {
            Some(name) => Some(mechanism.species_index(name).ok_or_else(|| {
                ReactionError::UnknownSpecies {
                    species: name.clone(),
                    context: "inertSpecies".to_string(),
                }
            })?),
            None => None,
        };
        let model_name = match &cfg.combustion_model {
            Some(name) => name.as_str(),
            None if cfg.reactions.is_empty() => "none",
            None => "arrhenius",
        };
        let combustion = create_combustion_model(model_name, mechanism)?;
        let turbulence = create_turbulence_model(turbulence)?;
        Ok(Self::new(
            mesh,
            cfg.species.clone(),
            &cfg.initial_mass_fractions,
            inert,
            combustion,
            turbulence,
        )?)
    }

    pub fn n_species(&self) -> usize {
        self.species.len()
    }

    pub fn species(&self) -> &[String] {
        &self.species
    }

    pub fn species_index(&self, name: &str) -> Option<usize> {
        self.species.iter().position(|s| s == name)
    }

    pub fn y(&self, k: usize) -> &VolScalarField {
        &self.y[k]
    }

    pub fn rho_y_phi(&self, k: usize) -> &SurfaceScalarField {
        &self.rho_y_phis[k]
    }

    pub fn combustion(&self) -> &dyn CombustionModel {
        self.combustion.as_ref()
    }

    pub fn turbulence(&self) -> &dyn TurbulenceModel {
        self.turbulence.as_ref()
    }

    /// Overwrites the mass fractions of one cell; `encode` must follow
    pub fn set_cell_mass_fractions(&mut self, celli: usize, y: &[f64]) -> Result<(), ReactionError> {
        if y.len() != self.n_species() {
            return Err(ReactionError::SizeMismatch {
                entry: "mass fractions",
                got: y.len(),
                expected: self.n_species(),
            });
        }
        for (field, yk) in self.y.iter_mut().zip(y) {
            field.set(celli, *yk);
        }
        Ok(())
    }

    /// ρYₖ from the primitive mass fractions
    pub fn encode(&self, rho: &DVector<f64>) -> Vec<DVector<f64>> {
        self.y
            .iter()
            .map(|yk| rho.component_mul(yk.internal()))
            .collect()
    }

    /// Negative partial densities: clamps those within `tolerance` and reports the
    /// number of clamped values and the first offender, or the first value beyond it.
    pub fn clamp_partial_densities(
        &self,
        rho_ys: &mut [DVector<f64>],
        tolerance: f64,
    ) -> Result<(usize, Option<(usize, usize)>), (usize, usize, f64)> {
        let mut count = 0;
        let mut first = None;
        for (k, rho_y) in rho_ys.iter_mut().enumerate() {
            for (celli, v) in rho_y.iter_mut().enumerate() {
                if *v < 0.0 {
                    if *v < -tolerance {
                        return Err((k, celli, *v));
                    }
                    *v = 0.0;
                    count += 1;
                    first.get_or_insert((k, celli));
                }
            }
        }
        Ok((count, first))
    }

    /// Yₖ = ρYₖ/ρ, the inert species absorbs the defect, negative values are clamped and
    /// the set is renormalised to ΣY = 1. ρYₖ is resynchronised with the result.
    pub fn decode(&mut self, mesh: &FvMesh, rho: &DVector<f64>, rho_ys: &mut [DVector<f64>]) {
        let n = self.n_species();
        let mut y = vec![0.0; n];
        let mut clamped = 0usize;
        for celli in 0..rho.len() {
            for k in 0..n {
                y[k] = rho_ys[k][celli] / rho[celli];
            }
            if let Some(inert) = self.inert {
                let others: f64 = (0..n).filter(|k| *k != inert).map(|k| y[k]).sum();
                y[inert] = 1.0 - others;
            }
            for yk in y.iter_mut() {
                if *yk < 0.0 {
                    *yk = 0.0;
                    clamped += 1;
                }
            }
            let sum: f64 = y.iter().sum();
            if sum > 0.0 {
                for k in 0..n {
                    y[k] /= sum;
                }
            } else if let Some(inert) = self.inert {
                y[inert] = 1.0;
            }
            for k in 0..n {
                self.y[k].set(celli, y[k]);
                rho_ys[k][celli] = rho[celli] * y[k];
            }
        }
        if clamped > 0 {
            warn!("{} negative mass fractions clamped to zero", clamped);
        }
        for field in self.y.iter_mut() {
            field.correct_boundary_conditions(mesh);
        }
    }

    /// Species face fluxes: mass-flux upwinded convection minus Fickian diffusion with
    /// the turbulence-adjusted diffusivity `rho_d` given per cell [kg/m/s]
    pub fn update_fluxes(&mut self, mesh: &FvMesh, mass_flux: &SurfaceScalarField, rho_d: &DVector<f64>) {
        let rho_d_eff: Vec<f64> = rho_d
            .iter()
            .map(|d| self.turbulence.effective_diffusivity(*d))
            .collect();
        for (k, flux) in self.rho_y_phis.iter_mut().enumerate() {
            let yk = &self.y[k];
            for (facei, face) in mesh.internal_faces().iter().enumerate() {
                let m = mass_flux.internal()[facei];
                let y_up = if m >= 0.0 { yk.get(face.owner) } else { yk.get(face.neighbour) };
                let d_f = 0.5 * (rho_d_eff[face.owner] + rho_d_eff[face.neighbour]);
                let grad = (yk.get(face.neighbour) - yk.get(face.owner)) * mesh.delta_coeff(facei);
                flux.internal_mut()[facei] = m * y_up - d_f * grad * face.area.norm();
            }
            // zero gradient at patches: convection only
            for (patchi, patch) in mesh.patches().iter().enumerate() {
                for (facei, bf) in patch.faces.iter().enumerate() {
                    let m = mass_flux.boundary(patchi)[facei];
                    let y_up = if m >= 0.0 { yk.get(bf.owner) } else { yk.boundary(patchi)[facei] };
                    flux.boundary_mut(patchi)[facei] = m * y_up;
                }
            }
        }
    }

    pub fn sources(&self, rho: &DVector<f64>, t: &DVector<f64>) -> ReactionSources {
        let n = self.n_species();
        let n_cells = rho.len();
        let mut species = vec![DVector::zeros(n_cells); n];
        let mut energy = DVector::zeros(n_cells);
        let mut y = vec![0.0; n];
        let mut rates = vec![0.0; n];
        for celli in 0..n_cells {
            for k in 0..n {
                y[k] = self.y[k].get(celli);
            }
            let cell = CellComposition {
                rho: rho[celli],
                t: t[celli],
                y: &y,
            };
            energy[celli] = self.combustion.source_term(&cell, &mut rates);
            for k in 0..n {
                species[k][celli] = rates[k];
            }
        }
        ReactionSources { species, energy }
    }
}
