use super::closure::{PhaseClosure, PhaseClosureEnum, create_closure};
use super::conserved::ConservedState;
use super::errors::{Lifecycle, SystemError};
use super::phase::Phase;
use super::stage_storage::{StageStorage, StorageDescriptor};
use crate::FluxSchemes::{FaceGeometry, FaceState, FluxScheme, FluxSchemeEnum, NumericalFlux, create_flux_scheme_by_name};
use crate::Mesh::fields::{SurfaceScalarField, SurfaceVectorField, VolScalarField, VolVectorField};
use crate::Mesh::fv_mesh::FvMesh;
use crate::Mesh::fvc;
use crate::Reacting::species::{ReactingExtension, ReactionSources};
use crate::Thermodynamics::ThermoError;
use crate::Thermodynamics::mixture::{MixtureCell, PhaseCellState};
use crate::Thermodynamics::phase_thermo::PhaseThermo;
use crate::TimeIntegration::RkScheme;
use crate::config::{ConfigError, SolutionControls, SystemConfig};
use log::{debug, info, warn};
use nalgebra::{DVector, Vector3};

/// How the thermal state of an initial cell is given
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThermalState {
    Pressure(f64),
    Temperature(f64),
}

/// Primitive description of one cell used by the initialisers
#[derive(Debug, Clone, PartialEq)]
pub struct CellState {
    pub alphas: Vec<f64>,
    pub rhos: Vec<f64>,
    pub u: Vector3<f64>,
    pub thermal: ThermalState,
}

impl CellState {
    pub fn single(rho: f64, u: Vector3<f64>, p: f64) -> Self {
        Self {
            alphas: vec![1.0],
            rhos: vec![rho],
            u,
            thermal: ThermalState::Pressure(p),
        }
    }

    pub fn with_pressure(alphas: Vec<f64>, rhos: Vec<f64>, u: Vector3<f64>, p: f64) -> Self {
        Self {
            alphas,
            rhos,
            u,
            thermal: ThermalState::Pressure(p),
        }
    }

    pub fn with_temperature(alphas: Vec<f64>, rhos: Vec<f64>, u: Vector3<f64>, t: f64) -> Self {
        Self {
            alphas,
            rhos,
            u,
            thermal: ThermalState::Temperature(t),
        }
    }
}

/// Compressible multiphase system over a runtime-sized phase list
#[derive(Debug)]
pub struct CompressibleSystem {
    pub(super) mesh: FvMesh,
    pub(super) phases: Vec<Phase>,
    thermo_list: Vec<PhaseThermo>,
    pub(super) closure: PhaseClosureEnum,
    pub(super) flux_scheme: FluxSchemeEnum,
    pub(super) controls: SolutionControls,
    pub(super) reaction: Option<ReactingExtension>,
    pub(super) conserved: ConservedState,
    pub(super) rho: VolScalarField,
    pub(super) u: VolVectorField,
    pub(super) p: VolScalarField,
    pub(super) e: VolScalarField,
    pub(super) t: VolScalarField,
    pub(super) phi: SurfaceScalarField,
    pub(super) rho_phi: SurfaceScalarField,
    pub(super) rho_u_phi: SurfaceVectorField,
    pub(super) rho_e_phi: SurfaceScalarField,
    fluxes_current: bool,
    storage: Option<StageStorage>,
    lifecycle: Lifecycle,
    /// lifecycle before the current `set_ode_fields`, restored when no stage ran
    lifecycle_before_fields: Lifecycle,
    delta_t: Option<f64>,
}

impl CompressibleSystem {
    /// Builds a system from configuration. The mesh is owned by the system afterwards.
    pub fn new(mesh: FvMesh, cfg: &SystemConfig) -> Result<Self, SystemError> {
        cfg.validate()?;
        let thermos = cfg
            .phases
            .iter()
            .map(PhaseThermo::from_config)
            .collect::<Result<Vec<_>, ConfigError>>()?;
        let closure = create_closure(cfg.closure.as_deref(), thermos.len())?;
        let flux_scheme = create_flux_scheme_by_name(&cfg.flux_scheme)?;
        let reaction = match &cfg.reactions {
            Some(r) => Some(ReactingExtension::from_config(&mesh, r, cfg.turbulence.as_ref())?),
            None => None,
        };
        Self::from_parts(mesh, thermos, closure, flux_scheme, cfg.solution_controls, reaction)
    }

    pub fn from_parts(
        mesh: FvMesh,
        thermos: Vec<PhaseThermo>,
        closure: PhaseClosureEnum,
        flux_scheme: FluxSchemeEnum,
        controls: SolutionControls,
        reaction: Option<ReactingExtension>,
    ) -> Result<Self, SystemError> {
        mesh.validate()?;
        controls.validate()?;
        if thermos.is_empty() {
            return Err(ConfigError::invalid("phases", "at least one phase is required").into());
        }
        // re-run the admissibility check of the factory for hand-built closures
        create_closure(Some(closure.name()), thermos.len())?;
        if reaction.is_some() && thermos.len() != 1 {
            return Err(ConfigError::invalid("reactions", "reacting systems are single-phase").into());
        }
        let n_cells = mesh.n_cells();
        let n_phases = thermos.len();
        let n_alphas = closure.n_transported_alphas(n_phases);
        let n_species = reaction.as_ref().map_or(0, |r| r.n_species());
        let phases: Vec<Phase> = thermos.iter().map(|t| Phase::new(t.clone(), &mesh)).collect();
        info!(
            "{} system with {} phase(s) [{}], flux scheme {}, {} species",
            closure.name(),
            n_phases,
            phases.iter().map(|p| p.name()).collect::<Vec<_>>().join(", "),
            flux_scheme.name(),
            n_species
        );
        Ok(Self {
            conserved: ConservedState::zeros(n_cells, n_phases, n_alphas, n_species),
            rho: VolScalarField::uniform("rho", &mesh, 0.0),
            u: VolVectorField::uniform("U", &mesh, Vector3::zeros()),
            p: VolScalarField::uniform("p", &mesh, 0.0),
            e: VolScalarField::uniform("e", &mesh, 0.0),
            t: VolScalarField::uniform("T", &mesh, 0.0),
            phi: SurfaceScalarField::zeros("phi", &mesh),
            rho_phi: SurfaceScalarField::zeros("rhoPhi", &mesh),
            rho_u_phi: SurfaceVectorField::zeros("rhoUPhi", &mesh),
            rho_e_phi: SurfaceScalarField::zeros("rhoEPhi", &mesh),
            mesh,
            phases,
            thermo_list: thermos,
            closure,
            flux_scheme,
            controls,
            reaction,
            fluxes_current: false,
            storage: None,
            lifecycle: Lifecycle::Uninitialized,
            lifecycle_before_fields: Lifecycle::Uninitialized,
            delta_t: None,
        })
    }

    /////////////////////////////////////////////////////////////////////////////////////
    // INITIALISATION
    /////////////////////////////////////////////////////////////////////////////////////

    /// Sets the primitive state of every cell from `f(celli, cell centre)`, then encodes
    /// and decodes so that conserved and primitive fields agree.
    pub fn initialise_with<F>(&mut self, f: F) -> Result<(), SystemError>
    where
        F: Fn(usize, &Vector3<f64>) -> CellState,
    {
        for celli in 0..self.mesh.n_cells() {
            let state = f(celli, &self.mesh.centres()[celli]);
            self.write_cell(celli, &state)?;
        }
        self.encode();
        self.decode()
    }

    /// Overwrites one cell, leaving the others as they are
    pub fn set_phase_state(&mut self, celli: usize, state: &CellState) -> Result<(), SystemError> {
        if celli >= self.mesh.n_cells() {
            return Err(SystemError::InvalidInitialState {
                cell: celli,
                reason: format!("mesh has {} cells", self.mesh.n_cells()),
            });
        }
        self.write_cell(celli, state)?;
        self.encode();
        self.decode()
    }

    fn write_cell(&mut self, celli: usize, state: &CellState) -> Result<(), SystemError> {
        let n_phases = self.phases.len();
        let invalid = |reason: String| SystemError::InvalidInitialState { cell: celli, reason };
        if state.alphas.len() != n_phases || state.rhos.len() != n_phases {
            return Err(invalid(format!(
                "expected {} volume fractions and densities, got {} and {}",
                n_phases,
                state.alphas.len(),
                state.rhos.len()
            )));
        }
        let sum: f64 = state.alphas.iter().sum();
        if state.alphas.iter().any(|a| !(0.0..=1.0).contains(a)) || (sum - 1.0).abs() > 1e-8 {
            return Err(invalid(format!("volume fractions {:?} do not sum to one", state.alphas)));
        }
        if state.rhos.iter().any(|r| !(*r > 0.0)) {
            return Err(invalid(format!("non-positive phase density in {:?}", state.rhos)));
        }
        let mut rho = 0.0;
        let mut rho_e = 0.0;
        for (i, phase) in self.phases.iter_mut().enumerate() {
            let alpha = state.alphas[i] / sum;
            let rho_i = state.rhos[i];
            let e_i = match state.thermal {
                ThermalState::Pressure(p) => phase.thermo.e_from_pressure(rho_i, p),
                ThermalState::Temperature(t) => phase.thermo.e_from_t(rho_i, t),
            };
            phase.alpha.set(celli, alpha);
            phase.rho.set(celli, rho_i);
            phase.e.set(celli, e_i);
            rho += alpha * rho_i;
            rho_e += alpha * rho_i * e_i;
        }
        self.rho.set(celli, rho);
        self.e.set(celli, rho_e / rho);
        self.u.set(celli, state.u);
        Ok(())
    }

    pub fn set_uniform(&mut self, state: &CellState) -> Result<(), SystemError> {
        self.initialise_with(|_, _| state.clone())
    }

    /// Uniform state given by temperature instead of pressure. Phases then start in
    /// thermal but not necessarily in pressure equilibrium; `decode` relaxes the
    /// pressure through the mixture rule.
    pub fn initialise_from_temperature(
        &mut self,
        alphas: &[f64],
        rhos: &[f64],
        u: Vector3<f64>,
        t: f64,
    ) -> Result<(), SystemError> {
        self.set_uniform(&CellState::with_temperature(alphas.to_vec(), rhos.to_vec(), u, t))
    }

    /// Overwrites the mass fractions of one cell of a reacting system and re-encodes
    pub fn set_mass_fractions(&mut self, celli: usize, y: &[f64]) -> Result<(), SystemError> {
        let ext = self
            .reaction
            .as_mut()
            .ok_or_else(|| ConfigError::invalid("reactions", "system carries no species"))?;
        ext.set_cell_mass_fractions(celli, y)?;
        self.encode();
        self.decode()
    }

    /////////////////////////////////////////////////////////////////////////////////////
    // ENCODE / DECODE
    /////////////////////////////////////////////////////////////////////////////////////

    /// Primitive → conserved: αᵢρᵢ, transported αᵢ, ρU and ρE = ρ(e + |U|²/2)
    pub fn encode(&mut self) {
        let n_alphas = self.conserved.alphas.len();
        for celli in 0..self.mesh.n_cells() {
            let mut rho = 0.0;
            for (i, phase) in self.phases.iter().enumerate() {
                let alpha_rho = phase.alpha.get(celli) * phase.rho.get(celli);
                self.conserved.alpha_rhos[i][celli] = alpha_rho;
                rho += alpha_rho;
                if i < n_alphas {
                    self.conserved.alphas[i][celli] = phase.alpha.get(celli);
                }
            }
            let u = self.u.get(celli);
            self.rho.set(celli, rho);
            self.conserved.rho_u[celli] = u * rho;
            self.conserved.rho_e[celli] = rho * (self.e.get(celli) + 0.5 * u.norm_squared());
        }
        if let Some(ext) = &self.reaction {
            self.conserved.rho_ys = ext.encode(self.rho.internal());
        }
        self.fluxes_current = false;
    }

    /// Per-variant volume fractions and phase densities from the conserved state
    pub fn calc_alpha_and_rho(&mut self) {
        self.closure
            .calc_alpha_and_rho(&self.conserved, &mut self.phases, self.controls.residual_alpha);
    }

    /// Conserved → primitive. Non-positive densities or temperatures are fatal.
    pub fn decode(&mut self) -> Result<(), SystemError> {
        self.calc_alpha_and_rho();
        let residual = self.controls.residual_alpha;
        let mut states = vec![PhaseCellState::default(); self.phases.len()];
        for celli in 0..self.mesh.n_cells() {
            let rho: f64 = self.conserved.alpha_rhos.iter().map(|m| m[celli]).sum();
            if !(rho > 0.0) {
                return Err(ThermoError::NonPositiveDensity {
                    field: "rho".to_string(),
                    cell: celli,
                    value: rho,
                }
                .into());
            }
            let u = self.conserved.rho_u[celli] / rho;
            let e = self.conserved.rho_e[celli] / rho - 0.5 * u.norm_squared();
            self.gather(celli, &mut states);
            let p = MixtureCell::new(self.thermos(), &states).pressure(rho * e);

            for (phase, s) in self.phases.iter_mut().zip(states.iter_mut()) {
                let resolved = s.alpha >= residual;
                if resolved && !(s.rho > 0.0) {
                    return Err(ThermoError::NonPositiveDensity {
                        field: phase.rho.name().to_string(),
                        cell: celli,
                        value: s.rho,
                    }
                    .into());
                }
                if s.rho > 0.0 {
                    s.e = phase.thermo.e_from_pressure(s.rho, p);
                    s.t = phase.thermo.t_from_e(s.rho, s.e);
                } else {
                    s.e = 0.0;
                    s.t = 0.0;
                }
                if resolved && !(s.t > 0.0) {
                    return Err(ThermoError::NonPositiveTemperature {
                        field: phase.t.name().to_string(),
                        cell: celli,
                        value: s.t,
                    }
                    .into());
                }
            }
            let t = MixtureCell::new(self.thermos(), &states).temperature();
            if !(t > 0.0) {
                return Err(ThermoError::NonPositiveTemperature {
                    field: "T".to_string(),
                    cell: celli,
                    value: t,
                }
                .into());
            }
            for (phase, s) in self.phases.iter_mut().zip(states.iter()) {
                phase.e.set(celli, s.e);
                phase.t.set(celli, if s.alpha < residual { t } else { s.t });
            }
            self.rho.set(celli, rho);
            self.u.set(celli, u);
            self.e.set(celli, e);
            self.p.set(celli, p);
            self.t.set(celli, t);
        }
        if let Some(ext) = self.reaction.as_mut() {
            ext.decode(&self.mesh, self.rho.internal(), &mut self.conserved.rho_ys);
        }
        self.correct_boundary_conditions();
        self.fluxes_current = false;
        Ok(())
    }

    fn correct_boundary_conditions(&mut self) {
        for phase in self.phases.iter_mut() {
            phase.correct_boundary_conditions(&self.mesh);
        }
        self.rho.correct_boundary_conditions(&self.mesh);
        self.u.correct_boundary_conditions(&self.mesh);
        self.p.correct_boundary_conditions(&self.mesh);
        self.e.correct_boundary_conditions(&self.mesh);
        self.t.correct_boundary_conditions(&self.mesh);
    }

    /////////////////////////////////////////////////////////////////////////////////////
    // FLUXES
    /////////////////////////////////////////////////////////////////////////////////////

    fn cell_face_state(&self, celli: usize, states: &mut [PhaseCellState]) -> FaceState {
        self.gather(celli, states);
        let p = self.p.get(celli);
        let c2 = MixtureCell::new(self.thermos(), states).speed_of_sound_sqr(p);
        FaceState::from_primitive(self.rho.get(celli), self.u.get(celli), p, self.e.get(celli), c2.sqrt())
    }

    fn patch_face_state(&self, patchi: usize, facei: usize, states: &mut [PhaseCellState]) -> FaceState {
        self.gather_patch(patchi, facei, states);
        let p = self.p.boundary(patchi)[facei];
        let c2 = MixtureCell::new(self.thermos(), states).speed_of_sound_sqr(p);
        FaceState::from_primitive(
            self.rho.boundary(patchi)[facei],
            self.u.boundary(patchi)[facei],
            p,
            self.e.boundary(patchi)[facei],
            c2.sqrt(),
        )
    }

    /// Recomputes every face flux from the current primitive state
    pub fn update(&mut self) -> Result<(), SystemError> {
        let mut states = vec![PhaseCellState::default(); self.phases.len()];
        let mut internal: Vec<NumericalFlux> = Vec::with_capacity(self.mesh.n_internal_faces());
        for (facei, face) in self.mesh.internal_faces().iter().enumerate() {
            let left = self.cell_face_state(face.owner, &mut states);
            let right = self.cell_face_state(face.neighbour, &mut states);
            let flux = self
                .flux_scheme
                .flux(&left, &right, &FaceGeometry::new(face.area))
                .map_err(|source| SystemError::Flux {
                    face: format!("internal face {}", facei),
                    source,
                })?;
            internal.push(flux);
        }
        let mut boundary: Vec<Vec<NumericalFlux>> = Vec::with_capacity(self.mesh.patches().len());
        for (patchi, patch) in self.mesh.patches().iter().enumerate() {
            let mut fluxes = Vec::with_capacity(patch.size());
            for (facei, bf) in patch.faces.iter().enumerate() {
                let left = self.cell_face_state(bf.owner, &mut states);
                let right = self.patch_face_state(patchi, facei, &mut states);
                let flux = self
                    .flux_scheme
                    .flux(&left, &right, &FaceGeometry::new(bf.area))
                    .map_err(|source| SystemError::Flux {
                        face: format!("face {} of patch '{}'", facei, patch.name),
                        source,
                    })?;
                fluxes.push(flux);
            }
            boundary.push(fluxes);
        }
        self.distribute_fluxes(&internal, &boundary);
        if self.reaction.is_some() {
            let rho_d = self.mixture_alphah();
            if let Some(ext) = self.reaction.as_mut() {
                ext.update_fluxes(&self.mesh, &self.rho_phi, &rho_d);
            }
        }
        self.fluxes_current = true;
        Ok(())
    }

    /// Mixture fluxes as computed, phase fluxes upwinded: αᵢρᵢ by the mass flux, αᵢ by phi
    fn distribute_fluxes(&mut self, internal: &[NumericalFlux], boundary: &[Vec<NumericalFlux>]) {
        for (facei, face) in self.mesh.internal_faces().iter().enumerate() {
            let f = &internal[facei];
            self.phi.internal_mut()[facei] = f.phi;
            self.rho_phi.internal_mut()[facei] = f.mass;
            self.rho_u_phi.internal_mut()[facei] = f.momentum;
            self.rho_e_phi.internal_mut()[facei] = f.energy;
            let mass_up = if f.mass >= 0.0 { face.owner } else { face.neighbour };
            let vol_up = if f.phi >= 0.0 { face.owner } else { face.neighbour };
            let rho_up = self.rho.get(mass_up);
            for phase in self.phases.iter_mut() {
                let y = phase.alpha.get(mass_up) * phase.rho.get(mass_up) / rho_up;
                phase.alpha_rho_phi.internal_mut()[facei] = f.mass * y;
                phase.alpha_phi.internal_mut()[facei] = f.phi * phase.alpha.get(vol_up);
            }
        }
        for (patchi, patch) in self.mesh.patches().iter().enumerate() {
            for (facei, bf) in patch.faces.iter().enumerate() {
                let f = &boundary[patchi][facei];
                self.phi.boundary_mut(patchi)[facei] = f.phi;
                self.rho_phi.boundary_mut(patchi)[facei] = f.mass;
                self.rho_u_phi.boundary_mut(patchi)[facei] = f.momentum;
                self.rho_e_phi.boundary_mut(patchi)[facei] = f.energy;
                let rho_o = self.rho.get(bf.owner);
                let rho_b = self.rho.boundary(patchi)[facei];
                for phase in self.phases.iter_mut() {
                    let y = if f.mass >= 0.0 {
                        phase.alpha.get(bf.owner) * phase.rho.get(bf.owner) / rho_o
                    } else {
                        phase.alpha.boundary(patchi)[facei] * phase.rho.boundary(patchi)[facei] / rho_b
                    };
                    let alpha = if f.phi >= 0.0 {
                        phase.alpha.get(bf.owner)
                    } else {
                        phase.alpha.boundary(patchi)[facei]
                    };
                    phase.alpha_rho_phi.boundary_mut(patchi)[facei] = f.mass * y;
                    phase.alpha_phi.boundary_mut(patchi)[facei] = f.phi * alpha;
                }
            }
        }
    }

    /////////////////////////////////////////////////////////////////////////////////////
    // SOURCES AND RATES
    /////////////////////////////////////////////////////////////////////////////////////

    fn reaction_sources(&self) -> Option<ReactionSources> {
        self.reaction
            .as_ref()
            .map(|ext| ext.sources(self.rho.internal(), self.t.internal()))
    }

    /// Energy source [W/m³] at the current decoded state
    pub fn e_source(&self) -> DVector<f64> {
        self.reaction_sources()
            .map(|s| s.energy)
            .unwrap_or_else(|| DVector::zeros(self.mesh.n_cells()))
    }

    /// Time derivative of the conserved state: −div(F) + S
    pub(super) fn compute_rates(&self, sources: Option<&ReactionSources>) -> ConservedState {
        let mut rate = self.conserved.zeros_like();
        for (i, phase) in self.phases.iter().enumerate() {
            rate.alpha_rhos[i] = -fvc::div(&self.mesh, &phase.alpha_rho_phi);
        }
        if !rate.alphas.is_empty() {
            let div_phi = fvc::div(&self.mesh, &self.phi);
            for (k, phase) in self.phases.iter().enumerate().take(rate.alphas.len()) {
                let div_alpha_phi = fvc::div(&self.mesh, &phase.alpha_phi);
                rate.alphas[k] = -(div_alpha_phi - self.conserved.alphas[k].component_mul(&div_phi));
            }
        }
        rate.rho_u = fvc::div_vector(&self.mesh, &self.rho_u_phi)
            .into_iter()
            .map(|d| -d)
            .collect();
        rate.rho_e = -fvc::div(&self.mesh, &self.rho_e_phi);
        if let Some(ext) = &self.reaction {
            for k in 0..ext.n_species() {
                rate.rho_ys[k] = -fvc::div(&self.mesh, ext.rho_y_phi(k));
            }
        }
        if let Some(s) = sources {
            rate.rho_e += &s.energy;
            for (r, sk) in rate.rho_ys.iter_mut().zip(&s.species) {
                *r += sk;
            }
        }
        rate
    }

    /////////////////////////////////////////////////////////////////////////////////////
    // STAGE PROTOCOL
    /////////////////////////////////////////////////////////////////////////////////////

    pub fn set_delta_t(&mut self, delta_t: f64) -> Result<(), SystemError> {
        if !(delta_t > 0.0 && delta_t.is_finite()) {
            return Err(SystemError::DeltaTNotSet);
        }
        self.delta_t = Some(delta_t);
        Ok(())
    }

    pub fn delta_t(&self) -> Option<f64> {
        self.delta_t
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Allocates the stage buffers of one outer step. `store_fields[j]` keeps the state
    /// entering stage j, `store_deltas[j]` keeps its rate.
    pub fn set_ode_fields(
        &mut self,
        n_steps: usize,
        store_fields: &[bool],
        store_deltas: &[bool],
    ) -> Result<(), SystemError> {
        if store_fields.len() != n_steps || store_deltas.len() != n_steps {
            return Err(SystemError::StorageFlagLength {
                n_steps,
                got_old: store_fields.len(),
                got_delta: store_deltas.len(),
            });
        }
        let descriptors = store_fields
            .iter()
            .zip(store_deltas)
            .map(|(o, d)| StorageDescriptor::from_flags(*o, *d))
            .collect();
        self.set_ode_fields_with(descriptors)
    }

    /// Storage resolved from a scheme's coefficient table
    pub fn set_ode_fields_for(&mut self, scheme: &RkScheme) -> Result<(), SystemError> {
        self.set_ode_fields_with(scheme.storage_descriptors())
    }

    pub fn set_ode_fields_with(&mut self, descriptors: Vec<StorageDescriptor>) -> Result<(), SystemError> {
        match self.lifecycle {
            Lifecycle::Uninitialized | Lifecycle::Cleared => {}
            state => {
                return Err(SystemError::Lifecycle {
                    operation: "set_ode_fields",
                    state,
                });
            }
        }
        let n_steps = descriptors.len();
        if n_steps == 0 {
            return Err(SystemError::StageOutOfRange { stepi: 0, n_steps });
        }
        debug!("stage storage for {} steps: {:?}", n_steps, descriptors);
        self.storage = Some(StageStorage::new(descriptors));
        self.lifecycle_before_fields = self.lifecycle;
        self.lifecycle = Lifecycle::FieldsSet { n_steps };
        Ok(())
    }

    /// Releases the stage buffers; calling it again is harmless. Without a stage in
    /// between, the lifecycle returns to what it was before `set_ode_fields`.
    pub fn clear_ode_fields(&mut self) {
        self.storage = None;
        self.lifecycle = match self.lifecycle {
            Lifecycle::FieldsSet { .. } => self.lifecycle_before_fields,
            Lifecycle::StageRunning { .. } => Lifecycle::Cleared,
            state => state,
        };
    }

    pub fn storage_descriptors(&self) -> Option<&[StorageDescriptor]> {
        self.storage.as_ref().map(|s| s.descriptors())
    }

    /// Stage `stepi` (0-based):
    ///     U_new = Σ_{j<stepi} a[j] Old[j] + a[stepi] U + Δt (Σ_{j<stepi} b[j] Δ[j] + b[stepi] ΔU)
    /// with ΔU = −div(F) + S evaluated at the current decoded state. The new state is
    /// drift-corrected and decoded. On failure the system is left as it was.
    pub fn solve(&mut self, stepi: usize, ai: &[f64], bi: &[f64]) -> Result<(), SystemError> {
        let n_steps = match self.lifecycle {
            Lifecycle::FieldsSet { n_steps } | Lifecycle::StageRunning { n_steps, .. } => n_steps,
            state => {
                return Err(SystemError::Lifecycle {
                    operation: "solve",
                    state,
                });
            }
        };
        if stepi >= n_steps {
            return Err(SystemError::StageOutOfRange { stepi, n_steps });
        }
        if ai.len() != stepi + 1 || bi.len() != stepi + 1 {
            return Err(SystemError::CoefficientLength {
                stepi,
                expected: stepi + 1,
                got_a: ai.len(),
                got_b: bi.len(),
            });
        }
        let dt = self.delta_t.ok_or(SystemError::DeltaTNotSet)?;
        {
            let storage = self.storage.as_ref().ok_or(SystemError::Lifecycle {
                operation: "solve",
                state: self.lifecycle,
            })?;
            for j in 0..stepi {
                if ai[j] != 0.0 && storage.old(j).is_none() {
                    return Err(SystemError::MissingStorage { stepi, slot: j, kind: "old state" });
                }
                if bi[j] != 0.0 && storage.delta(j).is_none() {
                    return Err(SystemError::MissingStorage { stepi, slot: j, kind: "rate" });
                }
            }
        }
        if !self.fluxes_current {
            self.update()?;
        }
        let sources = self.reaction_sources();
        let rate = self.compute_rates(sources.as_ref());
        let mut next = self.conserved.zeros_like();
        if let Some(storage) = self.storage.as_mut() {
            storage.store(stepi, &self.conserved, &rate);
            for j in 0..stepi {
                if let (true, Some(old)) = (ai[j] != 0.0, storage.old(j)) {
                    next.add_scaled(ai[j], old);
                }
            }
            next.add_scaled(ai[stepi], &self.conserved);
            for j in 0..stepi {
                if let (true, Some(delta)) = (bi[j] != 0.0, storage.delta(j)) {
                    next.add_scaled(dt * bi[j], delta);
                }
            }
            next.add_scaled(dt * bi[stepi], &rate);
        }

        self.correct_drift(&mut next, stepi)?;
        let previous = std::mem::replace(&mut self.conserved, next);
        if let Err(err) = self.decode() {
            let err = err.in_stage(stepi);
            warn!("stage {} rejected: {}", stepi, err);
            self.conserved = previous;
            self.decode()?;
            return Err(err);
        }
        self.lifecycle = Lifecycle::StageRunning { stage: stepi, n_steps };
        debug!(
            "stage {}/{}: dt = {:e}, p in [{:e}, {:e}], T in [{:.3}, {:.3}]",
            stepi + 1,
            n_steps,
            dt,
            self.p.min(),
            self.p.max(),
            self.t.min(),
            self.t.max()
        );
        Ok(())
    }

    /// Drift correction of a blended state, in this order:
    /// 1. non-finite values fail the stage;
    /// 2. negative phase (and species) masses within the mass tolerance are clamped to
    ///    zero and counted, beyond it the stage fails;
    /// 3. transported volume fractions outside [−ε, 1 + ε] fail the stage, the rest are
    ///    clipped to [0, 1];
    /// 4. the closure renormalises the fractions to Σα = 1.
    fn correct_drift(&self, state: &mut ConservedState, stage: usize) -> Result<(), SystemError> {
        let tol = self.controls.mass_tolerance;
        let eps = self.controls.alpha_tolerance;
        for celli in 0..state.rho_e.len() {
            if !state.rho_e[celli].is_finite() {
                return Err(SystemError::NonFinite { field: "rhoE".to_string(), cell: celli, stage });
            }
            if !state.rho_u[celli].iter().all(|x| x.is_finite()) {
                return Err(SystemError::NonFinite { field: "rhoU".to_string(), cell: celli, stage });
            }
        }
        let mut clamped = 0usize;
        let mut first: Option<(String, usize)> = None;
        for (phase, masses) in self.phases.iter().zip(state.alpha_rhos.iter_mut()) {
            for (celli, m) in masses.iter_mut().enumerate() {
                let field = || format!("alphaRho.{}", phase.name());
                if !m.is_finite() {
                    return Err(SystemError::NonFinite { field: field(), cell: celli, stage });
                }
                if *m < 0.0 {
                    if *m < -tol {
                        return Err(SystemError::NegativeMass { field: field(), cell: celli, stage, value: *m });
                    }
                    *m = 0.0;
                    clamped += 1;
                    first.get_or_insert_with(|| (field(), celli));
                }
            }
        }
        if let Some(ext) = &self.reaction {
            match ext.clamp_partial_densities(&mut state.rho_ys, tol) {
                Ok((count, first_species)) => {
                    clamped += count;
                    if let Some((k, celli)) = first_species.filter(|_| first.is_none()) {
                        first = Some((format!("rhoY.{}", ext.species()[k]), celli));
                    }
                }
                Err((k, celli, value)) => {
                    let field = format!("rhoY.{}", ext.species()[k]);
                    return Err(if value.is_finite() {
                        SystemError::NegativeMass { field, cell: celli, stage, value }
                    } else {
                        SystemError::NonFinite { field, cell: celli, stage }
                    });
                }
            }
            for (k, rho_y) in state.rho_ys.iter().enumerate() {
                if let Some(celli) = rho_y.iter().position(|v| !v.is_finite()) {
                    let field = format!("rhoY.{}", ext.species()[k]);
                    return Err(SystemError::NonFinite { field, cell: celli, stage });
                }
            }
        }
        if let Some((field, celli)) = first {
            warn!(
                "stage {}: {} negative mass value(s) clamped to zero, first in '{}' at cell {}",
                stage, clamped, field, celli
            );
        }
        for (phase, alphas) in self.phases.iter().zip(state.alphas.iter_mut()) {
            for (celli, a) in alphas.iter_mut().enumerate() {
                if !(*a >= -eps && *a <= 1.0 + eps) {
                    return Err(SystemError::AlphaOutOfBounds {
                        field: phase.alpha.name().to_string(),
                        cell: celli,
                        stage,
                        value: *a,
                    });
                }
                *a = a.clamp(0.0, 1.0);
            }
        }
        self.closure.normalise_volume_fractions(&mut state.alphas, stage)
    }

    /// Conserved state snapshot, e.g. for a driver that retries a rejected step
    pub fn conserved_state(&self) -> &ConservedState {
        &self.conserved
    }

    /// Restores a snapshot taken with `conserved_state` and decodes it
    pub fn restore_conserved_state(&mut self, state: ConservedState) -> Result<(), SystemError> {
        self.conserved = state;
        self.decode()
    }

    /////////////////////////////////////////////////////////////////////////////////////
    // GATHERING PHASE STATES
    /////////////////////////////////////////////////////////////////////////////////////

    pub(super) fn thermos(&self) -> &[PhaseThermo] {
        &self.thermo_list
    }

    pub(super) fn gather(&self, celli: usize, states: &mut [PhaseCellState]) {
        for (phase, s) in self.phases.iter().zip(states.iter_mut()) {
            *s = PhaseCellState::new(
                phase.alpha.get(celli),
                phase.rho.get(celli),
                phase.e.get(celli),
                phase.t.get(celli),
            );
        }
    }

    pub(super) fn gather_patch(&self, patchi: usize, facei: usize, states: &mut [PhaseCellState]) {
        for (phase, s) in self.phases.iter().zip(states.iter_mut()) {
            *s = PhaseCellState::new(
                phase.alpha.boundary(patchi)[facei],
                phase.rho.boundary(patchi)[facei],
                phase.e.boundary(patchi)[facei],
                phase.t.boundary(patchi)[facei],
            );
        }
    }
}
