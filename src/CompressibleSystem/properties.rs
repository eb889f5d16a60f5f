use super::closure::PhaseClosure;
use super::errors::SystemError;
use super::phase::Phase;
use super::system::CompressibleSystem;
use crate::FluxSchemes::FluxScheme;
use crate::Mesh::fields::{FieldLookup, SurfaceScalarField, SurfaceVectorField, VolScalarField, VolVectorField};
use crate::Mesh::fv_mesh::FvMesh;
use crate::Reacting::species::ReactingExtension;
use crate::Thermodynamics::mixture::{MixtureCell, PhaseCellState};
use crate::config::SolutionControls;
use nalgebra::{DVector, Vector3};
use prettytable::{Table, row};

impl CompressibleSystem {
    /////////////////////////////////////////////////////////////////////////////////////
    // MIXTURE PROPERTY EVALUATION
    /////////////////////////////////////////////////////////////////////////////////////

    /// Evaluates `f(mixture, p)` in every cell
    fn cell_property<F>(&self, f: F) -> DVector<f64>
    where
        F: Fn(&MixtureCell, f64) -> f64,
    {
        let mut states = vec![PhaseCellState::default(); self.phases.len()];
        DVector::from_fn(self.mesh.n_cells(), |celli, _| {
            self.gather(celli, &mut states);
            f(&MixtureCell::new(self.thermos(), &states), self.p.get(celli))
        })
    }

    /// Evaluates `f(mixture, p)` on the ghost states of one patch
    fn patch_property<F>(&self, patchi: usize, f: F) -> Result<DVector<f64>, SystemError>
    where
        F: Fn(&MixtureCell, f64) -> f64,
    {
        let patch = self.mesh.patch(patchi)?;
        let mut states = vec![PhaseCellState::default(); self.phases.len()];
        Ok(DVector::from_fn(patch.size(), |facei, _| {
            self.gather_patch(patchi, facei, &mut states);
            f(&MixtureCell::new(self.thermos(), &states), self.p.boundary(patchi)[facei])
        }))
    }

    fn property_field<F>(&self, name: &str, f: F) -> VolScalarField
    where
        F: Fn(&MixtureCell, f64) -> f64,
    {
        let mut field = VolScalarField::uniform(name, &self.mesh, 0.0);
        *field.internal_mut() = self.cell_property(&f);
        for patchi in 0..self.mesh.patches().len() {
            if let Ok(values) = self.patch_property(patchi, &f) {
                *field.boundary_mut(patchi) = values;
            }
        }
        field
    }

    pub(super) fn mixture_alphah(&self) -> DVector<f64> {
        self.cell_property(|mix, _| mix.alphah())
    }

    /////////////////////////////////////////////////////////////////////////////////////
    // PRIMITIVE FIELDS
    /////////////////////////////////////////////////////////////////////////////////////

    pub fn t(&self) -> &VolScalarField {
        &self.t
    }

    pub fn e(&self) -> &VolScalarField {
        &self.e
    }

    pub fn p(&self) -> &VolScalarField {
        &self.p
    }

    pub fn rho(&self) -> &VolScalarField {
        &self.rho
    }

    pub fn u(&self) -> &VolVectorField {
        &self.u
    }

    pub fn speed_of_sound(&self) -> VolScalarField {
        self.property_field("c", |mix, p| mix.speed_of_sound_sqr(p).sqrt())
    }

    pub fn cv(&self) -> VolScalarField {
        self.property_field("Cv", |mix, _| mix.cv())
    }

    pub fn cp(&self) -> VolScalarField {
        self.property_field("Cp", |mix, _| mix.cp())
    }

    /////////////////////////////////////////////////////////////////////////////////////
    // TRANSPORT PROPERTIES
    /////////////////////////////////////////////////////////////////////////////////////

    /// Dynamic viscosity [kg/m/s]
    pub fn mu(&self) -> VolScalarField {
        self.property_field("mu", |mix, _| mix.mu())
    }

    pub fn mu_patch(&self, patchi: usize) -> Result<DVector<f64>, SystemError> {
        self.patch_property(patchi, |mix, _| mix.mu())
    }

    /// Kinematic viscosity [m²/s]
    pub fn nu(&self) -> VolScalarField {
        self.property_field("nu", |mix, _| mix.mu() / mix.rho())
    }

    pub fn nu_patch(&self, patchi: usize) -> Result<DVector<f64>, SystemError> {
        self.patch_property(patchi, |mix, _| mix.mu() / mix.rho())
    }

    /// Enthalpy diffusivity [kg/m/s]
    pub fn alphah(&self) -> VolScalarField {
        self.property_field("alphah", |mix, _| mix.alphah())
    }

    pub fn alphah_patch(&self, patchi: usize) -> Result<DVector<f64>, SystemError> {
        self.patch_property(patchi, |mix, _| mix.alphah())
    }

    /// Effective enthalpy diffusivity for a turbulent diffusivity `alphat`
    pub fn alpha_eff(&self, alphat: &VolScalarField) -> VolScalarField {
        let mut field = self.alphah().with_name("alphaEff");
        *field.internal_mut() += alphat.internal();
        for patchi in 0..field.n_patches() {
            *field.boundary_mut(patchi) += alphat.boundary(patchi);
        }
        field
    }

    pub fn alpha_eff_patch(&self, alphat: &DVector<f64>, patchi: usize) -> Result<DVector<f64>, SystemError> {
        Ok(self.alphah_patch(patchi)? + alphat)
    }

    /// Internal energy diffusivity κ/Cv [kg/m/s]
    pub fn alphahe(&self) -> VolScalarField {
        self.property_field("alphahe", |mix, _| mix.alphahe())
    }

    pub fn alphahe_patch(&self, patchi: usize) -> Result<DVector<f64>, SystemError> {
        self.patch_property(patchi, |mix, _| mix.alphahe())
    }

    /// Thermal conductivity [W/m/K]
    pub fn kappa(&self) -> VolScalarField {
        self.property_field("kappa", |mix, _| mix.kappa())
    }

    pub fn kappa_patch(&self, patchi: usize) -> Result<DVector<f64>, SystemError> {
        self.patch_property(patchi, |mix, _| mix.kappa())
    }

    /// κ + Cp αt
    pub fn kappa_eff(&self, alphat: &VolScalarField) -> VolScalarField {
        let mut field = self.kappa().with_name("kappaEff");
        let cp = self.cp();
        *field.internal_mut() += cp.internal().component_mul(alphat.internal());
        for patchi in 0..field.n_patches() {
            *field.boundary_mut(patchi) += cp.boundary(patchi).component_mul(alphat.boundary(patchi));
        }
        field
    }

    pub fn kappa_eff_patch(&self, alphat: &DVector<f64>, patchi: usize) -> Result<DVector<f64>, SystemError> {
        let cp = self.patch_property(patchi, |mix, _| mix.cp())?;
        Ok(self.kappa_patch(patchi)? + cp.component_mul(alphat))
    }

    /////////////////////////////////////////////////////////////////////////////////////
    // PHASES AND FLUXES
    /////////////////////////////////////////////////////////////////////////////////////

    pub fn mesh(&self) -> &FvMesh {
        &self.mesh
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn n_phases(&self) -> usize {
        self.phases.len()
    }

    pub fn closure_name(&self) -> &'static str {
        self.closure.name()
    }

    pub fn flux_scheme_name(&self) -> &'static str {
        self.flux_scheme.name()
    }

    pub fn controls(&self) -> &SolutionControls {
        &self.controls
    }

    pub fn reaction(&self) -> Option<&ReactingExtension> {
        self.reaction.as_ref()
    }

    pub fn alphas(&self) -> Vec<&VolScalarField> {
        self.phases.iter().map(|p| &p.alpha).collect()
    }

    pub fn rhos(&self) -> Vec<&VolScalarField> {
        self.phases.iter().map(|p| &p.rho).collect()
    }

    /// Phase masses αᵢρᵢ, straight from the conserved state
    pub fn alpha_rhos(&self) -> Vec<VolScalarField> {
        self.phases
            .iter()
            .zip(&self.conserved.alpha_rhos)
            .map(|(phase, m)| {
                let mut field = VolScalarField::uniform(&format!("alphaRho.{}", phase.name()), &self.mesh, 0.0);
                field.internal_mut().copy_from(m);
                field.correct_boundary_conditions(&self.mesh);
                field
            })
            .collect()
    }

    /// Volumetric flux [m³/s]
    pub fn phi(&self) -> &SurfaceScalarField {
        &self.phi
    }

    pub fn rho_phi(&self) -> &SurfaceScalarField {
        &self.rho_phi
    }

    pub fn rho_u_phi(&self) -> &SurfaceVectorField {
        &self.rho_u_phi
    }

    pub fn rho_e_phi(&self) -> &SurfaceScalarField {
        &self.rho_e_phi
    }

    pub fn alpha_phi(&self, phasei: usize) -> Option<&SurfaceScalarField> {
        self.phases.get(phasei).map(|p| &p.alpha_phi)
    }

    pub fn alpha_rho_phi(&self, phasei: usize) -> Option<&SurfaceScalarField> {
        self.phases.get(phasei).map(|p| &p.alpha_rho_phi)
    }

    /////////////////////////////////////////////////////////////////////////////////////
    // TIME STEP ESTIMATE
    /////////////////////////////////////////////////////////////////////////////////////

    /// ½ Σ_f (|U·n| + c)|Sf| / V per cell, the largest wave speed taken over both sides
    fn wave_rate(&self) -> DVector<f64> {
        let c = self.speed_of_sound();
        let mut sum = DVector::zeros(self.mesh.n_cells());
        let speed = |u: &Vector3<f64>, c: f64, sf: &Vector3<f64>| {
            u.dot(sf).abs() + c * sf.norm()
        };
        for face in self.mesh.internal_faces() {
            let lo = speed(&self.u.get(face.owner), c.get(face.owner), &face.area);
            let ln = speed(&self.u.get(face.neighbour), c.get(face.neighbour), &face.area);
            let lambda = lo.max(ln);
            sum[face.owner] += lambda;
            sum[face.neighbour] += lambda;
        }
        for (patchi, patch) in self.mesh.patches().iter().enumerate() {
            for (facei, bf) in patch.faces.iter().enumerate() {
                let lo = speed(&self.u.get(bf.owner), c.get(bf.owner), &bf.area);
                let lb = speed(&self.u.boundary(patchi)[facei], c.boundary(patchi)[facei], &bf.area);
                sum[bf.owner] += lo.max(lb);
            }
        }
        for (celli, v) in self.mesh.volumes().iter().enumerate() {
            sum[celli] *= 0.5 / v;
        }
        sum
    }

    /// Largest acoustic Courant number for a time step `delta_t`
    pub fn max_courant(&self, delta_t: f64) -> f64 {
        delta_t * self.wave_rate().max()
    }

    /// Time step giving the target Courant number; infinite for a fluid without waves
    pub fn stable_delta_t(&self, courant: f64) -> f64 {
        let rate = self.wave_rate().max();
        if rate > 0.0 { courant / rate } else { f64::INFINITY }
    }

    /////////////////////////////////////////////////////////////////////////////////////
    // DIAGNOSTICS
    /////////////////////////////////////////////////////////////////////////////////////

    pub fn pretty_print_summary(&self) -> Table {
        let mut table = Table::new();
        table.add_row(row!["field", "min", "max"]);
        let mut add = |name: &str, values: &DVector<f64>| {
            table.add_row(row![name, format!("{:.6e}", values.min()), format!("{:.6e}", values.max())]);
        };
        add("p", self.p.internal());
        add("T", self.t.internal());
        add("rho", self.rho.internal());
        let mag_u = DVector::from_iterator(self.mesh.n_cells(), self.u.internal().iter().map(|u| u.norm()));
        add("mag(U)", &mag_u);
        for phase in &self.phases {
            add(phase.alpha.name(), phase.alpha.internal());
        }
        if let Some(ext) = &self.reaction {
            for k in 0..ext.n_species() {
                add(ext.y(k).name(), ext.y(k).internal());
            }
        }
        table
    }
}

impl FieldLookup for CompressibleSystem {
    fn lookup_scalar(&self, name: &str) -> Option<VolScalarField> {
        match name {
            "p" => return Some(self.p.clone()),
            "T" => return Some(self.t.clone()),
            "rho" => return Some(self.rho.clone()),
            "e" => return Some(self.e.clone()),
            "c" => return Some(self.speed_of_sound()),
            "mu" => return Some(self.mu()),
            "kappa" => return Some(self.kappa()),
            _ => {}
        }
        for phase in &self.phases {
            for field in [&phase.alpha, &phase.rho, &phase.e, &phase.t] {
                if field.name() == name {
                    return Some(field.clone());
                }
            }
        }
        self.reaction.as_ref().and_then(|ext| {
            (0..ext.n_species())
                .map(|k| ext.y(k))
                .find(|y| y.name() == name)
                .cloned()
        })
    }

    fn scalar_field_names(&self) -> Vec<String> {
        let mut names: Vec<String> = ["p", "T", "rho", "e", "c", "mu", "kappa"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        for phase in &self.phases {
            for field in [&phase.alpha, &phase.rho, &phase.e, &phase.t] {
                names.push(field.name().to_string());
            }
        }
        if let Some(ext) = &self.reaction {
            names.extend((0..ext.n_species()).map(|k| ext.y(k).name().to_string()));
        }
        names
    }
}
