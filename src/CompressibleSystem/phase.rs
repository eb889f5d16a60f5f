use crate::Mesh::fields::{SurfaceScalarField, VolScalarField};
use crate::Mesh::fv_mesh::FvMesh;
use crate::Thermodynamics::phase_thermo::PhaseThermo;

/// Primitive fields and face fluxes of one phase. The conserved phase mass lives in the
/// system's `ConservedState`.
#[derive(Debug, Clone)]
pub struct Phase {
    pub thermo: PhaseThermo,
    pub alpha: VolScalarField,
    pub rho: VolScalarField,
    pub e: VolScalarField,
    pub t: VolScalarField,
    pub alpha_phi: SurfaceScalarField,
    pub alpha_rho_phi: SurfaceScalarField,
}

impl Phase {
    pub fn new(thermo: PhaseThermo, mesh: &FvMesh) -> Self {
        let name = thermo.name.clone();
        Self {
            thermo,
            alpha: VolScalarField::uniform(&format!("alpha.{}", name), mesh, 0.0),
            rho: VolScalarField::uniform(&format!("rho.{}", name), mesh, 0.0),
            e: VolScalarField::uniform(&format!("e.{}", name), mesh, 0.0),
            t: VolScalarField::uniform(&format!("T.{}", name), mesh, 0.0),
            alpha_phi: SurfaceScalarField::zeros(&format!("alphaPhi.{}", name), mesh),
            alpha_rho_phi: SurfaceScalarField::zeros(&format!("alphaRhoPhi.{}", name), mesh),
        }
    }

    pub fn name(&self) -> &str {
        &self.thermo.name
    }

    pub fn correct_boundary_conditions(&mut self, mesh: &FvMesh) {
        self.alpha.correct_boundary_conditions(mesh);
        self.rho.correct_boundary_conditions(mesh);
        self.e.correct_boundary_conditions(mesh);
        self.t.correct_boundary_conditions(mesh);
    }
}
