//! Explicit finite-volume calculus. Face contributions are accumulated in a fixed order
//! (internal faces by index, then patches by index) so results are bit-reproducible.
use super::fields::{SurfaceScalarField, SurfaceVectorField};
use super::fv_mesh::FvMesh;
use nalgebra::{DVector, Vector3};

/// Sum of outgoing face fluxes per cell, divided by the cell volume
pub fn div(mesh: &FvMesh, flux: &SurfaceScalarField) -> DVector<f64> {
    let mut result = DVector::zeros(mesh.n_cells());
    for (facei, face) in mesh.internal_faces().iter().enumerate() {
        let f = flux.internal()[facei];
        result[face.owner] += f;
        result[face.neighbour] -= f;
    }
    for (patchi, patch) in mesh.patches().iter().enumerate() {
        for (facei, bf) in patch.faces.iter().enumerate() {
            result[bf.owner] += flux.boundary(patchi)[facei];
        }
    }
    for (celli, v) in mesh.volumes().iter().enumerate() {
        result[celli] /= v;
    }
    result
}

pub fn div_vector(mesh: &FvMesh, flux: &SurfaceVectorField) -> Vec<Vector3<f64>> {
    let mut result = vec![Vector3::zeros(); mesh.n_cells()];
    for (facei, face) in mesh.internal_faces().iter().enumerate() {
        let f = flux.internal()[facei];
        result[face.owner] += f;
        result[face.neighbour] -= f;
    }
    for (patchi, patch) in mesh.patches().iter().enumerate() {
        for (facei, bf) in patch.faces.iter().enumerate() {
            result[bf.owner] += flux.boundary(patchi)[facei];
        }
    }
    for (celli, v) in mesh.volumes().iter().enumerate() {
        result[celli] /= *v;
    }
    result
}
