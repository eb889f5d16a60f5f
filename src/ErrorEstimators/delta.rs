use super::{ErrorEstimator, EstimatorError};
use crate::Mesh::fields::{FieldLookup, VolScalarField};
use crate::Mesh::fv_mesh::FvMesh;
use log::debug;

/// Guards the normalisation when both sides of a face are zero
pub const SMALL: f64 = 1e-15;

#[derive(Debug, Clone, PartialEq)]
pub struct Delta {
    field: String,
    error: VolScalarField,
}

impl Delta {
    pub fn new(mesh: &FvMesh, field: &str) -> Self {
        Self {
            field: field.to_string(),
            error: VolScalarField::uniform("error", mesh, 0.0),
        }
    }
}

#[inline]
fn jump(x_o: f64, x_n: f64) -> f64 {
    (x_n - x_o).abs() / x_o.abs().min(x_n.abs()).max(SMALL)
}

impl ErrorEstimator for Delta {
    fn name(&self) -> &'static str {
        "delta"
    }

    fn field_name(&self) -> &str {
        &self.field
    }

    fn update(&mut self, mesh: &FvMesh, fields: &dyn FieldLookup) -> Result<(), EstimatorError> {
        let x = fields
            .lookup_scalar(&self.field)
            .ok_or_else(|| EstimatorError::UnknownField {
                estimator: "delta",
                field: self.field.clone(),
                known: fields.scalar_field_names().join(", "),
            })?;
        let error = self.error.internal_mut();
        error.fill(0.0);
        for face in mesh.internal_faces() {
            let d = jump(x.get(face.owner), x.get(face.neighbour));
            error[face.owner] = error[face.owner].max(d);
            error[face.neighbour] = error[face.neighbour].max(d);
        }
        for (patchi, patch) in mesh.patches().iter().enumerate() {
            for (facei, bf) in patch.faces.iter().enumerate() {
                let d = jump(x.get(bf.owner), x.boundary(patchi)[facei]);
                error[bf.owner] = error[bf.owner].max(d);
            }
        }
        self.error.correct_boundary_conditions(mesh);
        debug!("delta({}): max error {:e}", self.field, self.error.max());
        Ok(())
    }

    fn error(&self) -> &VolScalarField {
        &self.error
    }
}
