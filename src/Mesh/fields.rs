use super::fv_mesh::{FvMesh, MeshError, PatchKind};
use nalgebra::{DVector, Vector3};

/// Cell-centred scalar field with per-patch ghost values
#[derive(Debug, Clone, PartialEq)]
pub struct VolScalarField {
    name: String,
    internal: DVector<f64>,
    boundary: Vec<DVector<f64>>,
}

impl VolScalarField {
    pub fn uniform(name: &str, mesh: &FvMesh, value: f64) -> Self {
        Self {
            name: name.to_string(),
            internal: DVector::from_element(mesh.n_cells(), value),
            boundary: mesh
                .patch_sizes()
                .into_iter()
                .map(|n| DVector::from_element(n, value))
                .collect(),
        }
    }

    pub fn from_values(name: &str, mesh: &FvMesh, values: Vec<f64>) -> Result<Self, MeshError> {
        if values.len() != mesh.n_cells() {
            return Err(MeshError::SizeMismatch {
                field: name.to_string(),
                got: values.len(),
                expected: mesh.n_cells(),
            });
        }
        let mut field = Self::uniform(name, mesh, 0.0);
        field.internal = DVector::from_vec(values);
        field.correct_boundary_conditions(mesh);
        Ok(field)
    }

    /// Cell values from a vector already sized to the mesh, boundaries zero-gradient
    pub fn from_dvector(name: &str, mesh: &FvMesh, values: DVector<f64>) -> Result<Self, MeshError> {
        Self::from_values(name, mesh, values.iter().copied().collect())
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn internal(&self) -> &DVector<f64> {
        &self.internal
    }

    pub fn internal_mut(&mut self) -> &mut DVector<f64> {
        &mut self.internal
    }

    pub fn boundary(&self, patchi: usize) -> &DVector<f64> {
        &self.boundary[patchi]
    }

    pub fn boundary_mut(&mut self, patchi: usize) -> &mut DVector<f64> {
        &mut self.boundary[patchi]
    }

    pub fn n_patches(&self) -> usize {
        self.boundary.len()
    }

    #[inline]
    pub fn get(&self, celli: usize) -> f64 {
        self.internal[celli]
    }

    #[inline]
    pub fn set(&mut self, celli: usize, value: f64) {
        self.internal[celli] = value;
    }

    /// Scalars are zero-gradient on every patch kind
    pub fn correct_boundary_conditions(&mut self, mesh: &FvMesh) {
        for (patchi, patch) in mesh.patches().iter().enumerate() {
            for (facei, bf) in patch.faces.iter().enumerate() {
                self.boundary[patchi][facei] = self.internal[bf.owner];
            }
        }
    }

    pub fn max(&self) -> f64 {
        self.internal.max()
    }

    pub fn min(&self) -> f64 {
        self.internal.min()
    }
}

/// Cell-centred vector field with per-patch ghost values
#[derive(Debug, Clone, PartialEq)]
pub struct VolVectorField {
    name: String,
    internal: Vec<Vector3<f64>>,
    boundary: Vec<Vec<Vector3<f64>>>,
}

impl VolVectorField {
    pub fn uniform(name: &str, mesh: &FvMesh, value: Vector3<f64>) -> Self {
        Self {
            name: name.to_string(),
            internal: vec![value; mesh.n_cells()],
            boundary: mesh
                .patch_sizes()
                .into_iter()
                .map(|n| vec![value; n])
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn internal(&self) -> &[Vector3<f64>] {
        &self.internal
    }

    pub fn internal_mut(&mut self) -> &mut [Vector3<f64>] {
        &mut self.internal
    }

    pub fn boundary(&self, patchi: usize) -> &[Vector3<f64>] {
        &self.boundary[patchi]
    }

    #[inline]
    pub fn get(&self, celli: usize) -> Vector3<f64> {
        self.internal[celli]
    }

    #[inline]
    pub fn set(&mut self, celli: usize, value: Vector3<f64>) {
        self.internal[celli] = value;
    }

    /// zeroGradient copies the owner value, wall reflects the normal component
    pub fn correct_boundary_conditions(&mut self, mesh: &FvMesh) {
        for (patchi, patch) in mesh.patches().iter().enumerate() {
            for (facei, bf) in patch.faces.iter().enumerate() {
                let v = self.internal[bf.owner];
                self.boundary[patchi][facei] = match patch.kind {
                    PatchKind::ZeroGradient => v,
                    PatchKind::Wall => {
                        let n = bf.area.normalize();
                        v - 2.0 * v.dot(&n) * n
                    }
                };
            }
        }
    }
}

/// Face scalar field: internal faces plus every patch face
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceScalarField {
    name: String,
    internal: DVector<f64>,
    boundary: Vec<DVector<f64>>,
}

impl SurfaceScalarField {
    pub fn zeros(name: &str, mesh: &FvMesh) -> Self {
        Self {
            name: name.to_string(),
            internal: DVector::zeros(mesh.n_internal_faces()),
            boundary: mesh
                .patch_sizes()
                .into_iter()
                .map(|n| DVector::zeros(n))
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn internal(&self) -> &DVector<f64> {
        &self.internal
    }

    pub fn internal_mut(&mut self) -> &mut DVector<f64> {
        &mut self.internal
    }

    pub fn boundary(&self, patchi: usize) -> &DVector<f64> {
        &self.boundary[patchi]
    }

    pub fn boundary_mut(&mut self, patchi: usize) -> &mut DVector<f64> {
        &mut self.boundary[patchi]
    }
}

/// Face vector field: internal faces plus every patch face
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceVectorField {
    name: String,
    internal: Vec<Vector3<f64>>,
    boundary: Vec<Vec<Vector3<f64>>>,
}

impl SurfaceVectorField {
    pub fn zeros(name: &str, mesh: &FvMesh) -> Self {
        Self {
            name: name.to_string(),
            internal: vec![Vector3::zeros(); mesh.n_internal_faces()],
            boundary: mesh
                .patch_sizes()
                .into_iter()
                .map(|n| vec![Vector3::zeros(); n])
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn internal(&self) -> &[Vector3<f64>] {
        &self.internal
    }

    pub fn internal_mut(&mut self) -> &mut [Vector3<f64>] {
        &mut self.internal
    }

    pub fn boundary(&self, patchi: usize) -> &[Vector3<f64>] {
        &self.boundary[patchi]
    }

    pub fn boundary_mut(&mut self, patchi: usize) -> &mut [Vector3<f64>] {
        &mut self.boundary[patchi]
    }
}

/// Access to cell fields by name, the registry seam used by error estimators and
/// function objects
pub trait FieldLookup {
    fn lookup_scalar(&self, name: &str) -> Option<VolScalarField>;
    fn scalar_field_names(&self) -> Vec<String>;
}
