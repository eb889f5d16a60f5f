use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MeshError {
    #[error("Mesh has no cells")]
    Empty,
    #[error("Cell {cell} has non-positive volume {volume}")]
    InvalidVolume { cell: usize, volume: f64 },
    #[error("Face {face} has zero area")]
    ZeroArea { face: usize },
    #[error("Face {face} references cell {cell}, mesh has {n_cells} cells")]
    CellOutOfRange {
        face: usize,
        cell: usize,
        n_cells: usize,
    },
    #[error("Field '{field}' has {got} values, expected {expected}")]
    SizeMismatch {
        field: String,
        got: usize,
        expected: usize,
    },
    #[error("Unknown patch index {0}")]
    UnknownPatch(usize),
}

/// Boundary behaviour of a patch when ghost values are built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatchKind {
    /// ghost state copies the owner cell
    ZeroGradient,
    /// slip wall: ghost velocity has its normal component reflected
    Wall,
}

/// Face between two cells. `area` is the face area vector, directed owner -> neighbour.
#[derive(Debug, Clone, PartialEq)]
pub struct InternalFace {
    pub owner: usize,
    pub neighbour: usize,
    pub area: Vector3<f64>,
}

/// Boundary face; `area` points out of the domain
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFace {
    pub owner: usize,
    pub area: Vector3<f64>,
    pub centre: Vector3<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub name: String,
    pub kind: PatchKind,
    pub faces: Vec<BoundaryFace>,
}

impl Patch {
    pub fn size(&self) -> usize {
        self.faces.len()
    }
}

/// Unstructured finite-volume mesh
#[derive(Debug, Clone, PartialEq)]
pub struct FvMesh {
    volumes: Vec<f64>,
    centres: Vec<Vector3<f64>>,
    faces: Vec<InternalFace>,
    patches: Vec<Patch>,
}

impl FvMesh {
    /// Builds a mesh from raw connectivity and checks it.
    pub fn from_parts(
        volumes: Vec<f64>,
        centres: Vec<Vector3<f64>>,
        faces: Vec<InternalFace>,
        patches: Vec<Patch>,
    ) -> Result<Self, MeshError> {
        if centres.len() != volumes.len() {
            return Err(MeshError::SizeMismatch {
                field: "cell centres".to_string(),
                got: centres.len(),
                expected: volumes.len(),
            });
        }
        let mesh = Self {
            volumes,
            centres,
            faces,
            patches,
        };
        mesh.validate()?;
        Ok(mesh)
    }

    /// Uniform 1D mesh of `n` cells on `[0, length]` with unit cross-section.
    /// Patch 0 is "left", patch 1 is "right".
    pub fn uniform_1d(
        n: usize,
        length: f64,
        left: PatchKind,
        right: PatchKind,
    ) -> Result<Self, MeshError> {
        if n == 0 {
            return Err(MeshError::Empty);
        }
        let dx = length / n as f64;
        let volumes = vec![dx; n];
        let centres = (0..n)
            .map(|i| Vector3::new((i as f64 + 0.5) * dx, 0.0, 0.0))
            .collect();
        let faces = (0..n - 1)
            .map(|i| InternalFace {
                owner: i,
                neighbour: i + 1,
                area: Vector3::new(1.0, 0.0, 0.0),
            })
            .collect();
        let patches = vec![
            Patch {
                name: "left".to_string(),
                kind: left,
                faces: vec![BoundaryFace {
                    owner: 0,
                    area: Vector3::new(-1.0, 0.0, 0.0),
                    centre: Vector3::zeros(),
                }],
            },
            Patch {
                name: "right".to_string(),
                kind: right,
                faces: vec![BoundaryFace {
                    owner: n - 1,
                    area: Vector3::new(1.0, 0.0, 0.0),
                    centre: Vector3::new(length, 0.0, 0.0),
                }],
            },
        ];
        Self::from_parts(volumes, centres, faces, patches)
    }

    pub fn validate(&self) -> Result<(), MeshError> {
        let n_cells = self.volumes.len();
        if n_cells == 0 {
            return Err(MeshError::Empty);
        }
        for (cell, &volume) in self.volumes.iter().enumerate() {
            if !(volume > 0.0) {
                return Err(MeshError::InvalidVolume { cell, volume });
            }
        }
        for (face, f) in self.faces.iter().enumerate() {
            for cell in [f.owner, f.neighbour] {
                if cell >= n_cells {
                    return Err(MeshError::CellOutOfRange {
                        face,
                        cell,
                        n_cells,
                    });
                }
            }
            if f.area.norm() == 0.0 {
                return Err(MeshError::ZeroArea { face });
            }
        }
        // boundary faces are numbered after the internal ones in error reports
        let mut face = self.faces.len();
        for patch in &self.patches {
            for bf in &patch.faces {
                if bf.owner >= n_cells {
                    return Err(MeshError::CellOutOfRange {
                        face,
                        cell: bf.owner,
                        n_cells,
                    });
                }
                if bf.area.norm() == 0.0 {
                    return Err(MeshError::ZeroArea { face });
                }
                face += 1;
            }
        }
        Ok(())
    }

    pub fn n_cells(&self) -> usize {
        self.volumes.len()
    }

    pub fn n_internal_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn volumes(&self) -> &[f64] {
        &self.volumes
    }

    pub fn centres(&self) -> &[Vector3<f64>] {
        &self.centres
    }

    pub fn internal_faces(&self) -> &[InternalFace] {
        &self.faces
    }

    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    pub fn patch(&self, patchi: usize) -> Result<&Patch, MeshError> {
        self.patches
            .get(patchi)
            .ok_or(MeshError::UnknownPatch(patchi))
    }

    pub fn patch_sizes(&self) -> Vec<usize> {
        self.patches.iter().map(Patch::size).collect()
    }

    /// 1/|d| for an internal face, d joining owner and neighbour centres
    pub fn delta_coeff(&self, facei: usize) -> f64 {
        let f = &self.faces[facei];
        1.0 / (self.centres[f.neighbour] - self.centres[f.owner]).norm()
    }

    /// 1/|d| for a boundary face, d joining the owner centre and the face centre
    pub fn boundary_delta_coeff(&self, patchi: usize, facei: usize) -> f64 {
        let bf = &self.patches[patchi].faces[facei];
        1.0 / (bf.centre - self.centres[bf.owner]).norm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn uniform_1d_connectivity() {
        let mesh = FvMesh::uniform_1d(4, 2.0, PatchKind::ZeroGradient, PatchKind::Wall).unwrap();
        assert_eq!(mesh.n_cells(), 4);
        assert_eq!(mesh.n_internal_faces(), 3);
        assert_eq!(mesh.patch_sizes(), vec![1, 1]);
        assert_relative_eq!(mesh.volumes()[2], 0.5);
        assert_relative_eq!(mesh.delta_coeff(1), 2.0);
        assert_relative_eq!(mesh.boundary_delta_coeff(1, 0), 4.0);
        assert_eq!(mesh.patch(1).unwrap().kind, PatchKind::Wall);
        assert_eq!(mesh.patch(5), Err(MeshError::UnknownPatch(5)));
    }

    #[test]
    fn rejects_bad_meshes() {
        assert_eq!(
            FvMesh::uniform_1d(0, 1.0, PatchKind::Wall, PatchKind::Wall),
            Err(MeshError::Empty)
        );
        let err = FvMesh::from_parts(
            vec![1.0, -1.0],
            vec![Vector3::zeros(), Vector3::new(1.0, 0.0, 0.0)],
            vec![],
            vec![],
        )
        .unwrap_err();
        assert_eq!(
            err,
            MeshError::InvalidVolume {
                cell: 1,
                volume: -1.0
            }
        );
        let err = FvMesh::from_parts(
            vec![1.0, 1.0],
            vec![Vector3::zeros(), Vector3::new(1.0, 0.0, 0.0)],
            vec![InternalFace {
                owner: 0,
                neighbour: 7,
                area: Vector3::new(1.0, 0.0, 0.0),
            }],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, MeshError::CellOutOfRange { cell: 7, .. }));
    }
}
