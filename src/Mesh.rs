//! # Mesh and Field Collaborator
//!
//! ## Aim
//! Minimal unstructured finite-volume mesh and field containers consumed by the
//! compressible systems. Connectivity and the field arithmetic the core needs live here;
//! everything else a full mesh library offers (topology changes, decomposition, I/O)
//! is deliberately absent.
//!
//! ## Main Data Structures and Logic
//! - `FvMesh`: cell volumes and centres, internal faces (owner, neighbour, area vector
//!   pointing from owner to neighbour) and boundary patches. Cell and face enumeration is
//!   fixed at construction and never reordered.
//! - `VolScalarField`, `VolVectorField`: per-cell values plus per-patch ghost values.
//! - `SurfaceScalarField`, `SurfaceVectorField`: per-face values for internal faces and
//!   for every patch face.
//! - `fvc`: finite-volume calculus (divergence of face fluxes), accumulated in face order.
//!
//! ## Usage
//! ```rust
//! use PhaseFV::Mesh::fv_mesh::{FvMesh, PatchKind};
//! use PhaseFV::Mesh::fields::VolScalarField;
//! let mesh = FvMesh::uniform_1d(4, 1.0, PatchKind::ZeroGradient, PatchKind::Wall).unwrap();
//! let p = VolScalarField::uniform("p", &mesh, 1e5);
//! assert_eq!(p.internal().len(), 4);
//! assert_eq!(mesh.n_internal_faces(), 3);
//! ```
pub mod fields;
pub mod fv_mesh;
pub mod fvc;
