use nalgebra::{DVector, Vector3};

/// Conserved variables of every cell: the source of truth the primitives are decoded from
#[derive(Debug, Clone, PartialEq)]
pub struct ConservedState {
    /// αᵢρᵢ per phase
    pub alpha_rhos: Vec<DVector<f64>>,
    /// transported volume fractions (none, the first phase, or all phases)
    pub alphas: Vec<DVector<f64>>,
    pub rho_u: Vec<Vector3<f64>>,
    pub rho_e: DVector<f64>,
    /// ρYₖ per species, empty without reactions
    pub rho_ys: Vec<DVector<f64>>,
}

impl ConservedState {
    pub fn zeros(n_cells: usize, n_phases: usize, n_alphas: usize, n_species: usize) -> Self {
        Self {
            alpha_rhos: vec![DVector::zeros(n_cells); n_phases],
            alphas: vec![DVector::zeros(n_cells); n_alphas],
            rho_u: vec![Vector3::zeros(); n_cells],
            rho_e: DVector::zeros(n_cells),
            rho_ys: vec![DVector::zeros(n_cells); n_species],
        }
    }

    pub fn zeros_like(&self) -> Self {
        Self::zeros(
            self.rho_e.len(),
            self.alpha_rhos.len(),
            self.alphas.len(),
            self.rho_ys.len(),
        )
    }

    /// self += a * other
    pub fn add_scaled(&mut self, a: f64, other: &ConservedState) {
        for (x, y) in self.alpha_rhos.iter_mut().zip(&other.alpha_rhos) {
            x.axpy(a, y, 1.0);
        }
        for (x, y) in self.alphas.iter_mut().zip(&other.alphas) {
            x.axpy(a, y, 1.0);
        }
        for (x, y) in self.rho_u.iter_mut().zip(&other.rho_u) {
            *x += *y * a;
        }
        self.rho_e.axpy(a, &other.rho_e, 1.0);
        for (x, y) in self.rho_ys.iter_mut().zip(&other.rho_ys) {
            x.axpy(a, y, 1.0);
        }
    }

    /// Largest absolute difference over every component, used by tests and diagnostics
    pub fn max_abs_diff(&self, other: &ConservedState) -> f64 {
        let mut m: f64 = 0.0;
        let mut scalar = |x: &DVector<f64>, y: &DVector<f64>| {
            for (a, b) in x.iter().zip(y.iter()) {
                m = m.max((a - b).abs());
            }
        };
        for (x, y) in self.alpha_rhos.iter().zip(&other.alpha_rhos) {
            scalar(x, y);
        }
        for (x, y) in self.alphas.iter().zip(&other.alphas) {
            scalar(x, y);
        }
        scalar(&self.rho_e, &other.rho_e);
        for (x, y) in self.rho_ys.iter().zip(&other.rho_ys) {
            scalar(x, y);
        }
        for (a, b) in self.rho_u.iter().zip(&other.rho_u) {
            m = m.max((a - b).amax());
        }
        m
    }
}
