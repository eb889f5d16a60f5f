//! Local Lax–Friedrichs (Rusanov) flux, the most dissipative of the family
use super::{Conserved, FaceState, FluxError, FluxScheme, NumericalFlux, physical_flux};
use nalgebra::Vector3;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rusanov;

impl FluxScheme for Rusanov {
    fn name(&self) -> &'static str {
        "Rusanov"
    }

    fn unit_flux(
        &self,
        left: &FaceState,
        right: &FaceState,
        n: &Vector3<f64>,
    ) -> Result<NumericalFlux, FluxError> {
        let s_max = (left.u.dot(n).abs() + left.c).max(right.u.dot(n).abs() + right.c);
        if !s_max.is_finite() {
            return Err(FluxError::NonFinite {
                scheme: self.name(),
                quantity: "wave speed",
                value: s_max,
            });
        }
        let fl = physical_flux(left, n);
        let fr = physical_flux(right, n);
        let ul = Conserved::of(left);
        let ur = Conserved::of(right);
        Ok(NumericalFlux {
            phi: 0.5 * (fl.phi + fr.phi),
            mass: 0.5 * (fl.mass + fr.mass) - 0.5 * s_max * (ur.rho - ul.rho),
            momentum: 0.5 * (fl.momentum + fr.momentum) - 0.5 * s_max * (ur.rho_u - ul.rho_u),
            energy: 0.5 * (fl.energy + fr.energy) - 0.5 * s_max * (ur.rho_e - ul.rho_e),
        })
    }
}
