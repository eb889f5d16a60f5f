//! Two-wave HLL solver (Harten, Lax & van Leer) with Davis wave speeds
use super::{Conserved, FaceState, FluxError, FluxScheme, NumericalFlux, check_wave_speeds, davis_wave_speeds, physical_flux};
use nalgebra::Vector3;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HLL;

impl FluxScheme for HLL {
    fn name(&self) -> &'static str {
        "HLL"
    }

    fn unit_flux(
        &self,
        left: &FaceState,
        right: &FaceState,
        n: &Vector3<f64>,
    ) -> Result<NumericalFlux, FluxError> {
        let (s_l, s_r) = davis_wave_speeds(left, right, n);
        check_wave_speeds(self.name(), s_l, s_r)?;
        if s_l >= 0.0 {
            return Ok(physical_flux(left, n));
        }
        if s_r <= 0.0 {
            return Ok(physical_flux(right, n));
        }
        let fl = physical_flux(left, n);
        let fr = physical_flux(right, n);
        let ul = Conserved::of(left);
        let ur = Conserved::of(right);
        let inv = 1.0 / (s_r - s_l);
        let blend = |l: f64, r: f64, ql: f64, qr: f64| (s_r * l - s_l * r + s_l * s_r * (qr - ql)) * inv;
        Ok(NumericalFlux {
            phi: blend(fl.phi, fr.phi, 1.0, 1.0),
            mass: blend(fl.mass, fr.mass, ul.rho, ur.rho),
            momentum: (s_r * fl.momentum - s_l * fr.momentum + s_l * s_r * (ur.rho_u - ul.rho_u)) * inv,
            energy: blend(fl.energy, fr.energy, ul.rho_e, ur.rho_e),
        })
    }
}
