//! HLLC approximate Riemann solver (Toro, Spruce & Speares) with Davis wave speeds.
//! The contact speed S* doubles as the face velocity for the volumetric flux.
use super::{Conserved, FaceState, FluxError, FluxScheme, NumericalFlux, check_wave_speeds, davis_wave_speeds, physical_flux};
use nalgebra::Vector3;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HLLC;

fn star_state(s: &FaceState, s_k: f64, s_star: f64, n: &Vector3<f64>) -> Conserved {
    let un = s.u.dot(n);
    let chi = (s_k - un) / (s_k - s_star);
    let rho = s.rho * chi;
    let u_star = s.u + (s_star - un) * n;
    let e_star = s.e_total + (s_star - un) * (s_star + s.p / (s.rho * (s_k - un)));
    Conserved {
        rho,
        rho_u: rho * u_star,
        rho_e: rho * e_star,
    }
}

fn star_flux(s: &FaceState, s_k: f64, s_star: f64, n: &Vector3<f64>) -> NumericalFlux {
    let f = physical_flux(s, n);
    let u = Conserved::of(s);
    let u_star = star_state(s, s_k, s_star, n);
    NumericalFlux {
        phi: s_star,
        mass: f.mass + s_k * (u_star.rho - u.rho),
        momentum: f.momentum + s_k * (u_star.rho_u - u.rho_u),
        energy: f.energy + s_k * (u_star.rho_e - u.rho_e),
    }
}

impl FluxScheme for HLLC {
    fn name(&self) -> &'static str {
        "HLLC"
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
        let ul = left.u.dot(n);
        let ur = right.u.dot(n);
        let ml = left.rho * (s_l - ul);
        let mr = right.rho * (s_r - ur);
        let s_star = (right.p - left.p + ml * ul - mr * ur) / (ml - mr);
        if !s_star.is_finite() {
            return Err(FluxError::NonFinite {
                scheme: self.name(),
                quantity: "contact speed",
                value: s_star,
            });
        }
        if s_star >= 0.0 {
            Ok(star_flux(left, s_l, s_star, n))
        } else {
            Ok(star_flux(right, s_r, s_star, n))
        }
    }
}
