//! # FluxSchemes
//!
//! ## Aim
//! Approximate Riemann solvers evaluating the numerical flux of mass, momentum and total
//! energy across a face from the left (owner) and right (neighbour) face states.
//!
//! ## Main Data Structures and Logic
//! - `FaceState`: primitive state on one side of a face (ρ, U, p, total specific energy E,
//!   speed of sound c).
//! - `FaceGeometry`: the face area vector `Sf`, pointing from left to right.
//! - `NumericalFlux`: integrated face fluxes (already multiplied by |Sf|) plus the
//!   volumetric flux `phi` used to transport volume fractions.
//! - `FluxScheme` trait dispatched through `FluxSchemeEnum` (`HLLC`, `HLL`, `Rusanov`).
//!   Every scheme returns the analytic flux when left and right states coincide.
//! - `FluxError`: non-finite or non-positive density, pressure-related or wave-speed
//!   quantities. The system turns it into a stage failure.
//!
//! ## Usage
//! ```rust
//! use PhaseFV::FluxSchemes::{create_flux_scheme_by_name, FaceGeometry, FaceState, FluxScheme};
//! use nalgebra::Vector3;
//! let scheme = create_flux_scheme_by_name("HLLC").unwrap();
//! let s = FaceState::new(1.0, Vector3::new(0.5, 0.0, 0.0), 1.0, 1.4);
//! let geom = FaceGeometry::new(Vector3::new(1.0, 0.0, 0.0));
//! let f = scheme.flux(&s, &s, &geom).unwrap();
//! assert!((f.mass - 0.5).abs() < 1e-14);
//! ```
use crate::config::ConfigError;
use enum_dispatch::enum_dispatch;
use nalgebra::Vector3;
use thiserror::Error;

pub mod hll;
pub mod hllc;
pub mod rusanov;

pub use hll::HLL;
pub use hllc::HLLC;
pub use rusanov::Rusanov;

#[derive(Debug, Error, PartialEq)]
pub enum FluxError {
    #[error("Non-physical {quantity} = {value} on the {side} side of the face")]
    NonPhysicalState {
        side: &'static str,
        quantity: &'static str,
        value: f64,
    },
    #[error("Non-finite {quantity} = {value} in {scheme} flux")]
    NonFinite {
        scheme: &'static str,
        quantity: &'static str,
        value: f64,
    },
}

/// Primitive state on one side of a face
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceState {
    pub rho: f64,
    pub u: Vector3<f64>,
    pub p: f64,
    /// total specific energy e + |U|²/2
    pub e_total: f64,
    pub c: f64,
}

impl FaceState {
    /// Ideal-gas convenience constructor (γ given), used by tests and demos
    pub fn new(rho: f64, u: Vector3<f64>, p: f64, gamma: f64) -> Self {
        let e = p / ((gamma - 1.0) * rho);
        Self {
            rho,
            u,
            p,
            e_total: e + 0.5 * u.norm_squared(),
            c: (gamma * p / rho).sqrt(),
        }
    }

    pub fn from_primitive(rho: f64, u: Vector3<f64>, p: f64, e: f64, c: f64) -> Self {
        Self {
            rho,
            u,
            p,
            e_total: e + 0.5 * u.norm_squared(),
            c,
        }
    }

    fn check(&self, side: &'static str) -> Result<(), FluxError> {
        if !(self.rho > 0.0 && self.rho.is_finite()) {
            return Err(FluxError::NonPhysicalState {
                side,
                quantity: "density",
                value: self.rho,
            });
        }
        if !(self.c > 0.0 && self.c.is_finite()) {
            return Err(FluxError::NonPhysicalState {
                side,
                quantity: "speed of sound",
                value: self.c,
            });
        }
        if !self.p.is_finite() || !self.e_total.is_finite() || !self.u.iter().all(|x| x.is_finite()) {
            return Err(FluxError::NonPhysicalState {
                side,
                quantity: "pressure/energy/velocity",
                value: self.p,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceGeometry {
    pub sf: Vector3<f64>,
}

impl FaceGeometry {
    pub fn new(sf: Vector3<f64>) -> Self {
        Self { sf }
    }
    pub fn mag_sf(&self) -> f64 {
        self.sf.norm()
    }
    pub fn normal(&self) -> Vector3<f64> {
        self.sf / self.mag_sf()
    }
}

/// Face-integrated fluxes, positive from left to right
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericalFlux {
    /// volumetric flux used for volume-fraction transport [m³/s]
    pub phi: f64,
    pub mass: f64,
    pub momentum: Vector3<f64>,
    pub energy: f64,
}

impl NumericalFlux {
    fn scale(self, mag_sf: f64) -> Self {
        Self {
            phi: self.phi * mag_sf,
            mass: self.mass * mag_sf,
            momentum: self.momentum * mag_sf,
            energy: self.energy * mag_sf,
        }
    }

    fn check(&self, scheme: &'static str) -> Result<(), FluxError> {
        for (quantity, value) in [
            ("phi", self.phi),
            ("mass flux", self.mass),
            ("energy flux", self.energy),
            ("momentum flux", self.momentum.norm_squared()),
        ] {
            if !value.is_finite() {
                return Err(FluxError::NonFinite {
                    scheme,
                    quantity,
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Conserved variables per unit volume
#[derive(Debug, Clone, Copy)]
pub(crate) struct Conserved {
    pub rho: f64,
    pub rho_u: Vector3<f64>,
    pub rho_e: f64,
}

impl Conserved {
    pub fn of(s: &FaceState) -> Self {
        Self {
            rho: s.rho,
            rho_u: s.rho * s.u,
            rho_e: s.rho * s.e_total,
        }
    }
}

/// Analytic Euler flux per unit area through a face of unit normal n
pub fn physical_flux(s: &FaceState, n: &Vector3<f64>) -> NumericalFlux {
    let un = s.u.dot(n);
    NumericalFlux {
        phi: un,
        mass: s.rho * un,
        momentum: s.rho * un * s.u + s.p * n,
        energy: (s.rho * s.e_total + s.p) * un,
    }
}

/// Davis estimates of the slowest and fastest signal speeds
pub(crate) fn davis_wave_speeds(left: &FaceState, right: &FaceState, n: &Vector3<f64>) -> (f64, f64) {
    let ul = left.u.dot(n);
    let ur = right.u.dot(n);
    let s_l = (ul - left.c).min(ur - right.c);
    let s_r = (ul + left.c).max(ur + right.c);
    (s_l, s_r)
}

fn check_wave_speeds(scheme: &'static str, s_l: f64, s_r: f64) -> Result<(), FluxError> {
    if !s_l.is_finite() {
        return Err(FluxError::NonFinite {
            scheme,
            quantity: "left wave speed",
            value: s_l,
        });
    }
    if !s_r.is_finite() {
        return Err(FluxError::NonFinite {
            scheme,
            quantity: "right wave speed",
            value: s_r,
        });
    }
    Ok(())
}

#[enum_dispatch]
pub trait FluxScheme {
    fn name(&self) -> &'static str;
    /// Per-unit-area flux; states are already validated
    fn unit_flux(
        &self,
        left: &FaceState,
        right: &FaceState,
        n: &Vector3<f64>,
    ) -> Result<NumericalFlux, FluxError>;

    fn flux(
        &self,
        left: &FaceState,
        right: &FaceState,
        geom: &FaceGeometry,
    ) -> Result<NumericalFlux, FluxError> {
        left.check("left")?;
        right.check("right")?;
        let f = self.unit_flux(left, right, &geom.normal())?.scale(geom.mag_sf());
        f.check(self.name())?;
        Ok(f)
    }
}

/////////////////////////////////////////////////////////////////////////////////////////
// FACTORY METHODS  ////////////////////////////////////////////////////////////////////
#[derive(Debug, Clone, PartialEq)]
#[enum_dispatch(FluxScheme)]
pub enum FluxSchemeEnum {
    HLLC(HLLC),
    HLL(HLL),
    Rusanov(Rusanov),
}

pub const FLUX_SCHEMES: [&str; 3] = ["HLLC", "HLL", "Rusanov"];

pub fn create_flux_scheme_by_name(name: &str) -> Result<FluxSchemeEnum, ConfigError> {
    match name {
        "HLLC" => Ok(FluxSchemeEnum::HLLC(HLLC)),
        "HLL" => Ok(FluxSchemeEnum::HLL(HLL)),
        "Rusanov" => Ok(FluxSchemeEnum::Rusanov(Rusanov)),
        _ => Err(ConfigError::unknown_model("fluxScheme", name, &FLUX_SCHEMES)),
    }
}
