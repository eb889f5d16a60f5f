use crate::CompressibleSystem::{CellState, CompressibleSystem};
use crate::FluxSchemes::FLUX_SCHEMES;
use crate::FunctionObjects::{FieldMax, FunctionObjectError};
use crate::Mesh::fv_mesh::{FvMesh, PatchKind};
use crate::TimeIntegration::{RkScheme, RunControls, run_until};
use crate::config::SystemConfig;
use log::{error, info};
use nalgebra::Vector3;
use serde_json::json;
use std::error::Error;

type DemoResult = Result<(), Box<dyn Error>>;

pub fn shock_tube_examples(task: usize) {
    let outcome = match task {
        0 => sod_with_all_flux_schemes(),
        1 => water_air_shock_tube(),
        2 => reacting_closed_box(),
        _ => {
            error!("no example with number {}", task);
            Ok(())
        }
    };
    if let Err(e) = outcome {
        error!("example {} failed: {}", task, e);
    }
}

fn ideal_gas(name: &str, gamma: f64, cv: f64) -> serde_json::Value {
    json!({
        "name": name,
        "equationOfState": {"type": "idealGas", "coeffs": {"gamma": gamma, "cv": cv}},
        "transport": {"type": "const", "coeffs": {"mu": 1.8e-5, "Pr": 0.7}}
    })
}

/// SOD SHOCK TUBE: ρ = 1, p = 1 on the left, ρ = 0.125, p = 0.1 on the right, t = 0.2
fn sod_with_all_flux_schemes() -> DemoResult {
    for scheme in FLUX_SCHEMES {
        let cfg = SystemConfig::from_value(json!({
            "phases": [ideal_gas("gas", 1.4, 1.0)],
            "fluxScheme": scheme
        }))?;
        let mesh = FvMesh::uniform_1d(200, 1.0, PatchKind::Wall, PatchKind::Wall)?;
        let mut system = CompressibleSystem::new(mesh, &cfg)?;
        system.initialise_with(|_, x| {
            if x[0] < 0.5 {
                CellState::single(1.0, Vector3::zeros(), 1.0)
            } else {
                CellState::single(0.125, Vector3::zeros(), 0.1)
            }
        })?;
        let mut peaks = FieldMax::new(vec!["p".to_string(), "rho".to_string()], false);
        let controls = RunControls {
            end_time: 0.2,
            ..RunControls::default()
        };
        let mut observed: Result<(), FunctionObjectError> = Ok(());
        let summary = run_until(&mut system, &RkScheme::rk2_ssp(), &controls, |sys, _t| {
            if observed.is_ok() {
                observed = peaks.execute(sys);
            }
        })?;
        observed?;
        info!("{}: {} steps to t = {}", scheme, summary.steps, summary.time);
        println!("flux scheme {}", scheme);
        system.pretty_print_summary().printstd();
        peaks.summary_table().printstd();
    }
    Ok(())
}

/// WATER/AIR SHOCK TUBE: water at 1 GPa pushing air at 1 bar
fn water_air_shock_tube() -> DemoResult {
    let cfg = SystemConfig::from_value(json!({
        "phases": [
            {
                "name": "water",
                "equationOfState": {"type": "stiffenedGas", "coeffs": {"gamma": 4.4, "p_inf": 6e8, "cv": 1816.0}},
                "transport": {"type": "const", "coeffs": {"mu": 1e-3, "Pr": 7.0}}
            },
            ideal_gas("air", 1.4, 718.0)
        ],
        "fluxScheme": "HLLC"
    }))?;
    let mesh = FvMesh::uniform_1d(200, 1.0, PatchKind::ZeroGradient, PatchKind::ZeroGradient)?;
    let mut system = CompressibleSystem::new(mesh, &cfg)?;
    let eps = 1e-6;
    system.initialise_with(|_, x| {
        if x[0] < 0.7 {
            CellState::with_pressure(vec![1.0 - eps, eps], vec![1000.0, 50.0], Vector3::zeros(), 1e9)
        } else {
            CellState::with_pressure(vec![eps, 1.0 - eps], vec![1000.0, 50.0], Vector3::zeros(), 1e5)
        }
    })?;
    let controls = RunControls {
        end_time: 2.2e-4,
        courant: 0.4,
        ..RunControls::default()
    };
    let summary = run_until(&mut system, &RkScheme::rk3_ssp(), &controls, |_, _| {})?;
    info!(
        "water/air: {} steps, {} rejected, max U = {:.1} m/s",
        summary.steps,
        summary.rejected,
        system.u().internal().iter().map(|u| u.norm()).fold(0.0, f64::max)
    );
    system.pretty_print_summary().printstd();
    Ok(())
}

/// CLOSED BOX REACTION: A => B releasing heat, the temperature rises everywhere alike
fn reacting_closed_box() -> DemoResult {
    let cfg = SystemConfig::from_value(json!({
        "phases": [ideal_gas("gas", 1.4, 718.0)],
        "reactions": {
            "species": ["A", "B"],
            "molarMasses": [0.029, 0.029],
            "initialMassFractions": [1.0, 0.0],
            "reactions": [{"equation": "A => B", "A": 100.0, "n": 0.0, "Ea": 0.0, "Q": 1e4}]
        }
    }))?;
    let mesh = FvMesh::uniform_1d(10, 1.0, PatchKind::Wall, PatchKind::Wall)?;
    let mut system = CompressibleSystem::new(mesh, &cfg)?;
    system.set_uniform(&CellState::single(1.2, Vector3::zeros(), 1e5))?;
    let mut peaks = FieldMax::new(vec!["T".to_string()], false);
    let controls = RunControls {
        end_time: 1e-2,
        max_delta_t: 1e-4,
        ..RunControls::default()
    };
    let mut observed: Result<(), FunctionObjectError> = Ok(());
    run_until(&mut system, &RkScheme::rk4(), &controls, |sys, _t| {
        if observed.is_ok() {
            observed = peaks.execute(sys);
        }
    })?;
    observed?;
    system.pretty_print_summary().printstd();
    peaks.summary_table().printstd();
    Ok(())
}
