use super::*;
use crate::Mesh::fv_mesh::{FvMesh, PatchKind};
use crate::Mesh::fvc;
use crate::TimeIntegration::{RkScheme, RunControls, integrate_step, run_until};
use crate::config::SystemConfig;
use approx::assert_relative_eq;
use nalgebra::Vector3;
use serde_json::{Value, json};
use std::f64::consts::PI;

fn ideal_phase(name: &str, gamma: f64, cv: f64) -> Value {
    json!({
        "name": name,
        "equationOfState": {"type": "idealGas", "coeffs": {"gamma": gamma, "cv": cv}},
        "transport": {"type": "const", "coeffs": {"mu": 1.8e-5, "Pr": 0.7}}
    })
}

fn water_phase() -> Value {
    json!({
        "name": "water",
        "equationOfState": {"type": "stiffenedGas", "coeffs": {"gamma": 4.4, "p_inf": 6e8, "cv": 1816.0}},
        "transport": {"type": "const", "coeffs": {"mu": 1e-3, "Pr": 7.0}}
    })
}

fn system(phases: Vec<Value>, scheme: &str, n: usize, left: PatchKind, right: PatchKind) -> CompressibleSystem {
    let cfg = SystemConfig::from_value(json!({ "phases": phases, "fluxScheme": scheme })).unwrap();
    let mesh = FvMesh::uniform_1d(n, 1.0, left, right).unwrap();
    CompressibleSystem::new(mesh, &cfg).unwrap()
}

fn sod(n: usize, scheme: &str) -> CompressibleSystem {
    let mut sys = system(vec![ideal_phase("gas", 1.4, 1.0)], scheme, n, PatchKind::Wall, PatchKind::Wall);
    sys.initialise_with(|_, x| {
        if x[0] < 0.5 {
            CellState::single(1.0, Vector3::zeros(), 1.0)
        } else {
            CellState::single(0.125, Vector3::zeros(), 0.1)
        }
    })
    .unwrap();
    sys
}

/// Exact density of Sod's problem (γ = 1.4, diaphragm at x = 0.5)
fn exact_sod_density(x: f64, t: f64) -> f64 {
    let g: f64 = 1.4;
    let (rho_l, p_l, rho_r, p_r): (f64, f64, f64, f64) = (1.0, 1.0, 0.125, 0.1);
    let c_l = (g * p_l / rho_l).sqrt();
    let c_r = (g * p_r / rho_r).sqrt();
    let f = |p: f64, rho_k: f64, p_k: f64, c_k: f64| -> f64 {
        if p > p_k {
            let a = 2.0 / ((g + 1.0) * rho_k);
            let b = (g - 1.0) / (g + 1.0) * p_k;
            (p - p_k) * (a / (p + b)).sqrt()
        } else {
            2.0 * c_k / (g - 1.0) * ((p / p_k).powf((g - 1.0) / (2.0 * g)) - 1.0)
        }
    };
    let (mut lo, mut hi) = (1e-8, 10.0);
    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        if f(mid, rho_l, p_l, c_l) + f(mid, rho_r, p_r, c_r) > 0.0 {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    let p_star = 0.5 * (lo + hi);
    let u_star = 0.5 * (f(p_star, rho_r, p_r, c_r) - f(p_star, rho_l, p_l, c_l));
    let s = (x - 0.5) / t;
    if s < u_star {
        let c_star = c_l * (p_star / p_l).powf((g - 1.0) / (2.0 * g));
        if s < -c_l {
            rho_l
        } else if s > u_star - c_star {
            rho_l * (p_star / p_l).powf(1.0 / g)
        } else {
            rho_l * (2.0 / (g + 1.0) - (g - 1.0) / ((g + 1.0) * c_l) * s).powf(2.0 / (g - 1.0))
        }
    } else {
        let ratio = p_star / p_r;
        let k = (g - 1.0) / (g + 1.0);
        let shock = c_r * ((g + 1.0) / (2.0 * g) * ratio + (g - 1.0) / (2.0 * g)).sqrt();
        if s < shock { rho_r * (ratio + k) / (k * ratio + 1.0) } else { rho_r }
    }
}

#[test]
fn exact_sod_reference_is_sane() {
    // star-region densities tabulated by Toro
    assert_relative_eq!(exact_sod_density(0.6, 0.2), 0.42632, max_relative = 1e-4);
    assert_relative_eq!(exact_sod_density(0.8, 0.2), 0.26557, max_relative = 1e-4);
    assert_relative_eq!(exact_sod_density(0.1, 0.2), 1.0);
    assert_relative_eq!(exact_sod_density(0.95, 0.2), 0.125);
}

#[test]
fn sod_shock_tube_converges_to_exact_solution() {
    for scheme in ["HLLC", "HLL", "Rusanov"] {
        let mut sys = sod(200, scheme);
        let controls = RunControls {
            end_time: 0.2,
            courant: 0.5,
            ..RunControls::default()
        };
        let summary = run_until(&mut sys, &RkScheme::rk2_ssp(), &controls, |_, _| {}).unwrap();
        assert_relative_eq!(summary.time, 0.2, epsilon = 1e-12);
        assert_eq!(summary.rejected, 0);
        let dx = 1.0 / 200.0;
        let l1: f64 = sys
            .mesh()
            .centres()
            .iter()
            .enumerate()
            .map(|(celli, x)| (sys.rho().get(celli) - exact_sod_density(x[0], 0.2)).abs() * dx)
            .sum();
        assert!(l1 < 0.03, "{}: L1(rho) = {}", scheme, l1);
    }
}

/// Forward Euler with Rusanov fluxes on plain arrays, slip walls as mirror ghosts
fn reference_rusanov_euler(rho: &mut [f64], mom: &mut [f64], en: &mut [f64], dx: f64, dt: f64, steps: usize) {
    let g: f64 = 1.4;
    let n = rho.len();
    let prim = |r: f64, m: f64, e: f64| {
        let u = m / r;
        let p = (g - 1.0) * (e - 0.5 * r * u * u);
        (r, u, p, (g * p / r).sqrt())
    };
    // flux of (rho, rho u, rho E) through a face of normal n (±1)
    let flux = |l: (f64, f64, f64, f64), r: (f64, f64, f64, f64), n: f64| {
        let phys = |s: (f64, f64, f64, f64)| {
            let un = s.1 * n;
            let e_tot = s.2 / ((g - 1.0) * s.0) + 0.5 * s.1 * s.1;
            ([s.0 * un, s.0 * un * s.1 + s.2 * n, (s.0 * e_tot + s.2) * un], [s.0, s.0 * s.1, s.0 * e_tot])
        };
        let (fl, ul) = phys(l);
        let (fr, ur) = phys(r);
        let s_max = ((l.1 * n).abs() + l.3).max((r.1 * n).abs() + r.3);
        [0, 1, 2].map(|k| 0.5 * (fl[k] + fr[k]) - 0.5 * s_max * (ur[k] - ul[k]))
    };
    for _ in 0..steps {
        let s: Vec<_> = (0..n).map(|i| prim(rho[i], mom[i], en[i])).collect();
        let mut div = vec![[0.0; 3]; n];
        for i in 0..n - 1 {
            let f = flux(s[i], s[i + 1], 1.0);
            for k in 0..3 {
                div[i][k] += f[k];
                div[i + 1][k] -= f[k];
            }
        }
        let mirror = |s: (f64, f64, f64, f64)| (s.0, -s.1, s.2, s.3);
        let fl = flux(s[0], mirror(s[0]), -1.0);
        let fr = flux(s[n - 1], mirror(s[n - 1]), 1.0);
        for k in 0..3 {
            div[0][k] += fl[k];
            div[n - 1][k] += fr[k];
        }
        for i in 0..n {
            rho[i] -= dt * div[i][0] / dx;
            mom[i] -= dt * div[i][1] / dx;
            en[i] -= dt * div[i][2] / dx;
        }
    }
}

#[test]
fn single_phase_matches_independent_array_solver() {
    let n = 50;
    let mut sys = system(vec![ideal_phase("gas", 1.4, 1.0)], "Rusanov", n, PatchKind::Wall, PatchKind::Wall);
    let init = |x: f64| {
        let rho = 1.0 + 0.2 * (2.0 * PI * x).sin();
        let u = 0.1 * (2.0 * PI * x).cos();
        let p = 1.0 + 0.1 * (4.0 * PI * x).sin();
        (rho, u, p)
    };
    sys.initialise_with(|_, c| {
        let (rho, u, p) = init(c[0]);
        CellState::single(rho, Vector3::new(u, 0.0, 0.0), p)
    })
    .unwrap();

    let start = sys.conserved_state().clone();
    let mut rho: Vec<f64> = start.alpha_rhos[0].iter().copied().collect();
    let mut mom: Vec<f64> = start.rho_u.iter().map(|m| m[0]).collect();
    let mut en: Vec<f64> = start.rho_e.iter().copied().collect();
    let dt = 1e-3;
    for _ in 0..5 {
        integrate_step(&mut sys, &RkScheme::euler(), dt).unwrap();
    }
    reference_rusanov_euler(&mut rho, &mut mom, &mut en, 1.0 / n as f64, dt, 5);
    let state = sys.conserved_state();
    for i in 0..n {
        assert_relative_eq!(state.alpha_rhos[0][i], rho[i], epsilon = 1e-10);
        assert_relative_eq!(state.rho_u[i][0], mom[i], epsilon = 1e-10);
        assert_relative_eq!(state.rho_e[i], en[i], epsilon = 1e-10);
        assert_eq!(state.rho_u[i][1], 0.0);
    }
}

#[test]
fn euler_stage_equals_flux_divergence() {
    let mut sys = sod(3, "HLLC");
    sys.update().unwrap();
    let before = sys.conserved_state().clone();
    let div_mass = fvc::div(sys.mesh(), sys.rho_phi());
    let div_energy = fvc::div(sys.mesh(), sys.rho_e_phi());
    let div_mom = fvc::div_vector(sys.mesh(), sys.rho_u_phi());
    let dt = 1e-3;
    sys.set_delta_t(dt).unwrap();
    sys.set_ode_fields(1, &[false], &[false]).unwrap();
    sys.solve(0, &[1.0], &[1.0]).unwrap();
    sys.clear_ode_fields();
    let after = sys.conserved_state();
    for i in 0..3 {
        assert_relative_eq!(after.alpha_rhos[0][i], before.alpha_rhos[0][i] - dt * div_mass[i], epsilon = 1e-14);
        assert_relative_eq!(after.rho_e[i], before.rho_e[i] - dt * div_energy[i], epsilon = 1e-14);
        assert_relative_eq!(after.rho_u[i][0], before.rho_u[i][0] - dt * div_mom[i][0], epsilon = 1e-14);
    }
    // the diaphragm sits between cells 0 and 1 and pushes mass to the right
    assert!(after.alpha_rhos[0][0] < before.alpha_rhos[0][0]);
    assert!(after.alpha_rhos[0][1] > before.alpha_rhos[0][1]);
}

#[test]
fn two_stage_protocol_uses_stored_state() {
    // rk2 through the raw protocol against integrate_step
    let mut a = sod(20, "HLLC");
    let mut b = sod(20, "HLLC");
    let dt = 1e-3;
    a.set_delta_t(dt).unwrap();
    a.set_ode_fields(2, &[true, false], &[false, false]).unwrap();
    a.update().unwrap();
    a.solve(0, &[1.0], &[1.0]).unwrap();
    assert_eq!(a.lifecycle(), Lifecycle::StageRunning { stage: 0, n_steps: 2 });
    a.update().unwrap();
    a.solve(1, &[0.5, 0.5], &[0.0, 0.5]).unwrap();
    a.clear_ode_fields();
    assert_eq!(a.lifecycle(), Lifecycle::Cleared);
    integrate_step(&mut b, &RkScheme::rk2_ssp(), dt).unwrap();
    assert_eq!(a.conserved_state().max_abs_diff(b.conserved_state()), 0.0);
}

#[test]
fn lifecycle_violations_are_rejected() {
    let mut sys = sod(4, "HLLC");
    assert_eq!(sys.lifecycle(), Lifecycle::Uninitialized);
    assert!(matches!(sys.solve(0, &[1.0], &[1.0]), Err(SystemError::Lifecycle { .. })));
    sys.set_ode_fields(2, &[true, false], &[false, false]).unwrap();
    assert!(matches!(
        sys.set_ode_fields(1, &[false], &[false]),
        Err(SystemError::Lifecycle { .. })
    ));
    assert!(matches!(sys.solve(0, &[1.0], &[1.0]), Err(SystemError::DeltaTNotSet)));
    sys.set_delta_t(1e-4).unwrap();
    assert!(matches!(sys.solve(2, &[1.0, 0.0, 0.0], &[1.0, 0.0, 0.0]), Err(SystemError::StageOutOfRange { .. })));
    assert!(matches!(sys.solve(1, &[1.0], &[1.0]), Err(SystemError::CoefficientLength { .. })));
    sys.clear_ode_fields();
    sys.clear_ode_fields();
    assert!(matches!(sys.solve(0, &[1.0], &[1.0]), Err(SystemError::Lifecycle { .. })));
    assert!(matches!(
        sys.set_ode_fields(2, &[true], &[false, false]),
        Err(SystemError::StorageFlagLength { .. })
    ));
    assert!(sys.set_delta_t(0.0).is_err());
}

#[test]
fn missing_storage_is_reported() {
    let mut sys = sod(4, "HLLC");
    sys.set_delta_t(1e-4).unwrap();
    sys.set_ode_fields(2, &[false, false], &[false, false]).unwrap();
    sys.solve(0, &[1.0], &[1.0]).unwrap();
    let err = sys.solve(1, &[0.5, 0.5], &[0.0, 0.5]).unwrap_err();
    assert!(matches!(err, SystemError::MissingStorage { stepi: 1, slot: 0, .. }));
    // zero coefficients need nothing
    sys.solve(1, &[0.0, 1.0], &[0.0, 1.0]).unwrap();
}

#[test]
fn set_and_clear_without_solve_leave_state_untouched() {
    let mut sys = sod(10, "HLLC");
    let before = sys.conserved_state().clone();
    let p = sys.p().clone();
    sys.set_ode_fields_for(&RkScheme::rk4()).unwrap();
    assert_eq!(
        sys.storage_descriptors().unwrap(),
        &[StorageDescriptor::Both, StorageDescriptor::DeltaOnly, StorageDescriptor::DeltaOnly, StorageDescriptor::None]
    );
    sys.clear_ode_fields();
    assert!(sys.storage_descriptors().is_none());
    assert_eq!(sys.conserved_state(), &before);
    assert_eq!(sys.p(), &p);
    assert_eq!(sys.lifecycle(), Lifecycle::Uninitialized);

    // after a completed step the same holds for Cleared
    integrate_step(&mut sys, &RkScheme::euler(), 1e-4).unwrap();
    assert_eq!(sys.lifecycle(), Lifecycle::Cleared);
    sys.set_ode_fields_for(&RkScheme::rk2_ssp()).unwrap();
    sys.clear_ode_fields();
    assert_eq!(sys.lifecycle(), Lifecycle::Cleared);
}

/// Two cells drained by diverging streams of a cold gas
fn diverging_streams() -> CompressibleSystem {
    let mut sys = system(
        vec![ideal_phase("gas", 1.4, 718.0)],
        "HLLC",
        20,
        PatchKind::ZeroGradient,
        PatchKind::ZeroGradient,
    );
    sys.initialise_with(|_, x| {
        let u = if x[0] < 0.5 { -2.0 } else { 2.0 };
        CellState::single(1.0, Vector3::new(u, 0.0, 0.0), 1e-3)
    })
    .unwrap();
    sys
}

#[test]
fn non_physical_stage_is_recoverable() {
    let mut sys = diverging_streams();
    let before = sys.conserved_state().clone();
    // cell 9 loses exactly its mass, then all but a sliver of it with negative energy
    for dt in [0.025, 0.0249] {
        let err = integrate_step(&mut sys, &RkScheme::euler(), dt).unwrap_err();
        assert!(err.is_recoverable(), "{}", err);
        assert!(
            matches!(err, SystemError::NonPhysicalStage { cell: 9, stage: 0, .. }),
            "{}",
            err
        );
        assert_eq!(sys.conserved_state(), &before);
        assert!(sys.storage_descriptors().is_none());
    }

    let controls = RunControls {
        end_time: 0.0249,
        courant: 2.0,
        max_delta_t: 0.0249,
        max_retries: 5,
    };
    let summary = run_until(&mut sys, &RkScheme::euler(), &controls, |_, _| {}).unwrap();
    assert!(summary.rejected > 0);
    assert_relative_eq!(summary.time, 0.0249, max_relative = 1e-12);
    assert!(sys.rho().min() > 0.0 && sys.t().min() > 0.0);
}

#[test]
fn failed_stage_leaves_system_unchanged() {
    let mut sys = sod(10, "HLLC");
    let before = sys.conserved_state().clone();
    let t_before = sys.t().clone();
    sys.set_delta_t(1.0).unwrap();
    sys.set_ode_fields(1, &[false], &[false]).unwrap();
    let err = sys.solve(0, &[1.0], &[1.0]).unwrap_err();
    assert!(err.is_recoverable(), "{}", err);
    assert_eq!(sys.conserved_state(), &before);
    assert_eq!(sys.t(), &t_before);
    assert_eq!(sys.lifecycle(), Lifecycle::FieldsSet { n_steps: 1 });
    // a sane step still works afterwards
    sys.set_delta_t(1e-4).unwrap();
    sys.solve(0, &[1.0], &[1.0]).unwrap();
}

#[test]
fn encode_decode_round_trip() {
    let mut sys = system(
        vec![water_phase(), ideal_phase("air", 1.4, 718.0)],
        "HLLC",
        6,
        PatchKind::ZeroGradient,
        PatchKind::ZeroGradient,
    );
    sys.initialise_with(|celli, _| {
        let a = 0.1 + 0.15 * celli as f64;
        CellState::with_pressure(vec![a, 1.0 - a], vec![1000.0, 1.2], Vector3::new(2.0, 0.0, 0.0), 2e5)
    })
    .unwrap();
    let p = sys.p().clone();
    let u = sys.u().clone();
    let alphas: Vec<_> = sys.alphas().into_iter().cloned().collect();
    sys.encode();
    sys.decode().unwrap();
    for i in 0..6 {
        assert_relative_eq!(sys.p().get(i), p.get(i), max_relative = 1e-9);
        assert_relative_eq!(sys.p().get(i), 2e5, max_relative = 1e-6);
        assert_relative_eq!(sys.u().get(i)[0], u.get(i)[0], max_relative = 1e-12);
        assert_relative_eq!(sys.alphas()[0].get(i), alphas[0].get(i), epsilon = 1e-15);
        assert_relative_eq!(sys.alphas()[0].get(i) + sys.alphas()[1].get(i), 1.0, epsilon = 1e-15);
    }
}

#[test]
fn two_phase_interface_at_rest_stays_at_rest() {
    let mut sys = system(
        vec![water_phase(), ideal_phase("air", 1.4, 718.0)],
        "HLLC",
        20,
        PatchKind::Wall,
        PatchKind::Wall,
    );
    assert_eq!(sys.closure_name(), "twoPhase");
    assert_eq!(sys.conserved_state().alphas.len(), 1);
    sys.initialise_with(|_, x| {
        let a = if x[0] < 0.5 { 1.0 - 1e-6 } else { 1e-6 };
        CellState::with_pressure(vec![a, 1.0 - a], vec![1000.0, 1.2], Vector3::zeros(), 1e5)
    })
    .unwrap();
    let alpha0 = sys.alphas()[0].clone();
    let dt = sys.stable_delta_t(0.4);
    for _ in 0..3 {
        integrate_step(&mut sys, &RkScheme::rk2_ssp(), dt).unwrap();
    }
    for i in 0..20 {
        assert!(sys.u().get(i).norm() < 1e-6);
        assert_relative_eq!(sys.p().get(i), 1e5, max_relative = 1e-8);
        assert_relative_eq!(sys.alphas()[0].get(i), alpha0.get(i), epsilon = 1e-9);
    }
}

#[test]
fn equal_density_mixture_at_rest_is_a_fixed_point() {
    let cases = [
        (vec![ideal_phase("a", 1.4, 718.0), ideal_phase("b", 1.67, 3116.0)], vec![0.5, 0.5], PatchKind::Wall),
        (vec![ideal_phase("a", 1.4, 718.0), ideal_phase("b", 1.67, 3116.0)], vec![0.5, 0.5], PatchKind::ZeroGradient),
        (
            vec![ideal_phase("a", 1.4, 718.0), ideal_phase("b", 1.67, 3116.0), ideal_phase("c", 1.3, 1400.0)],
            vec![0.25, 0.25, 0.5],
            PatchKind::Wall,
        ),
    ];
    for (phases, alphas, kind) in cases {
        let n = alphas.len();
        let mut sys = system(phases, "HLLC", 8, kind, kind);
        sys.set_uniform(&CellState::with_pressure(alphas, vec![1.0; n], Vector3::zeros(), 1e5))
            .unwrap();
        let before = sys.conserved_state().clone();
        sys.set_delta_t(1e-4).unwrap();
        sys.set_ode_fields(1, &[false], &[false]).unwrap();
        sys.update().unwrap();
        sys.solve(0, &[1.0], &[1.0]).unwrap();
        sys.clear_ode_fields();
        assert_eq!(sys.conserved_state().max_abs_diff(&before), 0.0);
    }
}

#[test]
fn multiphase_volume_fractions_sum_to_one() {
    let mut sys = system(
        vec![
            ideal_phase("a", 1.4, 718.0),
            ideal_phase("b", 1.67, 3116.0),
            ideal_phase("c", 1.3, 1400.0),
        ],
        "HLLC",
        30,
        PatchKind::ZeroGradient,
        PatchKind::ZeroGradient,
    );
    assert_eq!(sys.closure_name(), "multiphase");
    sys.initialise_with(|_, x| {
        let alphas = if x[0] < 0.3 {
            vec![0.98, 0.01, 0.01]
        } else if x[0] < 0.6 {
            vec![0.01, 0.98, 0.01]
        } else {
            vec![0.01, 0.01, 0.98]
        };
        CellState::with_pressure(alphas, vec![1.2, 0.17, 1.8], Vector3::new(10.0, 0.0, 0.0), 1e5)
    })
    .unwrap();
    let dt = sys.stable_delta_t(0.4);
    for _ in 0..5 {
        integrate_step(&mut sys, &RkScheme::rk3_ssp(), dt).unwrap();
    }
    for i in 0..30 {
        let sum: f64 = sys.alphas().iter().map(|a| a.get(i)).sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
        for a in sys.alphas() {
            assert!((0.0..=1.0).contains(&a.get(i)));
        }
        let sum_conserved: f64 = sys.conserved_state().alphas.iter().map(|a| a[i]).sum();
        assert_relative_eq!(sum_conserved, 1.0, epsilon = 1e-12);
    }
}

#[test]
fn accessors_and_initial_state_checks() {
    let mut sys = system(
        vec![water_phase(), ideal_phase("air", 1.4, 718.0)],
        "HLLC",
        4,
        PatchKind::ZeroGradient,
        PatchKind::Wall,
    );
    let bad = CellState::with_pressure(vec![0.5, 0.6], vec![1000.0, 1.2], Vector3::zeros(), 1e5);
    assert!(matches!(sys.set_uniform(&bad), Err(SystemError::InvalidInitialState { cell: 0, .. })));
    let bad = CellState::single(1.0, Vector3::zeros(), 1e5);
    assert!(matches!(sys.set_uniform(&bad), Err(SystemError::InvalidInitialState { .. })));

    // phases at a common temperature relax to a common pressure on decode
    sys.initialise_from_temperature(&[0.5, 0.5], &[1000.0, 1.2], Vector3::zeros(), 300.0)
        .unwrap();
    assert!(sys.p().min() > 0.0 && sys.t().min() > 0.0);
    let air = CellState::with_pressure(vec![0.0, 1.0], vec![1000.0, 1.2], Vector3::zeros(), 1e5);
    sys.set_phase_state(3, &air).unwrap();
    assert_relative_eq!(sys.alpha_rhos()[0].get(3), 0.0);
    assert_relative_eq!(sys.rho().get(3), 1.2, max_relative = 1e-12);

    let cp = sys.cp();
    let cv = sys.cv();
    assert_relative_eq!(cp.get(3) / cv.get(3), 1.4, max_relative = 1e-12);
    assert_relative_eq!(sys.mu().get(3), 1.8e-5, max_relative = 1e-12);
    assert_relative_eq!(sys.nu().get(3), 1.8e-5 / 1.2, max_relative = 1e-12);
    assert_relative_eq!(sys.alphah().get(3), 1.8e-5 / 0.7, max_relative = 1e-12);
    assert_relative_eq!(sys.kappa().get(3), 1.4 * 718.0 * 1.8e-5 / 0.7, max_relative = 1e-12);
    assert_relative_eq!(sys.alphahe().get(3), sys.kappa().get(3) / 718.0, max_relative = 1e-12);
    let alphat = crate::Mesh::fields::VolScalarField::uniform("alphat", sys.mesh(), 1e-3);
    assert_relative_eq!(sys.alpha_eff(&alphat).get(3), 1.8e-5 / 0.7 + 1e-3, max_relative = 1e-12);
    assert_relative_eq!(
        sys.kappa_eff(&alphat).get(3),
        sys.kappa().get(3) + cp.get(3) * 1e-3,
        max_relative = 1e-12
    );
    // right patch (index 1) sees the air cell through zero-gradient ghosts
    assert_relative_eq!(sys.mu_patch(1).unwrap()[0], 1.8e-5, max_relative = 1e-12);
    assert_relative_eq!(
        sys.alpha_eff_patch(&nalgebra::DVector::from_element(1, 1e-3), 1).unwrap()[0],
        1.8e-5 / 0.7 + 1e-3,
        max_relative = 1e-12
    );
    assert!(sys.kappa_patch(7).is_err());
    assert!(sys.speed_of_sound().min() > 0.0);
    assert!(sys.alpha_phi(1).is_some() && sys.alpha_phi(2).is_none());
    let table = sys.pretty_print_summary();
    assert_eq!(table.len(), 7);
}

#[test]
fn single_phase_temperature_initialisation_is_exact() {
    let mut sys = sod(4, "HLLC");
    sys.initialise_from_temperature(&[1.0], &[1.0], Vector3::zeros(), 2.5).unwrap();
    assert_relative_eq!(sys.t().get(2), 2.5, max_relative = 1e-14);
    // p = (γ − 1) ρ Cv T
    assert_relative_eq!(sys.p().get(2), 1.0, max_relative = 1e-14);
}

#[test]
fn courant_estimate_scales_with_time_step() {
    let sys = sod(100, "HLLC");
    let dt = sys.stable_delta_t(0.5);
    assert_relative_eq!(sys.max_courant(dt), 0.5, max_relative = 1e-12);
    // max wave speed is the left sound speed sqrt(1.4)
    assert_relative_eq!(dt, 0.5 * 0.01 / 1.4_f64.sqrt(), max_relative = 1e-12);
}

#[test]
fn reacting_system_releases_heat_in_closed_box() {
    let cfg = SystemConfig::from_value(json!({
        "phases": [ideal_phase("gas", 1.4, 718.0)],
        "reactions": {
            "species": ["A", "B"],
            "molarMasses": [0.029, 0.029],
            "initialMassFractions": [1.0, 0.0],
            "reactions": [{"equation": "A => B", "A": 100.0, "Q": 1e4}]
        }
    }))
    .unwrap();
    let mesh = FvMesh::uniform_1d(10, 1.0, PatchKind::Wall, PatchKind::Wall).unwrap();
    let mut sys = CompressibleSystem::new(mesh, &cfg).unwrap();
    sys.set_uniform(&CellState::single(1.2, Vector3::zeros(), 1e5)).unwrap();
    let t0 = sys.t().get(0);
    let mass0: f64 = sys.rho().internal().sum();
    assert!(sys.e_source().iter().all(|q| *q > 0.0));
    for _ in 0..5 {
        integrate_step(&mut sys, &RkScheme::euler(), 1e-4).unwrap();
    }
    let ext = sys.reaction().unwrap();
    for i in 0..10 {
        let y_a = ext.y(0).get(i);
        let y_b = ext.y(1).get(i);
        assert_relative_eq!(y_a + y_b, 1.0, epsilon = 1e-12);
        assert!(y_b > 0.0 && y_a < 1.0);
        assert!(sys.t().get(i) > t0);
        assert!(sys.u().get(i).norm() < 1e-6);
    }
    assert_relative_eq!(sys.rho().internal().sum(), mass0, max_relative = 1e-12);
    assert!(sys.set_mass_fractions(0, &[0.5, 0.5]).is_ok());
    assert_relative_eq!(sys.reaction().unwrap().y(1).get(0), 0.5, epsilon = 1e-12);
}

#[test]
fn field_lookup_by_name() {
    use crate::Mesh::fields::FieldLookup;
    let sys = sod(5, "HLLC");
    assert!(sys.lookup_scalar("p").is_some());
    assert!(sys.lookup_scalar("alpha.gas").is_some());
    assert!(sys.lookup_scalar("nothing").is_none());
    assert!(sys.scalar_field_names().contains(&"T.gas".to_string()));
}
