use super::rk_schemes::RkScheme;
use crate::CompressibleSystem::{CompressibleSystem, SystemError};
use log::{debug, info, warn};

/// Advances `system` by one outer step of `delta_t`. On failure the state at the start
/// of the step is restored, the stage buffers are released and the error is returned.
pub fn integrate_step(
    system: &mut CompressibleSystem,
    scheme: &RkScheme,
    delta_t: f64,
) -> Result<(), SystemError> {
    let start = system.conserved_state().clone();
    system.set_delta_t(delta_t)?;
    system.set_ode_fields_for(scheme)?;
    let outcome = (0..scheme.n_stages()).try_for_each(|stepi| {
        system.update()?;
        system.solve(stepi, &scheme.a[stepi], &scheme.b[stepi])
    });
    system.clear_ode_fields();
    if let Err(err) = outcome {
        system.restore_conserved_state(start)?;
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunControls {
    pub end_time: f64,
    /// target acoustic Courant number
    pub courant: f64,
    pub max_delta_t: f64,
    /// halvings of Δt tried on a recoverable failure before giving up
    pub max_retries: usize,
}

impl Default for RunControls {
    fn default() -> Self {
        Self {
            end_time: 1.0,
            courant: 0.5,
            max_delta_t: f64::INFINITY,
            max_retries: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RunSummary {
    pub time: f64,
    pub steps: usize,
    pub rejected: usize,
}

/// Marches from t = 0 to `controls.end_time`, calling `observer(system, t)` after every
/// accepted step.
pub fn run_until<F>(
    system: &mut CompressibleSystem,
    scheme: &RkScheme,
    controls: &RunControls,
    mut observer: F,
) -> Result<RunSummary, SystemError>
where
    F: FnMut(&CompressibleSystem, f64),
{
    let mut summary = RunSummary::default();
    info!(
        "running {} to t = {} at Co = {}",
        scheme.name, controls.end_time, controls.courant
    );
    let time_tolerance = 1e-12 * controls.end_time.abs().max(1.0);
    while controls.end_time - summary.time > time_tolerance {
        let mut delta_t = system
            .stable_delta_t(controls.courant)
            .min(controls.max_delta_t)
            .min(controls.end_time - summary.time);
        let mut retries = 0;
        loop {
            match integrate_step(system, scheme, delta_t) {
                Ok(()) => break,
                Err(err) if err.is_recoverable() && retries < controls.max_retries => {
                    retries += 1;
                    summary.rejected += 1;
                    delta_t *= 0.5;
                    warn!("step rejected ({}), retrying with dt = {:e}", err, delta_t);
                }
                Err(err) => return Err(err),
            }
        }
        summary.time += delta_t;
        summary.steps += 1;
        debug!("step {}: t = {:e}, dt = {:e}", summary.steps, summary.time, delta_t);
        observer(system, summary.time);
    }
    info!(
        "reached t = {:e} in {} steps ({} rejected)",
        summary.time, summary.steps, summary.rejected
    );
    Ok(summary)
}
