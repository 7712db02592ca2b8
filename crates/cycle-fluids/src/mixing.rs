//! Enthalpy-balance mixing of two gas streams (e.g. hot gas path with
//! cooling-air bleed return).

use cycle_core::Real;

use crate::work_fluid::WorkFluid;

/// Outer-loop iteration cap, shared with the convention used by the network solver.
const MAX_ITER: usize = 50;

/// Relative-residual precision for the mixed temperature, matching the
/// textbook mixing routine this is derived from.
const PRECISION: Real = 1e-3;

/// Solve for the adiabatic mixing temperature of two streams by Picard
/// iteration on `T_mix = (cp_hot*T_hot*g_hot + cp_cold*T_cold*g_cold) / (c_p_av(T_mix) * (g_hot + g_cold))`.
///
/// `cp_hot_true` and `cp_cold_true` are the *true* (instantaneous) specific
/// heats of the two inlet streams at their own temperatures; `mixture_fluid`
/// and `alpha_mixture` describe the combined stream whose *mean* c_p (relative
/// to [`crate::work_fluid::T_REF`]) is evaluated at the current temperature
/// guess each iteration, matching the enthalpy-balance convention used
/// throughout the cycle.
pub fn mix_temperature(
    mixture_fluid: WorkFluid,
    alpha_mixture: Real,
    cp_hot_true: Real,
    t_hot: Real,
    g_hot: Real,
    cp_cold_true: Real,
    t_cold: Real,
    g_cold: Real,
) -> Real {
    let numerator = cp_hot_true * t_hot * g_hot + cp_cold_true * t_cold * g_cold;
    let denom_g = g_hot + g_cold;

    let mut t = t_hot;
    for iter in 0..MAX_ITER {
        let cp_mix = mixture_fluid.c_p_av(t, alpha_mixture);
        let t_new = numerator / (cp_mix * denom_g);
        let res = (t_new - t).abs() / t;
        t = t_new;
        tracing::trace!(iter, t, res, "mixing iteration");
        if res < PRECISION {
            break;
        }
    }
    t
}
