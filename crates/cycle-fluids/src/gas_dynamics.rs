//! Compressible gas-dynamic functions of reduced velocity.
//!
//! These relate stagnation to static flow parameters via the reduced
//! velocity `lambda = c / a_cr`, where `a_cr` is the critical (sonic)
//! speed of sound at the local stagnation temperature.

use cycle_core::Real;

/// Critical speed of sound at stagnation temperature `t_stag`.
pub fn a_cr(t_stag: Real, k: Real, r: Real) -> Real {
    (2.0 * k * r * t_stag / (k + 1.0)).sqrt()
}

/// Temperature function of reduced velocity: `T / T_stag`.
pub fn tau_lam(lam: Real, k: Real) -> Real {
    1.0 - (k - 1.0) / (k + 1.0) * lam * lam
}

/// Pressure function of reduced velocity: `p / p_stag`.
pub fn pi_lam(lam: Real, k: Real) -> Real {
    tau_lam(lam, k).powf(k / (k - 1.0))
}

/// Density function of reduced velocity: `rho / rho_stag`.
pub fn eps_lam(lam: Real, k: Real) -> Real {
    tau_lam(lam, k).powf(1.0 / (k - 1.0))
}

/// Invert `tau_lam` to recover the reduced velocity from a temperature ratio.
pub fn lam_from_tau(tau: Real, k: Real) -> Real {
    ((1.0 - tau) * (k + 1.0) / (k - 1.0)).sqrt()
}

/// Invert `pi_lam` to recover the reduced velocity from a pressure ratio.
pub fn lam_from_pi(pi: Real, k: Real) -> Real {
    ((k + 1.0) / (k - 1.0) * (1.0 - pi.powf((k - 1.0) / k))).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tau_and_pi_agree_at_zero_velocity() {
        assert!((tau_lam(0.0, 1.33) - 1.0).abs() < 1e-12);
        assert!((pi_lam(0.0, 1.33) - 1.0).abs() < 1e-12);
        assert!((eps_lam(0.0, 1.33) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn lam_from_tau_round_trips() {
        let k = 1.33;
        let lam = 0.45;
        let tau = tau_lam(lam, k);
        let recovered = lam_from_tau(tau, k);
        assert!((lam - recovered).abs() < 1e-9);
    }

    #[test]
    fn lam_from_pi_round_trips() {
        let k = 1.4;
        let lam = 0.3;
        let pi = pi_lam(lam, k);
        let recovered = lam_from_pi(pi, k);
        assert!((lam - recovered).abs() < 1e-9);
    }

    #[test]
    fn a_cr_scales_with_sqrt_temperature() {
        let a1 = a_cr(300.0, 1.4, 287.4);
        let a2 = a_cr(1200.0, 1.4, 287.4);
        assert!((a2 / a1 - 2.0).abs() < 1e-6);
    }
}
