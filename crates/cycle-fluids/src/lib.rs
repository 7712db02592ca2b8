//! cycle-fluids: ideal-gas working-fluid models for the thermodynamic cycle.
//!
//! Provides:
//! - The [`WorkFluid`] species (ambient air, kerosene combustion products,
//!   natural-gas combustion products) with piecewise and bilinearly
//!   interpolated c_p(T, alpha) correlations.
//! - Compressible gas-dynamic functions of reduced velocity (`a_cr`,
//!   `tau_lam`, `pi_lam`, `eps_lam`) used by the inlet/outlet/nozzle units.
//! - An enthalpy-balance mixing routine for combining two gas streams.
//!
//! # Example
//!
//! ```
//! use cycle_fluids::WorkFluid;
//!
//! let air = WorkFluid::AmbientAir;
//! let cp = air.c_p(400.0, 1.0);
//! let k = air.k(400.0, 1.0);
//! assert!(cp > 0.0 && k > 1.0);
//! ```

pub mod error;
pub mod gas_dynamics;
pub mod mixing;
pub mod work_fluid;

pub use error::{FluidError, FluidResult};
pub use mixing::mix_temperature;
pub use work_fluid::{WorkFluid, T_REF};
