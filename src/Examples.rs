//! # Examples
//!
//! Runnable demonstrations of the solver, selected by task number from `main`:
//! - 0: Sod's shock tube with every flux scheme, compared by their peak pressure
//! - 1: water/air two-phase shock tube
//! - 2: one-step A => B reaction heating a closed box
pub mod shock_tube_examples;
