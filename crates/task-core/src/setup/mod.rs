//! Colony Setup
//!
//! Settlement creation and worker spawning for the simulation binary and the
//! integration tests.

pub mod colony;

pub use colony::*;
