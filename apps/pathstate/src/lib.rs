//! # pathstate
//!
//! Library half of the pathstate binary: the CLI surface and the scenario
//! runner, exposed for integration tests.

pub mod cli;
pub mod scenario;
