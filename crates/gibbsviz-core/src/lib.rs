//! # gibbsviz Core Library
//!
//! A library for computing Gibbs free-energy surfaces of binary alloy systems
//! from CALPHAD thermodynamic databases (TDB files).
//!
//! ## Architectural Philosophy
//!
//! The library is organized in three layers with a strict separation of concerns:
//!
//! - **[`core`]: The Foundation.** Contains the TDB parser (`tdb`), the symbolic
//!   temperature-expression machinery (`expr`), the per-phase Gibbs energy model
//!   (`model`), and data export utilities (`io`). Everything here is stateless.
//!
//! - **[`engine`]: The Logic Core.** Holds the surface-computation configuration,
//!   the composition/temperature sampling grids, surface evaluation over those
//!   grids, and progress reporting.
//!
//! - **[`workflows`]: The Public API.** Ties `core` and `engine` together into
//!   complete procedures, such as computing the full set of free-energy surfaces
//!   for a configured list of phases.

pub mod core;
pub mod engine;
pub mod workflows;
