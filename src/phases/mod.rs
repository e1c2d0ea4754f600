//! Implementation of the phases of a cpm run.
//!
//! ## Overview
//!
//! A run is made of two passes over the package graph:
//! 1. Fetching - clone or update every reachable package, populate the
//!    registry and compose each package's `include` namespace
//! 2. Building - build packages dependencies-first, detecting cycles
//!
//! The [`orchestrator`] resolves the root package and sequences the passes.
//! Namespace composition lives in [`namespace`] and is driven by the fetch
//! phase.

pub mod build;
pub mod fetch;
pub mod namespace;
pub mod orchestrator;

pub use build as phase2;
pub use fetch as phase1;
