/*
 * DSE Engine - Constraint Solving & Path Exploration
 *
 * Feature-First Hexagonal Architecture:
 * - config/      : Presets, stage overrides, YAML v1 schema
 * - features/    : Vertical slices (symbolic → solver → local_search → exploration)
 * - errors       : Crate-wide error taxonomy
 *
 * Data flow:
 *   path condition → Driver → reduced constraints → SMT process | AVM → model → patched input
 */

// Crate-level lint configuration
#![allow(clippy::too_many_arguments)] // Search routines thread many knobs
#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::module_inception)] // Module naming intentional
#![allow(clippy::upper_case_acronyms)] // AVM, NFA naming

pub mod config;
pub mod errors;
pub mod features;

pub use errors::{DseError, ErrorCategory, Result};
