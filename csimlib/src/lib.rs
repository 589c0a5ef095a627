//! # CsimLib
//!
//! CsimLib is a library for simulating the behaviour of a set-associative cache
//!
//! It replays memory traces in the valgrind lackey format against a cache of 2^s sets, E lines
//! per set and 2^b byte blocks, counting hits, misses and evictions. Line contents are never
//! modelled, only which blocks are resident
//!
//! Replacement is least recently used, behind a trait so other policies can be plugged in

/// Contains the cache model, its lines, and the classification of a single access
pub mod cache;

/// Contains the cache shape, which can be built from the command line or parsed from JSON
pub mod config;

/// Contains the error type for a simulation run
pub mod error;

/// Contains helpers for opening trace files
pub mod io;

/// Contains the replacement policies, with a trait for implementing custom replacement
/// policies
pub mod replacement_policies;

/// Contains the simulator used to replay a trace against a cache
pub mod simulator;

/// Contains the trace line parser
pub mod trace;

#[cfg(test)]
mod test;

/// Contains utilities for running tests and benchmarks.
pub mod util;
