//! # pcoll
//!
//! Finds byte-identical and perceptually-similar images across one or
//! more directory trees.
//!
//! ## Architecture
//! - `core` - content/perceptual hashing, the task queue, the
//!   fingerprint database, the intake walk, and the similarity engine
//! - `error` - the `thiserror`-derived error hierarchy
//! - `cli` - argument parsing and result rendering for the `pcoll` binary

pub mod cli;
pub mod core;
pub mod error;

pub use error::{PcollError, Result};
