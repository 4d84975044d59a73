//! # Core Module
//!
//! The duplicate/near-duplicate image detection engine.
//!
//! ## Modules
//! - `hash` - Content (SHA-256) and perceptual (dHash) hashing
//! - `queue` - Task queue with an outstanding-task counter
//! - `database` - The fingerprint index built during intake
//! - `intake` - Directory walk + file hashing pipeline
//! - `similarity` - Pairwise comparison and cluster materialization
//! - `console` - Synchronized progress/error output

pub mod console;
pub mod database;
pub mod hash;
pub mod intake;
pub mod queue;
pub mod similarity;

pub use database::FingerprintDatabase;
pub use hash::{content_hash, perceptual_hash, ContentHash, PerceptualHash};
pub use similarity::{compile_results, Cluster, Neighbor, Results};
