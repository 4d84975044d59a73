//! Content and perceptual hashing.

mod content;
mod perceptual;

pub use content::{content_hash, ContentHash};
pub use perceptual::{hash_image, perceptual_hash, PerceptualHash};
