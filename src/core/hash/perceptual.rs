//! Difference hash (dHash): a 64-bit perceptual fingerprint.
//!
//! Unlike the `image` crate's built-in grayscale conversion (ITU-R 601
//! weights), this hash uses BT.709 luma coefficients directly on the
//! resampled RGB samples, and traverses the 8x8 grid in boustrophedon
//! order (row 0 left-to-right, row 1 right-to-left, ...) rather than
//! row-major order. Bit `i` of the result is the i-th comparison made
//! during that traversal: bit 0 is the first, bit 63 the last.

use crate::error::HashError;
use image::imageops::FilterType;
use std::path::Path;

/// Width/height of the luminance grid the hash is computed over.
const DIM: u32 = 8;

/// A 64-bit perceptual fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PerceptualHash(u64);

impl PerceptualHash {
    pub fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub fn bits(&self) -> u64 {
        self.0
    }

    /// Hamming distance to another hash.
    pub fn distance(&self, other: &Self) -> u32 {
        (self.0 ^ other.0).count_ones()
    }

    /// Similarity in [0, 1]: `1 - popcount(a XOR b) / 64`.
    pub fn similarity(&self, other: &Self) -> f64 {
        1.0 - (self.distance(other) as f64 / (DIM * DIM) as f64)
    }
}

/// BT.709 luma of an 8-bit RGB triple.
/// https://en.wikipedia.org/wiki/Rec._709#Luma_coefficients
fn luminance(pixel: image::Rgb<u8>) -> f64 {
    0.2126 * pixel[0] as f64 + 0.7152 * pixel[1] as f64 + 0.0722 * pixel[2] as f64
}

/// Compute the difference hash of a decodable image file.
pub fn perceptual_hash(path: &Path) -> Result<PerceptualHash, HashError> {
    let image = image::open(path).map_err(|e| HashError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(hash_image(&image))
}

/// Compute the difference hash of an already-decoded image.
pub fn hash_image(image: &image::DynamicImage) -> PerceptualHash {
    let resized = image.resize_exact(DIM, DIM, FilterType::Nearest);
    let rgb = resized.to_rgb8();

    let mut bits: u64 = 0;
    let mut previous = luminance(*rgb.get_pixel(DIM - 1, DIM - 1));

    let mut index = 0u32;
    for y in 0..DIM {
        let xs: Box<dyn Iterator<Item = u32>> = if y % 2 == 0 {
            Box::new(0..DIM)
        } else {
            Box::new((0..DIM).rev())
        };
        for x in xs {
            let current = luminance(*rgb.get_pixel(x, y));
            if previous >= current {
                bits |= 1u64 << index;
            }
            previous = current;
            index += 1;
        }
    }

    PerceptualHash(bits)
}
