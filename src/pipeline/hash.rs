//! Perceptual hashing of rendered pages.
//!
//! Pages are hashed with a difference (gradient) hash: the grayscale render
//! is downscaled to the configured resize target, then `image_hasher` shrinks
//! it again to `(size + 1) × size` and records whether each pixel is brighter
//! than its right-hand neighbour. Visually similar pages differ in few bits.

use crate::config::CleanConfig;
use image::imageops::FilterType;
use image::DynamicImage;
use image_hasher::{HashAlg, Hasher, HasherConfig};
use std::fmt;

/// A fixed-length bit signature of a page image.
///
/// Only pairwise [`distance`](Self::distance) is meaningful. Two hashes are
/// comparable when they have the same number of bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PerceptualHash {
    bytes: Vec<u8>,
    len: u32,
}

impl PerceptualHash {
    /// Wrap raw hash bytes computed on a `len × len` bit matrix.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>, len: u32) -> Self {
        Self {
            bytes: bytes.into(),
            len,
        }
    }

    /// Edge length of the square bit matrix the hash was computed on.
    ///
    /// An 8×8 hash has `len() == 8` and carries `len()² == 64` bits.
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of differing bits, or `None` for hashes of different lengths.
    pub fn distance(&self, other: &PerceptualHash) -> Option<u32> {
        if self.bytes.len() != other.bytes.len() {
            return None;
        }
        Some(
            self.bytes
                .iter()
                .zip(other.bytes.iter())
                .map(|(a, b)| (a ^ b).count_ones())
                .sum(),
        )
    }
}

impl fmt::Display for PerceptualHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.bytes {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

/// Turns rendered page images into [`PerceptualHash`]es.
pub struct PageHasher {
    hasher: Hasher,
    size: u32,
    resize_to: (u32, u32),
}

impl PageHasher {
    pub fn new(hash_size: u32, resize_to: (u32, u32)) -> Self {
        let hasher = HasherConfig::new()
            .hash_alg(HashAlg::Gradient)
            .hash_size(hash_size, hash_size)
            .to_hasher();
        Self {
            hasher,
            size: hash_size,
            resize_to,
        }
    }

    pub fn from_config(config: &CleanConfig) -> Self {
        Self::new(config.hash_size, config.resize_to)
    }

    /// Convert to grayscale, downscale to the resize target, and hash.
    pub fn hash_page(&self, page: &DynamicImage) -> PerceptualHash {
        let gray = DynamicImage::ImageLuma8(page.to_luma8());
        let (w, h) = self.resize_to;
        let small = gray.resize_exact(w, h, FilterType::CatmullRom);
        let hash = self.hasher.hash_image(&small);
        PerceptualHash::from_bytes(hash.as_bytes(), self.size)
    }
}

impl fmt::Debug for PageHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageHasher")
            .field("size", &self.size)
            .field("resize_to", &self.resize_to)
            .finish()
    }
}
