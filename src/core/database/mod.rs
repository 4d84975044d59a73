//! The fingerprint database: every intake path, keyed by content hash,
//! with at most one perceptual hash computed per distinct content.
//!
//! Three independent `RwLock`s reduce contention between the intake
//! workers (writers) and anything reading a stable snapshot later: the
//! content-hash index (paths grouped by byte-identical content), the
//! perceptual-hash index (one dHash per distinct content), and the
//! insertion-ordered path list.

use crate::core::hash::{content_hash, perceptual_hash, ContentHash, PerceptualHash};
use crate::error::{DatabaseError, HashError};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

#[derive(Default)]
struct ChashIndex {
    chash_to_paths: HashMap<ContentHash, HashSet<PathBuf>>,
    path_to_chash: HashMap<PathBuf, ContentHash>,
}

#[derive(Default)]
pub struct FingerprintDatabase {
    chash_index: RwLock<ChashIndex>,
    dhash_index: RwLock<HashMap<ContentHash, PerceptualHash>>,
    path_list: RwLock<Vec<PathBuf>>,
}

impl FingerprintDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash `path`'s content, merge it into the content-hash index, and
    /// compute its perceptual hash the first time this content is seen.
    pub fn insert(&self, path: &Path) -> Result<(), HashError> {
        let chash = content_hash(path)?;

        let is_new_content = {
            let mut index = self.chash_index.write().unwrap();
            let is_new = !index.chash_to_paths.contains_key(&chash);
            index
                .chash_to_paths
                .entry(chash)
                .or_default()
                .insert(path.to_path_buf());
            index.path_to_chash.insert(path.to_path_buf(), chash);
            is_new
        };

        if is_new_content {
            // A file that fails to decode as an image simply has no
            // perceptual hash; that is not an error condition here.
            if let Ok(dhash) = perceptual_hash(path) {
                self.dhash_index.write().unwrap().insert(chash, dhash);
            }
        }

        self.path_list.write().unwrap().push(path.to_path_buf());
        Ok(())
    }

    /// Total number of `insert` calls that succeeded (including repeats
    /// of already-seen content). A pure read: there is no counter to
    /// accidentally bump on lookup.
    pub fn size(&self) -> usize {
        self.path_list.read().unwrap().len()
    }

    /// All inserted paths, in insertion order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.path_list.read().unwrap().clone()
    }

    pub fn content_hash_of(&self, path: &Path) -> Result<ContentHash, DatabaseError> {
        self.chash_index
            .read()
            .unwrap()
            .path_to_chash
            .get(path)
            .copied()
            .ok_or_else(|| DatabaseError::MissingContentHash {
                path: path.to_path_buf(),
            })
    }

    pub fn paths_for_content_hash(&self, chash: ContentHash) -> Result<HashSet<PathBuf>, DatabaseError> {
        let paths = self
            .chash_index
            .read()
            .unwrap()
            .chash_to_paths
            .get(&chash)
            .cloned()
            .unwrap_or_default();
        if paths.is_empty() {
            return Err(DatabaseError::EmptyPathSet);
        }
        Ok(paths)
    }

    /// Every distinct content hash that has a perceptual hash, paired
    /// with that hash. Order is unspecified (backed by a `HashMap`).
    pub fn perceptually_hashed_contents(&self) -> Vec<(ContentHash, PerceptualHash)> {
        self.dhash_index
            .read()
            .unwrap()
            .iter()
            .map(|(chash, dhash)| (*chash, *dhash))
            .collect()
    }

    /// Drop all indexes. Acquires every write lock together so no reader
    /// ever observes a partially-cleared database.
    pub fn reset(&self) {
        let mut chash_index = self.chash_index.write().unwrap();
        let mut dhash_index = self.dhash_index.write().unwrap();
        let mut path_list = self.path_list.write().unwrap();

        chash_index.chash_to_paths.clear();
        chash_index.path_to_chash.clear();
        dhash_index.clear();
        path_list.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn png_fixture(dir: &TempDir, name: &str, color: [u8; 3]) -> PathBuf {
        let path = dir.path().join(name);
        let image = image::DynamicImage::ImageRgb8(image::ImageBuffer::from_fn(16, 16, |_, _| {
            image::Rgb(color)
        }));
        image.save(&path).unwrap();
        path
    }

    #[test]
    fn size_is_zero_for_a_fresh_database() {
        let db = FingerprintDatabase::new();
        assert_eq!(db.size(), 0);
    }

    #[test]
    fn inserting_distinct_files_increments_size() {
        let dir = TempDir::new().unwrap();
        let a = png_fixture(&dir, "a.png", [10, 20, 30]);
        let b = png_fixture(&dir, "b.png", [200, 150, 100]);

        let db = FingerprintDatabase::new();
        db.insert(&a).unwrap();
        db.insert(&b).unwrap();

        assert_eq!(db.size(), 2);
    }

    #[test]
    fn byte_identical_files_share_a_content_hash() {
        let dir = TempDir::new().unwrap();
        let a = png_fixture(&dir, "a.png", [1, 2, 3]);
        let b_path = dir.path().join("b.png");
        std::fs::copy(&a, &b_path).unwrap();

        let db = FingerprintDatabase::new();
        db.insert(&a).unwrap();
        db.insert(&b_path).unwrap();

        let chash = db.content_hash_of(&a).unwrap();
        let paths = db.paths_for_content_hash(chash).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths.contains(&a));
        assert!(paths.contains(&b_path));
    }

    #[test]
    fn perceptual_hash_is_computed_once_per_distinct_content() {
        let dir = TempDir::new().unwrap();
        let a = png_fixture(&dir, "a.png", [5, 6, 7]);
        let copy_path = dir.path().join("copy.png");
        std::fs::copy(&a, &copy_path).unwrap();

        let db = FingerprintDatabase::new();
        db.insert(&a).unwrap();
        db.insert(&copy_path).unwrap();

        // Both paths share one content hash, so there is exactly one
        // entry in the perceptual-hash index, not two.
        assert_eq!(db.perceptually_hashed_contents().len(), 1);
    }

    #[test]
    fn non_image_file_has_no_perceptual_hash_but_still_counts_toward_size() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"not an image").unwrap();

        let db = FingerprintDatabase::new();
        db.insert(file.path()).unwrap();

        assert_eq!(db.size(), 1);
        assert_eq!(db.perceptually_hashed_contents().len(), 0);
    }

    #[test]
    fn paths_preserves_insertion_order() {
        let dir = TempDir::new().unwrap();
        let a = png_fixture(&dir, "a.png", [1, 1, 1]);
        let b = png_fixture(&dir, "b.png", [2, 2, 2]);
        let c = png_fixture(&dir, "c.png", [3, 3, 3]);

        let db = FingerprintDatabase::new();
        db.insert(&a).unwrap();
        db.insert(&b).unwrap();
        db.insert(&c).unwrap();

        assert_eq!(db.paths(), vec![a, b, c]);
    }

    #[test]
    fn reset_clears_every_index() {
        let dir = TempDir::new().unwrap();
        let a = png_fixture(&dir, "a.png", [9, 9, 9]);

        let db = FingerprintDatabase::new();
        db.insert(&a).unwrap();
        db.reset();

        assert_eq!(db.size(), 0);
        assert_eq!(db.perceptually_hashed_contents().len(), 0);
        assert!(matches!(
            db.content_hash_of(&a),
            Err(DatabaseError::MissingContentHash { .. })
        ));
    }

    #[test]
    fn content_hash_of_unknown_path_is_an_invariant_error() {
        let db = FingerprintDatabase::new();
        let result = db.content_hash_of(Path::new("/never/inserted.png"));
        assert!(matches!(result, Err(DatabaseError::MissingContentHash { .. })));
    }
}
