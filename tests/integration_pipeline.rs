//! End-to-end exercise of intake -> database -> similarity, without the
//! CLI layer: build a small directory tree, run the pipeline, and check
//! the shape of the resulting clusters.

use pcoll::core::console::NullSink;
use pcoll::core::database::FingerprintDatabase;
use pcoll::core::intake::{normalize_root, run_intake};
use pcoll::core::similarity::compile_results;
use std::collections::HashSet;
use tempfile::TempDir;

fn write_png(path: &std::path::Path, color: [u8; 3]) {
    let image = image::DynamicImage::ImageRgb8(image::ImageBuffer::from_fn(16, 16, |_, _| {
        image::Rgb(color)
    }));
    image.save(path).unwrap();
}

// A solid fill hashes to `u64::MAX` regardless of color (every boustrophedon
// comparison is between equal pixels), so a second solid fixture always
// collides with it perceptually. Use a gradient for fixtures that must hash
// away from that value.
fn write_gradient_png(path: &std::path::Path) {
    let image = image::DynamicImage::ImageRgb8(image::ImageBuffer::from_fn(16, 16, |x, _| {
        let v = (x * 255 / 15) as u8;
        image::Rgb([v, v, v])
    }));
    image.save(path).unwrap();
}

#[test]
fn finds_a_byte_identical_duplicate_across_subdirectories() {
    let dir = TempDir::new().unwrap();
    let vacation = dir.path().join("vacation");
    let backup = dir.path().join("backup");
    std::fs::create_dir(&vacation).unwrap();
    std::fs::create_dir(&backup).unwrap();

    let original = vacation.join("beach.png");
    write_png(&original, [30, 60, 90]);
    std::fs::copy(&original, backup.join("beach_copy.png")).unwrap();

    // An unrelated file that should not end up in any cluster. A gradient,
    // not a solid fill, since solid fills all hash to the same dHash and
    // would perceptually collide with the (also solid) beach photo.
    write_gradient_png(&dir.path().join("unrelated.png"));

    let database = FingerprintDatabase::new();
    let console = NullSink;
    let roots = vec![normalize_root(dir.path())];

    run_intake(&database, &console, &roots, &HashSet::new(), 4);
    assert_eq!(database.size(), 3);

    let results = compile_results(&database, 0.9, 4).unwrap();

    assert_eq!(results.clusters.len(), 2);
    assert_eq!(results.total_similar_files(), 2);
    for cluster in &results.clusters {
        assert_eq!(cluster.neighbors[0].similarity, 1.0);
    }
}

#[test]
fn excluded_subdirectory_never_reaches_the_database() {
    let dir = TempDir::new().unwrap();
    let kept = dir.path().join("kept");
    let excluded = dir.path().join("excluded");
    std::fs::create_dir(&kept).unwrap();
    std::fs::create_dir(&excluded).unwrap();

    write_png(&kept.join("photo.png"), [5, 5, 5]);
    write_png(&excluded.join("photo.png"), [5, 5, 5]);

    let database = FingerprintDatabase::new();
    let console = NullSink;
    let roots = vec![normalize_root(dir.path())];
    let mut excludes = HashSet::new();
    excludes.insert(normalize_root(&excluded));

    run_intake(&database, &console, &roots, &excludes, 2);

    assert_eq!(database.size(), 1);
    let results = compile_results(&database, 0.9, 2).unwrap();
    assert!(results.clusters.is_empty());
}

#[test]
fn high_threshold_suppresses_near_duplicate_clusters() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a.png");
    let b = dir.path().join("b.png");

    let image_a = image::DynamicImage::ImageRgb8(image::ImageBuffer::from_fn(16, 16, |x, _| {
        let v = (x * 16) as u8;
        image::Rgb([v, v, v])
    }));
    let image_b = image::DynamicImage::ImageRgb8(image::ImageBuffer::from_fn(16, 16, |x, _| {
        let v = 255 - (x * 16) as u8;
        image::Rgb([v, v, v])
    }));
    image_a.save(&a).unwrap();
    image_b.save(&b).unwrap();

    let database = FingerprintDatabase::new();
    let console = NullSink;
    let roots = vec![normalize_root(dir.path())];

    run_intake(&database, &console, &roots, &HashSet::new(), 2);

    let results = compile_results(&database, 0.999, 2).unwrap();
    assert!(results.clusters.is_empty());
}

#[test]
fn empty_directory_tree_produces_no_clusters() {
    let dir = TempDir::new().unwrap();
    let database = FingerprintDatabase::new();
    let console = NullSink;
    let roots = vec![normalize_root(dir.path())];

    run_intake(&database, &console, &roots, &HashSet::new(), 1);

    assert_eq!(database.size(), 0);
    let results = compile_results(&database, 0.9, 1).unwrap();
    assert!(results.clusters.is_empty());
}
