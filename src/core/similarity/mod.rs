//! The similarity engine.
//!
//! Phase 1 runs every pair of distinct, perceptually-hashed contents
//! through a task-queue pipeline and records the ones that clear the
//! threshold. Phase 2 turns that collision map, plus the database's
//! exact-duplicate groups, into one sorted cluster per intake path.

use crate::core::database::FingerprintDatabase;
use crate::core::hash::ContentHash;
use crate::core::queue::TaskQueue;
use crate::error::DatabaseError;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

const IDLE_SLEEP: Duration = Duration::from_millis(10);

/// One path that resembles (or duplicates) a cluster's representative.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub path: PathBuf,
    pub similarity: f64,
}

/// A representative path plus every other path found similar to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub representative: PathBuf,
    pub neighbors: Vec<Neighbor>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Results {
    pub clusters: Vec<Cluster>,
}

impl Results {
    /// Total neighbor entries across every cluster — the `<F>` in
    /// "Total similar files found: <F>".
    pub fn total_similar_files(&self) -> usize {
        self.clusters.iter().map(|c| c.neighbors.len()).sum()
    }
}

type CollisionMap = HashMap<ContentHash, HashMap<ContentHash, f64>>;

fn pairwise_collisions(
    contents: &[(ContentHash, crate::core::hash::PerceptualHash)],
    threshold: f64,
    threads: usize,
) -> CollisionMap {
    let outer_queue: TaskQueue<usize> = TaskQueue::new();
    let compare_queue: TaskQueue<(usize, usize)> = TaskQueue::new();
    let collisions: Mutex<CollisionMap> = Mutex::new(HashMap::new());

    for i in 0..contents.len() {
        outer_queue.insert(i);
    }

    let worker_count = threads.max(1);

    thread::scope(|scope| {
        for _ in 0..worker_count {
            scope.spawn(|| loop {
                let did_outer = if let Some(i) = outer_queue.poll() {
                    for j in (i + 1)..contents.len() {
                        compare_queue.insert((i, j));
                    }
                    outer_queue.decrement_outstanding();
                    true
                } else {
                    false
                };

                let did_compare = if let Some((i, j)) = compare_queue.poll() {
                    let (chash_i, dhash_i) = contents[i];
                    let (chash_j, dhash_j) = contents[j];
                    let similarity = dhash_i.similarity(&dhash_j);

                    if similarity >= threshold {
                        let mut map = collisions.lock().unwrap();
                        map.entry(chash_i).or_default().insert(chash_j, similarity);
                        map.entry(chash_j).or_default().insert(chash_i, similarity);
                    }
                    compare_queue.decrement_outstanding();
                    true
                } else {
                    false
                };

                if outer_queue.outstanding() == 0 && compare_queue.outstanding() == 0 {
                    break;
                }
                if !did_outer && !did_compare {
                    thread::sleep(IDLE_SLEEP);
                }
            });
        }
    });

    collisions.into_inner().unwrap()
}

/// Run the full two-phase similarity scan over everything in `database`.
pub fn compile_results(
    database: &FingerprintDatabase,
    threshold: f64,
    threads: usize,
) -> Result<Results, DatabaseError> {
    let contents = database.perceptually_hashed_contents();
    let collisions = pairwise_collisions(&contents, threshold, threads);

    let mut clusters = Vec::new();

    for path in database.paths() {
        let chash = database.content_hash_of(&path)?;
        let mut neighbors = Vec::new();

        for sibling in database.paths_for_content_hash(chash)? {
            if sibling != path {
                neighbors.push(Neighbor {
                    path: sibling,
                    similarity: 1.0,
                });
            }
        }

        if let Some(matches) = collisions.get(&chash) {
            for (&other_chash, &raw_similarity) in matches {
                let byte_identical = other_chash == chash;
                let similarity = if raw_similarity >= 1.0 && !byte_identical {
                    0.99
                } else {
                    raw_similarity
                };
                for sibling in database.paths_for_content_hash(other_chash)? {
                    neighbors.push(Neighbor {
                        path: sibling,
                        similarity,
                    });
                }
            }
        }

        if neighbors.is_empty() {
            continue;
        }

        neighbors.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap()
                .then_with(|| a.path.cmp(&b.path))
        });

        clusters.push(Cluster {
            representative: path,
            neighbors,
        });
    }

    clusters.sort_by(|a, b| {
        b.neighbors
            .len()
            .cmp(&a.neighbors.len())
            .then_with(|| a.representative.cmp(&b.representative))
    });

    Ok(Results { clusters })
}
