//! Directory walk + content intake.
//!
//! Two queues, one pipeline: `path_queue` holds directories and files
//! still to be classified, `file_queue` holds files ready to be hashed.
//! A directory's own queue slot is decremented only after all of its
//! immediate children have been enqueued — the outstanding count, not
//! queue length, is what tells the driver the walk is finished.

use crate::core::console::ProgressSink;
use crate::core::database::FingerprintDatabase;
use crate::core::queue::TaskQueue;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

const IDLE_SLEEP: Duration = Duration::from_millis(10);

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

/// Strip trailing `/` or `\` and make the path absolute, matching the
/// exclude-set's string-equality comparison.
pub fn normalize_root(path: &Path) -> PathBuf {
    let trimmed = path
        .to_string_lossy()
        .trim_end_matches(['/', '\\'])
        .to_string();
    absolutize(Path::new(&trimmed))
}

fn try_process_path(
    path_queue: &TaskQueue<PathBuf>,
    file_queue: &TaskQueue<PathBuf>,
    excludes: &HashSet<PathBuf>,
    console: &dyn ProgressSink,
) -> bool {
    let Some(path) = path_queue.poll() else {
        return false;
    };

    if excludes.contains(&path) {
        path_queue.decrement_outstanding();
        return true;
    }

    let is_symlink = std::fs::symlink_metadata(&path)
        .map(|meta| meta.file_type().is_symlink())
        .unwrap_or(false);

    match std::fs::metadata(&path) {
        Ok(meta) if meta.is_dir() => match std::fs::read_dir(&path) {
            Ok(entries) => {
                for entry in entries.flatten() {
                    let child = absolutize(&entry.path());
                    if excludes.contains(&child) {
                        continue;
                    }
                    path_queue.insert(child);
                }
            }
            Err(error) => {
                console.warn(&format!("{}: {error}", path.display()));
            }
        },
        Ok(meta) if meta.is_file() && !is_symlink => {
            file_queue.insert(path);
        }
        Ok(_) => {
            // A symlink to a file, or some other non-regular entry.
            console.warn(&format!("{}: skipped (not a regular file)", path.display()));
        }
        Err(error) => {
            console.warn(&format!("{}: {error}", path.display()));
        }
    }

    path_queue.decrement_outstanding();
    true
}

fn try_process_file(
    file_queue: &TaskQueue<PathBuf>,
    database: &FingerprintDatabase,
    console: &dyn ProgressSink,
) -> bool {
    let Some(path) = file_queue.poll() else {
        return false;
    };

    if let Err(error) = database.insert(&path) {
        console.warn(&format!("{}: {error}", path.display()));
    } else {
        console.tick(&format!("{} files scanned", database.size()));
    }

    file_queue.decrement_outstanding();
    true
}

/// Walk `roots`, skipping `excludes`, hashing every regular file found
/// into `database`. Blocks until the walk and all hashing is complete.
pub fn run_intake(
    database: &FingerprintDatabase,
    console: &dyn ProgressSink,
    roots: &[PathBuf],
    excludes: &HashSet<PathBuf>,
    threads: usize,
) {
    let path_queue = TaskQueue::new();
    let file_queue = TaskQueue::new();

    for root in roots {
        path_queue.insert(root.clone());
    }

    let worker_count = threads.max(1);

    thread::scope(|scope| {
        for _ in 0..worker_count {
            scope.spawn(|| loop {
                let processed_path = try_process_path(&path_queue, &file_queue, excludes, console);
                let processed_file = try_process_file(&file_queue, database, console);

                if path_queue.outstanding() == 0 && file_queue.outstanding() == 0 {
                    break;
                }
                if !processed_path && !processed_file {
                    thread::sleep(IDLE_SLEEP);
                }
            });
        }
    });
}
