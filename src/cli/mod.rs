//! Command-line interface: argument parsing, validation, and result
//! rendering for the `pcoll` binary.

use crate::core::console::{NullSink, ProgressSink, TermSink};
use crate::core::database::FingerprintDatabase;
use crate::core::intake::{normalize_root, run_intake};
use crate::core::similarity::{compile_results, Results};
use crate::error::{PcollError, UsageError};
use clap::Parser;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::info_span;

const DEFAULT_THRESHOLD: f64 = 0.9;

#[derive(Parser, Debug)]
#[command(
    name = "pcoll",
    about = "Finds near-duplicate and identical images across directory trees"
)]
struct Args {
    /// Suppress progress and per-file errors.
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,

    /// Worker thread count. Defaults to the detected core count.
    #[arg(short = 't', long = "threads")]
    threads: Option<String>,

    /// Similarity threshold: an integer 0-100 or a float 0.0-1.0.
    #[arg(short = 'p', long = "percentage")]
    percentage: Option<String>,

    /// Search roots, followed optionally by `-n <dir> ...` to exclude.
    #[arg(required = true)]
    dirs: Vec<PathBuf>,

    /// Directories to exclude from the search.
    #[arg(short = 'n', num_args = 1..)]
    exclude: Vec<PathBuf>,
}

/// Validated, ready-to-run configuration.
struct Config {
    quiet: bool,
    threads: usize,
    threshold: f64,
    roots: Vec<PathBuf>,
    excludes: HashSet<PathBuf>,
}

fn parse_percentage(raw: &str) -> Result<f64, UsageError> {
    if let Ok(pct) = raw.parse::<u32>() {
        if pct <= 100 {
            return Ok(pct as f64 / 100.0);
        }
    }
    if let Ok(frac) = raw.parse::<f64>() {
        if (0.0..=1.0).contains(&frac) {
            return Ok(frac);
        }
    }
    Err(UsageError::InvalidPercentage {
        value: raw.to_string(),
    })
}

fn parse_threads(raw: &str) -> Result<usize, UsageError> {
    match raw.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(UsageError::InvalidThreadCount {
            value: raw.to_string(),
        }),
    }
}

fn default_thread_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn validate_directory(path: &std::path::Path) -> Result<PathBuf, UsageError> {
    if !path.exists() {
        return Err(UsageError::DirectoryNotFound {
            path: path.to_path_buf(),
        });
    }
    if !path.is_dir() {
        return Err(UsageError::NotADirectory {
            path: path.to_path_buf(),
        });
    }
    Ok(normalize_root(path))
}

fn validate(args: Args) -> Result<Config, UsageError> {
    if args.dirs.is_empty() {
        return Err(UsageError::NoDirectories);
    }

    let threshold = match &args.percentage {
        Some(raw) => parse_percentage(raw)?,
        None => DEFAULT_THRESHOLD,
    };

    let threads = match &args.threads {
        Some(raw) => parse_threads(raw)?,
        None => default_thread_count(),
    };

    let roots = args
        .dirs
        .iter()
        .map(|p| validate_directory(p))
        .collect::<Result<Vec<_>, _>>()?;

    let excludes = args
        .exclude
        .iter()
        .map(|p| validate_directory(p))
        .collect::<Result<HashSet<_>, _>>()?;

    Ok(Config {
        quiet: args.quiet,
        threads,
        threshold,
        roots,
        excludes,
    })
}

fn render(console: &dyn ProgressSink, results: &Results) {
    let total_clusters = results.clusters.len();

    for (index, cluster) in results.clusters.iter().enumerate() {
        let neighbor_count = cluster.neighbors.len();
        console.info(&format!(
            "{}/{} images: {} - {}",
            index + 1,
            total_clusters,
            neighbor_count,
            cluster.representative.display()
        ));
        for (n, neighbor) in cluster.neighbors.iter().enumerate() {
            // Truncated, not rounded, per the external format contract.
            let percent = (neighbor.similarity * 100.0) as u64;
            console.info(&format!(
                "    {}/{} {}% - {}",
                n + 1,
                neighbor_count,
                percent,
                neighbor.path.display()
            ));
        }
        console.info("");
    }

    console.info(&format!(
        "Total similar files found: {}",
        results.total_similar_files()
    ));
}

pub fn run() -> Result<(), PcollError> {
    let args = Args::parse();
    let config = validate(args)?;

    let console: Box<dyn ProgressSink> = if config.quiet {
        Box::new(NullSink)
    } else {
        Box::new(TermSink::new())
    };

    let database = FingerprintDatabase::new();

    info_span!("scan").in_scope(|| {
        run_intake(
            &database,
            console.as_ref(),
            &config.roots,
            &config.excludes,
            config.threads,
        );
    });

    let results = info_span!("compare")
        .in_scope(|| compile_results(&database, config.threshold, config.threads))?;

    render(console.as_ref(), &results);
    Ok(())
}
