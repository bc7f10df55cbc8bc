//! Bounded worker pool for per-root parsing and rendering.

use crate::model::DocumentationInfo;
use crossbeam::channel;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::thread;
use tracing::debug;

/// Two workers per CPU, or one on a dry run so stdout output is not
/// interleaved.
pub fn worker_count(dry_run: bool) -> usize {
    if dry_run {
        return 1;
    }
    thread::available_parallelism()
        .map(|n| n.get() * 2)
        .unwrap_or(2)
}

/// Run `job` over `items` on at most `workers` threads. Results come back
/// in input order.
pub fn run<T, R, F>(items: Vec<T>, workers: usize, job: F) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Sync,
{
    let total = items.len();
    let workers = workers.clamp(1, total.max(1));
    let (tx, rx) = channel::unbounded();
    for item in items.into_iter().enumerate() {
        // the receiver outlives this loop
        let _ = tx.send(item);
    }
    drop(tx);

    let results = Mutex::new(BTreeMap::new());
    debug!("Running {} jobs on {} workers", total, workers);

    thread::scope(|scope| {
        for _ in 0..workers {
            let rx = rx.clone();
            let job = &job;
            let results = &results;
            scope.spawn(move || {
                for (index, item) in rx.iter() {
                    let result = job(item);
                    results.lock().insert(index, result);
                }
            });
        }
    });

    results.into_inner().into_values().collect()
}

/// `job` once per config root path.
pub fn over_paths<R, F>(paths: &[PathBuf], workers: usize, job: F) -> Vec<R>
where
    R: Send,
    F: Fn(&Path) -> R + Sync,
{
    run(paths.iter().map(PathBuf::as_path).collect(), workers, job)
}

/// `job` once per parsed root, in config path order.
pub fn over_infos<R, F>(
    infos: &BTreeMap<String, DocumentationInfo>,
    workers: usize,
    job: F,
) -> Vec<R>
where
    R: Send,
    F: Fn(&DocumentationInfo) -> R + Sync,
{
    run(infos.values().collect(), workers, job)
}
