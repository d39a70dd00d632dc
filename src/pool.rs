//! Pair Worker Pool
//!
//! Fans independent `(i, j)` tasks out to scoped worker threads over a
//! crossbeam job queue and gathers the results back on the calling thread.
//! Tasks only read shared inputs; everything they produce travels back over
//! the result channel, so callers apply side effects from a single owner.

use crossbeam_channel::unbounded;
use std::thread;
use tracing::{debug, warn};

pub type Pair = (usize, usize);

/// All ordered pairs `(i, j)` with `i != j` over `n` items.
pub fn ordered_pairs(n: usize) -> Vec<Pair> {
    (0..n)
        .flat_map(|i| (0..n).filter(move |&j| j != i).map(move |j| (i, j)))
        .collect()
}

/// Run `task` for every pair and return results sorted by pair.
///
/// `workers <= 1` runs inline on the calling thread. If no worker thread can
/// be spawned the calling thread drains the queue itself.
pub fn run_pairs<T, F>(pairs: Vec<Pair>, workers: usize, task: F) -> Vec<(Pair, T)>
where
    T: Send,
    F: Fn(usize, usize) -> T + Sync,
{
    if workers <= 1 || pairs.len() <= 1 {
        return pairs.into_iter().map(|(i, j)| ((i, j), task(i, j))).collect();
    }

    let total = pairs.len();
    let (job_tx, job_rx) = unbounded::<Pair>();
    let (result_tx, result_rx) = unbounded::<(Pair, T)>();

    for pair in pairs {
        // The receiver is alive for the rest of this function.
        let _ = job_tx.send(pair);
    }
    drop(job_tx);

    let task = &task;
    let mut results = thread::scope(|scope| {
        let mut spawned = 0usize;
        for id in 0..workers.min(total) {
            let rx = job_rx.clone();
            let tx = result_tx.clone();
            let handle = thread::Builder::new()
                .name(format!("via-pair-{}", id))
                .spawn_scoped(scope, move || {
                    while let Ok((i, j)) = rx.recv() {
                        if tx.send(((i, j), task(i, j))).is_err() {
                            break;
                        }
                    }
                });
            match handle {
                Ok(_) => spawned += 1,
                Err(err) => warn!(worker = id, error = %err, "failed to spawn pair worker"),
            }
        }

        if spawned == 0 {
            warn!("no pair workers available, running on the calling thread");
            while let Ok((i, j)) = job_rx.recv() {
                let _ = result_tx.send(((i, j), task(i, j)));
            }
        }
        drop(result_tx);

        debug!(workers = spawned, pairs = total, "pair workers running");
        result_rx.iter().collect::<Vec<_>>()
    });

    results.sort_by_key(|(pair, _)| *pair);
    results
}
