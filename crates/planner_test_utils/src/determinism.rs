//! Determinism testing utilities.
//!
//! The planner is fully reproducible: the economy runs on integer and
//! fixed-point arithmetic, collections are ordered, and the only randomness
//! is the selection jitter drawn from a seeded generator. Two planners
//! built with the same configuration and fed the same snapshot must walk
//! the same tree and settle on the same move.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: single operations of the engine are repeatable
//! 2. **Property tests**: random worlds still give repeatable results
//! 3. **Integration tests**: whole planning cycles are reproducible
//! 4. **Parallel tests**: N planners on N threads all agree

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use planner_core::{Planner, WorldState};

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps taken per run.
    pub steps: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic search).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run agreed, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Search is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a process multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `steps` - Number of steps per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one step
/// * `hash` - Function to compute the state hash
///
/// # Example
///
/// ```ignore
/// use planner_test_utils::determinism::{planner_hash, verify_determinism};
/// use planner_test_utils::fixtures;
///
/// let snapshot = fixtures::terran_opening();
/// let result = verify_determinism(
///     4,
///     200,
///     || fixtures::planner(Race::Terran, goal.clone()),
///     |p| { p.step(&snapshot); },
///     planner_hash,
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();
        for _ in 0..steps {
            step(&mut state);
        }
        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    if !is_deterministic {
        tracing::debug!(?hashes, "Runs diverged");
    }

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Hash of everything observable about a planner's search.
#[must_use]
pub fn planner_hash(planner: &Planner) -> u64 {
    let stats = planner.stats();
    let tree = planner.tree();
    let root = tree.node(tree.root());
    let children: Vec<_> = root
        .children()
        .unwrap_or_default()
        .iter()
        .map(|&id| {
            let node = tree.node(id);
            (node.mv(), node.best_frames_seen(), node.visits())
        })
        .collect();
    compute_hash(&(
        stats.iterations,
        stats.expansions,
        stats.prunes,
        stats.resets,
        stats.best_frame,
        planner.best_move(),
        tree.live_len(),
        children,
    ))
}

/// Run `setup` on `threads` scoped threads, step each planner `steps`
/// times against the snapshot, and collect the planner hashes.
///
/// # Panics
///
/// Panics if a planner thread panics.
pub fn run_parallel_planners<F>(setup: F, threads: usize, steps: u64) -> DeterminismResult
where
    F: Fn() -> (Planner, WorldState) + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                s.spawn(|| {
                    let (mut planner, snapshot) = setup();
                    for _ in 0..steps {
                        planner.step(&snapshot);
                    }
                    planner_hash(&planner)
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("planner thread panicked"))
            .collect()
    });

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        steps,
    }
}

/// Step two planners side by side and return the first step after which
/// their hashes differ.
///
/// # Returns
///
/// `None` if they agree throughout, `Some(step)` at the first divergence.
pub fn find_first_divergence<F>(setup: F, steps: u64) -> Option<u64>
where
    F: Fn() -> (Planner, WorldState),
{
    let (mut a, snapshot_a) = setup();
    let (mut b, snapshot_b) = setup();

    if planner_hash(&a) != planner_hash(&b) {
        return Some(0);
    }

    for step in 1..=steps {
        a.step(&snapshot_a);
        b.step(&snapshot_b);
        if planner_hash(&a) != planner_hash(&b) {
            return Some(step);
        }
    }

    None
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}
