use std::collections::HashMap;

use boost_tuner::pruner::{MedianPruner, Pruner};
use boost_tuner::sampler::CompletedTrial;
use boost_tuner::{Direction, TrialState};

fn trial_with_values(id: u64, intermediate_values: Vec<(u64, f64)>) -> CompletedTrial {
    let value = intermediate_values.last().map_or(0.0, |&(_, v)| v);
    CompletedTrial::with_intermediate_values(
        id,
        HashMap::new(),
        HashMap::new(),
        HashMap::new(),
        value,
        intermediate_values,
    )
}

/// A pruner with the startup gate disabled, so small histories can prune.
fn eager(direction: Direction) -> MedianPruner {
    MedianPruner::new(direction).n_startup_trials(0)
}

fn three_losses() -> Vec<CompletedTrial> {
    vec![
        trial_with_values(0, vec![(0, 0.5), (1, 0.8), (2, 1.0)]),
        trial_with_values(1, vec![(0, 0.6), (1, 1.5), (2, 2.0)]),
        trial_with_values(2, vec![(0, 0.7), (1, 2.0), (2, 3.0)]),
    ]
}

// --- Direction ---

#[test]
fn prune_when_worse_than_median_minimize() {
    // step 2: [1.0, 2.0, 3.0] => median 2.0
    let current = vec![(0, 0.5), (1, 1.0), (2, 2.5)];
    assert!(eager(Direction::Minimize).should_prune(3, 2, &current, &three_losses()));
}

#[test]
fn no_prune_when_better_than_median_minimize() {
    let current = vec![(0, 0.5), (1, 1.0), (2, 1.5)];
    assert!(!eager(Direction::Minimize).should_prune(3, 2, &current, &three_losses()));
}

#[test]
fn value_equal_to_median_survives() {
    let current = vec![(0, 0.5), (1, 1.0), (2, 2.0)];
    assert!(!eager(Direction::Minimize).should_prune(3, 2, &current, &three_losses()));
}

#[test]
fn maximize_prunes_low_values() {
    let completed = vec![
        trial_with_values(0, vec![(0, 3.0), (1, 5.0)]),
        trial_with_values(1, vec![(0, 4.0), (1, 7.0)]),
        trial_with_values(2, vec![(0, 5.0), (1, 9.0)]),
    ];
    let pruner = eager(Direction::Maximize);
    assert!(pruner.should_prune(3, 1, &[(0, 4.0), (1, 6.0)], &completed));
    assert!(!pruner.should_prune(3, 1, &[(0, 4.0), (1, 8.0)], &completed));
}

// --- Gates ---

#[test]
fn startup_gate_counts_complete_trials() {
    let pruner = MedianPruner::new(Direction::Minimize);
    let mut completed = three_losses();
    assert!(!pruner.should_prune(3, 2, &[(2, 100.0)], &completed));

    // pruned trials do not count towards the five
    let mut pruned = trial_with_values(3, vec![(2, 1.0)]);
    pruned.state = TrialState::Pruned;
    completed.push(pruned);
    completed.push(trial_with_values(4, vec![(2, 1.0)]));
    assert!(!pruner.should_prune(5, 2, &[(2, 100.0)], &completed));

    completed.push(trial_with_values(5, vec![(2, 1.0)]));
    assert!(pruner.should_prune(6, 2, &[(2, 100.0)], &completed));
}

#[test]
fn no_prune_during_warmup() {
    let pruner = eager(Direction::Minimize).n_warmup_steps(5);
    let completed = vec![trial_with_values(0, vec![(0, 1.0), (1, 1.0), (2, 1.0)])];
    let current = vec![(0, 100.0), (1, 100.0), (2, 100.0)];
    assert!(!pruner.should_prune(1, 2, &current, &completed));
}

#[test]
fn prune_after_warmup() {
    let pruner = eager(Direction::Minimize).n_warmup_steps(2);
    let completed = vec![trial_with_values(0, vec![(0, 1.0), (1, 1.0), (2, 1.0)])];
    let current = vec![(0, 100.0), (1, 100.0), (2, 100.0)];
    assert!(pruner.should_prune(1, 2, &current, &completed));
}

#[test]
fn only_prunes_on_interval_steps() {
    let pruner = eager(Direction::Minimize).interval_steps(3);
    let completed = vec![trial_with_values(0, vec![(3, 1.0), (4, 1.0)])];
    assert!(!pruner.should_prune(1, 4, &[(4, 9.0)], &completed));
    assert!(pruner.should_prune(1, 3, &[(3, 9.0)], &completed));
}

#[test]
fn no_prune_when_fewer_than_n_min_trials() {
    let pruner = eager(Direction::Minimize).n_min_trials(3);
    let completed = vec![
        trial_with_values(0, vec![(0, 1.0)]),
        trial_with_values(1, vec![(0, 2.0)]),
    ];
    assert!(!pruner.should_prune(2, 0, &[(0, 100.0)], &completed));
}

#[test]
fn prune_when_at_least_n_min_trials() {
    let pruner = eager(Direction::Minimize).n_min_trials(3);
    let completed = vec![
        trial_with_values(0, vec![(0, 1.0)]),
        trial_with_values(1, vec![(0, 2.0)]),
        trial_with_values(2, vec![(0, 3.0)]),
    ];
    assert!(pruner.should_prune(3, 0, &[(0, 5.0)], &completed));
}

#[test]
fn no_prune_when_no_completed_trials_at_step() {
    let completed = vec![
        trial_with_values(0, vec![(0, 1.0)]),
        trial_with_values(1, vec![(0, 2.0)]),
    ];
    let current = vec![(0, 0.5), (5, 100.0)];
    assert!(!eager(Direction::Minimize).should_prune(2, 5, &current, &completed));
}

#[test]
fn nan_is_pruned_once_gates_pass() {
    let completed = vec![trial_with_values(0, vec![(0, 1.0)])];
    let pruner = eager(Direction::Minimize);
    assert!(pruner.should_prune(1, 0, &[(0, f64::NAN)], &completed));
    // but not while a gate holds
    let gated = pruner.n_warmup_steps(1);
    assert!(!gated.should_prune(1, 0, &[(0, f64::NAN)], &completed));
}

// --- Median edge cases ---

#[test]
fn correct_median_with_even_number_of_trials() {
    let completed: Vec<_> = [1.0, 2.0, 3.0, 4.0]
        .into_iter()
        .enumerate()
        .map(|(i, v)| trial_with_values(i as u64, vec![(0, v)]))
        .collect();
    let pruner = eager(Direction::Minimize);
    assert!(pruner.should_prune(4, 0, &[(0, 2.6)], &completed));
    assert!(!pruner.should_prune(4, 0, &[(0, 2.4)], &completed));
}

#[test]
fn works_with_non_contiguous_steps() {
    let completed = vec![
        trial_with_values(0, vec![(0, 1.0), (10, 2.0), (100, 3.0)]),
        trial_with_values(1, vec![(0, 1.5), (10, 2.5), (100, 4.0)]),
        trial_with_values(2, vec![(0, 2.0), (10, 3.0), (100, 5.0)]),
    ];
    let pruner = eager(Direction::Minimize);
    assert!(pruner.should_prune(3, 100, &[(0, 1.0), (10, 2.0), (100, 4.5)], &completed));
    assert!(!pruner.should_prune(3, 100, &[(0, 1.0), (10, 2.0), (100, 3.5)], &completed));
}

#[test]
fn no_prune_when_no_intermediate_values() {
    let completed = vec![trial_with_values(0, vec![(0, 1.0)])];
    assert!(!eager(Direction::Minimize).should_prune(1, 0, &[], &completed));
}

#[test]
fn pruned_trials_excluded_from_median() {
    let mut pruned = trial_with_values(0, vec![(0, 0.1)]);
    pruned.state = TrialState::Pruned;
    let completed = vec![pruned, trial_with_values(1, vec![(0, 5.0)])];

    let pruner = eager(Direction::Minimize);
    assert!(!pruner.should_prune(2, 0, &[(0, 3.0)], &completed));
    assert!(pruner.should_prune(2, 0, &[(0, 6.0)], &completed));
}
